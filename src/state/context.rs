//! Per-run job context
//!
//! The context is created fresh for every run and is the only channel through
//! which components share state. It also carries the job's tracing span, so
//! components log against an explicit handle instead of a process-wide logger.

use crate::crawler::RequestSpec;
use crate::extract::Document;
use crate::state::MetadataCollector;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::Span;

/// Arbitrary job variables
pub type Variables = Map<String, Value>;

/// Per-run bundle of metrics, variables and the current request/response
#[derive(Debug)]
pub struct JobContext {
    job_name: String,
    started_at: DateTime<Utc>,
    span: Span,

    /// Named aggregates and per-page metrics
    pub collector: MetadataCollector,

    /// Caller-supplied variables, also the input of seed producers
    pub variables: Variables,

    request: Option<RequestSpec>,
    response: Option<Document>,
}

impl JobContext {
    /// Creates a context for a new job, opening its tracing span
    pub fn new(job_name: impl Into<String>, variables: Variables) -> Self {
        let job_name = job_name.into();
        let span = tracing::info_span!("crawl", job = %job_name);
        Self::with_span(job_name, variables, span)
    }

    /// Creates a context that logs under an existing span
    pub fn with_span(job_name: impl Into<String>, variables: Variables, span: Span) -> Self {
        Self {
            job_name: job_name.into(),
            started_at: Utc::now(),
            span,
            collector: MetadataCollector::new(),
            variables,
            request: None,
            response: None,
        }
    }

    /// Name of the job this context belongs to
    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    /// When the job started
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// The job's logging handle
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// The request most recently sent to the fetcher
    pub fn request(&self) -> Option<&RequestSpec> {
        self.request.as_ref()
    }

    /// The document most recently extracted
    pub fn response(&self) -> Option<&Document> {
        self.response.as_ref()
    }

    pub(crate) fn set_request(&mut self, request: RequestSpec) {
        self.request = Some(request);
    }

    pub(crate) fn set_response(&mut self, document: Document) {
        self.response = Some(document);
    }

    /// Looks up a string variable
    pub fn variable_str(&self, key: &str) -> Option<&str> {
        self.variables.get(key).and_then(Value::as_str)
    }
}
