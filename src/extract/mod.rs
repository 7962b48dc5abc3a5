//! Extraction callbacks and the document they work on
//!
//! An extractor turns one fetched [`Document`] into zero, one or many
//! [`Record`]s. The distinction between a single record and a sequence is kept
//! by [`Extracted`]: a single record always counts as exactly one, a sequence
//! counts as all of its elements.

mod parsers;

pub use parsers::{BodyExtractor, LinkExtractor, SelectorExtractor};

use crate::crawler::Response;
use crate::state::JobContext;
use scraper::Html;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// One structured unit of scraped output
pub type Record = Map<String, Value>;

/// Errors raised by extractors
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Element not found: {0}")]
    NotFound(String),

    #[error("Unexpected value: {0}")]
    UnexpectedValue(String),

    #[error("{0}")]
    Custom(String),
}

/// Output of one extractor call
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Extracted {
    /// Nothing extracted from this page
    #[default]
    Empty,

    /// Exactly one record
    One(Record),

    /// A sequence of records, possibly empty
    Many(Vec<Record>),
}

impl Extracted {
    /// Number of records this output contributes
    pub fn len(&self) -> usize {
        match self {
            Extracted::Empty => 0,
            Extracted::One(_) => 1,
            Extracted::Many(records) => records.len(),
        }
    }

    /// True when the output contributes no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flattens the output into the records it contributes
    pub fn into_records(self) -> Vec<Record> {
        match self {
            Extracted::Empty => Vec::new(),
            Extracted::One(record) => vec![record],
            Extracted::Many(records) => records,
        }
    }
}

impl From<Record> for Extracted {
    fn from(record: Record) -> Self {
        Extracted::One(record)
    }
}

impl From<Vec<Record>> for Extracted {
    fn from(records: Vec<Record>) -> Self {
        Extracted::Many(records)
    }
}

impl TryFrom<Value> for Extracted {
    type Error = ExtractionError;

    /// Objects become one record, arrays of objects become a sequence and null
    /// becomes nothing. Scalars are rejected.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Extracted::Empty),
            Value::Object(record) => Ok(Extracted::One(record)),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Value::Object(record) => Ok(record),
                    other => Err(ExtractionError::UnexpectedValue(format!(
                        "element {} is not an object: {}",
                        index, other
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Extracted::Many),
            other => Err(ExtractionError::UnexpectedValue(format!(
                "expected an object or an array of objects, got {}",
                other
            ))),
        }
    }
}

/// A fetched page as seen by extractors
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// The frontier URL that was requested
    pub url: String,

    /// URL the response was served from, after any redirects
    pub final_url: String,

    /// HTTP status code
    pub status: u16,

    /// Response headers with lowercase names
    pub headers: HashMap<String, String>,

    /// Raw body text
    pub body: String,
}

impl Document {
    /// Builds the document for a frontier URL from the fetcher's response
    pub fn new(url: impl Into<String>, response: Response) -> Self {
        Self {
            url: url.into(),
            final_url: response.url,
            status: response.status,
            headers: response.headers,
            body: response.body,
        }
    }

    /// Builds a document directly from HTML, mostly for tests and offline use
    pub fn from_html(url: impl Into<String>, body: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            final_url: url.clone(),
            url,
            status: 200,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Raw body text
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Parses the body as an HTML document
    pub fn html(&self) -> Html {
        Html::parse_document(&self.body)
    }

    /// Looks up a response header by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Parses the body as JSON
    pub fn json(&self) -> Result<Value, ExtractionError> {
        serde_json::from_str(&self.body)
            .map_err(|e| ExtractionError::UnexpectedValue(format!("body is not JSON: {}", e)))
    }
}

/// Turns a fetched document into records
///
/// Extractors must be pure: calling one twice on the same document yields the
/// same records.
pub trait Extractor: Send + Sync {
    fn extract(&self, ctx: &JobContext, document: &Document) -> Result<Extracted, ExtractionError>;
}

impl<F> Extractor for F
where
    F: Fn(&JobContext, &Document) -> Result<Extracted, ExtractionError> + Send + Sync,
{
    fn extract(&self, ctx: &JobContext, document: &Document) -> Result<Extracted, ExtractionError> {
        self(ctx, document)
    }
}

/// Wraps a closure as a shareable extractor
pub fn from_fn<F>(f: F) -> Arc<dyn Extractor>
where
    F: Fn(&JobContext, &Document) -> Result<Extracted, ExtractionError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// The default extractor; never produces records
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyExtractor;

impl Extractor for EmptyExtractor {
    fn extract(&self, _ctx: &JobContext, _document: &Document) -> Result<Extracted, ExtractionError> {
        Ok(Extracted::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Variables;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_single_record_counts_once() {
        let extracted = Extracted::from(record(json!({"id": 1, "tags": ["a", "b"]})));
        assert_eq!(extracted.len(), 1);
        assert_eq!(extracted.into_records().len(), 1);
    }

    #[test]
    fn test_sequence_counts_every_element() {
        let extracted = Extracted::from(vec![record(json!({"id": 2})), record(json!({"id": 3}))]);
        assert_eq!(extracted.len(), 2);
        assert_eq!(
            extracted.into_records(),
            vec![record(json!({"id": 2})), record(json!({"id": 3}))]
        );
    }

    #[test]
    fn test_try_from_value() {
        assert_eq!(Extracted::try_from(Value::Null).unwrap(), Extracted::Empty);
        assert_eq!(Extracted::try_from(json!({"id": 1})).unwrap().len(), 1);
        assert_eq!(Extracted::try_from(json!([{"id": 1}, {"id": 2}])).unwrap().len(), 2);
        assert_eq!(Extracted::try_from(json!([])).unwrap(), Extracted::Many(vec![]));

        assert!(Extracted::try_from(json!(42)).is_err());
        assert!(Extracted::try_from(json!([{"id": 1}, "stray"])).is_err());
    }

    #[test]
    fn test_closure_extractor() {
        let extractor = from_fn(|_ctx: &JobContext, doc: &Document| {
            Ok(Extracted::One(record(json!({ "url": doc.url }))))
        });
        let ctx = JobContext::new("test", Variables::new());
        let doc = Document::from_html("http://a", "<p>hi</p>");

        let extracted = extractor.extract(&ctx, &doc).unwrap();
        assert_eq!(extracted, Extracted::One(record(json!({"url": "http://a"}))));
    }

    #[test]
    fn test_empty_extractor() {
        let ctx = JobContext::new("test", Variables::new());
        let doc = Document::from_html("http://a", "<body>content</body>");
        assert!(EmptyExtractor.extract(&ctx, &doc).unwrap().is_empty());
    }

    #[test]
    fn test_document_header_lookup_is_case_insensitive() {
        let mut doc = Document::from_html("http://a", "");
        doc.headers
            .insert("content-type".to_string(), "text/html".to_string());
        assert_eq!(doc.header("Content-Type"), Some("text/html"));
        assert_eq!(doc.header("etag"), None);
    }

    #[test]
    fn test_document_json() {
        let doc = Document::from_html("http://a/api", r#"{"items": [1, 2]}"#);
        assert_eq!(doc.json().unwrap()["items"][1], 2);
        assert!(Document::from_html("http://a", "<html>").json().is_err());
    }
}
