//! S3 record handler

use crate::extract::Record;
use crate::output::traits::{Handler, HandlerError, HandlerResult};
use crate::state::JobContext;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;

/// Uploads all records as a JSON array to an S3 bucket
///
/// Credentials and region come from the standard AWS environment. A custom
/// endpoint switches to path-style addressing for S3-compatible stores.
#[derive(Debug, Clone)]
pub struct S3Handler {
    bucket: String,
    key: Option<String>,
    endpoint: Option<String>,
}

impl S3Handler {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: None,
            endpoint: None,
        }
    }

    /// Fixed object key; defaults to `<job>/<timestamp>.json`
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Object key used for a job
    pub fn object_key(&self, ctx: &JobContext) -> String {
        match &self.key {
            Some(key) => key.clone(),
            None => format!(
                "{}/{}.json",
                ctx.job_name(),
                ctx.started_at().format("%Y%m%dT%H%M%SZ")
            ),
        }
    }

    async fn client(&self) -> aws_sdk_s3::Client {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);

        if let Some(endpoint) = &self.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        aws_sdk_s3::Client::from_conf(builder.build())
    }
}

#[async_trait]
impl Handler for S3Handler {
    async fn process(&self, ctx: &mut JobContext, records: &[Record]) -> HandlerResult<()> {
        let body = serde_json::to_vec(records)?;
        let key = self.object_key(ctx);

        self.client()
            .await
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type("application/json")
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| HandlerError::Storage(format!("S3 upload failed: {}", e)))?;

        tracing::info!(
            parent: ctx.span(),
            "Uploaded {} records to s3://{}/{}",
            records.len(),
            self.bucket,
            key
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Variables;

    #[test]
    fn test_explicit_key() {
        let handler = S3Handler::new("bucket").with_key("exports/latest.json");
        let ctx = JobContext::new("quotes", Variables::new());
        assert_eq!(handler.object_key(&ctx), "exports/latest.json");
    }

    #[test]
    fn test_default_key_uses_job_name() {
        let handler = S3Handler::new("bucket");
        let ctx = JobContext::new("quotes", Variables::new());
        let key = handler.object_key(&ctx);
        assert!(key.starts_with("quotes/"));
        assert!(key.ends_with(".json"));
    }
}
