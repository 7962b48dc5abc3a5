//! JSON file handler

use crate::extract::Record;
use crate::output::traits::{Handler, HandlerResult};
use crate::state::JobContext;
use async_trait::async_trait;
use std::path::PathBuf;

/// Writes all records as one pretty-printed JSON array
#[derive(Debug, Clone)]
pub struct JsonFileHandler {
    path: PathBuf,
}

impl JsonFileHandler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl Handler for JsonFileHandler {
    async fn process(&self, ctx: &mut JobContext, records: &[Record]) -> HandlerResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(&self.path, json).await?;

        tracing::info!(
            parent: ctx.span(),
            "Wrote {} records to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Variables;
    use serde_json::{json, Value};

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_writes_records_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("records.json");
        let handler = JsonFileHandler::new(&path);
        let mut ctx = JobContext::new("json", Variables::new());

        let records = vec![record(json!({"id": 1})), record(json!({"id": 2}))];
        handler.process(&mut ctx, &records).await.unwrap();

        let written: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(written, json!([{"id": 1}, {"id": 2}]));
    }

    #[tokio::test]
    async fn test_empty_record_set_writes_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let handler = JsonFileHandler::new(&path);
        let mut ctx = JobContext::new("json", Variables::new());

        handler.process(&mut ctx, &[]).await.unwrap();

        let written: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(written, json!([]));
    }
}
