//! Handler that writes the final record count back into the collector

use crate::extract::Record;
use crate::output::traits::{Handler, HandlerResult};
use crate::state::{JobContext, ITEMS_COUNT};
use async_trait::async_trait;

/// Sets `items_count` to the size of the record set it receives
///
/// Mostly useful after handlers or custom steps that filter records, so the
/// reporters see the number that was actually handed on.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataHandler;

#[async_trait]
impl Handler for MetadataHandler {
    async fn process(&self, ctx: &mut JobContext, records: &[Record]) -> HandlerResult<()> {
        ctx.collector.set(ITEMS_COUNT, records.len() as u64);
        tracing::info!(parent: ctx.span(), "Handled {} records", records.len());
        Ok(())
    }
}
