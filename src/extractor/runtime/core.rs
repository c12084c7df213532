//! Core module handler (spec §4.4): gas-used events.
//!
//! Grounded in the prior codebase's `modules.ModuleHandler` contract —
//! `PrepareData(ctx, round, batch) -> error`, one typed source call per
//! module, no state shared with the other module handlers.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::batch::Batch;
use crate::errors::IngestError;
use crate::extractor::Extractor;
use crate::query_factory::QueryFactory;
use crate::source::{cancellable, RuntimeSource};

pub struct CoreExtractor {
    source: Arc<dyn RuntimeSource>,
    factory: QueryFactory,
}

impl CoreExtractor {
    pub fn new(source: Arc<dyn RuntimeSource>, factory: QueryFactory) -> Self {
        Self { source, factory }
    }
}

#[async_trait]
impl Extractor for CoreExtractor {
    async fn extract(&self, round: u64, cancel: CancellationToken) -> Result<Batch, IngestError> {
        let source = Arc::clone(&self.source);
        let data = cancellable(&cancel, async move { source.core_data(round).await }).await?;

        let mut batch = Batch::new();
        for event in &data.gas_used {
            batch.push(self.factory.insert_gas_used(round, event.tx_index, event.amount));
        }
        Ok(batch)
    }

    fn name(&self) -> &str {
        "runtime.core"
    }
}
