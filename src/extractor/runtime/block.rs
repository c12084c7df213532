//! Runtime block extractor (spec §4.4): one insert per round.
//!
//! Grounded in `original_source/analyzer/emerald/emerald.go`'s round-driven
//! `processRound`, generalized from the Emerald-specific block shape into
//! the round/version/hash/root fields spec §6's `RuntimeBlockData` names.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::batch::Batch;
use crate::errors::IngestError;
use crate::extractor::Extractor;
use crate::query_factory::QueryFactory;
use crate::source::{cancellable, RuntimeSource};

pub struct RuntimeBlockExtractor {
    source: Arc<dyn RuntimeSource>,
    factory: QueryFactory,
}

impl RuntimeBlockExtractor {
    pub fn new(source: Arc<dyn RuntimeSource>, factory: QueryFactory) -> Self {
        Self { source, factory }
    }
}

#[async_trait]
impl Extractor for RuntimeBlockExtractor {
    async fn extract(&self, round: u64, cancel: CancellationToken) -> Result<Batch, IngestError> {
        let source = Arc::clone(&self.source);
        let data = cancellable(&cancel, async move { source.block_data(round).await }).await?;

        let mut batch = Batch::new();
        batch.push(self.factory.insert_runtime_block(
            data.round,
            data.version,
            &data.timestamp.to_rfc3339(),
            &data.encoded_hash,
            &data.previous_hash,
            &data.io_root,
            &data.state_root,
            &data.messages_hash,
            &data.in_messages_hash,
        ));
        Ok(batch)
    }

    fn name(&self) -> &str {
        "runtime.block"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{AccountsData, ConsensusAccountsData, CoreData, RuntimeBlockData};
    use chrono::Utc;

    struct FixedSource {
        block: RuntimeBlockData,
    }

    #[async_trait]
    impl RuntimeSource for FixedSource {
        async fn block_data(&self, _round: u64) -> Result<RuntimeBlockData, IngestError> {
            Ok(self.block.clone())
        }
        async fn core_data(&self, _round: u64) -> Result<CoreData, IngestError> {
            unimplemented!()
        }
        async fn accounts_data(&self, _round: u64) -> Result<AccountsData, IngestError> {
            unimplemented!()
        }
        async fn consensus_accounts_data(&self, _round: u64) -> Result<ConsensusAccountsData, IngestError> {
            unimplemented!()
        }
        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn inserts_exactly_one_block_row() {
        let source: Arc<dyn RuntimeSource> = Arc::new(FixedSource {
            block: RuntimeBlockData {
                round: 5,
                version: 1,
                timestamp: Utc::now(),
                encoded_hash: "0xdead".to_string(),
                previous_hash: "0xbeef".to_string(),
                io_root: "0xio".to_string(),
                state_root: "0xstate".to_string(),
                messages_hash: "0xmsg".to_string(),
                in_messages_hash: "0xinmsg".to_string(),
            },
        });
        let extractor = RuntimeBlockExtractor::new(source, QueryFactory::runtime("testnet", "emerald"));
        let batch = extractor.extract(5, CancellationToken::new()).await.unwrap();
        assert_eq!(batch.len(), 1);
        assert!(batch.statements()[0].sql.contains("runtime_block"));
    }
}
