//! Consensus-accounts module handler (spec §4.4): deposits and withdraws
//! across the consensus/runtime bridge — the one module whose rows name
//! both a consensus address and a runtime address.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::batch::Batch;
use crate::errors::IngestError;
use crate::extractor::Extractor;
use crate::query_factory::QueryFactory;
use crate::source::{cancellable, RuntimeSource};

pub struct ConsensusAccountsExtractor {
    source: Arc<dyn RuntimeSource>,
    factory: QueryFactory,
}

impl ConsensusAccountsExtractor {
    pub fn new(source: Arc<dyn RuntimeSource>, factory: QueryFactory) -> Self {
        Self { source, factory }
    }
}

#[async_trait]
impl Extractor for ConsensusAccountsExtractor {
    async fn extract(&self, round: u64, cancel: CancellationToken) -> Result<Batch, IngestError> {
        let source = Arc::clone(&self.source);
        let data = cancellable(&cancel, async move { source.consensus_accounts_data(round).await }).await?;

        let mut batch = Batch::new();
        for deposit in &data.deposits {
            batch.push(self.factory.insert_consensus_deposit(
                round,
                &deposit.from_consensus_address,
                &deposit.to_runtime_address,
                deposit.amount,
            ));
        }
        for withdraw in &data.withdraws {
            batch.push(self.factory.insert_consensus_withdraw(
                round,
                &withdraw.from_runtime_address,
                &withdraw.to_consensus_address,
                withdraw.amount,
            ));
        }
        Ok(batch)
    }

    fn name(&self) -> &str {
        "runtime.consensus_accounts"
    }
}
