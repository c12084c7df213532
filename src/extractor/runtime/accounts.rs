//! Accounts module handler (spec §4.4): transfers, burns, mints within the
//! runtime's own account namespace — distinct from consensus-layer staking
//! and from the consensus-accounts bridge module below.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::batch::Batch;
use crate::errors::IngestError;
use crate::extractor::Extractor;
use crate::query_factory::QueryFactory;
use crate::source::{cancellable, RuntimeSource};

pub struct AccountsExtractor {
    source: Arc<dyn RuntimeSource>,
    factory: QueryFactory,
}

impl AccountsExtractor {
    pub fn new(source: Arc<dyn RuntimeSource>, factory: QueryFactory) -> Self {
        Self { source, factory }
    }
}

#[async_trait]
impl Extractor for AccountsExtractor {
    async fn extract(&self, round: u64, cancel: CancellationToken) -> Result<Batch, IngestError> {
        let source = Arc::clone(&self.source);
        let data = cancellable(&cancel, async move { source.accounts_data(round).await }).await?;

        let mut batch = Batch::new();
        for transfer in &data.transfers {
            batch.push(self.factory.insert_runtime_transfer(round, &transfer.from, &transfer.to, transfer.amount));
        }
        for burn in &data.burns {
            batch.push(self.factory.insert_runtime_burn(round, &burn.owner, burn.amount));
        }
        for mint in &data.mints {
            batch.push(self.factory.insert_runtime_mint(round, &mint.owner, mint.amount));
        }
        Ok(batch)
    }

    fn name(&self) -> &str {
        "runtime.accounts"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{
        AccountMint, AccountTransfer, AccountsData, ConsensusAccountsData, CoreData, RuntimeBlockData,
    };

    struct FixedSource {
        accounts: AccountsData,
    }

    #[async_trait]
    impl RuntimeSource for FixedSource {
        async fn block_data(&self, _round: u64) -> Result<RuntimeBlockData, IngestError> {
            unimplemented!()
        }
        async fn core_data(&self, _round: u64) -> Result<CoreData, IngestError> {
            unimplemented!()
        }
        async fn accounts_data(&self, _round: u64) -> Result<AccountsData, IngestError> {
            Ok(self.accounts.clone())
        }
        async fn consensus_accounts_data(&self, _round: u64) -> Result<ConsensusAccountsData, IngestError> {
            unimplemented!()
        }
        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn folds_transfers_burns_and_mints() {
        let source: Arc<dyn RuntimeSource> = Arc::new(FixedSource {
            accounts: AccountsData {
                transfers: vec![AccountTransfer {
                    from: "a".to_string(),
                    to: "b".to_string(),
                    amount: 10,
                }],
                burns: vec![],
                mints: vec![AccountMint {
                    owner: "c".to_string(),
                    amount: 5,
                }],
            },
        });
        let extractor = AccountsExtractor::new(source, QueryFactory::runtime("testnet", "emerald"));
        let batch = extractor.extract(5, CancellationToken::new()).await.unwrap();
        assert_eq!(batch.len(), 2);
    }
}
