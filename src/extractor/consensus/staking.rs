//! Staking extractor (spec §4.3): transfers, burns, escrow lifecycle,
//! allowance changes.
//!
//! Grounded in `original_source/analyzer/consensus/consensus.go`'s
//! `queueTransfers`, `queueBurns`, `queueEscrows`, `queueAllowanceChanges`.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::batch::Batch;
use crate::errors::IngestError;
use crate::extractor::Extractor;
use crate::query_factory::QueryFactory;
use crate::source::{cancellable, ConsensusSource, StakingEscrowEvent};

pub struct StakingExtractor {
    source: Arc<dyn ConsensusSource>,
    factory: QueryFactory,
}

impl StakingExtractor {
    pub fn new(source: Arc<dyn ConsensusSource>, factory: QueryFactory) -> Self {
        Self { source, factory }
    }
}

#[async_trait]
impl Extractor for StakingExtractor {
    async fn extract(&self, height: u64, cancel: CancellationToken) -> Result<Batch, IngestError> {
        let source = Arc::clone(&self.source);
        let data = cancellable(&cancel, async move { source.staking_data(height).await }).await?;

        let mut batch = Batch::new();

        for transfer in &data.transfers {
            let amount = i64_amount(transfer.amount)?;
            batch.push(self.factory.adjust_general_balance(&transfer.from, -amount));
            batch.push(self.factory.adjust_general_balance(&transfer.to, amount));
        }

        for burn in &data.burns {
            let amount = i64_amount(burn.amount)?;
            batch.push(self.factory.adjust_general_balance(&burn.owner, -amount));
        }

        for escrow in &data.escrows {
            match escrow {
                StakingEscrowEvent::Add(add) => {
                    let amount = i64_amount(add.amount)?;
                    let new_shares = i64_amount(add.new_shares)?;
                    batch.push(self.factory.adjust_general_balance(&add.owner, -amount));
                    batch.push(self.factory.adjust_escrow_balance(&add.escrow, amount, new_shares));
                    batch.push(self.factory.adjust_delegation(&add.escrow, &add.owner, new_shares));
                }
                StakingEscrowEvent::Take(take) => {
                    let amount = i64_amount(take.amount)?;
                    batch.push(self.factory.adjust_general_balance(&take.owner, -amount));
                }
                StakingEscrowEvent::DebondingStart(debonding) => {
                    let amount = i64_amount(debonding.amount)?;
                    let active_shares = i64_amount(debonding.active_shares)?;
                    let debonding_shares = i64_amount(debonding.debonding_shares)?;
                    batch.push(self.factory.debonding_start_escrow_balance(
                        &debonding.escrow,
                        -amount,
                        -active_shares,
                        debonding_shares,
                    ));
                    batch.push(self.factory.adjust_delegation(&debonding.escrow, &debonding.owner, -active_shares));
                    batch.push(self.factory.insert_debonding_delegation(
                        &debonding.escrow,
                        &debonding.owner,
                        debonding.debonding_shares,
                        debonding.debond_end_time,
                    ));
                }
                StakingEscrowEvent::Reclaim(reclaim) => {
                    let amount = i64_amount(reclaim.amount)?;
                    let shares = i64_amount(reclaim.shares)?;
                    batch.push(self.factory.adjust_general_balance(&reclaim.owner, amount));
                    batch.push(self.factory.adjust_escrow_balance(&reclaim.escrow, -amount, -shares));
                    batch.push(self.factory.delete_matured_debonding_delegations(
                        &reclaim.owner,
                        &reclaim.escrow,
                        reclaim.shares,
                        data.epoch,
                    ));
                }
            }
        }

        for change in &data.allowance_changes {
            if change.allowance == 0 {
                batch.push(self.factory.delete_allowance(&change.owner, &change.beneficiary));
            } else {
                batch.push(self.factory.set_allowance(&change.owner, &change.beneficiary, change.allowance));
            }
        }

        Ok(batch)
    }

    fn name(&self) -> &str {
        "consensus.staking"
    }
}

/// Widens a stored amount into a signed delta; spec §4.3 requires overflow
/// to surface as an error rather than silently wrap.
fn i64_amount(amount: u64) -> Result<i64, IngestError> {
    i64::try_from(amount).map_err(|_| {
        IngestError::DecodeBody(anyhow::anyhow!("staking amount {amount} overflows i64"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ConsensusBlockData, GovernanceData, RegistryData, SchedulerData, StakingData, StakingTransfer};

    struct FixedSource {
        staking: StakingData,
    }

    #[async_trait]
    impl ConsensusSource for FixedSource {
        async fn block_data(&self, _height: u64) -> Result<ConsensusBlockData, IngestError> {
            unimplemented!()
        }
        async fn registry_data(&self, _height: u64) -> Result<RegistryData, IngestError> {
            unimplemented!()
        }
        async fn staking_data(&self, _height: u64) -> Result<StakingData, IngestError> {
            Ok(self.staking.clone())
        }
        async fn scheduler_data(&self, _height: u64) -> Result<SchedulerData, IngestError> {
            unimplemented!()
        }
        async fn governance_data(&self, _height: u64) -> Result<GovernanceData, IngestError> {
            unimplemented!()
        }
        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn transfer_yields_exactly_sender_and_receiver_updates() {
        let source: Arc<dyn ConsensusSource> = Arc::new(FixedSource {
            staking: StakingData {
                epoch: 1,
                transfers: vec![StakingTransfer {
                    from: "a".to_string(),
                    to: "b".to_string(),
                    amount: 1000,
                }],
                burns: vec![],
                escrows: vec![],
                allowance_changes: vec![],
            },
        });
        let extractor = StakingExtractor::new(source, QueryFactory::consensus("testnet"));
        let batch = extractor.extract(1, CancellationToken::new()).await.unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.statements()[0].params[2], crate::batch::Param::I64(-1000));
        assert_eq!(batch.statements()[1].params[2], crate::batch::Param::I64(1000));
    }

    #[test]
    fn amount_overflow_surfaces_as_error() {
        let err = i64_amount(u64::MAX).unwrap_err();
        assert!(matches!(err, IngestError::DecodeBody(_)));
    }
}
