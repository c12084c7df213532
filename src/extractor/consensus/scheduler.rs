//! Scheduler extractor (spec §4.3): validator voting power plus a full
//! per-height replacement of the committee-members table.
//!
//! Grounded in `original_source/analyzer/consensus/consensus.go`'s
//! `queueValidatorUpdates`, `queueCommitteeUpdates`.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::batch::Batch;
use crate::errors::IngestError;
use crate::extractor::Extractor;
use crate::query_factory::QueryFactory;
use crate::source::{cancellable, ConsensusSource};

pub struct SchedulerExtractor {
    source: Arc<dyn ConsensusSource>,
    factory: QueryFactory,
}

impl SchedulerExtractor {
    pub fn new(source: Arc<dyn ConsensusSource>, factory: QueryFactory) -> Self {
        Self { source, factory }
    }
}

#[async_trait]
impl Extractor for SchedulerExtractor {
    async fn extract(&self, height: u64, cancel: CancellationToken) -> Result<Batch, IngestError> {
        let source = Arc::clone(&self.source);
        let data = cancellable(&cancel, async move { source.scheduler_data(height).await }).await?;

        let mut batch = Batch::new();

        for validator in &data.validators {
            batch.push(self.factory.upsert_validator(&validator.node_id, validator.voting_power));
        }

        // Committees are replaced in full every height, across every
        // runtime namespace (spec §4.3) — truncate before inserting so a
        // runtime whose committee dropped to zero members this height
        // doesn't keep a stale row.
        batch.push(self.factory.truncate_committee_members());
        for (namespace, committees) in &data.committees {
            for committee in committees {
                for member in &committee.members {
                    batch.push(self.factory.insert_committee_member(
                        namespace,
                        &committee.kind,
                        committee.valid_for,
                        &member.public_key,
                        &member.role,
                    ));
                }
            }
        }

        Ok(batch)
    }

    fn name(&self) -> &str {
        "consensus.scheduler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{
        Committee, CommitteeMember, ConsensusBlockData, GovernanceData, RegistryData, SchedulerData, StakingData,
        Validator,
    };
    use std::collections::HashMap;

    struct FixedSource {
        scheduler: SchedulerData,
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
            unimplemented!()
        }
        async fn scheduler_data(&self, _height: u64) -> Result<SchedulerData, IngestError> {
            Ok(self.scheduler.clone())
        }
        async fn governance_data(&self, _height: u64) -> Result<GovernanceData, IngestError> {
            unimplemented!()
        }
        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn truncate_precedes_inserts_and_covers_every_runtime() {
        let mut committees = HashMap::new();
        committees.insert(
            "runtime-a".to_string(),
            vec![Committee {
                kind: "executor".to_string(),
                valid_for: 7,
                members: vec![CommitteeMember {
                    public_key: "pk1".to_string(),
                    role: "worker".to_string(),
                }],
            }],
        );

        let source: Arc<dyn ConsensusSource> = Arc::new(FixedSource {
            scheduler: SchedulerData {
                validators: vec![Validator {
                    node_id: "node1".to_string(),
                    voting_power: 100,
                }],
                committees,
            },
        });
        let extractor = SchedulerExtractor::new(source, QueryFactory::consensus("testnet"));
        let batch = extractor.extract(1, CancellationToken::new()).await.unwrap();

        assert_eq!(batch.len(), 3);
        assert!(batch.statements()[0].sql.contains("scheduler_validator"));
        assert!(batch.statements()[1].sql.contains("DELETE"));
        assert!(batch.statements()[1].sql.contains("scheduler_committee_member"));
        assert!(batch.statements()[2].sql.contains("INSERT"));
    }
}
