//! Governance extractor (spec §4.3): proposal submissions (routed by
//! content variant), executions, finalizations, and votes.
//!
//! Grounded in `original_source/analyzer/consensus/consensus.go`'s
//! `queueSubmissions`, `queueExecutions`, `queueFinalizations`, `queueVotes`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::batch::Batch;
use crate::errors::IngestError;
use crate::extractor::Extractor;
use crate::query_factory::QueryFactory;
use crate::source::{cancellable, ConsensusSource, ProposalContent};

pub struct GovernanceExtractor {
    source: Arc<dyn ConsensusSource>,
    factory: QueryFactory,
}

impl GovernanceExtractor {
    pub fn new(source: Arc<dyn ConsensusSource>, factory: QueryFactory) -> Self {
        Self { source, factory }
    }
}

#[async_trait]
impl Extractor for GovernanceExtractor {
    async fn extract(&self, height: u64, cancel: CancellationToken) -> Result<Batch, IngestError> {
        let source = Arc::clone(&self.source);
        let data = cancellable(&cancel, async move { source.governance_data(height).await }).await?;

        let mut batch = Batch::new();

        for submission in &data.submissions {
            // Content variant dictates the insert shape (spec §4.3): an
            // `Upgrade` and a `CancelUpgrade` carry different payloads, so
            // they go into distinct statement shapes rather than one
            // nullable-column insert.
            let content = match &submission.content {
                ProposalContent::Upgrade { target_version, epoch } => json!({
                    "kind": "upgrade",
                    "target_version": target_version,
                    "epoch": epoch,
                }),
                ProposalContent::CancelUpgrade { proposal_id } => json!({
                    "kind": "cancel_upgrade",
                    "proposal_id": proposal_id,
                }),
            };
            batch.push(self.factory.insert_proposal(submission.proposal_id, &submission.submitter, content));
        }

        for execution in &data.executions {
            batch.push(self.factory.mark_proposal_executed(execution.proposal_id));
        }

        for finalization in &data.finalizations {
            batch.push(self.factory.finalize_proposal(
                finalization.proposal_id,
                &finalization.state,
                finalization.invalid_votes,
            ));
        }

        for vote in &data.votes {
            batch.push(self.factory.insert_vote(vote.proposal_id, &vote.submitter, &vote.vote));
        }

        Ok(batch)
    }

    fn name(&self) -> &str {
        "consensus.governance"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{
        ConsensusBlockData, GovernanceData, GovernanceProposalSubmitted, RegistryData, SchedulerData, StakingData,
    };

    struct FixedSource {
        governance: GovernanceData,
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
            unimplemented!()
        }
        async fn governance_data(&self, _height: u64) -> Result<GovernanceData, IngestError> {
            Ok(self.governance.clone())
        }
        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn upgrade_and_cancel_upgrade_submissions_both_insert_distinctly() {
        let source: Arc<dyn ConsensusSource> = Arc::new(FixedSource {
            governance: GovernanceData {
                submissions: vec![
                    GovernanceProposalSubmitted {
                        proposal_id: 1,
                        submitter: "alice".to_string(),
                        content: ProposalContent::Upgrade {
                            target_version: "1.2.0".to_string(),
                            epoch: 500,
                        },
                    },
                    GovernanceProposalSubmitted {
                        proposal_id: 2,
                        submitter: "bob".to_string(),
                        content: ProposalContent::CancelUpgrade { proposal_id: 1 },
                    },
                ],
                executions: vec![],
                finalizations: vec![],
                votes: vec![],
            },
        });
        let extractor = GovernanceExtractor::new(source, QueryFactory::consensus("testnet"));
        let batch = extractor.extract(1, CancellationToken::new()).await.unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.statements()[0].params[2], crate::batch::Param::from("alice".to_string()));
        let crate::batch::Param::Json(content) = &batch.statements()[0].params[3] else {
            panic!("expected json param");
        };
        assert_eq!(content["kind"], "upgrade");
        let crate::batch::Param::Json(cancel_content) = &batch.statements()[1].params[3] else {
            panic!("expected json param");
        };
        assert_eq!(cancel_content["kind"], "cancel_upgrade");
    }
}
