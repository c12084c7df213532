//! End-to-end tests driving the full consensus extractor set through
//! `cursor_loop::run` against fake `Source`/`Target` implementations — no
//! network or disk I/O (SPEC_FULL §14). Covers the spec §8 literal
//! scenarios that span more than one module: atomic mid-batch failure,
//! transfer folding, and the escrow debonding/reclaim lifecycle across two
//! heights.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chain_ingest::batch::{Batch, Statement};
use chain_ingest::config::Range;
use chain_ingest::consensus_extractors;
use chain_ingest::source::{
    BlockHeader, ConsensusBlockData, ConsensusSource, GovernanceData, OpenTransaction, RegistryData, SchedulerData,
    StakingAddEscrow, StakingData, StakingDebondingStart, StakingEscrowEvent, StakingReclaimEscrow, StakingTransfer,
    StateRoot, TransactionCodec,
};
use chain_ingest::target::{AnalyzerIdentity, Target};
use chain_ingest::{Backoff, IngestError, QueryFactory};
use chrono::Utc;
use tokio_util::sync::CancellationToken;

struct ScriptedSource {
    staking_by_height: Mutex<HashMap<u64, StakingData>>,
    served_up_to: u64,
}

fn empty_header(height: u64) -> BlockHeader {
    BlockHeader {
        height,
        hash: format!("hash-{height}"),
        time: Utc::now(),
        state_root: StateRoot {
            namespace: "ns".to_string(),
            version: 1,
            root_type: "state".to_string(),
            hash: format!("root-{height}"),
        },
    }
}

#[async_trait]
impl ConsensusSource for ScriptedSource {
    async fn block_data(&self, height: u64) -> Result<ConsensusBlockData, IngestError> {
        if height > self.served_up_to {
            return Err(IngestError::OutOfRange);
        }
        Ok(ConsensusBlockData {
            header: empty_header(height),
            epoch: height / 10,
            transactions: vec![],
            results: vec![],
        })
    }

    async fn registry_data(&self, height: u64) -> Result<RegistryData, IngestError> {
        if height > self.served_up_to {
            return Err(IngestError::OutOfRange);
        }
        Ok(RegistryData::default())
    }

    async fn staking_data(&self, height: u64) -> Result<StakingData, IngestError> {
        if height > self.served_up_to {
            return Err(IngestError::OutOfRange);
        }
        Ok(self
            .staking_by_height
            .lock()
            .unwrap()
            .remove(&height)
            .unwrap_or(StakingData {
                epoch: height / 10,
                ..Default::default()
            }))
    }

    async fn scheduler_data(&self, height: u64) -> Result<SchedulerData, IngestError> {
        if height > self.served_up_to {
            return Err(IngestError::OutOfRange);
        }
        Ok(SchedulerData::default())
    }

    async fn governance_data(&self, height: u64) -> Result<GovernanceData, IngestError> {
        if height > self.served_up_to {
            return Err(IngestError::OutOfRange);
        }
        Ok(GovernanceData::default())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

struct NoopCodec;

impl TransactionCodec for NoopCodec {
    fn open(&self, _raw: &[u8]) -> anyhow::Result<OpenTransaction> {
        anyhow::bail!("no transactions expected in this test")
    }
}

/// Records every submitted batch; `fail_heights` simulates a target that
/// rejects specific heights entirely (atomic: nothing from that batch is
/// retained).
struct RecordingTarget {
    cursor: Mutex<Option<u64>>,
    applied: Mutex<Vec<Statement>>,
    fail_heights: Vec<u64>,
}

#[async_trait]
impl Target for RecordingTarget {
    async fn submit(&self, batch: Batch) -> Result<(), IngestError> {
        let statements = batch.into_statements();
        let height_param = statements
            .last()
            .and_then(|s| s.params.last())
            .cloned();
        let height = match height_param {
            Some(chain_ingest::batch::Param::U64(h)) => h,
            _ => panic!("expected cursor statement with u64 height param last"),
        };

        if self.fail_heights.contains(&height) {
            return Err(IngestError::TransientTarget(anyhow::anyhow!("simulated failure at height {height}")));
        }

        self.applied.lock().unwrap().extend(statements);
        *self.cursor.lock().unwrap() = Some(height);
        Ok(())
    }

    async fn cursor(&self, _identity: &AnalyzerIdentity) -> Result<u64, IngestError> {
        match *self.cursor.lock().unwrap() {
            Some(h) => Ok(h),
            None => Err(IngestError::NoRow),
        }
    }

    fn name(&self) -> &str {
        "recording"
    }
}

#[tokio::test]
async fn transfer_folds_into_exactly_sender_and_receiver_updates() {
    let mut staking_by_height = HashMap::new();
    staking_by_height.insert(
        5,
        StakingData {
            epoch: 0,
            transfers: vec![StakingTransfer {
                from: "alice".to_string(),
                to: "bob".to_string(),
                amount: 1000,
            }],
            ..Default::default()
        },
    );

    let source: Arc<dyn ConsensusSource> = Arc::new(ScriptedSource {
        staking_by_height: Mutex::new(staking_by_height),
        served_up_to: 5,
    });
    let factory = QueryFactory::consensus("testnet");
    let extractors = consensus_extractors(source, Arc::new(NoopCodec), None, factory, "consensus");

    let target = Arc::new(RecordingTarget {
        cursor: Mutex::new(None),
        applied: Mutex::new(Vec::new()),
        fail_heights: vec![],
    });

    chain_ingest::cursor_loop::run(
        AnalyzerIdentity::consensus("testnet"),
        Range { from: 5, to: Some(5) },
        extractors,
        Arc::clone(&target) as Arc<dyn Target>,
        Backoff::new(std::time::Duration::from_millis(1), std::time::Duration::from_millis(5)).unwrap(),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    let applied = target.applied.lock().unwrap();
    let balance_updates: Vec<_> = applied
        .iter()
        .filter(|s| s.sql.contains("general_balance"))
        .collect();
    assert_eq!(balance_updates.len(), 2);
    assert_eq!(target.cursor.lock().unwrap().unwrap(), 5);
}

#[tokio::test]
async fn mid_batch_target_failure_leaves_cursor_unmoved_and_nothing_applied() {
    let source: Arc<dyn ConsensusSource> = Arc::new(ScriptedSource {
        staking_by_height: Mutex::new(HashMap::new()),
        served_up_to: 20,
    });
    let factory = QueryFactory::consensus("testnet");
    let extractors = consensus_extractors(source, Arc::new(NoopCodec), None, factory, "consensus");

    let target = Arc::new(RecordingTarget {
        cursor: Mutex::new(None),
        applied: Mutex::new(Vec::new()),
        fail_heights: vec![10],
    });

    let result = chain_ingest::cursor_loop::run(
        AnalyzerIdentity::consensus("testnet"),
        Range { from: 10, to: Some(10) },
        extractors,
        Arc::clone(&target) as Arc<dyn Target>,
        Backoff::new(std::time::Duration::from_millis(1), std::time::Duration::from_millis(2)).unwrap(),
        {
            // Loop would retry height 10 forever against an always-failing
            // target; cancel after giving it a few attempts so the test
            // terminates, then assert nothing ever got applied.
            let token = CancellationToken::new();
            let token_clone = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                token_clone.cancel();
            });
            token
        },
    )
    .await;

    assert!(result.is_ok(), "shutdown-triggered exit is a clean return, not an error");
    assert!(target.applied.lock().unwrap().is_empty());
    assert!(target.cursor.lock().unwrap().is_none());
}

#[tokio::test]
async fn escrow_debonding_then_reclaim_clears_the_debonding_row_and_nets_owner_balance() {
    let mut staking_by_height = HashMap::new();
    staking_by_height.insert(
        100,
        StakingData {
            epoch: 10,
            escrows: vec![StakingEscrowEvent::Add(StakingAddEscrow {
                owner: "owner".to_string(),
                escrow: "validator".to_string(),
                amount: 500,
                new_shares: 50,
            })],
            ..Default::default()
        },
    );
    staking_by_height.insert(
        101,
        StakingData {
            epoch: 10,
            escrows: vec![StakingEscrowEvent::DebondingStart(StakingDebondingStart {
                escrow: "validator".to_string(),
                owner: "owner".to_string(),
                amount: 500,
                active_shares: 50,
                debonding_shares: 50,
                debond_end_time: 24,
            })],
            ..Default::default()
        },
    );
    staking_by_height.insert(
        102,
        StakingData {
            epoch: 24,
            escrows: vec![StakingEscrowEvent::Reclaim(StakingReclaimEscrow {
                owner: "owner".to_string(),
                escrow: "validator".to_string(),
                amount: 500,
                shares: 50,
            })],
            ..Default::default()
        },
    );

    let source: Arc<dyn ConsensusSource> = Arc::new(ScriptedSource {
        staking_by_height: Mutex::new(staking_by_height),
        served_up_to: 102,
    });
    let factory = QueryFactory::consensus("testnet");
    let extractors = consensus_extractors(source, Arc::new(NoopCodec), None, factory, "consensus");

    let target = Arc::new(RecordingTarget {
        cursor: Mutex::new(None),
        applied: Mutex::new(Vec::new()),
        fail_heights: vec![],
    });

    chain_ingest::cursor_loop::run(
        AnalyzerIdentity::consensus("testnet"),
        Range { from: 100, to: Some(102) },
        extractors,
        Arc::clone(&target) as Arc<dyn Target>,
        Backoff::new(std::time::Duration::from_millis(1), std::time::Duration::from_millis(5)).unwrap(),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    let applied = target.applied.lock().unwrap();
    let debonding_inserts = applied.iter().filter(|s| s.sql.contains("INSERT INTO staking_debonding_delegation")).count();
    let debonding_deletes = applied.iter().filter(|s| s.sql.contains("DELETE FROM staking_debonding_delegation")).count();
    assert_eq!(debonding_inserts, 1);
    assert_eq!(debonding_deletes, 1);
    assert_eq!(target.cursor.lock().unwrap().unwrap(), 102);
}
