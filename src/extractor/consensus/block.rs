//! Block extractor (spec §4.3): block/state-root/epoch rows, per-transaction
//! processing with silent decode-skip, and a second, decode-independent pass
//! routing every result's events through the classifier.
//!
//! Grounded in the prior codebase's `BlockRangeExtractor` (`etl/extractor/block_range.rs`)
//! for the overall extractor shape, and in `original_source/analyzer/consensus/consensus.go`
//! (`queueBlockInserts`, `queueEpochInserts`, `queueTransactionInserts`,
//! `queueEventInserts`) for the exact fold — the original keeps transaction
//! inserts and event inserts as two separate passes over the same height's
//! data, which is why a failed `Open` only drops the transaction row, not
//! its events.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::batch::Batch;
use crate::errors::IngestError;
use crate::events::classify;
use crate::extractor::Extractor;
use crate::metrics;
use crate::query_factory::QueryFactory;
use crate::source::{cancellable, ConsensusSource, TransactionCodec};

pub struct BlockExtractor {
    source: Arc<dyn ConsensusSource>,
    codec: Arc<dyn TransactionCodec>,
    factory: QueryFactory,
    analyzer_name: String,
}

impl BlockExtractor {
    pub fn new(source: Arc<dyn ConsensusSource>, codec: Arc<dyn TransactionCodec>, factory: QueryFactory, analyzer_name: impl Into<String>) -> Self {
        Self {
            source,
            codec,
            factory,
            analyzer_name: analyzer_name.into(),
        }
    }
}

#[async_trait]
impl Extractor for BlockExtractor {
    async fn extract(&self, height: u64, cancel: CancellationToken) -> Result<Batch, IngestError> {
        let source = Arc::clone(&self.source);
        let data = cancellable(&cancel, async move { source.block_data(height).await }).await?;

        let mut batch = Batch::new();

        batch.push(self.factory.insert_block(
            data.header.height,
            &data.header.hash,
            &data.header.time.to_rfc3339(),
        ));
        batch.push(self.factory.insert_state_root(
            data.header.height,
            &data.header.state_root.namespace,
            data.header.state_root.version,
            &data.header.state_root.root_type,
            &data.header.state_root.hash,
        ));

        batch.push(self.factory.insert_epoch(data.epoch, data.header.height));
        batch.push(
            self.factory
                .close_previous_epoch(data.epoch.saturating_sub(1), data.header.height),
        );

        debug_assert_eq!(
            data.transactions.len(),
            data.results.len(),
            "transactions and results must be index-aligned"
        );

        for (index, (signed_tx, result)) in data.transactions.iter().zip(data.results.iter()).enumerate() {
            if let Ok(opened) = self.codec.open(&signed_tx.raw) {
                let error = result.error.as_ref();
                batch.push(self.factory.insert_transaction(
                    data.header.height,
                    index as u32,
                    &opened.hash,
                    opened.nonce,
                    &opened.method,
                    &opened.sender,
                    opened.fee_amount,
                    opened.fee_gas,
                    opened.body.clone(),
                    error.and_then(|e| e.module.as_deref()),
                    error.and_then(|e| e.code),
                    error.and_then(|e| e.message.as_deref()),
                ));
                batch.push(self.factory.set_account_nonce(&opened.sender, opened.nonce + 1));

                if opened.method == "staking.AmendCommissionSchedule" {
                    let schedule = opened
                        .body
                        .get("amendment")
                        .cloned()
                        .unwrap_or(opened.body.clone());
                    batch.push(self.factory.upsert_commission_schedule(&opened.sender, schedule));
                }
            } else {
                // Malformed on-chain entries must not stall ingestion
                // (spec §9); the single transaction is dropped. Its result's
                // events are still inserted below, independently of decode.
                metrics::tx_decode_skipped(&self.analyzer_name);
            }
        }

        // A separate pass over results (`queueEventInserts`): events are
        // attributed to the signed transaction's envelope hash regardless of
        // whether that transaction's body decoded.
        for (index, (signed_tx, result)) in data.transactions.iter().zip(data.results.iter()).enumerate() {
            for raw_event in &result.events {
                let classified = classify(raw_event)?;
                batch.push(self.factory.insert_event(
                    data.header.height,
                    Some(index as u32),
                    Some(&signed_tx.hash),
                    classified.backend,
                    classified.kind,
                    classified.body,
                ));
            }
        }

        Ok(batch)
    }

    fn name(&self) -> &str {
        "consensus.block"
    }
}
