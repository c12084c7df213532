//! The per-analyzer ingestion loop (spec §4.1).
//!
//! Shaped like the prior codebase's `run()` ETL loop in `lib.rs` — bootstrap,
//! then an unbounded `loop { ... }` driven by a height counter and a
//! `Backoff` — but trimmed to exactly the state machine spec §4.1
//! describes: no gRPC/HTTP server wiring here, just cursor recovery, range
//! control, and backoff/retry/terminate.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::backoff::Backoff;
use crate::config::Range;
use crate::coordinator::process_height;
use crate::errors::IngestError;
use crate::extractor::Extractor;
use crate::metrics;
use crate::target::{AnalyzerIdentity, Target};

/// Runs one analyzer's ingestion loop to completion. Returns normally both
/// on `OutOfRange` and on hitting the top of a closed range — both are
/// success from the caller's point of view (spec §4.1 step 3).
///
/// `shutdown` lets the host ask the loop to stop between heights without
/// waiting for `OutOfRange`; it is not part of the per-height cancellation
/// model (`coordinator::process_height` owns its own token per call).
pub async fn run(
    identity: AnalyzerIdentity,
    range: Range,
    extractors: Vec<Arc<dyn Extractor>>,
    target: Arc<dyn Target>,
    mut backoff: Backoff,
    shutdown: CancellationToken,
) -> Result<(), IngestError> {
    let mut height = bootstrap(&identity, &range, target.as_ref()).await?;

    tracing::info!(
        target: "chain_ingest::cursor_loop",
        analyzer = %identity.name,
        chain_id = %identity.chain_id,
        start_height = height,
        "ingestion loop starting"
    );

    while range.contains(height) {
        if shutdown.is_cancelled() {
            tracing::info!(target: "chain_ingest::cursor_loop", analyzer = %identity.name, height, "shutdown requested, stopping");
            return Ok(());
        }

        match process_height(height, &identity, &extractors, target.as_ref()).await {
            Ok(()) => {
                backoff.reset();
                height += 1;
            }
            Err(err) if err.is_out_of_range() => {
                tracing::info!(
                    target: "chain_ingest::cursor_loop",
                    analyzer = %identity.name,
                    height,
                    "source exhausted, terminating normally"
                );
                return Ok(());
            }
            Err(err) => {
                tracing::warn!(
                    target: "chain_ingest::cursor_loop",
                    analyzer = %identity.name,
                    height,
                    error = %err,
                    "height failed, backing off"
                );
                let wait_start = std::time::Instant::now();
                backoff.wait().await;
                metrics::backoff_wait(&identity.name, wait_start.elapsed());
            }
        }
    }

    tracing::info!(target: "chain_ingest::cursor_loop", analyzer = %identity.name, height, "reached top of closed range");
    Ok(())
}

/// Spec §4.1 step 1: NoRow starts at `range.from`; a committed cursor
/// starts at `latest + 1`; any other bootstrap error terminates the loop
/// without retry (there is no analyzer to recover a broken cursor read).
async fn bootstrap(identity: &AnalyzerIdentity, range: &Range, target: &dyn Target) -> Result<u64, IngestError> {
    match target.cursor(identity).await {
        Ok(latest) => Ok(latest + 1),
        Err(IngestError::NoRow) => Ok(range.from),
        Err(other) => {
            tracing::error!(
                target: "chain_ingest::cursor_loop",
                analyzer = %identity.name,
                error = %other,
                "cursor bootstrap failed, terminating"
            );
            Err(other)
        }
    }
}
