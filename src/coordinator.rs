//! The batch coordinator: `process_height` (spec §4.2).
//!
//! Fans a height out across a fixed, ordered extractor set, using
//! `tokio::task::JoinSet` the way the prior codebase's composite extractors
//! spawn sibling work, plus a `CancellationToken` for first-error
//! cancellation (spec §5). Extractor order never affects the merged batch's
//! *correctness* (spec §4.2's commutativity requirement) — it is preserved
//! anyway, for reproducible logs and tests.

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::batch::Batch;
use crate::errors::IngestError;
use crate::extractor::Extractor;
use crate::metrics;
use crate::target::{cursor_statement, AnalyzerIdentity, Target};

pub async fn process_height(
    height: u64,
    identity: &AnalyzerIdentity,
    extractors: &[Arc<dyn Extractor>],
    target: &dyn Target,
) -> Result<(), IngestError> {
    let token = CancellationToken::new();
    let mut set: JoinSet<(usize, Result<Batch, IngestError>)> = JoinSet::new();

    for (index, extractor) in extractors.iter().cloned().enumerate() {
        let token = token.clone();
        set.spawn(async move {
            let result = extractor.extract(height, token).await;
            (index, result)
        });
    }

    let mut slots: Vec<Option<Batch>> = (0..extractors.len()).map(|_| None).collect();
    let mut first_error: Option<IngestError> = None;

    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, Ok(batch))) => slots[index] = Some(batch),
            Ok((_, Err(IngestError::Cancelled))) => {}
            Ok((index, Err(err))) => {
                tracing::warn!(
                    target: "chain_ingest::coordinator",
                    analyzer = %identity.name,
                    height,
                    extractor = extractors[index].name(),
                    error = %err,
                    "extractor failed, cancelling siblings"
                );
                token.cancel();
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
            Err(join_err) => {
                token.cancel();
                if first_error.is_none() {
                    first_error = Some(IngestError::TransientSource(anyhow::anyhow!(
                        "extractor task panicked: {join_err}"
                    )));
                }
            }
        }
    }

    if let Some(err) = first_error {
        return Err(err);
    }

    let mut batch = Batch::new();
    for slot in slots {
        let extractor_batch = slot.expect("no error path leaves a slot empty");
        batch.merge(extractor_batch);
    }
    batch.push(cursor_statement(identity, height));

    let start = Instant::now();
    let result = target.submit(batch).await;
    metrics::submit_duration(&identity.name, start.elapsed());

    match result {
        Ok(()) => {
            metrics::height_success(&identity.name);
            metrics::cursor_height(&identity.name, height);
            Ok(())
        }
        Err(err) => {
            metrics::height_failure(&identity.name);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{Param, Statement};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FixedExtractor {
        name: String,
        statement: String,
    }

    #[async_trait]
    impl Extractor for FixedExtractor {
        async fn extract(&self, height: u64, _cancel: CancellationToken) -> Result<Batch, IngestError> {
            let mut batch = Batch::new();
            batch.push(Statement::new(self.statement.clone(), vec![Param::from(height)]));
            Ok(batch)
        }
        fn name(&self) -> &str {
            &self.name
        }
    }

    struct FailingExtractor {
        name: String,
    }

    #[async_trait]
    impl Extractor for FailingExtractor {
        async fn extract(&self, _height: u64, cancel: CancellationToken) -> Result<Batch, IngestError> {
            tokio::select! {
                () = cancel.cancelled() => Err(IngestError::Cancelled),
                () = tokio::time::sleep(std::time::Duration::from_millis(50)) => {
                    Err(IngestError::TransientSource(anyhow::anyhow!("boom")))
                }
            }
        }
        fn name(&self) -> &str {
            &self.name
        }
    }

    struct SlowCancellableExtractor {
        name: String,
        observed_cancel: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Extractor for SlowCancellableExtractor {
        async fn extract(&self, _height: u64, cancel: CancellationToken) -> Result<Batch, IngestError> {
            tokio::select! {
                () = cancel.cancelled() => {
                    self.observed_cancel.fetch_add(1, Ordering::SeqCst);
                    Err(IngestError::Cancelled)
                }
                () = tokio::time::sleep(std::time::Duration::from_secs(10)) => {
                    Ok(Batch::new())
                }
            }
        }
        fn name(&self) -> &str {
            &self.name
        }
    }

    struct RecordingTarget {
        submitted: Mutex<Vec<Batch>>,
        fail: bool,
    }

    #[async_trait]
    impl Target for RecordingTarget {
        async fn submit(&self, batch: Batch) -> Result<(), IngestError> {
            if self.fail {
                return Err(IngestError::TransientTarget(anyhow::anyhow!("submit failed")));
            }
            self.submitted.lock().unwrap().push(batch);
            Ok(())
        }
        async fn cursor(&self, _identity: &AnalyzerIdentity) -> Result<u64, IngestError> {
            Err(IngestError::NoRow)
        }
        fn name(&self) -> &str {
            "recording"
        }
    }

    #[tokio::test]
    async fn merges_extractor_batches_in_order_plus_cursor_statement() {
        let identity = AnalyzerIdentity::consensus("testnet");
        let extractors: Vec<Arc<dyn Extractor>> = vec![
            Arc::new(FixedExtractor {
                name: "a".to_string(),
                statement: "INSERT INTO a VALUES (?)".to_string(),
            }),
            Arc::new(FixedExtractor {
                name: "b".to_string(),
                statement: "INSERT INTO b VALUES (?)".to_string(),
            }),
        ];
        let target = RecordingTarget {
            submitted: Mutex::new(Vec::new()),
            fail: false,
        };

        process_height(10, &identity, &extractors, &target).await.unwrap();

        let submitted = target.submitted.lock().unwrap();
        let batch = &submitted[0];
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.statements()[0].sql, "INSERT INTO a VALUES (?)");
        assert_eq!(batch.statements()[1].sql, "INSERT INTO b VALUES (?)");
        assert!(batch.statements()[2].sql.contains("ingest_cursor"));
    }

    #[tokio::test]
    async fn first_failure_cancels_siblings_and_discards_batch() {
        let identity = AnalyzerIdentity::consensus("testnet");
        let observed = Arc::new(AtomicUsize::new(0));
        let extractors: Vec<Arc<dyn Extractor>> = vec![
            Arc::new(FailingExtractor { name: "f".to_string() }),
            Arc::new(SlowCancellableExtractor {
                name: "s".to_string(),
                observed_cancel: Arc::clone(&observed),
            }),
        ];
        let target = RecordingTarget {
            submitted: Mutex::new(Vec::new()),
            fail: false,
        };

        let result = process_height(10, &identity, &extractors, &target).await;
        assert!(result.is_err());
        assert!(target.submitted.lock().unwrap().is_empty());
        assert_eq!(observed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn submit_failure_propagates_and_counts() {
        let identity = AnalyzerIdentity::consensus("testnet");
        let extractors: Vec<Arc<dyn Extractor>> = vec![Arc::new(FixedExtractor {
            name: "a".to_string(),
            statement: "INSERT INTO a VALUES (?)".to_string(),
        })];
        let target = RecordingTarget {
            submitted: Mutex::new(Vec::new()),
            fail: true,
        };

        let result = process_height(10, &identity, &extractors, &target).await;
        assert!(matches!(result, Err(IngestError::TransientTarget(_))));
    }
}
