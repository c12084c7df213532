//! The `Extractor` contract shared by every consensus and runtime domain
//! extractor (spec §4.3, §4.4).
//!
//! Grounded in the prior codebase's `Extractor` trait
//! (`etl/extractor/mod.rs`: `extract()`/`is_finished()`), narrowed to this
//! crate's shape: one extractor call always produces exactly one height's
//! worth of statements (`Batch`), never a stream, since spec's fan-out is
//! per-height rather than per-range.

pub mod consensus;
pub mod runtime;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::batch::Batch;
use crate::errors::IngestError;

/// One domain slice of one height. The coordinator (`coordinator.rs`) holds
/// a fixed, ordered `Vec<Arc<dyn Extractor>>` per analyzer kind and spawns
/// one task per extractor for every height.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Fetches this extractor's domain data for `height` and folds it into
    /// a freshly created `Batch`. Must observe `cancel` at its source call
    /// (via `source::cancellable`) so a sibling's failure is noticed
    /// promptly rather than only after this extractor's own work completes.
    async fn extract(&self, height: u64, cancel: CancellationToken) -> Result<Batch, IngestError>;

    fn name(&self) -> &str;
}
