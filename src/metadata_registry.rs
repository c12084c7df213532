//! Periodic external entity-metadata side channel (spec §4.3: "every 100
//! heights, additionally fetch the entity metadata registry").
//!
//! This is a side fetch, not a per-height source query — it shares the
//! registry extractor's cadence but not its failure semantics toward other
//! extractors: a failure here fails only the registry extractor's own
//! contribution to the height, same as any other `TransientSource` error.

use crate::batch::Batch;
use crate::errors::IngestError;
use crate::query_factory::QueryFactory;
use crate::source::MetadataRegistry;

/// Cadence from spec §4.3 — the registry extractor only calls out to the
/// metadata side channel on heights divisible by this value.
pub const METADATA_FETCH_INTERVAL: u64 = 100;

pub fn should_fetch(height: u64) -> bool {
    height % METADATA_FETCH_INTERVAL == 0
}

pub async fn fetch_and_queue(
    registry: &dyn MetadataRegistry,
    factory: &QueryFactory,
    batch: &mut Batch,
) -> Result<(), IngestError> {
    let entries = registry
        .fetch_all()
        .await
        .map_err(IngestError::TransientSource)?;

    for (entity_id, metadata) in entries {
        batch.push(factory.upsert_entity_metadata(&entity_id, metadata));
    }
    Ok(())
}
