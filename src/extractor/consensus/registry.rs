//! Registry extractor (spec §4.3): runtime/entity/node state plus the
//! periodic entity-metadata side channel.
//!
//! Grounded in `original_source/analyzer/consensus/consensus.go`'s
//! `queueRuntimeRegistrations`, `queueRuntimeStatusUpdates`,
//! `queueEntityEvents`, `queueNodeEvents`, `queueMetadataRegistry`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::batch::Batch;
use crate::errors::IngestError;
use crate::extractor::Extractor;
use crate::metadata_registry::{fetch_and_queue, should_fetch};
use crate::query_factory::QueryFactory;
use crate::source::{cancellable, ConsensusSource, MetadataRegistry};

pub struct RegistryExtractor {
    source: Arc<dyn ConsensusSource>,
    metadata_registry: Option<Arc<dyn MetadataRegistry>>,
    factory: QueryFactory,
}

impl RegistryExtractor {
    pub fn new(source: Arc<dyn ConsensusSource>, metadata_registry: Option<Arc<dyn MetadataRegistry>>, factory: QueryFactory) -> Self {
        Self {
            source,
            metadata_registry,
            factory,
        }
    }
}

#[async_trait]
impl Extractor for RegistryExtractor {
    async fn extract(&self, height: u64, cancel: CancellationToken) -> Result<Batch, IngestError> {
        let source = Arc::clone(&self.source);
        let data = cancellable(&cancel, async move { source.registry_data(height).await }).await?;

        let mut batch = Batch::new();

        for runtime in &data.runtime_events {
            batch.push(self.factory.upsert_runtime(
                &runtime.id,
                &runtime.kind,
                &runtime.tee_hardware,
                runtime.key_manager.as_deref(),
            ));
        }

        for runtime_id in &data.runtime_suspensions {
            batch.push(self.factory.set_runtime_suspended(runtime_id, true));
        }
        for runtime_id in &data.runtime_unsuspensions {
            batch.push(self.factory.set_runtime_suspended(runtime_id, false));
        }

        for entity in &data.entity_events {
            for node_id in &entity.nodes {
                batch.push(self.factory.insert_claimed_node(&entity.id, node_id));
            }
            batch.push(self.factory.insert_entity(&entity.id, &entity.staking_address));
        }

        for node in &data.node_events {
            if node.is_registration {
                let tls = QueryFactory::format_address_list(&node.addresses.tls);
                let p2p = QueryFactory::format_address_list(&node.addresses.p2p);
                let consensus = QueryFactory::format_consensus_addresses(&node.addresses.consensus);
                batch.push(self.factory.upsert_node(
                    &node.id,
                    &node.entity_id,
                    &node.software_version,
                    node.vrf_pubkey.as_deref().unwrap_or(""),
                    json!(node.roles),
                    &tls,
                    &p2p,
                    &consensus,
                ));
            } else {
                batch.push(self.factory.delete_node(&node.id));
            }
        }

        for unfrozen in &data.node_unfrozen_events {
            batch.push(self.factory.unfreeze_node(&unfrozen.node_id));
        }

        if should_fetch(height) {
            if let Some(registry) = &self.metadata_registry {
                fetch_and_queue(registry.as_ref(), &self.factory, &mut batch).await?;
            }
        }

        Ok(batch)
    }

    fn name(&self) -> &str {
        "consensus.registry"
    }
}
