//! Block-ingestion core for a layered chain indexer: a consensus analyzer
//! and zero or more runtime analyzers, each driving the loop in
//! [`cursor_loop`] over a [`coordinator::process_height`]-style per-height
//! fan-out.
//!
//! Mirrors the prior codebase's top-level `lib.rs` re-export surface
//! (`pub mod etl; pub use ...`), narrowed to this crate's modules — there is
//! no gRPC/HTTP surface here (spec §1's Non-goals), only the ingestion core
//! and the external contracts ([`source`], [`target`]) it is built against.

pub mod backoff;
pub mod batch;
pub mod config;
pub mod coordinator;
pub mod cursor_loop;
pub mod errors;
pub mod events;
pub mod extractor;
pub mod metadata_registry;
pub mod metrics;
pub mod query_factory;
pub mod source;
pub mod target;

pub use backoff::Backoff;
pub use batch::{Batch, Param, Statement};
pub use config::{AnalyzerConfig, Config, Range};
pub use errors::{IngestError, Result};
pub use extractor::Extractor;
pub use query_factory::QueryFactory;
pub use target::{AnalyzerIdentity, SqlTarget, Target};

use std::sync::Arc;

/// Assembles the fixed, ordered consensus extractor set (spec §4.2: "the
/// extractor set is fixed per analyzer kind").
pub fn consensus_extractors(
    source: Arc<dyn source::ConsensusSource>,
    codec: Arc<dyn source::TransactionCodec>,
    metadata_registry: Option<Arc<dyn source::MetadataRegistry>>,
    factory: QueryFactory,
    analyzer_name: impl Into<String>,
) -> Vec<Arc<dyn Extractor>> {
    let analyzer_name = analyzer_name.into();
    vec![
        Arc::new(extractor::consensus::block::BlockExtractor::new(
            Arc::clone(&source),
            codec,
            factory.clone(),
            analyzer_name,
        )),
        Arc::new(extractor::consensus::registry::RegistryExtractor::new(
            Arc::clone(&source),
            metadata_registry,
            factory.clone(),
        )),
        Arc::new(extractor::consensus::staking::StakingExtractor::new(
            Arc::clone(&source),
            factory.clone(),
        )),
        Arc::new(extractor::consensus::scheduler::SchedulerExtractor::new(
            Arc::clone(&source),
            factory.clone(),
        )),
        Arc::new(extractor::consensus::governance::GovernanceExtractor::new(source, factory)),
    ]
}

/// Assembles the fixed, ordered runtime extractor set: block plus the three
/// module handlers (spec §4.4). The runtime transaction extractor is
/// reserved for future work (spec §4.4) and is not part of this set.
pub fn runtime_extractors(source: Arc<dyn source::RuntimeSource>, factory: QueryFactory) -> Vec<Arc<dyn Extractor>> {
    vec![
        Arc::new(extractor::runtime::block::RuntimeBlockExtractor::new(
            Arc::clone(&source),
            factory.clone(),
        )),
        Arc::new(extractor::runtime::core::CoreExtractor::new(Arc::clone(&source), factory.clone())),
        Arc::new(extractor::runtime::accounts::AccountsExtractor::new(
            Arc::clone(&source),
            factory.clone(),
        )),
        Arc::new(extractor::runtime::consensus_accounts::ConsensusAccountsExtractor::new(source, factory)),
    ]
}
