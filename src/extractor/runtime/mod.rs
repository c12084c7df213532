//! Runtime-layer extractors (spec §4.4): block plus the three module
//! handlers (core, accounts, consensus-accounts). Each module handler
//! mirrors the prior codebase's `modules.ModuleHandler` shape
//! (`original_source/analyzer/emerald/emerald.go`'s `moduleHandlers` slice):
//! one typed source call per module, folded into the shared batch.
//!
//! The runtime transaction extractor spec §4.4 names is reserved for
//! future work and is intentionally not wired into the fixed extractor set
//! below — there is no module data to fold yet.

pub mod accounts;
pub mod block;
pub mod consensus_accounts;
pub mod core;
