//! Closed error tags for the ingestion core.
//!
//! Extractors and the query factory are free to use `anyhow::Error` with
//! `.context(...)` internally; at the coordinator boundary every failure is
//! mapped into one of these variants so the ingestion loop can match a
//! closed set (see `loop.rs`) instead of inspecting opaque error chains.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// The source does not serve the requested height/round. Terminal for the loop.
    #[error("height not served by source")]
    OutOfRange,

    /// No cursor row exists yet for this analyzer identity.
    #[error("no cursor row for analyzer")]
    NoRow,

    /// Any other source failure. Retried with backoff.
    #[error("transient source error: {0}")]
    TransientSource(#[source] anyhow::Error),

    /// Any other target failure. Retried with backoff.
    #[error("transient target error: {0}")]
    TransientTarget(#[source] anyhow::Error),

    /// The event classifier saw no nested arm set at some level.
    #[error("event classifier saw no populated arm: {0}")]
    DecodeEventUnknown(String),

    /// A signed transaction failed to open. Never surfaced to the loop —
    /// the extractor drops the single transaction and continues (see
    /// `extractor::consensus::block`) — kept here so a future caller that
    /// wants the count can match on it explicitly.
    #[error("signed transaction could not be opened")]
    DecodeTransaction,

    /// Body decoding (e.g. a commission schedule) failed inside an extractor.
    #[error("body decode failed: {0}")]
    DecodeBody(#[source] anyhow::Error),

    /// Bad backoff bounds, unparseable interval, or other construction-time
    /// configuration problem. Fails construction, never returned mid-loop.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Internal only: an extractor observed the per-height cancellation
    /// token after a sibling already failed, and aborted its own source
    /// call early. The coordinator (`coordinator::process_height`) filters
    /// this out in favor of the sibling's real error; it never reaches the
    /// ingestion loop.
    #[error("cancelled by sibling failure")]
    Cancelled,
}

impl IngestError {
    /// True when the ingestion loop should terminate normally rather than retry.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, IngestError::OutOfRange)
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
