//! CLI configuration, loaded once at process start.
//!
//! Shaped like the prior codebase's per-binary `Config` (`bins/torii-erc20/src/config.rs`):
//! a `clap::Parser` derive struct with `#[arg(long, env = "...")]` so every
//! field can come from a flag or an environment variable. Validation
//! (backoff bounds, range bounds) happens in `try_into_analyzers`, which
//! returns `IngestError::Config` rather than panicking — a malformed flag
//! must not abort a long-running service at startup time.

use std::time::Duration;

use clap::Parser;

use crate::backoff::Backoff;
use crate::errors::IngestError;
use crate::target::AnalyzerIdentity;

#[derive(Debug, Clone)]
pub struct Range {
    pub from: u64,
    /// `None` means open-ended — the loop runs until the source returns
    /// `OutOfRange` (spec §3, §8).
    pub to: Option<u64>,
}

impl Range {
    pub fn contains(&self, height: u64) -> bool {
        match self.to {
            Some(to) => height <= to,
            None => true,
        }
    }
}

/// One analyzer's slice of the top-level config (spec §6's recognized
/// environment): `chain_id`, `chain_context`, `rpc_endpoint`, the height
/// range, an optional fixed poll `interval`, and — for runtime analyzers
/// only — a `runtime_id`.
#[derive(Debug, Clone, Parser)]
pub struct AnalyzerConfig {
    #[arg(long, env = "CHAIN_ID")]
    pub chain_id: String,

    #[arg(long, env = "CHAIN_CONTEXT", default_value = "")]
    pub chain_context: String,

    #[arg(long, env = "RPC_ENDPOINT")]
    pub rpc_endpoint: String,

    #[arg(long, env = "FROM_HEIGHT", default_value_t = 0)]
    pub from_height: u64,

    /// 0 means open-ended, matching spec §6's `to_height (0 = open)`.
    #[arg(long, env = "TO_HEIGHT", default_value_t = 0)]
    pub to_height: u64,

    #[arg(long, env = "INTERVAL_MS")]
    pub interval_ms: Option<u64>,

    #[arg(long, env = "RUNTIME_ID")]
    pub runtime_id: Option<String>,

    #[arg(long, env = "ANALYZER_NAME", default_value = "consensus")]
    pub analyzer_name: String,
}

impl AnalyzerConfig {
    pub fn identity(&self) -> AnalyzerIdentity {
        match &self.runtime_id {
            Some(runtime_id) => AnalyzerIdentity::runtime(self.chain_id.clone(), runtime_id.clone(), self.analyzer_name.clone()),
            None => AnalyzerIdentity::consensus(self.chain_id.clone()),
        }
    }

    pub fn range(&self) -> Range {
        Range {
            from: self.from_height,
            to: if self.to_height == 0 { None } else { Some(self.to_height) },
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval_ms.map(Duration::from_millis)
    }

    pub fn backoff(&self) -> Result<Backoff, IngestError> {
        Backoff::new(Duration::from_millis(100), Duration::from_secs(6))
    }
}

/// Top-level process configuration: one consensus analyzer, zero or more
/// runtime analyzers sharing a target.
#[derive(Debug, Clone, Parser)]
#[command(name = "chain-ingest", about = "Block-ingestion core for a layered chain indexer")]
pub struct Config {
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    #[command(flatten)]
    pub consensus: AnalyzerConfig,

    /// Comma-separated `runtime_id` list. An `AnalyzerConfig` is derived for
    /// each, reusing the consensus analyzer's endpoint/range/interval unless
    /// overridden by environment — kept deliberately simple, matching the
    /// prior codebase's single-config-per-process binaries rather than
    /// inventing a richer multi-runtime config file format.
    #[arg(long, env = "RUNTIME_IDS", value_delimiter = ',')]
    pub runtime_ids: Vec<String>,
}

impl Config {
    pub fn try_into_analyzers(self) -> Result<(AnalyzerConfig, Vec<AnalyzerConfig>), IngestError> {
        self.consensus.backoff()?;

        let mut runtimes = Vec::with_capacity(self.runtime_ids.len());
        for runtime_id in &self.runtime_ids {
            if runtime_id.trim().is_empty() {
                return Err(IngestError::Config("empty runtime_id in RUNTIME_IDS".to_string()));
            }
            let mut runtime_config = self.consensus.clone();
            runtime_config.runtime_id = Some(runtime_id.clone());
            runtime_config.analyzer_name = "runtime".to_string();
            runtime_config.backoff()?;
            runtimes.push(runtime_config);
        }

        Ok((self.consensus, runtimes))
    }
}
