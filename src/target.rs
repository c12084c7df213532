//! The target contract: an atomic-batch-apply sink plus cursor storage.
//!
//! Grounded in the prior codebase's `torii-sql-sink` (`DbBackend` enum,
//! `sqlx::QueryBuilder`) and `etl/engine_db.rs` (cursor-like extractor-state
//! persistence via `get_extractor_state`/`set_extractor_state`), generalized
//! from Starknet-specific tables to the analyzer-identity-scoped cursor
//! table spec §3/§6 requires.

use async_trait::async_trait;
use sqlx::any::{install_default_drivers, AnyPoolOptions};
use sqlx::AnyPool;

use crate::batch::{Batch, Param, Statement};
use crate::errors::IngestError;

/// One analyzer's identity as stored in the cursor table (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnalyzerIdentity {
    pub chain_id: String,
    pub runtime_id: Option<String>,
    pub name: String,
}

impl AnalyzerIdentity {
    pub fn consensus(chain_id: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            runtime_id: None,
            name: "consensus".to_string(),
        }
    }

    pub fn runtime(chain_id: impl Into<String>, runtime_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            runtime_id: Some(runtime_id.into()),
            name: name.into(),
        }
    }
}

/// Applies batches atomically and serves the cursor read the loop bootstraps
/// from (spec §4.1, §6). One `Target` instance is shared across every
/// analyzer's loop — implementations must be `Send + Sync`.
#[async_trait]
pub trait Target: Send + Sync {
    /// Applies every statement in `batch` as a single transaction. All or
    /// nothing — a mid-batch failure must leave no partial row behind.
    async fn submit(&self, batch: Batch) -> Result<(), IngestError>;

    /// Returns the last committed height/round for `identity`, or
    /// `IngestError::NoRow` when no cursor row exists yet.
    async fn cursor(&self, identity: &AnalyzerIdentity) -> Result<u64, IngestError>;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DbBackend {
    Sqlite,
    Postgres,
}

impl DbBackend {
    fn from_url(url: &str) -> Self {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            DbBackend::Postgres
        } else {
            DbBackend::Sqlite
        }
    }

    /// `$1`-style binds on postgres, `?`-style on sqlite — matches the
    /// prior codebase's per-backend placeholder handling in `torii-sql-sink`.
    fn bind_placeholder(self, index: usize) -> String {
        match self {
            DbBackend::Postgres => format!("${index}"),
            DbBackend::Sqlite => "?".to_string(),
        }
    }
}

const CURSOR_SCHEMA_SQLITE: &str = r"
CREATE TABLE IF NOT EXISTS ingest_cursor (
    chain_id TEXT NOT NULL,
    runtime_id TEXT NOT NULL DEFAULT '',
    analyzer_name TEXT NOT NULL,
    height INTEGER NOT NULL,
    PRIMARY KEY (chain_id, runtime_id, analyzer_name)
);
";

const CURSOR_SCHEMA_POSTGRES: &str = r"
CREATE TABLE IF NOT EXISTS ingest_cursor (
    chain_id TEXT NOT NULL,
    runtime_id TEXT NOT NULL DEFAULT '',
    analyzer_name TEXT NOT NULL,
    height BIGINT NOT NULL,
    PRIMARY KEY (chain_id, runtime_id, analyzer_name)
);
";

/// `sqlx::AnyPool`-backed target, sqlite or postgres depending on the
/// connection URL's scheme (mirrors `torii-sql-sink::DbBackend::from_url`).
pub struct SqlTarget {
    pool: AnyPool,
    backend: DbBackend,
}

impl SqlTarget {
    pub async fn connect(database_url: &str) -> Result<Self, IngestError> {
        install_default_drivers();
        let backend = DbBackend::from_url(database_url);
        let pool = AnyPoolOptions::new()
            .max_connections(8)
            .connect(database_url)
            .await
            .map_err(|e| IngestError::TransientTarget(e.into()))?;

        let schema = match backend {
            DbBackend::Sqlite => CURSOR_SCHEMA_SQLITE,
            DbBackend::Postgres => CURSOR_SCHEMA_POSTGRES,
        };
        sqlx::query(schema)
            .execute(&pool)
            .await
            .map_err(|e| IngestError::TransientTarget(e.into()))?;

        Ok(Self { pool, backend })
    }

    /// Rewrites `?`-placeholder statements onto postgres `$n` placeholders
    /// when the pool backend is postgres; sqlite statements pass through
    /// unchanged. The query factory always emits `?`-style SQL (spec §4.6).
    fn rebind(&self, sql: &str) -> String {
        if self.backend == DbBackend::Sqlite {
            return sql.to_string();
        }
        let mut out = String::with_capacity(sql.len());
        let mut index = 0usize;
        for ch in sql.chars() {
            if ch == '?' {
                index += 1;
                out.push_str(&self.backend.bind_placeholder(index));
            } else {
                out.push(ch);
            }
        }
        out
    }
}

/// Binds one parameter, widening `U64` to the driver's signed column type.
/// Spec §4.3 requires a `U64` value too large for `i64` to surface as an
/// error rather than silently wrap to a negative number (matches the
/// overflow check extractors already apply to staking amounts).
fn bind_param<'q>(
    query: sqlx::query::Query<'q, sqlx::Any, sqlx::any::AnyArguments<'q>>,
    param: &Param,
) -> Result<sqlx::query::Query<'q, sqlx::Any, sqlx::any::AnyArguments<'q>>, IngestError> {
    let bound = match param {
        Param::Null => query.bind(None::<String>),
        Param::Bool(v) => query.bind(*v),
        Param::I64(v) => query.bind(*v),
        Param::U64(v) => {
            let widened = i64::try_from(*v)
                .map_err(|_| IngestError::DecodeBody(anyhow::anyhow!("value {v} overflows i64 at bind time")))?;
            query.bind(widened)
        }
        Param::Text(v) => query.bind(v.clone()),
        Param::Json(v) => query.bind(v.to_string()),
        Param::Bytes(v) => query.bind(v.clone()),
    };
    Ok(bound)
}

#[async_trait]
impl Target for SqlTarget {
    async fn submit(&self, batch: Batch) -> Result<(), IngestError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| IngestError::TransientTarget(e.into()))?;

        for Statement { sql, params } in batch.into_statements() {
            let rebound = self.rebind(&sql);
            let mut query = sqlx::query(&rebound);
            for param in &params {
                query = bind_param(query, param)?;
            }
            query
                .execute(&mut *tx)
                .await
                .map_err(|e| IngestError::TransientTarget(e.into()))?;
        }

        tx.commit()
            .await
            .map_err(|e| IngestError::TransientTarget(e.into()))?;
        Ok(())
    }

    async fn cursor(&self, identity: &AnalyzerIdentity) -> Result<u64, IngestError> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT height FROM ingest_cursor WHERE chain_id = ? AND runtime_id = ? AND analyzer_name = ?",
        )
        .bind(&identity.chain_id)
        .bind(identity.runtime_id.clone().unwrap_or_default())
        .bind(&identity.name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| IngestError::TransientTarget(e.into()))?;

        match row {
            Some((height,)) => Ok(height as u64),
            None => Err(IngestError::NoRow),
        }
    }

    fn name(&self) -> &str {
        "sql"
    }
}

/// Builds the cursor-advance statement the coordinator appends to every
/// height's batch (spec §4.2 step 4) — written with the query factory's
/// always-`?`-placeholder convention, rebound per-backend by the target.
pub fn cursor_statement(identity: &AnalyzerIdentity, height: u64) -> Statement {
    Statement::new(
        "INSERT INTO ingest_cursor (chain_id, runtime_id, analyzer_name, height) \
         VALUES (?, ?, ?, ?) \
         ON CONFLICT (chain_id, runtime_id, analyzer_name) DO UPDATE SET height = excluded.height",
        vec![
            Param::from(identity.chain_id.clone()),
            Param::from(identity.runtime_id.clone().unwrap_or_default()),
            Param::from(identity.name.clone()),
            Param::from(height),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_detection() {
        assert_eq!(DbBackend::from_url("sqlite::memory:"), DbBackend::Sqlite);
        assert_eq!(DbBackend::from_url("postgres://localhost/db"), DbBackend::Postgres);
    }

    #[tokio::test]
    async fn bootstraps_no_row_then_commits_cursor() {
        let target = SqlTarget::connect("sqlite::memory:").await.unwrap();
        let identity = AnalyzerIdentity::consensus("test-chain");

        let err = target.cursor(&identity).await.unwrap_err();
        assert!(matches!(err, IngestError::NoRow));

        let mut batch = Batch::new();
        batch.push(cursor_statement(&identity, 100));
        target.submit(batch).await.unwrap();

        assert_eq!(target.cursor(&identity).await.unwrap(), 100);
    }

    #[tokio::test]
    async fn submit_rejects_u64_overflowing_i64() {
        let target = SqlTarget::connect("sqlite::memory:").await.unwrap();
        sqlx::query("CREATE TABLE t (x INTEGER)")
            .execute(&target.pool)
            .await
            .unwrap();

        let mut batch = Batch::new();
        batch.push(Statement::new("INSERT INTO t VALUES (?)", vec![Param::U64(u64::MAX)]));
        let err = target.submit(batch).await.unwrap_err();
        assert!(matches!(err, IngestError::DecodeBody(_)));

        let row: Option<(i64,)> = sqlx::query_as("SELECT x FROM t")
            .fetch_optional(&target.pool)
            .await
            .unwrap();
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn submit_is_all_or_nothing() {
        let target = SqlTarget::connect("sqlite::memory:").await.unwrap();
        sqlx::query("CREATE TABLE t (x INTEGER)")
            .execute(&target.pool)
            .await
            .unwrap();

        let mut batch = Batch::new();
        batch.push(Statement::new("INSERT INTO t VALUES (1)", vec![]));
        batch.push(Statement::new("INSERT INTO nonexistent_table VALUES (1)", vec![]));
        assert!(target.submit(batch).await.is_err());

        let row: Option<(i64,)> = sqlx::query_as("SELECT x FROM t")
            .fetch_optional(&target.pool)
            .await
            .unwrap();
        assert!(row.is_none());
    }
}
