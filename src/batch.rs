//! The per-height batch: an ordered, atomically-applied sequence of
//! parameterized statements.
//!
//! Mirrors the prior codebase's `QueryBuilder`-based inserts in
//! `torii-sql-sink`, but generalized so an extractor never touches a live
//! connection: it only appends `Statement`s to a local `Batch`, which the
//! coordinator merges and hands to the `Target` under one atomic apply
//! (spec §3, §5 — "each extractor must append to a local slice which the
//! coordinator merges before submit").

use serde_json::Value as Json;

/// A bound parameter value. Kept intentionally small and driver-agnostic —
/// a `Target` implementation maps these onto its driver's bind calls
/// (`sqlx::query(...).bind(...)` for the sqlite/postgres targets).
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Null,
    Bool(bool),
    I64(i64),
    /// Non-negative integers that may exceed `i64::MAX` (staking amounts,
    /// shares). Spec §4.3 requires overflow to surface as an error rather
    /// than silently wrap; callers widen into this variant explicitly.
    U64(u64),
    Text(String),
    Json(Json),
    Bytes(Vec<u8>),
}

impl From<bool> for Param {
    fn from(v: bool) -> Self {
        Param::Bool(v)
    }
}
impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Param::I64(v)
    }
}
impl From<u64> for Param {
    fn from(v: u64) -> Self {
        Param::U64(v)
    }
}
impl From<String> for Param {
    fn from(v: String) -> Self {
        Param::Text(v)
    }
}
impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Text(v.to_string())
    }
}
impl From<Json> for Param {
    fn from(v: Json) -> Self {
        Param::Json(v)
    }
}
impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(v: Option<T>) -> Self {
        v.map_or(Param::Null, Into::into)
    }
}

/// One parameterized statement produced by the query factory and queued by
/// an extractor. Values never flow into `sql` as text (spec §4.6).
#[derive(Debug, Clone)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Param>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// An ordered sequence of statements for one height/round.
///
/// Created empty at the start of `process_height`, populated by each
/// extractor's *own* `Batch` (appended to only by its owning task), then
/// merged by the coordinator in a fixed extractor order before submission.
/// Statement order across extractors is never semantically significant
/// (spec §3 invariant); only the order of statements *within* one
/// extractor's contribution is preserved.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    statements: Vec<Statement>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    /// Appends another extractor's statements, preserving their relative order.
    pub fn merge(&mut self, mut other: Batch) {
        self.statements.append(&mut other.statements);
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn into_statements(self) -> Vec<Statement> {
        self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
