//! Execution seam between the binding layer and a database transport
//!
//! The binding layer hands a [`BindSnapshot`] to an [`Executor`] and gets
//! back affected-row counts and, for queries, result cells tagged with their
//! remote types. Network transport and authentication live behind this trait.

mod loopback;

pub use loopback::LoopbackExecutor;

use crate::binding::BindSnapshot;
use crate::error::Result;
use crate::row::ColumnInfo;
use crate::wire::WireValue;

/// What an execution returns
#[derive(Debug, Clone, Default)]
pub struct ExecuteResponse {
    /// Rows affected per submitted parameter row
    pub row_counts: Vec<u64>,
    /// Result column metadata (empty for non-queries)
    pub columns: Vec<ColumnInfo>,
    /// Result cells, row-major
    pub rows: Vec<Vec<WireValue>>,
}

impl ExecuteResponse {
    /// Total rows affected
    pub fn total_rows_affected(&self) -> u64 {
        self.row_counts.iter().sum()
    }
}

/// Trait for execution back ends
#[async_trait::async_trait]
pub trait Executor: Send {
    /// Execute `sql` once per row of `binds`
    async fn execute(&mut self, sql: &str, binds: &BindSnapshot) -> Result<ExecuteResponse>;
}
