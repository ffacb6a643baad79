//! In-process executor that echoes bound rows back as a result set

use bytes::Bytes;

use crate::binding::BindSnapshot;
use crate::constants::RemoteType;
use crate::error::Result;
use crate::row::ColumnInfo;

use super::{ExecuteResponse, Executor};

/// Executor that serializes each snapshot, parses it back, and returns the
/// parsed rows as columns `C1..Cn`
///
/// Every submitted frame is kept so callers can inspect exactly what would
/// have been sent.
#[derive(Debug, Default)]
pub struct LoopbackExecutor {
    frames: Vec<Bytes>,
    statements: Vec<String>,
}

impl LoopbackExecutor {
    /// Create an executor with no recorded frames
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames submitted so far, oldest first
    pub fn frames(&self) -> &[Bytes] {
        &self.frames
    }

    /// SQL text submitted so far, oldest first
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Number of executions
    pub fn execution_count(&self) -> usize {
        self.frames.len()
    }
}

#[async_trait::async_trait]
impl Executor for LoopbackExecutor {
    async fn execute(&mut self, sql: &str, binds: &BindSnapshot) -> Result<ExecuteResponse> {
        let frame = binds.to_bytes()?;
        tracing::debug!(
            sql = sql,
            rows = binds.row_count(),
            bytes = frame.len(),
            "loopback execute"
        );

        self.frames.push(frame.clone());
        self.statements.push(sql.to_string());

        let parsed = BindSnapshot::from_bytes(frame)?;
        let columns = (0..parsed.column_count())
            .map(|i| {
                let remote_type = parsed
                    .rows()
                    .first()
                    .and_then(|row| row.get(i))
                    .map(|cell| cell.remote_type())
                    .unwrap_or(RemoteType::NUMBER);
                ColumnInfo::new(format!("C{}", i + 1), remote_type)
            })
            .collect();
        let rows = parsed.into_rows();

        Ok(ExecuteResponse {
            row_counts: vec![1; rows.len()],
            columns,
            rows,
        })
    }
}
