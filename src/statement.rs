//! SQL statements and prepared statement binding
//!
//! [`Statement`] scans SQL text for its type and parameter markers.
//! [`PreparedStatement`] pairs a statement with a [`BindingSet`] and an
//! [`Executor`], exposing the typed setters and execute calls.
//!
//! # Example
//!
//! ```rust
//! use flakebind::{LoopbackExecutor, PreparedStatement};
//!
//! # async fn example() -> flakebind::Result<()> {
//! let mut stmt = PreparedStatement::new(LoopbackExecutor::new(), "SELECT ?")?;
//! stmt.set_i32(1, -1)?;
//! let mut rs = stmt.execute_query().await?;
//! assert!(rs.next());
//! assert_eq!(rs.get_i32("C1")?, Some(-1));
//! assert!(!rs.was_null());
//! # Ok(())
//! # }
//! ```

use chrono::NaiveTime;

use crate::binding::BindingSet;
use crate::config::CodecConfig;
use crate::constants::{RemoteType, SqlType, MAX_PARAMETERS};
use crate::encoder::decimal_remote_type;
use crate::error::{Error, Result};
use crate::row::ResultSet;
use crate::temporal::CalendarContext;
use crate::transport::Executor;
use crate::types::Number;
use crate::value::NativeValue;

/// Statement type determined by parsing the SQL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatementType {
    /// Unknown or unparsed statement
    #[default]
    Unknown,
    /// SELECT query
    Query,
    /// DML: INSERT, UPDATE, DELETE, MERGE
    Dml,
    /// DDL: CREATE, ALTER, DROP, etc.
    Ddl,
    /// Procedure call or anonymous block
    Call,
}

/// A parameter marker found in SQL text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamMarker {
    /// `?`, numbered by order of appearance
    Positional(usize),
    /// `:N`
    Numbered(usize),
}

impl ParamMarker {
    /// 1-based parameter position the marker refers to
    pub fn position(&self) -> usize {
        match self {
            ParamMarker::Positional(n) | ParamMarker::Numbered(n) => *n,
        }
    }
}

/// A parsed SQL statement
#[derive(Debug, Clone)]
pub struct Statement {
    /// SQL text as given
    sql: String,
    /// Statement type
    statement_type: StatementType,
    /// Parameter markers in order of appearance
    markers: Vec<ParamMarker>,
}

impl Statement {
    /// Parse SQL text
    ///
    /// Fails with `ParameterLimitExceeded` if a marker refers to a position
    /// beyond [`MAX_PARAMETERS`].
    pub fn new(sql: impl Into<String>) -> Result<Self> {
        let sql = sql.into();
        let mut stmt = Self {
            sql,
            statement_type: StatementType::Unknown,
            markers: Vec::new(),
        };
        stmt.parse()?;
        Ok(stmt)
    }

    /// Get the SQL text
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Get the statement type
    pub fn statement_type(&self) -> StatementType {
        self.statement_type
    }

    /// Check if this is a query
    pub fn is_query(&self) -> bool {
        self.statement_type == StatementType::Query
    }

    /// Check if this is DML
    pub fn is_dml(&self) -> bool {
        self.statement_type == StatementType::Dml
    }

    /// Parameter markers in order of appearance
    pub fn markers(&self) -> &[ParamMarker] {
        &self.markers
    }

    /// Number of parameter slots (the highest position referenced)
    pub fn param_count(&self) -> usize {
        self.markers.iter().map(|m| m.position()).max().unwrap_or(0)
    }

    fn parse(&mut self) -> Result<()> {
        let sql_upper = self.sql.to_uppercase();
        let trimmed = sql_upper.trim_start().trim_start_matches('(');

        if let Some(first_word) = trimmed.split_whitespace().next() {
            self.statement_type = match first_word {
                "SELECT" | "WITH" | "SHOW" | "DESCRIBE" => StatementType::Query,
                "INSERT" | "UPDATE" | "DELETE" | "MERGE" | "COPY" => StatementType::Dml,
                "CREATE" | "ALTER" | "DROP" | "GRANT" | "REVOKE" | "COMMENT" | "TRUNCATE"
                | "UNDROP" => StatementType::Ddl,
                "CALL" | "BEGIN" | "DECLARE" | "EXECUTE" => StatementType::Call,
                _ => StatementType::Unknown,
            };
        }

        self.parse_markers()
    }

    /// Scan for `?` and `:N` outside literals, quoted identifiers and comments
    fn parse_markers(&mut self) -> Result<()> {
        let chars: Vec<char> = self.sql.chars().collect();
        let len = chars.len();

        let mut i = 0;
        let mut question_marks = 0;

        while i < len {
            let ch = chars[i];

            // String literals and quoted identifiers ('' and "" escape themselves)
            if ch == '\'' || ch == '"' {
                i += 1;
                while i < len && chars[i] != ch {
                    if ch == '\'' && chars[i] == '\\' {
                        i += 1;
                    }
                    i += 1;
                }
                i += 1;
                continue;
            }

            // Dollar-quoted strings
            if ch == '$' && i + 1 < len && chars[i + 1] == '$' {
                i += 2;
                while i + 1 < len && !(chars[i] == '$' && chars[i + 1] == '$') {
                    i += 1;
                }
                i += 2;
                continue;
            }

            // Line comments (-- and //)
            if (ch == '-' || ch == '/') && i + 1 < len && chars[i + 1] == ch {
                while i < len && chars[i] != '\n' {
                    i += 1;
                }
                continue;
            }

            // Block comments
            if ch == '/' && i + 1 < len && chars[i + 1] == '*' {
                i += 2;
                while i + 1 < len && !(chars[i] == '*' && chars[i + 1] == '/') {
                    i += 1;
                }
                i += 2;
                continue;
            }

            // Casts (x::INT)
            if ch == ':' && i + 1 < len && chars[i + 1] == ':' {
                i += 2;
                continue;
            }

            if ch == '?' {
                question_marks += 1;
                if question_marks > MAX_PARAMETERS {
                    return Err(Error::ParameterLimitExceeded {
                        marker: format!("?#{}", question_marks),
                        max: MAX_PARAMETERS,
                    });
                }
                self.markers.push(ParamMarker::Positional(question_marks));
                i += 1;
                continue;
            }

            if ch == ':' {
                let start = i + 1;
                let mut end = start;
                while end < len && chars[end].is_ascii_digit() {
                    end += 1;
                }
                if end > start {
                    let digits: String = chars[start..end].iter().collect();
                    match digits.parse::<usize>() {
                        Ok(0) => {}
                        Ok(n) if n <= MAX_PARAMETERS => {
                            self.markers.push(ParamMarker::Numbered(n));
                        }
                        _ => {
                            return Err(Error::ParameterLimitExceeded {
                                marker: format!(":{}", digits),
                                max: MAX_PARAMETERS,
                            });
                        }
                    }
                    i = end;
                    continue;
                }
            }

            i += 1;
        }

        Ok(())
    }
}

/// Result of batch execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Rows affected per batch row, in submission order
    pub row_counts: Vec<u64>,
    /// Total rows affected
    pub total_rows_affected: u64,
}

impl BatchResult {
    /// Create a batch result from per-row counts
    pub fn with_row_counts(counts: Vec<u64>) -> Self {
        let total = counts.iter().sum();
        Self {
            row_counts: counts,
            total_rows_affected: total,
        }
    }

    /// Number of batch rows executed
    pub fn row_count(&self) -> usize {
        self.row_counts.len()
    }
}

/// A statement with positional parameters bound through typed setters
#[derive(Debug)]
pub struct PreparedStatement<E: Executor> {
    statement: Statement,
    binds: BindingSet,
    executor: E,
    config: CodecConfig,
}

impl<E: Executor> PreparedStatement<E> {
    /// Prepare `sql` with the default configuration
    pub fn new(executor: E, sql: impl Into<String>) -> Result<Self> {
        Self::with_config(executor, sql, CodecConfig::default())
    }

    /// Prepare `sql`
    ///
    /// Fails if the SQL text references more than [`MAX_PARAMETERS`]
    /// parameters.
    pub fn with_config(
        executor: E,
        sql: impl Into<String>,
        config: CodecConfig,
    ) -> Result<Self> {
        let statement = Statement::new(sql)?;
        let binds = BindingSet::with_config(statement.param_count(), config);
        tracing::trace!(
            sql = statement.sql(),
            params = statement.param_count(),
            "prepared statement"
        );
        Ok(Self {
            statement,
            binds,
            executor,
            config,
        })
    }

    /// The parsed statement
    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    /// Current parameter values
    pub fn bindings(&self) -> &BindingSet {
        &self.binds
    }

    /// The execution back end
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Number of parameters
    pub fn param_count(&self) -> usize {
        self.binds.param_count()
    }

    fn remote_type_for(&self, sql_type: SqlType) -> RemoteType {
        match sql_type {
            SqlType::Time => self.config.default_time_type(),
            other => other.remote_type(),
        }
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Bind a value with an optional remote type hint
    pub fn bind(
        &mut self,
        position: usize,
        value: &NativeValue,
        remote_type: Option<RemoteType>,
    ) -> Result<()> {
        self.binds.bind(position, value, remote_type)
    }

    /// Bind a NULL intended for `remote_type`
    pub fn bind_null(&mut self, position: usize, remote_type: RemoteType) -> Result<()> {
        self.binds.bind_null(position, remote_type)
    }

    /// Set an 8-bit integer
    pub fn set_i8(&mut self, position: usize, value: i8) -> Result<()> {
        self.bind(position, &NativeValue::TinyInt(value), None)
    }

    /// Set a 16-bit integer
    pub fn set_i16(&mut self, position: usize, value: i16) -> Result<()> {
        self.bind(position, &NativeValue::SmallInt(value), None)
    }

    /// Set a 32-bit integer
    pub fn set_i32(&mut self, position: usize, value: i32) -> Result<()> {
        self.bind(position, &NativeValue::Int(value), None)
    }

    /// Set a 64-bit integer
    pub fn set_i64(&mut self, position: usize, value: i64) -> Result<()> {
        self.bind(position, &NativeValue::BigInt(value), None)
    }

    /// Set an exact decimal
    pub fn set_decimal(&mut self, position: usize, value: Number) -> Result<()> {
        self.bind(position, &NativeValue::Decimal(value), None)
    }

    /// Set a wall-clock time of day
    pub fn set_time(&mut self, position: usize, value: NaiveTime) -> Result<()> {
        self.bind(position, &NativeValue::Time(value), None)
    }

    /// Set a time of day observed against `calendar`
    pub fn set_time_with_calendar(
        &mut self,
        position: usize,
        value: NaiveTime,
        calendar: &CalendarContext,
    ) -> Result<()> {
        self.binds
            .bind_with_calendar(position, &NativeValue::Time(value), None, calendar)
    }

    /// Set NULL for a generic SQL type
    pub fn set_null(&mut self, position: usize, sql_type: SqlType) -> Result<()> {
        let remote_type = self.remote_type_for(sql_type);
        self.bind_null(position, remote_type)
    }

    /// Set a value, or NULL, through a generic SQL type
    ///
    /// `None` and `Some(NativeValue::Null(_))` produce the same typed NULL
    /// as [`set_null`](Self::set_null) with the same `sql_type`.
    pub fn set_object(
        &mut self,
        position: usize,
        value: Option<NativeValue>,
        sql_type: SqlType,
    ) -> Result<()> {
        let remote_type = self.remote_type_for(sql_type);
        match value {
            None | Some(NativeValue::Null(_)) => self.bind_null(position, remote_type),
            Some(NativeValue::Decimal(number))
                if matches!(sql_type, SqlType::Decimal | SqlType::Numeric) =>
            {
                let remote_type = decimal_remote_type(&number);
                self.bind(position, &NativeValue::Decimal(number), Some(remote_type))
            }
            Some(value) => self.bind(position, &value, Some(remote_type)),
        }
    }

    /// Freeze the current parameters as one batch row
    pub fn add_batch(&mut self) -> Result<()> {
        self.binds.add_batch_row()
    }

    /// Discard current parameters and batch rows
    pub fn clear_parameters(&mut self) {
        self.binds.clear();
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Execute as a query with the current parameters
    pub async fn execute_query(&mut self) -> Result<ResultSet> {
        let snapshot = self.binds.current_row()?;
        tracing::debug!(sql = self.statement.sql(), "executing query");
        let response = self.executor.execute(self.statement.sql(), &snapshot).await?;
        Ok(ResultSet::with_config(response.columns, response.rows, self.config))
    }

    /// Execute once with the current parameters, returning rows affected
    pub async fn execute_update(&mut self) -> Result<u64> {
        let snapshot = self.binds.current_row()?;
        tracing::debug!(sql = self.statement.sql(), "executing update");
        let response = self.executor.execute(self.statement.sql(), &snapshot).await?;
        Ok(response.total_rows_affected())
    }

    /// Execute every accumulated batch row, then clear the batch
    pub async fn execute_batch(&mut self) -> Result<BatchResult> {
        let snapshot = self.binds.snapshot();
        if snapshot.is_empty() {
            return Err(Error::EmptyBatch);
        }

        tracing::debug!(
            sql = self.statement.sql(),
            rows = snapshot.row_count(),
            "executing batch"
        );
        let result = self.executor.execute(self.statement.sql(), &snapshot).await;
        self.binds.clear();

        let response = result?;
        if response.row_counts.len() != snapshot.row_count() {
            tracing::warn!(
                expected = snapshot.row_count(),
                actual = response.row_counts.len(),
                "batch row count mismatch"
            );
        }
        Ok(BatchResult::with_row_counts(response.row_counts))
    }
}
