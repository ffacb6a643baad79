//! Result rows and typed column reads
//!
//! A [`ResultSet`] holds the wire cells returned for a query together with
//! the column metadata. Reads decode one cell at a time, so a malformed or
//! out-of-range value in one column never prevents reading its siblings.
//!
//! # Example
//!
//! ```rust
//! use flakebind::{ColumnInfo, RemoteType, ResultSet, WireValue};
//!
//! let columns = vec![ColumnInfo::new("id", RemoteType::NUMBER)];
//! let rows = vec![vec![WireValue::null(RemoteType::NUMBER)]];
//! let mut rs = ResultSet::new(columns, rows);
//!
//! assert!(rs.next());
//! assert_eq!(rs.get_i32("ID").unwrap(), None);
//! assert!(rs.was_null());
//! ```

use std::cell::Cell;

use chrono::NaiveTime;
use indexmap::IndexMap;

use crate::config::CodecConfig;
use crate::constants::{RemoteType, ValueKind};
use crate::decoder::ValueDecoder;
use crate::error::{Error, Location, Result};
use crate::temporal::CalendarContext;
use crate::types::Number;
use crate::value::NativeValue;
use crate::wire::WireValue;

/// Metadata for a result column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name as reported
    pub name: String,
    /// Declared remote type
    pub remote_type: RemoteType,
    /// Whether the column may contain NULL
    pub nullable: bool,
}

impl ColumnInfo {
    /// Create a nullable column
    pub fn new(name: impl Into<String>, remote_type: RemoteType) -> Self {
        Self {
            name: name.into(),
            remote_type,
            nullable: true,
        }
    }

    /// Mark the column as NOT NULL
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// Rows returned by a query with a forward-only cursor
///
/// Cells are addressed by position; a name resolves to the first column
/// carrying it, so duplicate names (as in `SELECT *` over a join) never
/// shift the remaining columns.
#[derive(Debug)]
pub struct ResultSet {
    /// Columns in select-list order
    columns: Vec<ColumnInfo>,
    /// Upper-cased name to the position of its first occurrence
    positions: IndexMap<String, usize>,
    rows: Vec<Vec<WireValue>>,
    /// Index of the current row; `None` before the first `next()`
    cursor: Option<usize>,
    decoder: ValueDecoder,
    last_was_null: Cell<bool>,
}

impl ResultSet {
    /// Create a result set with the default decoder configuration
    pub fn new(columns: Vec<ColumnInfo>, rows: Vec<Vec<WireValue>>) -> Self {
        Self::with_config(columns, rows, CodecConfig::default())
    }

    /// Create a result set
    pub fn with_config(
        columns: Vec<ColumnInfo>,
        rows: Vec<Vec<WireValue>>,
        config: CodecConfig,
    ) -> Self {
        let mut positions = IndexMap::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            positions.entry(column.name.to_uppercase()).or_insert(i);
        }
        Self {
            columns,
            positions,
            rows,
            cursor: None,
            decoder: ValueDecoder::new(config),
            last_was_null: Cell::new(false),
        }
    }

    /// Column metadata in select-list order
    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Advance to the next row, returning false once past the last row
    pub fn next(&mut self) -> bool {
        let next = self.cursor.map_or(0, |i| i + 1);
        if next < self.rows.len() {
            self.cursor = Some(next);
            true
        } else {
            self.cursor = Some(self.rows.len());
            false
        }
    }

    /// 0-based index of a column, case-insensitive
    ///
    /// When several columns share a name the first one is returned.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.positions
            .get(&name.to_uppercase())
            .copied()
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    fn current_row(&self) -> Result<&[WireValue]> {
        self.cursor
            .and_then(|i| self.rows.get(i))
            .map(|row| row.as_slice())
            .ok_or(Error::NoCurrentRow)
    }

    fn cell(&self, index: usize) -> Result<(&str, &WireValue)> {
        let row = self.current_row()?;
        let name = self
            .columns
            .get(index)
            .map(|c| c.name.as_str())
            .ok_or_else(|| Error::ColumnNotFound(format!("#{}", index + 1)))?;
        row.get(index).map(|cell| (name, cell)).ok_or_else(|| {
            Error::MalformedFrame(format!("row has no cell for column {}", name))
        })
    }

    fn read(
        &self,
        index: usize,
        kind: ValueKind,
        calendar: Option<&CalendarContext>,
    ) -> Result<NativeValue> {
        self.last_was_null.set(false);
        let (name, cell) = self.cell(index)?;
        let value = self
            .decoder
            .decode_as(cell, kind, calendar)
            .map_err(|e| e.at(Location::Column(name.to_string())))?;
        self.last_was_null.set(value.is_null());
        Ok(value)
    }

    /// Read `column` of the current row as `kind`
    ///
    /// NULL is returned as [`NativeValue::Null`] whatever the requested kind,
    /// and sets the [`was_null`](Self::was_null) indicator.
    pub fn get(
        &self,
        column: &str,
        kind: ValueKind,
        calendar: Option<&CalendarContext>,
    ) -> Result<NativeValue> {
        self.last_was_null.set(false);
        let index = self.column_index(column)?;
        self.read(index, kind, calendar)
    }

    /// Read the column at a 1-based position
    pub fn get_at(
        &self,
        position: usize,
        kind: ValueKind,
        calendar: Option<&CalendarContext>,
    ) -> Result<NativeValue> {
        self.last_was_null.set(false);
        let index = position
            .checked_sub(1)
            .filter(|i| *i < self.columns.len())
            .ok_or_else(|| Error::ColumnNotFound(format!("#{}", position)))?;
        self.read(index, kind, calendar)
    }

    /// Check whether `column` of the current row is NULL
    pub fn is_null(&self, column: &str) -> Result<bool> {
        let index = self.column_index(column)?;
        let (_, cell) = self.cell(index)?;
        Ok(cell.is_null())
    }

    /// Whether the last read returned NULL
    pub fn was_null(&self) -> bool {
        self.last_was_null.get()
    }

    /// Read as `i8`
    pub fn get_i8(&self, column: &str) -> Result<Option<i8>> {
        match self.get(column, ValueKind::TinyInt, None)? {
            NativeValue::TinyInt(v) => Ok(Some(v)),
            _ => Ok(None),
        }
    }

    /// Read as `i16`
    pub fn get_i16(&self, column: &str) -> Result<Option<i16>> {
        match self.get(column, ValueKind::SmallInt, None)? {
            NativeValue::SmallInt(v) => Ok(Some(v)),
            _ => Ok(None),
        }
    }

    /// Read as `i32`
    pub fn get_i32(&self, column: &str) -> Result<Option<i32>> {
        match self.get(column, ValueKind::Int, None)? {
            NativeValue::Int(v) => Ok(Some(v)),
            _ => Ok(None),
        }
    }

    /// Read as `i64`
    pub fn get_i64(&self, column: &str) -> Result<Option<i64>> {
        match self.get(column, ValueKind::BigInt, None)? {
            NativeValue::BigInt(v) => Ok(Some(v)),
            _ => Ok(None),
        }
    }

    /// Read as an exact decimal
    pub fn get_decimal(&self, column: &str) -> Result<Option<Number>> {
        match self.get(column, ValueKind::Decimal, None)? {
            NativeValue::Decimal(v) => Ok(Some(v)),
            _ => Ok(None),
        }
    }

    /// Read as a wall-clock time of day
    pub fn get_time(&self, column: &str) -> Result<Option<NaiveTime>> {
        self.get_time_inner(column, None)
    }

    /// Read as a time of day expressed against `calendar`
    pub fn get_time_with_calendar(
        &self,
        column: &str,
        calendar: &CalendarContext,
    ) -> Result<Option<NaiveTime>> {
        self.get_time_inner(column, Some(calendar))
    }

    fn get_time_inner(
        &self,
        column: &str,
        calendar: Option<&CalendarContext>,
    ) -> Result<Option<NaiveTime>> {
        match self.get(column, ValueKind::Time, calendar)? {
            NativeValue::Time(t) => Ok(Some(t)),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::ValueEncoder;

    fn encode(value: NativeValue, remote_type: RemoteType) -> WireValue {
        ValueEncoder::default().encode(&value, remote_type, None).unwrap()
    }

    fn sample() -> ResultSet {
        let columns = vec![
            ColumnInfo::new("Id", RemoteType::NUMBER).not_null(),
            ColumnInfo::new("big", RemoteType::NUMBER),
            ColumnInfo::new("at", RemoteType::TIME),
        ];
        let rows = vec![
            vec![
                encode(NativeValue::Int(7), RemoteType::NUMBER),
                encode(NativeValue::Int(200), RemoteType::NUMBER),
                encode(
                    NativeValue::Time(NaiveTime::from_hms_opt(12, 34, 56).unwrap()),
                    RemoteType::TIME,
                ),
            ],
            vec![
                encode(NativeValue::Int(8), RemoteType::NUMBER),
                WireValue::null(RemoteType::NUMBER),
                WireValue::null(RemoteType::TIME),
            ],
        ];
        ResultSet::new(columns, rows)
    }

    #[test]
    fn test_no_current_row() {
        let mut rs = sample();
        assert!(matches!(rs.get_i32("id"), Err(Error::NoCurrentRow)));
        assert!(rs.next());
        assert!(rs.next());
        assert!(!rs.next());
        assert!(matches!(rs.get_i32("id"), Err(Error::NoCurrentRow)));
        assert!(!rs.next());
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let mut rs = sample();
        assert!(rs.next());
        assert_eq!(rs.get_i32("ID").unwrap(), Some(7));
        assert_eq!(rs.get_i32("id").unwrap(), Some(7));
        assert_eq!(rs.column_index("AT").unwrap(), 2);
        assert!(matches!(rs.get_i32("missing"), Err(Error::ColumnNotFound(_))));
    }

    #[test]
    fn test_conversion_failure_is_isolated() {
        let mut rs = sample();
        assert!(rs.next());
        let err = rs.get_i8("big").unwrap_err();
        assert!(matches!(err, Error::ConversionFailure { .. }));
        assert_eq!(err.location(), Some(&Location::Column("big".to_string())));
        // Siblings and wider reads of the same column still work
        assert_eq!(rs.get_i16("big").unwrap(), Some(200));
        assert_eq!(
            rs.get_time("at").unwrap(),
            Some(NaiveTime::from_hms_opt(12, 34, 56).unwrap())
        );
    }

    #[test]
    fn test_null_reads() {
        let mut rs = sample();
        assert!(rs.next());
        assert!(!rs.is_null("big").unwrap());
        assert!(rs.next());
        assert!(rs.is_null("big").unwrap());
        assert_eq!(rs.get_i64("big").unwrap(), None);
        assert!(rs.was_null());
        assert_eq!(rs.get_i64("id").unwrap(), Some(8));
        assert!(!rs.was_null());
        assert_eq!(rs.get_time("at").unwrap(), None);
        assert!(rs.was_null());
    }

    #[test]
    fn test_get_at_position() {
        let mut rs = sample();
        assert!(rs.next());
        assert_eq!(rs.get_at(1, ValueKind::Int, None).unwrap(), NativeValue::Int(7));
        assert!(matches!(rs.get_at(0, ValueKind::Int, None), Err(Error::ColumnNotFound(_))));
        assert!(matches!(rs.get_at(4, ValueKind::Int, None), Err(Error::ColumnNotFound(_))));
    }

    #[test]
    fn test_columns_keep_order() {
        let rs = sample();
        let names: Vec<&str> = rs.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Id", "big", "at"]);
        assert!(!rs.columns()[0].nullable);
    }

    #[test]
    fn test_duplicate_names_keep_positions() {
        let columns = vec![
            ColumnInfo::new("A", RemoteType::NUMBER),
            ColumnInfo::new("a", RemoteType::NUMBER),
            ColumnInfo::new("B", RemoteType::NUMBER),
        ];
        let rows = vec![vec![
            encode(NativeValue::Int(1), RemoteType::NUMBER),
            encode(NativeValue::Int(2), RemoteType::NUMBER),
            encode(NativeValue::Int(3), RemoteType::NUMBER),
        ]];
        let mut rs = ResultSet::new(columns, rows);
        assert!(rs.next());

        assert_eq!(rs.column_count(), 3);
        assert_eq!(rs.column_index("a").unwrap(), 0);
        assert_eq!(rs.column_index("B").unwrap(), 2);
        assert_eq!(rs.get_i32("A").unwrap(), Some(1));
        assert_eq!(rs.get_i32("B").unwrap(), Some(3));
        // The shadowed column is still reachable by position
        assert_eq!(rs.get_at(2, ValueKind::Int, None).unwrap(), NativeValue::Int(2));
        assert_eq!(rs.get_at(3, ValueKind::Int, None).unwrap(), NativeValue::Int(3));
    }
}
