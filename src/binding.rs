//! Positional parameter binding and batch accumulation
//!
//! A [`BindingSet`] holds one [`BindingSlot`] per statement parameter. Binds
//! land in the row currently being assembled; [`BindingSet::add_batch_row`]
//! freezes that row into the batch history of every slot at once.
//!
//! # Example
//!
//! ```rust
//! use flakebind::{BindingSet, NativeValue, RemoteType};
//!
//! let mut binds = BindingSet::new(2);
//! binds.bind(1, &NativeValue::Int(1), None).unwrap();
//! binds.bind_null(2, RemoteType::NUMBER).unwrap();
//! binds.add_batch_row().unwrap();
//!
//! binds.bind(1, &NativeValue::Int(2), None).unwrap();
//! binds.bind(2, &NativeValue::BigInt(20), None).unwrap();
//! binds.add_batch_row().unwrap();
//!
//! let snapshot = binds.snapshot();
//! assert_eq!(snapshot.row_count(), 2);
//! assert!(snapshot.rows()[0][1].is_null());
//! ```

use bytes::Bytes;

use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::config::CodecConfig;
use crate::constants::RemoteType;
use crate::encoder::ValueEncoder;
use crate::error::{Error, Location, Result};
use crate::temporal::CalendarContext;
use crate::value::NativeValue;
use crate::wire::WireValue;

/// One positional parameter
#[derive(Debug, Clone)]
pub struct BindingSlot {
    /// 1-based parameter position
    position: usize,
    /// Type of the most recent bind
    remote_type: Option<RemoteType>,
    /// Value for the row being assembled
    pending: Option<WireValue>,
    /// Frozen values, one per batch row
    rows: Vec<WireValue>,
}

impl BindingSlot {
    fn new(position: usize) -> Self {
        Self {
            position,
            remote_type: None,
            pending: None,
            rows: Vec::new(),
        }
    }

    /// 1-based parameter position
    pub fn position(&self) -> usize {
        self.position
    }

    /// Remote type of the most recent bind, if any
    pub fn remote_type(&self) -> Option<RemoteType> {
        self.remote_type
    }

    /// Value bound for the row being assembled
    pub fn pending(&self) -> Option<&WireValue> {
        self.pending.as_ref()
    }

    /// Values frozen by previous batch rows, oldest first
    pub fn rows(&self) -> &[WireValue] {
        &self.rows
    }
}

/// Parameter slots for one prepared statement
#[derive(Debug, Clone)]
pub struct BindingSet {
    slots: Vec<BindingSlot>,
    batch_rows: usize,
    encoder: ValueEncoder,
}

impl BindingSet {
    /// Create a binding set with `param_count` slots and default configuration
    pub fn new(param_count: usize) -> Self {
        Self::with_config(param_count, CodecConfig::default())
    }

    /// Create a binding set with `param_count` slots
    pub fn with_config(param_count: usize, config: CodecConfig) -> Self {
        Self {
            slots: (1..=param_count).map(BindingSlot::new).collect(),
            batch_rows: 0,
            encoder: ValueEncoder::new(config),
        }
    }

    /// Number of parameter slots
    pub fn param_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of frozen batch rows
    pub fn batch_row_count(&self) -> usize {
        self.batch_rows
    }

    /// All slots in position order
    pub fn slots(&self) -> &[BindingSlot] {
        &self.slots
    }

    /// Remote type per position (the statement shape)
    pub fn shape(&self) -> Vec<Option<RemoteType>> {
        self.slots.iter().map(|s| s.remote_type).collect()
    }

    /// Positions not yet bound in the row being assembled
    pub fn missing_positions(&self) -> Vec<usize> {
        self.slots
            .iter()
            .filter(|s| s.pending.is_none())
            .map(|s| s.position)
            .collect()
    }

    /// Check if every slot has a value in the row being assembled
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|s| s.pending.is_some())
    }

    /// Bind a value at `position` (1-based)
    ///
    /// Without a type hint the value's default remote type is used. Re-binding
    /// a position before [`add_batch_row`](Self::add_batch_row) replaces the
    /// earlier value.
    pub fn bind(
        &mut self,
        position: usize,
        value: &NativeValue,
        remote_type: Option<RemoteType>,
    ) -> Result<()> {
        self.bind_inner(position, value, remote_type, None)
    }

    /// Bind a value interpreted against a calendar
    pub fn bind_with_calendar(
        &mut self,
        position: usize,
        value: &NativeValue,
        remote_type: Option<RemoteType>,
        calendar: &CalendarContext,
    ) -> Result<()> {
        self.bind_inner(position, value, remote_type, Some(calendar))
    }

    /// Bind a NULL intended for `remote_type`
    pub fn bind_null(&mut self, position: usize, remote_type: RemoteType) -> Result<()> {
        self.bind_inner(position, &NativeValue::Null(remote_type), Some(remote_type), None)
    }

    fn bind_inner(
        &mut self,
        position: usize,
        value: &NativeValue,
        remote_type: Option<RemoteType>,
        calendar: Option<&CalendarContext>,
    ) -> Result<()> {
        let count = self.slots.len();
        let index = position
            .checked_sub(1)
            .filter(|i| *i < count)
            .ok_or(Error::InvalidParameterIndex { position, count })?;

        let remote_type = remote_type.unwrap_or_else(|| self.encoder.default_remote_type(value));
        let wire = self
            .encoder
            .encode(value, remote_type, calendar)
            .map_err(|e| e.at(Location::Parameter(position)))?;

        tracing::trace!(
            position = position,
            remote_type = %remote_type,
            null = wire.is_null(),
            "bound parameter"
        );

        let slot = &mut self.slots[index];
        slot.remote_type = Some(wire.remote_type());
        slot.pending = Some(wire);
        Ok(())
    }

    /// Freeze the row being assembled into the batch history
    ///
    /// Fails with `IncompleteBinding` if any slot is unset; in that case
    /// nothing changes.
    pub fn add_batch_row(&mut self) -> Result<()> {
        let missing = self.missing_positions();
        if !missing.is_empty() {
            return Err(Error::IncompleteBinding { missing });
        }

        for slot in &mut self.slots {
            if let Some(wire) = slot.pending.take() {
                slot.rows.push(wire);
            }
        }
        self.batch_rows += 1;

        tracing::debug!(rows = self.batch_rows, params = self.slots.len(), "added batch row");
        Ok(())
    }

    /// Discard all values, keeping the statement shape
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.pending = None;
            slot.rows.clear();
        }
        self.batch_rows = 0;
    }

    /// Frozen batch rows in call order, values in position order
    pub fn snapshot(&self) -> BindSnapshot {
        let rows = (0..self.batch_rows)
            .map(|row| {
                self.slots
                    .iter()
                    .filter_map(|slot| slot.rows.get(row).cloned())
                    .collect()
            })
            .collect();
        BindSnapshot::new(self.slots.len(), rows)
    }

    /// The row being assembled as a one-row snapshot
    ///
    /// Fails with `IncompleteBinding` if any slot is unset.
    pub fn current_row(&self) -> Result<BindSnapshot> {
        let mut row = Vec::with_capacity(self.slots.len());
        let mut missing = Vec::new();
        for slot in &self.slots {
            match &slot.pending {
                Some(wire) => row.push(wire.clone()),
                None => missing.push(slot.position),
            }
        }
        if !missing.is_empty() {
            return Err(Error::IncompleteBinding { missing });
        }
        Ok(BindSnapshot::new(self.slots.len(), vec![row]))
    }
}

/// Smallest cell frame: tag, precision, scale and a one-byte length indicator
const MIN_CELL_LEN: usize = 4;

/// Largest row count accepted for a frame whose rows carry no values
const MAX_ROWS_WITHOUT_VALUES: usize = u16::MAX as usize;

/// Ordered rows of encoded parameter values handed to execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindSnapshot {
    column_count: usize,
    rows: Vec<Vec<WireValue>>,
}

impl BindSnapshot {
    /// Create a snapshot; every row must have `column_count` values
    pub fn new(column_count: usize, rows: Vec<Vec<WireValue>>) -> Self {
        Self { column_count, rows }
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of values per row
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Check if the snapshot has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in submission order
    pub fn rows(&self) -> &[Vec<WireValue>] {
        &self.rows
    }

    /// Consume into rows
    pub fn into_rows(self) -> Vec<Vec<WireValue>> {
        self.rows
    }

    /// Serialize as `UB4 rows, UB2 columns` followed by row-major cells
    pub fn to_bytes(&self) -> Result<Bytes> {
        let rows = u32::try_from(self.rows.len())
            .map_err(|_| Error::MalformedFrame(format!("too many rows: {}", self.rows.len())))?;
        let columns = u16::try_from(self.column_count).map_err(|_| {
            Error::MalformedFrame(format!("too many columns: {}", self.column_count))
        })?;

        let mut buf = WriteBuffer::new();
        buf.write_ub4(rows)?;
        buf.write_ub2(columns)?;
        for (index, row) in self.rows.iter().enumerate() {
            if row.len() != self.column_count {
                return Err(Error::MalformedFrame(format!(
                    "row {} has {} values, expected {}",
                    index,
                    row.len(),
                    self.column_count
                )));
            }
            for cell in row {
                cell.write_to(&mut buf)?;
            }
        }
        Ok(buf.freeze())
    }

    /// Parse a frame produced by [`to_bytes`](Self::to_bytes)
    pub fn from_bytes(data: Bytes) -> Result<Self> {
        let mut buf = ReadBuffer::new(data);
        let row_count = buf.read_ub4()? as usize;
        let column_count = buf.read_ub2()? as usize;

        if column_count == 0 {
            if row_count > MAX_ROWS_WITHOUT_VALUES {
                return Err(Error::MalformedFrame(format!(
                    "{} rows without values exceeds the limit of {}",
                    row_count, MAX_ROWS_WITHOUT_VALUES
                )));
            }
        } else {
            let needed = row_count
                .saturating_mul(column_count)
                .saturating_mul(MIN_CELL_LEN);
            if needed > buf.remaining() {
                return Err(Error::MalformedFrame(format!(
                    "{} rows of {} values need at least {} bytes, {} available",
                    row_count,
                    column_count,
                    needed,
                    buf.remaining()
                )));
            }
        }

        let mut rows = Vec::with_capacity(row_count.min(1024));
        for _ in 0..row_count {
            let mut row = Vec::with_capacity(column_count);
            for _ in 0..column_count {
                row.push(WireValue::read_from(&mut buf)?);
            }
            rows.push(row);
        }

        if !buf.is_exhausted() {
            return Err(Error::MalformedFrame(format!(
                "{} trailing bytes after {} rows",
                buf.remaining(),
                row_count
            )));
        }

        Ok(Self { column_count, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ValueKind;
    use crate::decoder::ValueDecoder;

    fn decode_int(wire: &WireValue) -> i64 {
        match ValueDecoder::default().decode_as(wire, ValueKind::BigInt, None).unwrap() {
            NativeValue::BigInt(v) => v,
            other => panic!("expected BIGINT, got {:?}", other),
        }
    }

    #[test]
    fn test_slots_are_contiguous() {
        let binds = BindingSet::new(3);
        let positions: Vec<usize> = binds.slots().iter().map(|s| s.position()).collect();
        assert_eq!(positions, vec![1, 2, 3]);
        assert_eq!(binds.missing_positions(), vec![1, 2, 3]);
    }

    #[test]
    fn test_invalid_position() {
        let mut binds = BindingSet::new(2);
        assert!(matches!(
            binds.bind(0, &NativeValue::Int(1), None),
            Err(Error::InvalidParameterIndex { position: 0, count: 2 })
        ));
        assert!(matches!(
            binds.bind(3, &NativeValue::Int(1), None),
            Err(Error::InvalidParameterIndex { position: 3, count: 2 })
        ));
    }

    #[test]
    fn test_rebind_replaces_pending() {
        let mut binds = BindingSet::new(1);
        binds.bind(1, &NativeValue::Int(1), None).unwrap();
        binds.bind(1, &NativeValue::Int(2), None).unwrap();
        binds.add_batch_row().unwrap();
        let snapshot = binds.snapshot();
        assert_eq!(snapshot.row_count(), 1);
        assert_eq!(decode_int(&snapshot.rows()[0][0]), 2);
    }

    #[test]
    fn test_add_batch_row_resets_pending() {
        let mut binds = BindingSet::new(1);
        binds.bind(1, &NativeValue::Int(1), None).unwrap();
        binds.add_batch_row().unwrap();
        assert!(!binds.is_complete());
        assert!(matches!(
            binds.add_batch_row(),
            Err(Error::IncompleteBinding { ref missing }) if missing == &vec![1]
        ));
    }

    #[test]
    fn test_incomplete_row_is_atomic() {
        let mut binds = BindingSet::new(3);
        binds.bind(1, &NativeValue::Int(1), None).unwrap();
        binds.bind(3, &NativeValue::Int(3), None).unwrap();

        let err = binds.add_batch_row().unwrap_err();
        assert!(matches!(err, Error::IncompleteBinding { ref missing } if missing == &vec![2]));
        assert_eq!(binds.batch_row_count(), 0);
        assert!(binds.slots().iter().all(|s| s.rows().is_empty()));
        assert!(binds.slots()[0].pending().is_some());
        assert!(binds.slots()[2].pending().is_some());
    }

    #[test]
    fn test_type_mismatch_leaves_slot_unchanged() {
        let mut binds = BindingSet::new(1);
        binds.bind(1, &NativeValue::Int(9), None).unwrap();
        let err = binds.bind(1, &NativeValue::Int(10), Some(RemoteType::TIME)).unwrap_err();
        assert_eq!(err.location(), Some(&Location::Parameter(1)));
        assert_eq!(decode_int(binds.slots()[0].pending().unwrap()), 9);
    }

    #[test]
    fn test_clear_keeps_shape() {
        let mut binds = BindingSet::new(2);
        binds.bind(1, &NativeValue::Int(1), None).unwrap();
        binds.bind_null(2, RemoteType::TIME).unwrap();
        binds.add_batch_row().unwrap();
        binds.bind(1, &NativeValue::Int(2), None).unwrap();

        binds.clear();
        assert_eq!(binds.batch_row_count(), 0);
        assert!(binds.snapshot().is_empty());
        assert_eq!(binds.missing_positions(), vec![1, 2]);
        assert_eq!(binds.shape(), vec![Some(RemoteType::NUMBER), Some(RemoteType::TIME)]);
    }

    #[test]
    fn test_current_row() {
        let mut binds = BindingSet::new(2);
        binds.bind(1, &NativeValue::SmallInt(5), None).unwrap();
        assert!(matches!(binds.current_row(), Err(Error::IncompleteBinding { .. })));
        binds.bind(2, &NativeValue::SmallInt(6), None).unwrap();
        let row = binds.current_row().unwrap();
        assert_eq!(row.row_count(), 1);
        assert_eq!(decode_int(&row.rows()[0][1]), 6);
        // current_row does not freeze the row
        assert_eq!(binds.batch_row_count(), 0);
    }

    #[test]
    fn test_snapshot_frame_roundtrip() {
        let mut binds = BindingSet::new(2);
        for i in 0..3i64 {
            binds.bind(1, &NativeValue::BigInt(i), None).unwrap();
            binds.bind_null(2, RemoteType::NUMBER).unwrap();
            binds.add_batch_row().unwrap();
        }
        let snapshot = binds.snapshot();
        let parsed = BindSnapshot::from_bytes(snapshot.to_bytes().unwrap()).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn test_snapshot_frame_rejects_oversized_row_count() {
        // u32::MAX rows of zero values
        let frame = Bytes::from_static(&[0x04, 0xFF, 0xFF, 0xFF, 0xFF, 0x00]);
        assert!(matches!(
            BindSnapshot::from_bytes(frame),
            Err(Error::MalformedFrame(_))
        ));

        // u32::MAX rows of one value with only one cell present
        let frame = Bytes::from_static(&[
            0x04, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x01, 0x02, 38, 0, 0xFF,
        ]);
        assert!(matches!(
            BindSnapshot::from_bytes(frame),
            Err(Error::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_snapshot_frame_rows_without_values() {
        let mut binds = BindingSet::new(0);
        binds.add_batch_row().unwrap();
        binds.add_batch_row().unwrap();
        let snapshot = binds.snapshot();
        let parsed = BindSnapshot::from_bytes(snapshot.to_bytes().unwrap()).unwrap();
        assert_eq!(parsed.row_count(), 2);
        assert_eq!(parsed.column_count(), 0);
    }

    #[test]
    fn test_snapshot_frame_rejects_trailing_bytes() {
        let snapshot = BindSnapshot::new(0, vec![vec![]]);
        let mut data = snapshot.to_bytes().unwrap().to_vec();
        data.push(0);
        assert!(matches!(
            BindSnapshot::from_bytes(Bytes::from(data)),
            Err(Error::MalformedFrame(_))
        ));
    }
}
