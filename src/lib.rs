#![warn(missing_docs)]

//! # flakebind
//!
//! Client-side parameter binding and result materialization for SQL
//! database drivers.
//!
//! Applications bind typed values to positional parameters; the values are
//! checked against the target remote type, encoded without precision loss,
//! and accumulated per batch row. On the way back, result cells are decoded
//! into the requested native kind or rejected with a conversion error.
//!
//! ## Features
//!
//! - **Exact integers and decimals** - every i8/i16/i32/i64 value, including
//!   both extremes, survives the NUMBER wire format unchanged
//! - **Typed NULL** - NULL always carries its intended remote type
//! - **Batching** - FIFO batch rows with atomic row commits
//! - **Time of day** - wall-clock TIME values with optional calendar
//!   normalization
//!
//! ## Quick Start
//!
//! ```rust
//! use flakebind::{LoopbackExecutor, PreparedStatement, SqlType};
//!
//! # async fn example() -> flakebind::Result<()> {
//! let mut stmt = PreparedStatement::new(LoopbackExecutor::new(), "INSERT INTO t VALUES (?, ?)")?;
//!
//! stmt.set_i64(1, i64::MAX)?;
//! stmt.set_null(2, SqlType::Time)?;
//! stmt.add_batch()?;
//!
//! stmt.set_i8(1, -128)?;
//! stmt.set_time(2, chrono::NaiveTime::from_hms_opt(12, 34, 56).unwrap())?;
//! stmt.add_batch()?;
//!
//! let result = stmt.execute_batch().await?;
//! assert_eq!(result.row_counts, vec![1, 1]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Calendar-qualified TIME values
//!
//! By default ([`TimeZoneHandling::UtcNormalized`]) a calendar supplied with a
//! TIME bind or fetch is accepted but values are normalized through UTC, so a
//! value bound with any calendar reads back unchanged with any calendar.
//! [`TimeZoneHandling::HonorCalendar`] applies the calendar's source zone on
//! bind and its target zone on fetch.
//!
//! ```rust
//! use flakebind::{CodecConfig, TimeZoneHandling};
//!
//! let config = CodecConfig::new().time_zone_handling(TimeZoneHandling::HonorCalendar);
//! assert_eq!(config.time_zone_handling, TimeZoneHandling::HonorCalendar);
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`], which uses the [`Error`] type.
//! Value-level errors carry the parameter position or column name:
//!
//! ```rust
//! use flakebind::{BindingSet, Error, Location, NativeValue, RemoteType};
//!
//! let mut binds = BindingSet::new(1);
//! let err = binds.bind(1, &NativeValue::Int(5), Some(RemoteType::TIME)).unwrap_err();
//! assert!(matches!(err, Error::TypeMismatch { .. }));
//! assert_eq!(err.location(), Some(&Location::Parameter(1)));
//! ```

pub mod binding;
pub mod buffer;
pub mod coercion;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod row;
pub mod statement;
pub mod temporal;
pub mod transport;
pub mod types;
pub mod value;
pub mod wire;

pub use binding::{BindSnapshot, BindingSet, BindingSlot};
pub use coercion::{CoercionRule, CoercionTable, Conversion};
pub use config::{CodecConfig, TimeZoneHandling};
pub use constants::{RemoteType, RemoteTypeClass, SqlType, ValueKind};
pub use decoder::ValueDecoder;
pub use encoder::ValueEncoder;
pub use error::{Error, Location, Result};
pub use row::{ColumnInfo, ResultSet};
pub use statement::{BatchResult, ParamMarker, PreparedStatement, Statement, StatementType};
pub use temporal::{CalendarContext, InstantOfDay};
pub use transport::{ExecuteResponse, Executor, LoopbackExecutor};
pub use types::Number;
pub use value::NativeValue;
pub use wire::WireValue;
