//! Buffer abstractions for frame encoding/decoding
//!
//! This module provides the byte buffers used to serialize bind snapshots
//! and result rows for the execution layer.

mod read;
mod write;

pub use read::ReadBuffer;
pub use write::WriteBuffer;
