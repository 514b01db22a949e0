//! Convenient re-exports for downstream crates.

pub use crate::config::{CsvDialect, ReaderConfig, Worksheet};
pub use crate::error::{Error, Result};
pub use crate::frame::{Column, Frame, Index, Series, Tabular};
pub use crate::types::{Row, Value};
