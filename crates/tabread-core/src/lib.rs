#![forbid(unsafe_code)]
//! tabread-core: the value model and configuration shared by every adapter.
//!
//! No file, workbook, or database IO lives here. Adapters, the `Reader`
//! wrapper, and the dispatcher are in `tabread-io`.

pub mod config;
pub mod error;
pub mod frame;
pub mod prelude;
pub mod types;

pub use error::{Error, Result};
pub use types::{Row, Value};
