#![forbid(unsafe_code)]
//! Row readers over files, handles, databases, and in-memory data.
//!
//! Every source ends up as a [`Reader`]: a lazy iterator of `Result<Row>`
//! that releases whatever it opened (file, cursor, workbook) when it is
//! exhausted, closed, or dropped.
//!
//! - [`get_reader`] picks an adapter from a [`Source`].
//! - `from_csv`, `from_excel`, `from_dbf`, `from_sql`, `from_dicts`,
//!   `from_frame` and `from_query` skip the routing.
//! - Spreadsheet and dBase support sit behind the `excel` and `dbf` features.

pub mod buf;
pub mod classify;
pub mod decode;
pub mod dispatch;
pub mod error;
pub mod memory_db;
pub mod reader;
pub mod readers;
pub mod source;

pub use classify::{is_reader_like, is_row_collection, RowShape};
pub use dispatch::{
    from_csv, from_dbf, from_dicts, from_excel, from_frame, from_query, from_sql, get_reader,
};
pub use error::{DecodeError, Error, Result, SqlError, SqlResult};
pub use memory_db::MemoryConnection;
pub use reader::{Adapted, CloseFn, Reader, Rows};
pub use readers::csv::CsvInput;
pub use readers::dicts::Record;
pub use readers::query::QueryResult;
pub use readers::sql::{Connection, Cursor};
pub use source::{Handle, Mode, Source};
