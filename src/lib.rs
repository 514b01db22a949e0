//! tabread: read rows out of whatever holds them.
//!
//! ```
//! use tabread::prelude::*;
//!
//! let lines = vec!["col1,col2", "1,a", "2,b"];
//! let reader = tabread::from_csv(CsvInput::lines(lines), &ReaderConfig::default())?;
//! let rows: Vec<Row> = reader.collect::<tabread::Result<_>>()?;
//! assert_eq!(rows[1], tabread::row!["1", "a"]);
//!
//! let reader = tabread::get_reader(rows, &ReaderConfig::default())?;
//! assert_eq!(reader.count(), 3);
//! # Ok::<(), tabread::Error>(())
//! ```

pub use tabread_core::{config, frame, row, types};
pub use tabread_io::*;

pub mod prelude {
    pub use tabread_core::prelude::{
        Column, CsvDialect, Frame, Index, ReaderConfig, Row, Series, Tabular, Value, Worksheet,
    };
    pub use tabread_io::{CsvInput, Handle, Mode, QueryResult, Reader, Source};
}
