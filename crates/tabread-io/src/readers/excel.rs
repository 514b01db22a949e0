//! Spreadsheet workbooks (`.xlsx`, `.xls`, ...) through `calamine`.

use std::path::Path;

use tabread_core::config::Worksheet;

use crate::error::{Error, Result};
use crate::reader::Adapted;

#[cfg(feature = "excel")]
pub fn excel_rows(path: &Path, worksheet: &Worksheet) -> Result<Adapted> {
    use calamine::{open_workbook_auto, Reader as _};

    // Report a missing file as io::NotFound rather than a workbook error.
    std::fs::metadata(path)?;
    let mut workbook = open_workbook_auto(path)?;

    let range = match worksheet {
        Worksheet::Index(i) => workbook
            .worksheet_range_at(*i)
            .ok_or_else(|| Error::WorksheetNotFound(format!("index {i}")))??,
        Worksheet::Name(name) => {
            if !workbook.sheet_names().iter().any(|s| s == name) {
                return Err(Error::WorksheetNotFound(name.clone()));
            }
            workbook.worksheet_range(name)?
        }
    };
    #[cfg(feature = "tracing")]
    tracing::debug!(path = %path.display(), ?worksheet, end = ?range.end(), "opened worksheet");

    let (height, width) = range.end().map(|(r, c)| (r + 1, c + 1)).unwrap_or((0, 0));
    let sheet = imp::Sheet {
        _workbook: workbook,
        range,
        width,
        height,
        next: 0,
    };
    let (rows, close) = super::shared(sheet, imp::Sheet::next_row, drop);
    Ok((rows, Some(close)))
}

#[cfg(not(feature = "excel"))]
pub fn excel_rows(_path: &Path, _worksheet: &Worksheet) -> Result<Adapted> {
    Err(Error::MissingDependency {
        package: "calamine",
        feature: "excel",
    })
}

#[cfg(feature = "excel")]
mod imp {
    use std::fs::File;
    use std::io::BufReader;

    use calamine::{Data, Range, Sheets};
    use tabread_core::types::{Row, Value};

    use crate::error::Result;

    pub(super) struct Sheet {
        /// Held so the workbook is released with the reader.
        pub(super) _workbook: Sheets<BufReader<File>>,
        pub(super) range: Range<Data>,
        pub(super) width: u32,
        pub(super) height: u32,
        pub(super) next: u32,
    }

    impl Sheet {
        /// Rows are read from A1 so leading empty rows and columns stay in place.
        pub(super) fn next_row(&mut self) -> Option<Result<Row>> {
            if self.next >= self.height {
                return None;
            }
            let r = self.next;
            self.next += 1;
            let row = (0..self.width)
                .map(|c| self.range.get_value((r, c)).map(cell_value).unwrap_or(Value::Null))
                .collect();
            Some(Ok(row))
        }
    }

    pub(super) fn cell_value(cell: &Data) -> Value {
        match cell {
            Data::Int(i) => Value::I64(*i),
            Data::Float(f) => Value::F64(*f),
            Data::String(s) => Value::Str(s.clone()),
            Data::Bool(b) => Value::Bool(*b),
            Data::DateTime(dt) => Value::F64(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Str(s.clone()),
            Data::Error(e) => Value::Str(e.to_string()),
            Data::Empty => Value::Null,
        }
    }

}
