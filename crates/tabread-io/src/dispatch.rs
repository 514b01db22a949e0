//! Pick an adapter for a `Source` and wrap the result in a `Reader`.
//!
//! The `from_*` functions are the explicit constructors; `get_reader` routes
//! to one of them based on the variant (and, for paths and handles, on the
//! file extension).

use std::iter;
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use tabread_core::config::ReaderConfig;
use tabread_core::frame::Tabular;
use tabread_core::types::Row;

use crate::classify::is_reader_like;
use crate::error::{Error, Result};
use crate::reader::Reader;
use crate::readers::csv::{self, CsvInput};
use crate::readers::dicts::{self, Record};
use crate::readers::query::{self, QueryResult};
use crate::readers::sql::{self, Connection};
use crate::readers::{dbf, excel, frame, json_kind};
use crate::source::Source;

/// Delimited text from a path, handle, or lines.
pub fn from_csv(input: impl Into<CsvInput>, config: &ReaderConfig) -> Result<Reader> {
    csv::csv_rows(input.into(), config).map(Reader::from)
}

/// One worksheet (`config.worksheet`) of a workbook.
pub fn from_excel(path: impl AsRef<Path>, config: &ReaderConfig) -> Result<Reader> {
    excel::excel_rows(path.as_ref(), &config.worksheet).map(Reader::from)
}

/// A dBase table; character fields use `config.dbf_encoding` when set.
pub fn from_dbf(path: impl AsRef<Path>, config: &ReaderConfig) -> Result<Reader> {
    dbf::dbf_rows(path.as_ref(), config.dbf_encoding.as_deref()).map(Reader::from)
}

/// Rows of a table or query; `table_or_query` may be a bare table name.
pub fn from_sql(connection: &dyn Connection, table_or_query: &str) -> Result<Reader> {
    sql::sql_rows(connection, table_or_query).map(Reader::from)
}

/// Records keyed by field name, using `config.fieldnames` and `config.restkey`.
pub fn from_dicts<I>(records: I, config: &ReaderConfig) -> Reader
where
    I: IntoIterator<Item = Record>,
    I::IntoIter: 'static,
{
    Reader::new(dicts::dict_rows(
        records.into_iter().map(Ok),
        config.fieldnames.clone(),
        config.restkey.clone(),
    ))
}

pub fn from_frame(data: impl Into<Tabular>, config: &ReaderConfig) -> Reader {
    Reader::new(frame::frame_rows(data, config.include_index))
}

pub fn from_query(result: QueryResult, config: &ReaderConfig) -> Reader {
    Reader::new(query::query_rows(result, config.fieldnames.clone()))
}

/// Build a `Reader` for any supported source.
///
/// Paths route by lower-cased extension (`.csv`, `.xlsx`/`.xls`, `.dbf`);
/// handles must be named `*.csv`. JSON values route on their first element:
/// objects are records, arrays are rows. A collection (unlike a one-shot
/// stream) is taken as rows only when its first `config.readerlike_sample`
/// elements all are. Anything else is `Error::UnsupportedType`.
pub fn get_reader<'a>(source: impl Into<Source<'a>>, config: &ReaderConfig) -> Result<Reader> {
    let source = source.into();
    let readerlike = is_reader_like(&source, config.readerlike_sample);
    #[cfg(feature = "tracing")]
    tracing::debug!(source = %source.describe(), readerlike, "selecting reader");

    match source {
        Source::Path(path) => route_path(path, config),
        Source::Handle(handle) if handle.has_extension("csv") => from_csv(handle, config),
        Source::Handle(handle) => Err(Error::unsupported(handle.describe())),
        Source::Sql { connection, query } => from_sql(connection, &query),
        Source::Tabular(data) => Ok(from_frame(data, config)),
        Source::Query(result) => Ok(from_query(result, config)),
        // An empty collection is vacuously reader-like but has no shape to route on.
        Source::Records(items) if readerlike && !items.is_empty() => {
            Ok(Reader::new(array_rows(Box::new(items.into_iter()))))
        }
        Source::Records(items) => route_values(Box::new(items.into_iter()), false, config),
        Source::Stream(values) => route_values(values, true, config),
        Source::Rows(rows) => Ok(Reader::from_rows(rows)),
        Source::Reader(reader) => Ok(reader),
        Source::Csv(reader) => Ok(Reader::new(csv::records(reader))),
    }
}

fn route_path(path: PathBuf, config: &ReaderConfig) -> Result<Reader> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("csv") => from_csv(path, config),
        Some("xlsx") | Some("xls") => from_excel(&path, config),
        Some("dbf") => from_dbf(&path, config),
        _ => Err(Error::unsupported(format!(
            "path {:?}",
            path.display().to_string()
        ))),
    }
}

/// Route on the first value. `arrays` is false for collections that already
/// failed the reader-like check, so an array first element is not enough.
fn route_values(
    mut values: Box<dyn Iterator<Item = JsonValue>>,
    arrays: bool,
    config: &ReaderConfig,
) -> Result<Reader> {
    match values.next() {
        Some(JsonValue::Object(first)) => {
            let records = iter::once(JsonValue::Object(first))
                .chain(values)
                .enumerate()
                .map(|(position, value)| match value {
                    JsonValue::Object(record) => Ok(record),
                    other => Err(Error::NotARecord {
                        position,
                        kind: json_kind(&other),
                    }),
                });
            Ok(Reader::new(dicts::dict_rows(
                records,
                config.fieldnames.clone(),
                config.restkey.clone(),
            )))
        }
        Some(JsonValue::Array(first)) if arrays => Ok(Reader::new(array_rows(Box::new(
            iter::once(JsonValue::Array(first)).chain(values),
        )))),
        Some(JsonValue::Array(_)) => Err(Error::unsupported(format!(
            "collection whose first {} elements are not all rows",
            config.readerlike_sample
        ))),
        Some(other) => Err(Error::unsupported(format!(
            "collection of {}s",
            json_kind(&other).trim_start_matches("an ").trim_start_matches("a ")
        ))),
        None => Err(Error::unsupported("empty collection")),
    }
}

/// JSON arrays taken as rows; anything else is `NotARow` at its position.
fn array_rows(
    values: Box<dyn Iterator<Item = JsonValue>>,
) -> impl Iterator<Item = Result<Row>> {
    values.enumerate().map(|(position, value)| match value {
        JsonValue::Array(cells) => Ok(cells.into_iter().map(Into::into).collect::<Row>()),
        other => Err(Error::NotARow {
            position,
            kind: json_kind(&other),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tabread_core::row;

    fn collect(reader: Reader) -> Vec<Row> {
        reader.map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_records_route_to_dicts() {
        let values = vec![json!({"a": 1, "b": "x"}), json!({"a": 2, "b": "y"})];
        let reader = get_reader(values, &ReaderConfig::default()).unwrap();
        assert_eq!(collect(reader), vec![row!["a", "b"], row![1, "x"], row![2, "y"]]);
    }

    #[test]
    fn test_arrays_pass_through() {
        let values = vec![json!(["a", "b"]), json!([1, 2])];
        let reader = get_reader(Source::stream(values), &ReaderConfig::default()).unwrap();
        assert_eq!(collect(reader), vec![row!["a", "b"], row![1, 2]]);
    }

    #[test]
    fn test_mixed_elements_error_in_place() {
        let values = vec![json!(["a"]), json!("oops")];
        let mut reader = get_reader(Source::stream(values), &ReaderConfig::default()).unwrap();
        assert!(reader.next().unwrap().is_ok());
        match reader.next() {
            Some(Err(Error::NotARow { position, kind })) => {
                assert_eq!(position, 1);
                assert_eq!(kind, "a string");
            }
            other => panic!("expected NotARow, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_inputs() {
        let cfg = ReaderConfig::default();
        for source in [
            Source::from("notes.txt"),
            Source::from(Vec::<JsonValue>::new()),
            Source::from(vec![json!(1), json!(2)]),
        ] {
            let err = get_reader(source, &cfg).err().unwrap();
            assert!(matches!(err, Error::UnsupportedType { .. }), "{err}");
        }
    }

    #[test]
    fn test_collection_failing_sample_is_unsupported() {
        let values = vec![json!(["a"]), json!({"b": 1}), json!(["c"])];
        let err = get_reader(values, &ReaderConfig::default()).err().unwrap();
        assert!(matches!(err, Error::UnsupportedType { .. }), "{err}");
    }

    #[test]
    fn test_sample_size_only_bounds_the_check() {
        let cfg = ReaderConfig {
            readerlike_sample: 1,
            ..ReaderConfig::default()
        };
        let values = vec![json!(["a"]), json!({"b": 1})];
        let mut reader = get_reader(values, &cfg).unwrap();
        assert!(reader.next().unwrap().is_ok());
        assert!(matches!(reader.next(), Some(Err(Error::NotARow { position: 1, .. }))));
    }

    #[test]
    fn test_reader_passes_through() {
        let reader = Reader::with_close(vec![Ok(row!["a"])], || {});
        let reader = get_reader(reader, &ReaderConfig::default()).unwrap();
        assert!(reader.has_closefunc());
    }
}
