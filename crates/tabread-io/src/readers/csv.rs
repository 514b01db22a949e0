//! Delimited text: paths, open handles, and iterators of lines.
//!
//! The tokenizer is `csv` with headers and arity checks turned off; every
//! field comes out as `Value::Str`. Bytes are decoded up front by
//! `DecodingReader`, so the tokenizer only ever sees UTF-8.

use std::io::Read;
use std::path::{Path, PathBuf};

use encoding_rs::UTF_8;
use tabread_core::config::{CsvDialect, ReaderConfig};
use tabread_core::types::{Row, Value};

use crate::buf::{bounded_from_path, LineSource};
use crate::decode::{resolve_encoding, DecodingReader};
use crate::error::{Error, Result};
use crate::reader::{Adapted, Rows};
use crate::source::{Handle, Mode};

use super::shared;

/// Where delimited text comes from.
pub enum CsvInput {
    Path(PathBuf),
    Handle(Handle),
    Lines(Box<dyn Iterator<Item = String>>),
}

impl CsvInput {
    pub fn lines<I>(lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String> + 'static,
        I::IntoIter: 'static,
    {
        CsvInput::Lines(Box::new(lines.into_iter().map(Into::into)))
    }
}

impl From<&str> for CsvInput {
    fn from(path: &str) -> Self {
        CsvInput::Path(PathBuf::from(path))
    }
}

impl From<String> for CsvInput {
    fn from(path: String) -> Self {
        CsvInput::Path(PathBuf::from(path))
    }
}

impl From<&Path> for CsvInput {
    fn from(path: &Path) -> Self {
        CsvInput::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for CsvInput {
    fn from(path: PathBuf) -> Self {
        CsvInput::Path(path)
    }
}

impl From<Handle> for CsvInput {
    fn from(handle: Handle) -> Self {
        CsvInput::Handle(handle)
    }
}

pub(crate) fn builder(dialect: &CsvDialect) -> ::csv::ReaderBuilder {
    let mut b = ::csv::ReaderBuilder::new();
    b.has_headers(false)
        .flexible(true)
        .delimiter(dialect.delimiter)
        .quote(dialect.quote)
        .double_quote(dialect.double_quote)
        .escape(dialect.escape)
        .comment(dialect.comment);
    b
}

fn record_to_row(record: ::csv::StringRecord) -> Row {
    record.iter().map(|field| Value::Str(field.to_string())).collect()
}

/// End the sequence after the first decoding failure; whatever the tokenizer
/// still holds at that point is a fragment of a record.
fn until_decode_error<I>(rows: I) -> impl Iterator<Item = Result<Row>>
where
    I: Iterator<Item = Result<Row>>,
{
    let mut failed = false;
    rows.map_while(move |item| {
        if failed {
            return None;
        }
        failed = matches!(item, Err(Error::Decode(_)));
        Some(item)
    })
}

/// Rows from a tokenizer the caller already configured.
pub fn records<R: Read + 'static>(reader: ::csv::Reader<R>) -> Rows {
    Box::new(until_decode_error(
        reader
            .into_records()
            .map(|r| r.map(record_to_row).map_err(Error::from)),
    ))
}

/// Dispatch on the input kind. Only path input returns a cleanup action.
pub fn csv_rows(input: CsvInput, config: &ReaderConfig) -> Result<Adapted> {
    config.validate()?;
    match input {
        CsvInput::Path(path) => from_path(&path, config),
        CsvInput::Handle(handle) => Ok((from_handle(handle, config)?, None)),
        CsvInput::Lines(lines) => Ok((from_lines(lines, config), None)),
    }
}

/// Open `path`, decode it with the configured encoding, and tokenize lazily.
pub fn from_path(path: &Path, config: &ReaderConfig) -> Result<Adapted> {
    let encoding = resolve_encoding(&config.encoding)?;
    let file = bounded_from_path(path, config.buffer_capacity)?;
    #[cfg(feature = "tracing")]
    tracing::debug!(path = %path.display(), encoding = encoding.name(), "opened csv file");

    let decoded = DecodingReader::new(file, encoding);
    let records = builder(&config.csv).from_reader(decoded).into_records();
    let (rows, close) = shared(
        records,
        |records| {
            records
                .next()
                .map(|r| r.map(record_to_row).map_err(Error::from))
        },
        drop,
    );
    Ok((Box::new(until_decode_error(rows)), Some(close)))
}

/// Tokenize an open handle. Binary handles are decoded with the configured
/// encoding; text handles must already be UTF-8.
pub fn from_handle(handle: Handle, config: &ReaderConfig) -> Result<Rows> {
    let encoding = resolve_encoding(&config.encoding)?;
    let encoding = match handle.mode() {
        Mode::Binary => encoding,
        Mode::Text if encoding == UTF_8 => UTF_8,
        Mode::Text => {
            return Err(Error::UnsupportedMode {
                handle: handle.describe(),
                encoding: config.encoding.clone(),
            })
        }
    };
    let decoded = DecodingReader::new(handle.into_inner(), encoding);
    Ok(records(builder(&config.csv).from_reader(decoded)))
}

pub fn from_lines<I>(lines: I, config: &ReaderConfig) -> Rows
where
    I: Iterator<Item = String> + 'static,
{
    records(builder(&config.csv).from_reader(LineSource::new(lines)))
}
