//! The closed set of inputs the dispatcher understands.
//!
//! Callers describe what they have by picking a `Source` variant (usually via
//! a `From` conversion); the dispatcher then routes on the variant and, for
//! paths, handles, and JSON values, on what it finds inside.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use tabread_core::frame::{Frame, Index, Series, Tabular};
use tabread_core::types::Row;

use crate::reader::Reader;
use crate::readers::query::QueryResult;
use crate::readers::sql::Connection;

/// How bytes from a handle should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Raw bytes, decoded with the configured encoding.
    Binary,
    /// Already-decoded UTF-8 text.
    Text,
}

/// An open, readable stream, optionally carrying the name it was opened under.
pub struct Handle {
    name: Option<String>,
    mode: Mode,
    inner: Box<dyn Read>,
}

impl Handle {
    pub fn binary<R: Read + 'static>(inner: R) -> Self {
        Self {
            name: None,
            mode: Mode::Binary,
            inner: Box::new(inner),
        }
    }

    pub fn text<R: Read + 'static>(inner: R) -> Self {
        Self {
            name: None,
            mode: Mode::Text,
            inner: Box::new(inner),
        }
    }

    /// Open a file in binary mode, named after its path.
    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Ok(Self::binary(file).named(path.as_ref().to_string_lossy()))
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn into_inner(self) -> Box<dyn Read> {
        self.inner
    }

    /// Case-insensitive check of the name's extension (`ext` without the dot).
    pub(crate) fn has_extension(&self, ext: &str) -> bool {
        self.name
            .as_deref()
            .and_then(|n| Path::new(n).extension())
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext))
    }

    pub(crate) fn describe(&self) -> String {
        let mode = match self.mode {
            Mode::Binary => "binary",
            Mode::Text => "text",
        };
        match &self.name {
            Some(name) => format!("{mode} handle {name:?}"),
            None => format!("unnamed {mode} handle"),
        }
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

pub enum Source<'a> {
    /// File path; the extension picks the adapter.
    Path(PathBuf),
    /// Open stream; only `.csv`-named handles are routable.
    Handle(Handle),
    /// Database connection plus a table name or query.
    Sql {
        connection: &'a dyn Connection,
        query: String,
    },
    Tabular(Tabular),
    Query(QueryResult),
    /// Re-iterable JSON values: objects are records, arrays are rows.
    Records(Vec<serde_json::Value>),
    /// One-shot stream of JSON values, routed like `Records`.
    Stream(Box<dyn Iterator<Item = serde_json::Value>>),
    /// Rows that are already in shape.
    Rows(Vec<Row>),
    Reader(Reader),
    /// The CSV tokenizer's own record reader.
    Csv(csv::Reader<Box<dyn Read>>),
}

impl<'a> Source<'a> {
    pub fn sql(connection: &'a dyn Connection, table_or_query: impl Into<String>) -> Self {
        Source::Sql {
            connection,
            query: table_or_query.into(),
        }
    }

    pub fn stream<I>(values: I) -> Self
    where
        I: IntoIterator<Item = serde_json::Value>,
        I::IntoIter: 'static,
    {
        Source::Stream(Box::new(values.into_iter()))
    }

    /// Human-readable kind, used in unsupported-type errors.
    pub fn describe(&self) -> String {
        match self {
            Source::Path(p) => format!("path {:?}", p.display().to_string()),
            Source::Handle(h) => h.describe(),
            Source::Sql { query, .. } => format!("connection query {query:?}"),
            Source::Tabular(Tabular::Frame(_)) => "frame".to_string(),
            Source::Tabular(Tabular::Series(_)) => "series".to_string(),
            Source::Tabular(Tabular::Index(_)) => "index".to_string(),
            Source::Query(_) => "query result".to_string(),
            Source::Records(items) => format!("collection of {} values", items.len()),
            Source::Stream(_) => "value stream".to_string(),
            Source::Rows(rows) => format!("{} rows", rows.len()),
            Source::Reader(_) => "reader".to_string(),
            Source::Csv(_) => "csv reader".to_string(),
        }
    }
}

impl fmt::Debug for Source<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Source({})", self.describe())
    }
}

impl From<&str> for Source<'_> {
    fn from(path: &str) -> Self {
        Source::Path(PathBuf::from(path))
    }
}

impl From<String> for Source<'_> {
    fn from(path: String) -> Self {
        Source::Path(PathBuf::from(path))
    }
}

impl From<&Path> for Source<'_> {
    fn from(path: &Path) -> Self {
        Source::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for Source<'_> {
    fn from(path: PathBuf) -> Self {
        Source::Path(path)
    }
}

impl From<Handle> for Source<'_> {
    fn from(handle: Handle) -> Self {
        Source::Handle(handle)
    }
}

impl From<Tabular> for Source<'_> {
    fn from(t: Tabular) -> Self {
        Source::Tabular(t)
    }
}

impl From<Frame> for Source<'_> {
    fn from(f: Frame) -> Self {
        Source::Tabular(Tabular::Frame(f))
    }
}

impl From<Series> for Source<'_> {
    fn from(s: Series) -> Self {
        Source::Tabular(Tabular::Series(s))
    }
}

impl From<Index> for Source<'_> {
    fn from(i: Index) -> Self {
        Source::Tabular(Tabular::Index(i))
    }
}

impl From<QueryResult> for Source<'_> {
    fn from(q: QueryResult) -> Self {
        Source::Query(q)
    }
}

impl From<Vec<serde_json::Value>> for Source<'_> {
    fn from(items: Vec<serde_json::Value>) -> Self {
        Source::Records(items)
    }
}

impl From<Vec<Row>> for Source<'_> {
    fn from(rows: Vec<Row>) -> Self {
        Source::Rows(rows)
    }
}

impl From<Reader> for Source<'_> {
    fn from(r: Reader) -> Self {
        Source::Reader(r)
    }
}

impl From<csv::Reader<Box<dyn Read>>> for Source<'_> {
    fn from(r: csv::Reader<Box<dyn Read>>) -> Self {
        Source::Csv(r)
    }
}
