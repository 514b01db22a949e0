use thiserror::Error;

/// Result type local to tabread-io.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error produced by a SQL driver behind `Connection`/`Cursor`.
pub type SqlError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for `Connection`/`Cursor` implementations.
pub type SqlResult<T> = std::result::Result<T, SqlError>;

/// Bytes that cannot be decoded under the requested encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{encoding}' codec can't decode byte sequence at position {position}")]
pub struct DecodeError {
    pub encoding: &'static str,
    /// Offset of the first malformed byte in the raw input.
    pub position: u64,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("unable to determine constructor for {description}: specify a constructor to load, for example from_csv(...), from_dicts(...), from_frame(...), etc.")]
    UnsupportedType { description: String },

    #[error("unsupported mode: {handle} holds decoded text and cannot be read as '{encoding}' (open it in binary mode instead)")]
    UnsupportedMode { handle: String, encoding: String },

    #[error("optional dependency '{package}' is not available: this constructor requires the `{feature}` feature")]
    MissingDependency {
        package: &'static str,
        feature: &'static str,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("unknown encoding: {0}")]
    UnknownEncoding(String),

    #[error("worksheet not found: {0}")]
    WorksheetNotFound(String),

    #[error("element {position} is {kind}, not a row sequence")]
    NotARow { position: usize, kind: &'static str },

    #[error("element {position} is {kind}, not a record")]
    NotARecord { position: usize, kind: &'static str },

    #[error("query execution failed: {0}")]
    Sql(#[source] SqlError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(csv::Error),

    #[cfg(feature = "excel")]
    #[error(transparent)]
    Excel(#[from] calamine::Error),

    #[cfg(feature = "dbf")]
    #[error(transparent)]
    Dbf(#[from] dbase::Error),

    #[error(transparent)]
    Core(#[from] tabread_core::Error),
}

impl Error {
    pub(crate) fn unsupported(description: impl Into<String>) -> Self {
        Error::UnsupportedType {
            description: description.into(),
        }
    }

    /// True for the "file does not exist" case, wherever it surfaced.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

impl From<csv::Error> for Error {
    /// Decoding failures travel through the tokenizer as `io::Error`s; pull
    /// them back out so callers see `Error::Decode` rather than a CSV error.
    fn from(e: csv::Error) -> Self {
        if let csv::ErrorKind::Io(io) = e.kind() {
            if let Some(decode) = io.get_ref().and_then(|inner| inner.downcast_ref::<DecodeError>()) {
                return Error::Decode(decode.clone());
            }
        }
        Error::Csv(e)
    }
}
