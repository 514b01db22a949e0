//! Reader configuration that callers can serialize/deserialize.
//!
//! One `ReaderConfig` carries the knobs of every adapter; each adapter reads
//! only the fields it cares about.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tokenizer settings for delimited text. Defaults follow the "excel" dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvDialect {
    pub delimiter: u8,
    pub quote: u8,
    /// Two consecutive quotes inside a quoted field stand for one quote.
    pub double_quote: bool,
    pub escape: Option<u8>,
    /// Lines starting with this byte are skipped.
    pub comment: Option<u8>,
}

impl Default for CsvDialect {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            double_quote: true,
            escape: None,
            comment: None,
        }
    }
}

/// Worksheet selector for spreadsheet sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Worksheet {
    /// Zero-based position in the workbook.
    Index(usize),
    Name(String),
}

impl Default for Worksheet {
    fn default() -> Self {
        Worksheet::Index(0)
    }
}

impl From<usize> for Worksheet {
    fn from(i: usize) -> Self {
        Worksheet::Index(i)
    }
}

impl From<&str> for Worksheet {
    fn from(name: &str) -> Self {
        Worksheet::Name(name.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Text encoding label for delimited text (WHATWG label, e.g. `utf-8`,
    /// `iso-8859-1`, `utf-16`). UTF-8 is always decoded BOM-aware.
    pub encoding: String,

    pub csv: CsvDialect,

    /// Worksheet to load from spreadsheet sources.
    pub worksheet: Worksheet,

    /// Code page for dBase character fields. `None` uses the code page
    /// recorded in the table header.
    pub dbf_encoding: Option<String>,

    /// Explicit header for dictionary records and query results.
    pub fieldnames: Option<Vec<String>>,

    /// When set, dictionary keys outside the header are collected into a
    /// trailing list cell announced under this name.
    pub restkey: Option<String>,

    /// Emit index labels as leading columns for frames and series.
    pub include_index: bool,

    /// How many leading elements the reader-like check inspects.
    pub readerlike_sample: usize,

    /// Read buffer size (bytes) for files opened by path.
    pub buffer_capacity: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            encoding: "utf-8".to_string(),
            csv: CsvDialect::default(),
            worksheet: Worksheet::default(),
            dbf_encoding: None,
            fieldnames: None,
            restkey: None,
            include_index: true,
            readerlike_sample: 2,
            buffer_capacity: 64 * 1024, // 64 KiB
        }
    }
}

impl ReaderConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `TABREAD_ENCODING`: text encoding label
    /// - `TABREAD_DELIMITER`: single-byte field delimiter
    /// - `TABREAD_QUOTE`: single-byte quote character
    /// - `TABREAD_WORKSHEET`: worksheet index (digits) or name
    /// - `TABREAD_DBF_ENCODING`: code page label for dBase tables
    /// - `TABREAD_INCLUDE_INDEX`: `true`/`false`
    /// - `TABREAD_READERLIKE_SAMPLE`: elements inspected by the reader-like check
    /// - `TABREAD_BUFFER_BYTES`: read buffer size
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("TABREAD_ENCODING") {
            if !s.trim().is_empty() {
                cfg.encoding = s.trim().to_string();
            }
        }

        if let Ok(s) = std::env::var("TABREAD_DELIMITER") {
            if let Some(b) = single_byte(&s) {
                cfg.csv.delimiter = b;
            }
        }

        if let Ok(s) = std::env::var("TABREAD_QUOTE") {
            if let Some(b) = single_byte(&s) {
                cfg.csv.quote = b;
            }
        }

        if let Ok(s) = std::env::var("TABREAD_WORKSHEET") {
            cfg.worksheet = match s.parse::<usize>() {
                Ok(i) => Worksheet::Index(i),
                Err(_) => Worksheet::Name(s),
            };
        }

        if let Ok(s) = std::env::var("TABREAD_DBF_ENCODING") {
            if !s.trim().is_empty() {
                cfg.dbf_encoding = Some(s.trim().to_string());
            }
        }

        if let Ok(s) = std::env::var("TABREAD_INCLUDE_INDEX") {
            if let Ok(v) = s.parse::<bool>() {
                cfg.include_index = v;
            }
        }

        if let Ok(s) = std::env::var("TABREAD_READERLIKE_SAMPLE") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.readerlike_sample = v;
            }
        }

        if let Ok(s) = std::env::var("TABREAD_BUFFER_BYTES") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.buffer_capacity = v;
            }
        }

        cfg
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings no adapter can work with.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_capacity == 0 {
            return Err(Error::Config("buffer_capacity must be positive".into()));
        }
        if self.csv.delimiter == self.csv.quote {
            return Err(Error::Config(format!(
                "delimiter and quote are both {:?}",
                self.csv.delimiter as char
            )));
        }
        if self.encoding.trim().is_empty() {
            return Err(Error::Config("encoding label is empty".into()));
        }
        Ok(())
    }

    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = label.into();
        self
    }

    pub fn with_worksheet(mut self, worksheet: impl Into<Worksheet>) -> Self {
        self.worksheet = worksheet.into();
        self
    }

    pub fn with_dbf_encoding(mut self, label: impl Into<String>) -> Self {
        self.dbf_encoding = Some(label.into());
        self
    }

    pub fn with_fieldnames<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.fieldnames = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_restkey(mut self, key: impl Into<String>) -> Self {
        self.restkey = Some(key.into());
        self
    }

    pub fn with_index(mut self, include: bool) -> Self {
        self.include_index = include;
        self
    }
}

fn single_byte(s: &str) -> Option<u8> {
    match s.as_bytes() {
        [b] => Some(*b),
        b"\\t" => Some(b'\t'),
        _ => None,
    }
}
