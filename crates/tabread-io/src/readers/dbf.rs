//! dBase table files through the `dbase` crate.
//!
//! The field-name row comes first, then one live record per step. Records
//! flagged deleted are skipped. Each record's raw bytes are read alongside
//! the parsed record, which is how deletion flags are seen and how character
//! fields get decoded under the table's code page.

use std::path::Path;

use crate::error::Result;
use crate::reader::Adapted;

/// Rows of the table at `path`. Character fields are decoded with
/// `encoding` when given, else with the code page named in the header.
#[cfg(feature = "dbf")]
pub fn dbf_rows(path: &Path, encoding: Option<&str>) -> Result<Adapted> {
    use std::fs::File;
    use std::io::BufReader;

    use tabread_core::types::Value;

    use crate::decode::resolve_encoding;

    // Opening the raw handle first reports a missing file as io::NotFound.
    let raw = BufReader::new(File::open(path)?);
    let reader = dbase::Reader::from_path(path)?;

    let encoding = match encoding {
        Some(label) => Some(resolve_encoding(label)?),
        None => imp::code_page(reader.header().code_page_mark),
    };
    let fields: Vec<imp::Field> = reader
        .fields()
        .iter()
        .map(|f| imp::Field {
            name: f.name().to_string(),
            length: usize::from(f.length()),
            character: f.field_type() == dbase::FieldType::Character,
        })
        .collect();
    let header = reader.header();
    let total = header.num_records as usize;
    let first = u64::from(header.offset_to_first_record);
    let size = usize::from(header.size_of_record);
    #[cfg(feature = "tracing")]
    tracing::debug!(
        path = %path.display(),
        fields = fields.len(),
        records = total,
        encoding = encoding.map(|e| e.name()),
        "opened dbf table"
    );

    let table = imp::Table {
        header: Some(fields.iter().map(|f| Value::Str(f.name.clone())).collect()),
        reader,
        raw,
        fields,
        encoding,
        first,
        size,
        buf: vec![0u8; size],
        total,
        next: 0,
    };
    let (rows, close) = super::shared(table, imp::Table::next_row, drop);
    Ok((rows, Some(close)))
}

#[cfg(not(feature = "dbf"))]
pub fn dbf_rows(_path: &Path, _encoding: Option<&str>) -> Result<Adapted> {
    Err(crate::error::Error::MissingDependency {
        package: "dbase",
        feature: "dbf",
    })
}

#[cfg(feature = "dbf")]
mod imp {
    use std::collections::HashMap;
    use std::fs::File;
    use std::io::{self, BufReader, Read, Seek, SeekFrom};

    use dbase::{CodePageMark, FieldValue};
    use encoding_rs::Encoding;
    use tabread_core::types::{Row, Value};

    use crate::error::{DecodeError, Error, Result};

    const DELETED: u8 = b'*';

    pub(super) struct Field {
        pub(super) name: String,
        pub(super) length: usize,
        pub(super) character: bool,
    }

    pub(super) struct Table {
        pub(super) header: Option<Row>,
        pub(super) reader: dbase::Reader<BufReader<File>>,
        /// Second handle on the same file for the raw record bytes.
        pub(super) raw: BufReader<File>,
        pub(super) fields: Vec<Field>,
        pub(super) encoding: Option<&'static Encoding>,
        pub(super) first: u64,
        pub(super) size: usize,
        /// Raw bytes of the current record, deletion flag included.
        pub(super) buf: Vec<u8>,
        pub(super) total: usize,
        pub(super) next: usize,
    }

    impl Table {
        pub(super) fn next_row(&mut self) -> Option<Result<Row>> {
            if let Some(header) = self.header.take() {
                return Some(Ok(header));
            }
            while self.next < self.total {
                let idx = self.next;
                self.next += 1;
                match self.read_raw(idx) {
                    Ok(true) => return Some(self.read_record(idx)),
                    Ok(false) => continue,
                    Err(err) => {
                        self.next = self.total;
                        return Some(Err(err));
                    }
                }
            }
            None
        }

        fn offset(&self, idx: usize) -> u64 {
            self.first + idx as u64 * self.size as u64
        }

        /// Load record `idx` into `buf`; false when it is flagged deleted.
        fn read_raw(&mut self, idx: usize) -> Result<bool> {
            self.raw.seek(SeekFrom::Start(self.offset(idx)))?;
            self.raw.read_exact(&mut self.buf)?;
            Ok(self.buf.first() != Some(&DELETED))
        }

        /// Parse live record `idx`; `buf` must already hold its bytes.
        fn read_record(&mut self, idx: usize) -> Result<Row> {
            self.reader.seek(idx)?;
            let record = match self.reader.iter_records().next() {
                Some(record) => record?,
                None => {
                    return Err(Error::Io(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("record {idx} missing from table"),
                    )))
                }
            };
            let mut parsed: HashMap<String, FieldValue> = record.into_iter().collect();

            let base = self.offset(idx);
            let mut at = 1;
            let mut row = Vec::with_capacity(self.fields.len());
            for field in &self.fields {
                let bytes = self.buf.get(at..at + field.length).unwrap_or_default();
                let value = match self.encoding {
                    Some(encoding) if field.character => {
                        character_value(bytes, encoding, base + at as u64)?
                    }
                    _ => parsed
                        .remove(&field.name)
                        .map(field_value)
                        .unwrap_or(Value::Null),
                };
                row.push(value);
                at += field.length;
            }
            Ok(row)
        }
    }

    /// Code pages `encoding_rs` knows; DOS code pages fall back to the
    /// `dbase` crate's own decoding.
    pub(super) fn code_page(mark: CodePageMark) -> Option<&'static Encoding> {
        use encoding_rs::*;

        match mark {
            CodePageMark::Utf8 => Some(UTF_8),
            CodePageMark::CP866 => Some(IBM866),
            CodePageMark::CP874 => Some(WINDOWS_874),
            CodePageMark::CP932 => Some(SHIFT_JIS),
            CodePageMark::CP936 => Some(GBK),
            CodePageMark::CP949 => Some(EUC_KR),
            CodePageMark::CP950 => Some(BIG5),
            CodePageMark::CP1250 => Some(WINDOWS_1250),
            CodePageMark::CP1251 => Some(WINDOWS_1251),
            CodePageMark::CP1252 => Some(WINDOWS_1252),
            CodePageMark::CP1253 => Some(WINDOWS_1253),
            CodePageMark::CP1254 => Some(WINDOWS_1254),
            CodePageMark::CP1255 => Some(WINDOWS_1255),
            CodePageMark::CP1256 => Some(WINDOWS_1256),
            _ => None,
        }
    }

    /// Space-padded, optionally NUL-terminated text. Blank is `Null`.
    pub(super) fn character_value(
        bytes: &[u8],
        encoding: &'static Encoding,
        position: u64,
    ) -> Result<Value> {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        let bytes = &bytes[..end];
        let start = bytes.iter().position(|&b| b != b' ').unwrap_or(bytes.len());
        let stop = bytes.iter().rposition(|&b| b != b' ').map_or(start, |i| i + 1);
        let text = &bytes[start..stop];
        if text.is_empty() {
            return Ok(Value::Null);
        }
        encoding
            .decode_without_bom_handling_and_without_replacement(text)
            .map(|s| Value::Str(s.into_owned()))
            .ok_or(Error::Decode(DecodeError {
                encoding: encoding.name(),
                position,
            }))
    }

    pub(super) fn field_value(value: FieldValue) -> Value {
        match value {
            FieldValue::Character(s) => s.into(),
            FieldValue::Numeric(n) => n.into(),
            FieldValue::Logical(b) => b.into(),
            FieldValue::Float(f) => f.map(f64::from).into(),
            FieldValue::Integer(i) => Value::I64(i.into()),
            FieldValue::Double(d) | FieldValue::Currency(d) => Value::F64(d),
            FieldValue::Memo(m) => Value::Str(m),
            FieldValue::Date(Some(d)) => {
                Value::Str(format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day()))
            }
            FieldValue::Date(None) => Value::Null,
            other => Value::Str(format!("{other:?}")),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use encoding_rs::{UTF_8, WINDOWS_1252};

        #[test]
        fn test_field_values() {
            assert_eq!(field_value(FieldValue::Character(None)), Value::Null);
            assert_eq!(
                field_value(FieldValue::Character(Some("x".into()))),
                Value::from("x")
            );
            assert_eq!(field_value(FieldValue::Numeric(Some(2.0))), Value::F64(2.0));
            assert_eq!(field_value(FieldValue::Integer(7)), Value::I64(7));
            assert_eq!(field_value(FieldValue::Logical(Some(false))), Value::Bool(false));
        }

        #[test]
        fn test_character_value_trims_and_decodes() {
            assert_eq!(
                character_value(b" caf\xe9 ", WINDOWS_1252, 0).unwrap(),
                Value::from("caf\u{e9}")
            );
            assert_eq!(character_value(b"ab\0zz", UTF_8, 0).unwrap(), Value::from("ab"));
            assert_eq!(character_value(b"     ", UTF_8, 0).unwrap(), Value::Null);
        }

        #[test]
        fn test_character_value_rejects_bad_bytes() {
            match character_value(b"caf\xe9", UTF_8, 40) {
                Err(Error::Decode(d)) => {
                    assert_eq!(d.encoding, "UTF-8");
                    assert_eq!(d.position, 40);
                }
                other => panic!("expected decode error, got {other:?}"),
            }
        }

        #[test]
        fn test_code_page_marks() {
            assert_eq!(code_page(CodePageMark::CP1252), Some(WINDOWS_1252));
            assert_eq!(code_page(CodePageMark::Utf8), Some(UTF_8));
            assert_eq!(code_page(CodePageMark::Undefined), None);
            assert_eq!(code_page(CodePageMark::CP437), None);
        }
    }
}
