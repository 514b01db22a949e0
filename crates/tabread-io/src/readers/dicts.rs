//! Records keyed by field name (`serde_json` objects) to header + rows.

use std::iter;

use serde_json::{Map, Value as JsonValue};
use tabread_core::types::{Row, Value};

use crate::error::Result;
use crate::reader::Rows;

pub type Record = Map<String, JsonValue>;

/// Header and rows for a stream of records.
///
/// Without `fieldnames` the first record's keys (in insertion order) become
/// the header. Keys missing from a record yield `Null`. With `restkey`, the
/// header gains that name and each row ends in a `List` of the values whose
/// keys are not in the header; without it those values are dropped.
pub fn dict_rows<I>(records: I, fieldnames: Option<Vec<String>>, restkey: Option<String>) -> Rows
where
    I: IntoIterator<Item = Result<Record>>,
    I::IntoIter: 'static,
{
    let mut records = records.into_iter().peekable();
    let fieldnames = match fieldnames {
        Some(names) => names,
        None => match records.peek() {
            Some(Ok(first)) => first.keys().cloned().collect(),
            Some(Err(_)) => {
                let err = records.next().and_then(|r| r.err());
                return Box::new(err.into_iter().map(Err));
            }
            None => return Box::new(iter::empty()),
        },
    };

    let mut header: Row = fieldnames.iter().cloned().map(Value::Str).collect();
    if let Some(key) = &restkey {
        header.push(Value::Str(key.clone()));
    }
    let keep_rest = restkey.is_some();

    let rows = records.map(move |record| {
        let record = record?;
        let mut row: Row = fieldnames
            .iter()
            .map(|name| record.get(name).cloned().map(Value::from).unwrap_or(Value::Null))
            .collect();
        if keep_rest {
            let rest = record
                .into_iter()
                .filter(|(key, _)| !fieldnames.contains(key))
                .map(|(_, v)| Value::from(v))
                .collect();
            row.push(Value::List(rest));
        }
        Ok(row)
    });
    Box::new(iter::once(Ok(header)).chain(rows))
}
