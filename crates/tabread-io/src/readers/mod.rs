//! Adapters from concrete data sources to `Adapted` row sequences.

use std::cell::RefCell;
use std::rc::Rc;

use tabread_core::types::Row;

use crate::error::Result;
use crate::reader::{CloseFn, Rows};

pub mod csv;
pub mod dbf;
pub mod dicts;
pub mod excel;
pub mod frame;
pub mod query;
pub mod sql;

/// Put `resource` in a slot shared by a row iterator and a cleanup action.
///
/// The iterator calls `step` with the resource for every row. The cleanup
/// action takes the resource out and hands it to `release`; from then on the
/// iterator yields `None`.
pub(crate) fn shared<T, S, C>(resource: T, mut step: S, release: C) -> (Rows, CloseFn)
where
    T: 'static,
    S: FnMut(&mut T) -> Option<Result<Row>> + 'static,
    C: FnOnce(T) + 'static,
{
    let slot = Rc::new(RefCell::new(Some(resource)));

    let rows_slot = Rc::clone(&slot);
    let rows = std::iter::from_fn(move || {
        let mut guard = rows_slot.borrow_mut();
        step(guard.as_mut()?)
    });

    let close = move || {
        let taken = slot.borrow_mut().take();
        if let Some(resource) = taken {
            release(resource);
        }
    };

    (Box::new(rows), Box::new(close))
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
