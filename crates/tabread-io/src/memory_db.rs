//! In-memory `Connection` for tests and small embedded tables.
//!
//! Understands exactly one statement shape:
//! `SELECT <* | col [AS alias], ...> FROM <table>`, with an optional
//! trailing `;`. Anything else is rejected the way a real driver would
//! reject bad SQL, which is enough to exercise the table-name fallback.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use tabread_core::types::{Row, Value};

use crate::error::SqlResult;
use crate::readers::sql::{Connection, Cursor};

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryTable {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

/// Shared handle to a set of named tables. Clones see the same tables.
#[derive(Clone, Default)]
pub struct MemoryConnection {
    tables: Rc<RefCell<HashMap<String, Rc<MemoryTable>>>>,
    open_cursors: Rc<Cell<usize>>,
    closed: Rc<Cell<bool>>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace `name`.
    pub fn create_table<S: Into<String>>(
        &self,
        name: &str,
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Row>,
    ) {
        let table = MemoryTable {
            columns: columns.into_iter().map(Into::into).collect(),
            rows,
        };
        self.tables
            .borrow_mut()
            .insert(name.to_ascii_lowercase(), Rc::new(table));
    }

    /// Append a row to an existing table. Open cursors keep their snapshot.
    pub fn insert(&self, name: &str, row: Row) -> SqlResult<()> {
        let mut tables = self.tables.borrow_mut();
        let table = tables
            .get_mut(&name.to_ascii_lowercase())
            .ok_or_else(|| format!("no such table: {name}"))?;
        Rc::make_mut(table).rows.push(row);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.borrow().contains_key(&name.to_ascii_lowercase())
    }

    /// Cursors handed out and not yet closed.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.get()
    }
}

impl Connection for MemoryConnection {
    fn cursor(&self) -> SqlResult<Box<dyn Cursor>> {
        if self.closed.get() {
            return Err("connection is closed".into());
        }
        self.open_cursors.set(self.open_cursors.get() + 1);
        Ok(Box::new(MemoryCursor {
            tables: Rc::clone(&self.tables),
            open_cursors: Rc::clone(&self.open_cursors),
            result: None,
            closed: false,
        }))
    }

    fn close(&self) -> SqlResult<()> {
        self.closed.set(true);
        Ok(())
    }
}

struct ResultSet {
    table: Rc<MemoryTable>,
    projection: Vec<usize>,
    names: Vec<String>,
    next: usize,
}

pub struct MemoryCursor {
    tables: Rc<RefCell<HashMap<String, Rc<MemoryTable>>>>,
    open_cursors: Rc<Cell<usize>>,
    result: Option<ResultSet>,
    closed: bool,
}

impl Cursor for MemoryCursor {
    fn execute(&mut self, operation: &str) -> SqlResult<()> {
        if self.closed {
            return Err("cursor is closed".into());
        }
        let select = parse_select(operation)?;
        let table = self
            .tables
            .borrow()
            .get(&select.table.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| format!("no such table: {}", select.table))?;

        let (projection, names) = match select.columns {
            None => ((0..table.columns.len()).collect(), table.columns.clone()),
            Some(items) => {
                let mut projection = Vec::with_capacity(items.len());
                let mut names = Vec::with_capacity(items.len());
                for (column, alias) in items {
                    let pos = table
                        .columns
                        .iter()
                        .position(|c| c.eq_ignore_ascii_case(&column))
                        .ok_or_else(|| format!("no such column: {column}"))?;
                    projection.push(pos);
                    names.push(alias.unwrap_or(column));
                }
                (projection, names)
            }
        };

        self.result = Some(ResultSet {
            table,
            projection,
            names,
            next: 0,
        });
        Ok(())
    }

    fn description(&self) -> Vec<String> {
        self.result
            .as_ref()
            .map(|r| r.names.clone())
            .unwrap_or_default()
    }

    fn fetch_one(&mut self) -> SqlResult<Option<Row>> {
        if self.closed {
            return Err("cursor is closed".into());
        }
        let Some(result) = self.result.as_mut() else {
            return Err("no statement executed".into());
        };
        let Some(source) = result.table.rows.get(result.next) else {
            return Ok(None);
        };
        result.next += 1;
        let row = result
            .projection
            .iter()
            .map(|&i| source.get(i).cloned().unwrap_or(Value::Null))
            .collect();
        Ok(Some(row))
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.result = None;
            self.open_cursors.set(self.open_cursors.get().saturating_sub(1));
        }
    }
}

#[derive(Debug, PartialEq)]
struct Select {
    /// `None` for `*`; otherwise `(column, alias)` pairs.
    columns: Option<Vec<(String, Option<String>)>>,
    table: String,
}

fn parse_select(sql: &str) -> SqlResult<Select> {
    let text = sql.trim().trim_end_matches(';').trim_end();
    // ASCII upper-casing keeps byte offsets aligned with `text`.
    let upper = text.to_ascii_uppercase();

    if !upper.starts_with("SELECT ") {
        let word = text.split_whitespace().next().unwrap_or("");
        return Err(format!("syntax error near {word:?}").into());
    }
    let from = upper
        .find(" FROM ")
        .ok_or_else(|| format!("syntax error: missing FROM in {text:?}"))?;

    let list = text["SELECT ".len()..from].trim();
    let table = text[from + " FROM ".len()..].trim();
    if table.is_empty() || table.contains(char::is_whitespace) {
        return Err(format!("unsupported table expression {table:?}").into());
    }

    let columns = if list == "*" {
        None
    } else {
        let mut items = Vec::new();
        for item in list.split(',') {
            let item = item.trim();
            let upper_item = item.to_ascii_uppercase();
            let (column, alias) = match upper_item.find(" AS ") {
                Some(at) => (item[..at].trim(), Some(item[at + 4..].trim().to_string())),
                None => (item, None),
            };
            if column.is_empty() || column.contains(char::is_whitespace) {
                return Err(format!("unsupported column expression {item:?}").into());
            }
            items.push((column.to_string(), alias));
        }
        Some(items)
    };

    Ok(Select {
        columns,
        table: table.to_string(),
    })
}
