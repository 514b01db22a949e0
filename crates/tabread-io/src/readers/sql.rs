//! Relational sources behind a small DB-API style pair of traits.
//!
//! A driver implements `Connection` and `Cursor`; `sql_rows` executes a query
//! (or reads a whole table by name) and streams the result one `fetch_one`
//! at a time. The cursor is the resource: closing the reader closes it.

use tabread_core::types::{Row, Value};

use crate::error::{Error, Result, SqlResult};
use crate::reader::Adapted;

use super::shared;

pub trait Cursor {
    fn execute(&mut self, operation: &str) -> SqlResult<()>;

    /// Column names of the last executed statement, in select order.
    fn description(&self) -> Vec<String>;

    /// Next row of the last executed statement, `None` when drained.
    fn fetch_one(&mut self) -> SqlResult<Option<Row>>;

    /// Release the cursor. Must tolerate being called more than once.
    fn close(&mut self);
}

pub trait Connection {
    fn cursor(&self) -> SqlResult<Box<dyn Cursor>>;

    fn commit(&self) -> SqlResult<()> {
        Ok(())
    }

    /// Close the connection. Readers never call this; the caller owns it.
    fn close(&self) -> SqlResult<()> {
        Ok(())
    }
}

struct Statement {
    cursor: Box<dyn Cursor>,
    header: Option<Row>,
}

impl Statement {
    fn next_row(&mut self) -> Option<Result<Row>> {
        if let Some(header) = self.header.take() {
            return Some(Ok(header));
        }
        self.cursor.fetch_one().map_err(Error::Sql).transpose()
    }
}

/// Execute `table_or_query`; if the driver rejects it, retry it as
/// `SELECT * FROM <table_or_query>`. The header is the cursor description.
pub fn sql_rows(connection: &dyn Connection, table_or_query: &str) -> Result<Adapted> {
    let mut cursor = connection.cursor().map_err(Error::Sql)?;

    if let Err(_err) = cursor.execute(table_or_query) {
        #[cfg(feature = "tracing")]
        tracing::debug!(query = table_or_query, error = %_err, "query failed, reading as table");

        let fallback = format!("SELECT * FROM {table_or_query}");
        if let Err(err) = cursor.execute(&fallback) {
            cursor.close();
            return Err(Error::Sql(err));
        }
    }

    let header = cursor.description().into_iter().map(Value::Str).collect();
    let statement = Statement {
        cursor,
        header: Some(header),
    };
    let (rows, close) = shared(statement, Statement::next_row, |mut s| s.cursor.close());
    Ok((rows, Some(close)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use tabread_core::row;

    /// Cursor that rejects every statement and records whether it was closed.
    struct Refusing {
        closed: Rc<Cell<bool>>,
        seen: Rc<RefCell<Vec<String>>>,
    }

    impl Cursor for Refusing {
        fn execute(&mut self, operation: &str) -> SqlResult<()> {
            self.seen.borrow_mut().push(operation.to_string());
            Err(format!("cannot execute {operation:?}").into())
        }
        fn description(&self) -> Vec<String> {
            Vec::new()
        }
        fn fetch_one(&mut self) -> SqlResult<Option<Row>> {
            Ok(None)
        }
        fn close(&mut self) {
            self.closed.set(true);
        }
    }

    struct RefusingConnection {
        closed: Rc<Cell<bool>>,
        seen: Rc<RefCell<Vec<String>>>,
    }

    impl Connection for RefusingConnection {
        fn cursor(&self) -> SqlResult<Box<dyn Cursor>> {
            Ok(Box::new(Refusing {
                closed: Rc::clone(&self.closed),
                seen: Rc::clone(&self.seen),
            }))
        }
    }

    #[test]
    fn test_cursor_closed_when_both_attempts_fail() {
        let conn = RefusingConnection {
            closed: Rc::new(Cell::new(false)),
            seen: Rc::new(RefCell::new(Vec::new())),
        };
        let err = sql_rows(&conn, "missing").err().unwrap();
        assert!(matches!(err, Error::Sql(_)));
        assert!(conn.closed.get());
        assert_eq!(
            *conn.seen.borrow(),
            vec!["missing".to_string(), "SELECT * FROM missing".to_string()]
        );
    }

    /// Cursor over canned rows.
    struct Canned {
        rows: Vec<Row>,
        closes: Rc<Cell<usize>>,
    }

    impl Cursor for Canned {
        fn execute(&mut self, _operation: &str) -> SqlResult<()> {
            Ok(())
        }
        fn description(&self) -> Vec<String> {
            vec!["col1".to_string(), "col2".to_string()]
        }
        fn fetch_one(&mut self) -> SqlResult<Option<Row>> {
            Ok((!self.rows.is_empty()).then(|| self.rows.remove(0)))
        }
        fn close(&mut self) {
            self.closes.set(self.closes.get() + 1);
        }
    }

    struct CannedConnection(Rc<Cell<usize>>);

    impl Connection for CannedConnection {
        fn cursor(&self) -> SqlResult<Box<dyn Cursor>> {
            Ok(Box::new(Canned {
                rows: vec![row!["1", "a"], row!["2", "b"]],
                closes: Rc::clone(&self.0),
            }))
        }
    }

    #[test]
    fn test_header_then_rows_and_close() {
        let conn = CannedConnection(Rc::new(Cell::new(0)));
        let (rows, close) = sql_rows(&conn, "SELECT col1, col2 FROM t").unwrap();
        let rows: Vec<Row> = rows.map(|r| r.unwrap()).collect();
        assert_eq!(rows, vec![row!["col1", "col2"], row!["1", "a"], row!["2", "b"]]);

        close.unwrap()();
        assert_eq!(conn.0.get(), 1);
    }
}
