//! `Reader`: a lazy row iterator that owns the resource behind it.
//!
//! A `Reader` holds one row sequence and at most one cleanup action. The
//! action runs exactly once, on whichever comes first:
//!
//! * the sequence is exhausted
//! * `close()` is called
//! * a `scope` block ends (normally or by unwinding)
//! * the `Reader` is dropped
//!
//! After closing, iteration yields `None`; it never errors.

use std::fmt;
use std::iter::FusedIterator;

use tabread_core::types::Row;

use crate::error::Result;

/// Lazy, single-pass sequence of rows.
pub type Rows = Box<dyn Iterator<Item = Result<Row>>>;

/// Zero-argument action releasing a file handle, cursor, or workbook.
pub type CloseFn = Box<dyn FnOnce()>;

/// What every adapter hands back: rows plus an optional cleanup action.
pub type Adapted = (Rows, Option<CloseFn>);

pub struct Reader {
    rows: Option<Rows>,
    closefunc: Option<CloseFn>,
}

impl Reader {
    /// Wrap fallible rows with no cleanup action.
    pub fn new<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = Result<Row>>,
        I::IntoIter: 'static,
    {
        Self {
            rows: Some(Box::new(rows.into_iter())),
            closefunc: None,
        }
    }

    /// Wrap fallible rows; `close` runs once when the reader is finished with.
    pub fn with_close<I, F>(rows: I, close: F) -> Self
    where
        I: IntoIterator<Item = Result<Row>>,
        I::IntoIter: 'static,
        F: FnOnce() + 'static,
    {
        Self {
            rows: Some(Box::new(rows.into_iter())),
            closefunc: Some(Box::new(close)),
        }
    }

    /// Wrap rows that cannot fail.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = Row>,
        I::IntoIter: 'static,
    {
        Self::new(rows.into_iter().map(Ok))
    }

    /// Rewrap another reader's sequence, inheriting its cleanup action.
    ///
    /// Use `set_closefunc` on the result to replace or drop the inherited action.
    pub fn rewrap(other: Reader) -> Self {
        Self::from(other.into_parts())
    }

    /// Split into the row sequence and cleanup action without running it.
    ///
    /// A closed reader yields an empty sequence and no action.
    pub fn into_parts(mut self) -> Adapted {
        let rows = self
            .rows
            .take()
            .unwrap_or_else(|| Box::new(std::iter::empty()));
        (rows, self.closefunc.take())
    }

    /// Replace the cleanup action, returning the previous one un-run.
    pub fn set_closefunc(&mut self, closefunc: Option<CloseFn>) -> Option<CloseFn> {
        std::mem::replace(&mut self.closefunc, closefunc)
    }

    pub fn has_closefunc(&self) -> bool {
        self.closefunc.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.rows.is_none()
    }

    /// Run the cleanup action (if it has not run yet) and drop the sequence.
    /// Safe to call any number of times, before or after exhaustion.
    pub fn close(&mut self) {
        if let Some(closefunc) = self.closefunc.take() {
            #[cfg(feature = "tracing")]
            tracing::trace!("reader cleanup");
            closefunc();
        }
        self.rows = None;
    }

    /// Run `f` with the reader, closing it on every exit path.
    ///
    /// ```
    /// use tabread_io::Reader;
    /// use tabread_core::row;
    ///
    /// let reader = Reader::from_rows(vec![row!["a"], row!["1"]]);
    /// let header = reader.scope(|r| r.next());
    /// assert!(header.is_some());
    /// ```
    pub fn scope<T, F>(mut self, f: F) -> T
    where
        F: FnOnce(&mut Reader) -> T,
    {
        let out = f(&mut self);
        self.close();
        out
    }
}

impl From<Adapted> for Reader {
    fn from((rows, closefunc): Adapted) -> Self {
        Self {
            rows: Some(rows),
            closefunc,
        }
    }
}

impl Iterator for Reader {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let rows = self.rows.as_mut()?;
        match rows.next() {
            Some(item) => Some(item),
            None => {
                self.close();
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.rows {
            Some(rows) => rows.size_hint(),
            None => (0, Some(0)),
        }
    }
}

impl FusedIterator for Reader {}

impl Drop for Reader {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Reader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("closed", &self.is_closed())
            .field("has_closefunc", &self.has_closefunc())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use tabread_core::row;

    fn counter() -> (Rc<Cell<usize>>, impl FnOnce() + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        (count, move || c.set(c.get() + 1))
    }

    fn sample() -> Vec<Row> {
        vec![row!["a", "x"], row!["b", "y"]]
    }

    #[test]
    fn test_iterates_rows() {
        let mut reader = Reader::from_rows(sample());
        assert_eq!(reader.next().unwrap().unwrap(), row!["a", "x"]);
        assert_eq!(reader.next().unwrap().unwrap(), row!["b", "y"]);
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_close_explicitly_and_repeatedly() {
        let (count, close) = counter();
        let mut reader = Reader::with_close(sample().into_iter().map(Ok), close);
        reader.close();
        reader.close();
        assert_eq!(count.get(), 1);
        assert!(reader.next().is_none(), "closed reader yields nothing");
    }

    #[test]
    fn test_close_on_exhaustion() {
        let (count, close) = counter();
        let reader = Reader::with_close(sample().into_iter().map(Ok), close);
        let rows: Vec<_> = reader.collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_exhaustion_then_drop_closes_once() {
        let (count, close) = counter();
        let mut reader = Reader::with_close(sample().into_iter().map(Ok), close);
        while reader.next().is_some() {}
        assert!(reader.next().is_none());
        drop(reader);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_close_on_drop_when_abandoned() {
        let (count, close) = counter();
        let mut reader = Reader::with_close(sample().into_iter().map(Ok), close);
        reader.next();
        drop(reader);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_scope_closes() {
        let (count, close) = counter();
        let reader = Reader::with_close(sample().into_iter().map(Ok), close);
        let first = reader.scope(|r| r.next().unwrap().unwrap());
        assert_eq!(first, row!["a", "x"]);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_scope_closes_on_panic() {
        let (count, close) = counter();
        let reader = Reader::with_close(sample().into_iter().map(Ok), close);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            reader.scope(|_| panic!("boom"))
        }));
        assert!(result.is_err());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_rewrap_inherits_and_overrides_closefunc() {
        let (count, close) = counter();
        let reader = Reader::with_close(sample().into_iter().map(Ok), close);

        let mut rewrapped = Reader::rewrap(reader);
        assert!(rewrapped.has_closefunc(), "inherit closefunc from existing reader");

        let old = rewrapped.set_closefunc(None);
        assert!(old.is_some());
        assert!(!rewrapped.has_closefunc(), "remove inherited closefunc with None");
        drop(rewrapped);
        assert_eq!(count.get(), 0, "replaced closefunc is not run");

        let (count2, close2) = counter();
        let mut reader = Reader::from_rows(sample());
        assert!(!reader.has_closefunc());
        reader.set_closefunc(Some(Box::new(close2)));
        reader.close();
        assert_eq!(count2.get(), 1);
    }

    #[test]
    fn test_errors_pass_through_without_closing() {
        let (count, close) = counter();
        let items: Vec<Result<Row>> = vec![
            Ok(row!["h"]),
            Err(crate::error::Error::UnknownEncoding("x".into())),
            Ok(row!["v"]),
        ];
        let mut reader = Reader::with_close(items, close);
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_err());
        assert_eq!(count.get(), 0);
        assert_eq!(reader.next().unwrap().unwrap(), row!["v"]);
        assert!(reader.next().is_none());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_into_parts_of_closed_reader_is_empty() {
        let mut reader = Reader::from_rows(sample());
        reader.close();
        let (mut rows, close) = reader.into_parts();
        assert!(rows.next().is_none());
        assert!(close.is_none());
    }
}
