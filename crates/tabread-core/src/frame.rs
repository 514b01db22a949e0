//! Columnar in-memory structures: frames, series, and indexes.
//!
//! These mirror the shape of a dataframe library closely enough for the
//! frame adapter to flatten them into rows. They are plain data; nothing here
//! validates that columns have equal length.

use serde::{Deserialize, Serialize};

use crate::types::{Row, Value};

/// A named column of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new<V: Into<Value>>(name: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Row labels, possibly with several levels (a multi-index).
///
/// `names[i]` labels `levels[i]`; an unnamed level has `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub names: Vec<Option<String>>,
    pub levels: Vec<Vec<Value>>,
}

impl Index {
    /// Single-level index.
    pub fn new<V: Into<Value>>(name: Option<&str>, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            names: vec![name.map(str::to_string)],
            levels: vec![values.into_iter().map(Into::into).collect()],
        }
    }

    /// Unnamed `0..len` labels.
    pub fn range(len: usize) -> Self {
        Self {
            names: vec![None],
            levels: vec![(0..len as i64).map(Value::I64).collect()],
        }
    }

    /// Multi-level index built from `(name, values)` pairs.
    pub fn multi<V: Into<Value>>(levels: impl IntoIterator<Item = (Option<String>, Vec<V>)>) -> Self {
        let (names, levels) = levels
            .into_iter()
            .map(|(name, values)| (name, values.into_iter().map(Into::into).collect::<Vec<Value>>()))
            .unzip();
        Self { names, levels }
    }

    pub fn len(&self) -> usize {
        self.levels.first().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Header cells: each level's name, or `Null` when unnamed.
    pub fn header(&self) -> Row {
        self.names.iter().cloned().map(Value::from).collect()
    }

    /// Labels of row `idx`, one per level.
    pub fn labels(&self, idx: usize) -> Row {
        self.levels
            .iter()
            .map(|level| level.get(idx).cloned().unwrap_or(Value::Null))
            .collect()
    }
}

/// Columns sharing one index. A missing index means `Index::range(num_rows)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub index: Option<Index>,
    pub columns: Vec<Column>,
}

impl Frame {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            index: None,
            columns,
        }
    }

    pub fn with_index(mut self, index: Index) -> Self {
        self.index = Some(index);
        self
    }

    /// Row count: the longest column, or the index length for a column-less frame.
    pub fn num_rows(&self) -> usize {
        let cols = self.columns.iter().map(Column::len).max().unwrap_or(0);
        let idx = self.index.as_ref().map(Index::len).unwrap_or(0);
        cols.max(idx)
    }

    pub fn column_names(&self) -> Row {
        self.columns
            .iter()
            .map(|c| Value::Str(c.name.clone()))
            .collect()
    }

    /// Values of row `idx` in column order; short columns yield `Null`.
    pub fn row_values(&self, idx: usize) -> Row {
        self.columns
            .iter()
            .map(|c| c.values.get(idx).cloned().unwrap_or(Value::Null))
            .collect()
    }

    /// The explicit index, or the implied range index.
    pub fn index_or_range(&self) -> Index {
        match &self.index {
            Some(idx) => idx.clone(),
            None => Index::range(self.num_rows()),
        }
    }
}

/// A single column with its own index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub index: Option<Index>,
    pub column: Column,
}

impl Series {
    pub fn new(column: Column) -> Self {
        Self {
            index: None,
            column,
        }
    }

    pub fn with_index(mut self, index: Index) -> Self {
        self.index = Some(index);
        self
    }

    pub fn to_frame(self) -> Frame {
        Frame {
            index: self.index,
            columns: vec![self.column],
        }
    }
}

/// Any of the in-memory tabular shapes the frame adapter accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Tabular {
    Frame(Frame),
    Series(Series),
    Index(Index),
}

impl From<Frame> for Tabular {
    fn from(f: Frame) -> Self {
        Tabular::Frame(f)
    }
}

impl From<Series> for Tabular {
    fn from(s: Series) -> Self {
        Tabular::Series(s)
    }
}

impl From<Index> for Tabular {
    fn from(i: Index) -> Self {
        Tabular::Index(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_num_rows_uses_longest_column() {
        let frame = Frame::new(vec![
            Column::new("a", [1, 2, 3]),
            Column::new("b", ["x"]),
        ]);
        assert_eq!(frame.num_rows(), 3);
        assert_eq!(frame.row_values(2), vec![Value::I64(3), Value::Null]);
    }

    #[test]
    fn test_range_index_labels() {
        let frame = Frame::new(vec![Column::new("a", [10, 20])]);
        let idx = frame.index_or_range();
        assert_eq!(idx.header(), vec![Value::Null]);
        assert_eq!(idx.labels(1), vec![Value::I64(1)]);
    }

    #[test]
    fn test_multi_index_header() {
        let idx = Index::multi([
            (Some("k1".to_string()), vec!["a", "b"]),
            (None, vec!["x", "y"]),
        ]);
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.header(), vec![Value::Str("k1".into()), Value::Null]);
        assert_eq!(idx.labels(0), vec![Value::Str("a".into()), Value::Str("x".into())]);
    }
}
