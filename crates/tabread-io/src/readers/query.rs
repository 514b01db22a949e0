//! Results of a query object that knows which columns it selected.

use std::fmt;
use std::iter;

use tabread_core::types::{Row, Value};

use crate::reader::Rows;

pub enum QueryData {
    Scalar(Value),
    Values(Box<dyn Iterator<Item = Value>>),
}

/// Column names plus a lazily produced result.
///
/// Each value is one row: a `Value::List` is taken as the row's cells, any
/// other value is a one-cell row.
pub struct QueryResult {
    columns: Vec<String>,
    data: QueryData,
}

impl QueryResult {
    pub fn new<S, I>(columns: impl IntoIterator<Item = S>, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = Value>,
        I::IntoIter: 'static,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            data: QueryData::Values(Box::new(values.into_iter())),
        }
    }

    /// A result that reduced to a single value (a count, a sum, ...).
    pub fn scalar<S: Into<String>>(columns: impl IntoIterator<Item = S>, value: impl Into<Value>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            data: QueryData::Scalar(value.into()),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl fmt::Debug for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryResult")
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

fn into_row(value: Value) -> Row {
    match value {
        Value::List(cells) => cells,
        other => vec![other],
    }
}

/// Header + rows for a query result.
///
/// The header is `fieldnames` when given; otherwise the selected columns, but
/// only when their count matches the first row's width. One row is read
/// ahead to decide this.
pub fn query_rows(result: QueryResult, fieldnames: Option<Vec<String>>) -> Rows {
    let QueryResult { columns, data } = result;
    let mut values: Box<dyn Iterator<Item = Value>> = match data {
        QueryData::Scalar(value) => Box::new(iter::once(value)),
        QueryData::Values(values) => values,
    };

    let first = values.next().map(into_row);
    let header = match fieldnames {
        Some(names) => Some(names),
        None if columns.is_empty() => None,
        None => match &first {
            Some(row) if row.len() == columns.len() => Some(columns),
            Some(_) => None,
            None => Some(columns),
        },
    };

    let header = header.map(|names| names.into_iter().map(Value::Str).collect::<Row>());
    let rows = header
        .into_iter()
        .chain(first)
        .chain(values.map(into_row))
        .map(Ok);
    Box::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabread_core::row;

    fn collect(rows: Rows) -> Vec<Row> {
        rows.map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_multi_column_result() {
        let result = QueryResult::new(
            ["col1", "col2"],
            vec![Value::List(row![1, "a"]), Value::List(row![2, "b"])],
        );
        assert_eq!(
            collect(query_rows(result, None)),
            vec![row!["col1", "col2"], row![1, "a"], row![2, "b"]]
        );
    }

    #[test]
    fn test_scalar_values_become_one_cell_rows() {
        let result = QueryResult::new(["col1"], vec![Value::from(1), Value::from(2)]);
        assert_eq!(
            collect(query_rows(result, None)),
            vec![row!["col1"], row![1], row![2]]
        );

        let total = QueryResult::scalar(["count"], 3);
        assert_eq!(collect(query_rows(total, None)), vec![row!["count"], row![3]]);
    }

    #[test]
    fn test_header_omitted_on_arity_mismatch() {
        let result = QueryResult::new(["col1"], vec![Value::List(row![1, "a"])]);
        assert_eq!(collect(query_rows(result, None)), vec![row![1, "a"]]);
    }

    #[test]
    fn test_explicit_fieldnames_win() {
        let result = QueryResult::new(["col1"], vec![Value::from(1)]);
        let names = Some(vec!["n".to_string()]);
        assert_eq!(collect(query_rows(result, names)), vec![row!["n"], row![1]]);
    }

    #[test]
    fn test_empty_result_keeps_header() {
        let result = QueryResult::new(["col1"], Vec::new());
        assert_eq!(collect(query_rows(result, None)), vec![row!["col1"]]);
    }
}
