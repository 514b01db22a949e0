//! Decide whether a value already has the shape of a reader: something that
//! can be iterated more than once and whose elements are rows.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tabread_core::types::Value;

use crate::source::Source;

/// Whether a single element looks like a row: a non-string ordered sequence.
pub trait RowShape {
    fn is_row(&self) -> bool;
}

impl<T> RowShape for Vec<T> {
    fn is_row(&self) -> bool {
        true
    }
}

impl<T> RowShape for [T] {
    fn is_row(&self) -> bool {
        true
    }
}

impl<T, const N: usize> RowShape for [T; N] {
    fn is_row(&self) -> bool {
        true
    }
}

impl<T: RowShape + ?Sized> RowShape for &T {
    fn is_row(&self) -> bool {
        (**self).is_row()
    }
}

impl RowShape for str {
    fn is_row(&self) -> bool {
        false
    }
}

impl RowShape for String {
    fn is_row(&self) -> bool {
        false
    }
}

impl<T> RowShape for HashSet<T> {
    fn is_row(&self) -> bool {
        false
    }
}

impl<T> RowShape for BTreeSet<T> {
    fn is_row(&self) -> bool {
        false
    }
}

impl<K, V> RowShape for HashMap<K, V> {
    fn is_row(&self) -> bool {
        false
    }
}

impl<K, V> RowShape for BTreeMap<K, V> {
    fn is_row(&self) -> bool {
        false
    }
}

impl RowShape for Value {
    fn is_row(&self) -> bool {
        matches!(self, Value::List(_))
    }
}

impl RowShape for serde_json::Value {
    fn is_row(&self) -> bool {
        self.is_array()
    }
}

/// True when the first `sample` elements of a re-iterable collection are rows.
///
/// Taking the collection by reference is what makes it re-iterable: a one-shot
/// iterator does not implement `IntoIterator` for `&Self` and is rejected at
/// compile time. An empty collection passes.
pub fn is_row_collection<'c, C, T>(collection: &'c C, sample: usize) -> bool
where
    C: ?Sized,
    &'c C: IntoIterator<Item = &'c T>,
    T: RowShape + 'c,
{
    collection.into_iter().take(sample).all(RowShape::is_row)
}

/// Whether `source` can be used as rows as-is.
///
/// Readers and CSV record readers always qualify. Collections qualify when
/// their first `sample` elements are rows. One-shot streams never do, since
/// looking at them would consume them.
pub fn is_reader_like(source: &Source<'_>, sample: usize) -> bool {
    match source {
        Source::Reader(_) | Source::Csv(_) | Source::Rows(_) => true,
        Source::Records(items) => is_row_collection(items, sample),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tabread_core::row;

    use crate::reader::Reader;

    #[test]
    fn test_collections_of_sequences() {
        assert!(is_row_collection(&vec![vec![1, 2], vec![3, 4]], 2));
        assert!(is_row_collection(&[[1, 2], [3, 4]], 2));
        assert!(is_row_collection(&Vec::<Vec<i32>>::new(), 2));
    }

    #[test]
    fn test_strings_sets_and_maps_are_not_rows() {
        assert!(!is_row_collection(&vec!["a", "b"], 2));
        assert!(!is_row_collection(&vec!["ab".to_string()], 2));
        assert!(!is_row_collection(&vec![HashSet::from([1, 2])], 2));
        assert!(!is_row_collection(&vec![HashMap::from([("a", 1)])], 2));
    }

    #[test]
    fn test_only_the_sample_is_inspected() {
        let mixed = vec![json!([1]), json!([2]), json!("tail")];
        assert!(is_row_collection(&mixed, 2));
        assert!(!is_row_collection(&mixed, 3));
    }

    #[test]
    fn test_sources() {
        assert!(is_reader_like(&Source::from(Reader::from_rows(vec![row!["a"]])), 2));
        assert!(is_reader_like(&Source::from(vec![row!["a"], row!["b"]]), 2));
        assert!(is_reader_like(
            &Source::from(vec![json!(["a", "b"]), json!(["c", "d"])]),
            2
        ));
        assert!(!is_reader_like(&Source::from(vec![json!({"a": 1})]), 2));
        assert!(!is_reader_like(&Source::from(vec![json!("a")]), 2));
        assert!(!is_reader_like(&Source::stream(vec![json!(["a"])]), 2));
        assert!(!is_reader_like(&Source::from("data.csv"), 2));
    }
}
