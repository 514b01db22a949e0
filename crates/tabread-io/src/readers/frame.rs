//! In-memory frames, series and indexes.

use std::iter;

use tabread_core::frame::{Frame, Index, Tabular};
use tabread_core::types::Row;

use crate::reader::Rows;

/// Header + rows for any `Tabular`. A series is read as a one-column frame;
/// an index is read as a frame of its levels and never emits a second index.
pub fn frame_rows(data: impl Into<Tabular>, include_index: bool) -> Rows {
    match data.into() {
        Tabular::Frame(frame) => rows_of_frame(frame, include_index),
        Tabular::Series(series) => rows_of_frame(series.to_frame(), include_index),
        Tabular::Index(index) => rows_of_index(index),
    }
}

fn rows_of_frame(frame: Frame, include_index: bool) -> Rows {
    let index = include_index.then(|| frame.index_or_range());

    let mut header = index.as_ref().map(Index::header).unwrap_or_default();
    header.extend(frame.column_names());

    let rows = (0..frame.num_rows()).map(move |i| {
        let mut row = index.as_ref().map(|ix| ix.labels(i)).unwrap_or_default();
        row.extend(frame.row_values(i));
        Ok(row)
    });
    Box::new(iter::once(Ok(header)).chain(rows))
}

fn rows_of_index(index: Index) -> Rows {
    let header: Row = index.header();
    let rows = (0..index.len()).map(move |i| Ok(index.labels(i)));
    Box::new(iter::once(Ok(header)).chain(rows))
}
