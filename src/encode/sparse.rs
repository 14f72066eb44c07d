//! Sparse layout: every key is a column and every key is a row

use crate::config::Layout;
use crate::model::{ColumnSet, KeyValueEntry, Table};

use super::TableEncoder;

/// One column per distinct key; the row for key K fills only column K.
///
/// With N keys the table is N×N with N populated cells. This is the layout
/// existing consumers of the export read, so it stays the default.
pub struct SparseEncoder;

impl TableEncoder for SparseEncoder {
    fn build(&self, entries: &[KeyValueEntry]) -> Table {
        let columns = ColumnSet::from_entries(entries);
        let mut table = Table::new(columns.names().map(str::to_string).collect());

        for entry in entries {
            let mut cells = vec![String::new(); columns.len()];
            if let Some(idx) = columns.position(&entry.key) {
                cells[idx] = entry.value_text().into_owned();
            }
            table.add_row(entry.key.clone(), cells);
        }

        table
    }

    fn layout(&self) -> Layout {
        Layout::Sparse
    }
}
