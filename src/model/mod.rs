//! Data model for exported entries and the tables built from them

mod entry;
mod table;

pub use entry::KeyValueEntry;
pub use table::{ColumnSet, CsvDocument, Table, TableRow};
