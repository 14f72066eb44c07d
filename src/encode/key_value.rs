//! Two-column layout

use crate::config::Layout;
use crate::model::{KeyValueEntry, Table};

use super::TableEncoder;

/// `key,value` header, one row per entry
pub struct KeyValueEncoder;

impl TableEncoder for KeyValueEncoder {
    fn build(&self, entries: &[KeyValueEntry]) -> Table {
        let mut table = Table::new(vec!["key".to_string(), "value".to_string()]);
        for entry in entries {
            table.add_row(
                entry.key.clone(),
                vec![entry.key.clone(), entry.value_text().into_owned()],
            );
        }
        table
    }

    fn layout(&self) -> Layout {
        Layout::KeyValue
    }
}
