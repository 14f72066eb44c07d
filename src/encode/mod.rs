//! Encoders that turn fetched entries into a CSV table

mod key_value;
mod sparse;

use tracing::debug;

use crate::config::Layout;
use crate::error::ExportError;
use crate::model::{CsvDocument, KeyValueEntry, Table};

pub use key_value::KeyValueEncoder;
pub use sparse::SparseEncoder;

/// Trait for table encoders
pub trait TableEncoder {
    /// Lay out entries as a table
    fn build(&self, entries: &[KeyValueEntry]) -> Table;

    /// Layout this encoder produces
    fn layout(&self) -> Layout;
}

/// Factory for creating encoders
pub struct EncoderFactory;

impl EncoderFactory {
    /// Create an encoder for a layout
    pub fn create(layout: Layout) -> Box<dyn TableEncoder> {
        match layout {
            Layout::Sparse => Box::new(SparseEncoder),
            Layout::KeyValue => Box::new(KeyValueEncoder),
        }
    }
}

/// Build the table for `layout` and serialize it
pub fn encode_document(entries: &[KeyValueEntry], layout: Layout) -> Result<CsvDocument, ExportError> {
    let encoder = EncoderFactory::create(layout);
    let document = encoder.build(entries).to_csv()?;
    debug!(
        layout = %encoder.layout(),
        columns = document.columns,
        rows = document.rows,
        bytes = document.len(),
        "Encoded document"
    );
    Ok(document)
}
