//! Column set, rows and the serialized CSV document

use indexmap::IndexSet;

use super::entry::KeyValueEntry;

/// Distinct key names in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet {
    names: IndexSet<String>,
}

impl ColumnSet {
    /// Collect the union of keys over all entries
    pub fn from_entries(entries: &[KeyValueEntry]) -> Self {
        Self {
            names: entries.iter().map(|e| e.key.clone()).collect(),
        }
    }

    /// Get column index by name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.get_index_of(name)
    }

    /// Column names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One data row of the output table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Key this row was built from
    pub key: String,
    /// Cell text in column order, empty string for blank cells
    pub cells: Vec<String>,
}

/// A header plus rows, ready to be written as CSV
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Column names
    pub header: Vec<String>,
    /// Data rows
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Create an empty table with column names
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    /// Append a row
    pub fn add_row(&mut self, key: impl Into<String>, cells: Vec<String>) {
        self.rows.push(TableRow {
            key: key.into(),
            cells,
        });
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Look up a cell by row index and column name
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col_idx = self.header.iter().position(|c| c == column)?;
        self.rows
            .get(row)
            .and_then(|r| r.cells.get(col_idx))
            .map(String::as_str)
    }

    /// Serialize as CSV: minimal quoting, CRLF record terminators.
    ///
    /// A header without columns is written as a bare line terminator, since
    /// the csv writer would otherwise emit `""` for an empty record.
    pub fn to_csv(&self) -> Result<CsvDocument, csv::Error> {
        let mut buffer = Vec::new();
        if self.header.is_empty() {
            buffer.extend_from_slice(b"\r\n");
        }

        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .quote_style(csv::QuoteStyle::Necessary)
            .from_writer(buffer);

        if !self.header.is_empty() {
            writer.write_record(&self.header)?;
        }
        for row in &self.rows {
            writer.write_record(&row.cells)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;

        Ok(CsvDocument {
            bytes,
            columns: self.column_count(),
            rows: self.row_count(),
        })
    }
}

/// Encoded CSV bytes with their shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDocument {
    pub bytes: Vec<u8>,
    pub columns: usize,
    pub rows: usize,
}

impl CsvDocument {
    /// Document size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Document as text (always UTF-8, the encoder writes only `str` cells)
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes).unwrap_or_default()
    }
}
