//! JSON output format

use std::io::Write;

use anyhow::Result;
use termcolor::WriteColor;

use crate::pipeline::ExportReport;

use super::OutputFormatter;

/// JSON output formatter, pretty-printed
#[derive(Debug, Default)]
pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }
}

impl OutputFormatter for JsonOutput {
    fn render(&self, report: &ExportReport, writer: &mut dyn WriteColor) -> Result<()> {
        serde_json::to_writer_pretty(&mut *writer, report)?;
        writeln!(writer)?;

        Ok(())
    }
}
