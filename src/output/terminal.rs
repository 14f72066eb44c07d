//! Colored terminal output

use std::io::Write;

use anyhow::Result;
use termcolor::{Color, ColorSpec, WriteColor};

use crate::pipeline::ExportReport;

use super::OutputFormatter;

/// Terminal output with colors
pub struct TerminalOutput;

impl TerminalOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TerminalOutput {
    fn render(&self, report: &ExportReport, writer: &mut dyn WriteColor) -> Result<()> {
        writer.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
        write!(writer, "Exported")?;
        writer.reset()?;
        writeln!(writer, " {} keys to {}", report.keys, report.location)?;

        writeln!(
            writer,
            "  layout:  {} ({} columns x {} rows)",
            report.layout, report.columns, report.rows
        )?;
        writeln!(writer, "  size:    {} bytes", report.bytes)?;

        if report.missing_values > 0 {
            writer.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
            writeln!(
                writer,
                "  missing: {} keys vanished before fetch (written as empty cells)",
                report.missing_values
            )?;
            writer.reset()?;
        }

        writeln!(writer, "  elapsed: {} ms", report.elapsed_ms)?;
        Ok(())
    }
}
