//! Export of the current table page as CSV or JSON

use anyhow::{Context, Result};
use serde_json::Value;

use super::format::display_value;
use super::path::resolve_path;
use crate::resource::ColumnDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    /// Default output file for a resource
    pub fn file_name(&self, slug: &str) -> String {
        format!("{}.{}", slug, self.extension())
    }
}

/// CSV with one header per column label and raw values underneath
pub fn to_csv(columns: &[&ColumnDefinition], rows: &[Value]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(columns.iter().map(|c| c.label.as_str()))
        .context("Failed to write CSV header")?;
    for row in rows {
        let record: Vec<String> = columns
            .iter()
            .map(|c| resolve_path(row, &c.key).map(display_value).unwrap_or_default())
            .collect();
        writer.write_record(&record).context("Failed to write CSV row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

pub fn to_json(rows: &[Value]) -> Result<String> {
    serde_json::to_string_pretty(rows).context("Failed to format JSON output")
}

pub fn export(format: ExportFormat, columns: &[&ColumnDefinition], rows: &[Value]) -> Result<String> {
    match format {
        ExportFormat::Csv => to_csv(columns, rows),
        ExportFormat::Json => to_json(rows),
    }
}
