//! Writers for crawled rows: CSV (one record per row) or a JSON array.

use crate::models::{ExportRow, ListingRow};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Guess from a file extension, falling back to CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

pub fn write_rows<W: Write>(writer: W, rows: &[ListingRow], format: ExportFormat) -> Result<()> {
    let records: Vec<ExportRow> = rows.iter().map(ExportRow::from).collect();

    match format {
        ExportFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(writer);
            for record in &records {
                wtr.serialize(record).context("Failed to write CSV record")?;
            }
            wtr.flush().context("Failed to flush CSV output")?;
        }
        ExportFormat::Json => {
            serde_json::to_writer_pretty(writer, &records).context("Failed to write JSON")?;
        }
    }
    Ok(())
}

pub fn export_to_file(path: &Path, rows: &[ListingRow], format: ExportFormat) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Could not create dir {:?}", parent))?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("Could not create {:?}", path))?;

    write_rows(std::io::BufWriter::new(file), rows, format)?;
    info!("Wrote {} rows to {:?}", rows.len(), path);
    Ok(())
}
