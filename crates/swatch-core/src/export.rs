//! JSON and CSV export of extracted brand records.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::Local;
use serde::Serialize;
use thiserror::Error;

use crate::models::BrandRecord;

const CSV_HEADER: [&str; 8] = [
    "brand_name",
    "image_url",
    "local_image_path",
    "color_codes",
    "color_names",
    "pantone_full_names",
    "page_url",
    "scraped_at",
];

/// Byte-order mark so spreadsheet tools detect UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct JsonExport<'a> {
    total_count: usize,
    exported_at: String,
    brands: &'a [BrandRecord],
}

/// Writes all records to `path` as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`ExportError`] if the file cannot be created or written.
pub fn write_json(records: &[BrandRecord], path: &Path) -> Result<(), ExportError> {
    let io_err = |source: io::Error| ExportError::Io {
        path: path.display().to_string(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    let payload = JsonExport {
        total_count: records.len(),
        exported_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        brands: records,
    };
    serde_json::to_writer_pretty(&mut writer, &payload)?;
    writer.flush().map_err(io_err)
}

/// Writes one CSV row per record to `path`, color lists joined with `|`.
///
/// An empty record list leaves the file untouched.
///
/// # Errors
///
/// Returns [`ExportError::Io`] if the file cannot be created or written.
pub fn write_csv(records: &[BrandRecord], path: &Path) -> Result<(), ExportError> {
    if records.is_empty() {
        return Ok(());
    }
    let io_err = |source: io::Error| ExportError::Io {
        path: path.display().to_string(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    write_csv_to(&mut writer, records).map_err(io_err)?;
    writer.flush().map_err(io_err)
}

fn write_csv_to<W: Write>(mut w: W, records: &[BrandRecord]) -> io::Result<()> {
    w.write_all(UTF8_BOM)?;
    let header: Vec<String> = CSV_HEADER.iter().map(|h| (*h).to_string()).collect();
    write_row(&mut w, &header)?;
    for record in records {
        write_row(&mut w, &csv_row(record))?;
    }
    Ok(())
}

fn csv_row(record: &BrandRecord) -> Vec<String> {
    let join = |f: fn(&crate::ColorIdentifier) -> &str| {
        record.colors().iter().map(f).collect::<Vec<_>>().join("|")
    };
    vec![
        record.brand_name().to_string(),
        record.media_reference().to_string(),
        record.local_path().unwrap_or_default().to_string(),
        join(crate::ColorIdentifier::code),
        join(crate::ColorIdentifier::name),
        join(crate::ColorIdentifier::display_name),
        record.source_page().to_string(),
        record
            .discovered_at()
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
    ]
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_row<W: Write>(mut w: W, row: &[String]) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            w.write_all(b",")?;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    w.write_all(b"\r\n")
}
