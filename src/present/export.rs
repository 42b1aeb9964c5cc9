// src/present/export.rs
use crate::error::Result;
use crate::process::schema::{
    ITEM_ID, LISTING_TITLE, OPPORTUNITY_SCORE, QUANTITY_SOLD, TOTAL_IMPRESSIONS, TOTAL_PAGE_VIEWS,
};
use crate::score::{IntegerColumns, Opportunity};
use arrow::record_batch::RecordBatch;
use csv::WriterBuilder;
use parquet::{
    arrow::ArrowWriter,
    basic::{BrotliLevel, Compression},
    file::properties::WriterProperties,
};
use serde::Serialize;
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::info;

pub const EXPORT_FILE_NAME: &str = "Top_Opportunities.csv";

/// Export column order.
pub const EXPORT_COLUMNS: [&str; 6] = [
    LISTING_TITLE,
    ITEM_ID,
    TOTAL_IMPRESSIONS,
    TOTAL_PAGE_VIEWS,
    QUANTITY_SOLD,
    OPPORTUNITY_SCORE,
];

/// A numeric field: integer columns drop the `.0`, everything else keeps the
/// float form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
enum ExportNumber {
    Integer(i64),
    Float(f64),
}

impl ExportNumber {
    fn new(value: Option<f64>, integer: bool) -> Option<Self> {
        value.map(|v| {
            if integer {
                ExportNumber::Integer(v as i64)
            } else {
                ExportNumber::Float(v)
            }
        })
    }
}

#[derive(Debug, Serialize)]
struct ExportRecord<'a> {
    listing_title: Option<&'a str>,
    item_id: Option<&'a str>,
    impressions: Option<ExportNumber>,
    page_views: Option<ExportNumber>,
    quantity_sold: Option<ExportNumber>,
    score: Option<f64>,
}

impl<'a> ExportRecord<'a> {
    fn new(o: &'a Opportunity, integer: IntegerColumns) -> Self {
        Self {
            listing_title: o.listing_title.as_deref(),
            item_id: o.item_id.as_deref(),
            impressions: ExportNumber::new(o.impressions, integer.impressions),
            page_views: ExportNumber::new(o.page_views, integer.page_views),
            quantity_sold: ExportNumber::new(o.quantity_sold, integer.quantity_sold),
            score: o.score,
        }
    }
}

/// Write the subset as CSV: header row, no index column, missing values as
/// empty fields. Score inputs flagged in `integer` are written as integers;
/// the score is always a float.
pub fn write_opportunities_csv<W: Write>(
    subset: &[Opportunity],
    integer: IntegerColumns,
    writer: W,
) -> Result<()> {
    // header is written by hand so an empty subset still gets one
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(EXPORT_COLUMNS)?;
    for o in subset {
        wtr.serialize(ExportRecord::new(o, integer))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `Top_Opportunities.csv` into `out_dir`, creating the directory.
pub fn export_to_dir(
    subset: &[Opportunity],
    integer: IntegerColumns,
    out_dir: &Path,
) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(EXPORT_FILE_NAME);
    let file = File::create(&path)?;
    write_opportunities_csv(subset, integer, file)?;
    info!(path = %path.display(), rows = subset.len(), "wrote opportunities CSV");
    Ok(path)
}

/// Write the full scored table as Parquet, via a temp file + rename.
pub fn write_parquet(batch: &RecordBatch, out_path: &Path) -> Result<()> {
    if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let props = WriterProperties::builder()
        .set_compression(Compression::BROTLI(BrotliLevel::try_new(5)?))
        .set_dictionary_enabled(true)
        .build();

    let temp_path = out_path.with_extension("tmp");
    let file = File::create(&temp_path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;
    fs::rename(&temp_path, out_path)?;

    info!(path = %out_path.display(), rows = batch.num_rows(), "wrote scored table");
    Ok(())
}
