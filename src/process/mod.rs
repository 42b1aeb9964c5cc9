// src/process/mod.rs
pub mod convert;
pub mod raw_table;
pub mod schema;
pub mod utils;

use crate::error::{OpportunityError, Result};
use arrow::{
    array::{Array, Float64Array, StringArray},
    record_batch::RecordBatch,
};
use csv::ReaderBuilder;
use serde::Serialize;
use std::{fmt, io::Read};
use tracing::{debug, info};

use convert::convert_to_final_types;
use raw_table::{dedup_headers, RawTable};
use schema::missing_known_columns;

/// A user-facing notification raised while loading a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    Loaded { rows: usize, columns: usize },
    MissingColumn { name: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Loaded { rows, columns } => write!(
                f,
                "CSV file successfully loaded ({} rows, {} columns).",
                rows, columns
            ),
            Notice::MissingColumn { name } => {
                write!(f, "Column {} not found in the dataset.", name)
            }
        }
    }
}

/// Report after numeric coercion. Known columns are `Float64` with nulls as
/// the missing marker; every other column is `Utf8`.
#[derive(Debug, Clone)]
pub struct CleanedTable {
    batch: RecordBatch,
}

impl CleanedTable {
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.batch.schema().index_of(name).is_ok()
    }

    /// Numeric view of a known column, if it was present in the report.
    pub fn numeric(&self, name: &str) -> Option<&Float64Array> {
        self.batch
            .column_by_name(name)?
            .as_any()
            .downcast_ref::<Float64Array>()
    }

    /// Text view of a non-numeric column, if present.
    pub fn text(&self, name: &str) -> Option<&StringArray> {
        self.batch
            .column_by_name(name)?
            .as_any()
            .downcast_ref::<StringArray>()
    }
}

#[derive(Debug, Clone)]
pub struct LoadedReport {
    pub table: CleanedTable,
    pub notices: Vec<Notice>,
}

/// Parse CSV with a header row into a `RawTable`.
///
/// Short rows are padded with empty fields; rows longer than the header, an
/// empty input and invalid UTF-8 are all parse failures.
pub fn read_raw_table<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // short rows are padded below, long ones rejected
        .from_reader(reader);

    let header_record = rdr
        .headers()
        .map_err(|e| OpportunityError::Parse(e.to_string()))?
        .clone();
    if header_record.is_empty() {
        return Err(OpportunityError::Parse(
            "no columns to parse from file".into(),
        ));
    }
    let headers = dedup_headers(header_record.iter());
    let width = headers.len();

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| OpportunityError::Parse(e.to_string()))?;
        if record.len() > width {
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(idx as u64 + 2);
            return Err(OpportunityError::Parse(format!(
                "expected {} fields in line {}, saw {}",
                width,
                line,
                record.len()
            )));
        }
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

/// Load a report and coerce its known columns to numbers.
///
/// Missing known columns are reported as notices, not errors; only an
/// unreadable file fails the load.
#[tracing::instrument(level = "info", skip(reader))]
pub fn load_report<R: Read>(reader: R) -> Result<LoadedReport> {
    // 1) Parse the CSV into strings
    let raw = read_raw_table(reader)?;

    let mut notices = vec![Notice::Loaded {
        rows: raw.num_rows(),
        columns: raw.headers.len(),
    }];
    info!(
        rows = raw.num_rows(),
        columns = raw.headers.len(),
        "CSV file successfully loaded"
    );

    // 2) Check each known column on its own
    for name in missing_known_columns(&raw.headers) {
        // surfaced to the user as a notice
        debug!(column = name, "column not found in the dataset");
        notices.push(Notice::MissingColumn {
            name: name.to_string(),
        });
    }

    // 3) Coerce known columns
    let batch = convert_to_final_types(&raw)?;

    Ok(LoadedReport {
        table: CleanedTable::new(batch),
        notices,
    })
}
