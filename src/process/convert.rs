use crate::error::Result;
use crate::process::raw_table::RawTable;
use crate::process::schema::{cleaned_schema, known_coercion};
use crate::process::utils::text_cell;
use arrow::{
    array::{ArrayRef, Float64Builder, StringBuilder},
    record_batch::{RecordBatch, RecordBatchOptions},
};
use std::sync::Arc;

/// Convert a raw table into a typed batch: known columns are coerced to
/// `Float64` (unparseable cells become nulls), everything else is `Utf8`.
pub fn convert_to_final_types(raw: &RawTable) -> Result<RecordBatch> {
    let schema = Arc::new(cleaned_schema(&raw.headers));
    let mut out: Vec<ArrayRef> = Vec::with_capacity(raw.headers.len());

    for (idx, name) in raw.headers.iter().enumerate() {
        let cells = raw.rows.iter().map(|row| row[idx].as_str());
        match known_coercion(name) {
            Some(coerce) => {
                let mut b = Float64Builder::with_capacity(raw.num_rows());
                for cell in cells {
                    b.append_option(coerce(cell));
                }
                out.push(Arc::new(b.finish()) as ArrayRef);
            }
            None => {
                let mut b = StringBuilder::new();
                for cell in cells {
                    b.append_option(text_cell(cell));
                }
                out.push(Arc::new(b.finish()) as ArrayRef);
            }
        }
    }

    // row count must be explicit so zero-column batches still carry it
    let options = RecordBatchOptions::new().with_row_count(Some(raw.num_rows()));
    Ok(RecordBatch::try_new_with_options(schema, out, &options)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, Float64Array, StringArray};

    #[test]
    fn coerces_known_and_keeps_text() -> anyhow::Result<()> {
        let raw = RawTable {
            headers: vec!["Listing title".into(), "Quantity available".into()],
            rows: vec![
                vec!["Blue mug".into(), "2,500".into()],
                vec!["".into(), "abc".into()],
            ],
        };
        let batch = convert_to_final_types(&raw)?;
        assert_eq!(batch.num_rows(), 2);

        let qty = batch
            .column(1)
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(qty.value(0), 2500.0);
        assert!(qty.is_null(1));

        let titles = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(titles.value(0), "Blue mug");
        assert!(titles.is_null(1));
        Ok(())
    }
}
