// src/score/mod.rs
use crate::error::{OpportunityError, Result};
use crate::process::{
    schema::{
        ITEM_ID, LISTING_TITLE, OPPORTUNITY_SCORE, QUANTITY_SOLD, TOTAL_IMPRESSIONS,
        TOTAL_PAGE_VIEWS,
    },
    utils::truncate_chars,
    CleanedTable,
};
use arrow::{
    array::{Array, ArrayRef, Float64Array, StringArray},
    datatypes::{DataType, Field, FieldRef, Schema},
    record_batch::{RecordBatch, RecordBatchOptions},
};
use serde::Serialize;
use std::{cmp::Ordering, sync::Arc};
use tracing::{debug, info};

/// Rows kept in the Opportunity Subset.
pub const SUBSET_SIZE: usize = 15;
/// Rows drawn in the chart.
pub const CHART_SIZE: usize = 10;
/// Chart labels are cut to this many characters.
pub const LABEL_WIDTH: usize = 40;

/// One listing projected to the display/export columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Opportunity {
    /// Position of the row in the cleaned table.
    pub row: usize,
    pub listing_title: Option<String>,
    pub item_id: Option<String>,
    pub impressions: Option<f64>,
    pub page_views: Option<f64>,
    pub quantity_sold: Option<f64>,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub label: String,
    pub score: Option<f64>,
}

/// Which score inputs hold only whole numbers with nothing missing, over the
/// whole cleaned table. Such columns export without a fractional part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IntegerColumns {
    pub impressions: bool,
    pub page_views: bool,
    pub quantity_sold: bool,
}

#[derive(Debug, Clone)]
pub struct Ranking {
    /// Cleaned table with the `Opportunity Score` column appended.
    pub scored: RecordBatch,
    /// Top rows by score, highest first.
    pub subset: Vec<Opportunity>,
    /// First `CHART_SIZE` rows of `subset`, lowest score first.
    pub chart: Vec<ChartBar>,
    pub median_page_views: Option<f64>,
    /// Listings with no sales and above-median page views, most viewed first.
    pub no_sale_high_traffic: Vec<Opportunity>,
    pub integer_columns: IntegerColumns,
}

/// `(impressions × page_views) / (quantity_sold + 1)`; missing when any input
/// is missing or the result is NaN.
pub fn opportunity_score(
    impressions: Option<f64>,
    page_views: Option<f64>,
    quantity_sold: Option<f64>,
) -> Option<f64> {
    let score = (impressions? * page_views?) / (quantity_sold? + 1.0);
    (!score.is_nan()).then_some(score)
}

/// Median of the non-missing values; mean of the middle pair for even counts.
pub fn median<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut present: Vec<f64> = values.into_iter().flatten().collect();
    if present.is_empty() {
        return None;
    }
    present.sort_by(f64::total_cmp);
    let mid = present.len() / 2;
    if present.len() % 2 == 0 {
        Some((present[mid - 1] + present[mid]) / 2.0)
    } else {
        Some(present[mid])
    }
}

/// Highest first, missing values always last.
fn descending_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Lowest first, missing values always last.
fn ascending_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Row indices ordered by `values` descending. The sort is stable, so equal
/// values keep file order.
pub fn rank_descending(values: &[Option<f64>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| descending_missing_last(values[a], values[b]));
    order
}

fn require<'a>(table: &'a CleanedTable, name: &str) -> Result<&'a Float64Array> {
    table
        .numeric(name)
        .ok_or_else(|| OpportunityError::MissingColumn(name.to_string()))
}

fn value_at(arr: &Float64Array, row: usize) -> Option<f64> {
    arr.is_valid(row).then(|| arr.value(row))
}

/// No missing values and every value whole and within `i64`.
fn is_integer_column(arr: &Float64Array) -> bool {
    arr.null_count() == 0
        && arr
            .values()
            .iter()
            .all(|v| v.fract() == 0.0 && v.abs() < i64::MAX as f64)
}

fn text_at(arr: Option<&StringArray>, row: usize) -> Option<String> {
    arr.filter(|a| a.is_valid(row))
        .map(|a| a.value(row).to_string())
}

/// Append (or replace) the `Opportunity Score` column.
fn with_score_column(batch: &RecordBatch, scores: Float64Array) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields: Vec<FieldRef> = Vec::with_capacity(schema.fields().len() + 1);
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len() + 1);
    for (field, col) in schema.fields().iter().zip(batch.columns()) {
        if field.name() != OPPORTUNITY_SCORE {
            fields.push(field.clone());
            columns.push(col.clone());
        }
    }
    fields.push(Arc::new(Field::new(OPPORTUNITY_SCORE, DataType::Float64, true)));
    columns.push(Arc::new(scores) as ArrayRef);

    let options = RecordBatchOptions::new().with_row_count(Some(batch.num_rows()));
    Ok(RecordBatch::try_new_with_options(
        Arc::new(Schema::new(fields)),
        columns,
        &options,
    )?)
}

/// Score every listing and pick the top candidates.
///
/// Fails with `MissingColumn` when `Total page views` is absent (checked
/// first), or when either of the other two score inputs is absent.
#[tracing::instrument(level = "info", skip(table), fields(rows = table.num_rows()))]
pub fn score_opportunities(table: &CleanedTable) -> Result<Ranking> {
    // 1) Required inputs
    let page_views = require(table, TOTAL_PAGE_VIEWS)?;
    let impressions = require(table, TOTAL_IMPRESSIONS)?;
    let sold = require(table, QUANTITY_SOLD)?;
    let titles = table.text(LISTING_TITLE);
    let item_ids = table.text(ITEM_ID);
    let n = table.num_rows();

    // 2) Per-row score
    let scores: Vec<Option<f64>> = (0..n)
        .map(|row| {
            opportunity_score(
                value_at(impressions, row),
                value_at(page_views, row),
                value_at(sold, row),
            )
        })
        .collect();

    let project = |row: usize| Opportunity {
        row,
        listing_title: text_at(titles, row),
        item_id: text_at(item_ids, row),
        impressions: value_at(impressions, row),
        page_views: value_at(page_views, row),
        quantity_sold: value_at(sold, row),
        score: scores[row],
    };

    // 3) No-sale / high-traffic diagnostic
    let median_page_views = median((0..n).map(|row| value_at(page_views, row)));
    let no_sale_high_traffic = match median_page_views {
        Some(med) => {
            let candidates: Vec<usize> = (0..n)
                .filter(|&row| {
                    value_at(sold, row) == Some(0.0)
                        && value_at(page_views, row).is_some_and(|v| v > med)
                })
                .collect();
            let views: Vec<Option<f64>> = candidates
                .iter()
                .map(|&row| value_at(page_views, row))
                .collect();
            rank_descending(&views)
                .into_iter()
                .map(|i| project(candidates[i]))
                .collect()
        }
        None => Vec::new(),
    };
    debug!(
        median = ?median_page_views,
        count = no_sale_high_traffic.len(),
        "no-sale high-traffic listings"
    );

    // 4) Top subset, highest score first
    let subset: Vec<Opportunity> = rank_descending(&scores)
        .into_iter()
        .take(SUBSET_SIZE)
        .map(project)
        .collect();

    // 5) Chart rows, lowest first so the best bar ends up on top
    let mut chart_rows: Vec<&Opportunity> = subset.iter().take(CHART_SIZE).collect();
    chart_rows.sort_by(|a, b| ascending_missing_last(a.score, b.score));
    let chart = chart_rows
        .into_iter()
        .map(|o| ChartBar {
            label: truncate_chars(o.listing_title.as_deref().unwrap_or(""), LABEL_WIDTH)
                .to_string(),
            score: o.score,
        })
        .collect();

    let integer_columns = IntegerColumns {
        impressions: is_integer_column(impressions),
        page_views: is_integer_column(page_views),
        quantity_sold: is_integer_column(sold),
    };

    let scored = with_score_column(table.batch(), Float64Array::from(scores))?;
    info!(
        scored = scored.num_rows(),
        subset = subset.len(),
        "ranked opportunities"
    );

    Ok(Ranking {
        scored,
        subset,
        chart,
        median_page_views,
        no_sale_high_traffic,
        integer_columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::load_report;

    fn load(csv: &str) -> CleanedTable {
        load_report(csv.as_bytes()).unwrap().table
    }

    const SCENARIO: &str = "Listing title,eBay item ID,Total impressions on eBay site,Total page views,Quantity sold\n\
                            Row one,1,100,50,0\n\
                            Row two,2,200,100,1\n\
                            Row three,3,50,10,0\n";

    #[test]
    fn test_three_row_scenario() -> anyhow::Result<()> {
        let ranking = score_opportunities(&load(SCENARIO))?;

        let scores: Vec<Option<f64>> = ranking.subset.iter().map(|o| o.score).collect();
        assert_eq!(scores, vec![Some(10000.0), Some(5000.0), Some(500.0)]);
        let rows: Vec<usize> = ranking.subset.iter().map(|o| o.row).collect();
        assert_eq!(rows, vec![1, 0, 2]);
        assert_eq!(ranking.subset[0].listing_title.as_deref(), Some("Row two"));
        assert_eq!(ranking.subset[0].item_id.as_deref(), Some("2"));
        Ok(())
    }

    #[test]
    fn test_chart_is_top_ten_ascending() -> anyhow::Result<()> {
        let mut csv = String::from(
            "Listing title,Total impressions on eBay site,Total page views,Quantity sold\n",
        );
        for i in 0..20 {
            csv.push_str(&format!("Item {i},{},{},0\n", i + 1, 10));
        }
        let ranking = score_opportunities(&load(&csv))?;

        assert_eq!(ranking.subset.len(), SUBSET_SIZE);
        assert_eq!(ranking.chart.len(), CHART_SIZE);

        let mut expected: Vec<Option<f64>> = ranking.subset[..CHART_SIZE]
            .iter()
            .map(|o| o.score)
            .collect();
        expected.reverse();
        let charted: Vec<Option<f64>> = ranking.chart.iter().map(|b| b.score).collect();
        assert_eq!(charted, expected);
        assert_eq!(ranking.chart.last().unwrap().label, "Item 19");
        Ok(())
    }

    #[test]
    fn test_subset_is_sorted_and_within_table() -> anyhow::Result<()> {
        let mut csv = String::from(
            "Listing title,Total impressions on eBay site,Total page views,Quantity sold\n",
        );
        for i in 0..40 {
            csv.push_str(&format!("L{i},{},{},{}\n", (i * 37) % 11, (i * 13) % 7, i % 3));
        }
        let table = load(&csv);
        let ranking = score_opportunities(&table)?;

        assert!(ranking.subset.len() <= SUBSET_SIZE);
        for pair in ranking.subset.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        for o in &ranking.subset {
            assert!(o.row < table.num_rows());
        }
        Ok(())
    }

    #[test]
    fn test_ties_keep_file_order() -> anyhow::Result<()> {
        let csv = "Listing title,Total impressions on eBay site,Total page views,Quantity sold\n\
                   A,10,10,0\n\
                   B,10,10,0\n\
                   C,10,10,0\n";
        let ranking = score_opportunities(&load(csv))?;
        let rows: Vec<usize> = ranking.subset.iter().map(|o| o.row).collect();
        assert_eq!(rows, vec![0, 1, 2]);
        Ok(())
    }

    #[test]
    fn test_missing_inputs_give_missing_score_sorted_last() -> anyhow::Result<()> {
        let csv = "Listing title,Total impressions on eBay site,Total page views,Quantity sold\n\
                   A,abc,10,0\n\
                   B,1,1,0\n\
                   C,5,,0\n";
        let ranking = score_opportunities(&load(csv))?;
        let scores: Vec<Option<f64>> = ranking.subset.iter().map(|o| o.score).collect();
        assert_eq!(scores, vec![Some(1.0), None, None]);
        assert_eq!(ranking.subset[1].row, 0);
        assert_eq!(ranking.subset[2].row, 2);
        // missing scores also go last in the ascending chart order
        assert_eq!(ranking.chart[0].score, Some(1.0));
        Ok(())
    }

    #[test]
    fn test_missing_page_views_fails() {
        let csv = "Listing title,Total impressions on eBay site,Quantity sold\nA,1,0\n";
        let err = score_opportunities(&load(csv)).unwrap_err();
        match err {
            OpportunityError::MissingColumn(name) => assert_eq!(name, TOTAL_PAGE_VIEWS),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_page_views_checked_before_other_inputs() {
        let csv = "Listing title\nA\n";
        let err = score_opportunities(&load(csv)).unwrap_err();
        assert!(matches!(err, OpportunityError::MissingColumn(ref n) if n == TOTAL_PAGE_VIEWS));
    }

    #[test]
    fn test_missing_quantity_sold_fails() {
        let csv = "Total impressions on eBay site,Total page views\n1,1\n";
        let err = score_opportunities(&load(csv)).unwrap_err();
        assert!(matches!(err, OpportunityError::MissingColumn(ref n) if n == QUANTITY_SOLD));
    }

    #[test]
    fn test_labels_truncated_to_forty_chars() -> anyhow::Result<()> {
        let long = "x".repeat(55);
        let csv = format!(
            "Listing title,Total impressions on eBay site,Total page views,Quantity sold\n{long},1,1,0\n,2,2,0\n"
        );
        let ranking = score_opportunities(&load(&csv))?;
        let labels: Vec<&str> = ranking.chart.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["x".repeat(LABEL_WIDTH).as_str(), ""]);
        Ok(())
    }

    #[test]
    fn test_scored_table_gains_score_column() -> anyhow::Result<()> {
        let table = load(SCENARIO);
        let ranking = score_opportunities(&table)?;
        let scored = &ranking.scored;
        assert_eq!(scored.num_columns(), table.batch().num_columns() + 1);
        let col = scored
            .column_by_name(OPPORTUNITY_SCORE)
            .unwrap()
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(col.value(0), 5000.0);
        assert_eq!(col.value(1), 10000.0);
        assert_eq!(col.value(2), 500.0);
        Ok(())
    }

    #[test]
    fn test_no_sale_high_traffic_diagnostic() -> anyhow::Result<()> {
        let csv = "Listing title,Total impressions on eBay site,Total page views,Quantity sold\n\
                   A,1,10,0\n\
                   B,1,50,0\n\
                   C,1,90,2\n\
                   D,1,70,0\n\
                   E,1,30,0\n";
        let ranking = score_opportunities(&load(csv))?;
        assert_eq!(ranking.median_page_views, Some(50.0));
        let titles: Vec<&str> = ranking
            .no_sale_high_traffic
            .iter()
            .filter_map(|o| o.listing_title.as_deref())
            .collect();
        assert_eq!(titles, vec!["D"]);
        Ok(())
    }

    #[test]
    fn test_score_formula() {
        assert_eq!(opportunity_score(Some(100.0), Some(50.0), Some(0.0)), Some(5000.0));
        assert_eq!(opportunity_score(Some(200.0), Some(100.0), Some(1.0)), Some(10000.0));
        assert_eq!(opportunity_score(None, Some(1.0), Some(0.0)), None);
        assert_eq!(opportunity_score(Some(1.0), Some(1.0), None), None);
        assert_eq!(opportunity_score(Some(0.0), Some(0.0), Some(-1.0)), None);
    }

    #[test]
    fn test_median() {
        assert_eq!(median([Some(3.0), Some(1.0), Some(2.0)]), Some(2.0));
        assert_eq!(median([Some(4.0), None, Some(1.0), Some(2.0), Some(3.0)]), Some(2.5));
        assert_eq!(median([None, None]), None);
    }

    #[test]
    fn test_integer_columns_cover_whole_table() -> anyhow::Result<()> {
        let ranking = score_opportunities(&load(SCENARIO))?;
        assert_eq!(
            ranking.integer_columns,
            IntegerColumns {
                impressions: true,
                page_views: true,
                quantity_sold: true,
            }
        );

        // one missing cell or one fractional value anywhere demotes the column,
        // even when that row never reaches the subset
        let mut csv = String::from(
            "Listing title,Total impressions on eBay site,Total page views,Quantity sold\n",
        );
        for i in 0..20 {
            csv.push_str(&format!("Item {i},{},10,0\n", 100 + i));
        }
        csv.push_str("Tail,,2.5,0\n");
        let ranking = score_opportunities(&load(&csv))?;
        assert!(ranking.subset.iter().all(|o| o.row < 20));
        assert_eq!(
            ranking.integer_columns,
            IntegerColumns {
                impressions: false,
                page_views: false,
                quantity_sold: true,
            }
        );
        Ok(())
    }

    #[test]
    fn test_empty_table_ranks_nothing() -> anyhow::Result<()> {
        let csv = "Total impressions on eBay site,Total page views,Quantity sold\n";
        let ranking = score_opportunities(&load(csv))?;
        assert!(ranking.subset.is_empty());
        assert!(ranking.chart.is_empty());
        assert_eq!(ranking.median_page_views, None);
        Ok(())
    }
}
