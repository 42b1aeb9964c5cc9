// src/pipeline.rs
use crate::error::OpportunityError;
use crate::process::{load_report, Notice};
use crate::score::{score_opportunities, ChartBar, Opportunity, Ranking};
use serde::Serialize;
use std::io::Read;
use thiserror::Error;
use tracing::info;

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub notices: Vec<Notice>,
    pub ranking: Ranking,
}

/// A run that stopped early. Notices raised before the failure are kept so
/// they can still be shown.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct RunFailure {
    pub notices: Vec<Notice>,
    #[source]
    pub error: OpportunityError,
}

/// Serializable view of a run, for `--json`.
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub notices: &'a [Notice],
    pub median_page_views: Option<f64>,
    pub top_opportunities: &'a [Opportunity],
    pub chart: &'a [ChartBar],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_sale_high_traffic: Option<&'a [Opportunity]>,
}

impl RunOutput {
    pub fn summary(&self, include_no_sale: bool) -> RunSummary<'_> {
        RunSummary {
            notices: &self.notices,
            median_page_views: self.ranking.median_page_views,
            top_opportunities: &self.ranking.subset,
            chart: &self.ranking.chart,
            no_sale_high_traffic: include_no_sale
                .then_some(self.ranking.no_sale_high_traffic.as_slice()),
        }
    }
}

/// Load → clean → score one report. Nothing is kept between calls.
pub fn run_pipeline<R: Read>(reader: R) -> Result<RunOutput, RunFailure> {
    let report = load_report(reader).map_err(|error| RunFailure {
        notices: Vec::new(),
        error,
    })?;

    match score_opportunities(&report.table) {
        Ok(ranking) => {
            info!(
                notices = report.notices.len(),
                subset = ranking.subset.len(),
                "pipeline finished"
            );
            Ok(RunOutput {
                notices: report.notices,
                ranking,
            })
        }
        Err(error) => Err(RunFailure {
            notices: report.notices,
            error,
        }),
    }
}
