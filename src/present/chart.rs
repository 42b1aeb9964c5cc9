// src/present/chart.rs
use crate::error::{OpportunityError, Result};
use crate::present::format_number;
use crate::score::ChartBar;
use plotters::prelude::*;
use std::{fmt::Display, path::Path};
use tracing::info;

pub const CHART_TITLE: &str = "Top 10 Opportunity Listings";
pub const X_AXIS_LABEL: &str = "Opportunity Score";
pub const Y_AXIS_LABEL: &str = "Listing Title";
pub const CHART_FILE_NAME: &str = "Top_Opportunities.svg";

fn chart_err<E: Display>(e: E) -> OpportunityError {
    OpportunityError::Chart(e.to_string())
}

/// x-axis span covering every finite score, always including zero.
fn score_range(bars: &[ChartBar]) -> (f64, f64) {
    let finite = bars
        .iter()
        .filter_map(|b| b.score)
        .filter(|s| s.is_finite());
    let (lo, hi) = finite.fold((0.0_f64, 0.0_f64), |(lo, hi), s| (lo.min(s), hi.max(s)));
    if hi <= lo {
        (lo, lo + 1.0)
    } else {
        (lo, hi + (hi - lo) * 0.05)
    }
}

/// Horizontal bar chart as SVG. Bars arrive lowest first, so the best
/// listing is drawn at the top.
pub fn render_svg(bars: &[ChartBar], path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let (lo, hi) = score_range(bars);
    let slots = bars.len().max(1) as i32;
    let labels: Vec<&str> = bars.iter().map(|b| b.label.as_str()).collect();

    let mut chart = ChartBuilder::on(&root)
        .caption(CHART_TITLE, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(320)
        .build_cartesian_2d(lo..hi, (0..slots).into_segmented())
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(bars.len().max(1))
        .y_label_formatter(&|v: &SegmentValue<i32>| match v {
            SegmentValue::CenterOf(i) => labels
                .get(*i as usize)
                .map(|s| s.to_string())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .x_desc(X_AXIS_LABEL)
        .y_desc(Y_AXIS_LABEL)
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(bars.iter().enumerate().filter_map(|(i, b)| {
            let score = b.score.filter(|s| s.is_finite())?;
            let i = i as i32;
            Some(Rectangle::new(
                [
                    (0.0, SegmentValue::Exact(i)),
                    (score, SegmentValue::Exact(i + 1)),
                ],
                BLUE.filled(),
            ))
        }))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    info!(path = %path.display(), bars = bars.len(), "chart saved");
    Ok(())
}

/// Terminal rendition of the same chart, best listing on the first line.
pub fn render_text(bars: &[ChartBar], width: usize) -> String {
    let (_, hi) = score_range(bars);
    let label_width = bars
        .iter()
        .map(|b| b.label.chars().count())
        .max()
        .unwrap_or(0)
        .max(Y_AXIS_LABEL.len());

    let mut out = format!("{}\n", CHART_TITLE);
    out.push_str(&format!(
        "{:<w$} | {}\n",
        Y_AXIS_LABEL,
        X_AXIS_LABEL,
        w = label_width
    ));
    for bar in bars.iter().rev() {
        let len = match bar.score {
            Some(s) if s.is_finite() && s > 0.0 && hi > 0.0 => {
                ((s / hi) * width as f64).round() as usize
            }
            _ => 0,
        };
        out.push_str(&format!(
            "{:<w$} | {} {}\n",
            bar.label,
            "█".repeat(len),
            format_number(bar.score),
            w = label_width
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn bars() -> Vec<ChartBar> {
        vec![
            ChartBar {
                label: "Row three".into(),
                score: Some(500.0),
            },
            ChartBar {
                label: "Row one".into(),
                score: Some(5000.0),
            },
            ChartBar {
                label: "Row two".into(),
                score: Some(10000.0),
            },
        ]
    }

    #[test]
    fn text_chart_puts_best_first() {
        let text = render_text(&bars(), 20);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], CHART_TITLE);
        assert!(lines[2].starts_with("Row two"));
        assert!(lines[4].starts_with("Row three"));
        assert!(lines[2].matches('█').count() > lines[3].matches('█').count());
    }

    #[test]
    fn range_always_includes_zero() {
        assert_eq!(score_range(&[]), (0.0, 1.0));
        let (lo, hi) = score_range(&bars());
        assert_eq!(lo, 0.0);
        assert!(hi > 10000.0);
    }

    #[test]
    fn svg_chart_is_written() -> anyhow::Result<()> {
        let tmp = tempdir()?;
        let path = tmp.path().join("chart.svg");
        render_svg(&bars(), &path)?;
        let svg = std::fs::read_to_string(&path)?;
        assert!(svg.contains("<svg"));
        assert!(svg.contains(CHART_TITLE));
        Ok(())
    }
}
