use anyhow::{bail, Context, Result};
use clap::Parser;
use oppfinder::{
    pipeline::{run_pipeline, RunOutput},
    present::{self, chart, format_number},
    process::Notice,
};
use std::{fs::File, io::BufReader, path::PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Find the listings in an eBay traffic report with the most untapped traffic"
)]
struct Args {
    /// eBay traffic report (CSV with a header row)
    input: PathBuf,

    /// Directory for Top_Opportunities.csv and the default chart
    #[arg(long, env = "OPPFINDER_OUT_DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Where to write the SVG chart [default: <out-dir>/Top_Opportunities.svg]
    #[arg(long, conflicts_with = "no_chart")]
    chart: Option<PathBuf>,

    /// Skip the SVG chart
    #[arg(long)]
    no_chart: bool,

    /// Also write the full scored table as Parquet
    #[arg(long)]
    parquet: Option<PathBuf>,

    /// Also list listings with no sales and above-median page views
    #[arg(long)]
    show_no_sale: bool,

    /// Print a JSON summary instead of terminal tables
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    // notices are printed by print_notices, not logged
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    info!(input = %args.input.display(), "startup");

    // ─── 2) load, clean, score ───────────────────────────────────────
    let file = File::open(&args.input)
        .with_context(|| format!("Error reading the file: {}", args.input.display()))?;
    let output = match run_pipeline(BufReader::new(file)) {
        Ok(output) => output,
        Err(failure) => {
            print_notices(&failure.notices);
            bail!("{}", failure.error);
        }
    };
    print_notices(&output.notices);

    // ─── 3) present ──────────────────────────────────────────────────
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output.summary(args.show_no_sale))?
        );
    } else {
        print_tables(&output, args.show_no_sale);
    }

    // ─── 4) write artifacts ──────────────────────────────────────────
    let ranking = &output.ranking;
    let csv_path = present::export_to_dir(&ranking.subset, ranking.integer_columns, &args.out_dir)
        .context("writing opportunities CSV")?;
    eprintln!("Top opportunities saved to {}", csv_path.display());

    if !args.no_chart {
        let chart_path = args
            .chart
            .clone()
            .unwrap_or_else(|| args.out_dir.join(chart::CHART_FILE_NAME));
        present::render_svg(&ranking.chart, &chart_path).context("rendering chart")?;
        eprintln!("Chart saved to {}", chart_path.display());
    }

    if let Some(path) = &args.parquet {
        present::write_parquet(&ranking.scored, path)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    info!("all done");
    Ok(())
}

fn print_notices(notices: &[Notice]) {
    for notice in notices {
        match notice {
            Notice::Loaded { .. } => eprintln!("{}", notice),
            Notice::MissingColumn { .. } => eprintln!("Warning: {}", notice),
        }
    }
}

fn print_tables(output: &RunOutput, show_no_sale: bool) {
    let ranking = &output.ranking;

    println!("\n{}", chart::render_text(&ranking.chart, 40));

    println!("--- Top 15 Opportunity Listings ---");
    present::opportunities_table(&ranking.subset).printstd();

    if show_no_sale {
        println!(
            "\n--- No sales, above-median page views (median {}) ---",
            format_number(ranking.median_page_views)
        );
        if ranking.no_sale_high_traffic.is_empty() {
            println!("None.");
        } else {
            present::opportunities_table(&ranking.no_sale_high_traffic).printstd();
        }
    }
}
