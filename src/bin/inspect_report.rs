use anyhow::{Context, Result};
use arrow::array::Array;
use clap::Parser;
use oppfinder::process::{load_report, schema::KNOWN_COLUMNS};
use prettytable::{format, Cell, Row, Table};
use std::{fs::File, io::BufReader, path::PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(about = "Show how the known columns of a traffic report clean up, without scoring")]
struct Args {
    /// eBay traffic report (CSV with a header row)
    input: PathBuf,
}

fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let file = File::open(&args.input)
        .with_context(|| format!("Error reading the file: {}", args.input.display()))?;
    let report = load_report(BufReader::new(file))
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    let table = &report.table;

    println!("=== Report: {} ===", args.input.display());
    println!("Rows:    {}", table.num_rows());
    println!("Columns: {}", table.batch().num_columns());
    println!();

    let mut out = Table::new();
    out.set_format(*format::consts::FORMAT_BOX_CHARS);
    out.set_titles(Row::new(vec![
        Cell::new("Column").style_spec("bFg"),
        Cell::new("Present").style_spec("bFg"),
        Cell::new("Numeric").style_spec("bFg"),
        Cell::new("Missing").style_spec("bFg"),
    ]));

    for (name, _) in KNOWN_COLUMNS {
        let row = match table.numeric(name) {
            Some(col) => {
                let missing = col.null_count();
                vec![
                    Cell::new(name),
                    Cell::new("yes"),
                    Cell::new(&(col.len() - missing).to_string()).style_spec("r"),
                    Cell::new(&missing.to_string()).style_spec("r"),
                ]
            }
            None => vec![
                Cell::new(name),
                Cell::new("no").style_spec("Fr"),
                Cell::new("-").style_spec("r"),
                Cell::new("-").style_spec("r"),
            ],
        };
        out.add_row(Row::new(row));
    }
    out.printstd();

    Ok(())
}
