pub mod chart;
pub mod export;
pub mod table;

pub use chart::{render_svg, render_text};
pub use export::{export_to_dir, write_opportunities_csv, write_parquet, EXPORT_FILE_NAME};
pub use table::opportunities_table;

/// Human-friendly number for terminal output: thousands separators, no
/// decimals for whole numbers, two otherwise. Missing values print empty.
pub fn format_number(v: Option<f64>) -> String {
    let Some(v) = v else {
        return String::new();
    };
    if !v.is_finite() {
        return v.to_string();
    }
    let fixed = if v.fract() == 0.0 {
        format!("{:.0}", v.abs())
    } else {
        format!("{:.2}", v.abs())
    };
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if v < 0.0 { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}
