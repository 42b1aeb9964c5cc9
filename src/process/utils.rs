/// 1) Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}

/// 2) Drop thousands separators and percent signs, wherever they occur.
pub fn strip_numeric_noise(s: &str) -> String {
    s.chars().filter(|c| !matches!(c, ',' | '%')).collect()
}

/// Coerce a report cell into a number.
///
/// `"1,234"` → `Some(1234.0)`, `"12%"` → `Some(12.0)`. Empty cells, text and
/// anything that parses to NaN come back as `None` (the missing marker).
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let stripped = strip_numeric_noise(clean_str(raw));
    let candidate = stripped.trim();
    if candidate.is_empty() {
        return None;
    }
    candidate.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Cell values read as missing in text columns, as dataframe readers do.
pub const NA_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Text cells keep their content verbatim; an exact NA token is missing.
pub fn text_cell(raw: &str) -> Option<&str> {
    if NA_TOKENS.contains(&raw) {
        None
    } else {
        Some(raw)
    }
}

/// Truncate to at most `max_chars` characters, never splitting a code point.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
