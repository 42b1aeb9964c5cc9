use crate::process::utils::parse_numeric;
use arrow::datatypes::{DataType, Field, Schema};

pub const LISTING_TITLE: &str = "Listing title";
pub const ITEM_ID: &str = "eBay item ID";
pub const QUANTITY_AVAILABLE: &str = "Quantity available";
pub const TOTAL_IMPRESSIONS: &str = "Total impressions on eBay site";
pub const QUANTITY_SOLD: &str = "Quantity sold";
pub const TOTAL_PAGE_VIEWS: &str = "Total page views";
pub const OPPORTUNITY_SCORE: &str = "Opportunity Score";

/// Turns one raw cell into a number, or `None` for the missing marker.
pub type Coerce = fn(&str) -> Option<f64>;

/// Columns the cleaner knows about, each paired with the coercion applied to
/// its cells. Every entry is checked on its own; a missing one never stops
/// the others.
pub const KNOWN_COLUMNS: [(&str, Coerce); 11] = [
    (QUANTITY_AVAILABLE, parse_numeric),
    (TOTAL_IMPRESSIONS, parse_numeric),
    (QUANTITY_SOLD, parse_numeric),
    (
        "Top 20 search slot impressions from promoted listings",
        parse_numeric,
    ),
    ("Top 20 search slot organic impressions", parse_numeric),
    ("Rest of search slot impressions", parse_numeric),
    ("Non-search promoted listings impressions", parse_numeric),
    ("Non-search organic impressions", parse_numeric),
    (
        "Total promoted listings impressions (applies to eBay site only)",
        parse_numeric,
    ),
    ("Total organic impressions on eBay site", parse_numeric),
    (TOTAL_PAGE_VIEWS, parse_numeric),
];

pub fn known_coercion(name: &str) -> Option<Coerce> {
    KNOWN_COLUMNS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, coerce)| *coerce)
}

/// Arrow schema for a cleaned report: known columns are `Float64`, the rest
/// stay `Utf8`. Everything is nullable.
pub fn cleaned_schema(headers: &[String]) -> Schema {
    let fields: Vec<Field> = headers
        .iter()
        .map(|name| {
            let ty = if known_coercion(name).is_some() {
                DataType::Float64
            } else {
                DataType::Utf8
            };
            Field::new(name, ty, true)
        })
        .collect();
    Schema::new(fields)
}

/// Names of known columns the header row does not contain, in
/// `KNOWN_COLUMNS` order.
pub fn missing_known_columns(headers: &[String]) -> Vec<&'static str> {
    KNOWN_COLUMNS
        .iter()
        .filter(|(name, _)| !headers.iter().any(|h| h == name))
        .map(|(name, _)| *name)
        .collect()
}
