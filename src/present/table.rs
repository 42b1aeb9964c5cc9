use crate::present::{export::EXPORT_COLUMNS, format_number};
use crate::score::Opportunity;
use prettytable::{format, Cell, Row, Table};

/// Build a boxed terminal table of opportunities, one row per listing, in
/// the export column order.
pub fn opportunities_table(rows: &[Opportunity]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);

    table.set_titles(Row::new(
        EXPORT_COLUMNS
            .iter()
            .map(|name| Cell::new(name).style_spec("bFg"))
            .collect(),
    ));

    for o in rows {
        table.add_row(Row::new(vec![
            Cell::new(o.listing_title.as_deref().unwrap_or("")),
            Cell::new(o.item_id.as_deref().unwrap_or("")),
            Cell::new(&format_number(o.impressions)).style_spec("r"),
            Cell::new(&format_number(o.page_views)).style_spec("r"),
            Cell::new(&format_number(o.quantity_sold)).style_spec("r"),
            Cell::new(&format_number(o.score)).style_spec("r"),
        ]));
    }
    table
}
