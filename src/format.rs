//! Canonicalisation of raw spreadsheet cells. Callers treat the empty
//! string as "absent", never as zero.

use chrono::NaiveDate;

/// Date layouts accepted from the sheet, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y"];

/// Canonicalises a raw amount cell into a decimal string with at most two
/// fractional digits and no trailing zeros (`"1000"`, `"210.5"`). Empty or
/// unparseable input yields the empty string.
pub fn format_amount(raw: &str) -> String {
    match parse_amount(raw) {
        Some(value) => render_amount(value),
        None => String::new(),
    }
}

/// Numeric parse shared by the formatter and the validator. Tolerates
/// embedded spaces and comma decimal separators as produced by the sheet
/// locale.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.replace(',', ".").parse::<f64>().ok().filter(|value| value.is_finite())
}

fn render_amount(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let mut text = format!("{rounded:.2}");
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

/// Canonicalises a raw date cell into ISO `YYYY-MM-DD`. Empty or
/// unparseable input yields the empty string.
pub fn format_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    for layout in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, layout) {
            return date.format("%Y-%m-%d").to_string();
        }
    }
    String::new()
}

/// Renders the value written into the import-marker column, `D.M.YYYY`
/// without zero padding.
pub fn marker_date(date: NaiveDate) -> String {
    date.format("%-d.%-m.%Y").to_string()
}
