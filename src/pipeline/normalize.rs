//! Numeric and text normalisation applied by the recognisers and the parser.
//!
//! Every function here is a small pure `&str → value` step so the parser's
//! state machine never has to care about thousands separators, column bleed
//! or floating-point rounding.

/// Artefact of the adjacent "Remaining" amount column bleeding into the
/// first line of a detail description.
pub const REMAINING_MARKER: &str = "Remaining .00";

/// Parse a report amount such as `1,250.50`.
///
/// Grouping commas are stripped. Anything that still fails to parse (`"."`,
/// `"1.2.3"`) becomes `0.0` instead of an error.
pub fn parse_amount(token: &str) -> f64 {
    let cleaned: String = token.chars().filter(|&c| c != ',').collect();
    cleaned.trim().parse::<f64>().unwrap_or(0.0)
}

/// Collapse every whitespace run to one space and trim both ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim and drop a trailing [`REMAINING_MARKER`] from a detail description.
pub fn strip_remaining_marker(s: &str) -> String {
    let s = s.trim();
    match s.strip_suffix(REMAINING_MARKER) {
        Some(rest) => rest.trim().to_string(),
        None => s.to_string(),
    }
}

/// Round to cents, halves away from zero.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `quantity * unit_price` in cents, only when both are known.
pub fn line_total(quantity: Option<f64>, unit_price: Option<f64>) -> Option<f64> {
    match (quantity, unit_price) {
        (Some(q), Some(p)) => Some(round_cents(q * p)),
        _ => None,
    }
}
