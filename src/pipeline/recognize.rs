//! Boundary and field recognisers: classify one report line.
//!
//! The report has no delimiter characters between records. Header and field
//! lines are told apart only by a fixed vocabulary of leading keywords, so
//! every pattern here is anchored at the start of the line and tolerates
//! whatever trailing text the extraction glued on (neighbouring columns,
//! "Completed Date" stamps, and so on).
//!
//! [`classify`] is a pure function of its input line. Whether an unmatched
//! line continues a wrapped field is decided by the parser, not here.

use crate::pipeline::normalize::parse_amount;
use once_cell::sync::Lazy;
use regex::Regex;

static PO_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Purchase Order ([\d-]+)\s+G/L Date ([\d/]+)\s+Amount ([\d,.]+)$").unwrap()
});

// Lazy suffix match so "Completed Date ..." / "Printed Date ..." noise is left out.
static VENDOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Vendor \d+\s+-\s+(.+?)(?:\s+Completed Date|\s+Printed Date|$)").unwrap()
});

static PO_DESCRIPTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Description (.*?)\s+Deliver by Date").unwrap());

static ITEM_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Item (\d+)\s+Description (.*?)\s+Status").unwrap());

static QUANTITY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Quantity\s+(-?[\d,.]+)").unwrap());

static UNIT_PRICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Price per Unit\s+(-?[\d,.]+)").unwrap());

static DETAIL_DESCRIPTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Detail Description(?:\s+(.*))?$").unwrap());

pub(crate) static GL_ACCOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(crate::config::DEFAULT_GL_ACCOUNT_PATTERN).unwrap());

/// What a single trimmed, non-empty line is, with its typed fields.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    PoHeader {
        po_number: String,
        po_date: String,
        amount: f64,
    },
    Vendor {
        name: String,
    },
    PoDescription {
        text: String,
    },
    ItemHeader {
        number: u32,
        category: String,
    },
    Quantity(f64),
    UnitPrice(f64),
    /// Start of an item's detail description; `text` is the rest of the line.
    DetailDescription {
        text: String,
    },
    GlAccount,
    /// No field marker: a candidate continuation line, or noise.
    Other,
}

/// Classify one line. First matching recogniser wins.
pub fn classify(line: &str) -> LineKind {
    if let Some(caps) = PO_HEADER_RE.captures(line) {
        return LineKind::PoHeader {
            po_number: caps[1].to_string(),
            po_date: caps[2].to_string(),
            amount: parse_amount(&caps[3]),
        };
    }
    if let Some(caps) = VENDOR_RE.captures(line) {
        return LineKind::Vendor {
            name: caps[1].trim().to_string(),
        };
    }
    if let Some(caps) = PO_DESCRIPTION_RE.captures(line) {
        return LineKind::PoDescription {
            text: caps[1].trim().to_string(),
        };
    }
    if let Some(caps) = ITEM_HEADER_RE.captures(line) {
        return LineKind::ItemHeader {
            // \d+ can still overflow u32; fall back to the neutral value.
            number: caps[1].parse().unwrap_or(0),
            category: caps[2].trim().to_string(),
        };
    }
    if let Some(caps) = QUANTITY_RE.captures(line) {
        return LineKind::Quantity(parse_amount(&caps[1]));
    }
    if let Some(caps) = UNIT_PRICE_RE.captures(line) {
        return LineKind::UnitPrice(parse_amount(&caps[1]));
    }
    if let Some(caps) = DETAIL_DESCRIPTION_RE.captures(line) {
        let text = caps.get(1).map_or("", |m| m.as_str());
        return LineKind::DetailDescription {
            text: text.trim().to_string(),
        };
    }
    if GL_ACCOUNT_RE.is_match(line) {
        return LineKind::GlAccount;
    }
    LineKind::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn po_header() {
        assert_eq!(
            classify("Purchase Order 24-00017 G/L Date 07/01/2024 Amount 1,250.50"),
            LineKind::PoHeader {
                po_number: "24-00017".into(),
                po_date: "07/01/2024".into(),
                amount: 1250.5,
            }
        );
    }

    #[test]
    fn po_header_requires_amount_at_end_of_line() {
        assert_eq!(
            classify("Purchase Order 24-00017 G/L Date 07/01/2024 Amount 1,250.50 USD"),
            LineKind::Other
        );
    }

    #[test]
    fn po_header_unparseable_amount_is_zero() {
        match classify("Purchase Order 1 G/L Date 1/1/24 Amount 1.2.3") {
            LineKind::PoHeader { amount, .. } => assert_eq!(amount, 0.0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn vendor_excludes_trailing_date_noise() {
        assert_eq!(
            classify("Vendor 20417 - ACME INDUSTRIAL SUPPLY Completed Date 07/15/2024"),
            LineKind::Vendor {
                name: "ACME INDUSTRIAL SUPPLY".into()
            }
        );
        assert_eq!(
            classify("Vendor 20417 - Bolt & Nut Co Printed Date 07/31/2024"),
            LineKind::Vendor {
                name: "Bolt & Nut Co".into()
            }
        );
        assert_eq!(
            classify("Vendor 7 - Smith Hardware"),
            LineKind::Vendor {
                name: "Smith Hardware".into()
            }
        );
    }

    #[test]
    fn vendor_needs_number_and_dash() {
        assert_eq!(classify("Vendor Smith Hardware"), LineKind::Other);
    }

    #[test]
    fn po_description() {
        assert_eq!(
            classify("Description Fleet maintenance parts Deliver by Date 08/01/2024"),
            LineKind::PoDescription {
                text: "Fleet maintenance parts".into()
            }
        );
    }

    #[test]
    fn item_header() {
        assert_eq!(
            classify("Item 3 Description Vehicle Parts Status Open"),
            LineKind::ItemHeader {
                number: 3,
                category: "Vehicle Parts".into()
            }
        );
    }

    #[test]
    fn item_header_overflowing_number_is_zero() {
        match classify("Item 99999999999 Description X Status Open") {
            LineKind::ItemHeader { number, .. } => assert_eq!(number, 0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn quantity_and_price() {
        assert_eq!(classify("Quantity 5"), LineKind::Quantity(5.0));
        assert_eq!(classify("Quantity 1,200.00 U/M EA"), LineKind::Quantity(1200.0));
        assert_eq!(classify("Price per Unit 2.50"), LineKind::UnitPrice(2.5));
        assert_eq!(classify("Price per Unit -14.00"), LineKind::UnitPrice(-14.0));
    }

    #[test]
    fn detail_description() {
        assert_eq!(
            classify("Detail Description Widget"),
            LineKind::DetailDescription {
                text: "Widget".into()
            }
        );
        assert_eq!(
            classify("Detail Description"),
            LineKind::DetailDescription {
                text: String::new()
            }
        );
    }

    #[test]
    fn gl_account() {
        assert_eq!(
            classify("10100-1000-5200-0000-0000 Operating Supplies 125.00"),
            LineKind::GlAccount
        );
    }

    #[test]
    fn anchored_at_line_start() {
        assert_eq!(classify("see Quantity 5"), LineKind::Other);
        assert_eq!(classify("assembly kit"), LineKind::Other);
    }
}
