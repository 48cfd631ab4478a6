//! Record and statistics types produced by an extraction run.
//!
//! [`PurchaseOrder`] and [`LineItem`] are the two levels of the output
//! hierarchy. Field order here is the key order in the emitted JSON, and
//! `Option` fields serialise as `null` rather than being skipped so every
//! element of the array has the same shape.

use crate::error::PageError;
use serde::{Deserialize, Serialize};

/// One purchase order from the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    /// PO identifier exactly as printed, e.g. `"24-00017"`.
    pub po_number: String,
    /// G/L date token as printed; the format is not interpreted.
    pub po_date: String,
    /// Header-stated total. `0.0` when the token could not be parsed.
    pub amount: f64,
    pub vendor_name: Option<String>,
    /// Only captured before the first line item appears.
    pub description: Option<String>,
    pub items: Vec<LineItem>,
}

impl PurchaseOrder {
    /// A freshly opened PO carrying only its header fields.
    pub fn new(po_number: impl Into<String>, po_date: impl Into<String>, amount: f64) -> Self {
        Self {
            po_number: po_number.into(),
            po_date: po_date.into(),
            amount,
            vendor_name: None,
            description: None,
            items: Vec::new(),
        }
    }
}

/// One ordered good or service within a [`PurchaseOrder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub line_item_number: u32,
    pub category: String,
    pub description: String,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    /// `quantity * unit_price` rounded to cents; set when the item is closed.
    pub total_amount: Option<f64>,
}

impl LineItem {
    pub fn new(line_item_number: u32, category: impl Into<String>) -> Self {
        Self {
            line_item_number,
            category: category.into(),
            description: String::new(),
            quantity: None,
            unit_price: None,
            total_amount: None,
        }
    }
}

/// Counters for one extraction run.
///
/// None of these values end up in the JSON output, which keeps the output
/// byte-identical across runs even though `total_duration_ms` varies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Purchase orders written to the sink.
    pub records_written: usize,
    /// Line items across all written purchase orders.
    pub items_written: usize,
    /// Pages whose text was handed to the parser. `0` for text inputs.
    pub pages_read: usize,
    /// Pages skipped because their text could not be read.
    pub failed_pages: usize,
    /// Every line seen by the parser, blank lines included.
    pub lines_read: usize,
    /// Non-blank lines the parser could not place anywhere.
    pub lines_dropped: usize,
    pub total_duration_ms: u64,
    /// Details for each entry counted in `failed_pages`.
    pub page_errors: Vec<PageError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchase_order_serialises_nulls_in_key_order() {
        let po = PurchaseOrder::new("24-00017", "07/01/2024", 1250.5);
        let json = serde_json::to_string(&po).unwrap();
        assert_eq!(
            json,
            r#"{"po_number":"24-00017","po_date":"07/01/2024","amount":1250.5,"vendor_name":null,"description":null,"items":[]}"#
        );
    }

    #[test]
    fn line_item_key_order() {
        let item = LineItem::new(1, "Office Supplies");
        let json = serde_json::to_string(&item).unwrap();
        let keys: Vec<&str> = [
            "line_item_number",
            "category",
            "description",
            "quantity",
            "unit_price",
            "total_amount",
        ]
        .to_vec();
        let mut last = 0;
        for k in keys {
            let pos = json.find(k).expect("key present");
            assert!(pos >= last, "{k} out of order in {json}");
            last = pos;
        }
    }
}
