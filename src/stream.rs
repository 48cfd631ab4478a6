//! Pull-based record API: an iterator of purchase orders over an iterator of lines.
//!
//! ## Why an iterator adapter?
//!
//! The file entry points in [`crate::convert`] always write a JSON array.
//! Callers that want to filter, batch or load records elsewhere can wrap any
//! line source in [`PurchaseOrders`] and pull completed records one at a
//! time, with the same bounded memory use as the file path: only the PO
//! currently being filled in is held.
//!
//! ```rust
//! use po_extract::PurchaseOrders;
//!
//! let report = "\
//! Purchase Order 24-00017 G/L Date 07/01/2024 Amount 7.50
//! Item 1 Description Hardware Status Open
//! Quantity 3
//! Price per Unit 2.50
//! Purchase Order 24-00018 G/L Date 07/02/2024 Amount 0.00";
//!
//! let pos: Vec<_> = PurchaseOrders::new(report.lines()).collect();
//! assert_eq!(pos.len(), 2);
//! assert_eq!(pos[0].items[0].total_amount, Some(7.5));
//! ```

use crate::config::StopperSet;
use crate::output::PurchaseOrder;
use crate::pipeline::parser::RecordParser;
use std::iter::FusedIterator;

/// Iterator of completed [`PurchaseOrder`]s parsed from a line iterator.
///
/// A record is yielded as soon as the next PO header closes it; the last
/// record is yielded once the line iterator is exhausted. Dropping the
/// adapter early discards the open record; call [`Self::finish`] to get it.
#[derive(Debug)]
pub struct PurchaseOrders<I> {
    lines: I,
    parser: RecordParser,
    exhausted: bool,
}

impl<I> PurchaseOrders<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    /// Parse with the default stopper table.
    pub fn new(lines: impl IntoIterator<IntoIter = I>) -> Self {
        Self::with_stoppers(lines, StopperSet::default())
    }

    pub fn with_stoppers(lines: impl IntoIterator<IntoIter = I>, stoppers: StopperSet) -> Self {
        Self {
            lines: lines.into_iter(),
            parser: RecordParser::new(stoppers),
            exhausted: false,
        }
    }

    /// The underlying parser, for line counters and the record in progress.
    pub fn parser(&self) -> &RecordParser {
        &self.parser
    }

    /// Stop reading lines and flush the open record, if any.
    pub fn finish(mut self) -> Option<PurchaseOrder> {
        self.parser.finish()
    }
}

impl<I> Iterator for PurchaseOrders<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = PurchaseOrder;

    fn next(&mut self) -> Option<PurchaseOrder> {
        if self.exhausted {
            return None;
        }
        for line in self.lines.by_ref() {
            if let Some(po) = self.parser.feed(line.as_ref()) {
                return Some(po);
            }
        }
        self.exhausted = true;
        self.parser.finish()
    }
}

impl<I> FusedIterator for PurchaseOrders<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
}
