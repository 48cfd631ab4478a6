//! The record parser: a line-at-a-time state machine that turns a flat
//! stream of report lines into closed [`PurchaseOrder`] records.
//!
//! ## State
//!
//! [`RecordParser`] owns everything that survives from one line to the next:
//! the open PO (at most one), whether its last item is still open, and which
//! multi-line field, if any, is accumulating. [`RecordParser::feed`] is the
//! transition function; it returns a record exactly when a PO closes.
//!
//! ## Continuation handling
//!
//! Wrapped category and description text carries no marker of its own. While
//! a field is accumulating, every line gets the [`StopperSet`] test first:
//!
//! ```text
//!             item header                     Detail Description
//!   Idle ─────────────────▶ Category    Idle ─────────────────────▶ Description
//!    ▲                        │                                         │
//!    └──── stopper line ◀─────┴─────────────── stopper line ◀───────────┘
//!          (re-classified in the same call)
//! ```
//!
//! A non-stopper line is appended to the active field and consumed. A stopper
//! line ends accumulation and is then classified like any other line, so a
//! `Quantity 5` right after a wrapped description still lands in `quantity`.
//! A genuine continuation line that happens to begin with a stopper keyword is
//! misread as a field boundary; that is the accepted cost of the heuristic.

use crate::config::StopperSet;
use crate::output::{LineItem, PurchaseOrder};
use crate::pipeline::normalize::{collapse_whitespace, line_total, strip_remaining_marker};
use crate::pipeline::recognize::{classify, LineKind};
use tracing::{debug, trace};

/// Which multi-line field, if any, absorbs unmarked lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Continuation {
    #[default]
    Idle,
    Category,
    Description,
}

/// Streaming parser state. One instance per input document.
#[derive(Debug, Default)]
pub struct RecordParser {
    stoppers: StopperSet,
    current: Option<PurchaseOrder>,
    /// The last entry of `current.items` is still accepting fields.
    item_open: bool,
    mode: Continuation,
    lines_read: usize,
    lines_dropped: usize,
}

impl RecordParser {
    pub fn new(stoppers: StopperSet) -> Self {
        Self {
            stoppers,
            ..Self::default()
        }
    }

    /// Consume one line. Returns the previous PO when this line opens a new one.
    pub fn feed(&mut self, line: &str) -> Option<PurchaseOrder> {
        self.lines_read += 1;
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if self.mode != Continuation::Idle {
            if self.stoppers.is_stopper(line) {
                self.mode = Continuation::Idle;
            } else {
                self.append_continuation(line);
                return None;
            }
        }

        self.apply(classify(line), line)
    }

    /// Close and return the open PO, if any. Safe to call more than once.
    ///
    /// Call this when the line source is exhausted or abandoned early; the
    /// partially filled record is still a record.
    pub fn finish(&mut self) -> Option<PurchaseOrder> {
        self.close_po()
    }

    pub fn mode(&self) -> Continuation {
        self.mode
    }

    /// The PO currently being filled in.
    pub fn current(&self) -> Option<&PurchaseOrder> {
        self.current.as_ref()
    }

    /// Lines passed to [`Self::feed`], blank lines included.
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    /// Non-blank lines that matched no slot in the current context.
    pub fn lines_dropped(&self) -> usize {
        self.lines_dropped
    }

    /// Apply one classified line. Returns the previous PO when `kind` is a header.
    fn apply(&mut self, kind: LineKind, line: &str) -> Option<PurchaseOrder> {
        match kind {
            LineKind::PoHeader {
                po_number,
                po_date,
                amount,
            } => {
                let closed = self.close_po();
                trace!("Opening PO {}", po_number);
                self.current = Some(PurchaseOrder::new(po_number, po_date, amount));
                return closed;
            }
            _ if self.current.is_none() => self.drop_line(line, "no purchase order open"),
            // Last write wins if the report repeats the vendor line.
            LineKind::Vendor { name } => {
                if let Some(po) = self.current.as_mut() {
                    po.vendor_name = Some(name);
                }
            }
            LineKind::PoDescription { text } => match self.current.as_mut() {
                Some(po) if po.items.is_empty() => po.description = Some(text),
                _ => self.drop_line(line, "PO description after first item"),
            },
            LineKind::ItemHeader { number, category } => {
                self.close_item();
                if let Some(po) = self.current.as_mut() {
                    po.items.push(LineItem::new(number, category));
                }
                self.item_open = true;
                self.mode = Continuation::Category;
            }
            LineKind::Quantity(value) => match self.open_item() {
                Some(item) => item.quantity = Some(value),
                None => self.drop_line(line, "quantity outside an item"),
            },
            LineKind::UnitPrice(value) => match self.open_item() {
                Some(item) => item.unit_price = Some(value),
                None => self.drop_line(line, "unit price outside an item"),
            },
            LineKind::DetailDescription { text } => match self.open_item() {
                Some(item) => {
                    item.description = strip_remaining_marker(&text);
                    self.mode = Continuation::Description;
                }
                None => self.drop_line(line, "detail description outside an item"),
            },
            LineKind::GlAccount | LineKind::Other => self.drop_line(line, "unrecognised"),
        }
        None
    }

    fn append_continuation(&mut self, line: &str) {
        let mode = self.mode;
        let Some(item) = self.open_item() else {
            self.mode = Continuation::Idle;
            return;
        };
        let field = match mode {
            Continuation::Category => &mut item.category,
            Continuation::Description => &mut item.description,
            Continuation::Idle => return,
        };
        if !field.is_empty() {
            field.push(' ');
        }
        field.push_str(line);
    }

    fn open_item(&mut self) -> Option<&mut LineItem> {
        if !self.item_open {
            return None;
        }
        self.current.as_mut().and_then(|po| po.items.last_mut())
    }

    /// Normalise the open item's text and compute its total.
    fn close_item(&mut self) {
        if let Some(item) = self.open_item() {
            item.category = collapse_whitespace(&item.category);
            item.description = collapse_whitespace(&item.description);
            item.total_amount = line_total(item.quantity, item.unit_price);
        }
        self.item_open = false;
        self.mode = Continuation::Idle;
    }

    fn close_po(&mut self) -> Option<PurchaseOrder> {
        self.close_item();
        let po = self.current.take()?;
        debug!("Closed PO {} with {} items", po.po_number, po.items.len());
        Some(po)
    }

    fn drop_line(&mut self, line: &str, reason: &str) {
        self.lines_dropped += 1;
        trace!("Dropped line ({}): {:?}", reason, line);
    }
}
