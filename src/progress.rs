//! Progress-callback trait for extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events while pages are read and purchase orders are written.
//!
//! # Example
//!
//! ```rust
//! use po_extract::{ExtractionProgressCallback, ExtractionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     records: AtomicUsize,
//! }
//!
//! impl ExtractionProgressCallback for CountingCallback {
//!     fn on_record(&self, po_number: &str, item_count: usize) {
//!         self.records.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("PO {po_number}: {item_count} items");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { records: AtomicUsize::new(0) });
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ExtractionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the extraction pipeline as it reads pages and emits records.
///
/// Extraction runs on a blocking worker thread, so implementations must be
/// `Send + Sync`. Events arrive sequentially from that one thread. All methods
/// have default no-op implementations.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once before the first page is read.
    ///
    /// `total_pages` is the number of selected pages, or `0` for text inputs.
    fn on_extraction_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after a page's lines have been handed to the parser.
    ///
    /// # Arguments
    /// * `page_num`   — 1-indexed page number
    /// * `total_pages` — number of selected pages
    /// * `line_count` — lines extracted from the page, blank lines included
    fn on_page_read(&self, page_num: usize, total_pages: usize, line_count: usize) {
        let _ = (page_num, total_pages, line_count);
    }

    /// Called when a page is skipped because its text could not be read.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called after each purchase order is written to the sink.
    fn on_record(&self, po_number: &str, item_count: usize) {
        let _ = (po_number, item_count);
    }

    /// Called once after the closing bracket has been written.
    fn on_extraction_complete(&self, records_written: usize) {
        let _ = records_written;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        pages: AtomicUsize,
        errors: AtomicUsize,
        po_numbers: Mutex<Vec<String>>,
        completed: AtomicUsize,
    }

    impl ExtractionProgressCallback for TrackingCallback {
        fn on_page_read(&self, _page_num: usize, _total: usize, _lines: usize) {
            self.pages.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_error(&self, _page_num: usize, _total: usize, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_record(&self, po_number: &str, _item_count: usize) {
            self.po_numbers.lock().unwrap().push(po_number.to_string());
        }

        fn on_extraction_complete(&self, records_written: usize) {
            self.completed.store(records_written, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_extraction_start(5);
        cb.on_page_read(1, 5, 42);
        cb.on_page_error(2, 5, "no text layer");
        cb.on_record("24-00017", 3);
        cb.on_extraction_complete(1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_extraction_start(2);
        tracker.on_page_read(1, 2, 60);
        tracker.on_record("24-00017", 2);
        tracker.on_page_error(2, 2, "broken page");
        tracker.on_record("24-00018", 0);
        tracker.on_extraction_complete(2);

        assert_eq!(tracker.pages.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(
            *tracker.po_numbers.lock().unwrap(),
            vec!["24-00017".to_string(), "24-00018".to_string()]
        );
        assert_eq!(tracker.completed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn ExtractionProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_extraction_start(10);
        cb.on_record("1", 0);
    }
}
