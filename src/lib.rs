//! # po-extract
//!
//! Turn a "Purchase Order Detail Listing" report into a JSON array of
//! structured purchase-order records.
//!
//! ## Why this crate?
//!
//! The report is a flat, page-oriented listing: no delimiters between
//! records, field labels at the start of lines, and long categories or
//! descriptions wrapped across several unmarked lines. This crate reads the
//! PDF text layer (or a pre-extracted `.txt` dump), classifies each line by
//! its leading keyword and folds the lines into nested PO / line-item records
//! in a single pass, streaming each record to the output as it closes.
//!
//! ## Pipeline Overview
//!
//! ```text
//! report.pdf / report.txt
//!  │
//!  ├─ 1. Input      validate path, PDF magic bytes or .txt dump
//!  ├─ 2. Lines      pdfium text layer, page by page, trimmed lines
//!  ├─ 3. Recognize  anchored keyword regexes → one LineKind per line
//!  ├─ 4. Parse      PO/item state machine with wrapped-text accumulation
//!  └─ 5. Sink       pretty-printed JSON array, one element per closed PO
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use po_extract::{extract_to_file, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::default();
//!     let stats = extract_to_file("po_report.pdf", "po_report.json", &config).await?;
//!     eprintln!(
//!         "{} POs, {} items, {} lines dropped",
//!         stats.records_written, stats.items_written, stats.lines_dropped
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `po2json` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! po-extract = { version = "0.1", default-features = false }
//! ```
//!
//! ## pdfium
//!
//! PDF inputs need the pdfium shared library at runtime. It is looked up at
//! [`ExtractionConfig::pdfium_library_path`], then in the working directory,
//! then on the system library path. Text dumps never touch pdfium.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ExtractionConfig, ExtractionConfigBuilder, PageSelection, StopperSet,
    DEFAULT_GL_ACCOUNT_PATTERN, DEFAULT_STOPPER_KEYWORDS,
};
pub use convert::{
    convert_lines, extract_records, extract_to_file, extract_to_file_sync, extract_to_writer,
    parse_and_stream_pos,
};
pub use error::{ExtractError, PageError};
pub use output::{ExtractionStats, LineItem, PurchaseOrder};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::PurchaseOrders;
