//! Error types for the po-extract library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ExtractError`] — **Fatal**: the extraction cannot proceed at all
//!   (input missing, not a PDF, wrong password, output not writable).
//!   Returned as `Err(ExtractError)` from the top-level entry points.
//!
//! * [`PageError`] — **Non-fatal**: the text layer of a single page could not
//!   be read. The page is skipped, the error is stored in
//!   [`crate::output::ExtractionStats`], and the remaining pages still flow
//!   through the parser.
//!
//! Malformed report *content* is never an error at all: unrecognised lines,
//! unparseable numbers and out-of-context fields are dropped or neutralised
//! by the parser.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the po-extract library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is neither a PDF nor a `.txt` dump.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// Reading a text dump failed part-way through.
    #[error("Failed to read input file '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// The page selection does not intersect the document.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output JSON file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output stream rejected a write or flush.
    #[error("Failed to write JSON output: {0}")]
    SinkWriteFailed(#[source] std::io::Error),

    /// A record could not be serialised or written to the sink.
    #[error("Failed to serialise record: {0}")]
    Serialization(#[from] serde_json::Error),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Text extraction from PDF inputs needs the pdfium shared library.\n\
  • Place libpdfium next to the binary or in the working directory, or\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (or pass --pdfium-lib), or\n\
  • Install pdfium system-wide.\n\
Pre-extracted .txt reports do not need pdfium.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single page.
///
/// Stored in [`crate::output::ExtractionStats::page_errors`]. The page's
/// lines are simply absent from the parser's input; any PO open at that point
/// stays open and continues on the next readable page.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The page could not be loaded or its text layer could not be read.
    #[error("Page {page}: text extraction failed: {detail}")]
    TextExtractionFailed { page: usize, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_a_pdf_display_shows_magic() {
        let e = ExtractError::NotAPdf {
            path: PathBuf::from("report.docx"),
            magic: *b"PK\x03\x04",
        };
        let msg = e.to_string();
        assert!(msg.contains("report.docx"), "got: {msg}");
        assert!(msg.contains("80"), "got: {msg}");
    }

    #[test]
    fn output_write_failed_keeps_source() {
        use std::error::Error as _;
        let e = ExtractError::OutputWriteFailed {
            path: PathBuf::from("/read-only/out.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("/read-only/out.json"));
        assert!(e.source().is_some());
    }

    #[test]
    fn page_out_of_range_display() {
        let e = ExtractError::PageOutOfRange { page: 9, total: 4 };
        assert!(e.to_string().contains("Page 9"));
        assert!(e.to_string().contains("4 pages"));
    }

    #[test]
    fn page_error_display() {
        let e = PageError::TextExtractionFailed {
            page: 3,
            detail: "no text layer".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Page 3"));
        assert!(msg.contains("no text layer"));
    }

    #[test]
    fn binding_failure_mentions_text_fallback() {
        let e = ExtractError::PdfiumBindingFailed("dlopen failed".into());
        assert!(e.to_string().contains(".txt"));
    }
}
