//! Pipeline stages for purchase-order extraction.
//!
//! Each submodule implements exactly one step. The parser only ever sees
//! trimmed lines and only ever hands out closed records, so line sources and
//! output formats can change without touching the state machine.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ lines ──▶ recognize ──▶ parser ──▶ sink
//! (path)   (pdfium/   (one line,   (state     (JSON array,
//!           .txt)      one kind)    machine)   streamed)
//! ```
//!
//! 1. [`input`]     — validate the path and pick PDF or text-dump reading
//! 2. [`lines`]     — produce trimmed lines in reading order; pdfium work
//!    runs on a blocking thread because pdfium is not async-safe
//! 3. [`recognize`] — classify one line into a field kind (anchored regexes)
//! 4. [`parser`]    — fold kinds into PO/item records, handling wrapped text
//! 5. [`sink`]      — write each closed record as the next array element
//!
//! [`normalize`] holds the pure numeric/text helpers shared by 3 and 4.

pub mod input;
pub mod lines;
pub mod normalize;
pub mod parser;
pub mod recognize;
pub mod sink;
