//! Extraction entry points: input document in, JSON array of purchase orders out.
//!
//! ## Which entry point?
//!
//! * [`parse_and_stream_pos`] — path in, path out, record count back. The
//!   minimal contract; uses [`ExtractionConfig::default`].
//! * [`extract_to_file`] / [`extract_to_file_sync`] — same, with a config and
//!   full [`ExtractionStats`]. The file is written atomically.
//! * [`extract_to_writer`] — stream the array into any [`Write`] (stdout, a
//!   socket, a `Vec<u8>`).
//! * [`convert_lines`] — skip input resolution and feed lines you already
//!   have.
//! * [`extract_records`] — collect every record in memory instead of writing
//!   JSON. Use [`crate::stream::PurchaseOrders`] for a lazy equivalent.
//!
//! Every path runs the same single-pass parser. Records are handed to the
//! output as soon as they close, so peak memory is one page of text plus one
//! purchase order.

use crate::config::{ExtractionConfig, PageSelection};
use crate::error::ExtractError;
use crate::output::{ExtractionStats, PurchaseOrder};
use crate::pipeline::input::{self, ResolvedInput};
use crate::pipeline::lines::{PdfLineSource, TextLineSource};
use crate::pipeline::parser::RecordParser;
use crate::pipeline::sink::JsonArraySink;
use crate::progress::ProgressCallback;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Extract every purchase order in `input` and write them to `output`.
///
/// The output file is created or overwritten. Uses the default configuration.
///
/// # Returns
/// The number of purchase-order records written, which always equals the
/// number of PO header lines in the input.
///
/// # Example
/// ```rust,no_run
/// let count = po_extract::parse_and_stream_pos("po_report.pdf", "po_report.json")?;
/// println!("{count} purchase orders");
/// # Ok::<(), po_extract::ExtractError>(())
/// ```
pub fn parse_and_stream_pos(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<usize, ExtractError> {
    let stats = extract_to_file_sync(input, output, &ExtractionConfig::default())?;
    Ok(stats.records_written)
}

/// Extract purchase orders and write the JSON array to `output_path`.
///
/// Uses atomic write (temp file in the same directory + rename) so a failed
/// run never leaves a truncated file behind or clobbers a previous result.
/// pdfium and the parser run on a blocking worker thread.
pub async fn extract_to_file(
    input: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionStats, ExtractError> {
    let input = input.as_ref().to_path_buf();
    let output_path = output_path.as_ref().to_path_buf();
    let config = config.clone();

    tokio::task::spawn_blocking(move || write_file_atomic(&input, &output_path, &config))
        .await
        .map_err(|e| ExtractError::Internal(format!("Extraction task failed: {e}")))?
}

/// Blocking counterpart of [`extract_to_file`]; runs on the calling thread.
pub fn extract_to_file_sync(
    input: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionStats, ExtractError> {
    write_file_atomic(input.as_ref(), output_path.as_ref(), config)
}

/// Extract purchase orders and stream the JSON array into `writer`.
///
/// The writer is flushed after the closing bracket. On error the output is
/// left incomplete.
pub fn extract_to_writer<W: Write>(
    input: impl AsRef<Path>,
    writer: W,
    config: &ExtractionConfig,
) -> Result<ExtractionStats, ExtractError> {
    let resolved = input::resolve_input(input)?;
    info!("Starting extraction: {}", resolved.path().display());

    let mut sink = JsonArraySink::new(writer, config.json_indent);
    sink.begin_array().map_err(ExtractError::SinkWriteFailed)?;
    let stats = run(&resolved, config, |po| {
        sink.write_element(po).map_err(sink_error)
    })?;
    sink.end_array().map_err(ExtractError::SinkWriteFailed)?;

    complete(config, &stats);
    Ok(stats)
}

/// Parse lines you already have and stream the JSON array into `writer`.
///
/// Page selection and password settings do not apply here.
///
/// # Example
/// ```rust
/// use po_extract::{convert_lines, ExtractionConfig};
///
/// let lines = ["Purchase Order 24-00017 G/L Date 07/01/2024 Amount 1.00"];
/// let mut out = Vec::new();
/// let stats = convert_lines(lines, &mut out, &ExtractionConfig::default()).unwrap();
/// assert_eq!(stats.records_written, 1);
/// assert!(String::from_utf8(out).unwrap().starts_with("[\n{"));
/// ```
pub fn convert_lines<I, W>(
    lines: I,
    writer: W,
    config: &ExtractionConfig,
) -> Result<ExtractionStats, ExtractError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
    W: Write,
{
    let mut sink = JsonArraySink::new(writer, config.json_indent);
    sink.begin_array().map_err(ExtractError::SinkWriteFailed)?;

    let mut run = Run::new(config, |po: &PurchaseOrder| {
        sink.write_element(po).map_err(sink_error)
    });
    run.start(0);
    for line in lines {
        run.push(line.as_ref())?;
    }
    let stats = run.finish()?;

    sink.end_array().map_err(ExtractError::SinkWriteFailed)?;
    complete(config, &stats);
    Ok(stats)
}

/// Extract every purchase order into memory.
///
/// Convenient for small reports and tests; large reports are better served
/// by [`extract_to_writer`] or [`crate::stream::PurchaseOrders`].
pub fn extract_records(
    input: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<(Vec<PurchaseOrder>, ExtractionStats), ExtractError> {
    let resolved = input::resolve_input(input)?;
    info!("Starting extraction: {}", resolved.path().display());

    let mut records = Vec::new();
    let stats = run(&resolved, config, |po| {
        records.push(po.clone());
        Ok(())
    })?;

    complete(config, &stats);
    Ok((records, stats))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// One extraction pass: parser, statistics and the record consumer.
struct Run<'a, F> {
    parser: RecordParser,
    emit: F,
    stats: ExtractionStats,
    callback: Option<&'a ProgressCallback>,
    started: Instant,
}

impl<'a, F> Run<'a, F>
where
    F: FnMut(&PurchaseOrder) -> Result<(), ExtractError>,
{
    fn new(config: &'a ExtractionConfig, emit: F) -> Self {
        Self {
            parser: RecordParser::new(config.stoppers.clone()),
            emit,
            stats: ExtractionStats::default(),
            callback: config.progress_callback.as_ref(),
            started: Instant::now(),
        }
    }

    fn start(&self, total_pages: usize) {
        if let Some(cb) = self.callback {
            cb.on_extraction_start(total_pages);
        }
    }

    fn push(&mut self, line: &str) -> Result<(), ExtractError> {
        match self.parser.feed(line) {
            Some(po) => self.emit_record(&po),
            None => Ok(()),
        }
    }

    fn emit_record(&mut self, po: &PurchaseOrder) -> Result<(), ExtractError> {
        (self.emit)(po)?;
        self.stats.records_written += 1;
        self.stats.items_written += po.items.len();
        debug!("Wrote PO {} ({} items)", po.po_number, po.items.len());
        if let Some(cb) = self.callback {
            cb.on_record(&po.po_number, po.items.len());
        }
        Ok(())
    }

    /// Flush the open PO and fill in the line counters and duration.
    fn finish(mut self) -> Result<ExtractionStats, ExtractError> {
        if let Some(po) = self.parser.finish() {
            self.emit_record(&po)?;
        }
        self.stats.lines_read = self.parser.lines_read();
        self.stats.lines_dropped = self.parser.lines_dropped();
        self.stats.total_duration_ms = self.started.elapsed().as_millis() as u64;
        Ok(self.stats)
    }
}

/// Drive the parser over a resolved input, handing each closed PO to `emit`.
fn run<F>(
    resolved: &ResolvedInput,
    config: &ExtractionConfig,
    emit: F,
) -> Result<ExtractionStats, ExtractError>
where
    F: FnMut(&PurchaseOrder) -> Result<(), ExtractError>,
{
    let mut run = Run::new(config, emit);

    match resolved {
        ResolvedInput::Text(path) => {
            if config.pages != PageSelection::All {
                debug!("Page selection ignored for text input");
            }
            run.start(0);
            for line in TextLineSource::open(path)? {
                run.push(&line?)?;
            }
        }
        ResolvedInput::Pdf(path) => {
            let source = PdfLineSource::bind(config.pdfium_library_path.as_deref())?;
            let mut announced = false;
            let selected = source.read_pages(
                path,
                config.password.as_deref(),
                &config.pages,
                |page_num, total, lines| {
                    if !announced {
                        run.start(total);
                        announced = true;
                    }
                    match lines {
                        Ok(lines) => {
                            for line in &lines {
                                run.push(line)?;
                            }
                            run.stats.pages_read += 1;
                            debug!("Page {}/{}: {} lines", page_num, total, lines.len());
                            if let Some(cb) = run.callback {
                                cb.on_page_read(page_num, total, lines.len());
                            }
                        }
                        Err(e) => {
                            if let Some(cb) = run.callback {
                                cb.on_page_error(page_num, total, &e.to_string());
                            }
                            run.stats.failed_pages += 1;
                            run.stats.page_errors.push(e);
                        }
                    }
                    Ok(())
                },
            )?;
            if !announced {
                run.start(selected);
            }
            debug_assert_eq!(run.stats.pages_read + run.stats.failed_pages, selected);
        }
    }

    let stats = run.finish()?;
    info!(
        "Extraction complete: {} POs, {} items, {} lines ({} dropped), {}ms",
        stats.records_written,
        stats.items_written,
        stats.lines_read,
        stats.lines_dropped,
        stats.total_duration_ms
    );
    Ok(stats)
}

fn write_file_atomic(
    input: &Path,
    output_path: &Path,
    config: &ExtractionConfig,
) -> Result<ExtractionStats, ExtractError> {
    let write_err = |source: std::io::Error| ExtractError::OutputWriteFailed {
        path: output_path.to_path_buf(),
        source,
    };

    let parent = output_dir(output_path);
    fs::create_dir_all(&parent).map_err(write_err)?;
    let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(write_err)?;

    let stats = {
        let writer = BufWriter::new(tmp.as_file_mut());
        extract_to_writer(input, writer, config).map_err(|e| match e {
            ExtractError::SinkWriteFailed(source) => write_err(source),
            other => other,
        })?
    };

    tmp.persist(output_path).map_err(|e| write_err(e.error))?;
    info!(
        "Wrote {} POs to {}",
        stats.records_written,
        output_path.display()
    );
    Ok(stats)
}

/// Directory that will hold `output_path`; `.` for bare file names.
fn output_dir(output_path: &Path) -> PathBuf {
    match output_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// I/O failures from the writer are reported as such, not as serde errors.
fn sink_error(e: serde_json::Error) -> ExtractError {
    if e.is_io() {
        ExtractError::SinkWriteFailed(e.into())
    } else {
        ExtractError::Serialization(e)
    }
}

fn complete(config: &ExtractionConfig, stats: &ExtractionStats) {
    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_complete(stats.records_written);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ExtractionProgressCallback;
    use std::io;
    use std::sync::{Arc, Mutex};

    const REPORT: &[&str] = &[
        "Purchase Order 24-00017 G/L Date 07/01/2024 Amount 7.50",
        "Vendor 100234 - ACME SUPPLY CO",
        "Item 1 Description Hardware Status Open",
        "Quantity 3",
        "Price per Unit 2.50",
        "Detail Description Widget",
        "assembly kit",
        "10100-1000-5200-0000-0000 Office Supplies",
        "Purchase Order 24-00018 G/L Date 07/02/2024 Amount 0.00",
    ];

    #[test]
    fn convert_lines_counts_and_frames() {
        let mut out = Vec::new();
        let stats = convert_lines(REPORT, &mut out, &ExtractionConfig::default()).unwrap();
        assert_eq!(stats.records_written, 2);
        assert_eq!(stats.items_written, 1);
        assert_eq!(stats.lines_read, REPORT.len());
        // GL account line.
        assert_eq!(stats.lines_dropped, 1);

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("[\n{\n    \"po_number\": \"24-00017\""));
        assert!(text.ends_with("}\n]\n"));
        let parsed: Vec<PurchaseOrder> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0].items[0].description, "Widget assembly kit");
        assert_eq!(parsed[0].items[0].total_amount, Some(7.5));
    }

    #[test]
    fn convert_lines_empty_input() {
        let mut out = Vec::new();
        let stats =
            convert_lines(std::iter::empty::<&str>(), &mut out, &ExtractionConfig::default())
                .unwrap();
        assert_eq!(stats.records_written, 0);
        assert_eq!(out, b"[]\n");
    }

    #[test]
    fn indent_is_configurable() {
        let config = ExtractionConfig::builder().json_indent(2).build().unwrap();
        let mut out = Vec::new();
        convert_lines(&REPORT[..1], &mut out, &config).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\n  \"po_number\""), "got: {text}");
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writer_failure_is_fatal() {
        let err = convert_lines(REPORT, FailingWriter, &ExtractionConfig::default()).unwrap_err();
        assert!(matches!(err, ExtractError::SinkWriteFailed(_)), "got {err:?}");
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl ExtractionProgressCallback for Recorder {
        fn on_extraction_start(&self, total_pages: usize) {
            self.events.lock().unwrap().push(format!("start {total_pages}"));
        }
        fn on_record(&self, po_number: &str, item_count: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("record {po_number} {item_count}"));
        }
        fn on_extraction_complete(&self, records_written: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("complete {records_written}"));
        }
    }

    #[test]
    fn progress_events_in_order() {
        let recorder = Arc::new(Recorder::default());
        let config = ExtractionConfig::builder()
            .progress_callback(recorder.clone())
            .build()
            .unwrap();
        convert_lines(REPORT, io::sink(), &config).unwrap();
        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec![
                "start 0",
                "record 24-00017 1",
                "record 24-00018 0",
                "complete 2",
            ]
        );
    }

    #[test]
    fn text_input_to_file_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("report.txt");
        fs::write(&input, REPORT.join("\n")).unwrap();
        let output = dir.path().join("nested").join("out.json");

        let stats = extract_to_file_sync(&input, &output, &ExtractionConfig::default()).unwrap();
        assert_eq!(stats.records_written, 2);
        let first = fs::read_to_string(&output).unwrap();

        fs::write(&input, REPORT[..1].join("\n")).unwrap();
        assert_eq!(parse_and_stream_pos(&input, &output).unwrap(), 1);
        let second = fs::read_to_string(&output).unwrap();
        assert_ne!(first, second);
        let parsed: Vec<PurchaseOrder> = serde_json::from_str(&second).unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn missing_input_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.json");
        let err = parse_and_stream_pos(dir.path().join("missing.txt"), &output).unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn extract_records_from_text() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("report.txt");
        fs::write(&input, REPORT.join("\r\n")).unwrap();
        let (records, stats) = extract_records(&input, &ExtractionConfig::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(stats.records_written, 2);
        assert_eq!(records[0].vendor_name.as_deref(), Some("ACME SUPPLY CO"));
    }

    #[test]
    fn test_output_dir() {
        assert_eq!(output_dir(Path::new("out.json")), PathBuf::from("."));
        assert_eq!(output_dir(Path::new("a/b/out.json")), PathBuf::from("a/b"));
    }
}
