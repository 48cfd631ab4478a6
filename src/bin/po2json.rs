//! CLI binary for po-extract.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig` and prints a run summary.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use po_extract::{
    extract_to_file, extract_to_writer, ExtractionConfig, ExtractionProgressCallback,
    ExtractionStats, PageSelection, ProgressCallback,
};
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: a spinner until the page count is known, then a page
/// bar. Text inputs have no pages and keep the spinner, which shows the
/// running PO count instead.
struct CliProgressCallback {
    bar: ProgressBar,
    records: AtomicUsize,
    page_errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening report…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            records: AtomicUsize::new(0),
            page_errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Reading");
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_pages: usize) {
        if total_pages > 0 {
            self.activate_bar(total_pages);
        } else {
            self.bar.set_prefix("Parsing");
        }
        self.bar.set_message("");
    }

    fn on_page_read(&self, _page_num: usize, _total: usize, _line_count: usize) {
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        self.page_errors.fetch_add(1, Ordering::SeqCst);

        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_record(&self, po_number: &str, item_count: usize) {
        let n = self.records.fetch_add(1, Ordering::SeqCst) + 1;
        self.bar.set_message(format!(
            "{n} POs  {}",
            dim(&format!("{po_number} ({item_count} items)"))
        ));
    }

    fn on_extraction_complete(&self, _records_written: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Print the JSON array to stdout
  po2json po_report.pdf

  # Write to a file
  po2json po_report.pdf -o po_report.json

  # A pre-extracted text dump (no pdfium needed)
  pdftotext -layout po_report.pdf po_report.txt
  po2json po_report.txt -o po_report.json

  # Only some pages, compact indentation
  po2json --pages 3-40 --indent 2 po_report.pdf -o part.json

  # Tune the stopper table for a drifted report layout
  po2json --stoppers "Purchase Order,Vendor,Item,Quantity,Price per Unit,Detail Description,Run by" \
          po_report.pdf

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH    Path to libpdfium (file or directory)
  RUST_LOG           Override the log filter (e.g. po_extract=trace)
  PO2JSON_*          Fallbacks for most flags (see --help)
"#;

/// Extract purchase orders from a PO Detail Listing report as JSON.
#[derive(Parser, Debug)]
#[command(
    name = "po2json",
    version,
    about = "Extract purchase orders from a PO Detail Listing report as JSON",
    long_about = "Read a \"Purchase Order Detail Listing\" report (PDF text layer, or a \
pre-extracted .txt dump) and write every purchase order, with its line items, as one \
element of a JSON array.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Report PDF, or a .txt dump of its text.
    input: PathBuf,

    /// Write JSON to this file instead of stdout.
    #[arg(short, long, env = "PO2JSON_OUTPUT")]
    output: Option<PathBuf>,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "PO2JSON_PAGES", default_value = "all")]
    pages: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PO2JSON_PASSWORD")]
    password: Option<String>,

    /// Spaces per JSON indentation level (0–16).
    #[arg(long, env = "PO2JSON_INDENT", default_value_t = 4,
          value_parser = clap::value_parser!(u8).range(0..=16))]
    indent: u8,

    /// Comma-separated stopper prefixes that end wrapped text.
    #[arg(long, env = "PO2JSON_STOPPERS", value_delimiter = ',')]
    stoppers: Option<Vec<String>>,

    /// Regex for GL account lines (also a stopper).
    #[arg(long, env = "PO2JSON_GL_PATTERN")]
    gl_pattern: Option<String>,

    /// Path to the pdfium shared library, or a directory containing it.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Disable progress bar.
    #[arg(long, env = "PO2JSON_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PO2JSON_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PO2JSON_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // INFO logs would fight with the progress bar for stderr.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run extraction ───────────────────────────────────────────────────
    let stats = if let Some(ref output_path) = cli.output {
        extract_to_file(&cli.input, output_path, &config)
            .await
            .context("Extraction failed")?
    } else {
        let input = cli.input.clone();
        tokio::task::spawn_blocking(move || {
            let stdout = BufWriter::new(io::stdout().lock());
            extract_to_writer(&input, stdout, &config)
        })
        .await
        .context("Extraction task panicked")?
        .context("Extraction failed")?
    };

    if !cli.quiet {
        print_summary(&stats, cli.output.as_ref());
    }

    Ok(())
}

/// One summary line (plus skipped pages, if any) on stderr.
fn print_summary(stats: &ExtractionStats, output: Option<&PathBuf>) {
    let target = output
        .map(|p| bold(&p.display().to_string()))
        .unwrap_or_else(|| dim("stdout"));
    eprintln!(
        "{}  {} POs  {} items  {}  {}ms  →  {}",
        if stats.failed_pages == 0 {
            green("✔")
        } else {
            cyan("⚠")
        },
        bold(&stats.records_written.to_string()),
        stats.items_written,
        dim(&format!(
            "{} lines, {} dropped",
            stats.lines_read, stats.lines_dropped
        )),
        stats.total_duration_ms,
        target,
    );
    for e in &stats.page_errors {
        eprintln!("   {} {}", red("✗"), e);
    }
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let pages = parse_pages(&cli.pages)?;

    let mut builder = ExtractionConfig::builder()
        .pages(pages)
        .json_indent(cli.indent as usize);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(ref stoppers) = cli.stoppers {
        builder = builder.stopper_keywords(stoppers.iter().cloned());
    }
    if let Some(ref pattern) = cli.gl_pattern {
        builder = builder.gl_account_pattern(pattern.clone());
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_library_path(lib.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--pages` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    // Range: "3-15"
    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start
            .trim()
            .parse()
            .context("Invalid start page in range")?;
        let end: usize = end.trim().parse().context("Invalid end page in range")?;

        if start < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", start);
        }
        if start > end {
            anyhow::bail!(
                "Invalid page range '{}-{}': start must be <= end",
                start,
                end
            );
        }

        return Ok(PageSelection::Range(start, end));
    }

    // Set: "1,3,5,7"
    if s.contains(',') {
        let pages: Vec<usize> = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .with_context(|| format!("Invalid page number: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(&p) = pages.iter().find(|&&p| p < 1) {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", p);
        }

        return Ok(PageSelection::Set(pages));
    }

    // Single page: "5"
    let page: usize = s.parse().context("Invalid page number")?;
    if page < 1 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", page);
    }

    Ok(PageSelection::Single(page))
}
