//! Configuration types for purchase-order extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. The report layout knowledge that is
//! most likely to drift between report versions, the stopper table, lives here
//! as data ([`StopperSet`]) rather than inside the parser's control flow.

use crate::error::ExtractError;
use crate::progress::ProgressCallback;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Line prefixes that end a wrapped category or description, in match order.
pub const DEFAULT_STOPPER_KEYWORDS: &[&str] = &[
    "Purchase Order",
    "G/L Date Range",
    "Sort by",
    "Detail Listing",
    "Department",
    "Vendor",
    "Type",
    "Status",
    "Item",
    "Quantity",
    "U/M",
    "Price per Unit",
    "Detail Description",
    "G/L Account",
    "Encumbered",
    "Run by",
];

/// GL account strings such as `10100-1000-5200-0000-0000`.
pub const DEFAULT_GL_ACCOUNT_PATTERN: &str = r"^\d{5}-\d{4}-\d{4}-\d{4}-\d{4}";

/// Configuration for an extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use po_extract::{ExtractionConfig, PageSelection};
///
/// let config = ExtractionConfig::builder()
///     .pages(PageSelection::Range(2, 40))
///     .json_indent(2)
///     .build()
///     .unwrap();
/// assert_eq!(config.json_indent, 2);
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Page selection for PDF inputs. Default: All pages.
    ///
    /// Text dumps carry no page boundaries, so this is ignored for them.
    pub pages: PageSelection,

    /// Spaces per indentation level inside each JSON array element. Default: 4.
    pub json_indent: usize,

    /// Stopper table that terminates multi-line field accumulation.
    pub stoppers: StopperSet,

    /// Explicit location of the pdfium shared library (file or directory).
    ///
    /// If None, the working directory is tried first, then the system
    /// library search path.
    pub pdfium_library_path: Option<PathBuf>,

    /// Receives per-page and per-record events. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            password: None,
            pages: PageSelection::default(),
            json_indent: 4,
            stoppers: StopperSet::default(),
            pdfium_library_path: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pages", &self.pages)
            .field("json_indent", &self.json_indent)
            .field("stoppers", &self.stoppers)
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
            stopper_keywords: None,
            gl_account_pattern: None,
        }
    }
}

/// Builder for [`ExtractionConfig`].
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
    stopper_keywords: Option<Vec<String>>,
    gl_account_pattern: Option<String>,
}

impl ExtractionConfigBuilder {
    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn json_indent(mut self, n: usize) -> Self {
        self.config.json_indent = n.min(16);
        self
    }

    /// Replace the stopper prefixes. Order is kept; blank entries are dropped.
    pub fn stopper_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stopper_keywords = Some(keywords.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the GL-account stopper regex. Compiled in [`Self::build`].
    pub fn gl_account_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.gl_account_pattern = Some(pattern.into());
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<ExtractionConfig, ExtractError> {
        if self.stopper_keywords.is_some() || self.gl_account_pattern.is_some() {
            let keywords = match self.stopper_keywords {
                Some(k) => k,
                None => self.config.stoppers.keywords().to_vec(),
            };
            let pattern = self
                .gl_account_pattern
                .unwrap_or_else(|| self.config.stoppers.gl_account_pattern().to_string());
            self.config.stoppers = StopperSet::new(keywords, &pattern)?;
        }
        Ok(self.config)
    }
}

// ── Stopper table ────────────────────────────────────────────────────────

/// Ordered prefix list plus one GL-account regex.
///
/// A line that starts with any prefix, or matches the regex, ends whatever
/// multi-line field the parser is accumulating. The line itself is then
/// classified normally.
#[derive(Clone)]
pub struct StopperSet {
    keywords: Vec<String>,
    gl_account: Regex,
}

impl StopperSet {
    /// Build a stopper set, rejecting an empty prefix list or a bad regex.
    pub fn new<I, S>(keywords: I, gl_account_pattern: &str) -> Result<Self, ExtractError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| {
                let k: String = k.into();
                k.trim().to_string()
            })
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            return Err(ExtractError::InvalidConfig(
                "Stopper keyword list must not be empty".into(),
            ));
        }
        let gl_account = Regex::new(gl_account_pattern).map_err(|e| {
            ExtractError::InvalidConfig(format!(
                "Invalid GL account pattern '{gl_account_pattern}': {e}"
            ))
        })?;
        Ok(Self {
            keywords,
            gl_account,
        })
    }

    /// True when `line` terminates continuation accumulation.
    pub fn is_stopper(&self, line: &str) -> bool {
        self.keywords.iter().any(|k| line.starts_with(k.as_str()))
            || self.gl_account.is_match(line)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn gl_account_pattern(&self) -> &str {
        self.gl_account.as_str()
    }
}

impl Default for StopperSet {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_STOPPER_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            gl_account: Regex::clone(&crate::pipeline::recognize::GL_ACCOUNT_RE),
        }
    }
}

impl fmt::Debug for StopperSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopperSet")
            .field("keywords", &self.keywords)
            .field("gl_account", &self.gl_account.as_str())
            .finish()
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Specifies which pages of the PDF to read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Read all pages (default).
    #[default]
    All,
    /// Read a single page (1-indexed).
    Single(usize),
    /// Read a contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Read specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    ///
    /// Pages are always read in document order, whatever order a `Set` was
    /// given in; a PO that wraps onto the next page depends on it.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ExtractionConfig::default();
        assert_eq!(c.json_indent, 4);
        assert_eq!(c.pages, PageSelection::All);
        assert_eq!(c.stoppers.keywords().len(), DEFAULT_STOPPER_KEYWORDS.len());
        assert!(c.password.is_none());
    }

    #[test]
    fn indent_is_capped() {
        let c = ExtractionConfig::builder().json_indent(100).build().unwrap();
        assert_eq!(c.json_indent, 16);
    }

    #[test]
    fn custom_stoppers_keep_default_gl_pattern() {
        let c = ExtractionConfig::builder()
            .stopper_keywords(["Vendor", " ", "Run by"])
            .build()
            .unwrap();
        assert_eq!(c.stoppers.keywords(), ["Vendor", "Run by"]);
        assert_eq!(c.stoppers.gl_account_pattern(), DEFAULT_GL_ACCOUNT_PATTERN);
        assert!(c.stoppers.is_stopper("10100-1000-5200-0000-0000 Supplies"));
        assert!(!c.stoppers.is_stopper("Quantity 5"));
    }

    #[test]
    fn empty_stopper_list_rejected() {
        let err = ExtractionConfig::builder()
            .stopper_keywords(Vec::<String>::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig(_)));
    }

    #[test]
    fn bad_gl_pattern_rejected() {
        let err = ExtractionConfig::builder()
            .gl_account_pattern(r"^\d{5")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("GL account pattern"));
    }

    #[test]
    fn default_stoppers_cover_field_keywords() {
        let s = StopperSet::default();
        for line in [
            "Purchase Order 24-00018 G/L Date 07/02/2024 Amount 10.00",
            "Vendor 1001 - ACME",
            "Item 2 Description Tools Status Open",
            "Quantity 5",
            "U/M EA",
            "Price per Unit 2.50",
            "Detail Description More bolts",
            "G/L Account 10100",
            "Run by jdoe on 07/31/2024",
            "10100-1000-5200-0000-0000",
        ] {
            assert!(s.is_stopper(line), "expected stopper: {line}");
        }
        assert!(!s.is_stopper("assembly kit"));
        assert!(!s.is_stopper("stainless steel, 3/8 inch"));
    }

    #[test]
    fn password_redacted_in_debug() {
        let c = ExtractionConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn page_selection_to_indices() {
        assert_eq!(PageSelection::All.to_indices(3), vec![0, 1, 2]);
        assert_eq!(PageSelection::Single(3).to_indices(5), vec![2]);
        assert_eq!(PageSelection::Single(0).to_indices(5), Vec::<usize>::new());
        assert_eq!(PageSelection::Range(2, 4).to_indices(5), vec![1, 2, 3]);
        assert_eq!(PageSelection::Range(4, 9).to_indices(5), vec![3, 4]);
        assert_eq!(
            PageSelection::Set(vec![5, 1, 5]).to_indices(5),
            vec![0, 4] // deduplicated and sorted
        );
    }
}
