//! Line sources: turn an input document into an ordered stream of trimmed lines.
//!
//! The parser never sees page boundaries. Each source just yields lines in
//! reading order, blank lines included, with surrounding whitespace removed.
//!
//! ## Why per-page callbacks for PDFs?
//!
//! A pdfium document borrows the bound library instance, so a lazy iterator
//! over it would have to carry both. Reading one page's text at a time and
//! handing it to a callback keeps the borrow local and still bounds memory to
//! a single page. pdfium is not async-safe; callers run this on a blocking
//! thread (see [`crate::convert`]).

use crate::config::PageSelection;
use crate::error::{ExtractError, PageError};
use pdfium_render::prelude::*;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Split one page of extracted text into trimmed lines.
///
/// Handles `\n`, `\r\n` and bare `\r` line endings.
pub fn split_page_text(text: &str) -> Vec<String> {
    text.lines()
        .flat_map(|l| l.split('\r'))
        .map(|l| l.trim().to_string())
        .collect()
}

/// Lines of a pre-extracted text report, read lazily.
///
/// Bytes that are not valid UTF-8 (Latin-1 vendor names, for instance) are
/// replaced with U+FFFD instead of failing the run.
pub struct TextLineSource {
    path: PathBuf,
    reader: BufReader<File>,
    buf: Vec<u8>,
}

impl TextLineSource {
    pub fn open(path: &Path) -> Result<Self, ExtractError> {
        let file = File::open(path).map_err(|e| ExtractError::InputReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            buf: Vec::new(),
        })
    }
}

impl Iterator for TextLineSource {
    type Item = Result<String, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                let text = String::from_utf8_lossy(&self.buf);
                if let Cow::Owned(_) = text {
                    debug!("Replaced invalid UTF-8 in a line of {}", self.path.display());
                }
                Some(Ok(text.trim().to_string()))
            }
            Err(e) => Some(Err(ExtractError::InputReadFailed {
                path: self.path.clone(),
                source: e,
            })),
        }
    }
}

/// PDF text-layer line source backed by a bound pdfium instance.
pub struct PdfLineSource {
    pdfium: Pdfium,
}

impl PdfLineSource {
    /// Bind pdfium from `library_path` (a library file or a directory holding
    /// one), or from the working directory and then the system search path.
    pub fn bind(library_path: Option<&Path>) -> Result<Self, ExtractError> {
        let bindings = match library_path {
            Some(p) => {
                let lib = if p.is_dir() {
                    Pdfium::pdfium_platform_library_name_at_path(p)
                } else {
                    p.to_path_buf()
                };
                debug!("Binding pdfium from {}", lib.display());
                Pdfium::bind_to_library(&lib)
            }
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|e| ExtractError::PdfiumBindingFailed(format!("{e:?}")))?;

        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }

    /// Read the selected pages in document order.
    ///
    /// `on_page` receives `(page_num, total_selected, lines)` for every
    /// selected page; `lines` is `Err` when that page's text could not be read.
    /// An `Err` returned from `on_page` aborts the read and is propagated.
    ///
    /// # Returns
    /// The number of selected pages.
    pub fn read_pages<F>(
        &self,
        pdf_path: &Path,
        password: Option<&str>,
        selection: &PageSelection,
        mut on_page: F,
    ) -> Result<usize, ExtractError>
    where
        F: FnMut(usize, usize, Result<Vec<String>, PageError>) -> Result<(), ExtractError>,
    {
        let document = self
            .pdfium
            .load_pdf_from_file(pdf_path, password)
            .map_err(|e| load_error(pdf_path, password, e))?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        info!("PDF loaded: {} pages", total_pages);

        let indices = select_pages(selection, total_pages)?;
        let selected = indices.len();

        for idx in indices {
            let page_num = idx + 1;
            let text = page_lines(&pages, idx).map_err(|e| {
                warn!("Skipping page {}: {:?}", page_num, e);
                PageError::TextExtractionFailed {
                    page: page_num,
                    detail: format!("{e:?}"),
                }
            });
            on_page(page_num, selected, text)?;
        }

        Ok(selected)
    }
}

fn page_lines(pages: &PdfPages<'_>, idx: usize) -> Result<Vec<String>, PdfiumError> {
    let page = pages.get(idx as u16)?;
    let text = page.text()?.all();
    Ok(split_page_text(&text))
}

fn load_error(pdf_path: &Path, password: Option<&str>, e: PdfiumError) -> ExtractError {
    let err_str = format!("{:?}", e);
    if err_str.contains("Password") || err_str.contains("password") {
        if password.is_some() {
            ExtractError::WrongPassword {
                path: pdf_path.to_path_buf(),
            }
        } else {
            ExtractError::PasswordRequired {
                path: pdf_path.to_path_buf(),
            }
        }
    } else {
        ExtractError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: err_str,
        }
    }
}

/// Zero-based indices for `selection`.
///
/// An empty document yields no pages under [`PageSelection::All`]; any
/// explicit selection that matches nothing is an error.
fn select_pages(
    selection: &PageSelection,
    total_pages: usize,
) -> Result<Vec<usize>, ExtractError> {
    let indices = selection.to_indices(total_pages);
    if indices.is_empty() && *selection != PageSelection::All {
        return Err(ExtractError::PageOutOfRange {
            page: first_requested_page(selection),
            total: total_pages,
        });
    }
    Ok(indices)
}

/// Page number to report when a selection matches nothing.
fn first_requested_page(selection: &PageSelection) -> usize {
    match selection {
        PageSelection::All => 0,
        PageSelection::Single(p) => *p,
        PageSelection::Range(start, _) => *start,
        PageSelection::Set(pages) => pages.iter().copied().min().unwrap_or(0),
    }
}
