//! Input resolution: validate a user-supplied path and decide how to read it.
//!
//! Two input shapes are accepted. A PDF report goes through pdfium's text
//! layer. A `.txt` file is taken to be a line dump of such a report (for
//! example produced by `pdftotext -layout`) and is read as-is. Anything else
//! must at least start with the `%PDF` magic bytes, so callers get a clear
//! [`ExtractError::NotAPdf`] instead of a pdfium failure.

use crate::error::ExtractError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The validated input and how its lines will be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedInput {
    /// A PDF document; lines come from the pdfium text layer.
    Pdf(PathBuf),
    /// A pre-extracted text dump; one report line per file line.
    Text(PathBuf),
}

impl ResolvedInput {
    /// Get the path to the input file regardless of its kind.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Pdf(p) | ResolvedInput::Text(p) => p,
        }
    }
}

/// Check if the path names a plain-text report dump.
pub fn is_text_dump(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
}

/// Resolve a local input path, validating existence and (for PDFs) magic bytes.
pub fn resolve_input(input: impl AsRef<Path>) -> Result<ResolvedInput, ExtractError> {
    let path = input.as_ref().to_path_buf();

    if !path.exists() {
        return Err(ExtractError::FileNotFound { path });
    }

    // Check read permission by attempting to open
    let mut file = match std::fs::File::open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ExtractError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(ExtractError::FileNotFound { path });
        }
    };

    if is_text_dump(&path) {
        debug!("Resolved text report: {}", path.display());
        return Ok(ResolvedInput::Text(path));
    }

    // Verify PDF magic bytes
    let mut magic = [0u8; 4];
    if file.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
        return Err(ExtractError::NotAPdf { path, magic });
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(ResolvedInput::Pdf(path))
}
