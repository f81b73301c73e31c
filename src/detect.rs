//! Document format detection and validation.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Input formats docsect knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    /// Office Open XML word-processing document
    Docx,
    /// Portable Document Format
    Pdf,
}

impl DocumentFormat {
    /// All supported formats.
    pub const ALL: [DocumentFormat; 2] = [DocumentFormat::Docx, DocumentFormat::Pdf];

    /// Map a file extension (without the leading dot, any case) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "docx" => Some(DocumentFormat::Docx),
            "pdf" => Some(DocumentFormat::Pdf),
            _ => None,
        }
    }

    /// Select a format from a path's extension.
    ///
    /// # Returns
    /// * `Err(Error::UnsupportedFormat)` when the extension is missing or unknown
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::UnsupportedFormat(format!("{} (no extension)", path.display())))?;
        Self::from_extension(ext).ok_or_else(|| Error::UnsupportedFormat(format!(".{}", ext)))
    }

    /// Canonical lowercase extension.
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Docx => "docx",
            DocumentFormat::Pdf => "pdf",
        }
    }

    /// Check that `data` (the first bytes of a file) carries this format's signature.
    pub fn matches_bytes(&self, data: &[u8]) -> bool {
        match self {
            DocumentFormat::Docx => data.starts_with(ZIP_MAGIC),
            DocumentFormat::Pdf => data.starts_with(PDF_MAGIC),
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentFormat::Docx => write!(f, "DOCX"),
            DocumentFormat::Pdf => write!(f, "PDF"),
        }
    }
}

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
/// Local file header of a ZIP archive (DOCX packages are ZIP files).
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Detect the format of a file from its leading bytes.
///
/// # Returns
/// * `Ok(DocumentFormat)` if a known signature is found
/// * `Err(Error::UnsupportedFormat)` otherwise
pub fn detect_format_from_bytes(data: &[u8]) -> Result<DocumentFormat> {
    DocumentFormat::ALL
        .into_iter()
        .find(|format| format.matches_bytes(data))
        .ok_or_else(|| Error::UnsupportedFormat("unknown signature".to_string()))
}

/// Verify that the file at `path` starts with the signature of `expected`.
///
/// A `.pdf` that is really an HTML error page, or a truncated `.docx`, is
/// reported as [`Error::FormatMismatch`] before any parser touches it.
pub fn verify_signature<P: AsRef<Path>>(path: P, expected: DocumentFormat) -> Result<()> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut header = Vec::with_capacity(8);
    reader.by_ref().take(8).read_to_end(&mut header)?;

    if expected.matches_bytes(&header) {
        Ok(())
    } else {
        Err(Error::FormatMismatch(match expected {
            DocumentFormat::Docx => "a DOCX (ZIP) package",
            DocumentFormat::Pdf => "a PDF file",
        }))
    }
}
