//! Error types for docsect.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for docsect operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reading, segmenting or writing documents.
#[derive(Error, Debug)]
pub enum Error {
    /// The file extension does not map to a known document format.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The document could not be opened or parsed.
    #[error("Unreadable document {}: {reason}", path.display())]
    UnreadableDocument {
        /// Path of the offending input file
        path: PathBuf,
        /// Description of the underlying failure
        reason: String,
    },

    /// Nothing to process at the given path.
    #[error("No input found at {}", .0.display())]
    NoInput(PathBuf),

    /// The output destination is not writable.
    #[error("Cannot write {}: {source}", path.display())]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// I/O error when reading files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// Error parsing the DOCX package or its XML parts.
    #[error("DOCX parsing error: {0}")]
    DocxParse(String),

    /// The document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// The file content does not match the format implied by its extension.
    #[error("Content does not look like {0}")]
    FormatMismatch(&'static str),

    /// Error during JSON rendering.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Fold a parse-level error into [`Error::UnreadableDocument`] for `path`.
    ///
    /// Errors that already carry their own taxonomy are returned unchanged.
    pub fn unreadable(self, path: &Path) -> Self {
        match self {
            Error::UnsupportedFormat(_)
            | Error::UnreadableDocument { .. }
            | Error::NoInput(_)
            | Error::Write { .. } => self,
            other => Error::UnreadableDocument {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        }
    }

    /// Whether this error must abort a directory batch.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::NoInput(_) | Error::Write { .. })
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            _ => Error::DocxParse(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::DocxParse(format!("XML error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Encrypted;
        assert_eq!(err.to_string(), "Document is encrypted");

        let err = Error::UnsupportedFormat("txt".to_string());
        assert_eq!(err.to_string(), "Unsupported file format: txt");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_unreadable_wraps_parse_errors() {
        let err = Error::PdfParse("bad xref".to_string()).unreadable(Path::new("a.pdf"));
        match err {
            Error::UnreadableDocument { path, reason } => {
                assert_eq!(path, PathBuf::from("a.pdf"));
                assert!(reason.contains("bad xref"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = Error::UnsupportedFormat("txt".into()).unreadable(Path::new("a.txt"));
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_fatal_classification() {
        assert!(Error::NoInput(PathBuf::from("x")).is_fatal());
        assert!(Error::Write {
            path: PathBuf::from("out.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        }
        .is_fatal());
        assert!(!Error::Encrypted.is_fatal());
    }
}
