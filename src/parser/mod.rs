//! Document readers.
//!
//! Both formats are read into the same stream of [`TextBlock`]s; the
//! [`Reader`] enum picks the variant from the file extension.

mod backend;
mod classify;
mod docx_parser;
mod layout;
mod numbering;
mod options;
mod pdf_parser;

use std::path::Path;

use unicode_normalization::UnicodeNormalization;

use crate::detect::DocumentFormat;
use crate::error::Result;
use crate::model::TextBlock;

pub use backend::{
    decode_fallback, ContentOp, LopdfSource, Operand, PageContent, PageFont, PageSource,
};
pub use classify::{classify, BodyStyle, LineMetrics, PageMargins};
pub use docx_parser::DocxReader;
pub use layout::{FontStatistics, LayoutAnalyzer, TextLine, TextSpan};
pub use numbering::{NumberFormat, Numbering};
pub use options::{ErrorMode, HeadingThresholds, ParseOptions, DEFAULT_HEADING_STYLE_PATTERN};
pub use pdf_parser::{PdfBlocks, PdfReader};

/// A document reader for one of the supported formats.
#[derive(Debug)]
pub enum Reader {
    Docx(DocxReader),
    Pdf(PdfReader),
}

impl Reader {
    /// Open `path` with the reader its extension selects.
    ///
    /// # Errors
    /// * [`Error::UnsupportedFormat`](crate::Error::UnsupportedFormat) for unknown extensions
    /// * [`Error::UnreadableDocument`](crate::Error::UnreadableDocument) when the file
    ///   cannot be opened or parsed
    pub fn open<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        let format = DocumentFormat::from_path(path)?;
        log::debug!("Opening {} as {}", path.display(), format);

        let reader = match format {
            DocumentFormat::Docx => DocxReader::open(path, options.clone()).map(Reader::Docx),
            DocumentFormat::Pdf => PdfReader::open(path, options.clone()).map(Reader::Pdf),
        };
        reader.map_err(|e| e.unreadable(path))
    }

    /// Read a document of a known format from bytes.
    pub fn from_bytes(format: DocumentFormat, data: &[u8], options: &ParseOptions) -> Result<Self> {
        match format {
            DocumentFormat::Docx => DocxReader::from_bytes(data, options.clone()).map(Reader::Docx),
            DocumentFormat::Pdf => PdfReader::from_bytes(data, options.clone()).map(Reader::Pdf),
        }
    }

    /// Format of the document being read.
    pub fn format(&self) -> DocumentFormat {
        match self {
            Reader::Docx(_) => DocumentFormat::Docx,
            Reader::Pdf(_) => DocumentFormat::Pdf,
        }
    }

    /// Consume the reader, yielding its blocks in document order.
    pub fn blocks(self) -> TextBlocks {
        match self {
            Reader::Docx(r) => TextBlocks::Docx(r.blocks()),
            Reader::Pdf(r) => TextBlocks::Pdf(r.blocks()),
        }
    }
}

/// Text blocks of a document, see [`Reader::blocks`].
pub enum TextBlocks {
    Docx(std::vec::IntoIter<TextBlock>),
    Pdf(PdfBlocks),
}

impl Iterator for TextBlocks {
    type Item = TextBlock;

    fn next(&mut self) -> Option<TextBlock> {
        match self {
            TextBlocks::Docx(blocks) => blocks.next(),
            TextBlocks::Pdf(blocks) => blocks.next(),
        }
    }
}

/// Collapse whitespace runs to single spaces and trim, optionally applying NFC.
pub(crate) fn clean_text(text: &str, nfc: bool) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if nfc {
        collapsed.nfc().collect()
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  a \t b\n\nc  ", false), "a b c");
        assert_eq!(clean_text("\u{00A0}x\u{00A0}", false), "x");
        assert_eq!(clean_text("", true), "");
        // e + combining acute → é
        assert_eq!(clean_text("Caf\u{0065}\u{0301}", true), "Caf\u{00E9}");
        assert_eq!(clean_text("Caf\u{0065}\u{0301}", false), "Caf\u{0065}\u{0301}");
    }

    #[test]
    fn test_open_unsupported_extension() {
        let err = Reader::open("notes.txt", &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_open_missing_file_is_unreadable() {
        let err = Reader::open("/nonexistent/dir/report.pdf", &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UnreadableDocument { .. }));
    }

    #[test]
    fn test_open_mislabeled_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.docx");
        std::fs::write(&path, b"%PDF-1.4 not a docx").unwrap();

        let err = Reader::open(&path, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UnreadableDocument { .. }));
    }
}
