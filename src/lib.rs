//! # docsect
//!
//! Split DOCX and PDF documents into titled sections.
//!
//! A reader turns a document into an ordered stream of text blocks, each
//! tagged as heading or body. The segmenter folds that stream into sections
//! (a heading plus the body text that follows it), which are written out as a
//! JSON array of `{"title": ..., "content": ...}` objects.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docsect::{parse_file, render};
//!
//! fn main() -> docsect::Result<()> {
//!     let sections = parse_file("report.docx")?;
//!     let json = render::to_json(&sections, render::JsonFormat::Pretty)?;
//!     println!("{}", json);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **DOCX**: heading styles, list numbering, flattened tables
//! - **PDF**: font-size, weight and alignment based heading detection
//! - **Batch conversion**: whole directories, optionally in parallel

pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod segment;

// Re-export commonly used types
pub use convert::{
    convert_file, convert_path, convert_path_with_progress, BatchReport, ConvertOptions,
    FileOutcome, OutcomeStatus,
};
pub use detect::{detect_format_from_bytes, DocumentFormat};
pub use error::{Error, Result};
pub use model::{Section, StyleHint, TextBlock};
pub use parser::{ErrorMode, HeadingThresholds, ParseOptions, Reader};
pub use render::JsonFormat;
pub use segment::{segment, SegmentOptions, Segmenter};

use std::path::Path;

/// Read a document and split it into sections with default options.
///
/// # Example
///
/// ```no_run
/// use docsect::parse_file;
///
/// let sections = parse_file("document.pdf").unwrap();
/// println!("Sections: {}", sections.len());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<Section>> {
    parse_file_with_options(path, &ParseOptions::default(), &SegmentOptions::default())
}

/// Read a document and split it into sections with custom options.
///
/// # Example
///
/// ```no_run
/// use docsect::{parse_file_with_options, ParseOptions, SegmentOptions};
///
/// let parse = ParseOptions::new().lenient().with_tables(false);
/// let segment = SegmentOptions::new().with_drop_empty(true);
/// let sections = parse_file_with_options("document.docx", &parse, &segment).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(
    path: P,
    parse: &ParseOptions,
    segment_options: &SegmentOptions,
) -> Result<Vec<Section>> {
    let reader = Reader::open(path, parse)?;
    Ok(segment(reader.blocks(), segment_options))
}

/// Split an in-memory document of a known format into sections.
///
/// # Example
///
/// ```no_run
/// use docsect::{parse_bytes, DocumentFormat};
///
/// let data = std::fs::read("document.docx").unwrap();
/// let sections = parse_bytes(DocumentFormat::Docx, &data).unwrap();
/// ```
pub fn parse_bytes(format: DocumentFormat, data: &[u8]) -> Result<Vec<Section>> {
    let reader = Reader::from_bytes(format, data, &ParseOptions::default())?;
    Ok(segment(reader.blocks(), &SegmentOptions::default()))
}
