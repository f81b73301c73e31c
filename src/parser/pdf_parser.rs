//! PDF document reader.
//!
//! Opening a PDF runs layout analysis on every page once, gathering the
//! document-wide body style; [`PdfReader::blocks`] then classifies lines
//! lazily, page by page.

use std::iter::Peekable;
use std::path::Path;

use crate::detect::{verify_signature, DocumentFormat};
use crate::error::Result;
use crate::model::{StyleHint, TextBlock};

use super::backend::{LopdfSource, PageSource};
use super::classify::{classify, BodyStyle, LineMetrics, PageMargins};
use super::layout::{page_margins, FontStatistics, LayoutAnalyzer, TextLine};
use super::options::{ErrorMode, HeadingThresholds, ParseOptions};
use super::clean_text;

/// Lines of one page plus its margins.
#[derive(Debug, Clone)]
struct PageLines {
    number: u32,
    margins: PageMargins,
    lines: Vec<TextLine>,
}

/// PDF document reader.
#[derive(Debug)]
pub struct PdfReader {
    pages: Vec<PageLines>,
    body: BodyStyle,
    options: ParseOptions,
}

impl PdfReader {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        verify_signature(path, DocumentFormat::Pdf)?;
        let source = LopdfSource::load_file(path)?;
        Self::from_source(&source, options)
    }

    /// Read a PDF from bytes.
    pub fn from_bytes(data: &[u8], options: ParseOptions) -> Result<Self> {
        let source = LopdfSource::load_bytes(data)?;
        Self::from_source(&source, options)
    }

    /// Run layout analysis over every page of `source`.
    pub fn from_source<S: PageSource>(source: &S, options: ParseOptions) -> Result<Self> {
        let analyzer = LayoutAnalyzer::new(source);
        let mut stats = FontStatistics::default();
        let mut pages = Vec::new();

        for page_num in source.page_numbers() {
            let lines = match analyzer.extract_page_lines(page_num) {
                Ok(lines) => lines,
                Err(e) if options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Skipping page {}: {}", page_num, e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            for line in &lines {
                stats.add_line(line);
            }
            pages.push(PageLines {
                number: page_num,
                margins: page_margins(&lines),
                lines,
            });
        }

        let body = stats.body_style();
        log::debug!(
            "PDF body style: {:.1}pt {}{} across {} pages",
            body.size,
            body.font,
            if body.bold { " (bold)" } else { "" },
            pages.len()
        );

        Ok(Self {
            pages,
            body,
            options,
        })
    }

    /// The dominant text style of the document.
    pub fn body_style(&self) -> &BodyStyle {
        &self.body
    }

    /// Number of pages that were read.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Consume the reader and yield its text blocks in reading order.
    pub fn blocks(self) -> PdfBlocks {
        PdfBlocks {
            lines: ClassifiedLines {
                pages: self.pages.into_iter(),
                current: None,
                body: self.body,
                thresholds: self.options.thresholds,
                skip_right_aligned: self.options.skip_right_aligned,
            }
            .peekable(),
            merge_headings: self.options.merge_heading_lines,
            normalize: self.options.normalize_unicode,
            order: 0,
        }
    }
}

/// A line with its classification.
#[derive(Debug, Clone)]
struct ClassifiedLine {
    text: String,
    hint: StyleHint,
    page: u32,
    y: f32,
    font_size: f32,
    bold: bool,
}

impl ClassifiedLine {
    /// Whether `next` continues this heading on the following line.
    fn continues_heading(&self, next: &ClassifiedLine) -> bool {
        let gap = self.y - next.y;
        self.hint.is_heading()
            && next.hint.is_heading()
            && self.page == next.page
            && self.bold == next.bold
            && (self.font_size - next.font_size).abs() < 0.5
            && gap > 0.0
            && gap <= self.font_size * 2.0
    }
}

struct ClassifiedLines {
    pages: std::vec::IntoIter<PageLines>,
    current: Option<(u32, PageMargins, std::vec::IntoIter<TextLine>)>,
    body: BodyStyle,
    thresholds: HeadingThresholds,
    skip_right_aligned: bool,
}

impl Iterator for ClassifiedLines {
    type Item = ClassifiedLine;

    fn next(&mut self) -> Option<ClassifiedLine> {
        loop {
            if let Some((page, margins, lines)) = &mut self.current {
                if let Some(line) = lines.next() {
                    if self.skip_right_aligned && line.x > margins.center {
                        log::debug!("Dropping right-aligned line on page {}", page);
                        continue;
                    }
                    let text = line.text();
                    let bold = line.is_bold();
                    let metrics = LineMetrics {
                        font_size: line.font_size,
                        bold,
                        font_name: line.font_name(),
                        char_count: text.trim().chars().count(),
                        x0: line.x,
                        x1: line.right(),
                        page: margins,
                        body: &self.body,
                    };
                    let hint = classify(&metrics, &self.thresholds);
                    return Some(ClassifiedLine {
                        text,
                        hint,
                        page: *page,
                        y: line.y,
                        font_size: line.font_size,
                        bold,
                    });
                }
            }

            let next_page = self.pages.next()?;
            self.current = Some((
                next_page.number,
                next_page.margins,
                next_page.lines.into_iter(),
            ));
        }
    }
}

/// Iterator over the text blocks of a PDF.
///
/// Each line is one block, except that adjacent heading lines of the same
/// style are merged into one heading when enabled.
pub struct PdfBlocks {
    lines: Peekable<ClassifiedLines>,
    merge_headings: bool,
    normalize: bool,
    order: u64,
}

impl Iterator for PdfBlocks {
    type Item = TextBlock;

    fn next(&mut self) -> Option<TextBlock> {
        loop {
            let first = self.lines.next()?;
            let mut text = first.text.clone();

            if self.merge_headings && first.hint.is_heading() {
                let mut last = first.clone();
                while let Some(next) = self.lines.next_if(|next| last.continues_heading(next)) {
                    text.push(' ');
                    text.push_str(&next.text);
                    last = next;
                }
            }

            let text = clean_text(&text, self.normalize);
            if text.is_empty() {
                continue;
            }

            let block = TextBlock::new(text, first.hint, self.order);
            self.order += 1;
            return Some(block);
        }
    }
}
