//! DOCX document reader.
//!
//! A DOCX file is a ZIP package; the body lives in `word/document.xml`,
//! paragraph styles in `word/styles.xml` and list definitions in
//! `word/numbering.xml`. Only the body is read: headers, footers, footnotes
//! and images are ignored.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::detect::{verify_signature, DocumentFormat};
use crate::error::{Error, Result};
use crate::model::{StyleHint, TextBlock};

use super::clean_text;
use super::numbering::{attr, Numbering};
use super::options::ParseOptions;

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";
const NUMBERING_PART: &str = "word/numbering.xml";

/// `w:outlineLvl` value meaning "body text".
const BODY_OUTLINE_LEVEL: u8 = 9;

/// DOCX document reader.
///
/// The document part is walked once when the reader is opened; [`blocks`]
/// then hands out the collected blocks in order.
///
/// [`blocks`]: DocxReader::blocks
#[derive(Debug)]
pub struct DocxReader {
    blocks: Vec<TextBlock>,
}

impl DocxReader {
    /// Open a DOCX file.
    pub fn open<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        verify_signature(path, DocumentFormat::Docx)?;
        let file = File::open(path)?;
        Self::from_archive(ZipArchive::new(BufReader::new(file))?, &options)
    }

    /// Read a DOCX package from bytes.
    pub fn from_bytes(data: &[u8], options: ParseOptions) -> Result<Self> {
        Self::from_archive(ZipArchive::new(Cursor::new(data))?, &options)
    }

    fn from_archive<R: Read + Seek>(
        mut archive: ZipArchive<R>,
        options: &ParseOptions,
    ) -> Result<Self> {
        let pattern = Regex::new(&options.heading_style_pattern).map_err(|e| {
            Error::DocxParse(format!(
                "invalid heading style pattern '{}': {}",
                options.heading_style_pattern, e
            ))
        })?;

        let document = read_part(&mut archive, DOCUMENT_PART)?
            .ok_or_else(|| Error::DocxParse(format!("missing {}", DOCUMENT_PART)))?;

        let styles = match read_part(&mut archive, STYLES_PART)? {
            Some(xml) => StyleSheet::parse(&xml)?,
            None => StyleSheet::default(),
        };

        let numbering = match read_part(&mut archive, NUMBERING_PART)? {
            Some(xml) if options.list_labels => Some(Numbering::parse(&xml)?),
            _ => None,
        };

        let walker = BodyWalker {
            styles: &styles,
            pattern: &pattern,
            numbering,
            options,
            blocks: Vec::new(),
        };
        let blocks = walker.walk(&document)?;
        log::debug!("DOCX body: {} blocks", blocks.len());

        Ok(Self { blocks })
    }

    /// Number of blocks found.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the document has no text.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Consume the reader and yield its text blocks in document order.
    pub fn blocks(self) -> std::vec::IntoIter<TextBlock> {
        self.blocks.into_iter()
    }
}

/// Read a package part, `None` if the part does not exist.
fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(Some(content))
}

/// A paragraph style from `word/styles.xml`.
#[derive(Debug, Clone, Default)]
struct StyleDef {
    name: Option<String>,
    outline_level: Option<u8>,
    based_on: Option<String>,
}

/// Paragraph styles by style id.
#[derive(Debug, Clone, Default)]
struct StyleSheet {
    styles: HashMap<String, StyleDef>,
}

impl StyleSheet {
    fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut styles = HashMap::new();
        let mut current: Option<(String, StyleDef)> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                    b"style" => {
                        let is_paragraph = attr(&e, b"type").map_or(true, |t| t == "paragraph");
                        current = attr(&e, b"styleId")
                            .filter(|_| is_paragraph)
                            .map(|id| (id, StyleDef::default()));
                    }
                    b"name" => {
                        if let Some((_, def)) = current.as_mut() {
                            def.name = attr(&e, b"val");
                        }
                    }
                    b"basedOn" => {
                        if let Some((_, def)) = current.as_mut() {
                            def.based_on = attr(&e, b"val");
                        }
                    }
                    b"outlineLvl" => {
                        if let Some((_, def)) = current.as_mut() {
                            def.outline_level = attr(&e, b"val").and_then(|v| v.parse().ok());
                        }
                    }
                    _ => {}
                },
                Event::End(e) if e.local_name().as_ref() == b"style" => {
                    if let Some((id, def)) = current.take() {
                        styles.insert(id, def);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(Self { styles })
    }

    /// Whether paragraphs of style `id` are headings.
    ///
    /// The style's display name (or its id, when unnamed) is matched against
    /// `pattern`; an outline level on the style or one of its bases also
    /// makes it a heading.
    fn is_heading(&self, id: &str, pattern: &Regex) -> bool {
        let Some(style) = self.styles.get(id) else {
            return pattern.is_match(id);
        };

        if pattern.is_match(style.name.as_deref().unwrap_or(id)) {
            return true;
        }

        let mut next = Some(style);
        for _ in 0..16 {
            let Some(def) = next else { break };
            if def.outline_level.is_some_and(|l| l < BODY_OUTLINE_LEVEL) {
                return true;
            }
            next = def.based_on.as_deref().and_then(|b| self.styles.get(b));
        }
        false
    }
}

/// State of the paragraph being read.
#[derive(Debug, Default)]
struct ParagraphState {
    text: String,
    style: Option<String>,
    num_id: Option<String>,
    level: u8,
    outline: bool,
}

/// Top-level table being flattened.
#[derive(Debug, Default)]
struct TableState {
    rows: Vec<String>,
    cells: Vec<String>,
    cell: String,
}

impl TableState {
    fn end_cell(&mut self) {
        self.cells.push(clean_text(&std::mem::take(&mut self.cell), false));
    }

    fn end_row(&mut self) {
        let cells = std::mem::take(&mut self.cells);
        if cells.iter().any(|c| !c.is_empty()) {
            self.rows.push(cells.join(", "));
        }
    }

    fn into_text(self) -> String {
        self.rows.join(" ")
    }
}

/// Walks `word/document.xml` collecting paragraph and table blocks.
struct BodyWalker<'a> {
    styles: &'a StyleSheet,
    pattern: &'a Regex,
    numbering: Option<Numbering>,
    options: &'a ParseOptions,
    blocks: Vec<TextBlock>,
}

impl BodyWalker<'_> {
    fn walk(mut self, xml: &str) -> Result<Vec<TextBlock>> {
        let mut reader = Reader::from_str(xml);

        let mut paragraph_depth = 0usize;
        let mut paragraph = ParagraphState::default();
        let mut table_depth = 0usize;
        let mut table = TableState::default();
        let mut in_run = false;
        let mut in_text = false;
        // Text inside mc:Fallback duplicates the preceding mc:Choice
        let mut fallback_depth = 0usize;

        loop {
            let event = reader.read_event()?;
            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let is_start = matches!(event, Event::Start(_));
                    match e.local_name().as_ref() {
                        b"Fallback" if is_start => fallback_depth += 1,
                        b"tbl" if is_start => {
                            table_depth += 1;
                            if table_depth == 1 {
                                table = TableState::default();
                            }
                        }
                        b"p" if is_start => {
                            if paragraph_depth == 0 {
                                paragraph = ParagraphState::default();
                            }
                            paragraph_depth += 1;
                        }
                        b"r" if is_start => in_run = true,
                        b"t" if is_start && in_run => in_text = true,
                        b"tab" | b"br" | b"cr" if in_run && fallback_depth == 0 => {
                            paragraph.text.push(' ')
                        }
                        b"pStyle" if paragraph_depth == 1 => paragraph.style = attr(e, b"val"),
                        b"numId" if paragraph_depth == 1 => paragraph.num_id = attr(e, b"val"),
                        b"ilvl" if paragraph_depth == 1 => {
                            paragraph.level = attr(e, b"val")
                                .and_then(|v| v.parse().ok())
                                .unwrap_or(0)
                        }
                        b"outlineLvl" if paragraph_depth == 1 => {
                            paragraph.outline = attr(e, b"val")
                                .and_then(|v| v.parse::<u8>().ok())
                                .is_some_and(|l| l < BODY_OUTLINE_LEVEL)
                        }
                        _ => {}
                    }
                }
                Event::Text(e) if in_text && fallback_depth == 0 => {
                    paragraph.text.push_str(&e.unescape()?);
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"Fallback" => fallback_depth = fallback_depth.saturating_sub(1),
                    b"t" => in_text = false,
                    b"r" => in_run = false,
                    b"p" => {
                        paragraph_depth = paragraph_depth.saturating_sub(1);
                        if paragraph_depth == 0 {
                            let finished = std::mem::take(&mut paragraph);
                            if table_depth > 0 {
                                table.cell.push(' ');
                                table.cell.push_str(&finished.text);
                            } else {
                                self.end_paragraph(finished);
                            }
                        }
                    }
                    b"tc" if table_depth == 1 => table.end_cell(),
                    b"tr" if table_depth == 1 => table.end_row(),
                    b"tbl" => {
                        table_depth = table_depth.saturating_sub(1);
                        if table_depth == 0 {
                            self.end_table(std::mem::take(&mut table));
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(self.blocks)
    }

    fn end_paragraph(&mut self, paragraph: ParagraphState) {
        let text = clean_text(&paragraph.text, self.options.normalize_unicode);
        if text.is_empty() {
            return;
        }

        let heading = paragraph.outline
            || paragraph
                .style
                .as_deref()
                .is_some_and(|s| self.styles.is_heading(s, self.pattern));

        let text = match (&mut self.numbering, paragraph.num_id.as_deref()) {
            (Some(numbering), Some(num_id)) => numbering.label(num_id, paragraph.level, &text),
            _ => text,
        };

        let hint = if heading {
            StyleHint::Heading
        } else {
            StyleHint::Body
        };
        self.push(text, hint);
    }

    fn end_table(&mut self, table: TableState) {
        if !self.options.include_tables {
            return;
        }
        let text = clean_text(&table.into_text(), self.options.normalize_unicode);
        if !text.is_empty() {
            self.push(text, StyleHint::Body);
        }
    }

    fn push(&mut self, text: String, hint: StyleHint) {
        let order = self.blocks.len() as u64;
        self.blocks.push(TextBlock::new(text, hint, order));
    }
}
