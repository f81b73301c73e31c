//! Layout analysis for PDF pages.
//!
//! Walks page content streams to recover text spans with position and font
//! information, groups them into lines, and gathers the document-wide font
//! statistics and per-page margins that heading classification relies on.

use std::collections::HashMap;

use crate::error::Result;

use super::backend::{ContentOp, Operand, PageFont, PageSource};
use super::classify::{BodyStyle, PageMargins};

/// Average glyph width as a fraction of the font size.
///
/// lopdf exposes no glyph metrics, so span widths are estimated from this.
const AVG_CHAR_WIDTH_RATIO: f32 = 0.5;

/// TJ adjustment (thousandths of text space) that reads as a word space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// A text span with position and style information.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Estimated width of the text
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Whether the font appears to be bold
    pub is_bold: bool,
}

impl TextSpan {
    /// Create a new text span.
    pub fn new(text: String, x: f32, y: f32, font_size: f32, font_name: String) -> Self {
        let lower = font_name.to_lowercase();
        let is_bold = lower.contains("bold") || lower.contains("black") || lower.contains("heavy");
        let width = text.chars().count() as f32 * font_size * AVG_CHAR_WIDTH_RATIO;

        Self {
            text,
            x,
            y,
            width,
            font_size,
            font_name,
            is_bold,
        }
    }

    /// Right edge of the span.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// A text line composed of multiple spans on the same baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// The spans in this line, sorted by X position
    pub spans: Vec<TextSpan>,
    /// Y position (baseline)
    pub y: f32,
    /// Leftmost X position
    pub x: f32,
    /// Dominant font size in this line
    pub font_size: f32,
}

impl TextLine {
    /// Create a new text line from spans.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        if spans.is_empty() {
            return Self {
                spans: vec![],
                y: 0.0,
                x: 0.0,
                font_size: 0.0,
            };
        }

        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

        // Dominant size, weighted by text length
        let total_chars: usize = spans.iter().map(|s| s.text.len()).sum();
        let weighted_size: f32 = spans
            .iter()
            .map(|s| s.font_size * s.text.len() as f32)
            .sum();
        let font_size = if total_chars > 0 {
            weighted_size / total_chars as f32
        } else {
            spans[0].font_size
        };

        let y = spans[0].y;
        let x = spans[0].x;

        Self {
            spans,
            y,
            x,
            font_size,
        }
    }

    /// Get the combined text of all spans with appropriate spacing.
    ///
    /// Inserts spaces between spans based on their X coordinate gaps.
    /// No space is inserted between adjacent CJK characters.
    pub fn text(&self) -> String {
        let mut result = String::new();

        for (i, span) in self.spans.iter().enumerate() {
            if i == 0 {
                result.push_str(&span.text);
                continue;
            }

            let prev_span = &self.spans[i - 1];
            let gap = span.x - prev_span.right();
            let space_threshold = span.font_size * AVG_CHAR_WIDTH_RATIO * 0.2;

            let should_insert_space = gap > space_threshold && {
                let prev_cjk = prev_span
                    .text
                    .chars()
                    .last()
                    .map(is_spaceless_script_char)
                    .unwrap_or(false);
                let curr_cjk = span
                    .text
                    .chars()
                    .next()
                    .map(is_spaceless_script_char)
                    .unwrap_or(false);
                !(prev_cjk && curr_cjk)
            };

            let has_space = prev_span.text.ends_with([' ', '\u{00A0}'])
                || span.text.starts_with([' ', '\u{00A0}']);

            if should_insert_space && !has_space {
                result.push(' ');
            }

            result.push_str(&span.text);
        }

        result
    }

    /// Estimated right edge of the line.
    pub fn right(&self) -> f32 {
        self.spans
            .iter()
            .map(TextSpan::right)
            .fold(self.x, f32::max)
    }

    /// Check if the line is predominantly bold.
    pub fn is_bold(&self) -> bool {
        let bold_chars: usize = self
            .spans
            .iter()
            .filter(|s| s.is_bold)
            .map(|s| s.text.len())
            .sum();
        let total_chars: usize = self.spans.iter().map(|s| s.text.len()).sum();
        total_chars > 0 && bold_chars as f32 / total_chars as f32 > 0.5
    }

    /// Font of the first non-blank span.
    pub fn font_name(&self) -> &str {
        self.spans
            .iter()
            .find(|s| !s.text.trim().is_empty())
            .map(|s| s.font_name.as_str())
            .unwrap_or("")
    }
}

/// Font statistics for body-style detection.
///
/// Every span is counted under its (rounded size, bold, font) key, weighted by
/// its character count; the heaviest key is the body style.
#[derive(Debug, Clone, Default)]
pub struct FontStatistics {
    histogram: HashMap<(i32, bool, String), usize>,
}

impl FontStatistics {
    /// Record a span.
    pub fn add_span(&mut self, span: &TextSpan) {
        let chars = span.text.trim().chars().count();
        if chars == 0 {
            return;
        }
        let key = (
            span.font_size.round() as i32,
            span.is_bold,
            span.font_name.clone(),
        );
        *self.histogram.entry(key).or_insert(0) += chars;
    }

    /// Record every span of a line.
    pub fn add_line(&mut self, line: &TextLine) {
        for span in &line.spans {
            self.add_span(span);
        }
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.histogram.is_empty()
    }

    /// The most common style, weighted by characters.
    ///
    /// Ties are broken by the key so the result is deterministic.
    pub fn body_style(&self) -> BodyStyle {
        self.histogram
            .iter()
            .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then_with(|| kb.cmp(ka)))
            .map(|((size, bold, font), _)| BodyStyle {
                size: *size as f32,
                bold: *bold,
                font: font.clone(),
            })
            .unwrap_or_default()
    }
}

/// Compute the horizontal text extent of a page.
pub fn page_margins(lines: &[TextLine]) -> PageMargins {
    let left = lines
        .iter()
        .map(|l| l.x)
        .fold(f32::INFINITY, f32::min);
    let right = lines.iter().map(TextLine::right).fold(0.0, f32::max);

    if left.is_finite() {
        PageMargins::new(left, right.max(left))
    } else {
        PageMargins::new(0.0, 0.0)
    }
}

/// Layout analyzer for extracting positioned text from PDF pages.
pub struct LayoutAnalyzer<'a, S: PageSource> {
    source: &'a S,
}

impl<'a, S: PageSource> LayoutAnalyzer<'a, S> {
    /// Create a new layout analyzer.
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Extract text lines of a page in top-to-bottom reading order.
    pub fn extract_page_lines(&self, page_num: u32) -> Result<Vec<TextLine>> {
        let spans = self.extract_page_spans(page_num)?;
        Ok(group_spans_into_lines(spans))
    }

    /// Extract text spans from a page with position and font information.
    pub fn extract_page_spans(&self, page_num: u32) -> Result<Vec<TextSpan>> {
        let content = self.source.page_content(page_num)?;
        let fonts: HashMap<Vec<u8>, PageFont> = content
            .fonts
            .into_iter()
            .map(|f| (f.key.clone(), f))
            .collect();

        Ok(interpret_text_ops(&content.ops, &fonts, |font, bytes| {
            self.source.decode(page_num, font, bytes)
        }))
    }
}

/// Run the text-state operators of a content stream and collect spans.
fn interpret_text_ops<F>(
    ops: &[ContentOp],
    fonts: &HashMap<Vec<u8>, PageFont>,
    decode: F,
) -> Vec<TextSpan>
where
    F: Fn(&[u8], &[u8]) -> String,
{
    let mut spans = Vec::new();
    let mut current_font = String::new();
    let mut current_font_key: Vec<u8> = Vec::new();
    let mut current_font_bold = false;
    let mut current_font_size: f32 = 12.0;
    let mut matrix = TextMatrix::default();
    let mut in_text_block = false;

    let mut emit = |text: String, matrix: &TextMatrix, font: &str, bold: bool, size: f32| {
        if !text.trim().is_empty() {
            let (x, y) = matrix.get_position();
            let mut span = TextSpan::new(text, x, y, size * matrix.get_scale(), font.to_string());
            span.is_bold |= bold;
            spans.push(span);
        }
    };

    for op in ops {
        match op.operator.as_str() {
            "BT" => {
                in_text_block = true;
                matrix.reset();
            }
            "ET" => {
                in_text_block = false;
            }
            "Tf" => {
                if op.operands.len() >= 2 {
                    if let Operand::Name(font_key) = &op.operands[0] {
                        current_font_key = font_key.clone();
                        match fonts.get(font_key) {
                            Some(font) => {
                                current_font = font.base_font.clone();
                                current_font_bold = font.bold;
                            }
                            None => {
                                current_font = String::from_utf8_lossy(font_key).to_string();
                                current_font_bold = false;
                            }
                        }
                    }
                    current_font_size = op.operands[1].as_number().unwrap_or(12.0);
                }
            }
            "TL" => {
                if let Some(leading) = op.operands.first().and_then(Operand::as_number) {
                    matrix.leading = leading;
                }
            }
            "Td" | "TD" => {
                if op.operands.len() >= 2 {
                    let tx = op.operands[0].as_number().unwrap_or(0.0);
                    let ty = op.operands[1].as_number().unwrap_or(0.0);
                    if op.operator == "TD" {
                        matrix.leading = -ty;
                    }
                    matrix.translate(tx, ty);
                }
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    let n = |i: usize, default: f32| op.operands[i].as_number().unwrap_or(default);
                    matrix.set(n(0, 1.0), n(1, 0.0), n(2, 0.0), n(3, 1.0), n(4, 0.0), n(5, 0.0));
                }
            }
            "T*" => {
                matrix.next_line();
            }
            "Tj" | "TJ" if in_text_block => {
                let text = match op.operands.first() {
                    Some(Operand::Text(bytes)) => decode(current_font_key.as_slice(), bytes.as_slice()),
                    Some(Operand::Array(items)) => {
                        decode_tj_array(items, |bytes| decode(current_font_key.as_slice(), bytes))
                    }
                    _ => String::new(),
                };
                emit(text, &matrix, &current_font, current_font_bold, current_font_size);
            }
            "'" | "\"" => {
                matrix.next_line();
                if in_text_block {
                    let text_idx = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(Operand::Text(bytes)) = op.operands.get(text_idx) {
                        let text = decode(current_font_key.as_slice(), bytes.as_slice());
                        emit(text, &matrix, &current_font, current_font_bold, current_font_size);
                    }
                }
            }
            _ => {}
        }
    }

    spans
}

/// Decode a TJ array, turning large negative adjustments into word spaces.
fn decode_tj_array<F>(items: &[Operand], decode: F) -> String
where
    F: Fn(&[u8]) -> String,
{
    let mut combined = String::new();
    for item in items {
        match item {
            Operand::Text(bytes) => combined.push_str(&decode(bytes)),
            Operand::Number(n) => {
                let adjustment = -n;
                let ends_spaceless = combined
                    .chars()
                    .last()
                    .map(|c| c == ' ' || c == '\u{00A0}' || is_spaceless_script_char(c))
                    .unwrap_or(true);
                if adjustment > TJ_SPACE_THRESHOLD && !ends_spaceless {
                    combined.push(' ');
                }
            }
            _ => {}
        }
    }
    combined
}

/// Y-based line grouping, top to bottom.
fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    // PDF y grows upwards: sort descending, then left to right
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current_line_spans: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let y_tolerance = span.font_size * 0.3;

        match current_y {
            Some(y) if (span.y - y).abs() <= y_tolerance => current_line_spans.push(span),
            _ => {
                if !current_line_spans.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(
                        &mut current_line_spans,
                    )));
                }
                current_y = Some(span.y);
                current_line_spans.push(span);
            }
        }
    }

    if !current_line_spans.is_empty() {
        lines.push(TextLine::from_spans(current_line_spans));
    }

    log::debug!("Grouped spans into {} lines", lines.len());
    lines
}

/// Text matrix for tracking position in content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
    leading: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            leading: 12.0,
        }
    }
}

impl TextMatrix {
    fn reset(&mut self) {
        let leading = self.leading;
        *self = Self {
            leading,
            ..Self::default()
        };
    }

    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self) {
        self.translate(0.0, -self.leading);
    }

    fn get_position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn get_scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

/// Check if a character belongs to a script that doesn't use word spaces.
///
/// Chinese and Japanese don't use spaces between words, but Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}
