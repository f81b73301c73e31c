//! Heading classification for PDF text lines.
//!
//! Pure functions only: everything the decision needs is passed in through
//! [`LineMetrics`], so the heuristics can be tested without a PDF.

use crate::model::StyleHint;

use super::options::HeadingThresholds;

/// The dominant text style of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyStyle {
    /// Font size in points
    pub size: f32,
    /// Whether body text is bold
    pub bold: bool,
    /// Base font name
    pub font: String,
}

impl BodyStyle {
    /// Check if a line style is the body style (sizes compared rounded to 1pt).
    pub fn matches(&self, size: f32, bold: bool, font: &str) -> bool {
        size.round() == self.size.round() && bold == self.bold && font == self.font
    }
}

impl Default for BodyStyle {
    fn default() -> Self {
        Self {
            size: 12.0,
            bold: false,
            font: String::new(),
        }
    }
}

/// Horizontal extent of the text on one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMargins {
    /// Leftmost text start
    pub left: f32,
    /// Rightmost text end
    pub right: f32,
    /// Midpoint between left and right
    pub center: f32,
}

impl PageMargins {
    /// Create margins from the left and right text edges.
    pub fn new(left: f32, right: f32) -> Self {
        Self {
            left,
            right,
            center: (left + right) / 2.0,
        }
    }

    /// Width of the text area.
    pub fn width(&self) -> f32 {
        (self.right - self.left).max(0.0)
    }
}

/// Everything [`classify`] looks at for one line.
#[derive(Debug, Clone, Copy)]
pub struct LineMetrics<'a> {
    /// Dominant font size of the line
    pub font_size: f32,
    /// Whether the line is predominantly bold
    pub bold: bool,
    /// Font of the line's first span
    pub font_name: &'a str,
    /// Number of characters in the line
    pub char_count: usize,
    /// Start x of the line
    pub x0: f32,
    /// Estimated end x of the line
    pub x1: f32,
    /// Margins of the page the line sits on
    pub page: &'a PageMargins,
    /// Document body style
    pub body: &'a BodyStyle,
}

impl LineMetrics<'_> {
    fn touches_left(&self, t: &HeadingThresholds) -> bool {
        self.x0 <= self.page.left + t.margin_tolerance * self.page.width()
    }

    fn touches_right(&self, t: &HeadingThresholds) -> bool {
        self.x1 >= self.page.right - t.margin_tolerance * self.page.width()
    }

    fn is_centered(&self, t: &HeadingThresholds) -> bool {
        let line_center = (self.x0 + self.x1) / 2.0;
        (line_center - self.page.center).abs() <= t.center_tolerance * self.page.width()
    }
}

/// Classify a PDF line as heading or body text.
///
/// Rules, first match wins:
/// 1. longer than `max_heading_chars` → body
/// 2. same style as the body text → body
/// 3. spans the full text width → body
/// 4. centered, away from the left margin, in a non-body font → heading
/// 5. left-aligned and more than `size_delta` points above body size → heading
/// 6. bold (body is not), at least `bold_min_ratio` × body size → heading
/// 7. body
pub fn classify(line: &LineMetrics<'_>, thresholds: &HeadingThresholds) -> StyleHint {
    let body = line.body;

    if line.char_count > thresholds.max_heading_chars {
        return StyleHint::Body;
    }

    if body.matches(line.font_size, line.bold, line.font_name) {
        return StyleHint::Body;
    }

    let touches_left = line.touches_left(thresholds);
    if touches_left && line.touches_right(thresholds) {
        return StyleHint::Body;
    }

    if !touches_left && line.is_centered(thresholds) && line.font_name != body.font {
        return StyleHint::Heading;
    }

    if touches_left && line.font_size > body.size + thresholds.size_delta {
        return StyleHint::Heading;
    }

    // Bold-but-smaller text stays body
    if thresholds.bold_headings
        && line.bold
        && !body.bold
        && line.font_size + 0.05 >= body.size * thresholds.bold_min_ratio
    {
        return StyleHint::Heading;
    }

    StyleHint::Body
}
