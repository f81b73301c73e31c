//! Parsing options and configuration.

/// Default pattern for DOCX heading style names ("Heading 1", "heading 2", ...).
pub const DEFAULT_HEADING_STYLE_PATTERN: &str = r"(?i)^heading\s*\d+$";

/// Options for reading documents.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Thresholds for PDF heading classification
    pub thresholds: HeadingThresholds,

    /// Regex matched against DOCX paragraph style names to detect headings
    pub heading_style_pattern: String,

    /// Emit DOCX tables as flattened body text
    pub include_tables: bool,

    /// Prefix DOCX list paragraphs with their numbering label
    pub list_labels: bool,

    /// Merge vertically adjacent PDF heading lines sharing one style
    pub merge_heading_lines: bool,

    /// Drop PDF lines that start right of the page center (running headers,
    /// page numbers)
    pub skip_right_aligned: bool,

    /// Normalize extracted text to Unicode NFC
    pub normalize_unicode: bool,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip unreadable pages).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set heading classification thresholds.
    pub fn with_thresholds(mut self, thresholds: HeadingThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the DOCX heading style pattern.
    pub fn with_heading_style_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.heading_style_pattern = pattern.into();
        self
    }

    /// Enable or disable DOCX table extraction.
    pub fn with_tables(mut self, include: bool) -> Self {
        self.include_tables = include;
        self
    }

    /// Enable or disable DOCX list labels.
    pub fn with_list_labels(mut self, labels: bool) -> Self {
        self.list_labels = labels;
        self
    }

    /// Enable or disable merging of multi-line PDF headings.
    pub fn with_merge_heading_lines(mut self, merge: bool) -> Self {
        self.merge_heading_lines = merge;
        self
    }

    /// Enable or disable dropping of PDF lines starting right of center.
    pub fn with_skip_right_aligned(mut self, skip: bool) -> Self {
        self.skip_right_aligned = skip;
        self
    }

    /// Enable or disable Unicode NFC normalization.
    pub fn with_unicode_normalization(mut self, normalize: bool) -> Self {
        self.normalize_unicode = normalize;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            thresholds: HeadingThresholds::default(),
            heading_style_pattern: DEFAULT_HEADING_STYLE_PATTERN.to_string(),
            include_tables: true,
            list_labels: true,
            merge_heading_lines: true,
            skip_right_aligned: true,
            normalize_unicode: true,
        }
    }
}

/// Error handling mode during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    #[default]
    Strict,
    /// Skip unreadable pages and continue
    Lenient,
}

/// Thresholds for classifying PDF lines as headings.
///
/// Tolerances are relative to the page margin positions.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingThresholds {
    /// How far (relative) a line may sit from a margin and still count as touching it
    pub margin_tolerance: f32,

    /// How far (relative) a line center may sit from the page center to count as centered
    pub center_tolerance: f32,

    /// Points above the body size a left-aligned line needs to be a heading
    pub size_delta: f32,

    /// Treat bold lines at least `bold_min_ratio` times the body size as headings
    pub bold_headings: bool,

    /// Minimum size ratio (line size / body size) for bold headings
    pub bold_min_ratio: f32,

    /// Lines longer than this (in characters) are always body text
    pub max_heading_chars: usize,
}

impl HeadingThresholds {
    /// Create thresholds with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the size delta for left-aligned headings.
    pub fn with_size_delta(mut self, delta: f32) -> Self {
        self.size_delta = delta;
        self
    }

    /// Enable or disable bold-based headings.
    pub fn with_bold_headings(mut self, enabled: bool) -> Self {
        self.bold_headings = enabled;
        self
    }

    /// Set the maximum heading length in characters.
    pub fn with_max_heading_chars(mut self, chars: usize) -> Self {
        self.max_heading_chars = chars;
        self
    }

    /// Set margin and center tolerances.
    pub fn with_tolerances(mut self, margin: f32, center: f32) -> Self {
        self.margin_tolerance = margin;
        self.center_tolerance = center;
        self
    }
}

impl Default for HeadingThresholds {
    fn default() -> Self {
        Self {
            margin_tolerance: 0.05,
            center_tolerance: 0.05,
            size_delta: 2.0,
            bold_headings: true,
            bold_min_ratio: 1.0,
            max_heading_chars: 120,
        }
    }
}
