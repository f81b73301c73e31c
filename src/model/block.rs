//! Text block types produced by the document readers.

use serde::{Deserialize, Serialize};

/// Heading/body classification of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleHint {
    /// Starts a new section; its text becomes the section title
    Heading,
    /// Regular content
    #[default]
    Body,
}

impl StyleHint {
    /// Check if this is a heading.
    pub fn is_heading(&self) -> bool {
        matches!(self, StyleHint::Heading)
    }
}

/// One unit of extracted document content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Extracted text
    pub text: String,

    /// Heading or body
    pub style_hint: StyleHint,

    /// Position in the document (strictly increasing)
    pub order: u64,
}

impl TextBlock {
    /// Create a new text block.
    pub fn new(text: impl Into<String>, style_hint: StyleHint, order: u64) -> Self {
        Self {
            text: text.into(),
            style_hint,
            order,
        }
    }

    /// Create a heading block.
    pub fn heading(text: impl Into<String>, order: u64) -> Self {
        Self::new(text, StyleHint::Heading, order)
    }

    /// Create a body block.
    pub fn body(text: impl Into<String>, order: u64) -> Self {
        Self::new(text, StyleHint::Body, order)
    }

    /// Check if this block is a heading.
    pub fn is_heading(&self) -> bool {
        self.style_hint.is_heading()
    }

    /// Check if the block carries no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
