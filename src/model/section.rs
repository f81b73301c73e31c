//! Section type: the unit of output.

use serde::{Deserialize, Serialize};

/// A titled section of a document.
///
/// Serializes to an object with exactly two fields, `title` then `content`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Heading text, empty for body text that precedes the first heading
    pub title: String,

    /// Whitespace-joined body text following the heading
    pub content: String,
}

impl Section {
    /// Create a section from a title and content.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Create an open section holding only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self::new(title, String::new())
    }

    /// Append body text, separating it from existing content with one space.
    pub fn append_content(&mut self, text: &str) {
        push_joined(&mut self.content, text);
    }

    /// Check if the section has no content.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Append `text` to `buf` with a single space at the join.
///
/// Leading/trailing whitespace of `text` is dropped so joins never double up.
pub(crate) fn push_joined(buf: &mut String, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if !buf.is_empty() {
        buf.push(' ');
    }
    buf.push_str(text);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_content() {
        let mut section = Section::titled("Details");
        assert!(section.is_empty());

        section.append_content("More info.");
        section.append_content("  Even more.\n");
        assert_eq!(section.content, "More info. Even more.");
    }

    #[test]
    fn test_append_blank_is_noop() {
        let mut section = Section::titled("A");
        section.append_content("   ");
        assert_eq!(section.content, "");
    }

    #[test]
    fn test_field_order_in_json() {
        let json = serde_json::to_string(&Section::new("T", "C")).unwrap();
        assert_eq!(json, r#"{"title":"T","content":"C"}"#);
    }
}
