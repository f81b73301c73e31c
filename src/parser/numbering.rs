//! DOCX list numbering.
//!
//! `word/numbering.xml` maps each list instance (`w:num`) to an abstract
//! definition (`w:abstractNum`) whose levels carry a number format. Labels
//! are computed by counting paragraphs per (list, level).

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::Result;

/// Number format of a list level (`w:numFmt`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    Decimal,
    LowerLetter,
    UpperLetter,
    LowerRoman,
    UpperRoman,
    Bullet,
    /// Any format without a label (`none`, `ordinal`, ...)
    Unlabeled,
}

impl NumberFormat {
    /// Parse a `w:numFmt` value.
    pub fn from_attr(value: &str) -> Self {
        match value {
            "decimal" => Self::Decimal,
            "lowerLetter" => Self::LowerLetter,
            "upperLetter" => Self::UpperLetter,
            "lowerRoman" => Self::LowerRoman,
            "upperRoman" => Self::UpperRoman,
            "bullet" => Self::Bullet,
            _ => Self::Unlabeled,
        }
    }

    /// Format the `n`-th item (1-based) of a list.
    pub fn format(self, n: u32) -> Option<String> {
        match self {
            Self::Decimal => Some(n.to_string()),
            Self::LowerLetter => Some(to_letters(n)),
            Self::UpperLetter => Some(to_letters(n).to_uppercase()),
            Self::LowerRoman => Some(to_roman(n).to_lowercase()),
            Self::UpperRoman => Some(to_roman(n)),
            Self::Bullet => Some("•".to_string()),
            Self::Unlabeled => None,
        }
    }

    /// Prefix `text` with the label of the `n`-th item.
    pub fn label(self, n: u32, text: &str) -> String {
        match (self, self.format(n)) {
            (Self::Bullet, Some(bullet)) => format!("{} {}", bullet, text),
            (_, Some(number)) => format!("{}. {}", number, text),
            (_, None) => text.to_string(),
        }
    }
}

/// a, b, ..., z, aa, bb, ...
fn to_letters(n: u32) -> String {
    if n == 0 {
        return String::new();
    }
    let letter = (b'a' + ((n - 1) % 26) as u8) as char;
    let repeat = ((n - 1) / 26 + 1) as usize;
    std::iter::repeat(letter).take(repeat).collect()
}

fn to_roman(mut n: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];

    let mut roman = String::new();
    for (value, symbol) in TABLE {
        while n >= value {
            roman.push_str(symbol);
            n -= value;
        }
    }
    roman
}

/// List definitions of a document plus running counters.
#[derive(Debug, Clone, Default)]
pub struct Numbering {
    /// abstractNumId → level → format
    abstract_formats: HashMap<String, HashMap<u8, NumberFormat>>,
    /// numId → abstractNumId
    instances: HashMap<String, String>,
    /// numId → counter per level
    counters: HashMap<String, Vec<u32>>,
}

impl Numbering {
    /// Parse `word/numbering.xml`.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut numbering = Self::default();
        let mut current_abstract: Option<String> = None;
        let mut current_level: Option<u8> = None;
        let mut current_num: Option<String> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                    b"abstractNum" => current_abstract = attr(&e, b"abstractNumId"),
                    b"lvl" => current_level = attr(&e, b"ilvl").and_then(|v| v.parse().ok()),
                    b"numFmt" => {
                        if let (Some(abs), Some(level), Some(fmt)) =
                            (&current_abstract, current_level, attr(&e, b"val"))
                        {
                            numbering
                                .abstract_formats
                                .entry(abs.clone())
                                .or_default()
                                .insert(level, NumberFormat::from_attr(&fmt));
                        }
                    }
                    b"num" => current_num = attr(&e, b"numId"),
                    b"abstractNumId" => {
                        if let (Some(num), Some(abs)) = (&current_num, attr(&e, b"val")) {
                            numbering.instances.insert(num.clone(), abs);
                        }
                    }
                    _ => {}
                },
                Event::End(e) => match e.local_name().as_ref() {
                    b"abstractNum" => current_abstract = None,
                    b"lvl" => current_level = None,
                    b"num" => current_num = None,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        log::debug!(
            "Parsed numbering: {} abstract lists, {} instances",
            numbering.abstract_formats.len(),
            numbering.instances.len()
        );
        Ok(numbering)
    }

    /// Number format of a list level, if the list is defined.
    pub fn format_of(&self, num_id: &str, level: u8) -> Option<NumberFormat> {
        let abs = self.instances.get(num_id)?;
        self.abstract_formats.get(abs)?.get(&level).copied()
    }

    /// Advance the counter of (num_id, level) and label `text` with it.
    ///
    /// Deeper levels of the same list restart. Paragraphs of undefined lists
    /// (including numId 0, which switches numbering off) are returned as is.
    pub fn label(&mut self, num_id: &str, level: u8, text: &str) -> String {
        let Some(format) = self.format_of(num_id, level) else {
            return text.to_string();
        };

        let counters = self.counters.entry(num_id.to_string()).or_default();
        let depth = level as usize + 1;
        if counters.len() < depth {
            counters.resize(depth, 0);
        }
        counters[level as usize] += 1;
        counters.truncate(depth);

        format.label(counters[level as usize], text)
    }
}

/// Unescaped value of the attribute with the given local name.
pub(crate) fn attr(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NUMBERING: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:abstractNum w:abstractNumId="0">
    <w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/></w:lvl>
    <w:lvl w:ilvl="1"><w:start w:val="1"/><w:numFmt w:val="lowerLetter"/></w:lvl>
  </w:abstractNum>
  <w:abstractNum w:abstractNumId="1">
    <w:lvl w:ilvl="0"><w:numFmt w:val="bullet"/><w:lvlText w:val="&#8226;"/></w:lvl>
  </w:abstractNum>
  <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
  <w:num w:numId="2"><w:abstractNumId w:val="1"/></w:num>
</w:numbering>"#;

    #[test]
    fn test_number_formats() {
        assert_eq!(NumberFormat::Decimal.format(12).as_deref(), Some("12"));
        assert_eq!(NumberFormat::LowerLetter.format(3).as_deref(), Some("c"));
        assert_eq!(NumberFormat::UpperLetter.format(28).as_deref(), Some("BB"));
        assert_eq!(NumberFormat::LowerRoman.format(4).as_deref(), Some("iv"));
        assert_eq!(NumberFormat::UpperRoman.format(1994).as_deref(), Some("MCMXCIV"));
        assert_eq!(NumberFormat::Bullet.format(7).as_deref(), Some("•"));
        assert_eq!(NumberFormat::from_attr("ordinal"), NumberFormat::Unlabeled);
        assert_eq!(NumberFormat::Unlabeled.format(1), None);
    }

    #[test]
    fn test_parse_numbering() {
        let numbering = Numbering::parse(NUMBERING).unwrap();
        assert_eq!(numbering.format_of("1", 0), Some(NumberFormat::Decimal));
        assert_eq!(numbering.format_of("1", 1), Some(NumberFormat::LowerLetter));
        assert_eq!(numbering.format_of("2", 0), Some(NumberFormat::Bullet));
        assert_eq!(numbering.format_of("9", 0), None);
    }

    #[test]
    fn test_labels_and_restart() {
        let mut numbering = Numbering::parse(NUMBERING).unwrap();
        assert_eq!(numbering.label("1", 0, "First"), "1. First");
        assert_eq!(numbering.label("1", 1, "Sub"), "a. Sub");
        assert_eq!(numbering.label("1", 1, "Sub"), "b. Sub");
        assert_eq!(numbering.label("1", 0, "Second"), "2. Second");
        assert_eq!(numbering.label("1", 1, "Again"), "a. Again");
        assert_eq!(numbering.label("2", 0, "Point"), "• Point");
        assert_eq!(numbering.label("0", 0, "Plain"), "Plain");
    }
}
