//! Page access for PDF layout analysis.
//!
//! Layout analysis reads pages through [`PageSource`], which hands out the
//! font resources and content stream of one page at a time. [`LopdfSource`]
//! implements it over `lopdf`; tests substitute in-memory pages.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{Error, Result};

/// `ForceBold` bit of the font descriptor `Flags` entry.
const FORCE_BOLD_FLAG: i64 = 1 << 18;

/// Minimum descriptor `FontWeight` treated as bold.
const BOLD_WEIGHT: f32 = 600.0;

/// A font resource of a page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageFont {
    /// Resource key used by `Tf` (e.g. `F1`)
    pub key: Vec<u8>,
    /// `BaseFont` name (e.g. `Times-Bold`)
    pub base_font: String,
    /// Bold according to the font descriptor
    pub bold: bool,
}

impl PageFont {
    /// Create a font resource.
    pub fn new(key: impl Into<Vec<u8>>, base_font: impl Into<String>, bold: bool) -> Self {
        Self {
            key: key.into(),
            base_font: base_font.into(),
            bold,
        }
    }
}

/// Operand of a content stream operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Number(f32),
    Name(Vec<u8>),
    Text(Vec<u8>),
    Array(Vec<Operand>),
    Other,
}

impl Operand {
    /// Numeric value, for integer and real operands.
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Operand::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&Object> for Operand {
    fn from(obj: &Object) -> Self {
        match obj {
            Object::Integer(i) => Operand::Number(*i as f32),
            Object::Real(r) => Operand::Number(*r),
            Object::Name(n) => Operand::Name(n.clone()),
            Object::String(bytes, _) => Operand::Text(bytes.clone()),
            Object::Array(items) => Operand::Array(items.iter().map(Operand::from).collect()),
            _ => Operand::Other,
        }
    }
}

/// One content stream operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<Operand>,
}

impl ContentOp {
    /// Create an operation.
    pub fn new(operator: impl Into<String>, operands: Vec<Operand>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }
}

/// Font resources and operations of one page.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub fonts: Vec<PageFont>,
    pub ops: Vec<ContentOp>,
}

/// Source of PDF pages, numbered from 1.
pub trait PageSource {
    /// Page numbers in document order.
    fn page_numbers(&self) -> Vec<u32>;

    /// Fonts and content stream of a page.
    fn page_content(&self, page_num: u32) -> Result<PageContent>;

    /// Decode the bytes of a text-showing operator drawn in `font_key`.
    fn decode(&self, page_num: u32, font_key: &[u8], bytes: &[u8]) -> String;
}

/// Decode string bytes without font information.
///
/// UTF-16BE when a byte order mark is present, UTF-8 when valid, Latin-1
/// otherwise.
pub fn decode_fallback(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

/// [`PageSource`] over a `lopdf` document.
pub struct LopdfSource {
    doc: Document,
    pages: BTreeMap<u32, ObjectId>,
}

impl LopdfSource {
    /// Load a PDF file.
    ///
    /// Encrypted documents are opened with the empty user password; those
    /// that need a real password are rejected.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(Document::load(path)?)
    }

    /// Load a PDF held in memory.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        Self::new(Document::load_mem(data)?)
    }

    fn new(mut doc: Document) -> Result<Self> {
        if doc.is_encrypted() {
            doc.decrypt("").map_err(|e| {
                log::debug!("Empty password does not open the document: {}", e);
                Error::Encrypted
            })?;
            log::debug!("Decrypted PDF with the empty user password");
        }
        let pages = doc.get_pages();
        log::debug!("Loaded PDF {} with {} pages", doc.version, pages.len());
        Ok(Self { doc, pages })
    }

    fn page_id(&self, page_num: u32) -> Result<ObjectId> {
        self.pages.get(&page_num).copied().ok_or_else(|| {
            Error::PdfParse(format!(
                "page {} out of range (document has {} pages)",
                page_num,
                self.pages.len()
            ))
        })
    }

    /// Whether the descriptor of `font` marks it bold.
    fn descriptor_bold(&self, font: &Dictionary) -> bool {
        let Some(descriptor) = font
            .get(b"FontDescriptor")
            .ok()
            .and_then(|obj| self.resolve(obj))
            .and_then(|obj| obj.as_dict().ok())
        else {
            return false;
        };

        let force_bold = descriptor
            .get(b"Flags")
            .ok()
            .and_then(|f| f.as_i64().ok())
            .is_some_and(|flags| flags & FORCE_BOLD_FLAG != 0);
        let heavy = descriptor
            .get(b"FontWeight")
            .ok()
            .and_then(|w| w.as_float().ok())
            .is_some_and(|weight| weight >= BOLD_WEIGHT);

        force_bold || heavy
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }
}

impl PageSource for LopdfSource {
    fn page_numbers(&self) -> Vec<u32> {
        self.pages.keys().copied().collect()
    }

    fn page_content(&self, page_num: u32) -> Result<PageContent> {
        let page_id = self.page_id(page_num)?;

        let fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?
            .into_iter()
            .map(|(key, font)| {
                let base_font = font
                    .get(b"BaseFont")
                    .and_then(Object::as_name)
                    .map(|n| String::from_utf8_lossy(n).to_string())
                    .unwrap_or_default();
                let bold = self.descriptor_bold(font);
                PageFont::new(key, base_font, bold)
            })
            .collect();

        let data = self
            .doc
            .get_page_content(page_id)
            .map_err(|e| Error::PdfParse(format!("page {}: {}", page_num, e)))?;
        let ops = lopdf::content::Content::decode(&data)
            .map_err(|e| Error::PdfParse(format!("page {}: {}", page_num, e)))?
            .operations
            .into_iter()
            .map(|op| ContentOp::new(op.operator, op.operands.iter().map(Operand::from).collect()))
            .collect();

        Ok(PageContent { fonts, ops })
    }

    fn decode(&self, page_num: u32, font_key: &[u8], bytes: &[u8]) -> String {
        let encoding = self
            .page_id(page_num)
            .ok()
            .and_then(|id| self.doc.get_page_fonts(id).ok())
            .and_then(|fonts| fonts.get(font_key).copied())
            .and_then(|font| font.get_font_encoding(&self.doc).ok());

        encoding
            .and_then(|enc| Document::decode_text(&enc, bytes).ok())
            .unwrap_or_else(|| decode_fallback(bytes))
    }
}
