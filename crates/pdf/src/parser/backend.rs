use std::collections::BTreeMap;

use lopdf::content::Content;
use log::debug;
use lopdf::{Dictionary, Document, Object};

use crate::PdfError;

/// A page identifier mirroring `lopdf::ObjectId`: (object number, generation number).
pub type PageId = (u32, u16);

/// Font resource referenced from a page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontInfo {
    /// Resource key as used by `Tf` (e.g. `b"F1"`).
    pub key: Vec<u8>,
    /// `BaseFont` of the font dictionary, if present.
    pub base_font: Option<String>,
    /// `Encoding` name of the font dictionary, if present.
    pub encoding: Option<String>,
    /// `Ascent` of the font descriptor, in glyph space (thousandths).
    pub ascent: Option<f64>,
    /// `Descent` of the font descriptor, in glyph space (thousandths).
    pub descent: Option<f64>,
}

/// Page rectangle in PDF user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl MediaBox {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Convert a user-space point to top-left page coordinates.
    pub fn to_top_left(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.x0, self.y1 - y)
    }
}

impl Default for MediaBox {
    /// US Letter, used when a page declares no usable MediaBox.
    fn default() -> Self {
        Self {
            x0: 0.0,
            y0: 0.0,
            x1: 612.0,
            y1: 792.0,
        }
    }
}

/// A content-stream operand, reduced to what the text-state machine reads.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Number(f64),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<Operand>),
    Other,
}

impl Operand {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Operand::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&Object> for Operand {
    fn from(obj: &Object) -> Self {
        match obj {
            Object::Integer(i) => Operand::Number(*i as f64),
            Object::Real(f) => Operand::Number(f64::from(*f)),
            Object::Name(n) => Operand::Name(n.clone()),
            Object::String(s, _) => Operand::Str(s.clone()),
            Object::Array(items) => Operand::Array(items.iter().map(Operand::from).collect()),
            _ => Operand::Other,
        }
    }
}

/// A single content-stream operation (operator + operands).
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<Operand>,
}

impl ContentOp {
    pub fn new(operator: &str, operands: Vec<Operand>) -> Self {
        Self {
            operator: operator.to_string(),
            operands,
        }
    }

    /// The first `n` operands as numbers, or `None` when any is missing or
    /// not numeric.
    pub fn numbers(&self, n: usize) -> Option<Vec<f64>> {
        if self.operands.len() < n {
            return None;
        }
        self.operands[..n].iter().map(Operand::as_number).collect()
    }
}

/// Best-effort decoding of raw PDF string bytes.
///
/// UTF-16BE with a BOM is decoded as such, valid UTF-8 is kept, anything else
/// is read as Latin-1.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(payload) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return decode_utf16be(payload);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn decode_utf16be(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Decode the bytes of a text-showing operator using the font's encoding.
///
/// `Identity-*` encodings are tried as two-byte UTF-16BE codes first.
pub fn decode_text(font: Option<&FontInfo>, bytes: &[u8]) -> String {
    let identity = font
        .and_then(|f| f.encoding.as_deref())
        .is_some_and(|e| e.contains("Identity"));

    if identity && !bytes.is_empty() && bytes.len().is_multiple_of(2) {
        let decoded = decode_utf16be(bytes);
        if !decoded.chars().all(|c| c == '\u{FFFD}' || c == '\0') {
            return decoded;
        }
    }
    decode_text_simple(bytes)
}

/// Abstraction over the PDF parser so the layout pipeline can run against
/// canned operations in tests.
pub trait PdfBackend {
    /// 1-based page number to [`PageId`].
    fn pages(&self) -> BTreeMap<u32, PageId>;

    fn media_box(&self, page: PageId) -> Result<MediaBox, PdfError>;

    fn page_fonts(&self, page: PageId) -> Result<Vec<FontInfo>, PdfError>;

    /// The page's content stream decoded into operations.
    fn page_operations(&self, page: PageId) -> Result<Vec<ContentOp>, PdfError>;
}

/// [`PdfBackend`] backed by [`lopdf::Document`].
pub struct LopdfBackend {
    doc: Document,
}

impl LopdfBackend {
    /// Parse a PDF from memory, decrypting it with `password` when the empty
    /// user password does not open it.
    pub fn load_bytes(data: &[u8], password: Option<&str>) -> Result<Self, PdfError> {
        let loaded = match password {
            Some(password) => Document::load_mem_with_password(data, password),
            None => Document::load_mem(data),
        };
        let doc = match loaded {
            Ok(doc) => doc,
            Err(lopdf::Error::InvalidPassword) => return Err(PdfError::WrongPassword),
            Err(e) => return Err(PdfError::Parse(e.to_string())),
        };
        // A document still carrying /Encrypt was not authenticated.
        if doc.is_encrypted() {
            return Err(match password {
                Some(_) => PdfError::WrongPassword,
                None => PdfError::MissingPassword,
            });
        }
        if doc.was_encrypted() {
            debug!("document decrypted");
        }
        Ok(Self { doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    fn number(&self, obj: &Object) -> Option<f64> {
        match self.resolve(obj)? {
            Object::Integer(i) => Some(*i as f64),
            Object::Real(f) => Some(f64::from(*f)),
            _ => None,
        }
    }

    /// MediaBox of `dict`, inherited through `Parent` links.
    fn inherited_media_box(&self, dict: &Dictionary) -> Option<MediaBox> {
        if let Some(Object::Array(items)) = dict.get(b"MediaBox").ok().and_then(|o| self.resolve(o)) {
            let nums: Vec<f64> = items.iter().filter_map(|o| self.number(o)).collect();
            if let [x0, y0, x1, y1] = nums[..] {
                return Some(MediaBox {
                    x0: x0.min(x1),
                    y0: y0.min(y1),
                    x1: x0.max(x1),
                    y1: y0.max(y1),
                });
            }
        }
        let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
        let parent = self.doc.get_object(parent).ok()?.as_dict().ok()?;
        self.inherited_media_box(parent)
    }

    fn font_metric(&self, font: &Dictionary, key: &[u8]) -> Option<f64> {
        let descriptor = self.resolve(font.get(b"FontDescriptor").ok()?)?.as_dict().ok()?;
        self.number(descriptor.get(key).ok()?)
    }
}

fn name_of(obj: Option<&Object>) -> Option<String> {
    match obj? {
        Object::Name(n) => Some(String::from_utf8_lossy(n).into_owned()),
        _ => None,
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn media_box(&self, page: PageId) -> Result<MediaBox, PdfError> {
        let dict = self
            .doc
            .get_object(page)
            .and_then(Object::as_dict)
            .map_err(|e| PdfError::Parse(format!("cannot read page {page:?}: {e}")))?;
        self.inherited_media_box(dict)
            .ok_or_else(|| PdfError::Parse(format!("MediaBox not found for page {page:?}")))
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<FontInfo>, PdfError> {
        let fonts = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page fonts: {e}")))?;

        Ok(fonts
            .iter()
            .map(|(key, dict)| FontInfo {
                key: key.clone(),
                base_font: name_of(dict.get(b"BaseFont").ok()),
                encoding: name_of(dict.get(b"Encoding").ok()),
                ascent: self.font_metric(dict, b"Ascent"),
                descent: self.font_metric(dict, b"Descent"),
            })
            .collect())
    }

    fn page_operations(&self, page: PageId) -> Result<Vec<ContentOp>, PdfError> {
        let data = self
            .doc
            .get_page_content(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page content: {e}")))?;
        let content = Content::decode(&data)
            .map_err(|e| PdfError::Parse(format!("content stream decode error: {e}")))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operands: op.operands.iter().map(Operand::from).collect(),
                operator: op.operator,
            })
            .collect())
    }
}
