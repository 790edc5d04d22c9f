use std::path::Path;
use std::sync::OnceLock;

use log::debug;
use pdfcontents_core::{build_contents, ContentCollection, ContentsError, RawPage};
use regex::Regex;
use thiserror::Error;

use parser::backend::{LopdfBackend, PdfBackend};

pub mod parser;
pub mod text;

pub use parser::layout::LayoutConfig;
pub use text::normalize_text;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("Document is encrypted and no password was given")]
    MissingPassword,
    #[error("Wrong password for encrypted document")]
    WrongPassword,
    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Contents(#[from] ContentsError),
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// A parsed PDF document and the results extracted from it so far.
///
/// Constructed via [`Extractor::open`] or [`Extractor::from_bytes`]. Both
/// extraction methods remember their last result and return it again when
/// asked to use the cache.
pub struct Extractor {
    backend: LopdfBackend,
    config: LayoutConfig,
    contents: Option<Option<ContentCollection>>,
    texts: Option<Option<Vec<String>>>,
}

impl Extractor {
    /// Read and parse a `.pdf` file. The extension check is case-insensitive.
    ///
    /// An encrypted file is decrypted with the password embedded in its name,
    /// see [`password_from_file_name`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PdfError> {
        let path = path.as_ref();
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return Err(PdfError::UnsupportedExtension(path.display().to_string()));
        }

        debug!("opening {}", path.display());
        let bytes = std::fs::read(path)?;
        let password = password_from_file_name(path);
        Self::from_bytes_with_password(&bytes, password.as_deref())
    }

    /// Parse PDF bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfError> {
        Self::from_bytes_with_password(bytes, None)
    }

    /// Parse PDF bytes, decrypting them with `password` if needed.
    pub fn from_bytes_with_password(bytes: &[u8], password: Option<&str>) -> Result<Self, PdfError> {
        Ok(Self {
            backend: LopdfBackend::load_bytes(bytes, password)?,
            config: LayoutConfig::default(),
            contents: None,
            texts: None,
        })
    }

    /// Replace the layout tunables. Clears cached results.
    pub fn with_config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self.contents = None;
        self.texts = None;
        self
    }

    pub fn page_count(&self) -> usize {
        self.backend.page_count()
    }

    /// Lay out every page without building the content model.
    pub fn pages(&self) -> Result<Vec<RawPage>, PdfError> {
        parser::layout::extract_pages(&self.backend, &self.config)
    }

    /// Every span of the document, or `None` when it has no text.
    ///
    /// The returned collection shares its spans with the cached one, so a
    /// bucket assignment on it is visible in later cached results.
    pub fn extract_contents(&mut self, use_cache: bool) -> Result<Option<ContentCollection>, PdfError> {
        if use_cache {
            if let Some(cached) = &self.contents {
                debug!("contents: cache hit");
                return Ok(cached.clone());
            }
        }

        let contents = build_contents(&self.pages()?)?;
        debug!("contents: {} spans extracted", contents.len());
        let contents = (!contents.is_empty()).then_some(contents);
        self.contents = Some(contents.clone());
        Ok(contents)
    }

    /// One string per extracted line, or `None` when the document has no
    /// text.
    pub fn extract_texts(&mut self, use_cache: bool) -> Result<Option<Vec<String>>, PdfError> {
        if use_cache {
            if let Some(cached) = &self.texts {
                debug!("texts: cache hit");
                return Ok(cached.clone());
            }
        }

        let texts = line_texts(&self.pages()?);
        debug!("texts: {} lines extracted", texts.len());
        let texts = (!texts.is_empty()).then_some(texts);
        self.texts = Some(texts.clone());
        Ok(texts)
    }
}

/// The password of an encrypted file, taken from the last `#...#` pair in its
/// name: `report#s3cret#.pdf` opens with `s3cret`.
pub fn password_from_file_name(path: &Path) -> Option<String> {
    static RE_PASSWORD: OnceLock<Regex> = OnceLock::new();
    let re_password = RE_PASSWORD.get_or_init(|| Regex::new(r"#([^#]+)#[^#]*$").unwrap());

    let name = path.file_name()?.to_str()?;
    re_password.captures(name).map(|c| c[1].to_string())
}

/// Join each line's spans with a space, keeping non-empty results.
fn line_texts(pages: &[RawPage]) -> Vec<String> {
    pages
        .iter()
        .flat_map(|p| &p.blocks)
        .flat_map(|b| &b.lines)
        .map(|l| {
            let joined = l
                .spans
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            normalize_text(&joined)
        })
        .filter(|t| !t.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Convenience free functions (stateless, re-parse each call)
// ---------------------------------------------------------------------------

/// Extract every span from PDF bytes.
pub fn extract_contents(bytes: &[u8]) -> Result<Option<ContentCollection>, PdfError> {
    Extractor::from_bytes(bytes)?.extract_contents(false)
}

/// Extract line texts from PDF bytes.
pub fn extract_texts(bytes: &[u8]) -> Result<Option<Vec<String>>, PdfError> {
    Extractor::from_bytes(bytes)?.extract_texts(false)
}
