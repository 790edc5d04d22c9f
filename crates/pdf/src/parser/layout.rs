//! Text extraction and line/block grouping.
//!
//! This module turns raw PDF content-stream operators into the nested
//! page/block/line/span records the content model is built from. Every
//! function is a pure transformation; I/O lives behind the [`PdfBackend`]
//! trait provided by the caller.
//!
//! # Pipeline
//!
//! ```text
//! content ops  ->  TextRun[]  ->  lines  ->  blocks  ->  RawPage
//!   (per page)      extract      group_runs  group_lines  layout_page
//! ```
//!
//! Runs are never merged here: every shown string stays its own span, with
//! its own style, so that the collection engine can decide what to join.

use log::{debug, trace, warn};
use pdfcontents_core::{RawBlock, RawLine, RawPage, RawSpan};

use super::backend::{decode_text, ContentOp, FontInfo, MediaBox, Operand, PageId, PdfBackend};
use crate::text::normalize_text;
use crate::PdfError;

/// Span flags derived from the font name.
pub mod flags {
    pub const SUPERSCRIPT: u32 = 1;
    pub const ITALIC: u32 = 2;
    pub const SERIF: u32 = 4;
    pub const MONOSPACED: u32 = 8;
    pub const BOLD: u32 = 16;
}

/// Tunables of the layout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Runs whose baselines differ by at most this many points share a line.
    pub line_tolerance: f64,
    /// A vertical gap larger than this multiple of the previous line's font
    /// size starts a new block.
    pub block_gap_factor: f64,
    /// Approximate glyph width as a fraction of the font size.
    pub char_width_ratio: f64,
    /// Ascender ratio used when the font declares none.
    pub ascender: f64,
    /// Descender ratio used when the font declares none.
    pub descender: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_tolerance: 1.0,
            block_gap_factor: 1.4,
            char_width_ratio: 0.5,
            ascender: 0.8,
            descender: -0.2,
        }
    }
}

/// One shown string, positioned in top-left page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    /// Baseline start.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub size: f64,
    pub font_name: String,
    pub flags: u32,
    pub color: u32,
    pub ascender: f64,
    pub descender: f64,
}

impl TextRun {
    pub fn bbox(&self) -> (f64, f64, f64, f64) {
        (
            self.x,
            self.y - self.ascender * self.size,
            self.x + self.width,
            self.y - self.descender * self.size,
        )
    }

    fn into_raw_span(self) -> RawSpan {
        RawSpan {
            bbox: self.bbox(),
            origin: (self.x, self.y),
            text: self.text,
            ascender: self.ascender,
            descender: self.descender,
            size: self.size,
            font: self.font_name,
            flags: self.flags,
            char_flags: 0,
            bidi: 0,
            alpha: 255,
            color: self.color,
        }
    }
}

/// Drop a six-letter subset tag (`ABCDEF+Helvetica`).
pub fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.chars().all(|c| c.is_ascii_uppercase()) => rest,
        _ => name,
    }
}

/// Style flags guessed from a font name.
pub fn font_flags(name: &str) -> u32 {
    let upper = name.to_uppercase();
    let mut bits = 0;
    if ["BOLD", "BLACK", "HEAVY", "SEMIBOLD"].iter().any(|w| upper.contains(w)) {
        bits |= flags::BOLD;
    }
    if upper.contains("ITALIC") || upper.contains("OBLIQUE") {
        bits |= flags::ITALIC;
    }
    if ["COURIER", "MONO", "CONSOL"].iter().any(|w| upper.contains(w)) {
        bits |= flags::MONOSPACED;
    } else if !upper.contains("SANS")
        && ["TIMES", "SERIF", "ROMAN", "GEORGIA", "GARAMOND"]
            .iter()
            .any(|w| upper.contains(w))
    {
        bits |= flags::SERIF;
    }
    bits
}

/// Pack unit-interval RGB components as `0xRRGGBB`.
fn pack_rgb(r: f64, g: f64, b: f64) -> u32 {
    let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
    (channel(r) << 16) | (channel(g) << 8) | channel(b)
}

fn cmyk_to_rgb(c: f64, m: f64, y: f64, k: f64) -> u32 {
    pack_rgb((1.0 - c) * (1.0 - k), (1.0 - m) * (1.0 - k), (1.0 - y) * (1.0 - k))
}

// ---------------------------------------------------------------------------
// Internal: PDF text-state machine
// ---------------------------------------------------------------------------

const IDENTITY_MATRIX: [f64; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

#[derive(Debug, Clone)]
struct TextState {
    font_key: Vec<u8>,
    font_name: String,
    font_size: f64,
    ascender: f64,
    descender: f64,
    text_matrix: [f64; 6],
    line_matrix: [f64; 6],
    horiz_scale: f64,
    char_spacing: f64,
    word_spacing: f64,
    text_rise: f64,
    leading: f64,
    fill: u32,
}

impl TextState {
    fn new(config: &LayoutConfig) -> Self {
        Self {
            font_key: Vec::new(),
            font_name: String::new(),
            font_size: 0.0,
            ascender: config.ascender,
            descender: config.descender,
            text_matrix: IDENTITY_MATRIX,
            line_matrix: IDENTITY_MATRIX,
            horiz_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            text_rise: 0.0,
            leading: 0.0,
            fill: 0,
        }
    }

    fn x(&self) -> f64 {
        self.text_matrix[4]
    }

    fn y(&self) -> f64 {
        self.text_matrix[5]
    }

    /// `font_size * sqrt(b^2 + d^2)` of the text matrix.
    fn effective_font_size(&self) -> f64 {
        let scale = self.text_matrix[1].hypot(self.text_matrix[3]);
        (self.font_size * scale).abs()
    }

    fn advance_x(&mut self, dx: f64) {
        self.text_matrix[4] += dx * self.text_matrix[0];
        self.text_matrix[5] += dx * self.text_matrix[1];
    }

    fn translate_line(&mut self, tx: f64, ty: f64) {
        let m = self.line_matrix;
        self.line_matrix[4] = m[0] * tx + m[2] * ty + m[4];
        self.line_matrix[5] = m[1] * tx + m[3] * ty + m[5];
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.translate_line(0.0, -self.leading);
    }

    fn set_font(&mut self, key: Vec<u8>, font: Option<&FontInfo>, size: f64, config: &LayoutConfig) {
        let name = font
            .and_then(|f| f.base_font.clone())
            .unwrap_or_else(|| String::from_utf8_lossy(&key).into_owned());
        // Ascent must be positive and descent negative, or the span bbox inverts.
        let ascent = font.and_then(|f| f.ascent).filter(|v| *v > 0.0);
        let descent = font.and_then(|f| f.descent).filter(|v| *v < 0.0);

        self.font_name = strip_subset_prefix(&name).to_string();
        self.ascender = ascent.map_or(config.ascender, |v| v / 1000.0);
        self.descender = descent.map_or(config.descender, |v| v / 1000.0);
        self.font_key = key;
        self.font_size = size;
    }

    fn char_width(&self, config: &LayoutConfig) -> f64 {
        self.font_size * config.char_width_ratio * self.horiz_scale
    }

    /// Advance past `text` and return the displacement.
    fn advance_after_show(&mut self, text: &str, config: &LayoutConfig) -> f64 {
        let dx: f64 = text
            .chars()
            .map(|ch| {
                let w = self.char_width(config) + self.char_spacing;
                if ch == ' ' {
                    w + self.word_spacing
                } else {
                    w
                }
            })
            .sum();
        self.advance_x(dx);
        dx
    }
}

/// Walks one page's operations and collects its runs.
struct PageWalker<'a> {
    fonts: &'a [FontInfo],
    media_box: MediaBox,
    config: &'a LayoutConfig,
    state: TextState,
    saved_fill: Vec<u32>,
    runs: Vec<TextRun>,
}

impl<'a> PageWalker<'a> {
    fn new(fonts: &'a [FontInfo], media_box: MediaBox, config: &'a LayoutConfig) -> Self {
        Self {
            fonts,
            media_box,
            config,
            state: TextState::new(config),
            saved_fill: Vec::new(),
            runs: Vec::new(),
        }
    }

    fn font(&self) -> Option<&'a FontInfo> {
        self.fonts.iter().find(|f| f.key == self.state.font_key)
    }

    fn decode(&self, operand: &Operand) -> String {
        match operand {
            Operand::Str(bytes) => decode_text(self.font(), bytes),
            _ => String::new(),
        }
    }

    fn number(op: &ContentOp) -> Option<f64> {
        op.operands.first().and_then(Operand::as_number)
    }

    fn apply(&mut self, op: &ContentOp) {
        let state = &mut self.state;
        match op.operator.as_str() {
            "BT" => {
                state.text_matrix = IDENTITY_MATRIX;
                state.line_matrix = IDENTITY_MATRIX;
            }
            "q" => self.saved_fill.push(state.fill),
            "Q" => {
                if let Some(fill) = self.saved_fill.pop() {
                    state.fill = fill;
                }
            }
            "g" => {
                if let Some(v) = Self::number(op) {
                    state.fill = pack_rgb(v, v, v);
                }
            }
            "rg" => {
                if let Some(v) = op.numbers(3) {
                    state.fill = pack_rgb(v[0], v[1], v[2]);
                }
            }
            "k" => {
                if let Some(v) = op.numbers(4) {
                    state.fill = cmyk_to_rgb(v[0], v[1], v[2], v[3]);
                }
            }
            "Tf" => {
                let key = match op.operands.first() {
                    Some(Operand::Name(n)) | Some(Operand::Str(n)) => n.clone(),
                    _ => return,
                };
                let size = op.operands.get(1).and_then(Operand::as_number).unwrap_or(0.0);
                let font = self.fonts.iter().find(|f| f.key == key);
                if font.is_none() {
                    warn!("unknown font resource /{}", String::from_utf8_lossy(&key));
                }
                state.set_font(key, font, size, self.config);
            }
            "Tm" => {
                if let Some(v) = op.numbers(6) {
                    state.text_matrix = [v[0], v[1], v[2], v[3], v[4], v[5]];
                    state.line_matrix = state.text_matrix;
                }
            }
            "Td" => {
                if let Some(v) = op.numbers(2) {
                    state.translate_line(v[0], v[1]);
                }
            }
            "TD" => {
                if let Some(v) = op.numbers(2) {
                    state.leading = -v[1];
                    state.translate_line(v[0], v[1]);
                }
            }
            "T*" => state.next_line(),
            "TL" => {
                if let Some(v) = Self::number(op) {
                    state.leading = v;
                }
            }
            "Tc" => {
                if let Some(v) = Self::number(op) {
                    state.char_spacing = v;
                }
            }
            "Tw" => {
                if let Some(v) = Self::number(op) {
                    state.word_spacing = v;
                }
            }
            "Tz" => {
                if let Some(v) = Self::number(op) {
                    state.horiz_scale = v / 100.0;
                }
            }
            "Ts" => {
                if let Some(v) = Self::number(op) {
                    state.text_rise = v;
                }
            }
            "Tj" => {
                if let Some(operand) = op.operands.first() {
                    self.show(operand);
                }
            }
            "TJ" => {
                if let Some(Operand::Array(items)) = op.operands.first() {
                    self.show_array(items);
                }
            }
            "'" => {
                state.next_line();
                if let Some(operand) = op.operands.first() {
                    self.show(operand);
                }
            }
            "\"" => {
                if op.operands.len() >= 3 {
                    if let Some(aw) = op.operands[0].as_number() {
                        state.word_spacing = aw;
                    }
                    if let Some(ac) = op.operands[1].as_number() {
                        state.char_spacing = ac;
                    }
                    state.next_line();
                    self.show(&op.operands[2]);
                }
            }
            _ => {}
        }
    }

    fn show(&mut self, operand: &Operand) {
        let text = self.decode(operand);
        if text.is_empty() {
            return;
        }
        let (x, y) = (self.state.x(), self.state.y());
        self.emit(&text, x, y);
        self.state.advance_after_show(&text, self.config);
    }

    /// `TJ`: strings interleaved with kerning in thousandths of text space.
    /// Large negative kerning reads as a word gap and becomes a space.
    fn show_array(&mut self, items: &[Operand]) {
        let mut buf = String::new();
        let (mut x, y) = (self.state.x(), self.state.y());

        for item in items {
            match item {
                Operand::Str(_) => {
                    let fragment = self.decode(item);
                    if buf.is_empty() {
                        x = self.state.x();
                    }
                    buf.push_str(&fragment);
                    self.state.advance_after_show(&fragment, self.config);
                }
                other => {
                    if let Some(adj) = other.as_number() {
                        let dx = -adj / 1000.0 * self.state.font_size * self.state.horiz_scale;
                        if dx > self.state.char_width(self.config) * 0.3 && !buf.is_empty() {
                            buf.push(' ');
                        }
                        self.state.advance_x(dx);
                    }
                }
            }
        }
        self.emit(&buf, x, y);
    }

    fn emit(&mut self, raw: &str, x: f64, y: f64) {
        let text = normalize_text(raw);
        if text.is_empty() {
            return;
        }
        let state = &self.state;
        let size = state.effective_font_size();
        let width = (text.chars().count() as f64 * size * self.config.char_width_ratio * state.horiz_scale).abs();
        let (x, y) = self.media_box.to_top_left(x, y + state.text_rise);

        let mut bits = font_flags(&state.font_name);
        if state.text_rise > 0.0 {
            bits |= flags::SUPERSCRIPT;
        }

        trace!("run {text:?} at ({x:.2}, {y:.2}) size {size:.2}");
        self.runs.push(TextRun {
            text,
            x,
            y,
            width,
            size,
            font_name: state.font_name.clone(),
            flags: bits,
            color: state.fill,
            ascender: state.ascender,
            descender: state.descender,
        });
    }
}

// ---------------------------------------------------------------------------
// Public API: run extraction
// ---------------------------------------------------------------------------

/// Walk a page's content stream and collect its text runs.
///
/// | Operator | Action |
/// |----------|--------|
/// | `BT`     | Begin text object, reset matrices |
/// | `Tf`     | Set font and size |
/// | `Tm` `Td` `TD` `T*` `TL` | Text position and leading |
/// | `Tc` `Tw` `Tz` `Ts` | Spacing, scaling and rise |
/// | `Tj` `TJ` `'` `"` | Show text |
/// | `g` `rg` `k` | Fill colour (gray, RGB, CMYK) |
/// | `q` `Q`  | Save and restore the fill colour |
pub fn extract_page_runs(
    ops: &[ContentOp],
    fonts: &[FontInfo],
    media_box: MediaBox,
    config: &LayoutConfig,
) -> Vec<TextRun> {
    let mut walker = PageWalker::new(fonts, media_box, config);
    for op in ops {
        walker.apply(op);
    }
    walker.runs
}

// ---------------------------------------------------------------------------
// Public API: grouping
// ---------------------------------------------------------------------------

/// Group runs into lines: top to bottom, then left to right.
///
/// A run joins the current line when its baseline is within `tolerance` of
/// the line's first baseline.
pub fn group_runs_into_lines(mut runs: Vec<TextRun>, tolerance: f64) -> Vec<Vec<TextRun>> {
    runs.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<Vec<TextRun>> = Vec::new();
    for run in runs {
        match lines.last_mut() {
            Some(line) if (run.y - line[0].y).abs() <= tolerance => line.push(run),
            _ => lines.push(vec![run]),
        }
    }
    for line in &mut lines {
        line.sort_by(|a, b| a.x.total_cmp(&b.x));
    }
    lines
}

/// Group consecutive lines into blocks, splitting where the baseline gap
/// exceeds `gap_factor` times the previous line's largest font size.
pub fn group_lines_into_blocks(lines: Vec<Vec<TextRun>>, gap_factor: f64) -> Vec<Vec<Vec<TextRun>>> {
    let mut blocks: Vec<Vec<Vec<TextRun>>> = Vec::new();
    for line in lines {
        let starts_block = match blocks.last().and_then(|b| b.last()) {
            Some(prev) => {
                let size = prev.iter().map(|r| r.size).fold(0.0, f64::max);
                (line[0].y - prev[0].y).abs() > size * gap_factor
            }
            None => true,
        };
        match blocks.last_mut() {
            Some(block) if !starts_block => block.push(line),
            _ => blocks.push(vec![line]),
        }
    }
    blocks
}

fn union(boxes: impl Iterator<Item = (f64, f64, f64, f64)>) -> (f64, f64, f64, f64) {
    boxes
        .reduce(|a, b| (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3)))
        .unwrap_or_default()
}

/// Lay one page's runs out as a [`RawPage`].
pub fn layout_page(runs: Vec<TextRun>, media_box: MediaBox, config: &LayoutConfig) -> RawPage {
    let lines = group_runs_into_lines(runs, config.line_tolerance);
    let blocks = group_lines_into_blocks(lines, config.block_gap_factor);

    let blocks = blocks
        .into_iter()
        .enumerate()
        .map(|(number, lines)| {
            let lines: Vec<RawLine> = lines
                .into_iter()
                .map(|runs| RawLine {
                    bbox: union(runs.iter().map(TextRun::bbox)),
                    spans: runs.into_iter().map(TextRun::into_raw_span).collect(),
                })
                .collect();
            RawBlock {
                number,
                bbox: union(lines.iter().map(|l| l.bbox)),
                lines,
            }
        })
        .collect();

    RawPage {
        width: media_box.width(),
        height: media_box.height(),
        blocks,
    }
}

/// Extract and lay out every page of the document.
///
/// A page whose MediaBox cannot be read falls back to US Letter; a page whose
/// fonts cannot be listed is read without font metrics.
pub fn extract_pages(backend: &dyn PdfBackend, config: &LayoutConfig) -> Result<Vec<RawPage>, PdfError> {
    let pages = backend.pages();
    let mut result = Vec::with_capacity(pages.len());

    for (&number, &page_id) in &pages {
        result.push(extract_page(backend, number, page_id, config)?);
    }
    Ok(result)
}

fn extract_page(
    backend: &dyn PdfBackend,
    number: u32,
    page_id: PageId,
    config: &LayoutConfig,
) -> Result<RawPage, PdfError> {
    let media_box = backend.media_box(page_id).unwrap_or_else(|e| {
        warn!("page {number}: {e}, assuming US Letter");
        MediaBox::default()
    });
    let fonts = backend.page_fonts(page_id).unwrap_or_else(|e| {
        warn!("page {number}: {e}");
        Vec::new()
    });
    let ops = backend.page_operations(page_id)?;

    let runs = extract_page_runs(&ops, &fonts, media_box, config);
    debug!("page {number}: {} operations, {} runs", ops.len(), runs.len());
    Ok(layout_page(runs, media_box, config))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    struct MockBackend {
        pages: Vec<Vec<ContentOp>>,
        fonts: Vec<FontInfo>,
    }

    impl PdfBackend for MockBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            (0..self.pages.len())
                .map(|i| (i as u32 + 1, (i as u32 + 10, 0)))
                .collect()
        }

        fn media_box(&self, _page: PageId) -> Result<MediaBox, PdfError> {
            Ok(MediaBox::default())
        }

        fn page_fonts(&self, _page: PageId) -> Result<Vec<FontInfo>, PdfError> {
            Ok(self.fonts.clone())
        }

        fn page_operations(&self, page: PageId) -> Result<Vec<ContentOp>, PdfError> {
            Ok(self.pages[(page.0 - 10) as usize].clone())
        }
    }

    fn op(operator: &str, operands: Vec<Operand>) -> ContentOp {
        ContentOp::new(operator, operands)
    }

    fn n(v: f64) -> Operand {
        Operand::Number(v)
    }

    fn s(text: &str) -> Operand {
        Operand::Str(text.as_bytes().to_vec())
    }

    fn name(key: &str) -> Operand {
        Operand::Name(key.as_bytes().to_vec())
    }

    fn fonts() -> Vec<FontInfo> {
        vec![
            FontInfo {
                key: b"F1".to_vec(),
                base_font: Some("ABCDEF+Helvetica".to_string()),
                ascent: Some(718.0),
                descent: Some(-207.0),
                ..Default::default()
            },
            FontInfo {
                key: b"F2".to_vec(),
                base_font: Some("Helvetica-Bold".to_string()),
                ..Default::default()
            },
        ]
    }

    /// `BT /F1 size Tf x y Td (text) Tj ET`
    fn show_at(font: &str, size: f64, x: f64, y: f64, text: &str) -> Vec<ContentOp> {
        vec![
            op("BT", vec![]),
            op("Tf", vec![name(font), n(size)]),
            op("Td", vec![n(x), n(y)]),
            op("Tj", vec![s(text)]),
            op("ET", vec![]),
        ]
    }

    fn runs_of(ops: &[ContentOp]) -> Vec<TextRun> {
        extract_page_runs(ops, &fonts(), MediaBox::default(), &LayoutConfig::default())
    }

    #[test]
    fn test_font_flags() {
        assert_eq!(font_flags("Helvetica"), 0);
        assert_eq!(font_flags("Helvetica-Bold"), flags::BOLD);
        assert_eq!(font_flags("Helvetica-BoldOblique"), flags::BOLD | flags::ITALIC);
        assert_eq!(font_flags("Times-Roman"), flags::SERIF);
        assert_eq!(font_flags("DejaVuSans"), 0);
        assert_eq!(font_flags("Courier"), flags::MONOSPACED);
    }

    #[test]
    fn test_strip_subset_prefix() {
        assert_eq!(strip_subset_prefix("ABCDEF+Helvetica"), "Helvetica");
        assert_eq!(strip_subset_prefix("Helvetica"), "Helvetica");
        assert_eq!(strip_subset_prefix("abc+Helvetica"), "abc+Helvetica");
    }

    #[test]
    fn test_pack_colors() {
        assert_eq!(pack_rgb(1.0, 0.0, 0.0), 0xff0000);
        assert_eq!(pack_rgb(0.5, 0.5, 0.5), 0x808080);
        assert_eq!(cmyk_to_rgb(0.0, 0.0, 0.0, 1.0), 0x000000);
        assert_eq!(cmyk_to_rgb(0.0, 1.0, 1.0, 0.0), 0xff0000);
    }

    #[test]
    fn test_tj_converts_to_top_left() {
        let runs = runs_of(&show_at("F1", 12.0, 72.0, 700.0, "Invoice"));
        assert_eq!(runs.len(), 1);
        let run = &runs[0];
        assert_eq!(run.text, "Invoice");
        assert_eq!(run.x, 72.0);
        assert_eq!(run.y, 92.0);
        assert_eq!(run.size, 12.0);
        assert_eq!(run.font_name, "Helvetica");
        assert_eq!(run.width, 7.0 * 12.0 * 0.5);
        assert!((run.ascender - 0.718).abs() < 1e-9);
        assert!((run.descender + 0.207).abs() < 1e-9);
    }

    #[test]
    fn test_bbox_uses_font_metrics_or_defaults() {
        let runs = runs_of(&show_at("F2", 10.0, 0.0, 692.0, "Total"));
        let (xl, yt, xr, yb) = runs[0].bbox();
        assert_eq!((xl, xr), (0.0, 25.0));
        assert!((yt - 92.0).abs() < 1e-9);
        assert!((yb - 102.0).abs() < 1e-9);
        assert_eq!(runs[0].flags, flags::BOLD);
    }

    #[test]
    fn test_fill_color_and_graphics_stack() {
        let ops = vec![
            op("rg", vec![n(1.0), n(0.0), n(0.0)]),
            op("q", vec![]),
            op("g", vec![n(0.0)]),
            op("BT", vec![]),
            op("Tf", vec![name("F1"), n(10.0)]),
            op("Td", vec![n(10.0), n(700.0)]),
            op("Tj", vec![s("black")]),
            op("ET", vec![]),
            op("Q", vec![]),
            op("BT", vec![]),
            op("Td", vec![n(10.0), n(680.0)]),
            op("Tj", vec![s("red")]),
            op("ET", vec![]),
        ];
        let runs = runs_of(&ops);
        assert_eq!(runs[0].color, 0x000000);
        assert_eq!(runs[1].color, 0xff0000);
    }

    #[test]
    fn test_tj_array_inserts_word_gaps() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![name("F1"), n(10.0)]),
            op("Td", vec![n(10.0), n(700.0)]),
            op(
                "TJ",
                vec![Operand::Array(vec![s("Tot"), n(-20.0), s("al"), n(-400.0), s("due")])],
            ),
            op("ET", vec![]),
        ];
        let runs = runs_of(&ops);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "Total due");
    }

    #[test]
    fn test_next_line_operators() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![name("F1"), n(10.0)]),
            op("TD", vec![n(10.0), n(700.0)]),
            op("TL", vec![n(14.0)]),
            op("'", vec![s("second")]),
            op("\"", vec![n(0.0), n(0.0), s("third")]),
            op("ET", vec![]),
        ];
        let runs = runs_of(&ops);
        let ys: Vec<f64> = runs.iter().map(|r| r.y).collect();
        assert_eq!(ys, vec![106.0, 120.0]);
    }

    #[test]
    fn test_empty_and_whitespace_strings_are_skipped() {
        let mut ops = show_at("F1", 10.0, 10.0, 700.0, "   ");
        ops.extend(show_at("F1", 10.0, 10.0, 680.0, ""));
        assert!(runs_of(&ops).is_empty());
    }

    #[test]
    fn test_text_is_normalized() {
        let runs = runs_of(&show_at("F1", 10.0, 10.0, 700.0, "Total\u{00A0}\u{00A0}due "));
        assert_eq!(runs[0].text, "Total due");
    }

    #[test]
    fn test_superscript_flag_from_rise() {
        let mut ops = show_at("F1", 10.0, 10.0, 700.0, "x");
        ops.insert(1, op("Ts", vec![n(3.0)]));
        let runs = runs_of(&ops);
        assert_eq!(runs[0].flags & flags::SUPERSCRIPT, flags::SUPERSCRIPT);
        assert_eq!(runs[0].y, 89.0);
    }

    #[test]
    fn test_group_runs_into_lines() {
        let mut ops = show_at("F1", 10.0, 200.0, 700.0, "World");
        ops.extend(show_at("F1", 10.0, 10.0, 700.4, "Hello"));
        ops.extend(show_at("F1", 10.0, 10.0, 680.0, "Next"));
        let lines = group_runs_into_lines(runs_of(&ops), 1.0);
        assert_eq!(lines.len(), 2);
        let texts: Vec<&str> = lines[0].iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello", "World"]);
        assert_eq!(lines[1][0].text, "Next");
    }

    #[test]
    fn test_group_lines_into_blocks() {
        let mut ops = show_at("F1", 10.0, 10.0, 700.0, "a");
        ops.extend(show_at("F1", 10.0, 10.0, 688.0, "b"));
        ops.extend(show_at("F1", 10.0, 10.0, 600.0, "c"));
        let lines = group_runs_into_lines(runs_of(&ops), 1.0);
        let blocks = group_lines_into_blocks(lines, 1.4);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].len(), 2);
        assert_eq!(blocks[1][0][0].text, "c");
    }

    #[test]
    fn test_layout_page_bboxes_are_unions() {
        let mut ops = show_at("F1", 10.0, 10.0, 700.0, "ab");
        ops.extend(show_at("F1", 10.0, 40.0, 700.0, "cd"));
        let page = layout_page(runs_of(&ops), MediaBox::default(), &LayoutConfig::default());
        assert_eq!(page.width, 612.0);
        assert_eq!(page.blocks.len(), 1);
        let line = &page.blocks[0].lines[0];
        assert_eq!(line.spans.len(), 2);
        assert_eq!(line.bbox.0, 10.0);
        assert_eq!(line.bbox.2, 50.0);
        assert_eq!(page.blocks[0].bbox, line.bbox);
        assert_eq!(line.spans[1].origin, (40.0, 92.0));
        assert_eq!(line.spans[1].alpha, 255);
    }

    #[test]
    fn test_extract_pages_numbers_every_page() {
        let backend = MockBackend {
            pages: vec![
                show_at("F1", 10.0, 10.0, 700.0, "first"),
                vec![],
                show_at("F1", 10.0, 10.0, 700.0, "third"),
            ],
            fonts: fonts(),
        };
        let pages = extract_pages(&backend, &LayoutConfig::default()).unwrap();
        assert_eq!(pages.len(), 3);
        assert!(pages[1].blocks.is_empty());
        assert_eq!(pages[2].blocks[0].lines[0].spans[0].text, "third");
    }
}
