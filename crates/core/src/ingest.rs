//! Building the entity graph from the nested page/block/line/span records a
//! rendering backend reports.

use std::rc::Rc;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::collection::ContentCollection;
use crate::error::Result;
use crate::geometry::{BBox, Point};
use crate::model::{Block, Content, Line, Page, SpanStyle};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPage {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub blocks: Vec<RawBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    pub number: usize,
    pub bbox: (f64, f64, f64, f64),
    #[serde(default)]
    pub lines: Vec<RawLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLine {
    pub bbox: (f64, f64, f64, f64),
    #[serde(default)]
    pub spans: Vec<RawSpan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSpan {
    pub text: String,
    pub bbox: (f64, f64, f64, f64),
    pub origin: (f64, f64),
    pub ascender: f64,
    pub descender: f64,
    pub size: f64,
    pub font: String,
    pub flags: u32,
    pub char_flags: u32,
    pub bidi: i32,
    pub alpha: u8,
    pub color: u32,
}

impl RawSpan {
    fn style(&self) -> SpanStyle {
        SpanStyle {
            ascender: self.ascender,
            descender: self.descender,
            size: self.size,
            font_name: self.font.clone(),
            render_flags: self.flags,
            char_flags: self.char_flags,
            bidi_level: self.bidi,
            alpha: self.alpha,
            rgb_color: self.color,
        }
    }
}

/// Global id counters shared across the whole document.
#[derive(Default)]
struct Counters {
    block: usize,
    line: usize,
    span: usize,
}

/// Build the span collection of a document.
///
/// Pages are numbered by position, and a line or span `number` is its index
/// among the siblings the backend reported, empty ones included. Block, line
/// and span ids are sequential across the document. A block takes an id when
/// it reports any line and a line when it reports any span, even if every
/// span turns out empty. Spans with empty text are dropped and take no id.
pub fn build_contents(pages: &[RawPage]) -> Result<ContentCollection> {
    let mut counters = Counters::default();
    let mut contents = Vec::new();

    for (page_number, raw_page) in pages.iter().enumerate() {
        let page = Rc::new(Page::new(page_number, raw_page.width, raw_page.height));
        for raw_block in &raw_page.blocks {
            build_block(&page, raw_block, &mut counters, &mut contents)?;
        }
    }

    debug!(
        "built {} contents in {} lines, {} blocks, {} pages",
        contents.len(),
        counters.line,
        counters.block,
        pages.len()
    );
    Ok(ContentCollection::new(contents))
}

fn build_block(
    page: &Rc<Page>,
    raw: &RawBlock,
    counters: &mut Counters,
    out: &mut Vec<Rc<Content>>,
) -> Result<()> {
    if raw.lines.is_empty() {
        trace!("page {}: block {} has no lines, skipped", page.number, raw.number);
        return Ok(());
    }

    let block = Rc::new(Block::new(
        page.clone(),
        counters.block,
        raw.number,
        BBox::try_from(raw.bbox)?,
    ));
    counters.block += 1;

    for (line_number, raw_line) in raw.lines.iter().enumerate() {
        if raw_line.spans.is_empty() {
            continue;
        }
        let line = Rc::new(Line::new(
            block.clone(),
            counters.line,
            line_number,
            BBox::try_from(raw_line.bbox)?,
        ));
        counters.line += 1;

        for (span_number, raw_span) in raw_line.spans.iter().enumerate() {
            if raw_span.text.is_empty() {
                debug!("dropping empty span at {:?}", raw_span.origin);
                continue;
            }
            let (x, y) = raw_span.origin;
            out.push(Rc::new(Content::new(
                line.clone(),
                counters.span,
                span_number,
                raw_span.text.as_str(),
                BBox::try_from(raw_span.bbox)?,
                Point::new(x, y),
                raw_span.style(),
            )));
            counters.span += 1;
        }
    }
    Ok(())
}
