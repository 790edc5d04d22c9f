//! The four-level content hierarchy: page → block → line → content span.
//!
//! Ancestors are shared through [`Rc`] handles pointing upwards, so any number
//! of spans can reference the same line, block and page without owning them
//! and without creating cycles. Everything is immutable once built except the
//! horizontal bucket of a [`Content`], which lives in a [`Cell`] so that bucket
//! assignment on one collection is visible through every alias of the span.

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::geometry::{BBox, Geometry, Point};

/// A page of the source document.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Zero-based page index, increasing across the document.
    pub number: usize,
    pub width: f64,
    pub height: f64,
}

impl Page {
    pub fn new(number: usize, width: f64, height: f64) -> Self {
        Self {
            number,
            width,
            height,
        }
    }
}

/// A block of text as reported by the rendering backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub page: Rc<Page>,
    /// Sequential identifier assigned at build time, unique in the document.
    pub id: usize,
    /// Index reported by the backend; not necessarily dense.
    pub number: usize,
    pub bbox: BBox,
}

impl Block {
    pub fn new(page: Rc<Page>, id: usize, number: usize, bbox: BBox) -> Self {
        Self {
            page,
            id,
            number,
            bbox,
        }
    }
}

impl Geometry for Block {
    fn bbox(&self) -> BBox {
        self.bbox
    }
}

/// A line inside a block.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub block: Rc<Block>,
    pub id: usize,
    /// Position of the line inside its block.
    pub number: usize,
    pub bbox: BBox,
}

impl Line {
    pub fn new(block: Rc<Block>, id: usize, number: usize, bbox: BBox) -> Self {
        Self {
            block,
            id,
            number,
            bbox,
        }
    }

    pub fn page(&self) -> &Rc<Page> {
        &self.block.page
    }
}

impl Geometry for Line {
    fn bbox(&self) -> BBox {
        self.bbox
    }
}

/// Opaque style attributes of a span. They are compared for equality and
/// never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanStyle {
    pub ascender: f64,
    pub descender: f64,
    pub size: f64,
    pub font_name: String,
    pub render_flags: u32,
    pub char_flags: u32,
    pub bidi_level: i32,
    pub alpha: u8,
    pub rgb_color: u32,
}

/// The finest-grained text fragment: a run of identically styled glyphs.
#[derive(Debug, Clone)]
pub struct Content {
    pub line: Rc<Line>,
    /// Unique within a collection at construction time; reassigned by joins.
    pub id: usize,
    /// Position among its siblings as reported by the backend.
    pub number: usize,
    pub text: String,
    pub bbox: BBox,
    pub origin: Point,
    pub style: SpanStyle,
    horizontal_bucket: Cell<Option<usize>>,
}

impl Content {
    pub fn new(
        line: Rc<Line>,
        id: usize,
        number: usize,
        text: impl Into<String>,
        bbox: BBox,
        origin: Point,
        style: SpanStyle,
    ) -> Self {
        Self {
            line,
            id,
            number,
            text: text.into(),
            bbox,
            origin,
            style,
            horizontal_bucket: Cell::new(None),
        }
    }

    /// Same as [`Content::new`] with the bucket already set.
    pub fn with_bucket(self, bucket: Option<usize>) -> Self {
        self.horizontal_bucket.set(bucket);
        self
    }

    pub fn block(&self) -> &Rc<Block> {
        &self.line.block
    }

    pub fn page(&self) -> &Rc<Page> {
        &self.line.block.page
    }

    /// Baseline x.
    pub fn xo(&self) -> f64 {
        self.origin.x
    }

    /// Baseline y.
    pub fn yo(&self) -> f64 {
        self.origin.y
    }

    /// Horizontal zone assigned by the last bucket assignment, if any.
    pub fn horizontal_bucket(&self) -> Option<usize> {
        self.horizontal_bucket.get()
    }

    /// Overwrite the horizontal bucket.
    ///
    /// Spans are shared between collections, so the new value is observed by
    /// every collection holding this span.
    pub fn set_horizontal_bucket(&self, bucket: Option<usize>) {
        self.horizontal_bucket.set(bucket);
    }
}

impl Geometry for Content {
    fn bbox(&self) -> BBox {
        self.bbox
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_ancestor_lookups() {
        let p = page(3);
        let line = line_on(&p, 7, 11);
        let c = span(&line, 0, "Hello", 10.0, 100.0, 25.0);
        assert_eq!(c.line.id, 11);
        assert_eq!(c.block().id, 7);
        assert_eq!(c.page().number, 3);
        assert!(Rc::ptr_eq(c.page(), &p));
        assert!(Rc::ptr_eq(line.page(), &p));
    }

    #[test]
    fn test_origin_is_distinct_from_center() {
        let line = line_on(&page(0), 0, 0);
        let c = span(&line, 0, "Hello", 10.0, 100.0, 20.0);
        assert_eq!(c.xo(), 10.0);
        assert_eq!(c.yo(), 100.0);
        assert_eq!(c.xc(), 20.0);
        assert_eq!(c.yc(), 97.0);
        assert_eq!(c.width(), 20.0);
        assert_eq!(c.height(), 10.0);
        assert_eq!(c.area(), 200.0);
    }

    #[test]
    fn test_bucket_is_shared_through_aliases() {
        let line = line_on(&page(0), 0, 0);
        let c = span(&line, 0, "Hello", 10.0, 100.0, 20.0);
        let alias = Rc::clone(&c);
        assert_eq!(alias.horizontal_bucket(), None);
        c.set_horizontal_bucket(Some(2));
        assert_eq!(alias.horizontal_bucket(), Some(2));
    }

    #[test]
    fn test_with_bucket() {
        let line = line_on(&page(0), 0, 0);
        let c = (*span(&line, 0, "x", 0.0, 10.0, 5.0)).clone().with_bucket(Some(1));
        assert_eq!(c.horizontal_bucket(), Some(1));
    }
}
