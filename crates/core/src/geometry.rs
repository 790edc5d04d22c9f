//! Bounding boxes and the coordinate accessors shared by every entity.
//!
//! Coordinates follow the rendering backend's page space: the origin is the
//! top-left corner of the page, `x` grows to the right and `y` grows down.

use serde::{Deserialize, Serialize};

use crate::error::{ContentsError, Result};

/// Axis-aligned rectangle `(xl, yt, xr, yb)` with `xl <= xr` and `yt <= yb`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub xl: f64,
    pub yt: f64,
    pub xr: f64,
    pub yb: f64,
}

impl BBox {
    /// Build a box, rejecting inverted or non-finite coordinates.
    pub fn new(xl: f64, yt: f64, xr: f64, yb: f64) -> Result<Self> {
        if ![xl, yt, xr, yb].iter().all(|v| v.is_finite()) {
            return Err(ContentsError::invalid(format!(
                "bbox coordinates must be finite, got ({xl}, {yt}, {xr}, {yb})"
            )));
        }
        if xl > xr || yt > yb {
            return Err(ContentsError::invalid(format!(
                "bbox must satisfy xl <= xr and yt <= yb, got ({xl}, {yt}, {xr}, {yb})"
            )));
        }
        Ok(Self { xl, yt, xr, yb })
    }

    /// Smallest box covering every box in `boxes`, or `None` when empty.
    pub fn union<I>(boxes: I) -> Option<Self>
    where
        I: IntoIterator<Item = BBox>,
    {
        boxes.into_iter().reduce(|acc, b| BBox {
            xl: acc.xl.min(b.xl),
            yt: acc.yt.min(b.yt),
            xr: acc.xr.max(b.xr),
            yb: acc.yb.max(b.yb),
        })
    }
}

impl TryFrom<(f64, f64, f64, f64)> for BBox {
    type Error = ContentsError;

    fn try_from((xl, yt, xr, yb): (f64, f64, f64, f64)) -> Result<Self> {
        BBox::new(xl, yt, xr, yb)
    }
}

/// Text baseline anchor of a span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Derived coordinates computed purely from an entity's own bounding box.
pub trait Geometry {
    fn bbox(&self) -> BBox;

    fn xl(&self) -> f64 {
        self.bbox().xl
    }

    fn yt(&self) -> f64 {
        self.bbox().yt
    }

    fn xr(&self) -> f64 {
        self.bbox().xr
    }

    fn yb(&self) -> f64 {
        self.bbox().yb
    }

    /// Horizontal center.
    fn xc(&self) -> f64 {
        (self.xl() + self.xr()) / 2.0
    }

    /// Vertical center.
    fn yc(&self) -> f64 {
        (self.yt() + self.yb()) / 2.0
    }

    fn width(&self) -> f64 {
        self.xr() - self.xl()
    }

    fn height(&self) -> f64 {
        self.yb() - self.yt()
    }

    fn area(&self) -> f64 {
        self.width() * self.height()
    }
}

impl Geometry for BBox {
    fn bbox(&self) -> BBox {
        *self
    }
}
