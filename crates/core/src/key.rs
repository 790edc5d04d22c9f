//! Selectable attributes of a [`Content`] and multi-field sort keys.
//!
//! A [`Key`] names one attribute, either of the span itself or of one of its
//! ancestors, and resolves it to a [`Value`]. Keys parse from and display as
//! dotted paths (`"page.number"`, `"line.id"`, `"yo"`), which is the form the
//! command line and pattern documents use.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{ContentsError, Result};
use crate::geometry::Geometry;
use crate::model::Content;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Id,
    Number,
    Text,
    Xl,
    Yt,
    Xr,
    Yb,
    Xc,
    Yc,
    Xo,
    Yo,
    Width,
    Height,
    Area,
    Ascender,
    Descender,
    Size,
    FontName,
    RenderFlags,
    CharFlags,
    BidiLevel,
    Alpha,
    RgbColor,
    HorizontalBucket,
    LineId,
    LineNumber,
    BlockId,
    BlockNumber,
    PageNumber,
    PageWidth,
    PageHeight,
}

const ALL_KEYS: &[(Key, &str)] = &[
    (Key::Id, "id"),
    (Key::Number, "number"),
    (Key::Text, "text"),
    (Key::Xl, "xl"),
    (Key::Yt, "yt"),
    (Key::Xr, "xr"),
    (Key::Yb, "yb"),
    (Key::Xc, "xc"),
    (Key::Yc, "yc"),
    (Key::Xo, "xo"),
    (Key::Yo, "yo"),
    (Key::Width, "width"),
    (Key::Height, "height"),
    (Key::Area, "area"),
    (Key::Ascender, "ascender"),
    (Key::Descender, "descender"),
    (Key::Size, "size"),
    (Key::FontName, "font_name"),
    (Key::RenderFlags, "render_flags"),
    (Key::CharFlags, "char_flags"),
    (Key::BidiLevel, "bidi_level"),
    (Key::Alpha, "alpha"),
    (Key::RgbColor, "rgb_color"),
    (Key::HorizontalBucket, "horizontal_bucket"),
    (Key::LineId, "line.id"),
    (Key::LineNumber, "line.number"),
    (Key::BlockId, "block.id"),
    (Key::BlockNumber, "block.number"),
    (Key::PageNumber, "page.number"),
    (Key::PageWidth, "page.width"),
    (Key::PageHeight, "page.height"),
];

impl Key {
    /// The dotted path naming this key.
    pub fn path(self) -> &'static str {
        ALL_KEYS
            .iter()
            .find(|(k, _)| *k == self)
            .map(|(_, p)| *p)
            .unwrap_or("")
    }

    /// Resolve the attribute against a span, walking ancestors as needed.
    pub fn resolve(self, c: &Content) -> Value {
        match self {
            Key::Id => c.id.into(),
            Key::Number => c.number.into(),
            Key::Text => c.text.as_str().into(),
            Key::Xl => c.xl().into(),
            Key::Yt => c.yt().into(),
            Key::Xr => c.xr().into(),
            Key::Yb => c.yb().into(),
            Key::Xc => c.xc().into(),
            Key::Yc => c.yc().into(),
            Key::Xo => c.xo().into(),
            Key::Yo => c.yo().into(),
            Key::Width => c.width().into(),
            Key::Height => c.height().into(),
            Key::Area => c.area().into(),
            Key::Ascender => c.style.ascender.into(),
            Key::Descender => c.style.descender.into(),
            Key::Size => c.style.size.into(),
            Key::FontName => c.style.font_name.as_str().into(),
            Key::RenderFlags => c.style.render_flags.into(),
            Key::CharFlags => c.style.char_flags.into(),
            Key::BidiLevel => c.style.bidi_level.into(),
            Key::Alpha => c.style.alpha.into(),
            Key::RgbColor => c.style.rgb_color.into(),
            Key::HorizontalBucket => c.horizontal_bucket().into(),
            Key::LineId => c.line.id.into(),
            Key::LineNumber => c.line.number.into(),
            Key::BlockId => c.block().id.into(),
            Key::BlockNumber => c.block().number.into(),
            Key::PageNumber => c.page().number.into(),
            Key::PageWidth => c.page().width.into(),
            Key::PageHeight => c.page().height.into(),
        }
    }

    /// Resolve the attribute as a number, failing for text attributes and
    /// for an unassigned bucket.
    pub fn resolve_f64(self, c: &Content) -> Result<f64> {
        self.resolve(c).as_f64().ok_or_else(|| {
            ContentsError::invalid(format!("attribute '{self}' must be int or float"))
        })
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

impl FromStr for Key {
    type Err = ContentsError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        ALL_KEYS
            .iter()
            .find(|(_, p)| *p == s)
            .map(|(k, _)| *k)
            .ok_or_else(|| ContentsError::invalid(format!("unknown attribute '{s}'")))
    }
}

/// An ordered list of keys compared lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortKey(Vec<Key>);

impl SortKey {
    pub fn new(keys: impl Into<Vec<Key>>) -> Self {
        SortKey(keys.into())
    }

    /// Top-to-bottom, left-to-right reading order with block and line as
    /// tie-breakers for spans sharing an origin.
    pub fn reading_order() -> Self {
        SortKey(vec![
            Key::PageNumber,
            Key::Yo,
            Key::Xo,
            Key::BlockId,
            Key::LineId,
        ])
    }

    /// Reading order extended with the style fields that delimit merge runs.
    pub fn join_order() -> Self {
        SortKey(vec![
            Key::PageNumber,
            Key::Yo,
            Key::Xo,
            Key::BlockId,
            Key::LineId,
            Key::RgbColor,
            Key::FontName,
            Key::Size,
        ])
    }

    /// Document structure order.
    pub fn structure_order() -> Self {
        SortKey(vec![Key::PageNumber, Key::BlockId, Key::LineId])
    }

    pub fn id_order() -> Self {
        SortKey(vec![Key::Id])
    }

    pub fn keys(&self) -> &[Key] {
        &self.0
    }

    /// Compare two spans field by field.
    pub fn compare(&self, a: &Content, b: &Content) -> Ordering {
        self.0
            .iter()
            .map(|k| k.resolve(a).total_cmp(&k.resolve(b)))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl Default for SortKey {
    fn default() -> Self {
        SortKey::reading_order()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let paths: Vec<&str> = self.0.iter().map(|k| k.path()).collect();
        write!(f, "({})", paths.join(", "))
    }
}

/// Parses a comma separated list of dotted paths.
impl FromStr for SortKey {
    type Err = ContentsError;

    fn from_str(s: &str) -> Result<Self> {
        let keys = s
            .split(',')
            .filter(|p| !p.trim().is_empty())
            .map(Key::from_str)
            .collect::<Result<Vec<_>>>()?;
        if keys.is_empty() {
            return Err(ContentsError::invalid("sort key can not be empty"));
        }
        Ok(SortKey(keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::*;

    #[test]
    fn test_every_key_round_trips_through_its_path() {
        for (key, path) in ALL_KEYS {
            assert_eq!(key.path(), *path);
            assert_eq!(path.parse::<Key>().unwrap(), *key);
        }
    }

    #[test]
    fn test_unknown_path_is_invalid_argument() {
        let err = "page.colour".parse::<Key>().unwrap_err();
        assert!(matches!(err, ContentsError::InvalidArgument(_)));
    }

    #[test]
    fn test_resolve_reaches_ancestors() {
        let line = line_on(&page(2), 5, 9);
        let c = span(&line, 4, "Total", 10.0, 100.0, 30.0);
        assert_eq!(Key::PageNumber.resolve(&c), Value::Int(2));
        assert_eq!(Key::BlockId.resolve(&c), Value::Int(5));
        assert_eq!(Key::LineId.resolve(&c), Value::Int(9));
        assert_eq!(Key::Id.resolve(&c), Value::Int(4));
        assert_eq!(Key::Text.resolve(&c), Value::Text("Total".to_string()));
        assert_eq!(Key::Xr.resolve(&c), Value::Float(40.0));
        assert_eq!(Key::HorizontalBucket.resolve(&c), Value::Null);
    }

    #[test]
    fn test_resolve_f64_rejects_text_and_unassigned_bucket() {
        let line = line_on(&page(0), 0, 0);
        let c = span(&line, 0, "Total", 10.0, 100.0, 30.0);
        assert!(Key::FontName.resolve_f64(&c).is_err());
        assert!(Key::HorizontalBucket.resolve_f64(&c).is_err());
        c.set_horizontal_bucket(Some(1));
        assert_eq!(Key::HorizontalBucket.resolve_f64(&c).unwrap(), 1.0);
        assert_eq!(Key::Yo.resolve_f64(&c).unwrap(), 100.0);
    }

    #[test]
    fn test_sort_key_parse_and_display() {
        let key: SortKey = "page.number, yo,xo".parse().unwrap();
        assert_eq!(key.keys(), &[Key::PageNumber, Key::Yo, Key::Xo]);
        assert_eq!(key.to_string(), "(page.number, yo, xo)");
        assert!("".parse::<SortKey>().is_err());
        assert!("yo,bogus".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_compare_falls_through_to_later_keys() {
        let p = page(0);
        let a = span(&line_on(&p, 0, 0), 0, "a", 50.0, 100.0, 5.0);
        let b = span(&line_on(&p, 0, 1), 1, "b", 10.0, 100.0, 5.0);
        let key = SortKey::reading_order();
        assert_eq!(key.compare(&a, &b), Ordering::Greater);
        assert_eq!(key.compare(&b, &a), Ordering::Less);
        assert_eq!(key.compare(&a, &a), Ordering::Equal);
    }
}
