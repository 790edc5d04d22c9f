//! Single-level key/value projection of an entity and all its ancestors.
//!
//! Own fields are unprefixed; each ancestor's fields carry its type name and
//! an underscore (`line_xl`, `block_id`, `page_number`). Prefixing is applied
//! from the top of the hierarchy down, so a content map never has colliding
//! keys.

use std::collections::BTreeMap;

use crate::geometry::Geometry;
use crate::model::{Block, Content, Line, Page};
use crate::value::Value;

pub type FlatMap = BTreeMap<String, Value>;

pub trait Flatten {
    fn flat_map(&self) -> FlatMap;
}

/// Move every key of `ancestor` that is not already owned by a higher level
/// into `target` under `prefix`.
fn merge_prefixed(target: &mut FlatMap, ancestor: FlatMap, prefix: &str, keep: &[&str]) {
    for (key, value) in ancestor {
        if keep.iter().any(|p| key.starts_with(p)) {
            target.insert(key, value);
        } else {
            target.insert(format!("{prefix}_{key}"), value);
        }
    }
}

fn insert_bbox<G: Geometry>(map: &mut FlatMap, g: &G) {
    map.insert("xl".into(), g.xl().into());
    map.insert("yt".into(), g.yt().into());
    map.insert("xr".into(), g.xr().into());
    map.insert("yb".into(), g.yb().into());
    map.insert("xc".into(), g.xc().into());
    map.insert("yc".into(), g.yc().into());
}

fn insert_extent<G: Geometry>(map: &mut FlatMap, g: &G) {
    map.insert("width".into(), g.width().into());
    map.insert("height".into(), g.height().into());
    map.insert("area".into(), g.area().into());
}

impl Flatten for Page {
    fn flat_map(&self) -> FlatMap {
        let mut map = FlatMap::new();
        map.insert("number".into(), self.number.into());
        map.insert("width".into(), self.width.into());
        map.insert("height".into(), self.height.into());
        map
    }
}

impl Flatten for Block {
    fn flat_map(&self) -> FlatMap {
        let mut map = FlatMap::new();
        map.insert("id".into(), self.id.into());
        map.insert("number".into(), self.number.into());
        insert_bbox(&mut map, self);
        merge_prefixed(&mut map, self.page.flat_map(), "page", &[]);
        map
    }
}

impl Flatten for Line {
    fn flat_map(&self) -> FlatMap {
        let mut map = FlatMap::new();
        map.insert("id".into(), self.id.into());
        map.insert("number".into(), self.number.into());
        insert_bbox(&mut map, self);
        insert_extent(&mut map, self);
        merge_prefixed(&mut map, self.block.flat_map(), "block", &["page_"]);
        map
    }
}

impl Flatten for Content {
    fn flat_map(&self) -> FlatMap {
        let mut map = FlatMap::new();
        map.insert("id".into(), self.id.into());
        map.insert("number".into(), self.number.into());
        map.insert("text".into(), self.text.as_str().into());
        insert_bbox(&mut map, self);
        map.insert("xo".into(), self.xo().into());
        map.insert("yo".into(), self.yo().into());
        insert_extent(&mut map, self);
        map.insert("ascender".into(), self.style.ascender.into());
        map.insert("descender".into(), self.style.descender.into());
        map.insert("size".into(), self.style.size.into());
        map.insert("font_name".into(), self.style.font_name.as_str().into());
        map.insert("render_flags".into(), self.style.render_flags.into());
        map.insert("char_flags".into(), self.style.char_flags.into());
        map.insert("bidi_level".into(), self.style.bidi_level.into());
        map.insert("alpha".into(), self.style.alpha.into());
        map.insert("rgb_color".into(), self.style.rgb_color.into());
        map.insert(
            "horizontal_bucket".into(),
            self.horizontal_bucket().into(),
        );
        merge_prefixed(&mut map, self.line.flat_map(), "line", &["page_", "block_"]);
        map
    }
}
