//! Pairwise equivalence tests used by merging and group extraction.

use crate::key::Key;
use crate::model::Content;

/// Round to two decimal places, exact halves to even.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round_ties_even() / 100.0
}

/// Whether `next` continues the run ending at `prev`.
///
/// Every style attribute must match exactly, size and baseline are compared
/// after rounding to two decimals, and both spans must sit on the same line
/// and in the same horizontal bucket (unassigned buckets compare equal).
pub fn is_sequential(next: &Content, prev: &Content) -> bool {
    next.line.id == prev.line.id
        && next.style.font_name == prev.style.font_name
        && next.style.render_flags == prev.style.render_flags
        && next.style.char_flags == prev.style.char_flags
        && next.style.bidi_level == prev.style.bidi_level
        && next.style.alpha == prev.style.alpha
        && next.style.rgb_color == prev.style.rgb_color
        && next.horizontal_bucket() == prev.horizontal_bucket()
        && round2(next.style.size) == round2(prev.style.size)
        && round2(next.yo()) == round2(prev.yo())
}

/// Same page and rounded baselines within `tolerance`.
pub fn is_same_row(a: &Content, b: &Content, tolerance: f64) -> bool {
    a.page().number == b.page().number && (round2(a.yo()) - round2(b.yo())).abs() <= tolerance
}

/// Same page and `key` values within `tolerance`.
///
/// A non-numeric value never matches; callers validate the key up front.
pub fn is_same_attribute(a: &Content, b: &Content, key: Key, tolerance: f64) -> bool {
    if a.page().number != b.page().number {
        return false;
    }
    match (key.resolve(a).as_f64(), key.resolve(b).as_f64()) {
        (Some(x), Some(y)) => (x - y).abs() <= tolerance,
        _ => false,
    }
}

pub fn is_same_block(a: &Content, b: &Content) -> bool {
    a.block().id == b.block().id
}

pub fn is_same_line(a: &Content, b: &Content) -> bool {
    a.line.id == b.line.id
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::geometry::{BBox, Point};
    use crate::model::fixtures::*;
    use crate::model::SpanStyle;

    fn restyled(c: &Content, f: impl FnOnce(&mut SpanStyle)) -> Content {
        let mut style = c.style.clone();
        f(&mut style);
        Content::new(c.line.clone(), c.id + 1, c.number, "x", c.bbox, c.origin, style)
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(100.001), 100.0);
        assert_eq!(round2(100.004), 100.0);
        assert_eq!(round2(9.996), 10.0);
        assert_eq!(round2(-1.234), -1.23);
        assert_eq!(round2(100.125), 100.12);
        assert_eq!(round2(100.375), 100.38);
    }

    #[test]
    fn test_half_point_baselines_share_a_row() {
        let line = line_on(&page(0), 0, 0);
        let a = span(&line, 0, "a", 40.0, 100.125, 5.0);
        let b = span(&line, 1, "b", 10.0, 100.12, 5.0);
        assert!(is_same_row(&a, &b, 0.0));
        assert!(is_sequential(&a, &b));
    }

    #[test]
    fn test_sequential_identical_style() {
        let line = line_on(&page(0), 0, 0);
        let a = span(&line, 0, "Hello", 10.0, 100.0, 20.0);
        let b = span(&line, 1, "World", 35.0, 100.004, 20.0);
        assert!(is_sequential(&b, &a));
    }

    #[test]
    fn test_sequential_breaks_on_each_style_field() {
        let line = line_on(&page(0), 0, 0);
        let a = span(&line, 0, "Hello", 10.0, 100.0, 20.0);

        assert!(!is_sequential(&restyled(&a, |s| s.font_name = "Times".into()), &a));
        assert!(!is_sequential(&restyled(&a, |s| s.render_flags = 16), &a));
        assert!(!is_sequential(&restyled(&a, |s| s.char_flags = 0), &a));
        assert!(!is_sequential(&restyled(&a, |s| s.bidi_level = 1), &a));
        assert!(!is_sequential(&restyled(&a, |s| s.alpha = 128), &a));
        assert!(!is_sequential(&restyled(&a, |s| s.rgb_color = 0xff0000), &a));
        assert!(!is_sequential(&restyled(&a, |s| s.size = 10.5), &a));
        assert!(is_sequential(&restyled(&a, |s| s.size = 10.001), &a));
    }

    #[test]
    fn test_sequential_breaks_on_line_bucket_and_baseline() {
        let p = page(0);
        let line = line_on(&p, 0, 0);
        let a = span(&line, 0, "Hello", 10.0, 100.0, 20.0);

        let other_line = span(&line_on(&p, 0, 1), 1, "World", 35.0, 100.0, 20.0);
        assert!(!is_sequential(&other_line, &a));

        let lower = span(&line, 2, "World", 35.0, 100.02, 20.0);
        assert!(!is_sequential(&lower, &a));

        let bucketed = span(&line, 3, "World", 35.0, 100.0, 20.0);
        bucketed.set_horizontal_bucket(Some(1));
        assert!(!is_sequential(&bucketed, &a));
        a.set_horizontal_bucket(Some(1));
        assert!(is_sequential(&bucketed, &a));
    }

    #[test]
    fn test_same_row_tolerance() {
        let line = line_on(&page(0), 0, 0);
        let a = span(&line, 0, "a", 10.0, 100.001, 5.0);
        let b = span(&line, 1, "b", 50.0, 100.004, 5.0);
        let c = span(&line, 2, "c", 90.0, 100.5, 5.0);
        assert!(is_same_row(&a, &b, 0.0));
        assert!(is_same_row(&a, &b, 0.01));
        assert!(!is_same_row(&a, &c, 0.01));
        assert!(is_same_row(&a, &c, 0.5));
    }

    #[test]
    fn test_same_row_requires_same_page() {
        let a = span(&line_on(&page(0), 0, 0), 0, "a", 10.0, 100.0, 5.0);
        let b = span(&line_on(&page(1), 1, 1), 1, "b", 10.0, 100.0, 5.0);
        assert!(!is_same_row(&a, &b, 1.0));
    }

    #[test]
    fn test_same_attribute() {
        let line = line_on(&page(0), 0, 0);
        let a = span(&line, 0, "a", 10.0, 100.0, 5.0);
        let b = span(&line, 1, "b", 12.0, 300.0, 5.0);
        assert!(is_same_attribute(&a, &b, Key::Xl, 2.0));
        assert!(!is_same_attribute(&a, &b, Key::Xl, 1.9));
        assert!(!is_same_attribute(&a, &b, Key::FontName, 100.0));
    }

    #[test]
    fn test_same_block_and_line() {
        let p = page(0);
        let block_bbox = BBox::new(0.0, 0.0, 10.0, 10.0).unwrap();
        let l1 = line_on(&p, 4, 1);
        let l2 = Rc::new(crate::model::Line::new(l1.block.clone(), 2, 1, block_bbox));
        let a = span(&l1, 0, "a", 0.0, 5.0, 1.0);
        let b = Rc::new(Content::new(l2, 1, 0, "b", block_bbox, Point::new(0.0, 5.0), style()));
        assert!(is_same_block(&a, &b));
        assert!(!is_same_line(&a, &b));
        assert!(is_same_line(&a, &a));
    }
}
