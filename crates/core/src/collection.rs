//! [`ContentCollection`]: an ordered, list-like container of spans with cached
//! derived state.
//!
//! The collection remembers three things about its current contents:
//!
//! | Cache               | Set by                          | Cleared by                          |
//! |---------------------|---------------------------------|-------------------------------------|
//! | `sorted_by`         | [`sort`], [`join`]              | `push`, `insert`, `remove`, `extend`, `retain`, `clear` |
//! | `is_joined`         | [`join`]                        | the above, and a bucket assignment that runs |
//! | `bucket_delimiters` | [`assign_horizontal_bucket`]    | the above list mutators             |
//!
//! Spans are held through [`Rc`], so cloning a collection is shallow: the
//! clone owns an independent ordering and cache state but shares the span
//! objects, including their mutable horizontal bucket.
//!
//! [`sort`]: ContentCollection::sort
//! [`join`]: ContentCollection::join
//! [`assign_horizontal_bucket`]: ContentCollection::assign_horizontal_bucket

use std::ops::Index;
use std::rc::Rc;

use log::{debug, trace};

use crate::error::{ContentsError, Result};
use crate::flat::{FlatMap, Flatten};
use crate::geometry::{BBox, Geometry, Point};
use crate::key::{Key, SortKey};
use crate::model::Content;
use crate::pattern::Pattern;
use crate::predicate;

#[derive(Debug, Clone, Default)]
pub struct ContentCollection {
    items: Vec<Rc<Content>>,
    sorted_by: Option<SortKey>,
    is_joined: bool,
    bucket_delimiters: Option<Vec<f64>>,
}

impl ContentCollection {
    pub fn new(items: Vec<Rc<Content>>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    // -- cache accessors ----------------------------------------------------

    /// The key of the last sort applied, if the order is still known.
    pub fn sorted_by(&self) -> Option<&SortKey> {
        self.sorted_by.as_ref()
    }

    pub fn is_joined(&self) -> bool {
        self.is_joined
    }

    /// Delimiters of the last bucket assignment still in effect.
    pub fn bucket_delimiters(&self) -> Option<&[f64]> {
        self.bucket_delimiters.as_deref()
    }

    // -- list behaviour -----------------------------------------------------

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Rc<Content>> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rc<Content>> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Rc<Content>] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<Rc<Content>> {
        self.items
    }

    pub fn push(&mut self, content: Rc<Content>) {
        self.items.push(content);
        self.invalidate();
    }

    pub fn insert(&mut self, index: usize, content: Rc<Content>) {
        self.items.insert(index, content);
        self.invalidate();
    }

    pub fn remove(&mut self, index: usize) -> Rc<Content> {
        let removed = self.items.remove(index);
        self.invalidate();
        removed
    }

    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&Rc<Content>) -> bool,
    {
        self.items.retain(f);
        self.invalidate();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.sorted_by = None;
        self.is_joined = false;
        self.bucket_delimiters = None;
    }

    /// Flat records of every span, in collection order.
    pub fn records(&self) -> Vec<FlatMap> {
        self.items.iter().map(|c| c.flat_map()).collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.items.iter().map(|c| c.text.as_str()).collect()
    }

    // -- sort ---------------------------------------------------------------

    /// Stable in-place sort on `by`.
    ///
    /// With `use_cache`, a request for the key that produced the current order
    /// returns without touching the backing storage.
    pub fn sort(&mut self, by: &SortKey, use_cache: bool) {
        if use_cache && self.sorted_by.as_ref() == Some(by) {
            debug!("sort by {by}: already sorted, skipping");
            return;
        }
        debug!("sort by {by}: {} contents", self.items.len());
        self.items.sort_by(|a, b| by.compare(a, b));
        self.sorted_by = Some(by.clone());
    }

    /// Copy, then [`sort`](Self::sort) the copy.
    pub fn sorted(&self, by: &SortKey, use_cache: bool) -> Self {
        let mut copy = self.clone();
        copy.sort(by, use_cache);
        copy
    }

    // -- join ---------------------------------------------------------------

    /// Collapse runs of sequential spans into single synthesized spans.
    ///
    /// Spans are ordered by [`SortKey::join_order`], then every maximal chain
    /// of adjacent spans where each one [is sequential](predicate::is_sequential)
    /// with its predecessor becomes one span. Merged ids are dense from zero
    /// in emission order. The result is re-sorted with the key that was in
    /// effect before the call, or [`SortKey::structure_order`] when none was.
    pub fn join(&mut self, use_cache: bool) {
        if use_cache && self.is_joined {
            debug!("join: already joined, skipping");
            return;
        }

        let restore = self
            .sorted_by
            .clone()
            .unwrap_or_else(SortKey::structure_order);

        self.sort(&SortKey::join_order(), use_cache);

        let before = self.items.len();
        let merged: Vec<Rc<Content>> = self
            .items
            .chunk_by(|prev, next| predicate::is_sequential(next, prev))
            .enumerate()
            .map(|(id, run)| Rc::new(merge_run(run, id)))
            .collect();
        debug!("join: {before} contents merged into {}", merged.len());

        self.items = merged;
        self.sorted_by = None;
        self.sort(&restore, false);
        self.is_joined = true;
    }

    /// Copy, then [`join`](Self::join) the copy.
    pub fn joined(&self, use_cache: bool) -> Self {
        let mut copy = self.clone();
        copy.join(use_cache);
        copy
    }

    // -- horizontal buckets -------------------------------------------------

    /// Assign every span the index of the first delimiter at or right of its
    /// left edge, or `delimiters.len()` when it lies right of all of them.
    ///
    /// Delimiters must be finite and ascending. Bucket values live on the
    /// shared spans, so every collection aliasing them sees the new value.
    pub fn assign_horizontal_bucket(&mut self, delimiters: &[f64], use_cache: bool) -> Result<()> {
        if delimiters.iter().any(|d| !d.is_finite()) {
            return Err(ContentsError::invalid("bucket delimiters must be finite"));
        }
        if delimiters.windows(2).any(|w| w[0] > w[1]) {
            return Err(ContentsError::invalid(format!(
                "bucket delimiters must be ascending, got {delimiters:?}"
            )));
        }
        if use_cache && self.bucket_delimiters.as_deref() == Some(delimiters) {
            debug!("assign buckets {delimiters:?}: already assigned, skipping");
            return Ok(());
        }

        for content in &self.items {
            content.set_horizontal_bucket(Some(bucket_for(content.xl(), delimiters)));
        }
        self.bucket_delimiters = Some(delimiters.to_vec());
        // New buckets may split or unite runs.
        self.is_joined = false;
        Ok(())
    }

    /// Copy, then [`assign_horizontal_bucket`](Self::assign_horizontal_bucket)
    /// on the copy. The spans are shared, so their buckets change for the
    /// receiver too.
    pub fn horizontal_bucket_assigned(&self, delimiters: &[f64], use_cache: bool) -> Result<Self> {
        let mut copy = self.clone();
        copy.assign_horizontal_bucket(delimiters, use_cache)?;
        Ok(copy)
    }

    // -- group extraction ---------------------------------------------------

    /// Spans on the reference's page whose `key` lies within `tolerance` of
    /// the reference's value.
    ///
    /// Only the first contiguous band in `(page.number, key)` order is
    /// returned, not every match.
    pub fn contents_matching_attribute(
        &self,
        ref_index: usize,
        key: Key,
        tolerance: f64,
    ) -> Result<Self> {
        check_tolerance(tolerance)?;
        let reference = self.reference(ref_index)?;
        key.resolve_f64(reference)?;

        let order = SortKey::new([Key::PageNumber, key]);
        self.extract_band(
            &order,
            |c| predicate::is_same_attribute(c, reference, key, tolerance),
            |c, _| predicate::is_same_attribute(c, reference, key, tolerance),
            "attribute",
        )
    }

    /// Spans on the reference's page whose rounded baseline lies within
    /// `tolerance` of the reference's.
    pub fn contents_matching_row(&self, ref_index: usize, tolerance: f64) -> Result<Self> {
        check_tolerance(tolerance)?;
        let reference = self.reference(ref_index)?;

        let order = SortKey::new([Key::PageNumber, Key::Yo]);
        self.extract_band(
            &order,
            |c| predicate::is_same_row(c, reference, tolerance),
            |c, _| predicate::is_same_row(c, reference, tolerance),
            "row",
        )
    }

    /// Spans of the reference's block.
    pub fn contents_from_same_block(&self, ref_index: usize) -> Result<Self> {
        let reference = self.reference(ref_index)?;
        let order = SortKey::new([Key::PageNumber, Key::BlockId]);
        self.extract_band(
            &order,
            |c| predicate::is_same_block(c, reference),
            predicate::is_same_block,
            "block",
        )
    }

    /// Spans of the reference's line.
    pub fn contents_from_same_line(&self, ref_index: usize) -> Result<Self> {
        let reference = self.reference(ref_index)?;
        let order = SortKey::new([Key::PageNumber, Key::LineId]);
        self.extract_band(
            &order,
            |c| predicate::is_same_line(c, reference),
            predicate::is_same_line,
            "line",
        )
    }

    fn reference(&self, index: usize) -> Result<&Rc<Content>> {
        self.items.get(index).ok_or_else(|| {
            ContentsError::invalid(format!(
                "reference index {index} out of range for {} contents",
                self.items.len()
            ))
        })
    }

    /// Sort a working copy by `order`, skip to the first span satisfying
    /// `starts`, then collect while `continues(span, previous)` holds.
    ///
    /// The band is returned in this collection's cached order, or by id.
    fn extract_band<S, C>(&self, order: &SortKey, starts: S, continues: C, what: &str) -> Result<Self>
    where
        S: Fn(&Content) -> bool,
        C: Fn(&Content, &Content) -> bool,
    {
        let working = self.sorted(order, true);
        let items = working.as_slice();

        let first = items
            .iter()
            .position(|c| starts(c.as_ref()))
            .ok_or_else(|| ContentsError::ReferenceNotFound(what.to_string()))?;

        let mut end = first + 1;
        while end < items.len() && continues(items[end].as_ref(), items[end - 1].as_ref()) {
            end += 1;
        }
        trace!("{what} band: {first}..{end} of {}", items.len());

        let mut band = ContentCollection::new(items[first..end].to_vec());
        let restore = self.sorted_by.clone().unwrap_or_else(SortKey::id_order);
        band.sort(&restore, true);
        Ok(band)
    }

    // -- pattern matching ---------------------------------------------------

    /// True when every pattern is satisfied by at least one span.
    pub fn matches_known_patterns(&self, patterns: &[Pattern], exact_text: bool) -> bool {
        patterns
            .iter()
            .all(|p| self.items.iter().any(|c| p.matches(c, exact_text)))
    }
}

/// Index of the horizontal zone `x` falls into.
pub fn bucket_for(x: f64, delimiters: &[f64]) -> usize {
    delimiters
        .iter()
        .position(|d| x <= *d)
        .unwrap_or(delimiters.len())
}

fn check_tolerance(tolerance: f64) -> Result<()> {
    if tolerance.is_nan() || tolerance < 0.0 {
        return Err(ContentsError::invalid(format!(
            "tolerance can not be less than zero, got {tolerance}"
        )));
    }
    Ok(())
}

/// Synthesize one span from a non-empty run.
fn merge_run(run: &[Rc<Content>], id: usize) -> Content {
    let first = &run[0];
    let bbox = BBox::union(run.iter().map(|c| c.bbox)).unwrap_or(first.bbox);
    let text = run
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();
    let number = run.iter().map(|c| c.number).min().unwrap_or(first.number);
    let origin = Point::new(
        run.iter().map(|c| c.xo()).fold(f64::INFINITY, f64::min),
        run.iter().map(|c| c.yo()).fold(f64::INFINITY, f64::min),
    );

    let mut style = first.style.clone();
    style.ascender = run
        .iter()
        .map(|c| c.style.ascender)
        .fold(f64::NEG_INFINITY, f64::max);
    style.descender = run
        .iter()
        .map(|c| c.style.descender)
        .fold(f64::INFINITY, f64::min);

    trace!("merged {} contents into {id}: {text:?}", run.len());
    Content::new(first.line.clone(), id, number, text, bbox, origin, style)
        .with_bucket(first.horizontal_bucket())
}

impl From<Vec<Rc<Content>>> for ContentCollection {
    fn from(items: Vec<Rc<Content>>) -> Self {
        ContentCollection::new(items)
    }
}

impl FromIterator<Rc<Content>> for ContentCollection {
    fn from_iter<I: IntoIterator<Item = Rc<Content>>>(iter: I) -> Self {
        ContentCollection::new(iter.into_iter().collect())
    }
}

impl Extend<Rc<Content>> for ContentCollection {
    fn extend<I: IntoIterator<Item = Rc<Content>>>(&mut self, iter: I) {
        self.items.extend(iter);
        self.invalidate();
    }
}

impl Index<usize> for ContentCollection {
    type Output = Rc<Content>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}

impl<'a> IntoIterator for &'a ContentCollection {
    type Item = &'a Rc<Content>;
    type IntoIter = std::slice::Iter<'a, Rc<Content>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for ContentCollection {
    type Item = Rc<Content>;
    type IntoIter = std::vec::IntoIter<Rc<Content>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
