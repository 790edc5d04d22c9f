//! Core library for pdfcontents
//!
//! This crate implements the **Functional Core** of pdfcontents: the content
//! model of positioned text spans and the collection engine that sorts,
//! merges, buckets and groups them. It performs no I/O. Text extraction from
//! PDF files lives in the `pdf` crate and user interaction in the
//! `pdfcontents` binary.
//!
//! # Model
//!
//! A document is a four-level hierarchy, page → block → line → span. Every
//! level carries a bounding box in top-left page coordinates; spans
//! additionally carry their text, baseline origin and style. Children hold
//! shared handles to their ancestors, so a span can answer "which page am I
//! on" without a back-reference from the page.
//!
//! # Module Organization
//!
//! - [`geometry`]: bounding boxes and derived coordinates
//! - [`model`]: pages, blocks, lines and content spans
//! - [`value`]: scalar attribute values
//! - [`key`]: attribute keys and sort keys
//! - [`flat`]: prefixed single-level views of an entity and its ancestors
//! - [`predicate`]: pairwise span equivalences
//! - [`collection`]: the [`ContentCollection`] engine
//! - [`pattern`]: known-document patterns
//! - [`ingest`]: building a collection from backend records
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use pdfcontents_core::{build_contents, Key, SortKey};
//!
//! let mut contents = build_contents(&pages)?;
//! contents.assign_horizontal_bucket(&[200.0, 400.0], true)?;
//! contents.join(true);
//! contents.sort(&SortKey::reading_order(), true);
//!
//! let row = contents.contents_matching_row(0, 0.5)?;
//! let column = contents.contents_matching_attribute(0, Key::Xl, 1.0)?;
//! ```

pub mod collection;
pub mod error;
pub mod flat;
pub mod geometry;
pub mod ingest;
pub mod key;
pub mod model;
pub mod pattern;
pub mod predicate;
pub mod value;

pub use collection::ContentCollection;
pub use error::{ContentsError, Result};
pub use flat::{FlatMap, Flatten};
pub use geometry::{BBox, Geometry, Point};
pub use ingest::{build_contents, RawBlock, RawLine, RawPage, RawSpan};
pub use key::{Key, SortKey};
pub use model::{Block, Content, Line, Page, SpanStyle};
pub use pattern::{patterns_from_json, Pattern};
pub use value::Value;
