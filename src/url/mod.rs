//! # URL Module
//!
//! The url module provides the URL tree model, the parser/serializer pair
//! and the command-list tree builder.
//!
//! ## Overview
//!
//! URLs handled by the router are richer than plain paths: a URL carries a
//! primary segment chain, parenthesized secondary outlets, matrix
//! parameters on individual segments, query parameters and a fragment:
//!
//! ```text
//! /inbox/33;open=true(popup:compose)?debug=true#top
//! ```
//!
//! Parsing produces a [`UrlTree`]; serialization is its inverse modulo
//! normalization (an empty query and an absent fragment emit nothing, and
//! characters re-encode canonically).
//!
//! ## Example
//!
//! ```rust
//! use wayfinder::url::{DefaultUrlSerializer, UrlSerializer, PRIMARY_OUTLET};
//!
//! let serializer = DefaultUrlSerializer;
//! let tree = serializer.parse("/inbox/33(popup:compose)?debug=true").unwrap();
//! let primary = tree.root.child(PRIMARY_OUTLET).unwrap();
//! assert_eq!(primary.segments[0].path, "inbox");
//! assert_eq!(serializer.serialize(&tree), "/inbox/33(popup:compose)?debug=true");
//! ```

mod builder;
mod encoding;
mod parser;
mod serializer;
mod tree;
#[cfg(test)]
mod tests;

pub use builder::{create_url_tree, Command};
pub use serializer::{DefaultUrlSerializer, UrlSerializer};
pub use tree::{contains_tree, UrlSegment, UrlSegmentGroup, UrlTree, PRIMARY_OUTLET};

pub(crate) use serializer::{serialize_path, serialize_segments, serialize_tree};
pub(crate) use tree::{equal_path, equal_segments, path_index_shift, source_group};
