//! URL tree serialization.
//!
//! `parse(serialize(t))` reproduces `t` structurally; `serialize(parse(u))`
//! differs from `u` only by documented normalization (empty query dropped,
//! omitted fragment, re-encoded characters).

use super::encoding::{encode_uri_fragment, encode_uri_query, encode_uri_segment};
use super::parser::parse_url;
use super::tree::{UrlSegment, UrlSegmentGroup, UrlTree, PRIMARY_OUTLET};
use crate::errors::UrlParseError;
use crate::params::{ParamMap, QueryParams, QueryValue};

/// Converts between URL strings and [`UrlTree`]s. The router accepts any
/// implementation; [`DefaultUrlSerializer`] implements the standard
/// grammar.
pub trait UrlSerializer: Send + Sync {
    fn parse(&self, url: &str) -> Result<UrlTree, UrlParseError>;
    fn serialize(&self, tree: &UrlTree) -> String;
}

/// The standard serializer for the outlet/matrix-param URL grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultUrlSerializer;

impl UrlSerializer for DefaultUrlSerializer {
    fn parse(&self, url: &str) -> Result<UrlTree, UrlParseError> {
        parse_url(url)
    }

    fn serialize(&self, tree: &UrlTree) -> String {
        serialize_tree(tree)
    }
}

pub(crate) fn serialize_tree(tree: &UrlTree) -> String {
    let segment = format!("/{}", serialize_segment_group(&tree.root, true));
    let query = serialize_query_params(&tree.query_params);
    let fragment = match &tree.fragment {
        Some(f) => format!("#{}", encode_uri_fragment(f)),
        None => String::new(),
    };
    format!("{segment}{query}{fragment}")
}

fn serialize_segment_group(group: &UrlSegmentGroup, root: bool) -> String {
    if !group.has_children() {
        return serialize_paths(group);
    }
    if root {
        let primary = group
            .child(PRIMARY_OUTLET)
            .map(|c| serialize_segment_group(c, false))
            .unwrap_or_default();
        let children: Vec<String> = group
            .children()
            .filter(|(outlet, _)| *outlet != PRIMARY_OUTLET)
            .map(|(outlet, c)| format!("{outlet}:{}", serialize_segment_group(c, false)))
            .collect();
        if children.is_empty() {
            primary
        } else {
            format!("{primary}({})", children.join("//"))
        }
    } else if group.num_children() == 1 && group.child(PRIMARY_OUTLET).is_some() {
        let primary = group
            .child(PRIMARY_OUTLET)
            .map(|c| serialize_segment_group(c, false))
            .expect("primary child present");
        format!("{}/{}", serialize_paths(group), primary)
    } else {
        let children: Vec<String> = group
            .children()
            .map(|(outlet, c)| {
                if outlet == PRIMARY_OUTLET {
                    serialize_segment_group(c, false)
                } else {
                    format!("{outlet}:{}", serialize_segment_group(c, false))
                }
            })
            .collect();
        format!("{}/({})", serialize_paths(group), children.join("//"))
    }
}

fn serialize_paths(group: &UrlSegmentGroup) -> String {
    group
        .segments
        .iter()
        .map(serialize_path)
        .collect::<Vec<_>>()
        .join("/")
}

/// Serialize one segment with its matrix parameters.
pub(crate) fn serialize_path(segment: &UrlSegment) -> String {
    format!(
        "{}{}",
        encode_uri_segment(&segment.path),
        serialize_matrix_params(&segment.parameters)
    )
}

/// Serialize a run of segments, joined by `/`. Used in diagnostics.
pub(crate) fn serialize_segments(segments: &[UrlSegment]) -> String {
    segments
        .iter()
        .map(serialize_path)
        .collect::<Vec<_>>()
        .join("/")
}

fn serialize_matrix_params(params: &ParamMap) -> String {
    params
        .iter()
        .map(|(k, v)| format!(";{}={}", encode_uri_segment(k), encode_uri_segment(v)))
        .collect()
}

fn serialize_query_params(params: &QueryParams) -> String {
    let mut parts = Vec::new();
    for (key, value) in params.iter() {
        match value {
            QueryValue::Single(v) => {
                parts.push(format!("{}={}", encode_uri_query(key), encode_uri_query(v)));
            }
            QueryValue::List(vs) => {
                for v in vs {
                    parts.push(format!("{}={}", encode_uri_query(key), encode_uri_query(v)));
                }
            }
        }
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("?{}", parts.join("&"))
    }
}
