//! URL tree model: segments, segment groups and the tree itself.
//!
//! A parsed URL is a tree of [`UrlSegmentGroup`]s. Each group holds an
//! ordered run of [`UrlSegment`]s plus a map from outlet name to child
//! group; the reserved outlet name [`PRIMARY_OUTLET`] denotes the default
//! outlet. Groups keep a non-owning back-reference to their parent,
//! established when they are installed as a child, so trees stay acyclic
//! from an ownership point of view.

use crate::params::{params_shallow_eq, ParamMap, QueryParams};
use std::sync::{Arc, RwLock, Weak};

/// The name of the default outlet.
pub const PRIMARY_OUTLET: &str = "primary";

/// A single URL segment: a path plus its matrix parameters.
/// Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlSegment {
    /// The decoded path of the segment
    pub path: String,
    /// Matrix parameters attached with `;key=value`
    pub parameters: ParamMap,
}

impl UrlSegment {
    pub fn new(path: impl Into<String>) -> Self {
        UrlSegment {
            path: path.into(),
            parameters: ParamMap::new(),
        }
    }

    pub fn with_parameters(path: impl Into<String>, parameters: ParamMap) -> Self {
        UrlSegment {
            path: path.into(),
            parameters,
        }
    }

    /// Look up a matrix parameter on this segment.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name)
    }
}

/// Paths-only equality of two segment runs.
pub(crate) fn equal_path(a: &[UrlSegment], b: &[UrlSegment]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.path == y.path)
}

/// Path and matrix-parameter equality of two segment runs (parameters
/// compared as key sets).
pub(crate) fn equal_segments(a: &[UrlSegment], b: &[UrlSegment]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(x, y)| x.path == y.path && params_shallow_eq(&x.parameters, &y.parameters))
}

/// An ordered run of segments plus child groups keyed by outlet name.
///
/// Children are insertion-ordered. The parent back-reference is weak; the
/// tree owns its nodes strictly top-down.
#[derive(Debug)]
pub struct UrlSegmentGroup {
    /// The segments of this group, in path order
    pub segments: Vec<UrlSegment>,
    children: Vec<(String, Arc<UrlSegmentGroup>)>,
    parent: RwLock<Weak<UrlSegmentGroup>>,
    // Recognition bookkeeping: groups synthesized by `split` remember the
    // group they were carved from and how many segments the carve skipped,
    // so snapshots can locate their position in the original tree.
    pub(crate) source_segment: Option<Arc<UrlSegmentGroup>>,
    pub(crate) segment_index_shift: usize,
}

impl UrlSegmentGroup {
    /// Create a group and install the given children, fixing up their
    /// parent back-references.
    pub fn new(
        segments: Vec<UrlSegment>,
        children: Vec<(String, Arc<UrlSegmentGroup>)>,
    ) -> Arc<Self> {
        Self::build(segments, children, None, 0)
    }

    /// An empty group with no segments and no children.
    pub fn empty() -> Arc<Self> {
        Self::new(Vec::new(), Vec::new())
    }

    pub(crate) fn with_source(
        segments: Vec<UrlSegment>,
        children: Vec<(String, Arc<UrlSegmentGroup>)>,
        source: Arc<UrlSegmentGroup>,
        segment_index_shift: usize,
    ) -> Arc<Self> {
        Self::build(segments, children, Some(source), segment_index_shift)
    }

    fn build(
        segments: Vec<UrlSegment>,
        children: Vec<(String, Arc<UrlSegmentGroup>)>,
        source_segment: Option<Arc<UrlSegmentGroup>>,
        segment_index_shift: usize,
    ) -> Arc<Self> {
        let group = Arc::new(UrlSegmentGroup {
            segments,
            children,
            parent: RwLock::new(Weak::new()),
            source_segment,
            segment_index_shift,
        });
        for (_, child) in &group.children {
            *child.parent.write().expect("segment group lock poisoned") = Arc::downgrade(&group);
        }
        group
    }

    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    #[must_use]
    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// The child group installed under `outlet`, if any.
    #[must_use]
    pub fn child(&self, outlet: &str) -> Option<&Arc<UrlSegmentGroup>> {
        self.children
            .iter()
            .find(|(name, _)| name == outlet)
            .map(|(_, g)| g)
    }

    /// Children in insertion order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &Arc<UrlSegmentGroup>)> {
        self.children.iter().map(|(name, g)| (name.as_str(), g))
    }

    /// Outlet names with the primary outlet first, the rest in insertion
    /// order. Expansion visits children in this order.
    #[must_use]
    pub fn outlets_primary_first(&self) -> Vec<String> {
        let mut outlets = Vec::with_capacity(self.children.len());
        for (name, _) in &self.children {
            if name == PRIMARY_OUTLET {
                outlets.insert(0, name.clone());
            } else {
                outlets.push(name.clone());
            }
        }
        outlets
    }

    /// The parent group, if this group is currently installed in a tree.
    #[must_use]
    pub fn parent(&self) -> Option<Arc<UrlSegmentGroup>> {
        self.parent
            .read()
            .expect("segment group lock poisoned")
            .upgrade()
    }
}

impl PartialEq for UrlSegmentGroup {
    /// Structural equality: segments and children (by outlet name, any
    /// order). Parent back-references are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .all(|(name, child)| other.child(name).is_some_and(|oc| **child == **oc))
    }
}

impl Eq for UrlSegmentGroup {}

/// Walk `source_segment` references back to the group that exists in the
/// parsed URL tree.
pub(crate) fn source_group(group: &Arc<UrlSegmentGroup>) -> Arc<UrlSegmentGroup> {
    let mut current = Arc::clone(group);
    while let Some(source) = current.source_segment.clone() {
        current = source;
    }
    current
}

/// Accumulated segment-index shift of a (possibly synthesized) group,
/// relative to its source group. `-1` means "before the first segment".
pub(crate) fn path_index_shift(group: &Arc<UrlSegmentGroup>) -> isize {
    let mut current = Arc::clone(group);
    let mut shift = current.segment_index_shift as isize;
    while let Some(source) = current.source_segment.clone() {
        current = source;
        shift += current.segment_index_shift as isize;
    }
    shift - 1
}

/// A whole parsed URL: root segment group, query parameters and fragment.
#[derive(Debug, Clone)]
pub struct UrlTree {
    /// The root segment group. The root never carries segments itself.
    pub root: Arc<UrlSegmentGroup>,
    /// Decoded query parameters
    pub query_params: QueryParams,
    /// Decoded fragment, without the `#`
    pub fragment: Option<String>,
}

impl UrlTree {
    /// The tree of the empty URL `/`.
    #[must_use]
    pub fn empty() -> Self {
        UrlTree {
            root: UrlSegmentGroup::empty(),
            query_params: QueryParams::new(),
            fragment: None,
        }
    }

    pub fn new(
        root: Arc<UrlSegmentGroup>,
        query_params: QueryParams,
        fragment: Option<String>,
    ) -> Self {
        UrlTree {
            root,
            query_params,
            fragment,
        }
    }
}

impl PartialEq for UrlTree {
    fn eq(&self, other: &Self) -> bool {
        *self.root == *other.root
            && crate::params::query_shallow_eq(&self.query_params, &other.query_params)
            && self.fragment == other.fragment
    }
}

impl Eq for UrlTree {}

impl std::fmt::Display for UrlTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", super::serializer::serialize_tree(self))
    }
}

/// Whether `container` contains `containee`.
///
/// With `exact` the trees must match segment-for-segment (including query
/// params); otherwise `containee` may be a prefix of `container` along the
/// primary chain and a subset of its query params. Used for "is this URL
/// currently active" checks.
#[must_use]
pub fn contains_tree(container: &UrlTree, containee: &UrlTree, exact: bool) -> bool {
    if exact {
        query_equal_exact(&container.query_params, &containee.query_params)
            && equal_segment_groups(&container.root, &containee.root)
    } else {
        containee
            .query_params
            .iter()
            .all(|(k, v)| container.query_params.get_all(k).map(|vs| vs == v.all()).unwrap_or(false))
            && contains_segment_group(&container.root, &containee.root, &containee.root.segments)
    }
}

fn query_equal_exact(a: &QueryParams, b: &QueryParams) -> bool {
    crate::params::query_shallow_eq(a, b)
}

fn equal_segment_groups(container: &UrlSegmentGroup, containee: &UrlSegmentGroup) -> bool {
    if !equal_path(&container.segments, &containee.segments) {
        return false;
    }
    if container.num_children() != containee.num_children() {
        return false;
    }
    containee.children().all(|(outlet, child)| {
        container
            .child(outlet)
            .is_some_and(|c| equal_segment_groups(c, child))
    })
}

fn contains_segment_group(
    container: &UrlSegmentGroup,
    containee: &UrlSegmentGroup,
    containee_paths: &[UrlSegment],
) -> bool {
    if container.segments.len() > containee_paths.len() {
        let current = &container.segments[..containee_paths.len()];
        if !equal_path(current, containee_paths) {
            return false;
        }
        !containee.has_children()
    } else if container.segments.len() == containee_paths.len() {
        if !equal_path(&container.segments, containee_paths) {
            return false;
        }
        containee.children().all(|(outlet, child)| {
            container
                .child(outlet)
                .is_some_and(|c| contains_segment_group(c, child, &child.segments))
        })
    } else {
        let current = &containee_paths[..container.segments.len()];
        let next = &containee_paths[container.segments.len()..];
        if !equal_path(&container.segments, current) {
            return false;
        }
        match container.child(PRIMARY_OUTLET) {
            Some(primary) => contains_segment_group(primary, containee, next),
            None => false,
        }
    }
}
