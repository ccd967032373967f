//! Frozen per-navigation route state.
//!
//! An [`ActivatedRouteSnapshot`] records what one route matched during a
//! navigation: the consumed URL segments, merged params, shared query
//! params and fragment, static plus resolved data, and the position inside
//! the parsed URL tree that later relative navigations start from.
//! Snapshots form a tree owned top-down; parent lookups walk from the
//! root instead of following stored back-pointers.

use crate::config::{ComponentId, Route};
use crate::params::{Data, ParamMap, QueryParams};
use crate::url::{serialize_segments, UrlSegment, UrlSegmentGroup};
use std::fmt;
use std::sync::{Arc, RwLock};

/// The frozen record of one matched route within a navigation.
pub struct ActivatedRouteSnapshot {
    url: Vec<UrlSegment>,
    params: RwLock<ParamMap>,
    query_params: QueryParams,
    fragment: Option<String>,
    data: RwLock<Data>,
    outlet: String,
    component: Option<ComponentId>,
    route_config: Option<Arc<Route>>,
    children: Vec<Arc<ActivatedRouteSnapshot>>,
    // Position bookkeeping for relative navigation: the segment group this
    // snapshot consumed from, and the index of the last consumed segment
    // within the source group (-1 when nothing was consumed).
    pub(crate) url_segment_group: Arc<UrlSegmentGroup>,
    pub(crate) last_path_index: isize,
    pub(crate) resolved_data: RwLock<Data>,
}

impl ActivatedRouteSnapshot {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        url: Vec<UrlSegment>,
        params: ParamMap,
        query_params: QueryParams,
        fragment: Option<String>,
        data: Data,
        outlet: String,
        component: Option<ComponentId>,
        route_config: Option<Arc<Route>>,
        url_segment_group: Arc<UrlSegmentGroup>,
        last_path_index: isize,
        children: Vec<Arc<ActivatedRouteSnapshot>>,
    ) -> Arc<Self> {
        Arc::new(ActivatedRouteSnapshot {
            url,
            params: RwLock::new(params),
            query_params,
            fragment,
            data: RwLock::new(data),
            outlet,
            component,
            route_config,
            children,
            url_segment_group,
            last_path_index,
            resolved_data: RwLock::new(Data::new()),
        })
    }

    /// The URL segments this route consumed.
    #[must_use]
    pub fn url(&self) -> &[UrlSegment] {
        &self.url
    }

    /// Merged params: positional params overlaid with the matrix params of
    /// the last consumed segment, plus any inherited ancestor params.
    #[must_use]
    pub fn params(&self) -> ParamMap {
        self.params.read().expect("snapshot lock poisoned").clone()
    }

    /// A single param by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<String> {
        self.params
            .read()
            .expect("snapshot lock poisoned")
            .get(name)
            .map(str::to_string)
    }

    /// Query params, shared by every snapshot of the navigation.
    #[must_use]
    pub fn query_params(&self) -> &QueryParams {
        &self.query_params
    }

    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Static config data merged with inherited and resolved data.
    #[must_use]
    pub fn data(&self) -> Data {
        self.data.read().expect("snapshot lock poisoned").clone()
    }

    #[must_use]
    pub fn outlet(&self) -> &str {
        &self.outlet
    }

    #[must_use]
    pub fn component(&self) -> Option<&ComponentId> {
        self.component.as_ref()
    }

    /// The route config that matched, `None` only for the synthetic root.
    #[must_use]
    pub fn route_config(&self) -> Option<&Arc<Route>> {
        self.route_config.as_ref()
    }

    #[must_use]
    pub fn children(&self) -> &[Arc<ActivatedRouteSnapshot>] {
        &self.children
    }

    #[must_use]
    pub fn first_child(&self) -> Option<&Arc<ActivatedRouteSnapshot>> {
        self.children.first()
    }

    pub(crate) fn url_segment_group(&self) -> Arc<UrlSegmentGroup> {
        Arc::clone(&self.url_segment_group)
    }

    pub(crate) fn last_path_index(&self) -> isize {
        self.last_path_index
    }

    pub(crate) fn set_params(&self, params: ParamMap) {
        *self.params.write().expect("snapshot lock poisoned") = params;
    }

    pub(crate) fn set_data(&self, data: Data) {
        *self.data.write().expect("snapshot lock poisoned") = data;
    }

    pub(crate) fn resolved_data(&self) -> Data {
        self.resolved_data
            .read()
            .expect("snapshot lock poisoned")
            .clone()
    }

    pub(crate) fn set_resolved_data(&self, data: Data) {
        *self.resolved_data.write().expect("snapshot lock poisoned") = data;
    }

    /// The consumed URL as a serialized path, for events and diagnostics.
    #[must_use]
    pub fn route_path(&self) -> String {
        serialize_segments(&self.url)
    }
}

impl fmt::Debug for ActivatedRouteSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivatedRouteSnapshot")
            .field("url", &self.route_path())
            .field("outlet", &self.outlet)
            .field("component", &self.component)
            .field("params", &self.params())
            .field("children", &self.children)
            .finish()
    }
}

/// The immutable tree of snapshots for one URL at one moment, plus the
/// serialized URL it represents.
#[derive(Clone)]
pub struct RouterStateSnapshot {
    /// The serialized URL this state was recognized from
    pub url: String,
    root: Arc<ActivatedRouteSnapshot>,
}

impl RouterStateSnapshot {
    pub(crate) fn new(url: String, root: Arc<ActivatedRouteSnapshot>) -> Self {
        RouterStateSnapshot { url, root }
    }

    #[must_use]
    pub fn root(&self) -> &Arc<ActivatedRouteSnapshot> {
        &self.root
    }

    /// The parent of `node`, found by walking from the root.
    #[must_use]
    pub fn parent_of(
        &self,
        node: &Arc<ActivatedRouteSnapshot>,
    ) -> Option<Arc<ActivatedRouteSnapshot>> {
        fn search(
            current: &Arc<ActivatedRouteSnapshot>,
            target: &Arc<ActivatedRouteSnapshot>,
        ) -> Option<Arc<ActivatedRouteSnapshot>> {
            for child in current.children() {
                if Arc::ptr_eq(child, target) {
                    return Some(Arc::clone(current));
                }
                if let Some(found) = search(child, target) {
                    return Some(found);
                }
            }
            None
        }
        search(&self.root, node)
    }

    /// The path from the root down to (and including) `node`. Empty when
    /// the node is not part of this tree.
    #[must_use]
    pub fn path_from_root(
        &self,
        node: &Arc<ActivatedRouteSnapshot>,
    ) -> Vec<Arc<ActivatedRouteSnapshot>> {
        fn search(
            current: &Arc<ActivatedRouteSnapshot>,
            target: &Arc<ActivatedRouteSnapshot>,
            path: &mut Vec<Arc<ActivatedRouteSnapshot>>,
        ) -> bool {
            path.push(Arc::clone(current));
            if Arc::ptr_eq(current, target) {
                return true;
            }
            for child in current.children() {
                if search(child, target, path) {
                    return true;
                }
            }
            path.pop();
            false
        }
        let mut path = Vec::new();
        if search(&self.root, node, &mut path) {
            path
        } else {
            Vec::new()
        }
    }
}

impl fmt::Debug for RouterStateSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterStateSnapshot")
            .field("url", &self.url)
            .field("root", &self.root)
            .finish()
    }
}
