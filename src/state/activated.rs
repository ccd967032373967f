//! Live route state: the observable counterpart of the snapshot tree.
//!
//! An [`ActivatedRoute`] survives across navigations while the reuse
//! strategy keeps matching it to the same route config. Its url, params,
//! query params, fragment and data are [`ValueStream`]s; the scheduler
//! pushes into a stream only when the committed snapshot actually changed
//! that field.

use super::snapshot::{ActivatedRouteSnapshot, RouterStateSnapshot};
use crate::config::{ComponentId, Route};
use crate::params::{
    data_shallow_eq, params_shallow_eq, query_shallow_eq, Data, ParamMap, QueryParams,
};
use crate::stream::ValueStream;
use crate::url::{equal_segments, UrlSegment};
use std::fmt;
use std::sync::{Arc, RwLock};

/// The live representation of a matched route.
pub struct ActivatedRoute {
    url: ValueStream<Vec<UrlSegment>>,
    params: ValueStream<ParamMap>,
    query_params: ValueStream<QueryParams>,
    fragment: ValueStream<Option<String>>,
    data: ValueStream<Data>,
    outlet: String,
    component: Option<ComponentId>,
    route_config: Option<Arc<Route>>,
    pub(crate) future_snapshot: RwLock<Arc<ActivatedRouteSnapshot>>,
    pub(crate) current_snapshot: RwLock<Option<Arc<ActivatedRouteSnapshot>>>,
    pub(crate) children: RwLock<Vec<Arc<ActivatedRoute>>>,
}

impl ActivatedRoute {
    /// The url stream: the consumed segments of this route.
    #[must_use]
    pub fn url(&self) -> ValueStream<Vec<UrlSegment>> {
        self.url.clone()
    }

    /// The params stream.
    #[must_use]
    pub fn params(&self) -> ValueStream<ParamMap> {
        self.params.clone()
    }

    /// The query-params stream, shared shape with every route of the tree.
    #[must_use]
    pub fn query_params(&self) -> ValueStream<QueryParams> {
        self.query_params.clone()
    }

    /// The fragment stream.
    #[must_use]
    pub fn fragment(&self) -> ValueStream<Option<String>> {
        self.fragment.clone()
    }

    /// The data stream (static, inherited and resolved data merged).
    #[must_use]
    pub fn data(&self) -> ValueStream<Data> {
        self.data.clone()
    }

    #[must_use]
    pub fn outlet(&self) -> &str {
        &self.outlet
    }

    #[must_use]
    pub fn component(&self) -> Option<&ComponentId> {
        self.component.as_ref()
    }

    #[must_use]
    pub fn route_config(&self) -> Option<&Arc<Route>> {
        self.route_config.as_ref()
    }

    /// The most recently committed snapshot; before the first commit this
    /// is the snapshot the route was created from.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ActivatedRouteSnapshot> {
        self.current_snapshot
            .read()
            .expect("route lock poisoned")
            .clone()
            .unwrap_or_else(|| {
                self.future_snapshot
                    .read()
                    .expect("route lock poisoned")
                    .clone()
            })
    }

    #[must_use]
    pub fn children(&self) -> Vec<Arc<ActivatedRoute>> {
        self.children.read().expect("route lock poisoned").clone()
    }

    #[must_use]
    pub fn first_child(&self) -> Option<Arc<ActivatedRoute>> {
        self.children
            .read()
            .expect("route lock poisoned")
            .first()
            .cloned()
    }

    pub(crate) fn future_snapshot(&self) -> Arc<ActivatedRouteSnapshot> {
        self.future_snapshot
            .read()
            .expect("route lock poisoned")
            .clone()
    }

    pub(crate) fn set_future_snapshot(&self, snapshot: Arc<ActivatedRouteSnapshot>) {
        *self.future_snapshot.write().expect("route lock poisoned") = snapshot;
    }

    pub(crate) fn set_children(&self, children: Vec<Arc<ActivatedRoute>>) {
        *self.children.write().expect("route lock poisoned") = children;
    }
}

impl fmt::Debug for ActivatedRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivatedRoute")
            .field("outlet", &self.outlet)
            .field("component", &self.component)
            .field("url", &self.url.get())
            .finish()
    }
}

/// Create a fresh live route with streams seeded from a snapshot.
pub(crate) fn create_activated_route(snapshot: &Arc<ActivatedRouteSnapshot>) -> Arc<ActivatedRoute> {
    Arc::new(ActivatedRoute {
        url: ValueStream::new(snapshot.url().to_vec()),
        params: ValueStream::new(snapshot.params()),
        query_params: ValueStream::new(snapshot.query_params().clone()),
        fragment: ValueStream::new(snapshot.fragment().map(str::to_string)),
        data: ValueStream::new(snapshot.data()),
        outlet: snapshot.outlet().to_string(),
        component: snapshot.component().cloned(),
        route_config: snapshot.route_config().cloned(),
        future_snapshot: RwLock::new(Arc::clone(snapshot)),
        current_snapshot: RwLock::new(None),
        children: RwLock::new(Vec::new()),
    })
}

/// Commit a route's future snapshot: replace the current snapshot and push
/// into each stream whose value actually changed.
pub(crate) fn advance_activated_route(route: &ActivatedRoute) {
    let future = route.future_snapshot();
    let mut current_slot = route.current_snapshot.write().expect("route lock poisoned");
    match current_slot.clone() {
        Some(current) => {
            *current_slot = Some(Arc::clone(&future));
            drop(current_slot);
            if !query_shallow_eq(current.query_params(), future.query_params()) {
                route.query_params.next(future.query_params().clone());
            }
            if current.fragment() != future.fragment() {
                route.fragment.next(future.fragment().map(str::to_string));
            }
            if !params_shallow_eq(&current.params(), &future.params()) {
                route.params.next(future.params());
            }
            if !equal_segments(current.url(), future.url()) {
                route.url.next(future.url().to_vec());
            }
            if !data_shallow_eq(&current.data(), &future.data()) {
                route.data.next(future.data());
            }
        }
        None => {
            *current_slot = Some(Arc::clone(&future));
            drop(current_slot);
            // A newly created route announces its resolved data once.
            route.data.next(future.data());
        }
    }
}

/// The live tree paired with the snapshot it was built from.
#[derive(Clone)]
pub struct RouterState {
    root: Arc<ActivatedRoute>,
    /// The snapshot this state realizes
    pub snapshot: RouterStateSnapshot,
}

impl RouterState {
    pub(crate) fn new(root: Arc<ActivatedRoute>, snapshot: RouterStateSnapshot) -> Self {
        RouterState { root, snapshot }
    }

    #[must_use]
    pub fn root(&self) -> &Arc<ActivatedRoute> {
        &self.root
    }

    /// The parent of `node`, found by walking from the root.
    #[must_use]
    pub fn parent_of(&self, node: &Arc<ActivatedRoute>) -> Option<Arc<ActivatedRoute>> {
        fn search(
            current: &Arc<ActivatedRoute>,
            target: &Arc<ActivatedRoute>,
        ) -> Option<Arc<ActivatedRoute>> {
            for child in current.children() {
                if Arc::ptr_eq(&child, target) {
                    return Some(Arc::clone(current));
                }
                if let Some(found) = search(&child, target) {
                    return Some(found);
                }
            }
            None
        }
        search(&self.root, node)
    }

    /// The path from the root down to (and including) `node`.
    #[must_use]
    pub fn path_from_root(&self, node: &Arc<ActivatedRoute>) -> Vec<Arc<ActivatedRoute>> {
        fn search(
            current: &Arc<ActivatedRoute>,
            target: &Arc<ActivatedRoute>,
            path: &mut Vec<Arc<ActivatedRoute>>,
        ) -> bool {
            path.push(Arc::clone(current));
            if Arc::ptr_eq(current, target) {
                return true;
            }
            for child in current.children() {
                if search(&child, target, path) {
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

impl fmt::Debug for RouterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterState")
            .field("url", &self.snapshot.url)
            .field("root", &self.root)
            .finish()
    }
}
