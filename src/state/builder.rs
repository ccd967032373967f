//! Router state construction: the diff between the future snapshot tree
//! and the previous live tree.
//!
//! For every node of the future snapshot the builder either retains the
//! previous live route (reuse-strategy says the config continues), grafts
//! a detached subtree back in, or creates a fresh route with streams
//! seeded from the snapshot.

use super::activated::{create_activated_route, ActivatedRoute, RouterState};
use super::snapshot::{ActivatedRouteSnapshot, RouterStateSnapshot};
use crate::config::{same_route_config, ComponentId};
use crate::errors::NavigationCancelingError;
use crate::params::{Data, ParamMap, QueryParams};
use crate::reuse::RouteReuseStrategy;
use crate::url::{UrlTree, PRIMARY_OUTLET};
use std::sync::Arc;

/// The state of a router that has not navigated yet: a bare root route.
pub(crate) fn create_empty_state(root_component: Option<ComponentId>) -> RouterState {
    let snapshot = create_empty_state_snapshot(&UrlTree::empty(), root_component);
    let root = create_activated_route(snapshot.root());
    RouterState::new(root, snapshot)
}

pub(crate) fn create_empty_state_snapshot(
    url_tree: &UrlTree,
    root_component: Option<ComponentId>,
) -> RouterStateSnapshot {
    let root = ActivatedRouteSnapshot::new(
        Vec::new(),
        ParamMap::new(),
        QueryParams::new(),
        None,
        Data::new(),
        PRIMARY_OUTLET.to_string(),
        root_component,
        None,
        Arc::clone(&url_tree.root),
        -1,
        Vec::new(),
    );
    RouterStateSnapshot::new(String::new(), root)
}

/// Build the live tree realizing `future_snapshot`, reusing nodes of
/// `prev_state` where the reuse strategy allows.
pub(crate) fn create_router_state(
    strategy: &dyn RouteReuseStrategy,
    future_snapshot: &RouterStateSnapshot,
    prev_state: &RouterState,
) -> Result<RouterState, NavigationCancelingError> {
    let root = create_node(strategy, future_snapshot.root(), Some(prev_state.root()))?;
    Ok(RouterState::new(root, future_snapshot.clone()))
}

fn create_node(
    strategy: &dyn RouteReuseStrategy,
    future: &Arc<ActivatedRouteSnapshot>,
    prev: Option<&Arc<ActivatedRoute>>,
) -> Result<Arc<ActivatedRoute>, NavigationCancelingError> {
    if let Some(prev) = prev {
        if strategy.should_reuse_route(future, &prev.snapshot()) {
            let route = Arc::clone(prev);
            route.set_future_snapshot(Arc::clone(future));
            let children = create_or_reuse_children(strategy, future, prev)?;
            route.set_children(children);
            return Ok(route);
        }
    }

    if strategy.should_attach(future) {
        if let Some(handle) = strategy.retrieve(future) {
            set_future_snapshots_of_activated_routes(future, &handle.route)?;
            return Ok(handle.route);
        }
    }

    let route = create_activated_route(future);
    let mut children = Vec::with_capacity(future.children().len());
    for child in future.children() {
        children.push(create_node(strategy, child, None)?);
    }
    route.set_children(children);
    Ok(route)
}

fn create_or_reuse_children(
    strategy: &dyn RouteReuseStrategy,
    future: &Arc<ActivatedRouteSnapshot>,
    prev: &Arc<ActivatedRoute>,
) -> Result<Vec<Arc<ActivatedRoute>>, NavigationCancelingError> {
    let prev_children = prev.children();
    let mut children = Vec::with_capacity(future.children().len());
    for child in future.children() {
        let matching = prev_children
            .iter()
            .find(|p| strategy.should_reuse_route(child, &p.snapshot()));
        children.push(create_node(strategy, child, matching)?);
    }
    Ok(children)
}

/// Walk a re-attached subtree, pairing it with the future snapshot tree
/// and replacing each node's future snapshot. Shape mismatches are reuse
/// failures and cancel the navigation.
fn set_future_snapshots_of_activated_routes(
    future: &Arc<ActivatedRouteSnapshot>,
    route: &Arc<ActivatedRoute>,
) -> Result<(), NavigationCancelingError> {
    if !same_route_config(future.route_config(), route.route_config()) {
        return Err(NavigationCancelingError::new(
            "cannot reattach a route subtree created from a different route",
        ));
    }
    let children = route.children();
    if future.children().len() != children.len() {
        return Err(NavigationCancelingError::new(
            "cannot reattach a route subtree with a different number of children",
        ));
    }
    route.set_future_snapshot(Arc::clone(future));
    for (future_child, route_child) in future.children().iter().zip(&children) {
        set_future_snapshots_of_activated_routes(future_child, route_child)?;
    }
    Ok(())
}
