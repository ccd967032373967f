//! Route reuse strategy: the policy deciding whether a route subtree is
//! reused in place, detached for later re-attachment, or rebuilt.

use crate::config::same_route_config;
use crate::outlet::{OutletContext, OutletHandle};
use crate::state::{ActivatedRoute, ActivatedRouteSnapshot};
use std::collections::HashMap;
use std::sync::Arc;

/// A detached route subtree: the live route tree, the opaque component
/// state the outlet returned on detach, and the outlet contexts that were
/// active below it. The router stores and retrieves these wholesale; only
/// the outlet collaborator understands the component state inside.
///
/// `retrieve` implementations return a clone and keep the stored handle;
/// the router clears the slot with `store(route, None)` once the subtree
/// is re-attached.
#[derive(Clone)]
pub struct DetachedRouteHandle {
    pub(crate) route: Arc<ActivatedRoute>,
    pub(crate) component: Option<OutletHandle>,
    pub(crate) contexts: HashMap<String, Arc<OutletContext>>,
}

impl std::fmt::Debug for DetachedRouteHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetachedRouteHandle")
            .field("route", &self.route)
            .field("has_component", &self.component.is_some())
            .finish()
    }
}

/// Decides, per snapshot, how activated routes carry over between
/// navigations.
pub trait RouteReuseStrategy: Send + Sync {
    /// Whether the leaving route should be detached and stored instead of
    /// destroyed.
    fn should_detach(&self, route: &ActivatedRouteSnapshot) -> bool;

    /// Store a detached subtree (or clear a slot with `None`).
    fn store(&self, route: &ActivatedRouteSnapshot, handle: Option<DetachedRouteHandle>);

    /// Whether an entering route should be re-attached from storage.
    fn should_attach(&self, route: &ActivatedRouteSnapshot) -> bool;

    /// Take a stored subtree for the entering route.
    fn retrieve(&self, route: &ActivatedRouteSnapshot) -> Option<DetachedRouteHandle>;

    /// Whether the future snapshot continues the current activated route.
    fn should_reuse_route(
        &self,
        future: &ActivatedRouteSnapshot,
        current: &ActivatedRouteSnapshot,
    ) -> bool;
}

/// The default policy: reuse exactly when the future and current snapshot
/// matched the same route config; never detach.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRouteReuseStrategy;

impl RouteReuseStrategy for DefaultRouteReuseStrategy {
    fn should_detach(&self, _route: &ActivatedRouteSnapshot) -> bool {
        false
    }

    fn store(&self, _route: &ActivatedRouteSnapshot, _handle: Option<DetachedRouteHandle>) {}

    fn should_attach(&self, _route: &ActivatedRouteSnapshot) -> bool {
        false
    }

    fn retrieve(&self, _route: &ActivatedRouteSnapshot) -> Option<DetachedRouteHandle> {
        None
    }

    fn should_reuse_route(
        &self,
        future: &ActivatedRouteSnapshot,
        current: &ActivatedRouteSnapshot,
    ) -> bool {
        same_route_config(future.route_config(), current.route_config())
    }
}
