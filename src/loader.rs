//! Lazy route configuration loading.
//!
//! A route with `load_children` defers its child table to a
//! [`RouteLoader`]. The loader runs on the scheduler coroutine and may
//! block it (fetching a chunk, reading a file); the result is memoized on
//! the route so subsequent navigations reuse it.

use crate::config::{LoadedRouterConfig, Route};
use crate::injector::Injector;
use std::sync::Arc;

/// Produces the child configuration for a lazily loaded route.
pub trait RouteLoader: Send + Sync {
    /// Load the children of `route`. `injector` is the injector in scope
    /// at the route's position; implementations typically wrap it into the
    /// returned config's scoped injector.
    fn load(
        &self,
        injector: &Arc<dyn Injector>,
        route: &Arc<Route>,
    ) -> anyhow::Result<LoadedRouterConfig>;
}

impl<F> RouteLoader for F
where
    F: Fn(&Arc<dyn Injector>, &Arc<Route>) -> anyhow::Result<LoadedRouterConfig> + Send + Sync,
{
    fn load(
        &self,
        injector: &Arc<dyn Injector>,
        route: &Arc<Route>,
    ) -> anyhow::Result<LoadedRouterConfig> {
        self(injector, route)
    }
}

/// The default loader: fails every load. Routers that use `load_children`
/// must install a real loader.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRouteLoader;

impl RouteLoader for NoRouteLoader {
    fn load(
        &self,
        _injector: &Arc<dyn Injector>,
        route: &Arc<Route>,
    ) -> anyhow::Result<LoadedRouterConfig> {
        anyhow::bail!(
            "no route loader configured; cannot load children of route '{}'",
            route.path.as_deref().unwrap_or("")
        )
    }
}
