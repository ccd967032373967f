//! Route configuration model.
//!
//! A route table is a tree of [`Route`] records. Each route either renders
//! a component, redirects, declares eager children, or lazily loads a
//! child configuration. Guards and resolvers are referenced either
//! directly as trait objects or by token, resolved through the injector at
//! call time.

use crate::guards::{
    CanActivateChildRef, CanActivateRef, CanDeactivateRef, CanLoadRef, CanMatchRef, ResolveRef,
};
use crate::injector::Injector;
use crate::params::{Data, ParamMap};
use crate::url::{UrlSegment, UrlSegmentGroup};
use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Opaque identity of a component to mount into an outlet. The router
/// never inspects it; the outlet collaborator interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub struct ComponentId(Cow<'static, str>);

impl ComponentId {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        ComponentId(name.into())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&'static str> for ComponentId {
    fn from(name: &'static str) -> Self {
        ComponentId(Cow::Borrowed(name))
    }
}

/// How a route's `path` matches the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathMatch {
    /// Match a prefix of the remaining segments (the default)
    #[default]
    Prefix,
    /// Match only if every remaining segment is consumed
    Full,
}

/// When a reused route's guards and resolvers run again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunGuardsAndResolvers {
    /// Re-run when the matched params or consumed URL changed (default)
    #[default]
    ParamsChange,
    /// Re-run when params, consumed URL or query params changed
    ParamsOrQueryParamsChange,
    /// Re-run on every navigation
    Always,
}

/// The result of a custom matcher: the consumed prefix and any positional
/// parameters it bound.
#[derive(Debug, Clone)]
pub struct UrlMatchResult {
    /// Segments consumed from the front of the list
    pub consumed: Vec<UrlSegment>,
    /// Positional parameters, keyed by name, bound to whole segments
    pub pos_params: Vec<(String, UrlSegment)>,
}

/// A user-supplied matcher, replacing path-based matching for one route.
pub trait UrlMatcher: Send + Sync {
    fn matches(
        &self,
        segments: &[UrlSegment],
        group: &UrlSegmentGroup,
        route: &Route,
    ) -> Option<UrlMatchResult>;
}

impl<F> UrlMatcher for F
where
    F: Fn(&[UrlSegment], &UrlSegmentGroup, &Route) -> Option<UrlMatchResult> + Send + Sync,
{
    fn matches(
        &self,
        segments: &[UrlSegment],
        group: &UrlSegmentGroup,
        route: &Route,
    ) -> Option<UrlMatchResult> {
        self(segments, group, route)
    }
}

/// The page title of a route: a fixed string or a resolver run with the
/// other resolvers.
#[derive(Clone)]
pub enum RouteTitle {
    Static(String),
    Resolve(ResolveRef),
}

impl fmt::Debug for RouteTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteTitle::Static(s) => f.debug_tuple("Static").field(s).finish(),
            RouteTitle::Resolve(_) => f.debug_tuple("Resolve").finish(),
        }
    }
}

/// The reserved key under which a route's resolved title lands in `data`.
pub const ROUTE_TITLE_KEY: &str = "__routeTitle";

/// A single node of the route configuration tree.
///
/// Construct with struct-update syntax over [`Route::default`]:
///
/// ```rust
/// use wayfinder::config::Route;
///
/// let route = Route {
///     path: Some("user/:id".to_string()),
///     component: Some("UserPage".into()),
///     ..Route::default()
/// };
/// ```
pub struct Route {
    /// Path pattern relative to the parent route; must not start with `/`.
    /// Parts starting with `:` bind positional parameters; `**` matches
    /// everything remaining.
    pub path: Option<String>,
    /// Custom matcher; mutually exclusive with `path`
    pub matcher: Option<Arc<dyn UrlMatcher>>,
    /// How `path` consumes segments. `None` defaults to prefix matching;
    /// an empty-path redirect must set it explicitly.
    pub path_match: Option<PathMatch>,
    /// Component to mount when the route activates
    pub component: Option<ComponentId>,
    /// Redirect target. Relative unless it starts with `/`. Segments
    /// starting with `:` substitute positional params from the match.
    pub redirect_to: Option<String>,
    /// Outlet this route targets; defaults to the primary outlet
    pub outlet: Option<String>,
    /// Guards gating activation of this route
    pub can_activate: Vec<CanActivateRef>,
    /// Guards gating activation of any descendant
    pub can_activate_child: Vec<CanActivateChildRef>,
    /// Guards gating deactivation of this route
    pub can_deactivate: Vec<CanDeactivateRef>,
    /// Guards gating the lazy load of `load_children`
    pub can_load: Vec<CanLoadRef>,
    /// Guards gating whether this route matches at all
    pub can_match: Vec<CanMatchRef>,
    /// Data resolvers, run before activation; keyed results land in `data`
    pub resolve: Vec<(String, ResolveRef)>,
    /// Page title, stored under [`ROUTE_TITLE_KEY`] in resolved data
    pub title: Option<RouteTitle>,
    /// Static data merged into every matching snapshot
    pub data: Data,
    /// Guard/resolver re-run policy for reused routes
    pub run_guards_and_resolvers: RunGuardsAndResolvers,
    /// Eagerly configured children
    pub children: Option<Routes>,
    /// Token handed to the loader collaborator for lazy children;
    /// mutually exclusive with `children`
    pub load_children: Option<String>,
    /// Lazy-load memo, set at most once by the first successful load
    pub loaded_config: RwLock<Option<Arc<LoadedRouterConfig>>>,
}

impl Default for Route {
    fn default() -> Self {
        Route {
            path: None,
            matcher: None,
            path_match: None,
            component: None,
            redirect_to: None,
            outlet: None,
            can_activate: Vec::new(),
            can_activate_child: Vec::new(),
            can_deactivate: Vec::new(),
            can_load: Vec::new(),
            can_match: Vec::new(),
            resolve: Vec::new(),
            title: None,
            data: Data::new(),
            run_guards_and_resolvers: RunGuardsAndResolvers::default(),
            children: None,
            load_children: None,
            loaded_config: RwLock::new(None),
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("outlet", &self.outlet)
            .field("component", &self.component)
            .field("redirect_to", &self.redirect_to)
            .field("has_children", &self.children.is_some())
            .field("load_children", &self.load_children)
            .finish()
    }
}

impl Route {
    /// The effective outlet name of this route.
    #[must_use]
    pub fn outlet_name(&self) -> &str {
        self.outlet.as_deref().unwrap_or(crate::url::PRIMARY_OUTLET)
    }

    /// The effective path-match mode.
    #[must_use]
    pub fn path_match(&self) -> PathMatch {
        self.path_match.unwrap_or_default()
    }

    /// Whether this is the `**` wildcard route.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.path.as_deref() == Some("**")
    }

    /// The memoized lazy-load result, if the route has loaded.
    #[must_use]
    pub fn loaded_config(&self) -> Option<Arc<LoadedRouterConfig>> {
        self.loaded_config
            .read()
            .expect("route lock poisoned")
            .clone()
    }

    pub(crate) fn set_loaded_config(&self, config: Arc<LoadedRouterConfig>) {
        let mut slot = self.loaded_config.write().expect("route lock poisoned");
        // The memo is written at most once; a concurrent re-entry during
        // load awaits the same in-flight load on the scheduler coroutine.
        if slot.is_none() {
            *slot = Some(config);
        }
    }
}

/// A route table: the ordered list of sibling routes at one level.
pub type Routes = Vec<Arc<Route>>;

/// Identity comparison of two optional route configs. Reuse decisions key
/// off this.
#[must_use]
pub fn same_route_config(a: Option<&Arc<Route>>, b: Option<&Arc<Route>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// The product of lazily loading a route's children: the child table plus
/// the scoped injector that guard tokens below this point resolve against.
pub struct LoadedRouterConfig {
    pub routes: Routes,
    pub injector: Arc<dyn Injector>,
}

impl LoadedRouterConfig {
    pub fn new(routes: Routes, injector: Arc<dyn Injector>) -> Self {
        LoadedRouterConfig { routes, injector }
    }
}

impl fmt::Debug for LoadedRouterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedRouterConfig")
            .field("routes", &self.routes.len())
            .finish()
    }
}

/// Positional-parameter names bound by a path pattern, overlaid with the
/// matrix parameters of the last consumed segment.
pub(crate) fn merge_matched_params(
    pos_params: &[(String, UrlSegment)],
    consumed: &[UrlSegment],
) -> ParamMap {
    let mut params = ParamMap::new();
    for (name, segment) in pos_params {
        params.insert(name.clone(), segment.path.clone());
    }
    if let Some(last) = consumed.last() {
        params.extend_from(&last.parameters);
    }
    params
}
