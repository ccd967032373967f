//! Guard and resolver contracts.
//!
//! A guard either allows the navigation, denies it (the navigation ends in
//! a `NavigationCancel` event, not an error), or redirects to another URL
//! tree. Runtime failures are ordinary `anyhow` errors and surface as
//! `NavigationError`.
//!
//! Guards may be registered directly as trait objects or referenced by
//! token; tokens resolve through the injector of the nearest lazily-loaded
//! ancestor configuration. Plain closures with the matching signature
//! implement each trait, so function guards need no boilerplate.

use crate::config::Route;
use crate::state::{ActivatedRouteSnapshot, RouterStateSnapshot};
use crate::url::{UrlSegment, UrlTree};
use std::fmt;
use std::sync::Arc;

/// The decision of a guard.
#[derive(Debug, Clone)]
pub enum GuardVerdict {
    /// Continue the navigation
    Allow,
    /// Cancel the navigation without error
    Deny,
    /// Cancel the navigation and schedule a new one to this tree
    Redirect(UrlTree),
}

impl GuardVerdict {
    #[must_use]
    pub fn is_allow(&self) -> bool {
        matches!(self, GuardVerdict::Allow)
    }
}

impl From<bool> for GuardVerdict {
    fn from(allowed: bool) -> Self {
        if allowed {
            GuardVerdict::Allow
        } else {
            GuardVerdict::Deny
        }
    }
}

/// What a guard returns: a verdict, or a runtime error.
pub type GuardResult = anyhow::Result<GuardVerdict>;

/// Gates activation of a route.
pub trait CanActivate: Send + Sync {
    fn can_activate(
        &self,
        route: &ActivatedRouteSnapshot,
        state: &RouterStateSnapshot,
    ) -> GuardResult;
}

impl<F> CanActivate for F
where
    F: Fn(&ActivatedRouteSnapshot, &RouterStateSnapshot) -> GuardResult + Send + Sync,
{
    fn can_activate(
        &self,
        route: &ActivatedRouteSnapshot,
        state: &RouterStateSnapshot,
    ) -> GuardResult {
        self(route, state)
    }
}

/// Gates activation of any descendant of a route.
pub trait CanActivateChild: Send + Sync {
    fn can_activate_child(
        &self,
        child: &ActivatedRouteSnapshot,
        state: &RouterStateSnapshot,
    ) -> GuardResult;
}

impl<F> CanActivateChild for F
where
    F: Fn(&ActivatedRouteSnapshot, &RouterStateSnapshot) -> GuardResult + Send + Sync,
{
    fn can_activate_child(
        &self,
        child: &ActivatedRouteSnapshot,
        state: &RouterStateSnapshot,
    ) -> GuardResult {
        self(child, state)
    }
}

/// Gates deactivation of a route that is leaving the tree.
pub trait CanDeactivate: Send + Sync {
    fn can_deactivate(
        &self,
        component: Option<&crate::config::ComponentId>,
        route: &ActivatedRouteSnapshot,
        current_state: &RouterStateSnapshot,
        next_state: &RouterStateSnapshot,
    ) -> GuardResult;
}

impl<F> CanDeactivate for F
where
    F: Fn(
            Option<&crate::config::ComponentId>,
            &ActivatedRouteSnapshot,
            &RouterStateSnapshot,
            &RouterStateSnapshot,
        ) -> GuardResult
        + Send
        + Sync,
{
    fn can_deactivate(
        &self,
        component: Option<&crate::config::ComponentId>,
        route: &ActivatedRouteSnapshot,
        current_state: &RouterStateSnapshot,
        next_state: &RouterStateSnapshot,
    ) -> GuardResult {
        self(component, route, current_state, next_state)
    }
}

/// Gates the lazy load of a route's children. Runs before the loader.
pub trait CanLoad: Send + Sync {
    fn can_load(&self, route: &Arc<Route>, segments: &[UrlSegment]) -> GuardResult;
}

impl<F> CanLoad for F
where
    F: Fn(&Arc<Route>, &[UrlSegment]) -> GuardResult + Send + Sync,
{
    fn can_load(&self, route: &Arc<Route>, segments: &[UrlSegment]) -> GuardResult {
        self(route, segments)
    }
}

/// Gates whether a route matches at all. A denial skips the route and
/// matching continues with the next candidate.
pub trait CanMatch: Send + Sync {
    fn can_match(&self, route: &Arc<Route>, segments: &[UrlSegment]) -> GuardResult;
}

impl<F> CanMatch for F
where
    F: Fn(&Arc<Route>, &[UrlSegment]) -> GuardResult + Send + Sync,
{
    fn can_match(&self, route: &Arc<Route>, segments: &[UrlSegment]) -> GuardResult {
        self(route, segments)
    }
}

/// Produces one keyed datum before a route activates.
pub trait Resolve: Send + Sync {
    fn resolve(
        &self,
        route: &ActivatedRouteSnapshot,
        state: &RouterStateSnapshot,
    ) -> anyhow::Result<serde_json::Value>;
}

impl<F> Resolve for F
where
    F: Fn(&ActivatedRouteSnapshot, &RouterStateSnapshot) -> anyhow::Result<serde_json::Value>
        + Send
        + Sync,
{
    fn resolve(
        &self,
        route: &ActivatedRouteSnapshot,
        state: &RouterStateSnapshot,
    ) -> anyhow::Result<serde_json::Value> {
        self(route, state)
    }
}

/// A reference to a guard or resolver in the route table: a token looked
/// up through the injector at call time, or a direct instance.
pub enum GuardRef<T: ?Sized> {
    Token(String),
    Direct(Arc<T>),
}

impl<T: ?Sized> GuardRef<T> {
    pub fn token(token: impl Into<String>) -> Self {
        GuardRef::Token(token.into())
    }

    pub fn direct(guard: Arc<T>) -> Self {
        GuardRef::Direct(guard)
    }
}

impl<T: ?Sized> Clone for GuardRef<T> {
    fn clone(&self) -> Self {
        match self {
            GuardRef::Token(t) => GuardRef::Token(t.clone()),
            GuardRef::Direct(g) => GuardRef::Direct(Arc::clone(g)),
        }
    }
}

impl<T: ?Sized> fmt::Debug for GuardRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardRef::Token(t) => f.debug_tuple("Token").field(t).finish(),
            GuardRef::Direct(_) => f.debug_tuple("Direct").finish(),
        }
    }
}

pub type CanActivateRef = GuardRef<dyn CanActivate>;
pub type CanActivateChildRef = GuardRef<dyn CanActivateChild>;
pub type CanDeactivateRef = GuardRef<dyn CanDeactivate>;
pub type CanLoadRef = GuardRef<dyn CanLoad>;
pub type CanMatchRef = GuardRef<dyn CanMatch>;
pub type ResolveRef = GuardRef<dyn Resolve>;

/// Wrap a closure as a `canActivate` guard reference.
pub fn can_activate_fn<F>(f: F) -> CanActivateRef
where
    F: Fn(&ActivatedRouteSnapshot, &RouterStateSnapshot) -> GuardResult + Send + Sync + 'static,
{
    GuardRef::Direct(Arc::new(f))
}

/// Wrap a closure as a `canActivateChild` guard reference.
pub fn can_activate_child_fn<F>(f: F) -> CanActivateChildRef
where
    F: Fn(&ActivatedRouteSnapshot, &RouterStateSnapshot) -> GuardResult + Send + Sync + 'static,
{
    GuardRef::Direct(Arc::new(f))
}

/// Wrap a closure as a `canDeactivate` guard reference.
pub fn can_deactivate_fn<F>(f: F) -> CanDeactivateRef
where
    F: Fn(
            Option<&crate::config::ComponentId>,
            &ActivatedRouteSnapshot,
            &RouterStateSnapshot,
            &RouterStateSnapshot,
        ) -> GuardResult
        + Send
        + Sync
        + 'static,
{
    GuardRef::Direct(Arc::new(f))
}

/// Wrap a closure as a `canLoad` guard reference.
pub fn can_load_fn<F>(f: F) -> CanLoadRef
where
    F: Fn(&Arc<Route>, &[UrlSegment]) -> GuardResult + Send + Sync + 'static,
{
    GuardRef::Direct(Arc::new(f))
}

/// Wrap a closure as a `canMatch` guard reference.
pub fn can_match_fn<F>(f: F) -> CanMatchRef
where
    F: Fn(&Arc<Route>, &[UrlSegment]) -> GuardResult + Send + Sync + 'static,
{
    GuardRef::Direct(Arc::new(f))
}

/// Wrap a closure as a resolver reference.
pub fn resolve_fn<F>(f: F) -> ResolveRef
where
    F: Fn(&ActivatedRouteSnapshot, &RouterStateSnapshot) -> anyhow::Result<serde_json::Value>
        + Send
        + Sync
        + 'static,
{
    GuardRef::Direct(Arc::new(f))
}
