//! Token resolution for guards and resolvers.
//!
//! Route tables may reference guards by token instead of embedding trait
//! objects. At call time the router resolves the token against the
//! injector of the nearest lazily-loaded ancestor configuration (each
//! loaded config brings its own scoped injector), falling back to the
//! root injector.
//!
//! An injector exposes one lookup per guard capability; a service
//! registered under a token may support several capabilities at once,
//! mirroring a guard object that implements several guard methods.

use crate::guards::{CanActivate, CanActivateChild, CanDeactivate, CanLoad, CanMatch, Resolve};
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves guard/resolver tokens to instances.
///
/// Every method defaults to `None`; implementations override the
/// capabilities they can serve.
pub trait Injector: Send + Sync {
    fn can_activate(&self, _token: &str) -> Option<Arc<dyn CanActivate>> {
        None
    }

    fn can_activate_child(&self, _token: &str) -> Option<Arc<dyn CanActivateChild>> {
        None
    }

    fn can_deactivate(&self, _token: &str) -> Option<Arc<dyn CanDeactivate>> {
        None
    }

    fn can_load(&self, _token: &str) -> Option<Arc<dyn CanLoad>> {
        None
    }

    fn can_match(&self, _token: &str) -> Option<Arc<dyn CanMatch>> {
        None
    }

    fn resolver(&self, _token: &str) -> Option<Arc<dyn Resolve>> {
        None
    }
}

/// An injector that resolves nothing. Routers constructed without an
/// injector use this; token references then fail at guard time.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyInjector;

impl Injector for EmptyInjector {}

/// A map-backed injector. Register instances per capability under string
/// tokens; the same token may carry several capabilities.
#[derive(Default)]
pub struct MapInjector {
    can_activate: HashMap<String, Arc<dyn CanActivate>>,
    can_activate_child: HashMap<String, Arc<dyn CanActivateChild>>,
    can_deactivate: HashMap<String, Arc<dyn CanDeactivate>>,
    can_load: HashMap<String, Arc<dyn CanLoad>>,
    can_match: HashMap<String, Arc<dyn CanMatch>>,
    resolvers: HashMap<String, Arc<dyn Resolve>>,
}

impl MapInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_can_activate(
        mut self,
        token: impl Into<String>,
        guard: impl CanActivate + 'static,
    ) -> Self {
        self.can_activate.insert(token.into(), Arc::new(guard));
        self
    }

    pub fn with_can_activate_child(
        mut self,
        token: impl Into<String>,
        guard: impl CanActivateChild + 'static,
    ) -> Self {
        self.can_activate_child
            .insert(token.into(), Arc::new(guard));
        self
    }

    pub fn with_can_deactivate(
        mut self,
        token: impl Into<String>,
        guard: impl CanDeactivate + 'static,
    ) -> Self {
        self.can_deactivate.insert(token.into(), Arc::new(guard));
        self
    }

    pub fn with_can_load(
        mut self,
        token: impl Into<String>,
        guard: impl CanLoad + 'static,
    ) -> Self {
        self.can_load.insert(token.into(), Arc::new(guard));
        self
    }

    pub fn with_can_match(
        mut self,
        token: impl Into<String>,
        guard: impl CanMatch + 'static,
    ) -> Self {
        self.can_match.insert(token.into(), Arc::new(guard));
        self
    }

    pub fn with_resolver(
        mut self,
        token: impl Into<String>,
        resolver: impl Resolve + 'static,
    ) -> Self {
        self.resolvers.insert(token.into(), Arc::new(resolver));
        self
    }
}

impl Injector for MapInjector {
    fn can_activate(&self, token: &str) -> Option<Arc<dyn CanActivate>> {
        self.can_activate.get(token).cloned()
    }

    fn can_activate_child(&self, token: &str) -> Option<Arc<dyn CanActivateChild>> {
        self.can_activate_child.get(token).cloned()
    }

    fn can_deactivate(&self, token: &str) -> Option<Arc<dyn CanDeactivate>> {
        self.can_deactivate.get(token).cloned()
    }

    fn can_load(&self, token: &str) -> Option<Arc<dyn CanLoad>> {
        self.can_load.get(token).cloned()
    }

    fn can_match(&self, token: &str) -> Option<Arc<dyn CanMatch>> {
        self.can_match.get(token).cloned()
    }

    fn resolver(&self, token: &str) -> Option<Arc<dyn Resolve>> {
        self.resolvers.get(token).cloned()
    }
}
