//! Outlet collaborator: the seam to the viewing layer.
//!
//! The router never mounts components itself. During activation it walks
//! the outlet context tree, a registry keyed by outlet name with one
//! level per activated component, and asks the registered [`OutletAdapter`] to
//! activate, deactivate, detach or re-attach. Detached component state
//! travels as an opaque [`OutletHandle`].

use crate::config::ComponentId;
use crate::state::ActivatedRoute;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Opaque component state returned by [`OutletAdapter::detach`] and
/// consumed by [`OutletAdapter::attach`]. Only the outlet collaborator
/// knows its shape.
#[derive(Clone)]
pub struct OutletHandle(pub Arc<dyn Any + Send + Sync>);

impl OutletHandle {
    pub fn new(value: impl Any + Send + Sync) -> Self {
        OutletHandle(Arc::new(value))
    }
}

impl std::fmt::Debug for OutletHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("OutletHandle")
    }
}

/// A named slot in the viewing layer where a component is mounted.
pub trait OutletAdapter: Send + Sync {
    /// Mount the component of the given route.
    fn activate(&self, route: &Arc<ActivatedRoute>);

    /// Tear the mounted component down.
    fn deactivate(&self);

    /// Remove the mounted component but keep its state, returning an
    /// opaque handle for later re-attachment.
    fn detach(&self) -> Option<OutletHandle>;

    /// Re-attach previously detached component state.
    fn attach(&self, handle: OutletHandle, route: &Arc<ActivatedRoute>);

    /// Whether a component is currently mounted.
    fn is_activated(&self) -> bool;

    /// The identity of the mounted component, used as the component
    /// argument of `canDeactivate` guards.
    fn activated_component(&self) -> Option<ComponentId> {
        None
    }
}

/// One outlet slot plus the registry of outlets below it.
pub struct OutletContext {
    outlet: RwLock<Option<Arc<dyn OutletAdapter>>>,
    route: RwLock<Option<Arc<ActivatedRoute>>>,
    /// The contexts of outlets inside the component mounted here
    pub children: ChildrenOutletContexts,
}

impl OutletContext {
    fn new() -> Arc<Self> {
        Arc::new(OutletContext {
            outlet: RwLock::new(None),
            route: RwLock::new(None),
            children: ChildrenOutletContexts::new(),
        })
    }

    #[must_use]
    pub fn outlet(&self) -> Option<Arc<dyn OutletAdapter>> {
        self.outlet.read().expect("outlet lock poisoned").clone()
    }

    pub fn set_outlet(&self, adapter: Option<Arc<dyn OutletAdapter>>) {
        *self.outlet.write().expect("outlet lock poisoned") = adapter;
    }

    #[must_use]
    pub fn route(&self) -> Option<Arc<ActivatedRoute>> {
        self.route.read().expect("outlet lock poisoned").clone()
    }

    pub(crate) fn set_route(&self, route: Option<Arc<ActivatedRoute>>) {
        *self.route.write().expect("outlet lock poisoned") = route;
    }
}

impl std::fmt::Debug for OutletContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutletContext")
            .field("has_outlet", &self.outlet().is_some())
            .field("children", &self.children)
            .finish()
    }
}

/// Registry of outlet contexts at one level of the component tree, keyed
/// by outlet name. Each mounted component owns one of these for the
/// outlets inside it.
pub struct ChildrenOutletContexts {
    contexts: RwLock<HashMap<String, Arc<OutletContext>>>,
}

impl Default for ChildrenOutletContexts {
    fn default() -> Self {
        Self::new()
    }
}

impl ChildrenOutletContexts {
    pub fn new() -> Self {
        ChildrenOutletContexts {
            contexts: RwLock::new(HashMap::new()),
        }
    }

    /// Register the adapter rendering the named outlet at this level.
    pub fn on_child_outlet_created(&self, child_name: &str, outlet: Arc<dyn OutletAdapter>) {
        let context = self.get_or_create_context(child_name);
        context.set_outlet(Some(outlet));
    }

    /// The named outlet's adapter went away; keep the context so its route
    /// assignment survives a re-created outlet.
    pub fn on_child_outlet_destroyed(&self, child_name: &str) {
        if let Some(context) = self.get_context(child_name) {
            context.set_outlet(None);
        }
    }

    /// Detach every context at this level, returning them for storage in a
    /// detached-subtree handle.
    pub(crate) fn on_outlet_deactivated(&self) -> HashMap<String, Arc<OutletContext>> {
        std::mem::take(&mut *self.contexts.write().expect("outlet lock poisoned"))
    }

    /// Restore contexts previously taken by [`Self::on_outlet_deactivated`].
    pub(crate) fn on_outlet_reattached(&self, contexts: HashMap<String, Arc<OutletContext>>) {
        *self.contexts.write().expect("outlet lock poisoned") = contexts;
    }

    #[must_use]
    pub fn get_or_create_context(&self, child_name: &str) -> Arc<OutletContext> {
        let mut contexts = self.contexts.write().expect("outlet lock poisoned");
        contexts
            .entry(child_name.to_string())
            .or_insert_with(OutletContext::new)
            .clone()
    }

    #[must_use]
    pub fn get_context(&self, child_name: &str) -> Option<Arc<OutletContext>> {
        self.contexts
            .read()
            .expect("outlet lock poisoned")
            .get(child_name)
            .cloned()
    }
}

impl std::fmt::Debug for ChildrenOutletContexts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let contexts = self.contexts.read().expect("outlet lock poisoned");
        f.debug_struct("ChildrenOutletContexts")
            .field("outlets", &contexts.keys().collect::<Vec<_>>())
            .finish()
    }
}
