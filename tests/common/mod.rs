//! Shared fixtures for integration tests: route builders, a counting
//! lazy loader and a recording outlet adapter.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wayfinder::config::{ComponentId, LoadedRouterConfig, Route, Routes};
use wayfinder::injector::{EmptyInjector, Injector};
use wayfinder::loader::RouteLoader;
use wayfinder::outlet::{OutletAdapter, OutletHandle};
use wayfinder::state::ActivatedRoute;

/// A component-bearing route.
pub fn page(path: &str, component: &'static str) -> Arc<Route> {
    Arc::new(Route {
        path: Some(path.to_string()),
        component: Some(component.into()),
        ..Route::default()
    })
}

/// A component-bearing route with eager children.
pub fn page_with_children(
    path: &str,
    component: &'static str,
    children: Vec<Arc<Route>>,
) -> Arc<Route> {
    Arc::new(Route {
        path: Some(path.to_string()),
        component: Some(component.into()),
        children: Some(children),
        ..Route::default()
    })
}

/// A redirect route; empty paths get an explicit full match.
pub fn redirect(path: &str, target: &str) -> Arc<Route> {
    Arc::new(Route {
        path: Some(path.to_string()),
        redirect_to: Some(target.to_string()),
        path_match: if path.is_empty() {
            Some(wayfinder::config::PathMatch::Full)
        } else {
            None
        },
        ..Route::default()
    })
}

/// A loader serving fixed route tables by `load_children` token, counting
/// every call.
pub struct TokenLoader {
    tables: Mutex<HashMap<String, Routes>>,
    pub calls: AtomicUsize,
}

impl TokenLoader {
    pub fn new(tables: impl IntoIterator<Item = (&'static str, Routes)>) -> Self {
        TokenLoader {
            tables: Mutex::new(
                tables
                    .into_iter()
                    .map(|(token, routes)| (token.to_string(), routes))
                    .collect(),
            ),
            calls: AtomicUsize::new(0),
        }
    }
}

impl RouteLoader for TokenLoader {
    fn load(
        &self,
        _injector: &Arc<dyn Injector>,
        route: &Arc<Route>,
    ) -> anyhow::Result<LoadedRouterConfig> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let token = route
            .load_children
            .clone()
            .ok_or_else(|| anyhow::anyhow!("route has no load_children token"))?;
        let routes = self
            .tables
            .lock()
            .unwrap()
            .get(&token)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown lazy module '{token}'"))?;
        Ok(LoadedRouterConfig::new(routes, Arc::new(EmptyInjector)))
    }
}

/// An outlet adapter that records activate/deactivate/detach/attach calls
/// into a shared log.
pub struct RecordingOutlet {
    name: String,
    log: Arc<Mutex<Vec<String>>>,
    activated: AtomicBool,
    component: Mutex<Option<ComponentId>>,
}

impl RecordingOutlet {
    pub fn new(name: &str, log: Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(RecordingOutlet {
            name: name.to_string(),
            log,
            activated: AtomicBool::new(false),
            component: Mutex::new(None),
        })
    }
}

impl OutletAdapter for RecordingOutlet {
    fn activate(&self, route: &Arc<ActivatedRoute>) {
        let component = route.component().cloned();
        self.log.lock().unwrap().push(format!(
            "activate {} -> {}",
            self.name,
            component
                .as_ref()
                .map(|c| c.name().to_string())
                .unwrap_or_default()
        ));
        *self.component.lock().unwrap() = component;
        self.activated.store(true, Ordering::SeqCst);
    }

    fn deactivate(&self) {
        self.log
            .lock()
            .unwrap()
            .push(format!("deactivate {}", self.name));
        self.activated.store(false, Ordering::SeqCst);
        *self.component.lock().unwrap() = None;
    }

    fn detach(&self) -> Option<OutletHandle> {
        self.log.lock().unwrap().push(format!("detach {}", self.name));
        self.activated.store(false, Ordering::SeqCst);
        self.component
            .lock()
            .unwrap()
            .take()
            .map(OutletHandle::new)
    }

    fn attach(&self, handle: OutletHandle, _route: &Arc<ActivatedRoute>) {
        let component = handle.0.downcast_ref::<ComponentId>().cloned();
        self.log.lock().unwrap().push(format!(
            "attach {} -> {}",
            self.name,
            component
                .as_ref()
                .map(|c| c.name().to_string())
                .unwrap_or_default()
        ));
        *self.component.lock().unwrap() = component;
        self.activated.store(true, Ordering::SeqCst);
    }

    fn is_activated(&self) -> bool {
        self.activated.load(Ordering::SeqCst)
    }

    fn activated_component(&self) -> Option<ComponentId> {
        self.component.lock().unwrap().clone()
    }
}
