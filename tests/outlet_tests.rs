//! Outlet collaborator integration: activation order, teardown order and
//! detach/re-attach through a custom reuse strategy.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use wayfinder::reuse::{DetachedRouteHandle, RouteReuseStrategy};
use wayfinder::state::ActivatedRouteSnapshot;
use wayfinder::{InitialNavigation, NavigationExtras, Router, RouterOptions};

mod common;
use common::{page, page_with_children, RecordingOutlet};
use tracing_util::TestTracing;

fn quiet() -> RouterOptions {
    RouterOptions {
        initial_navigation: InitialNavigation::Disabled,
        ..RouterOptions::default()
    }
}

#[test]
fn test_parent_activates_before_child_and_deactivation_reverses() {
    let _tracing = TestTracing::init();
    let router = Router::new(
        vec![
            page_with_children("parent", "Parent", vec![page("child", "Child")]),
            page("other", "Other"),
        ],
        quiet(),
    )
    .unwrap();

    let log = Arc::new(Mutex::new(Vec::new()));
    let root_outlet = RecordingOutlet::new("root", Arc::clone(&log));
    router
        .root_contexts()
        .on_child_outlet_created("primary", root_outlet);
    let parent_context = router.root_contexts().get_or_create_context("primary");
    let child_outlet = RecordingOutlet::new("nested", Arc::clone(&log));
    parent_context
        .children
        .on_child_outlet_created("primary", child_outlet);

    router
        .navigate_by_url("/parent/child", NavigationExtras::default())
        .wait()
        .unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "activate root -> Parent".to_string(),
            "activate nested -> Child".to_string(),
        ]
    );

    log.lock().unwrap().clear();
    router
        .navigate_by_url("/other", NavigationExtras::default())
        .wait()
        .unwrap();
    // The nested outlet tears down before its parent, then the new
    // component mounts.
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "deactivate nested".to_string(),
            "deactivate root".to_string(),
            "activate root -> Other".to_string(),
        ]
    );
}

/// Detaches the subtree rooted at route `a` and re-attaches it when `a`
/// re-enters.
struct DetachA {
    store: Mutex<HashMap<String, DetachedRouteHandle>>,
}

impl DetachA {
    fn new() -> Self {
        DetachA {
            store: Mutex::new(HashMap::new()),
        }
    }

    fn key(route: &ActivatedRouteSnapshot) -> Option<String> {
        route.route_config().and_then(|r| r.path.clone())
    }
}

impl RouteReuseStrategy for DetachA {
    fn should_detach(&self, route: &ActivatedRouteSnapshot) -> bool {
        Self::key(route).as_deref() == Some("a")
    }

    fn store(&self, route: &ActivatedRouteSnapshot, handle: Option<DetachedRouteHandle>) {
        let Some(key) = Self::key(route) else { return };
        let mut store = self.store.lock().unwrap();
        match handle {
            Some(handle) => {
                store.insert(key, handle);
            }
            None => {
                store.remove(&key);
            }
        }
    }

    fn should_attach(&self, route: &ActivatedRouteSnapshot) -> bool {
        Self::key(route)
            .map(|key| self.store.lock().unwrap().contains_key(&key))
            .unwrap_or(false)
    }

    fn retrieve(&self, route: &ActivatedRouteSnapshot) -> Option<DetachedRouteHandle> {
        Self::key(route).and_then(|key| self.store.lock().unwrap().get(&key).cloned())
    }

    fn should_reuse_route(
        &self,
        future: &ActivatedRouteSnapshot,
        current: &ActivatedRouteSnapshot,
    ) -> bool {
        wayfinder::same_route_config(future.route_config(), current.route_config())
    }
}

#[test]
fn test_detached_subtree_is_reattached() {
    let router = Router::new(
        vec![page("a", "A"), page("b", "B")],
        RouterOptions {
            reuse_strategy: Some(Arc::new(DetachA::new())),
            ..quiet()
        },
    )
    .unwrap();

    router
        .navigate_by_url("/a", NavigationExtras::default())
        .wait()
        .unwrap();
    let original = router.router_state().root().children()[0].clone();

    router
        .navigate_by_url("/b", NavigationExtras::default())
        .wait()
        .unwrap();
    assert_eq!(
        router.router_state().root().children()[0]
            .component()
            .unwrap()
            .name(),
        "B"
    );

    router
        .navigate_by_url("/a", NavigationExtras::default())
        .wait()
        .unwrap();
    let reattached = router.router_state().root().children()[0].clone();
    // The stored live route came back identity-intact.
    assert!(Arc::ptr_eq(&original, &reattached));
    assert_eq!(router.url(), "/a");
}
