//! End-to-end navigation scenarios: lazy loading, guard redirects,
//! recognition errors, event ordering, and location integration.

use std::sync::Arc;
use wayfinder::config::Route;
use wayfinder::guards::{can_activate_fn, GuardVerdict};
use wayfinder::location::{LocationAdapter, MemoryLocation};
use wayfinder::url::{DefaultUrlSerializer, UrlSerializer};
use wayfinder::{
    InitialNavigation, NavigationExtras, NavigationOutcome, Router, RouterEvent, RouterOptions,
};

mod common;
use common::{page, redirect, TokenLoader};
use tracing_util::TestTracing;

fn quiet() -> RouterOptions {
    RouterOptions {
        initial_navigation: InitialNavigation::Disabled,
        ..RouterOptions::default()
    }
}

fn drain_until_end(events: &may::sync::mpsc::Receiver<RouterEvent>) -> Vec<RouterEvent> {
    let mut seen = Vec::new();
    loop {
        let event = events.recv().expect("event stream closed");
        let done = matches!(event, RouterEvent::NavigationEnd { .. });
        seen.push(event);
        if done {
            return seen;
        }
    }
}

#[test]
fn test_wildcard_with_lazy_load_end_to_end() {
    let _tracing = TestTracing::init();
    let loader = Arc::new(TokenLoader::new([(
        "lazy-module",
        vec![page("x", "X")] as Vec<Arc<Route>>,
    )]));
    let router = Router::new(
        vec![Arc::new(Route {
            path: Some("**".to_string()),
            load_children: Some("lazy-module".to_string()),
            ..Route::default()
        })],
        RouterOptions {
            loader: Some(loader.clone()),
            ..quiet()
        },
    )
    .unwrap();
    let events = router.events();

    let outcome = router
        .navigate_by_url("/anything/here", NavigationExtras::default())
        .wait()
        .unwrap();
    assert_eq!(outcome, NavigationOutcome::Committed);
    assert_eq!(
        loader.calls.load(std::sync::atomic::Ordering::SeqCst),
        1
    );

    let seen = drain_until_end(&events);
    assert!(seen
        .iter()
        .any(|e| matches!(e, RouterEvent::RouteConfigLoadStart { .. })));
    assert!(seen
        .iter()
        .any(|e| matches!(e, RouterEvent::RouteConfigLoadEnd { .. })));
    match seen.last().unwrap() {
        RouterEvent::NavigationEnd {
            url_after_redirects,
            ..
        } => assert_eq!(url_after_redirects, "/anything/here"),
        other => panic!("unexpected terminal event {other:?}"),
    }

    // The terminal snapshot consumed both segments.
    let state = router.router_state();
    let node = &state.snapshot.root().children()[0];
    assert_eq!(node.url().len(), 2);
}

#[test]
fn test_guard_urltree_redirect_cancels_then_navigates() {
    let router = Router::new(
        vec![
            Arc::new(Route {
                path: Some("a".to_string()),
                component: Some("A".into()),
                can_activate: vec![can_activate_fn(|_, _| {
                    Ok(GuardVerdict::Redirect(
                        DefaultUrlSerializer.parse("/login").unwrap(),
                    ))
                })],
                ..Route::default()
            }),
            page("login", "Login"),
        ],
        quiet(),
    )
    .unwrap();
    let events = router.events();

    let outcome = router
        .navigate_by_url("/a", NavigationExtras::default())
        .wait()
        .unwrap();
    assert_eq!(outcome, NavigationOutcome::Canceled);

    // The first navigation cancels, a second one is scheduled and commits
    // at /login.
    let mut cancel_seen = false;
    let mut second_start_seen = false;
    loop {
        match events.recv().unwrap() {
            RouterEvent::NavigationCancel { .. } => cancel_seen = true,
            RouterEvent::NavigationStart { url, .. } if url == "/login" => {
                second_start_seen = true;
            }
            RouterEvent::NavigationEnd {
                url_after_redirects,
                ..
            } => {
                assert!(cancel_seen, "cancel must precede the follow-up commit");
                assert!(second_start_seen);
                assert_eq!(url_after_redirects, "/login");
                break;
            }
            _ => {}
        }
    }
    assert_eq!(router.url(), "/login");
}

#[test]
fn test_outlet_conflict_is_navigation_error() {
    let conflicted = |component: &'static str| {
        Arc::new(Route {
            path: Some(String::new()),
            component: Some(component.into()),
            outlet: Some("x".to_string()),
            ..Route::default()
        })
    };
    let router = Router::new(vec![conflicted("X1"), conflicted("X2")], quiet()).unwrap();
    let events = router.events();

    let err = router
        .navigate_by_url("/", NavigationExtras::default())
        .wait()
        .unwrap_err();
    assert!(err.to_string().contains("outlet"));

    loop {
        match events.recv().unwrap() {
            RouterEvent::NavigationError { error, .. } => {
                assert!(error.contains("outlet"));
                break;
            }
            RouterEvent::NavigationEnd { .. } => panic!("navigation must not commit"),
            _ => {}
        }
    }
}

#[test]
fn test_navigations_never_interleave() {
    let router = Router::new(vec![page("a", "A"), page("b", "B")], quiet()).unwrap();
    let events = router.events();

    // Enqueue two navigations back to back; the scheduler serializes
    // them, superseding the first at its next step boundary.
    let first = router.navigate_by_url("/a", NavigationExtras::default());
    let second = router.navigate_by_url("/b", NavigationExtras::default());
    let first_outcome = first.wait().unwrap();
    let second_outcome = second.wait().unwrap();
    assert_eq!(second_outcome, NavigationOutcome::Committed);

    // Events for the two navigations form two contiguous runs: every
    // event of navigation 1 precedes every event of navigation 2.
    let mut ids_in_order = Vec::new();
    loop {
        let event = events.recv().unwrap();
        let done = matches!(event, RouterEvent::NavigationEnd { .. });
        let id = match &event {
            RouterEvent::NavigationStart { id, .. }
            | RouterEvent::RoutesRecognized { id, .. }
            | RouterEvent::GuardsCheckStart { id, .. }
            | RouterEvent::GuardsCheckEnd { id, .. }
            | RouterEvent::ResolveStart { id, .. }
            | RouterEvent::ResolveEnd { id, .. }
            | RouterEvent::NavigationEnd { id, .. }
            | RouterEvent::NavigationCancel { id, .. }
            | RouterEvent::NavigationError { id, .. } => Some(*id),
            _ => None,
        };
        if let Some(id) = id {
            ids_in_order.push(id);
        }
        if done {
            break;
        }
    }
    let mut deduped = ids_in_order.clone();
    deduped.dedup();
    let mut sorted = deduped.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(
        deduped, sorted,
        "navigation events interleaved: {ids_in_order:?}"
    );

    match first_outcome {
        NavigationOutcome::Committed | NavigationOutcome::Canceled => {}
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(router.url(), "/b");
}

#[test]
fn test_popstate_navigates_and_replay_is_deduplicated() {
    let location = Arc::new(MemoryLocation::new());
    let router = Router::new(
        vec![page("a", "A"), page("b", "B"), page("c", "C")],
        RouterOptions {
            location: Some(location.clone()),
            ..quiet()
        },
    )
    .unwrap();
    let events = router.events();

    router
        .navigate_by_url("/a", NavigationExtras::default())
        .wait()
        .unwrap();
    drain_until_end(&events);

    // The browser pops to /b; the replayed duplicate event is absorbed.
    location.simulate_pop("/b");
    location.simulate_pop("/b");
    drain_until_end(&events);
    assert_eq!(router.url(), "/b");

    // Fence with an imperative navigation, then count the starts for /b.
    router
        .navigate_by_url("/c", NavigationExtras::default())
        .wait()
        .unwrap();
    let seen = drain_until_end(&events);
    let starts_for_b = seen
        .iter()
        .filter(
            |e| matches!(e, RouterEvent::NavigationStart { url, .. } if url == "/b"),
        )
        .count();
    assert_eq!(starts_for_b, 0, "replayed popstate must not renavigate");
}

#[test]
fn test_redirect_expansion_end_to_end() {
    let router = Router::new(
        vec![
            redirect("", "inbox"),
            page("inbox", "Inbox"),
            redirect("old-inbox", "/inbox"),
        ],
        quiet(),
    )
    .unwrap();

    router
        .navigate_by_url("/", NavigationExtras::default())
        .wait()
        .unwrap();
    assert_eq!(router.url(), "/inbox");

    router
        .navigate_by_url("/old-inbox", NavigationExtras::default())
        .wait()
        .unwrap();
    assert_eq!(router.url(), "/inbox");
}

#[test]
fn test_initial_navigation_blocking() {
    let location = Arc::new(MemoryLocation::new());
    location.replace_state("/start");
    let router = Router::new(
        vec![page("start", "Start")],
        RouterOptions {
            location: Some(location),
            initial_navigation: InitialNavigation::EnabledBlocking,
            ..RouterOptions::default()
        },
    )
    .unwrap();
    assert_eq!(router.url(), "/start");
}

#[test]
fn test_resolver_data_reaches_activated_route() {
    let router = Router::new(
        vec![Arc::new(Route {
            path: Some("user/:id".to_string()),
            component: Some("User".into()),
            resolve: vec![(
                "greeting".to_string(),
                wayfinder::guards::resolve_fn(|route, _| {
                    Ok(serde_json::json!(format!(
                        "hello {}",
                        route.param("id").unwrap_or_default()
                    )))
                }),
            )],
            ..Route::default()
        })],
        quiet(),
    )
    .unwrap();

    router
        .navigate_by_url("/user/7", NavigationExtras::default())
        .wait()
        .unwrap();
    let state = router.router_state();
    let user = state.root().children()[0].clone();
    let data = user.data().get();
    assert_eq!(data.get("greeting"), Some(&serde_json::json!("hello 7")));
}

#[test]
fn test_hash_location_reports_hash_changes() {
    let router = Router::new(
        vec![page("a", "A")],
        RouterOptions {
            use_hash: true,
            ..quiet()
        },
    )
    .unwrap();
    let events = router.events();
    router
        .navigate_by_url("/a", NavigationExtras::default())
        .wait()
        .unwrap();
    let seen = drain_until_end(&events);
    assert!(matches!(
        seen.first(),
        Some(RouterEvent::NavigationStart { .. })
    ));
}
