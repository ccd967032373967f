use super::checks::get_all_route_guards;
use super::core::{resolve_data, run_guards};
use super::traits::*;
use crate::config::{Route, RouteTitle, Routes, RunGuardsAndResolvers, ROUTE_TITLE_KEY};
use crate::injector::{EmptyInjector, Injector, MapInjector};
use crate::outlet::ChildrenOutletContexts;
use crate::recognition::{recognize, ParamsInheritance};
use crate::state::{create_empty_state_snapshot, RouterStateSnapshot};
use crate::url::{DefaultUrlSerializer, UrlSerializer, UrlTree};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn snapshot_for(config: &Routes, url: &str) -> RouterStateSnapshot {
    let tree = DefaultUrlSerializer.parse(url).expect("parse failed");
    recognize(None, config, &tree, url, ParamsInheritance::EmptyOnly).expect("recognize failed")
}

fn empty_snapshot() -> RouterStateSnapshot {
    create_empty_state_snapshot(&UrlTree::empty(), None)
}

fn root_injector() -> Arc<dyn Injector> {
    Arc::new(EmptyInjector)
}

#[test]
fn test_fresh_activation_collects_activate_checks() {
    let config: Routes = vec![Arc::new(Route {
        path: Some("a".to_string()),
        component: Some("A".into()),
        ..Route::default()
    })];
    let future = snapshot_for(&config, "/a");
    let current = empty_snapshot();
    let checks = get_all_route_guards(&future, &current, &ChildrenOutletContexts::new());

    assert_eq!(checks.can_activate.len(), 1);
    assert!(checks.can_deactivate.is_empty());
    // The check path runs root -> a.
    assert_eq!(checks.can_activate[0].path.len(), 2);
    assert_eq!(checks.can_activate[0].route().url()[0].path, "a");
}

#[test]
fn test_route_swap_collects_both_check_kinds() {
    let config: Routes = vec![
        Arc::new(Route {
            path: Some("a".to_string()),
            component: Some("A".into()),
            ..Route::default()
        }),
        Arc::new(Route {
            path: Some("b".to_string()),
            component: Some("B".into()),
            ..Route::default()
        }),
    ];
    let current = snapshot_for(&config, "/a");
    let future = snapshot_for(&config, "/b");
    let checks = get_all_route_guards(&future, &current, &ChildrenOutletContexts::new());

    assert_eq!(checks.can_activate.len(), 1);
    assert_eq!(checks.can_deactivate.len(), 1);
    assert_eq!(checks.can_deactivate[0].route.url()[0].path, "a");
}

#[test]
fn test_unchanged_route_runs_no_checks() {
    let config: Routes = vec![Arc::new(Route {
        path: Some("a".to_string()),
        component: Some("A".into()),
        ..Route::default()
    })];
    let current = snapshot_for(&config, "/a");
    let future = snapshot_for(&config, "/a");
    let checks = get_all_route_guards(&future, &current, &ChildrenOutletContexts::new());

    assert!(checks.can_activate.is_empty());
    assert!(checks.can_deactivate.is_empty());
}

#[test]
fn test_param_change_reruns_checks() {
    let config: Routes = vec![Arc::new(Route {
        path: Some("team/:id".to_string()),
        component: Some("Team".into()),
        ..Route::default()
    })];
    let current = snapshot_for(&config, "/team/1");
    let future = snapshot_for(&config, "/team/2");
    let checks = get_all_route_guards(&future, &current, &ChildrenOutletContexts::new());

    assert_eq!(checks.can_activate.len(), 1);
    assert_eq!(checks.can_deactivate.len(), 1);
}

#[test]
fn test_query_change_only_reruns_under_query_policy() {
    let make_config = |mode: RunGuardsAndResolvers| -> Routes {
        vec![Arc::new(Route {
            path: Some("a".to_string()),
            component: Some("A".into()),
            run_guards_and_resolvers: mode,
            ..Route::default()
        })]
    };

    let config = make_config(RunGuardsAndResolvers::ParamsChange);
    let current = snapshot_for(&config, "/a?x=1");
    let future = snapshot_for(&config, "/a?x=2");
    let checks = get_all_route_guards(&future, &current, &ChildrenOutletContexts::new());
    assert!(checks.can_activate.is_empty());

    let config = make_config(RunGuardsAndResolvers::ParamsOrQueryParamsChange);
    let current = snapshot_for(&config, "/a?x=1");
    let future = snapshot_for(&config, "/a?x=2");
    let checks = get_all_route_guards(&future, &current, &ChildrenOutletContexts::new());
    assert_eq!(checks.can_activate.len(), 1);
}

#[test]
fn test_always_policy_reruns_every_navigation() {
    let config: Routes = vec![Arc::new(Route {
        path: Some("a".to_string()),
        component: Some("A".into()),
        run_guards_and_resolvers: RunGuardsAndResolvers::Always,
        ..Route::default()
    })];
    let current = snapshot_for(&config, "/a");
    let future = snapshot_for(&config, "/a");
    let checks = get_all_route_guards(&future, &current, &ChildrenOutletContexts::new());
    assert_eq!(checks.can_activate.len(), 1);
}

#[test]
fn test_can_activate_deny_short_circuits() {
    let calls = Arc::new(AtomicUsize::new(0));
    let first_calls = Arc::clone(&calls);
    let second_calls = Arc::clone(&calls);
    let config: Routes = vec![Arc::new(Route {
        path: Some("a".to_string()),
        component: Some("A".into()),
        can_activate: vec![
            can_activate_fn(move |_, _| {
                first_calls.fetch_add(1, Ordering::SeqCst);
                Ok(GuardVerdict::Deny)
            }),
            can_activate_fn(move |_, _| {
                second_calls.fetch_add(10, Ordering::SeqCst);
                Ok(GuardVerdict::Allow)
            }),
        ],
        ..Route::default()
    })];
    let future = snapshot_for(&config, "/a");
    let current = empty_snapshot();
    let checks = get_all_route_guards(&future, &current, &ChildrenOutletContexts::new());

    let verdict = run_guards(&checks, &future, &current, &root_injector(), &|_| {}).unwrap();
    assert!(matches!(verdict, GuardVerdict::Deny));
    // The guard after the denial never ran.
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_can_activate_child_runs_before_can_activate() {
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));
    let child_order = Arc::clone(&order);
    let own_order = Arc::clone(&order);
    let config: Routes = vec![Arc::new(Route {
        path: Some("parent".to_string()),
        component: Some("Parent".into()),
        can_activate_child: vec![can_activate_child_fn(move |_, _| {
            child_order.lock().unwrap().push("child-guard");
            Ok(GuardVerdict::Allow)
        })],
        children: Some(vec![Arc::new(Route {
            path: Some("leaf".to_string()),
            component: Some("Leaf".into()),
            can_activate: vec![can_activate_fn(move |_, _| {
                own_order.lock().unwrap().push("own-guard");
                Ok(GuardVerdict::Allow)
            })],
            ..Route::default()
        })]),
        ..Route::default()
    })];
    let future = snapshot_for(&config, "/parent/leaf");
    let current = empty_snapshot();
    let checks = get_all_route_guards(&future, &current, &ChildrenOutletContexts::new());

    let verdict = run_guards(&checks, &future, &current, &root_injector(), &|_| {}).unwrap();
    assert!(verdict.is_allow());
    let order = order.lock().unwrap();
    // The parent's canActivateChild guard fires for the leaf before the
    // leaf's own canActivate.
    assert_eq!(*order, vec!["child-guard", "own-guard"]);
}

#[test]
fn test_can_deactivate_redirect_wins() {
    let config: Routes = vec![
        Arc::new(Route {
            path: Some("a".to_string()),
            component: Some("A".into()),
            can_deactivate: vec![can_deactivate_fn(|_, _, _, _| {
                Ok(GuardVerdict::Redirect(
                    DefaultUrlSerializer.parse("/blocked").unwrap(),
                ))
            })],
            ..Route::default()
        }),
        Arc::new(Route {
            path: Some("b".to_string()),
            component: Some("B".into()),
            ..Route::default()
        }),
    ];
    let current = snapshot_for(&config, "/a");
    let future = snapshot_for(&config, "/b");
    let checks = get_all_route_guards(&future, &current, &ChildrenOutletContexts::new());

    let verdict = run_guards(&checks, &future, &current, &root_injector(), &|_| {}).unwrap();
    match verdict {
        GuardVerdict::Redirect(tree) => {
            assert_eq!(DefaultUrlSerializer.serialize(&tree), "/blocked");
        }
        other => panic!("expected a redirect, got {other:?}"),
    }
}

#[test]
fn test_token_guard_resolves_through_injector() {
    let config: Routes = vec![Arc::new(Route {
        path: Some("a".to_string()),
        component: Some("A".into()),
        can_activate: vec![GuardRef::token("auth")],
        ..Route::default()
    })];
    let future = snapshot_for(&config, "/a");
    let current = empty_snapshot();
    let checks = get_all_route_guards(&future, &current, &ChildrenOutletContexts::new());

    fn deny_guard(
        _: &crate::state::ActivatedRouteSnapshot,
        _: &RouterStateSnapshot,
    ) -> GuardResult {
        Ok(GuardVerdict::Deny)
    }
    let injector: Arc<dyn Injector> =
        Arc::new(MapInjector::new().with_can_activate("auth", deny_guard));
    let verdict = run_guards(&checks, &future, &current, &injector, &|_| {}).unwrap();
    assert!(matches!(verdict, GuardVerdict::Deny));

    // An unregistered token is a runtime error, not a denial.
    let err = run_guards(&checks, &future, &current, &root_injector(), &|_| {}).unwrap_err();
    assert!(err.to_string().contains("auth"));
}

#[test]
fn test_resolver_populates_data_and_title() {
    let config: Routes = vec![Arc::new(Route {
        path: Some("user/:id".to_string()),
        component: Some("User".into()),
        resolve: vec![(
            "user".to_string(),
            resolve_fn(|route, _| {
                Ok(json!({ "id": route.param("id") }))
            }),
        )],
        title: Some(RouteTitle::Static("User Details".to_string())),
        ..Route::default()
    })];
    let future = snapshot_for(&config, "/user/7");
    let current = empty_snapshot();
    let checks = get_all_route_guards(&future, &current, &ChildrenOutletContexts::new());

    resolve_data(
        &checks,
        &future,
        &root_injector(),
        ParamsInheritance::EmptyOnly,
    )
    .unwrap();

    let node = &future.root().children()[0];
    let data = node.data();
    assert_eq!(data.get("user"), Some(&json!({ "id": "7" })));
    assert_eq!(data.get(ROUTE_TITLE_KEY), Some(&json!("User Details")));
}

#[test]
fn test_resolver_error_propagates() {
    let config: Routes = vec![Arc::new(Route {
        path: Some("a".to_string()),
        component: Some("A".into()),
        resolve: vec![(
            "broken".to_string(),
            resolve_fn(|_, _| anyhow::bail!("backend unavailable")),
        )],
        ..Route::default()
    })];
    let future = snapshot_for(&config, "/a");
    let current = empty_snapshot();
    let checks = get_all_route_guards(&future, &current, &ChildrenOutletContexts::new());

    let err = resolve_data(
        &checks,
        &future,
        &root_injector(),
        ParamsInheritance::EmptyOnly,
    )
    .unwrap_err();
    assert!(err.to_string().contains("backend unavailable"));
}
