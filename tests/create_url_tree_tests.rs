//! Relative navigation: command lists applied against an activated route.

use std::sync::Arc;
use wayfinder::config::Route;
use wayfinder::url::Command;
use wayfinder::{NavigationExtras, QueryParamsHandling, Router, RouterOptions};

mod common;
use common::page;
use tracing_util::TestTracing;

fn team_router() -> Router {
    let config = vec![Arc::new(Route {
        path: Some("team/:id".to_string()),
        component: Some("Team".into()),
        children: Some(vec![page("user/:name", "User")]),
        ..Route::default()
    })];
    Router::new(
        config,
        RouterOptions {
            initial_navigation: wayfinder::InitialNavigation::Disabled,
            ..RouterOptions::default()
        },
    )
    .unwrap()
}

#[test]
fn test_relative_navigation_with_double_dots() {
    let _tracing = TestTracing::init();
    let router = team_router();
    router
        .navigate_by_url("/team/33/user/bob", NavigationExtras::default())
        .wait()
        .unwrap();

    let state = router.router_state();
    let team = state.snapshot.root().children()[0].clone();
    let user = team.children()[0].clone();
    assert_eq!(user.url()[1].path, "bob");

    // One '..' pops the last path index; '22' replaces it.
    let tree = router
        .create_url_tree(
            &[Command::from("../22")],
            &NavigationExtras {
                relative_to: Some(user),
                ..NavigationExtras::default()
            },
        )
        .unwrap();
    assert_eq!(tree.to_string(), "/team/33/user/22");

    // Relative to the parent route, two '..' climb out of its consumed
    // segments entirely.
    let tree = router
        .create_url_tree(
            &[Command::from("../../team/44/user/22")],
            &NavigationExtras {
                relative_to: Some(team),
                ..NavigationExtras::default()
            },
        )
        .unwrap();
    assert_eq!(tree.to_string(), "/team/44/user/22");
}

#[test]
fn test_too_many_double_dots_fail() {
    let router = team_router();
    router
        .navigate_by_url("/team/33/user/bob", NavigationExtras::default())
        .wait()
        .unwrap();
    let user = router.router_state().snapshot.root().children()[0].children()[0].clone();

    let err = router
        .create_url_tree(
            &[Command::from("../../../../../x")],
            &NavigationExtras {
                relative_to: Some(user),
                ..NavigationExtras::default()
            },
        )
        .unwrap_err();
    assert!(err.to_string().contains("'../'"));
}

#[test]
fn test_relative_without_route_is_rooted() {
    let router = team_router();
    router
        .navigate_by_url("/team/1/user/a", NavigationExtras::default())
        .wait()
        .unwrap();
    let tree = router
        .navigate(
            &[Command::from("team"), Command::from(9), Command::from("user"), Command::from("b")],
            NavigationExtras::default(),
        )
        .wait()
        .unwrap();
    assert_eq!(tree, wayfinder::NavigationOutcome::Committed);
    assert_eq!(router.url(), "/team/9/user/b");
}

#[test]
fn test_preserve_fragment_and_query_handling() {
    let router = team_router();
    router
        .navigate_by_url("/team/1/user/a?tab=files#section", NavigationExtras::default())
        .wait()
        .unwrap();

    let tree = router
        .create_url_tree(
            &[Command::from("/team/2/user/b")],
            &NavigationExtras {
                preserve_fragment: true,
                query_params_handling: QueryParamsHandling::Preserve,
                ..NavigationExtras::default()
            },
        )
        .unwrap();
    assert_eq!(tree.to_string(), "/team/2/user/b?tab=files#section");
}
