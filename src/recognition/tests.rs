use super::core::recognize;
use super::{ParamsInheritance, RecognizeError};
use crate::config::Route;
use crate::state::RouterStateSnapshot;
use crate::url::{DefaultUrlSerializer, UrlSerializer, PRIMARY_OUTLET};
use serde_json::json;
use std::sync::Arc;

fn component_route(path: &str, component: &'static str) -> Arc<Route> {
    Arc::new(Route {
        path: Some(path.to_string()),
        component: Some(component.into()),
        ..Route::default()
    })
}

fn recognize_url(config: Vec<Arc<Route>>, url: &str) -> RouterStateSnapshot {
    try_recognize(config, url).expect("recognition failed")
}

fn try_recognize(
    config: Vec<Arc<Route>>,
    url: &str,
) -> Result<RouterStateSnapshot, RecognizeError> {
    let tree = DefaultUrlSerializer.parse(url).expect("parse failed");
    recognize(
        Some("Root".into()),
        &config,
        &tree,
        url,
        ParamsInheritance::EmptyOnly,
    )
}

#[test]
fn test_recognize_simple_route() {
    let state = recognize_url(vec![component_route("home", "HomePage")], "/home");
    let root = state.root();
    assert_eq!(root.children().len(), 1);
    let home = &root.children()[0];
    assert_eq!(home.url()[0].path, "home");
    assert_eq!(home.outlet(), PRIMARY_OUTLET);
    assert_eq!(home.component().unwrap().name(), "HomePage");
}

#[test]
fn test_recognize_positional_and_matrix_params() {
    let state = recognize_url(
        vec![component_route("team/:id", "TeamPage")],
        "/team/33;flag=on",
    );
    let team = &state.root().children()[0];
    assert_eq!(team.param("id").as_deref(), Some("33"));
    assert_eq!(team.param("flag").as_deref(), Some("on"));
    assert_eq!(state.url, "/team/33;flag=on");
}

#[test]
fn test_recognize_nested_children() {
    let config = vec![Arc::new(Route {
        path: Some("team/:id".to_string()),
        component: Some("TeamPage".into()),
        children: Some(vec![component_route("user/:name", "UserPage")]),
        ..Route::default()
    })];
    let state = recognize_url(config, "/team/33/user/bob");
    let team = &state.root().children()[0];
    let user = &team.children()[0];
    assert_eq!(user.param("name").as_deref(), Some("bob"));
    // The child consumed exactly its own segments.
    assert_eq!(user.url().len(), 2);
    assert_eq!(user.url()[0].path, "user");
}

#[test]
fn test_recognize_wildcard_consumes_everything() {
    let config = vec![
        component_route("home", "HomePage"),
        Arc::new(Route {
            path: Some("**".to_string()),
            component: Some("NotFound".into()),
            ..Route::default()
        }),
    ];
    let state = recognize_url(config, "/anything/here;k=v");
    let node = &state.root().children()[0];
    assert_eq!(node.url().len(), 2);
    assert_eq!(node.component().unwrap().name(), "NotFound");
    // Wildcard params are the matrix params of the last consumed segment.
    assert_eq!(node.param("k").as_deref(), Some("v"));
}

#[test]
fn test_recognize_skips_redirect_routes() {
    let config = vec![
        Arc::new(Route {
            path: Some("a".to_string()),
            redirect_to: Some("b".to_string()),
            ..Route::default()
        }),
        component_route("a", "APage"),
    ];
    let state = recognize_url(config, "/a");
    assert_eq!(
        state.root().children()[0].component().unwrap().name(),
        "APage"
    );
}

#[test]
fn test_recognize_no_match_errors() {
    let err = try_recognize(vec![component_route("home", "HomePage")], "/missing").unwrap_err();
    assert!(matches!(err, RecognizeError::NoMatch(_)));
}

#[test]
fn test_params_inherited_across_componentless_parent() {
    let config = vec![Arc::new(Route {
        path: Some("team/:id".to_string()),
        children: Some(vec![component_route("user", "UserPage")]),
        data: {
            let mut data = crate::params::Data::new();
            data.insert("section".to_string(), json!("teams"));
            data
        },
        ..Route::default()
    })];
    let state = recognize_url(config, "/team/9/user");
    let team = &state.root().children()[0];
    let user = &team.children()[0];
    assert_eq!(user.param("id").as_deref(), Some("9"));
    assert_eq!(user.data().get("section"), Some(&json!("teams")));
}

#[test]
fn test_params_not_inherited_across_componentful_parent() {
    let config = vec![Arc::new(Route {
        path: Some("team/:id".to_string()),
        component: Some("TeamPage".into()),
        children: Some(vec![component_route("user", "UserPage")]),
        ..Route::default()
    })];
    let state = recognize_url(config, "/team/9/user");
    let user = &state.root().children()[0].children()[0];
    assert_eq!(user.param("id"), None);
}

#[test]
fn test_params_always_inherited_in_always_mode() {
    let config = vec![Arc::new(Route {
        path: Some("team/:id".to_string()),
        component: Some("TeamPage".into()),
        children: Some(vec![component_route("user", "UserPage")]),
        ..Route::default()
    })];
    let tree = DefaultUrlSerializer.parse("/team/9/user").unwrap();
    let state = recognize(
        None,
        &config,
        &tree,
        "/team/9/user",
        ParamsInheritance::Always,
    )
    .unwrap();
    let user = &state.root().children()[0].children()[0];
    assert_eq!(user.param("id").as_deref(), Some("9"));
}

#[test]
fn test_empty_path_child_matches_and_keeps_position() {
    let config = vec![Arc::new(Route {
        path: Some("parent".to_string()),
        component: Some("Parent".into()),
        children: Some(vec![component_route("", "DefaultChild")]),
        ..Route::default()
    })];
    let state = recognize_url(config, "/parent");
    let parent = &state.root().children()[0];
    assert_eq!(parent.children().len(), 1);
    let child = &parent.children()[0];
    assert!(child.url().is_empty());
    assert_eq!(child.component().unwrap().name(), "DefaultChild");
}

#[test]
fn test_secondary_outlet_recognition_and_ordering() {
    let config = vec![
        component_route("inbox", "Inbox"),
        Arc::new(Route {
            path: Some("compose".to_string()),
            component: Some("Compose".into()),
            outlet: Some("popup".to_string()),
            ..Route::default()
        }),
    ];
    let state = recognize_url(config, "/inbox(popup:compose)");
    let children = state.root().children();
    assert_eq!(children.len(), 2);
    // Primary outlet sorts first.
    assert_eq!(children[0].outlet(), PRIMARY_OUTLET);
    assert_eq!(children[1].outlet(), "popup");
}

#[test]
fn test_duplicate_empty_path_outlets_conflict() {
    let config = vec![
        Arc::new(Route {
            path: Some(String::new()),
            component: Some("X1".into()),
            outlet: Some("x".to_string()),
            ..Route::default()
        }),
        Arc::new(Route {
            path: Some(String::new()),
            component: Some("X2".into()),
            outlet: Some("x".to_string()),
            ..Route::default()
        }),
    ];
    let err = try_recognize(config, "/").unwrap_err();
    assert!(matches!(err, RecognizeError::OutletConflict { .. }));
}

#[test]
fn test_last_path_index_positions() {
    let config = vec![Arc::new(Route {
        path: Some("team/:id".to_string()),
        component: Some("TeamPage".into()),
        children: Some(vec![component_route("user/:name", "UserPage")]),
        ..Route::default()
    })];
    let state = recognize_url(config, "/team/33/user/bob");
    let team = &state.root().children()[0];
    let user = &team.children()[0];
    assert_eq!(team.last_path_index(), 1);
    assert_eq!(user.last_path_index(), 3);
    // Both snapshots trace back to the same source group holding the full
    // primary chain.
    assert_eq!(user.url_segment_group().segments.len(), 4);
}
