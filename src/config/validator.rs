//! Structural validation of route tables.
//!
//! Runs once per config install (and again for every lazily loaded child
//! table). Walks the tree computing each node's full path so errors name
//! the offending route, and fails fast on the first violation.

use super::route::{Route, Routes};
use crate::errors::ConfigError;
use crate::url::PRIMARY_OUTLET;

/// Validate a route table. Returns the first violation found, naming the
/// full path of the offending route.
pub fn validate_config(routes: &Routes) -> Result<(), ConfigError> {
    validate_nodes(routes, "")
}

fn validate_nodes(routes: &Routes, parent_path: &str) -> Result<(), ConfigError> {
    for route in routes {
        let full_path = get_full_path(parent_path, route);
        validate_node(route, &full_path)?;
        if let Some(children) = &route.children {
            validate_nodes(children, &full_path)?;
        }
    }
    Ok(())
}

fn get_full_path(parent_path: &str, route: &Route) -> String {
    match (&route.path, parent_path.is_empty()) {
        (None, true) => String::new(),
        (None, false) => format!("{parent_path}/"),
        (Some(path), true) => path.clone(),
        (Some(path), false) => format!("{parent_path}/{path}"),
    }
}

fn validate_node(route: &Route, full_path: &str) -> Result<(), ConfigError> {
    let err = |reason: &str| Err(ConfigError::new(full_path, reason));

    if route.children.is_some() && route.load_children.is_some() {
        return err("children and loadChildren cannot be used together");
    }
    if route.redirect_to.is_some() {
        if route.children.is_some() {
            return err("redirectTo and children cannot be used together");
        }
        if route.load_children.is_some() {
            return err("redirectTo and loadChildren cannot be used together");
        }
        if route.component.is_some() {
            return err("redirectTo and component cannot be used together");
        }
        if !route.can_activate.is_empty() {
            return err(
                "redirectTo and canActivate cannot be used together; \
                 guards on a redirect never run",
            );
        }
    }
    if route.path.is_some() && route.matcher.is_some() {
        return err("path and matcher cannot be used together");
    }
    if route.path.is_none() && route.matcher.is_none() {
        return err("routes must have either a path or a matcher specified");
    }
    if route.redirect_to.is_none()
        && route.component.is_none()
        && route.children.is_none()
        && route.load_children.is_none()
    {
        return err(
            "one of the following must be provided: component, redirectTo, children or loadChildren",
        );
    }
    if route.outlet_name() != PRIMARY_OUTLET
        && route.component.is_none()
        && route.children.is_none()
        && route.load_children.is_none()
    {
        return err("a componentless route cannot have a named outlet set");
    }
    if let Some(path) = &route.path {
        if path.starts_with('/') {
            return err("path cannot start with a slash");
        }
        if path.is_empty() && route.redirect_to.is_some() && route.path_match.is_none() {
            return err(
                "the route with an empty path and redirectTo is ambiguous; \
                 please provide an explicit pathMatch",
            );
        }
    }
    Ok(())
}
