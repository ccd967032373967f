//! Check collection: the diff walk over (future, current) snapshot trees.
//!
//! Produces the `canDeactivate` checks (current routes leaving the tree,
//! child before parent) and the `canActivate` checks (future routes
//! entering or re-running, parent before child, each carrying its path
//! from the root for ancestor `canActivateChild` guards).

use super::traits::GuardRef;
use crate::config::{same_route_config, ComponentId, RunGuardsAndResolvers};
use crate::outlet::{ChildrenOutletContexts, OutletContext};
use crate::params::{params_shallow_eq, query_shallow_eq};
use crate::state::{ActivatedRouteSnapshot, RouterStateSnapshot};
use crate::url::equal_segments;
use std::sync::Arc;

/// One pending activation: the path from the root to the entering route.
pub(crate) struct CanActivateCheck {
    pub path: Vec<Arc<ActivatedRouteSnapshot>>,
}

impl CanActivateCheck {
    pub(crate) fn route(&self) -> &Arc<ActivatedRouteSnapshot> {
        self.path.last().expect("activation path never empty")
    }

    pub(crate) fn parent(&self) -> Option<&Arc<ActivatedRouteSnapshot>> {
        if self.path.len() >= 2 {
            self.path.get(self.path.len() - 2)
        } else {
            None
        }
    }
}

/// One pending deactivation: the leaving route and the component mounted
/// in its outlet, if any.
pub(crate) struct CanDeactivateCheck {
    pub component: Option<ComponentId>,
    pub route: Arc<ActivatedRouteSnapshot>,
}

#[derive(Default)]
pub(crate) struct Checks {
    pub can_deactivate: Vec<CanDeactivateCheck>,
    pub can_activate: Vec<CanActivateCheck>,
}

/// Compute both check sets for a transition.
pub(crate) fn get_all_route_guards(
    future: &RouterStateSnapshot,
    current: &RouterStateSnapshot,
    contexts: &ChildrenOutletContexts,
) -> Checks {
    let mut checks = Checks::default();
    get_child_route_guards(
        future.root(),
        Some(current.root()),
        Some(contexts),
        &mut vec![Arc::clone(future.root())],
        &mut checks,
        true,
    );
    checks
}

fn get_child_route_guards(
    future_node: &Arc<ActivatedRouteSnapshot>,
    curr_node: Option<&Arc<ActivatedRouteSnapshot>>,
    contexts: Option<&ChildrenOutletContexts>,
    future_path: &mut Vec<Arc<ActivatedRouteSnapshot>>,
    checks: &mut Checks,
    parent_chain_equal: bool,
) {
    let mut prev_children: Vec<Arc<ActivatedRouteSnapshot>> = curr_node
        .map(|n| n.children().to_vec())
        .unwrap_or_default();

    for child in future_node.children() {
        let paired = prev_children
            .iter()
            .position(|p| p.outlet() == child.outlet())
            .map(|i| prev_children.remove(i));
        future_path.push(Arc::clone(child));
        get_route_guards(
            child,
            paired.as_ref(),
            contexts,
            future_path,
            checks,
            parent_chain_equal,
        );
        future_path.pop();
    }

    for leftover in prev_children {
        let context = contexts.and_then(|c| c.get_context(leftover.outlet()));
        deactivate_route_and_its_children(&leftover, context.as_deref(), checks);
    }
}

fn get_route_guards(
    future: &Arc<ActivatedRouteSnapshot>,
    curr: Option<&Arc<ActivatedRouteSnapshot>>,
    parent_contexts: Option<&ChildrenOutletContexts>,
    future_path: &mut Vec<Arc<ActivatedRouteSnapshot>>,
    checks: &mut Checks,
    parent_chain_equal: bool,
) {
    let context = parent_contexts.and_then(|c| c.get_context(future.outlet()));

    match curr {
        Some(curr) if same_route_config(future.route_config(), curr.route_config()) => {
            let nodes_equal = params_shallow_eq(&curr.params(), &future.params())
                && equal_segments(curr.url(), future.url());
            let chain_equal = parent_chain_equal && nodes_equal;
            let should_run = should_run_guards_and_resolvers(curr, future, chain_equal);

            if should_run {
                checks.can_activate.push(CanActivateCheck {
                    path: future_path.clone(),
                });
            } else {
                // The snapshot continues unchanged: carry forward the data
                // the previous navigation resolved.
                future.set_data(curr.data());
                future.set_resolved_data(curr.resolved_data());
            }

            if future.component().is_some() {
                get_child_route_guards(
                    future,
                    Some(curr),
                    context.as_ref().map(|c| &c.children),
                    future_path,
                    checks,
                    chain_equal,
                );
            } else {
                get_child_route_guards(
                    future,
                    Some(curr),
                    parent_contexts,
                    future_path,
                    checks,
                    chain_equal,
                );
            }

            if should_run {
                let component = context
                    .as_ref()
                    .and_then(|c| c.outlet())
                    .filter(|o| o.is_activated())
                    .and_then(|o| o.activated_component());
                checks.can_deactivate.push(CanDeactivateCheck {
                    component,
                    route: Arc::clone(curr),
                });
            }
        }
        other => {
            if let Some(curr) = other {
                deactivate_route_and_its_children(curr, context.as_deref(), checks);
            }
            checks.can_activate.push(CanActivateCheck {
                path: future_path.clone(),
            });
            if future.component().is_some() {
                get_child_route_guards(
                    future,
                    None,
                    context.as_ref().map(|c| &c.children),
                    future_path,
                    checks,
                    false,
                );
            } else {
                get_child_route_guards(future, None, parent_contexts, future_path, checks, false);
            }
        }
    }
}

fn should_run_guards_and_resolvers(
    curr: &ActivatedRouteSnapshot,
    future: &ActivatedRouteSnapshot,
    chain_equal: bool,
) -> bool {
    let mode = future
        .route_config()
        .map(|r| r.run_guards_and_resolvers)
        .unwrap_or_default();
    match mode {
        RunGuardsAndResolvers::Always => true,
        RunGuardsAndResolvers::ParamsOrQueryParamsChange => {
            !chain_equal || !query_shallow_eq(curr.query_params(), future.query_params())
        }
        RunGuardsAndResolvers::ParamsChange => !chain_equal,
    }
}

fn deactivate_route_and_its_children(
    route: &Arc<ActivatedRouteSnapshot>,
    context: Option<&OutletContext>,
    checks: &mut Checks,
) {
    for child in route.children() {
        if route.component().is_none() {
            deactivate_route_and_its_children(child, context, checks);
        } else {
            let child_context = context.and_then(|c| c.children.get_context(child.outlet()));
            deactivate_route_and_its_children(child, child_context.as_deref(), checks);
        }
    }

    let component = if route.component().is_none() {
        None
    } else {
        context
            .and_then(|c| c.outlet())
            .filter(|o| o.is_activated())
            .and_then(|o| o.activated_component())
    };
    checks.can_deactivate.push(CanDeactivateCheck {
        component,
        route: Arc::clone(route),
    });
}

/// A route with guards referenced by token resolves them against the
/// injector of the nearest ancestor carrying a loaded config.
pub(crate) fn closest_loaded_injector(
    state: &RouterStateSnapshot,
    node: &Arc<ActivatedRouteSnapshot>,
    root: &Arc<dyn crate::injector::Injector>,
) -> Arc<dyn crate::injector::Injector> {
    let path = state.path_from_root(node);
    if path.is_empty() {
        return Arc::clone(root);
    }
    // Start from the parent: a route's own guards were declared in the
    // scope that configured it.
    for ancestor in path[..path.len() - 1].iter().rev() {
        if let Some(route) = ancestor.route_config() {
            if let Some(loaded) = route.loaded_config() {
                return Arc::clone(&loaded.injector);
            }
        }
    }
    Arc::clone(root)
}

/// Resolve a guard reference through an injector lookup function.
pub(crate) fn resolve_guard<T: ?Sized>(
    guard_ref: &GuardRef<T>,
    kind: &str,
    lookup: impl Fn(&str) -> Option<Arc<T>>,
) -> anyhow::Result<Arc<T>> {
    match guard_ref {
        GuardRef::Direct(guard) => Ok(Arc::clone(guard)),
        GuardRef::Token(token) => lookup(token)
            .ok_or_else(|| anyhow::anyhow!("no {kind} guard registered for token '{token}'")),
    }
}
