//! Guard and resolver execution.
//!
//! Deactivation guards run first, over the routes leaving the tree. Then
//! each activation runs in order: the `ChildActivationStart` and
//! `ActivationStart` events fire, the ancestors' `canActivateChild`
//! guards run nearest-ancestor-first, and finally the route's own
//! `canActivate` guards. The first non-allowing verdict wins in check
//! order and stops everything after it.
//!
//! Resolvers run after all guards pass, per activation in the same order,
//! key by key. Results land in the snapshot's resolved data and re-merge
//! into `data` through the inheritance rules.

use super::checks::{closest_loaded_injector, resolve_guard, CanActivateCheck, Checks};
use super::traits::GuardVerdict;
use crate::config::{RouteTitle, ROUTE_TITLE_KEY};
use crate::errors::RouterError;
use crate::events::RouterEvent;
use crate::injector::Injector;
use crate::params::Data;
use crate::recognition::{inherited_params_data_resolve, ParamsInheritance};
use crate::state::RouterStateSnapshot;
use std::sync::Arc;
use tracing::debug;

/// Run all deactivation and activation guards. The first denial or
/// redirect short-circuits.
pub(crate) fn run_guards(
    checks: &Checks,
    future_state: &RouterStateSnapshot,
    current_state: &RouterStateSnapshot,
    root_injector: &Arc<dyn Injector>,
    emit: &dyn Fn(RouterEvent),
) -> Result<GuardVerdict, RouterError> {
    debug!(
        deactivations = checks.can_deactivate.len(),
        activations = checks.can_activate.len(),
        "Running guards"
    );

    let verdict =
        run_can_deactivate_checks(checks, future_state, current_state, root_injector)?;
    if !verdict.is_allow() {
        return Ok(verdict);
    }
    run_can_activate_checks(checks, future_state, root_injector, emit)
}

fn run_can_deactivate_checks(
    checks: &Checks,
    future_state: &RouterStateSnapshot,
    current_state: &RouterStateSnapshot,
    root_injector: &Arc<dyn Injector>,
) -> Result<GuardVerdict, RouterError> {
    for check in &checks.can_deactivate {
        let Some(route_config) = check.route.route_config().cloned() else {
            continue;
        };
        if route_config.can_deactivate.is_empty() {
            continue;
        }
        let injector = closest_loaded_injector(current_state, &check.route, root_injector);
        for guard_ref in &route_config.can_deactivate {
            let guard = resolve_guard(guard_ref, "canDeactivate", |t| injector.can_deactivate(t))
                .map_err(RouterError::guard)?;
            let verdict = guard
                .can_deactivate(
                    check.component.as_ref(),
                    &check.route,
                    current_state,
                    future_state,
                )
                .map_err(RouterError::guard)?;
            if !verdict.is_allow() {
                return Ok(verdict);
            }
        }
    }
    Ok(GuardVerdict::Allow)
}

fn run_can_activate_checks(
    checks: &Checks,
    future_state: &RouterStateSnapshot,
    root_injector: &Arc<dyn Injector>,
    emit: &dyn Fn(RouterEvent),
) -> Result<GuardVerdict, RouterError> {
    for check in &checks.can_activate {
        if let Some(parent) = check.parent() {
            emit(RouterEvent::ChildActivationStart {
                route_path: parent.route_path(),
            });
        }
        emit(RouterEvent::ActivationStart {
            route_path: check.route().route_path(),
        });

        let verdict = run_can_activate_child(check, future_state, root_injector)?;
        if !verdict.is_allow() {
            return Ok(verdict);
        }
        let verdict = run_can_activate(check, future_state, root_injector)?;
        if !verdict.is_allow() {
            return Ok(verdict);
        }
    }
    Ok(GuardVerdict::Allow)
}

/// Run the `canActivateChild` guards of every ancestor of the entering
/// route, nearest ancestor first.
fn run_can_activate_child(
    check: &CanActivateCheck,
    future_state: &RouterStateSnapshot,
    root_injector: &Arc<dyn Injector>,
) -> Result<GuardVerdict, RouterError> {
    let child = check.route();
    for ancestor in check.path[..check.path.len() - 1].iter().rev() {
        let Some(route_config) = ancestor.route_config().cloned() else {
            continue;
        };
        if route_config.can_activate_child.is_empty() {
            continue;
        }
        let injector = closest_loaded_injector(future_state, ancestor, root_injector);
        for guard_ref in &route_config.can_activate_child {
            let guard =
                resolve_guard(guard_ref, "canActivateChild", |t| {
                    injector.can_activate_child(t)
                })
                .map_err(RouterError::guard)?;
            let verdict = guard
                .can_activate_child(child, future_state)
                .map_err(RouterError::guard)?;
            if !verdict.is_allow() {
                return Ok(verdict);
            }
        }
    }
    Ok(GuardVerdict::Allow)
}

fn run_can_activate(
    check: &CanActivateCheck,
    future_state: &RouterStateSnapshot,
    root_injector: &Arc<dyn Injector>,
) -> Result<GuardVerdict, RouterError> {
    let route = check.route();
    let Some(route_config) = route.route_config().cloned() else {
        return Ok(GuardVerdict::Allow);
    };
    if route_config.can_activate.is_empty() {
        return Ok(GuardVerdict::Allow);
    }
    let injector = closest_loaded_injector(future_state, route, root_injector);
    for guard_ref in &route_config.can_activate {
        let guard = resolve_guard(guard_ref, "canActivate", |t| injector.can_activate(t))
            .map_err(RouterError::guard)?;
        let verdict = guard
            .can_activate(route, future_state)
            .map_err(RouterError::guard)?;
        if !verdict.is_allow() {
            return Ok(verdict);
        }
    }
    Ok(GuardVerdict::Allow)
}

/// Run the resolvers of every activation, in check order. Results are
/// stored on the snapshot and merged into its data.
pub(crate) fn resolve_data(
    checks: &Checks,
    future_state: &RouterStateSnapshot,
    root_injector: &Arc<dyn Injector>,
    params_inheritance: ParamsInheritance,
) -> Result<(), RouterError> {
    for check in &checks.can_activate {
        let route = check.route();
        let Some(route_config) = route.route_config().cloned() else {
            continue;
        };

        let mut resolved = Data::new();
        let injector = closest_loaded_injector(future_state, route, root_injector);

        if let Some(title) = &route_config.title {
            match title {
                RouteTitle::Static(value) => {
                    resolved.insert(
                        ROUTE_TITLE_KEY.to_string(),
                        serde_json::Value::String(value.clone()),
                    );
                }
                RouteTitle::Resolve(resolver_ref) => {
                    let resolver = resolve_guard(resolver_ref, "title", |t| injector.resolver(t))
                        .map_err(RouterError::resolve)?;
                    let value = resolver
                        .resolve(route, future_state)
                        .map_err(RouterError::resolve)?;
                    resolved.insert(ROUTE_TITLE_KEY.to_string(), value);
                }
            }
        }

        for (key, resolver_ref) in &route_config.resolve {
            let resolver = resolve_guard(resolver_ref, "resolve", |t| injector.resolver(t))
                .map_err(RouterError::resolve)?;
            let value = resolver
                .resolve(route, future_state)
                .map_err(RouterError::resolve)?;
            resolved.insert(key.clone(), value);
        }

        if resolved.is_empty()
            && route_config.resolve.is_empty()
            && route_config.title.is_none()
        {
            continue;
        }

        route.set_resolved_data(resolved);
        let inherited = inherited_params_data_resolve(&check.path, params_inheritance);
        let mut data = route.data();
        for (k, v) in inherited.resolve {
            data.insert(k, v);
        }
        route.set_data(data);
    }
    Ok(())
}
