//! The activation step of a committed transition.
//!
//! Deactivation walks child-before-parent, tearing down (or detaching)
//! outlets whose routes left the tree. Activation then walks
//! parent-before-child, advancing the streams of reused routes and
//! mounting (or re-attaching) components for entering routes.

use crate::events::RouterEvent;
use crate::outlet::ChildrenOutletContexts;
use crate::reuse::{DetachedRouteHandle, RouteReuseStrategy};
use crate::state::{advance_activated_route, ActivatedRoute, RouterState};
use std::sync::Arc;

pub(crate) fn activate_routes(
    strategy: &dyn RouteReuseStrategy,
    future_state: &RouterState,
    prev_state: &RouterState,
    contexts: &ChildrenOutletContexts,
    emit: &dyn Fn(RouterEvent),
) {
    deactivate_child_routes(strategy, future_state.root(), Some(prev_state.root()), contexts);
    activate_child_routes(strategy, future_state.root(), Some(prev_state.root()), contexts, emit);
}

fn pair_children(
    future: &Arc<ActivatedRoute>,
    curr: Option<&Arc<ActivatedRoute>>,
) -> (Vec<Arc<ActivatedRoute>>, Vec<Arc<ActivatedRoute>>) {
    let future_children = future.children();
    let prev_children = curr.map(|c| c.children()).unwrap_or_default();
    (future_children, prev_children)
}

fn deactivate_child_routes(
    strategy: &dyn RouteReuseStrategy,
    future: &Arc<ActivatedRoute>,
    curr: Option<&Arc<ActivatedRoute>>,
    contexts: &ChildrenOutletContexts,
) {
    let (future_children, mut prev_children) = pair_children(future, curr);

    for future_child in &future_children {
        let paired = prev_children
            .iter()
            .position(|p| p.outlet() == future_child.outlet())
            .map(|i| prev_children.remove(i));
        deactivate_routes(strategy, future_child, paired.as_ref(), contexts);
    }

    // Routes whose outlet has no counterpart in the future tree go away
    // entirely.
    for leftover in prev_children {
        deactivate_route_and_its_children(strategy, &leftover, contexts);
    }
}

fn deactivate_routes(
    strategy: &dyn RouteReuseStrategy,
    future: &Arc<ActivatedRoute>,
    curr: Option<&Arc<ActivatedRoute>>,
    parent_contexts: &ChildrenOutletContexts,
) {
    match curr {
        Some(curr) if Arc::ptr_eq(future, curr) => {
            if future.component().is_some() {
                let context = parent_contexts.get_or_create_context(future.outlet());
                deactivate_child_routes(strategy, future, Some(curr), &context.children);
            } else {
                deactivate_child_routes(strategy, future, Some(curr), parent_contexts);
            }
        }
        Some(curr) => {
            deactivate_route_and_its_children(strategy, curr, parent_contexts);
        }
        None => {}
    }
}

fn deactivate_route_and_its_children(
    strategy: &dyn RouteReuseStrategy,
    route: &Arc<ActivatedRoute>,
    parent_contexts: &ChildrenOutletContexts,
) {
    if strategy.should_detach(&route.snapshot()) {
        detach_and_store_route_subtree(strategy, route, parent_contexts);
    } else {
        deactivate_route_and_outlet(strategy, route, parent_contexts);
    }
}

fn detach_and_store_route_subtree(
    strategy: &dyn RouteReuseStrategy,
    route: &Arc<ActivatedRoute>,
    parent_contexts: &ChildrenOutletContexts,
) {
    let context = parent_contexts.get_context(route.outlet());
    let (component, contexts) = match context {
        Some(context) => {
            let component = context.outlet().and_then(|o| o.detach());
            let children = context.children.on_outlet_deactivated();
            context.set_route(None);
            (component, children)
        }
        None => (None, Default::default()),
    };
    strategy.store(
        &route.snapshot(),
        Some(DetachedRouteHandle {
            route: Arc::clone(route),
            component,
            contexts,
        }),
    );
}

fn deactivate_route_and_outlet(
    strategy: &dyn RouteReuseStrategy,
    route: &Arc<ActivatedRoute>,
    parent_contexts: &ChildrenOutletContexts,
) {
    let context = parent_contexts.get_context(route.outlet());

    // Children tear down before the component they live in.
    if route.component().is_some() {
        if let Some(context) = &context {
            for child in route.children() {
                deactivate_route_and_its_children(strategy, &child, &context.children);
            }
        }
    } else {
        for child in route.children() {
            deactivate_route_and_its_children(strategy, &child, parent_contexts);
        }
    }

    if let Some(context) = context {
        if let Some(outlet) = context.outlet() {
            outlet.deactivate();
            context.children.on_outlet_deactivated();
        }
        context.set_route(None);
    }
}

fn activate_child_routes(
    strategy: &dyn RouteReuseStrategy,
    future: &Arc<ActivatedRoute>,
    curr: Option<&Arc<ActivatedRoute>>,
    contexts: &ChildrenOutletContexts,
    emit: &dyn Fn(RouterEvent),
) {
    let (future_children, mut prev_children) = pair_children(future, curr);

    for future_child in &future_children {
        let paired = prev_children
            .iter()
            .position(|p| p.outlet() == future_child.outlet())
            .map(|i| prev_children.remove(i));
        activate_route(strategy, future_child, paired.as_ref(), contexts, emit);
        emit(RouterEvent::ActivationEnd {
            route_path: future_child.snapshot().route_path(),
        });
    }
    if !future_children.is_empty() {
        emit(RouterEvent::ChildActivationEnd {
            route_path: future.snapshot().route_path(),
        });
    }
}

fn activate_route(
    strategy: &dyn RouteReuseStrategy,
    future: &Arc<ActivatedRoute>,
    curr: Option<&Arc<ActivatedRoute>>,
    parent_contexts: &ChildrenOutletContexts,
    emit: &dyn Fn(RouterEvent),
) {
    advance_activated_route(future);

    match curr {
        Some(curr) if Arc::ptr_eq(future, curr) => {
            if future.component().is_some() {
                let context = parent_contexts.get_or_create_context(future.outlet());
                activate_child_routes(strategy, future, Some(curr), &context.children, emit);
            } else {
                activate_child_routes(strategy, future, Some(curr), parent_contexts, emit);
            }
        }
        _ => {
            if future.component().is_some() {
                let context = parent_contexts.get_or_create_context(future.outlet());
                let snapshot = future.snapshot();
                if strategy.should_attach(&snapshot) {
                    if let Some(stored) = strategy.retrieve(&snapshot) {
                        strategy.store(&snapshot, None);
                        context.children.on_outlet_reattached(stored.contexts);
                        context.set_route(Some(Arc::clone(&stored.route)));
                        if let Some(outlet) = context.outlet() {
                            if let Some(component) = stored.component {
                                outlet.attach(component, &stored.route);
                            }
                        }
                        advance_route_and_children(&stored.route);
                        return;
                    }
                }
                context.set_route(Some(Arc::clone(future)));
                if let Some(outlet) = context.outlet() {
                    outlet.activate(future);
                }
                activate_child_routes(strategy, future, None, &context.children, emit);
            } else {
                activate_child_routes(strategy, future, None, parent_contexts, emit);
            }
        }
    }
}

fn advance_route_and_children(route: &Arc<ActivatedRoute>) {
    advance_activated_route(route);
    for child in route.children() {
        advance_route_and_children(&child);
    }
}
