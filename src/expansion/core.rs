//! Redirect expansion.
//!
//! Walks the parsed URL tree against the route table, rewriting
//! `redirectTo` rules into their targets and realizing lazily loaded child
//! configurations on the way. The output is the canonical URL tree that
//! recognition consumes.
//!
//! Two internal signals drive the control flow: `NoMatch` makes the walk
//! try the next candidate route (and surfaces as "cannot match any routes"
//! once every candidate failed), and `Absolute` aborts the walk to restart
//! matching from the redirect target with further redirects disabled,
//! which breaks redirect loops.

use super::ExpansionFailure;
use crate::config::{validate_config, LoadedRouterConfig, Route, Routes};
use crate::errors::{NavigationCancelingError, RouterError};
use crate::events::RouterEvent;
use crate::guards::{GuardRef, GuardVerdict};
use crate::injector::Injector;
use crate::loader::RouteLoader;
use crate::matching::{match_route, split_for_redirects};
use crate::params::{QueryParams, QueryValue};
use crate::url::{
    serialize_segments, UrlSegment, UrlSegmentGroup, UrlSerializer, UrlTree, PRIMARY_OUTLET,
};
use std::cell::Cell;
use std::sync::Arc;
use tracing::{debug, info};

/// Internal expansion outcome. `NoMatch` and `Absolute` never escape this
/// module.
enum ExpandError {
    NoMatch(String),
    Absolute(UrlTree),
    Cancel(NavigationCancelingError),
    Fail(RouterError),
}

/// Expand `url_tree` against `config`, applying redirects and loading
/// lazy children. `emit` receives `RouteConfigLoadStart`/`End` events.
pub(crate) fn apply_redirects(
    injector: &Arc<dyn Injector>,
    loader: &dyn RouteLoader,
    serializer: &dyn UrlSerializer,
    emit: &dyn Fn(RouterEvent),
    url_tree: &UrlTree,
    config: &Routes,
) -> Result<UrlTree, ExpansionFailure> {
    let applier = RedirectApplier {
        loader,
        serializer,
        emit,
        url_tree,
        config,
        allow_redirects: Cell::new(true),
    };

    let result = applier.expand(injector, url_tree);
    let result = match result {
        Err(ExpandError::Absolute(new_tree)) => {
            debug!(url = %serializer.serialize(&new_tree), "Absolute redirect, matching restarted");
            applier.allow_redirects.set(false);
            applier.expand(injector, &new_tree)
        }
        other => other,
    };

    match result {
        Ok(tree) => Ok(tree),
        Err(ExpandError::NoMatch(segment_group)) => {
            Err(ExpansionFailure::Error(RouterError::NoMatch { segment_group }))
        }
        // A nested absolute redirect while redirects are disabled would be
        // a loop; surface it as a no-match on the redirect target.
        Err(ExpandError::Absolute(tree)) => Err(ExpansionFailure::Error(RouterError::NoMatch {
            segment_group: serializer.serialize(&tree),
        })),
        Err(ExpandError::Cancel(cancel)) => Err(ExpansionFailure::Cancel(cancel)),
        Err(ExpandError::Fail(error)) => Err(ExpansionFailure::Error(error)),
    }
}

struct RedirectApplier<'a> {
    loader: &'a dyn RouteLoader,
    serializer: &'a dyn UrlSerializer,
    emit: &'a dyn Fn(RouterEvent),
    url_tree: &'a UrlTree,
    config: &'a Routes,
    allow_redirects: Cell<bool>,
}

impl<'a> RedirectApplier<'a> {
    fn expand(&self, injector: &Arc<dyn Injector>, tree: &UrlTree) -> Result<UrlTree, ExpandError> {
        let root =
            self.expand_segment_group(injector, self.config, &tree.root, PRIMARY_OUTLET)?;
        // A root that ended up carrying segments (an expanded redirect)
        // is re-wrapped so the root stays segmentless.
        let root = if root.segments.is_empty() {
            root
        } else {
            UrlSegmentGroup::new(Vec::new(), vec![(PRIMARY_OUTLET.to_string(), root)])
        };
        Ok(UrlTree::new(
            root,
            tree.query_params.clone(),
            tree.fragment.clone(),
        ))
    }

    fn expand_segment_group(
        &self,
        injector: &Arc<dyn Injector>,
        routes: &Routes,
        group: &Arc<UrlSegmentGroup>,
        outlet: &str,
    ) -> Result<Arc<UrlSegmentGroup>, ExpandError> {
        if group.segments.is_empty() && group.has_children() {
            let children = self.expand_children(injector, routes, group)?;
            return Ok(UrlSegmentGroup::new(Vec::new(), children));
        }
        self.expand_segment(injector, group, routes, &group.segments, outlet, true)
    }

    /// Expand the children of a group one outlet at a time, primary first:
    /// an absolute redirect from the primary outlet takes precedence over
    /// secondary outlets.
    fn expand_children(
        &self,
        injector: &Arc<dyn Injector>,
        routes: &Routes,
        group: &Arc<UrlSegmentGroup>,
    ) -> Result<Vec<(String, Arc<UrlSegmentGroup>)>, ExpandError> {
        let mut children = Vec::with_capacity(group.num_children());
        for outlet in group.outlets_primary_first() {
            let child = group.child(&outlet).expect("outlet listed but missing");
            let expanded = self.expand_segment_group(injector, routes, child, &outlet)?;
            children.push((outlet, expanded));
        }
        Ok(children)
    }

    fn expand_segment(
        &self,
        injector: &Arc<dyn Injector>,
        group: &Arc<UrlSegmentGroup>,
        routes: &Routes,
        segments: &[UrlSegment],
        outlet: &str,
        allow_redirects: bool,
    ) -> Result<Arc<UrlSegmentGroup>, ExpandError> {
        for route in routes {
            match self.expand_segment_against_route(
                injector,
                group,
                routes,
                route,
                segments,
                outlet,
                allow_redirects,
            ) {
                Ok(expanded) => return Ok(expanded),
                Err(ExpandError::NoMatch(_)) => continue,
                Err(other) => return Err(other),
            }
        }
        if segments.is_empty() && group.child(outlet).is_none() {
            return Ok(UrlSegmentGroup::empty());
        }
        Err(ExpandError::NoMatch(serialize_segments(segments)))
    }

    #[allow(clippy::too_many_arguments)]
    fn expand_segment_against_route(
        &self,
        injector: &Arc<dyn Injector>,
        group: &Arc<UrlSegmentGroup>,
        routes: &Routes,
        route: &Arc<Route>,
        segments: &[UrlSegment],
        outlet: &str,
        allow_redirects: bool,
    ) -> Result<Arc<UrlSegmentGroup>, ExpandError> {
        if route.outlet_name() != outlet {
            return Err(ExpandError::NoMatch(serialize_segments(segments)));
        }
        if route.redirect_to.is_none() {
            return self.match_segment_against_route(injector, group, route, segments, outlet);
        }
        if self.allow_redirects.get() && allow_redirects {
            return self.expand_using_redirect(injector, group, routes, route, segments, outlet);
        }
        Err(ExpandError::NoMatch(serialize_segments(segments)))
    }

    fn expand_using_redirect(
        &self,
        injector: &Arc<dyn Injector>,
        group: &Arc<UrlSegmentGroup>,
        routes: &Routes,
        route: &Arc<Route>,
        segments: &[UrlSegment],
        outlet: &str,
    ) -> Result<Arc<UrlSegmentGroup>, ExpandError> {
        let redirect_to = route.redirect_to.as_deref().expect("redirect route");

        if route.is_wildcard() {
            let new_tree = self.apply_redirect_commands(&[], redirect_to, &[])?;
            if redirect_to.starts_with('/') {
                return Err(ExpandError::Absolute(new_tree));
            }
            let new_segments = self.lineralize_segments(redirect_to, &new_tree)?;
            let new_group = UrlSegmentGroup::new(new_segments.clone(), Vec::new());
            return self.expand_segment(injector, &new_group, routes, &new_segments, outlet, false);
        }

        let outcome = match_route(group, route, segments)
            .ok_or_else(|| ExpandError::NoMatch(serialize_segments(segments)))?;
        let new_tree =
            self.apply_redirect_commands(&outcome.consumed, redirect_to, &outcome.pos_params)?;
        if redirect_to.starts_with('/') {
            return Err(ExpandError::Absolute(new_tree));
        }

        let new_segments = self.lineralize_segments(redirect_to, &new_tree)?;
        let mut combined = new_segments;
        combined.extend_from_slice(&segments[outcome.last_child..]);
        self.expand_segment(injector, group, routes, &combined, outlet, false)
    }

    fn match_segment_against_route(
        &self,
        injector: &Arc<dyn Injector>,
        raw_group: &Arc<UrlSegmentGroup>,
        route: &Arc<Route>,
        segments: &[UrlSegment],
        outlet: &str,
    ) -> Result<Arc<UrlSegmentGroup>, ExpandError> {
        self.run_can_match_guards(injector, route, segments)?;

        if route.is_wildcard() {
            if route.load_children.is_some() {
                // Realize the lazy config even on a wildcard so recognition
                // sees the loaded routes.
                self.child_config(injector, route, segments)?;
            }
            return Ok(UrlSegmentGroup::new(segments.to_vec(), Vec::new()));
        }

        let outcome = match_route(raw_group, route, segments)
            .ok_or_else(|| ExpandError::NoMatch(serialize_segments(segments)))?;
        let raw_sliced = &segments[outcome.last_child..];
        let (child_routes, child_injector) = self.child_config(injector, route, segments)?;

        let (segment_group, sliced) =
            split_for_redirects(raw_group, &outcome.consumed, raw_sliced, &child_routes);

        if sliced.is_empty() && segment_group.has_children() {
            let children = self.expand_children(&child_injector, &child_routes, &segment_group)?;
            return Ok(UrlSegmentGroup::new(outcome.consumed, children));
        }
        if child_routes.is_empty() && sliced.is_empty() {
            return Ok(UrlSegmentGroup::new(outcome.consumed, Vec::new()));
        }

        let expanded = self.expand_segment(
            &child_injector,
            &segment_group,
            &child_routes,
            &sliced,
            PRIMARY_OUTLET,
            true,
        )?;
        let mut all_segments = outcome.consumed;
        all_segments.extend(expanded.segments.iter().cloned());
        let children = expanded
            .children()
            .map(|(name, child)| (name.to_string(), Arc::clone(child)))
            .collect();
        Ok(UrlSegmentGroup::new(all_segments, children))
    }

    /// Resolve the child configuration of a matched route: eager children
    /// as-is, lazy children through the loader gated by `canLoad`.
    fn child_config(
        &self,
        injector: &Arc<dyn Injector>,
        route: &Arc<Route>,
        segments: &[UrlSegment],
    ) -> Result<(Routes, Arc<dyn Injector>), ExpandError> {
        if let Some(children) = &route.children {
            return Ok((children.clone(), Arc::clone(injector)));
        }
        if route.load_children.is_none() {
            return Ok((Vec::new(), Arc::clone(injector)));
        }

        if let Some(loaded) = route.loaded_config() {
            return Ok((loaded.routes.clone(), Arc::clone(&loaded.injector)));
        }

        self.run_can_load_guards(injector, route, segments)?;

        let route_path = route.path.clone().unwrap_or_default();
        (self.emit)(RouterEvent::RouteConfigLoadStart {
            route_path: route_path.clone(),
        });
        let loaded = self
            .loader
            .load(injector, route)
            .map_err(|e| ExpandError::Fail(RouterError::load(e)))?;
        validate_config(&loaded.routes)
            .map_err(|e| ExpandError::Fail(RouterError::Config(e)))?;
        (self.emit)(RouterEvent::RouteConfigLoadEnd {
            route_path: route_path.clone(),
        });

        info!(route_path = %route_path, routes = loaded.routes.len(), "Lazy route configuration loaded");

        let loaded = Arc::new(LoadedRouterConfig::new(loaded.routes, loaded.injector));
        route.set_loaded_config(Arc::clone(&loaded));
        Ok((loaded.routes.clone(), Arc::clone(&loaded.injector)))
    }

    fn run_can_load_guards(
        &self,
        injector: &Arc<dyn Injector>,
        route: &Arc<Route>,
        segments: &[UrlSegment],
    ) -> Result<(), ExpandError> {
        for guard_ref in &route.can_load {
            let guard = match guard_ref {
                GuardRef::Direct(guard) => Arc::clone(guard),
                GuardRef::Token(token) => injector.can_load(token).ok_or_else(|| {
                    ExpandError::Fail(RouterError::guard(anyhow::anyhow!(
                        "no canLoad guard registered for token '{token}'"
                    )))
                })?,
            };
            match guard.can_load(route, segments) {
                Ok(GuardVerdict::Allow) => {}
                Ok(GuardVerdict::Deny) => {
                    return Err(ExpandError::Cancel(NavigationCancelingError::new(format!(
                        "cannot load children because the guard of the route with path '{}' returned false",
                        route.path.as_deref().unwrap_or("")
                    ))));
                }
                Ok(GuardVerdict::Redirect(tree)) => {
                    return Err(ExpandError::Cancel(NavigationCancelingError::redirecting(
                        tree,
                        format!(
                            "canLoad guard of the route with path '{}' redirected",
                            route.path.as_deref().unwrap_or("")
                        ),
                    )));
                }
                Err(e) => return Err(ExpandError::Fail(RouterError::guard(e))),
            }
        }
        Ok(())
    }

    /// `canMatch` denial skips the route (matching continues with the next
    /// candidate); a redirect cancels the navigation toward the new tree.
    fn run_can_match_guards(
        &self,
        injector: &Arc<dyn Injector>,
        route: &Arc<Route>,
        segments: &[UrlSegment],
    ) -> Result<(), ExpandError> {
        for guard_ref in &route.can_match {
            let guard = match guard_ref {
                GuardRef::Direct(guard) => Arc::clone(guard),
                GuardRef::Token(token) => injector.can_match(token).ok_or_else(|| {
                    ExpandError::Fail(RouterError::guard(anyhow::anyhow!(
                        "no canMatch guard registered for token '{token}'"
                    )))
                })?,
            };
            match guard.can_match(route, segments) {
                Ok(GuardVerdict::Allow) => {}
                Ok(GuardVerdict::Deny) => {
                    return Err(ExpandError::NoMatch(serialize_segments(segments)));
                }
                Ok(GuardVerdict::Redirect(tree)) => {
                    return Err(ExpandError::Cancel(NavigationCancelingError::redirecting(
                        tree,
                        format!(
                            "canMatch guard of the route with path '{}' redirected",
                            route.path.as_deref().unwrap_or("")
                        ),
                    )));
                }
                Err(e) => return Err(ExpandError::Fail(RouterError::guard(e))),
            }
        }
        Ok(())
    }

    /// Parse a `redirectTo` string and substitute positional params and
    /// matched segments into it.
    fn apply_redirect_commands(
        &self,
        consumed: &[UrlSegment],
        redirect_to: &str,
        pos_params: &[(String, UrlSegment)],
    ) -> Result<UrlTree, ExpandError> {
        let redirect_tree = self
            .serializer
            .parse(redirect_to)
            .map_err(|e| ExpandError::Fail(RouterError::Parse(e)))?;
        let root =
            self.create_segment_group(redirect_to, &redirect_tree.root, consumed, pos_params)?;
        let query_params =
            create_query_params(&redirect_tree.query_params, &self.url_tree.query_params);
        Ok(UrlTree::new(root, query_params, redirect_tree.fragment))
    }

    fn create_segment_group(
        &self,
        redirect_to: &str,
        group: &Arc<UrlSegmentGroup>,
        consumed: &[UrlSegment],
        pos_params: &[(String, UrlSegment)],
    ) -> Result<Arc<UrlSegmentGroup>, ExpandError> {
        let segments = self.create_segments(redirect_to, &group.segments, consumed, pos_params)?;
        let mut children = Vec::with_capacity(group.num_children());
        for (name, child) in group.children() {
            let new_child = self.create_segment_group(redirect_to, child, consumed, pos_params)?;
            children.push((name.to_string(), new_child));
        }
        Ok(UrlSegmentGroup::new(segments, children))
    }

    fn create_segments(
        &self,
        redirect_to: &str,
        redirect_segments: &[UrlSegment],
        actual_segments: &[UrlSegment],
        pos_params: &[(String, UrlSegment)],
    ) -> Result<Vec<UrlSegment>, ExpandError> {
        redirect_segments
            .iter()
            .map(|segment| {
                if let Some(name) = segment.path.strip_prefix(':') {
                    pos_params
                        .iter()
                        .find(|(param, _)| param == name)
                        .map(|(_, actual)| actual.clone())
                        .ok_or_else(|| {
                            ExpandError::Fail(RouterError::InvalidCommand {
                                message: format!(
                                    "cannot redirect to '{redirect_to}': cannot find '{}'",
                                    segment.path
                                ),
                            })
                        })
                } else {
                    // A literal that also appears in the consumed segments
                    // is taken from there, keeping its matrix params.
                    Ok(actual_segments
                        .iter()
                        .find(|actual| actual.path == segment.path)
                        .cloned()
                        .unwrap_or_else(|| segment.clone()))
                }
            })
            .collect()
    }

    /// Flatten a relative redirect target into a plain segment list. Only
    /// absolute redirects may fan out into named outlets.
    fn lineralize_segments(
        &self,
        redirect_to: &str,
        tree: &UrlTree,
    ) -> Result<Vec<UrlSegment>, ExpandError> {
        let mut segments = Vec::new();
        let mut current = Arc::clone(&tree.root);
        loop {
            segments.extend(current.segments.iter().cloned());
            if current.num_children() == 0 {
                return Ok(segments);
            }
            if current.num_children() > 1 || current.child(PRIMARY_OUTLET).is_none() {
                return Err(ExpandError::Fail(RouterError::InvalidCommand {
                    message: format!(
                        "only absolute redirects can have named outlets. redirectTo: '{redirect_to}'"
                    ),
                }));
            }
            let next = Arc::clone(current.child(PRIMARY_OUTLET).expect("primary child present"));
            current = next;
        }
    }
}

fn create_query_params(redirect_params: &QueryParams, actual_params: &QueryParams) -> QueryParams {
    let mut result = QueryParams::new();
    for (key, value) in redirect_params.iter() {
        let substitute = match value {
            QueryValue::Single(v) => v.strip_prefix(':'),
            QueryValue::List(_) => None,
        };
        match substitute {
            Some(actual_key) => {
                if let Some(values) = actual_params.get_all(actual_key) {
                    if values.len() == 1 {
                        result.insert(key.clone(), values[0].clone());
                    } else {
                        result.insert(key.clone(), QueryValue::List(values.to_vec()));
                    }
                }
            }
            None => result.insert(key.clone(), value.clone()),
        }
    }
    result
}
