//! Snapshot construction from an expanded URL tree.
//!
//! Redirects are already applied by the time recognition runs, so routes
//! with `redirectTo` are skipped here. Matching walks the tree in config
//! order, builds one snapshot per matched route, enforces outlet
//! uniqueness among siblings and orders children primary-first.

use super::{ParamsInheritance, RecognizeError};
use crate::config::{merge_matched_params, ComponentId, Route, Routes};
use crate::matching::{match_route, split_for_recognition};
use crate::params::{Data, ParamMap};
use crate::state::{ActivatedRouteSnapshot, RouterStateSnapshot};
use crate::url::{
    path_index_shift, serialize_segments, source_group, UrlSegment, UrlSegmentGroup, UrlTree,
    PRIMARY_OUTLET,
};
use std::sync::Arc;
use tracing::debug;

/// Build the snapshot tree for `url_tree` against `config`.
pub(crate) fn recognize(
    root_component: Option<ComponentId>,
    config: &Routes,
    url_tree: &UrlTree,
    url: &str,
    params_inheritance: ParamsInheritance,
) -> Result<RouterStateSnapshot, RecognizeError> {
    let recognizer = Recognizer { url_tree };
    let (root_group, _) = split_for_recognition(&url_tree.root, &[], &[], config)?;
    let children = recognizer.process_segment_group(config, &root_group, PRIMARY_OUTLET)?;
    let root = ActivatedRouteSnapshot::new(
        Vec::new(),
        ParamMap::new(),
        url_tree.query_params.clone(),
        url_tree.fragment.clone(),
        Data::new(),
        PRIMARY_OUTLET.to_string(),
        root_component,
        None,
        Arc::clone(&url_tree.root),
        -1,
        children,
    );

    debug!(url = %url, "Recognition complete");

    let snapshot = RouterStateSnapshot::new(url.to_string(), Arc::clone(&root));
    let mut path = Vec::new();
    inherit_params_and_data(&root, &mut path, params_inheritance);
    Ok(snapshot)
}

struct Recognizer<'a> {
    url_tree: &'a UrlTree,
}

impl<'a> Recognizer<'a> {
    fn process_segment_group(
        &self,
        config: &Routes,
        group: &Arc<UrlSegmentGroup>,
        outlet: &str,
    ) -> Result<Vec<Arc<ActivatedRouteSnapshot>>, RecognizeError> {
        if group.segments.is_empty() && group.has_children() {
            self.process_children(config, group)
        } else {
            self.process_segment(config, group, &group.segments, outlet)
        }
    }

    fn process_children(
        &self,
        config: &Routes,
        group: &Arc<UrlSegmentGroup>,
    ) -> Result<Vec<Arc<ActivatedRouteSnapshot>>, RecognizeError> {
        let mut children = Vec::new();
        for (child_outlet, child) in group.children() {
            let mut nodes = self.process_segment_group(config, child, child_outlet)?;
            children.append(&mut nodes);
        }
        check_outlet_uniqueness(&children)?;
        sort_activated_route_snapshots(&mut children);
        Ok(children)
    }

    fn process_segment(
        &self,
        config: &Routes,
        group: &Arc<UrlSegmentGroup>,
        segments: &[UrlSegment],
        outlet: &str,
    ) -> Result<Vec<Arc<ActivatedRouteSnapshot>>, RecognizeError> {
        for route in config {
            match self.process_segment_against_route(route, group, segments, outlet) {
                Ok(nodes) => return Ok(nodes),
                Err(RecognizeError::NoMatch(_)) => continue,
                Err(other) => return Err(other),
            }
        }
        if segments.is_empty() && group.child(outlet).is_none() {
            // Nothing left to consume for this outlet.
            return Ok(Vec::new());
        }
        Err(RecognizeError::NoMatch(serialize_segments(segments)))
    }

    fn process_segment_against_route(
        &self,
        route: &Arc<Route>,
        raw_group: &Arc<UrlSegmentGroup>,
        segments: &[UrlSegment],
        outlet: &str,
    ) -> Result<Vec<Arc<ActivatedRouteSnapshot>>, RecognizeError> {
        if route.redirect_to.is_some() {
            return Err(RecognizeError::NoMatch(serialize_segments(segments)));
        }
        if route.outlet_name() != outlet {
            return Err(RecognizeError::NoMatch(serialize_segments(segments)));
        }

        let consumed: Vec<UrlSegment>;
        let raw_sliced: Vec<UrlSegment>;
        let params: ParamMap;
        let last_path_index: isize;
        if route.is_wildcard() {
            consumed = segments.to_vec();
            raw_sliced = Vec::new();
            params = segments
                .last()
                .map(|s| s.parameters.clone())
                .unwrap_or_default();
            last_path_index = path_index_shift(raw_group) + segments.len() as isize;
        } else {
            let outcome = match_route(raw_group, route, segments).ok_or_else(|| {
                RecognizeError::NoMatch(serialize_segments(segments))
            })?;
            raw_sliced = segments[outcome.last_child..].to_vec();
            params = merge_matched_params(&outcome.pos_params, &outcome.consumed);
            last_path_index = path_index_shift(raw_group) + outcome.consumed.len() as isize;
            consumed = outcome.consumed;
        }

        let child_config = child_config_of(route);
        // A wildcard consumes everything but contributes no index shift to
        // whatever empty-path children match below it.
        let split_consumed: &[UrlSegment] = if route.is_wildcard() { &[] } else { &consumed };
        let (segment_group, sliced) =
            split_for_recognition(raw_group, split_consumed, &raw_sliced, &child_config)?;

        let children = if sliced.is_empty() && segment_group.has_children() {
            self.process_children(&child_config, &segment_group)?
        } else if child_config.is_empty() && sliced.is_empty() {
            Vec::new()
        } else {
            self.process_segment(&child_config, &segment_group, &sliced, PRIMARY_OUTLET)?
        };

        let snapshot = ActivatedRouteSnapshot::new(
            consumed,
            params,
            self.url_tree.query_params.clone(),
            self.url_tree.fragment.clone(),
            route.data.clone(),
            outlet.to_string(),
            route.component.clone(),
            Some(Arc::clone(route)),
            source_group(raw_group),
            last_path_index,
            children,
        );
        Ok(vec![snapshot])
    }
}

fn child_config_of(route: &Arc<Route>) -> Routes {
    if let Some(children) = &route.children {
        children.clone()
    } else if let Some(loaded) = route.loaded_config() {
        loaded.routes.clone()
    } else {
        Vec::new()
    }
}

fn check_outlet_uniqueness(
    nodes: &[Arc<ActivatedRouteSnapshot>],
) -> Result<(), RecognizeError> {
    for (i, node) in nodes.iter().enumerate() {
        for other in &nodes[i + 1..] {
            if node.outlet() == other.outlet() {
                return Err(RecognizeError::OutletConflict {
                    outlet: node.outlet().to_string(),
                    segments: format!("'{}' and '{}'", node.route_path(), other.route_path()),
                });
            }
        }
    }
    Ok(())
}

fn sort_activated_route_snapshots(nodes: &mut [Arc<ActivatedRouteSnapshot>]) {
    nodes.sort_by(|a, b| {
        if a.outlet() == PRIMARY_OUTLET {
            return std::cmp::Ordering::Less;
        }
        if b.outlet() == PRIMARY_OUTLET {
            return std::cmp::Ordering::Greater;
        }
        a.outlet().cmp(b.outlet())
    });
}

/// Params, data and resolved data a node inherits from its ancestor
/// chain.
pub(crate) struct Inherited {
    pub params: ParamMap,
    pub data: Data,
    pub resolve: Data,
}

/// Merge params/data/resolved-data down the path. In `EmptyOnly` mode
/// inheritance stops below the nearest ancestor that is neither an
/// empty-path route nor componentless; in `Always` mode the whole chain
/// merges.
pub(crate) fn inherited_params_data_resolve(
    path_from_root: &[Arc<ActivatedRouteSnapshot>],
    strategy: ParamsInheritance,
) -> Inherited {
    let mut inheriting_from = 0;
    if strategy != ParamsInheritance::Always && !path_from_root.is_empty() {
        inheriting_from = path_from_root.len() - 1;
        while inheriting_from >= 1 {
            let current = &path_from_root[inheriting_from];
            let parent = &path_from_root[inheriting_from - 1];
            let current_empty_path = current
                .route_config()
                .is_some_and(|r| r.path.as_deref() == Some(""));
            if current_empty_path {
                inheriting_from -= 1;
            } else if parent.component().is_none() {
                inheriting_from -= 1;
            } else {
                break;
            }
        }
    }

    let mut inherited = Inherited {
        params: ParamMap::new(),
        data: Data::new(),
        resolve: Data::new(),
    };
    for node in &path_from_root[inheriting_from..] {
        inherited.params.extend_from(&node.params());
        for (k, v) in node.data() {
            inherited.data.insert(k, v);
        }
        for (k, v) in node.resolved_data() {
            inherited.resolve.insert(k, v);
        }
    }
    inherited
}

fn inherit_params_and_data(
    node: &Arc<ActivatedRouteSnapshot>,
    path: &mut Vec<Arc<ActivatedRouteSnapshot>>,
    strategy: ParamsInheritance,
) {
    path.push(Arc::clone(node));
    let inherited = inherited_params_data_resolve(path, strategy);
    node.set_params(inherited.params);
    node.set_data(inherited.data);
    for child in node.children() {
        inherit_params_and_data(child, path, strategy);
    }
    path.pop();
}
