//! Shared route-matching machinery.
//!
//! Both the redirect applier and the recognizer walk a segment group
//! against a candidate route. This module holds the pieces they share:
//! the default path matcher, the per-route match driver and the `split`
//! rewrites that normalize empty-path routes with (named) outlets so the
//! main walks stay uniform.

use crate::config::{PathMatch, Route, Routes, UrlMatchResult};
use crate::url::{UrlSegment, UrlSegmentGroup, PRIMARY_OUTLET};
use std::sync::Arc;

/// A successful match of one route against the front of a segment list.
#[derive(Debug, Clone)]
pub(crate) struct MatchOutcome {
    pub consumed: Vec<UrlSegment>,
    pub last_child: usize,
    pub pos_params: Vec<(String, UrlSegment)>,
}

/// Match `route` against `segments` within `group`. `None` means the
/// route does not match; the caller tries the next candidate.
///
/// `**` is not handled here; wildcard routes are special-cased by the
/// callers before segment matching.
pub(crate) fn match_route(
    group: &UrlSegmentGroup,
    route: &Route,
    segments: &[UrlSegment],
) -> Option<MatchOutcome> {
    if route.path.as_deref() == Some("") {
        if route.path_match() == PathMatch::Full && (group.has_children() || !segments.is_empty())
        {
            return None;
        }
        return Some(MatchOutcome {
            consumed: Vec::new(),
            last_child: 0,
            pos_params: Vec::new(),
        });
    }

    let result = match &route.matcher {
        Some(matcher) => matcher.matches(segments, group, route)?,
        None => default_url_matcher(segments, group, route)?,
    };
    let last_child = result.consumed.len();
    Some(MatchOutcome {
        consumed: result.consumed,
        last_child,
        pos_params: result.pos_params,
    })
}

/// The default matcher: splits `path` on `/`, binds `:name` parts as
/// positional params and requires string equality elsewhere. With
/// `pathMatch: full` the route only matches when it consumes every
/// remaining segment of a childless group.
pub(crate) fn default_url_matcher(
    segments: &[UrlSegment],
    group: &UrlSegmentGroup,
    route: &Route,
) -> Option<UrlMatchResult> {
    let path = route.path.as_deref()?;
    let parts: Vec<&str> = path.split('/').collect();

    if parts.len() > segments.len() {
        return None;
    }
    if route.path_match() == PathMatch::Full
        && (group.has_children() || parts.len() < segments.len())
    {
        return None;
    }

    let mut pos_params = Vec::new();
    for (part, segment) in parts.iter().zip(segments) {
        if let Some(name) = part.strip_prefix(':') {
            pos_params.push((name.to_string(), segment.clone()));
        } else if *part != segment.path {
            return None;
        }
    }

    Some(UrlMatchResult {
        consumed: segments[..parts.len()].to_vec(),
        pos_params,
    })
}

fn children_vec(group: &UrlSegmentGroup) -> Vec<(String, Arc<UrlSegmentGroup>)> {
    group
        .children()
        .map(|(name, child)| (name.to_string(), Arc::clone(child)))
        .collect()
}

/// Whether `route` is an empty-path route that can match at this position
/// (a full-match empty path cannot while segments or children remain).
fn empty_path_match(group: &UrlSegmentGroup, sliced: &[UrlSegment], route: &Route) -> bool {
    if (group.has_children() || !sliced.is_empty()) && route.path_match() == PathMatch::Full {
        return false;
    }
    route.path.as_deref() == Some("")
}

fn empty_path_redirect(group: &UrlSegmentGroup, sliced: &[UrlSegment], route: &Route) -> bool {
    empty_path_match(group, sliced, route) && route.redirect_to.is_some()
}

fn empty_path_non_redirect(group: &UrlSegmentGroup, sliced: &[UrlSegment], route: &Route) -> bool {
    empty_path_match(group, sliced, route) && route.redirect_to.is_none()
}

/// `split` as used during redirect expansion: normalizes empty-path
/// *redirect* routes with named outlets into empty child groups, then
/// collapses a trivial single-primary child back into its parent.
pub(crate) fn split_for_redirects(
    group: &Arc<UrlSegmentGroup>,
    consumed: &[UrlSegment],
    sliced: &[UrlSegment],
    config: &Routes,
) -> (Arc<UrlSegmentGroup>, Vec<UrlSegment>) {
    if !sliced.is_empty()
        && config
            .iter()
            .any(|r| empty_path_redirect(group, sliced, r) && r.outlet_name() != PRIMARY_OUTLET)
    {
        let primary = UrlSegmentGroup::new(sliced.to_vec(), children_vec(group));
        let mut children = vec![(PRIMARY_OUTLET.to_string(), primary)];
        add_empty_children(&mut children, config, |r| r.path.as_deref() == Some(""));
        let s = UrlSegmentGroup::new(consumed.to_vec(), children);
        return (merge_trivial_children(&s), Vec::new());
    }

    if sliced.is_empty()
        && config.iter().any(|r| empty_path_redirect(group, sliced, r))
    {
        let mut children = children_vec(group);
        add_empty_children_if_missing(
            &mut children,
            group,
            sliced,
            config,
            |_group, sliced, route| empty_path_redirect(group, sliced, route),
        );
        let s = UrlSegmentGroup::new(group.segments.clone(), children);
        return (merge_trivial_children(&s), sliced.to_vec());
    }

    (Arc::clone(group), sliced.to_vec())
}

/// `split` as used during recognition: same shape as the expansion
/// variant, but considers empty-path *non-redirect* routes, records
/// source-segment bookkeeping on every synthesized group, and never
/// collapses children.
///
/// Two empty-path routes claiming the same named outlet at one level are
/// rejected here: both would map onto the same synthetic child group, so
/// the config is ambiguous.
pub(crate) fn split_for_recognition(
    group: &Arc<UrlSegmentGroup>,
    consumed: &[UrlSegment],
    sliced: &[UrlSegment],
    config: &Routes,
) -> Result<(Arc<UrlSegmentGroup>, Vec<UrlSegment>), crate::recognition::RecognizeError> {
    if !sliced.is_empty()
        && config
            .iter()
            .any(|r| empty_path_non_redirect(group, sliced, r) && r.outlet_name() != PRIMARY_OUTLET)
    {
        let primary = UrlSegmentGroup::with_source(
            sliced.to_vec(),
            children_vec(group),
            Arc::clone(group),
            consumed.len(),
        );
        let mut children = vec![(PRIMARY_OUTLET.to_string(), primary)];
        add_empty_children_with_source(
            &mut children,
            config,
            group,
            consumed.len(),
            |r| empty_path_non_redirect(group, sliced, r),
        )?;
        let s = UrlSegmentGroup::with_source(
            consumed.to_vec(),
            children,
            Arc::clone(group),
            consumed.len(),
        );
        return Ok((s, Vec::new()));
    }

    if sliced.is_empty()
        && config
            .iter()
            .any(|r| empty_path_non_redirect(group, sliced, r))
    {
        let mut children = children_vec(group);
        add_empty_children_with_source(
            &mut children,
            config,
            group,
            consumed.len(),
            |r| empty_path_non_redirect(group, sliced, r),
        )?;
        let s = UrlSegmentGroup::with_source(
            group.segments.clone(),
            children,
            Arc::clone(group),
            consumed.len(),
        );
        return Ok((s, sliced.to_vec()));
    }

    let s = UrlSegmentGroup::with_source(
        group.segments.clone(),
        children_vec(group),
        Arc::clone(group),
        consumed.len(),
    );
    Ok((s, sliced.to_vec()))
}

fn add_empty_children(
    children: &mut Vec<(String, Arc<UrlSegmentGroup>)>,
    config: &Routes,
    is_empty_path: impl Fn(&Route) -> bool,
) {
    for route in config {
        if is_empty_path(route)
            && route.outlet_name() != PRIMARY_OUTLET
            && !children.iter().any(|(name, _)| name == route.outlet_name())
        {
            children.push((route.outlet_name().to_string(), UrlSegmentGroup::empty()));
        }
    }
}

fn add_empty_children_with_source(
    children: &mut Vec<(String, Arc<UrlSegmentGroup>)>,
    config: &Routes,
    source: &Arc<UrlSegmentGroup>,
    shift: usize,
    qualifies: impl Fn(&Route) -> bool,
) -> Result<(), crate::recognition::RecognizeError> {
    let mut synthetic: Vec<String> = Vec::new();
    for route in config {
        if !qualifies(route) {
            continue;
        }
        let outlet = route.outlet_name();
        if outlet != PRIMARY_OUTLET && synthetic.iter().any(|name| name == outlet) {
            return Err(crate::recognition::RecognizeError::OutletConflict {
                outlet: outlet.to_string(),
                segments: format!(
                    "two empty-path routes both target outlet '{outlet}'"
                ),
            });
        }
        if !children.iter().any(|(name, _)| name == outlet) {
            let group =
                UrlSegmentGroup::with_source(Vec::new(), Vec::new(), Arc::clone(source), shift);
            children.push((outlet.to_string(), group));
            synthetic.push(outlet.to_string());
        }
    }
    Ok(())
}

fn add_empty_children_if_missing(
    children: &mut Vec<(String, Arc<UrlSegmentGroup>)>,
    group: &Arc<UrlSegmentGroup>,
    sliced: &[UrlSegment],
    config: &Routes,
    qualifies: impl Fn(&Arc<UrlSegmentGroup>, &[UrlSegment], &Route) -> bool,
) {
    for route in config {
        if qualifies(group, sliced, route)
            && !children.iter().any(|(name, _)| name == route.outlet_name())
        {
            children.push((route.outlet_name().to_string(), UrlSegmentGroup::empty()));
        }
    }
}

/// Collapse a group with a single primary child into one group, avoiding a
/// spurious level introduced by the empty-path rewrites.
fn merge_trivial_children(group: &Arc<UrlSegmentGroup>) -> Arc<UrlSegmentGroup> {
    if group.num_children() == 1 {
        if let Some(primary) = group.child(PRIMARY_OUTLET) {
            let mut segments = group.segments.clone();
            segments.extend(primary.segments.iter().cloned());
            return UrlSegmentGroup::new(segments, children_vec(primary));
        }
    }
    Arc::clone(group)
}
