//! Router lifecycle events.
//!
//! Every navigation emits exactly one `NavigationStart` and exactly one of
//! `NavigationEnd`, `NavigationCancel` or `NavigationError`. Between those,
//! the pipeline emits phase events (`RoutesRecognized`, `GuardsCheckStart`/
//! `End`, `ResolveStart`/`End`) and the activation walk emits per-route
//! activation events. All payloads are plain strings so events serialize
//! cleanly for structured logging.

use crate::ids::NavigationId;
use serde::Serialize;
use std::fmt;

/// What triggered a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationSource {
    /// An explicit `navigate`/`navigate_by_url` call
    Imperative,
    /// A history pop reported by the location adapter
    Popstate,
    /// A hash change reported by the location adapter
    Hashchange,
}

impl fmt::Display for NavigationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationSource::Imperative => write!(f, "imperative"),
            NavigationSource::Popstate => write!(f, "popstate"),
            NavigationSource::Hashchange => write!(f, "hashchange"),
        }
    }
}

/// A router lifecycle event.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum RouterEvent {
    /// A navigation was taken off the queue and entered the pipeline
    NavigationStart {
        id: NavigationId,
        url: String,
        source: NavigationSource,
    },
    /// A lazy route configuration is about to load
    RouteConfigLoadStart { route_path: String },
    /// A lazy route configuration finished loading
    RouteConfigLoadEnd { route_path: String },
    /// Redirect expansion and recognition succeeded
    RoutesRecognized {
        id: NavigationId,
        url: String,
        url_after_redirects: String,
    },
    /// Guard execution is starting
    GuardsCheckStart {
        id: NavigationId,
        url: String,
        url_after_redirects: String,
    },
    /// A node with children is about to activate (fired before its
    /// ancestors' `canActivateChild` guards run)
    ChildActivationStart { route_path: String },
    /// A node is about to activate (fired before its `canActivate` guards)
    ActivationStart { route_path: String },
    /// Guard execution finished
    GuardsCheckEnd {
        id: NavigationId,
        url: String,
        url_after_redirects: String,
        should_activate: bool,
    },
    /// Resolver execution is starting
    ResolveStart {
        id: NavigationId,
        url: String,
        url_after_redirects: String,
    },
    /// Resolver execution finished
    ResolveEnd {
        id: NavigationId,
        url: String,
        url_after_redirects: String,
    },
    /// A node finished activating
    ActivationEnd { route_path: String },
    /// All children of a node finished activating
    ChildActivationEnd { route_path: String },
    /// The navigation committed: state replaced and URL written
    NavigationEnd {
        id: NavigationId,
        url: String,
        url_after_redirects: String,
    },
    /// The navigation was cancelled (guard denial, supersession, redirect)
    NavigationCancel {
        id: NavigationId,
        url: String,
        reason: String,
    },
    /// The navigation failed with an error
    NavigationError {
        id: NavigationId,
        url: String,
        error: String,
    },
}

impl RouterEvent {
    /// Short event name, used as the tracing message.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            RouterEvent::NavigationStart { .. } => "NavigationStart",
            RouterEvent::RouteConfigLoadStart { .. } => "RouteConfigLoadStart",
            RouterEvent::RouteConfigLoadEnd { .. } => "RouteConfigLoadEnd",
            RouterEvent::RoutesRecognized { .. } => "RoutesRecognized",
            RouterEvent::GuardsCheckStart { .. } => "GuardsCheckStart",
            RouterEvent::ChildActivationStart { .. } => "ChildActivationStart",
            RouterEvent::ActivationStart { .. } => "ActivationStart",
            RouterEvent::GuardsCheckEnd { .. } => "GuardsCheckEnd",
            RouterEvent::ResolveStart { .. } => "ResolveStart",
            RouterEvent::ResolveEnd { .. } => "ResolveEnd",
            RouterEvent::ActivationEnd { .. } => "ActivationEnd",
            RouterEvent::ChildActivationEnd { .. } => "ChildActivationEnd",
            RouterEvent::NavigationEnd { .. } => "NavigationEnd",
            RouterEvent::NavigationCancel { .. } => "NavigationCancel",
            RouterEvent::NavigationError { .. } => "NavigationError",
        }
    }
}

impl fmt::Display for RouterEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterEvent::NavigationStart { id, url, source } => {
                write!(f, "NavigationStart(id: {id}, url: '{url}', source: {source})")
            }
            RouterEvent::RouteConfigLoadStart { route_path } => {
                write!(f, "RouteConfigLoadStart(path: '{route_path}')")
            }
            RouterEvent::RouteConfigLoadEnd { route_path } => {
                write!(f, "RouteConfigLoadEnd(path: '{route_path}')")
            }
            RouterEvent::RoutesRecognized {
                id,
                url,
                url_after_redirects,
            } => write!(
                f,
                "RoutesRecognized(id: {id}, url: '{url}', urlAfterRedirects: '{url_after_redirects}')"
            ),
            RouterEvent::GuardsCheckStart {
                id,
                url,
                url_after_redirects,
            } => write!(
                f,
                "GuardsCheckStart(id: {id}, url: '{url}', urlAfterRedirects: '{url_after_redirects}')"
            ),
            RouterEvent::ChildActivationStart { route_path } => {
                write!(f, "ChildActivationStart(path: '{route_path}')")
            }
            RouterEvent::ActivationStart { route_path } => {
                write!(f, "ActivationStart(path: '{route_path}')")
            }
            RouterEvent::GuardsCheckEnd {
                id,
                url,
                url_after_redirects,
                should_activate,
            } => write!(
                f,
                "GuardsCheckEnd(id: {id}, url: '{url}', urlAfterRedirects: '{url_after_redirects}', shouldActivate: {should_activate})"
            ),
            RouterEvent::ResolveStart {
                id,
                url,
                url_after_redirects,
            } => write!(
                f,
                "ResolveStart(id: {id}, url: '{url}', urlAfterRedirects: '{url_after_redirects}')"
            ),
            RouterEvent::ResolveEnd {
                id,
                url,
                url_after_redirects,
            } => write!(
                f,
                "ResolveEnd(id: {id}, url: '{url}', urlAfterRedirects: '{url_after_redirects}')"
            ),
            RouterEvent::ActivationEnd { route_path } => {
                write!(f, "ActivationEnd(path: '{route_path}')")
            }
            RouterEvent::ChildActivationEnd { route_path } => {
                write!(f, "ChildActivationEnd(path: '{route_path}')")
            }
            RouterEvent::NavigationEnd {
                id,
                url,
                url_after_redirects,
            } => write!(
                f,
                "NavigationEnd(id: {id}, url: '{url}', urlAfterRedirects: '{url_after_redirects}')"
            ),
            RouterEvent::NavigationCancel { id, url, reason } => {
                write!(f, "NavigationCancel(id: {id}, url: '{url}', reason: '{reason}')")
            }
            RouterEvent::NavigationError { id, url, error } => {
                write!(f, "NavigationError(id: {id}, url: '{url}', error: '{error}')")
            }
        }
    }
}
