//! Error types surfaced by the router.
//!
//! URL parse failures and configuration failures are reported at the call
//! site that triggered them. Navigation-time failures are converted by the
//! scheduler into `NavigationCancel`/`NavigationError` events and returned
//! through the navigation handle.

use crate::url::UrlTree;
use std::fmt;
use std::sync::Arc;

/// Malformed URL input. Fails the `parse` call, never a navigation.
///
/// Carries the remaining unparsed input for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlParseError {
    /// An empty path token was followed by `;` (matrix parameters).
    EmptyPathWithParams {
        /// Unparsed input starting at the offending `;`
        remaining: String,
    },
    /// Inside parentheses, a token must be followed by `/`, `)` or `;`.
    UnexpectedToken {
        /// Unparsed input starting at the unexpected character
        remaining: String,
    },
    /// A required literal (e.g. a closing `)`) was not found.
    Expected {
        /// The literal that was expected
        expected: String,
        /// Unparsed input at the failure point
        remaining: String,
    },
    /// Input was left over after the grammar was exhausted.
    TrailingInput {
        /// The full input URL
        url: String,
        /// The unconsumed suffix
        remaining: String,
    },
}

impl fmt::Display for UrlParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlParseError::EmptyPathWithParams { remaining } => {
                write!(
                    f,
                    "empty path url segment cannot have parameters: '{remaining}'"
                )
            }
            UrlParseError::UnexpectedToken { remaining } => {
                write!(f, "cannot parse url: unexpected token at '{remaining}'")
            }
            UrlParseError::Expected {
                expected,
                remaining,
            } => {
                write!(f, "cannot parse url: expected '{expected}' at '{remaining}'")
            }
            UrlParseError::TrailingInput { url, remaining } => {
                write!(f, "cannot parse url '{url}': unexpected trailing '{remaining}'")
            }
        }
    }
}

impl std::error::Error for UrlParseError {}

/// Invalid route configuration, thrown at config install.
///
/// Names the full path of the offending route so misconfigurations in deep
/// trees are findable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// Full path of the offending route (segments joined by `/`)
    pub route_path: String,
    /// What is wrong with it
    pub reason: String,
}

impl ConfigError {
    pub fn new(route_path: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError {
            route_path: route_path.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid configuration of route '{}': {}",
            self.route_path, self.reason
        )
    }
}

impl std::error::Error for ConfigError {}

/// A tagged cancellation: guard denial, `canLoad` rejection, or a guard
/// redirecting to another URL. The scheduler converts this into a
/// `NavigationCancel` event instead of an error.
#[derive(Debug, Clone)]
pub struct NavigationCancelingError {
    /// Human-readable cancellation reason
    pub message: String,
    /// Set when a guard redirected; the scheduler follows it with a new
    /// navigation
    pub redirect: Option<UrlTree>,
}

impl NavigationCancelingError {
    pub fn new(message: impl Into<String>) -> Self {
        NavigationCancelingError {
            message: message.into(),
            redirect: None,
        }
    }

    pub fn redirecting(tree: UrlTree, message: impl Into<String>) -> Self {
        NavigationCancelingError {
            message: message.into(),
            redirect: Some(tree),
        }
    }
}

impl fmt::Display for NavigationCancelingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for NavigationCancelingError {}

/// Navigation-time failure, surfaced through `NavigationError` events and
/// navigation handles.
#[derive(Debug, Clone)]
pub enum RouterError {
    /// The raw URL of an imperative navigation failed to parse
    Parse(UrlParseError),
    /// Config installed through `reset_config` failed validation
    Config(ConfigError),
    /// No route consumed the given segment group
    NoMatch {
        /// Serialized form of the unmatched segment group
        segment_group: String,
    },
    /// Two sibling snapshots claimed the same outlet during recognition
    OutletConflict {
        /// The duplicated outlet name
        outlet: String,
        /// Serialized segments of the two conflicting snapshots
        segments: String,
    },
    /// A navigation command list was malformed
    InvalidCommand {
        /// What was wrong with the commands
        message: String,
    },
    /// A guard failed with a runtime error (not a denial)
    Guard(Arc<anyhow::Error>),
    /// A resolver failed with a runtime error
    Resolve(Arc<anyhow::Error>),
    /// A lazy route loader failed
    Load(Arc<anyhow::Error>),
    /// The router was disposed; no further navigations are accepted
    Disposed,
}

impl RouterError {
    pub(crate) fn guard(err: anyhow::Error) -> Self {
        RouterError::Guard(Arc::new(err))
    }

    pub(crate) fn resolve(err: anyhow::Error) -> Self {
        RouterError::Resolve(Arc::new(err))
    }

    pub(crate) fn load(err: anyhow::Error) -> Self {
        RouterError::Load(Arc::new(err))
    }
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::Parse(e) => write!(f, "{e}"),
            RouterError::Config(e) => write!(f, "{e}"),
            RouterError::NoMatch { segment_group } => {
                write!(f, "cannot match any routes. URL segment: '{segment_group}'")
            }
            RouterError::OutletConflict { outlet, segments } => {
                write!(
                    f,
                    "two segments cannot have the same outlet name: '{outlet}' ({segments})"
                )
            }
            RouterError::InvalidCommand { message } => write!(f, "{message}"),
            RouterError::Guard(e) => write!(f, "guard failed: {e}"),
            RouterError::Resolve(e) => write!(f, "resolver failed: {e}"),
            RouterError::Load(e) => write!(f, "route loader failed: {e}"),
            RouterError::Disposed => write!(f, "router has been disposed"),
        }
    }
}

impl std::error::Error for RouterError {}

impl From<UrlParseError> for RouterError {
    fn from(e: UrlParseError) -> Self {
        RouterError::Parse(e)
    }
}

impl From<ConfigError> for RouterError {
    fn from(e: ConfigError) -> Self {
        RouterError::Config(e)
    }
}
