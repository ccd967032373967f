//! # Recognition Module
//!
//! The recognition module turns an expanded URL tree into a snapshot tree.
//!
//! ## Overview
//!
//! Recognition runs after redirect expansion, so every segment of the URL
//! corresponds to a concrete (non-redirect) route. The recognizer walks
//! segment groups against the config in order, producing one
//! [`ActivatedRouteSnapshot`](crate::state::ActivatedRouteSnapshot) per
//! match, and finishes with the inheritance pass that merges params and
//! data down componentless and empty-path ancestors.
//!
//! Two conditions fail recognition: no route consumes a segment group
//! (surfaced as "cannot match any routes"), and two sibling snapshots
//! claiming the same outlet name.

mod core;
#[cfg(test)]
mod tests;

use crate::errors::RouterError;

pub(crate) use core::{inherited_params_data_resolve, recognize};

/// How a snapshot inherits params and data from its ancestors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamsInheritance {
    /// Inherit only across empty-path and componentless ancestors (default)
    #[default]
    EmptyOnly,
    /// Merge the full ancestor chain into every node
    Always,
}

/// Internal recognition failure, mapped to [`RouterError`] by the
/// scheduler.
#[derive(Debug, Clone)]
pub(crate) enum RecognizeError {
    NoMatch(String),
    OutletConflict { outlet: String, segments: String },
}

impl From<RecognizeError> for RouterError {
    fn from(err: RecognizeError) -> Self {
        match err {
            RecognizeError::NoMatch(segment_group) => RouterError::NoMatch { segment_group },
            RecognizeError::OutletConflict { outlet, segments } => {
                RouterError::OutletConflict { outlet, segments }
            }
        }
    }
}
