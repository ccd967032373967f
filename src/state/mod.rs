//! # State Module
//!
//! The state module provides the two representations of activated route
//! state and the builder that diffs them across navigations.
//!
//! ## Overview
//!
//! - [`ActivatedRouteSnapshot`] / [`RouterStateSnapshot`]: the frozen,
//!   value-typed tree describing what one URL matched at one moment.
//! - [`ActivatedRoute`] / [`RouterState`]: the live counterpart whose
//!   url/params/queryParams/fragment/data fields are current-value
//!   streams. A live route survives navigations while the reuse strategy
//!   keeps matching it to the same route config; the scheduler pushes new
//!   values into its streams when a commit changes them.
//!
//! The builder walks (future snapshot, previous state) and decides per
//! node: reuse in place, re-attach a stored subtree, or create fresh.

mod activated;
mod builder;
mod snapshot;

pub use activated::{ActivatedRoute, RouterState};
pub use snapshot::{ActivatedRouteSnapshot, RouterStateSnapshot};

pub(crate) use activated::{advance_activated_route, create_activated_route};
pub(crate) use builder::{create_empty_state, create_empty_state_snapshot, create_router_state};
