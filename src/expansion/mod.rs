//! # Expansion Module
//!
//! The expansion module rewrites a parsed URL tree into its canonical
//! form: `redirectTo` rules are applied (relative and absolute), lazily
//! loaded child configurations are realized, and empty-path routes with
//! named outlets are normalized.
//!
//! ## Redirect semantics
//!
//! A relative redirect replaces the matched prefix and re-enters matching
//! with redirects disabled for the rewritten segments, so chains cannot
//! loop. An absolute redirect abandons the current walk entirely and
//! restarts matching from the target tree, again with redirects disabled.
//!
//! ## Lazy loading
//!
//! `load_children` resolves through the loader collaborator, gated by the
//! route's `canLoad` guards. A denial cancels the navigation; the loaded
//! table is validated and memoized on the route, so `canLoad` returning
//! false leaves the memo unset.

mod core;

use crate::errors::{NavigationCancelingError, RouterError};

pub(crate) use core::apply_redirects;

/// How expansion failed: a cancellation (guard denial or guard redirect)
/// or a hard error.
pub(crate) enum ExpansionFailure {
    Cancel(NavigationCancelingError),
    Error(RouterError),
}
