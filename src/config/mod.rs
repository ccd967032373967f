//! # Config Module
//!
//! The config module provides the route table model and its structural
//! validator.
//!
//! ## Overview
//!
//! A route table is an ordered tree of [`Route`] records. Order matters:
//! matching tries siblings first to last and the first route that consumes
//! the URL wins. Each route either mounts a component, redirects,
//! declares eager `children`, or names a `load_children` token that the
//! loader collaborator turns into a child table on first use.
//!
//! ## Validation
//!
//! [`validate_config`] runs on install and enforces the structural rules
//! (redirects exclude components and children, paths never start with a
//! slash, empty-path redirects need an explicit path-match mode, and so
//! on), failing fast with the full path of the offending route.

mod route;
mod validator;

pub use route::{
    same_route_config, ComponentId, LoadedRouterConfig, PathMatch, Route, RouteTitle, Routes,
    RunGuardsAndResolvers, UrlMatchResult, UrlMatcher, ROUTE_TITLE_KEY,
};
pub use validator::validate_config;

pub(crate) use route::merge_matched_params;
