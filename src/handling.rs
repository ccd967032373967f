//! URL handling strategy: carves the router-owned part out of a raw URL.
//!
//! An application migrating between routers can let this router own only
//! part of the URL space: `should_process_url` decides whether a URL is
//! routed at all, `extract` returns the routable subtree, and `merge`
//! recombines the processed part with the unrouted remainder before the
//! URL is written back to the location.

use crate::url::UrlTree;

pub trait UrlHandlingStrategy: Send + Sync {
    /// Whether this router processes the URL at all.
    fn should_process_url(&self, url: &UrlTree) -> bool;

    /// The routable portion of the URL.
    fn extract(&self, url: &UrlTree) -> UrlTree;

    /// Recombine the processed part with the raw URL for the location
    /// write.
    fn merge(&self, processed: &UrlTree, raw: &UrlTree) -> UrlTree;
}

/// The identity strategy: the router owns the whole URL.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultUrlHandlingStrategy;

impl UrlHandlingStrategy for DefaultUrlHandlingStrategy {
    fn should_process_url(&self, _url: &UrlTree) -> bool {
        true
    }

    fn extract(&self, url: &UrlTree) -> UrlTree {
        url.clone()
    }

    fn merge(&self, processed: &UrlTree, _raw: &UrlTree) -> UrlTree {
        processed.clone()
    }
}
