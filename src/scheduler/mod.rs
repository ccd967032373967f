//! # Scheduler Module
//!
//! The scheduler module owns the [`Router`] and its navigation pipeline.
//!
//! ## Architecture
//!
//! Navigation requests flow through a `may` mpsc channel into a dedicated
//! scheduler coroutine, which processes one transition at a time:
//!
//! 1. `NavigationStart`: the request enters the pipeline
//! 2. URL extraction through the handling strategy
//! 3. Redirect expansion and lazy loading
//! 4. Recognition into a snapshot tree (`RoutesRecognized`)
//! 5. Future state construction against the reuse strategy
//! 6. Guards (`GuardsCheckStart`/`End`) and resolvers
//!    (`ResolveStart`/`End`)
//! 7. Commit: state replacement, URL write, outlet activation,
//!    `NavigationEnd`
//!
//! Every step checks whether a newer navigation has been scheduled and
//! cancels if so; guard denials and redirects cancel with a
//! `NavigationCancel` event; runtime failures emit `NavigationError` and
//! restore the current URL.
//!
//! ## Request flow
//!
//! 1. A caller (or the location listener) schedules a navigation
//! 2. The request is assigned a monotonically increasing id and queued
//! 3. The scheduler coroutine drains the queue in arrival order
//! 4. The caller blocks on [`NavigationHandle::wait`] for the outcome

mod activation;
mod core;

pub use core::{
    ErrorHandler, InitialNavigation, NavigationExtras, NavigationHandle, NavigationHook,
    NavigationOutcome, QueryParamsHandling, Router, RouterOptions,
};
