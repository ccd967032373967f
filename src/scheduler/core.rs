//! The router and its navigation pipeline.
//!
//! Navigation requests are serialized through a channel into a dedicated
//! scheduler coroutine. Exactly one transition is in flight at any
//! moment; later requests queue in arrival order, and their arrival
//! supersedes the in-flight transition at its next pipeline step. Guards,
//! resolvers and lazy loaders run on the scheduler coroutine and may
//! block it; callers wait on the reply channel of their navigation
//! handle.

use crate::config::{ComponentId, Routes};
use crate::errors::{ConfigError, NavigationCancelingError, RouterError};
use crate::events::{NavigationSource, RouterEvent};
use crate::expansion::{apply_redirects, ExpansionFailure};
use crate::guards::{get_all_route_guards, resolve_data, run_guards, GuardVerdict};
use crate::handling::{DefaultUrlHandlingStrategy, UrlHandlingStrategy};
use crate::ids::{NavigationId, NavigationIdSource};
use crate::injector::{EmptyInjector, Injector};
use crate::loader::{NoRouteLoader, RouteLoader};
use crate::location::{LocationAdapter, LocationChangeKind, MemoryLocation};
use crate::outlet::ChildrenOutletContexts;
use crate::params::QueryParams;
use crate::recognition::{recognize, ParamsInheritance};
use crate::reuse::{DefaultRouteReuseStrategy, RouteReuseStrategy};
use crate::runtime_config::RuntimeConfig;
use crate::scheduler::activation::activate_routes;
use crate::state::{
    create_empty_state, create_router_state, ActivatedRouteSnapshot, RouterState,
    RouterStateSnapshot,
};
use crate::stream::Multicast;
use crate::url::{
    contains_tree, create_url_tree, Command, DefaultUrlSerializer, UrlSerializer, UrlTree,
};
use may::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, error, info, warn};

/// When the router performs its first navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitialNavigation {
    /// Navigate to the current location path on construction (default)
    #[default]
    Enabled,
    /// Navigate on construction and block until the navigation settles,
    /// surfacing async guard failures to the bootstrap flow
    EnabledBlocking,
    /// Only subscribe to location changes; no initial navigation
    Disabled,
}

/// How per-navigation query params combine with the current URL's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryParamsHandling {
    /// Use only the provided query params (default)
    #[default]
    Replace,
    /// Shallow-merge the provided params over the current ones
    Merge,
    /// Keep the current params, ignoring the provided ones
    Preserve,
}

/// Per-navigation options.
#[derive(Clone, Default)]
pub struct NavigationExtras {
    /// Resolve relative commands against this snapshot instead of the root
    pub relative_to: Option<Arc<ActivatedRouteSnapshot>>,
    /// Query params for the new URL
    pub query_params: Option<QueryParams>,
    /// Fragment for the new URL
    pub fragment: Option<String>,
    /// How `query_params` combines with the current URL's
    pub query_params_handling: QueryParamsHandling,
    /// Reuse the current fragment instead of `fragment`
    pub preserve_fragment: bool,
    /// Navigate without touching the location
    pub skip_location_change: bool,
    /// Replace the current history entry instead of pushing
    pub replace_url: bool,
}

/// How a navigation settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// State and URL were committed
    Committed,
    /// The navigation was cancelled (guard denial, supersession, redirect,
    /// or a deduplicated browser replay)
    Canceled,
    /// The URL handling strategy declined the URL; state is unchanged
    Skipped,
    /// The navigation errored and the user error handler consumed it
    ErrorHandled,
}

/// Awaitable result of a scheduled navigation.
pub struct NavigationHandle {
    inner: HandleInner,
}

enum HandleInner {
    Ready(Result<NavigationOutcome, RouterError>),
    Pending(Receiver<Result<NavigationOutcome, RouterError>>),
}

impl NavigationHandle {
    fn ready(result: Result<NavigationOutcome, RouterError>) -> Self {
        NavigationHandle {
            inner: HandleInner::Ready(result),
        }
    }

    fn pending(rx: Receiver<Result<NavigationOutcome, RouterError>>) -> Self {
        NavigationHandle {
            inner: HandleInner::Pending(rx),
        }
    }

    /// Block until the navigation settles.
    pub fn wait(self) -> Result<NavigationOutcome, RouterError> {
        match self.inner {
            HandleInner::Ready(result) => result,
            HandleInner::Pending(rx) => rx.recv().unwrap_or(Err(RouterError::Disposed)),
        }
    }
}

/// Callback for `beforePreactivation`/`afterPreactivation` hooks.
pub type NavigationHook =
    Arc<dyn Fn(&RouterStateSnapshot) -> anyhow::Result<()> + Send + Sync>;

/// Callback observing navigation errors; when set, errored navigations
/// resolve as [`NavigationOutcome::ErrorHandled`] instead of failing the
/// handle.
pub type ErrorHandler = Arc<dyn Fn(&RouterError) + Send + Sync>;

/// Construction-time router options. Every collaborator has an in-crate
/// default.
#[derive(Clone, Default)]
pub struct RouterOptions {
    /// Log every router event at info level
    pub enable_tracing: bool,
    /// Use a hash-style location when no custom adapter is given
    pub use_hash: bool,
    /// First-navigation behavior
    pub initial_navigation: InitialNavigation,
    /// Params/data inheritance mode
    pub params_inheritance: ParamsInheritance,
    /// Component identity of the root outlet
    pub root_component: Option<ComponentId>,
    /// Navigation error observer
    pub error_handler: Option<ErrorHandler>,
    /// URL serializer override
    pub serializer: Option<Arc<dyn UrlSerializer>>,
    /// Location adapter override
    pub location: Option<Arc<dyn LocationAdapter>>,
    /// Lazy route loader
    pub loader: Option<Arc<dyn RouteLoader>>,
    /// Root token resolver for guard/resolver tokens
    pub injector: Option<Arc<dyn Injector>>,
    /// Route reuse strategy override
    pub reuse_strategy: Option<Arc<dyn RouteReuseStrategy>>,
    /// URL handling strategy override
    pub url_handling: Option<Arc<dyn UrlHandlingStrategy>>,
    /// Hook between recognition and state building
    pub before_preactivation: Option<NavigationHook>,
    /// Hook after resolvers, before activation
    pub after_preactivation: Option<NavigationHook>,
}

struct SharedState {
    current_url_tree: UrlTree,
    raw_url_tree: UrlTree,
    router_state: RouterState,
}

struct NavigationRequest {
    id: NavigationId,
    source: NavigationSource,
    raw_url: UrlTree,
    extras: NavigationExtras,
    reply: Sender<Result<NavigationOutcome, RouterError>>,
}

pub(crate) struct RouterInner {
    config: RwLock<Routes>,
    serializer: Arc<dyn UrlSerializer>,
    location: Arc<dyn LocationAdapter>,
    loader: Arc<dyn RouteLoader>,
    injector: Arc<dyn Injector>,
    reuse: Arc<dyn RouteReuseStrategy>,
    url_handling: Arc<dyn UrlHandlingStrategy>,
    error_handler: Option<ErrorHandler>,
    before_preactivation: Option<NavigationHook>,
    after_preactivation: Option<NavigationHook>,
    enable_tracing: bool,
    params_inheritance: ParamsInheritance,
    root_component: Option<ComponentId>,
    ids: NavigationIdSource,
    events: Multicast<RouterEvent>,
    state: RwLock<SharedState>,
    tx: Mutex<Option<Sender<NavigationRequest>>>,
    last_scheduled: Mutex<Option<(NavigationSource, String)>>,
    root_contexts: ChildrenOutletContexts,
}

/// The client-side router: parses URLs, reconciles them with the route
/// table, drives guards and resolvers, and commits state and URL through
/// its collaborators.
pub struct Router {
    inner: Arc<RouterInner>,
}

impl Router {
    /// Create a router over `routes`. Validates the config, spawns the
    /// scheduler coroutine, subscribes to location changes and performs
    /// the initial navigation per `options.initial_navigation`.
    pub fn new(routes: Routes, options: RouterOptions) -> Result<Router, ConfigError> {
        crate::config::validate_config(&routes)?;

        let location: Arc<dyn LocationAdapter> = match options.location {
            Some(location) => location,
            None if options.use_hash => Arc::new(MemoryLocation::with_hash()),
            None => Arc::new(MemoryLocation::new()),
        };

        let inner = Arc::new(RouterInner {
            config: RwLock::new(routes),
            serializer: options
                .serializer
                .unwrap_or_else(|| Arc::new(DefaultUrlSerializer)),
            location,
            loader: options.loader.unwrap_or_else(|| Arc::new(NoRouteLoader)),
            injector: options.injector.unwrap_or_else(|| Arc::new(EmptyInjector)),
            reuse: options
                .reuse_strategy
                .unwrap_or_else(|| Arc::new(DefaultRouteReuseStrategy)),
            url_handling: options
                .url_handling
                .unwrap_or_else(|| Arc::new(DefaultUrlHandlingStrategy)),
            error_handler: options.error_handler,
            before_preactivation: options.before_preactivation,
            after_preactivation: options.after_preactivation,
            enable_tracing: options.enable_tracing,
            params_inheritance: options.params_inheritance,
            root_component: options.root_component.clone(),
            ids: NavigationIdSource::new(),
            events: Multicast::new(),
            state: RwLock::new(SharedState {
                current_url_tree: UrlTree::empty(),
                raw_url_tree: UrlTree::empty(),
                router_state: create_empty_state(options.root_component),
            }),
            tx: Mutex::new(None),
            last_scheduled: Mutex::new(None),
            root_contexts: ChildrenOutletContexts::new(),
        });

        let (tx, rx) = mpsc::channel::<NavigationRequest>();
        let runtime = RuntimeConfig::from_env();
        let scheduler_inner = Arc::clone(&inner);
        // SAFETY: the scheduler coroutine owns its Arc and channel; the
        // stack size accommodates user guard/resolver callbacks (tunable
        // via WAYFINDER_STACK_SIZE).
        let spawned = unsafe {
            may::coroutine::Builder::new()
                .name("wayfinder-scheduler".to_string())
                .stack_size(runtime.stack_size)
                .spawn(move || scheduler_loop(scheduler_inner, rx))
        };
        match spawned {
            Ok(_) => {
                *inner.tx.lock().expect("router lock poisoned") = Some(tx);
            }
            Err(e) => {
                // Navigations will resolve as Disposed.
                error!(error = %e, "Failed to spawn scheduler coroutine");
            }
        }

        let router = Router { inner };
        router.set_up_location_change_listener();

        match options.initial_navigation {
            InitialNavigation::Disabled => {}
            InitialNavigation::Enabled => {
                let path = router.inner.location.path(true);
                let _ = router.navigate_by_url(&path, NavigationExtras::default());
            }
            InitialNavigation::EnabledBlocking => {
                let path = router.inner.location.path(true);
                let handle = router.navigate_by_url(&path, NavigationExtras::default());
                if let Err(e) = handle.wait() {
                    warn!(error = %e, "Initial navigation failed");
                }
            }
        }

        Ok(router)
    }

    fn set_up_location_change_listener(&self) {
        let weak = Arc::downgrade(&self.inner);
        self.inner.location.subscribe(Arc::new(move |change| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let source = match change.kind {
                LocationChangeKind::Popstate => NavigationSource::Popstate,
                LocationChangeKind::Hashchange => NavigationSource::Hashchange,
            };
            debug!(url = %change.url, source = %source, "Location change received");
            match inner.serializer.parse(&change.url) {
                Ok(tree) => {
                    let _ = RouterInner::schedule(
                        &inner,
                        tree,
                        source,
                        NavigationExtras::default(),
                    );
                }
                Err(e) => {
                    warn!(url = %change.url, error = %e, "Ignoring unparsable location change");
                }
            }
        }));
    }

    /// Navigate to a URL string. The handle resolves when the navigation
    /// settles.
    pub fn navigate_by_url(&self, url: &str, extras: NavigationExtras) -> NavigationHandle {
        match self.inner.serializer.parse(url) {
            Ok(tree) => self.navigate_by_tree(tree, extras),
            Err(e) => NavigationHandle::ready(Err(RouterError::Parse(e))),
        }
    }

    /// Navigate to an already-built URL tree.
    pub fn navigate_by_tree(&self, tree: UrlTree, extras: NavigationExtras) -> NavigationHandle {
        RouterInner::schedule(&self.inner, tree, NavigationSource::Imperative, extras)
    }

    /// Apply a command list relative to `extras.relative_to` (or the
    /// root) and navigate to the result.
    pub fn navigate(&self, commands: &[Command], extras: NavigationExtras) -> NavigationHandle {
        match self.create_url_tree(commands, &extras) {
            Ok(tree) => self.navigate_by_tree(tree, extras),
            Err(e) => NavigationHandle::ready(Err(e)),
        }
    }

    /// Build the URL tree a command list would navigate to, applying the
    /// query-params handling and fragment rules of `extras`.
    pub fn create_url_tree(
        &self,
        commands: &[Command],
        extras: &NavigationExtras,
    ) -> Result<UrlTree, RouterError> {
        let state = self.inner.state.read().expect("router lock poisoned");
        let current = &state.current_url_tree;
        let fragment = if extras.preserve_fragment {
            current.fragment.clone()
        } else {
            extras.fragment.clone()
        };
        let query_params = match extras.query_params_handling {
            QueryParamsHandling::Merge => current
                .query_params
                .merged_with(&extras.query_params.clone().unwrap_or_default()),
            QueryParamsHandling::Preserve => current.query_params.clone(),
            QueryParamsHandling::Replace => extras.query_params.clone().unwrap_or_default(),
        };
        create_url_tree(
            extras.relative_to.as_deref(),
            current,
            commands,
            query_params,
            fragment,
        )
    }

    /// The serialized current URL.
    #[must_use]
    pub fn url(&self) -> String {
        let state = self.inner.state.read().expect("router lock poisoned");
        self.inner.serializer.serialize(&state.current_url_tree)
    }

    /// The current URL tree.
    #[must_use]
    pub fn current_url_tree(&self) -> UrlTree {
        self.inner
            .state
            .read()
            .expect("router lock poisoned")
            .current_url_tree
            .clone()
    }

    /// The current router state.
    #[must_use]
    pub fn router_state(&self) -> RouterState {
        self.inner
            .state
            .read()
            .expect("router lock poisoned")
            .router_state
            .clone()
    }

    /// Subscribe to router lifecycle events.
    pub fn events(&self) -> Receiver<RouterEvent> {
        self.inner.events.subscribe()
    }

    /// Whether `url` is contained in the current URL (`exact` requires a
    /// full match).
    #[must_use]
    pub fn is_active(&self, url: &str, exact: bool) -> bool {
        let Ok(tree) = self.inner.serializer.parse(url) else {
            return false;
        };
        let state = self.inner.state.read().expect("router lock poisoned");
        contains_tree(&state.current_url_tree, &tree, exact)
    }

    /// The outlet context registry the view layer registers outlets into.
    #[must_use]
    pub fn root_contexts(&self) -> &ChildrenOutletContexts {
        &self.inner.root_contexts
    }

    /// Replace the route table. The new table is validated; the current
    /// state is untouched until the next navigation.
    pub fn reset_config(&self, routes: Routes) -> Result<(), ConfigError> {
        crate::config::validate_config(&routes)?;
        *self.inner.config.write().expect("router lock poisoned") = routes;
        Ok(())
    }

    /// Stop the scheduler. Pending and future navigations resolve with
    /// [`RouterError::Disposed`].
    pub fn dispose(&self) {
        self.inner.tx.lock().expect("router lock poisoned").take();
    }
}

impl RouterInner {
    fn emit(&self, event: RouterEvent) {
        if self.enable_tracing {
            info!(event = %event, "Router event");
        } else {
            debug!(event = %event, "Router event");
        }
        self.events.emit(event);
    }

    fn schedule(
        inner: &Arc<RouterInner>,
        raw_url: UrlTree,
        source: NavigationSource,
        extras: NavigationExtras,
    ) -> NavigationHandle {
        let serialized = inner.serializer.serialize(&raw_url);
        {
            let mut last = inner.last_scheduled.lock().expect("router lock poisoned");
            if source != NavigationSource::Imperative {
                if let Some((_, last_url)) = &*last {
                    if *last_url == serialized {
                        // A browser-replayed pop/hash event for the URL we
                        // just scheduled; absorb it.
                        debug!(url = %serialized, source = %source, "Deduplicated replayed navigation");
                        return NavigationHandle::ready(Ok(NavigationOutcome::Canceled));
                    }
                }
            }
            *last = Some((source, serialized.clone()));
        }

        let id = inner.ids.next();
        let (reply_tx, reply_rx) = mpsc::channel();
        let request = NavigationRequest {
            id,
            source,
            raw_url,
            extras,
            reply: reply_tx,
        };
        let tx = inner.tx.lock().expect("router lock poisoned");
        match &*tx {
            Some(tx) => {
                if tx.send(request).is_ok() {
                    NavigationHandle::pending(reply_rx)
                } else {
                    NavigationHandle::ready(Err(RouterError::Disposed))
                }
            }
            None => NavigationHandle::ready(Err(RouterError::Disposed)),
        }
    }

    fn superseded(&self, id: NavigationId) -> bool {
        self.ids.latest() != Some(id)
    }

    fn restore_url(&self) {
        let raw = self
            .state
            .read()
            .expect("router lock poisoned")
            .raw_url_tree
            .clone();
        self.location.replace_state(&self.serializer.serialize(&raw));
    }

    fn write_url(&self, path: &str, extras: &NavigationExtras) {
        if self.location.is_current_path_equal_to(path) || extras.replace_url {
            self.location.replace_state(path);
        } else {
            self.location.go(path);
        }
    }
}

fn scheduler_loop(inner: Arc<RouterInner>, rx: Receiver<NavigationRequest>) {
    debug!("Scheduler coroutine started");
    for request in rx.iter() {
        let outcome = process_transition(&inner, &request);
        let _ = request.reply.send(outcome);
    }
    debug!("Scheduler coroutine stopped");
}

fn process_transition(
    inner: &Arc<RouterInner>,
    t: &NavigationRequest,
) -> Result<NavigationOutcome, RouterError> {
    let url_display = inner.serializer.serialize(&t.raw_url);
    info!(
        navigation_id = %t.id,
        url = %url_display,
        source = %t.source,
        "Navigation started"
    );
    inner.emit(RouterEvent::NavigationStart {
        id: t.id,
        url: url_display.clone(),
        source: t.source,
    });

    if inner.superseded(t.id) {
        return cancel_superseded(inner, t, &url_display);
    }

    // Extraction: hand non-router URLs straight back to the location.
    if !inner.url_handling.should_process_url(&t.raw_url) {
        {
            let mut state = inner.state.write().expect("router lock poisoned");
            state.raw_url_tree = t.raw_url.clone();
        }
        if !t.extras.skip_location_change {
            inner.write_url(&url_display, &t.extras);
        }
        inner.emit(RouterEvent::NavigationEnd {
            id: t.id,
            url: url_display.clone(),
            url_after_redirects: url_display.clone(),
        });
        return Ok(NavigationOutcome::Skipped);
    }
    let extracted = inner.url_handling.extract(&t.raw_url);

    // Yield once before redirects so re-entrant location events settle.
    may::coroutine::yield_now();

    if inner.superseded(t.id) {
        return cancel_superseded(inner, t, &url_display);
    }

    // Redirect expansion and lazy loading.
    let config = inner.config.read().expect("router lock poisoned").clone();
    let emit = |event: RouterEvent| inner.emit(event);
    let url_after_redirects = match apply_redirects(
        &inner.injector,
        &*inner.loader,
        &*inner.serializer,
        &emit,
        &extracted,
        &config,
    ) {
        Ok(tree) => tree,
        Err(ExpansionFailure::Cancel(cancel)) => {
            return handle_cancel(inner, t, &url_display, cancel);
        }
        Err(ExpansionFailure::Error(e)) => return handle_error(inner, t, &url_display, e),
    };
    let url_after_display = inner.serializer.serialize(&url_after_redirects);

    if inner.superseded(t.id) {
        return cancel_superseded(inner, t, &url_display);
    }

    // Recognition.
    let target_snapshot = match recognize(
        inner.root_component.clone(),
        &config,
        &url_after_redirects,
        &url_after_display,
        inner.params_inheritance,
    ) {
        Ok(snapshot) => snapshot,
        Err(e) => return handle_error(inner, t, &url_display, e.into()),
    };
    inner.emit(RouterEvent::RoutesRecognized {
        id: t.id,
        url: url_display.clone(),
        url_after_redirects: url_after_display.clone(),
    });

    if let Some(hook) = &inner.before_preactivation {
        if let Err(e) = hook(&target_snapshot) {
            return handle_error(inner, t, &url_display, RouterError::guard(e));
        }
    }

    if inner.superseded(t.id) {
        return cancel_superseded(inner, t, &url_display);
    }

    // Future state construction.
    let prev_state = inner
        .state
        .read()
        .expect("router lock poisoned")
        .router_state
        .clone();
    let target_state = match create_router_state(&*inner.reuse, &target_snapshot, &prev_state) {
        Ok(state) => state,
        Err(cancel) => return handle_cancel(inner, t, &url_display, cancel),
    };

    // Guards.
    let checks = get_all_route_guards(
        &target_snapshot,
        &prev_state.snapshot,
        &inner.root_contexts,
    );
    inner.emit(RouterEvent::GuardsCheckStart {
        id: t.id,
        url: url_display.clone(),
        url_after_redirects: url_after_display.clone(),
    });
    let verdict = match run_guards(
        &checks,
        &target_snapshot,
        &prev_state.snapshot,
        &inner.injector,
        &emit,
    ) {
        Ok(verdict) => verdict,
        Err(e) => return handle_error(inner, t, &url_display, e),
    };
    inner.emit(RouterEvent::GuardsCheckEnd {
        id: t.id,
        url: url_display.clone(),
        url_after_redirects: url_after_display.clone(),
        should_activate: verdict.is_allow(),
    });
    match verdict {
        GuardVerdict::Allow => {}
        GuardVerdict::Deny => {
            return handle_cancel(
                inner,
                t,
                &url_display,
                NavigationCancelingError::new("a guard returned false"),
            );
        }
        GuardVerdict::Redirect(tree) => {
            return handle_cancel(
                inner,
                t,
                &url_display,
                NavigationCancelingError::redirecting(tree, "a guard redirected the navigation"),
            );
        }
    }

    if inner.superseded(t.id) {
        return cancel_superseded(inner, t, &url_display);
    }

    // Resolvers.
    inner.emit(RouterEvent::ResolveStart {
        id: t.id,
        url: url_display.clone(),
        url_after_redirects: url_after_display.clone(),
    });
    if let Err(e) = resolve_data(
        &checks,
        &target_snapshot,
        &inner.injector,
        inner.params_inheritance,
    ) {
        return handle_error(inner, t, &url_display, e);
    }
    inner.emit(RouterEvent::ResolveEnd {
        id: t.id,
        url: url_display.clone(),
        url_after_redirects: url_after_display.clone(),
    });

    if let Some(hook) = &inner.after_preactivation {
        if let Err(e) = hook(&target_snapshot) {
            return handle_error(inner, t, &url_display, RouterError::guard(e));
        }
    }

    if inner.superseded(t.id) {
        return cancel_superseded(inner, t, &url_display);
    }

    // Commit: state, URL, activation.
    let new_raw = inner.url_handling.merge(&url_after_redirects, &t.raw_url);
    {
        let mut state = inner.state.write().expect("router lock poisoned");
        state.current_url_tree = url_after_redirects.clone();
        state.raw_url_tree = new_raw.clone();
        state.router_state = target_state.clone();
    }
    if !t.extras.skip_location_change {
        let path = inner.serializer.serialize(&new_raw);
        inner.write_url(&path, &t.extras);
    }

    activate_routes(
        &*inner.reuse,
        &target_state,
        &prev_state,
        &inner.root_contexts,
        &emit,
    );

    info!(
        navigation_id = %t.id,
        url = %url_after_display,
        "Navigation committed"
    );
    inner.emit(RouterEvent::NavigationEnd {
        id: t.id,
        url: url_display,
        url_after_redirects: url_after_display,
    });
    Ok(NavigationOutcome::Committed)
}

fn cancel_superseded(
    inner: &Arc<RouterInner>,
    t: &NavigationRequest,
    url: &str,
) -> Result<NavigationOutcome, RouterError> {
    let reason = format!(
        "navigation {} was superseded by a newer navigation",
        t.id
    );
    debug!(navigation_id = %t.id, "Navigation superseded");
    inner.emit(RouterEvent::NavigationCancel {
        id: t.id,
        url: url.to_string(),
        reason,
    });
    Ok(NavigationOutcome::Canceled)
}

fn handle_cancel(
    inner: &Arc<RouterInner>,
    t: &NavigationRequest,
    url: &str,
    cancel: NavigationCancelingError,
) -> Result<NavigationOutcome, RouterError> {
    info!(
        navigation_id = %t.id,
        reason = %cancel.message,
        redirecting = cancel.redirect.is_some(),
        "Navigation cancelled"
    );
    inner.emit(RouterEvent::NavigationCancel {
        id: t.id,
        url: url.to_string(),
        reason: cancel.message.clone(),
    });
    inner.restore_url();
    if let Some(redirect) = cancel.redirect {
        let _ = RouterInner::schedule(
            inner,
            redirect,
            NavigationSource::Imperative,
            NavigationExtras::default(),
        );
    }
    Ok(NavigationOutcome::Canceled)
}

fn handle_error(
    inner: &Arc<RouterInner>,
    t: &NavigationRequest,
    url: &str,
    error: RouterError,
) -> Result<NavigationOutcome, RouterError> {
    warn!(
        navigation_id = %t.id,
        error = %error,
        "Navigation failed"
    );
    inner.emit(RouterEvent::NavigationError {
        id: t.id,
        url: url.to_string(),
        error: error.to_string(),
    });
    inner.restore_url();
    match &inner.error_handler {
        Some(handler) => {
            handler(&error);
            Ok(NavigationOutcome::ErrorHandled)
        }
        None => Err(error),
    }
}
