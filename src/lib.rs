pub mod config;
pub mod errors;
pub mod events;
pub mod expansion;
pub mod guards;
pub mod handling;
pub mod ids;
pub mod injector;
pub mod loader;
pub mod location;
mod matching;
pub mod outlet;
pub mod params;
pub mod recognition;
pub mod reuse;
pub mod runtime_config;
pub mod scheduler;
pub mod state;
mod stream;
pub mod url;

pub use config::{
    same_route_config, ComponentId, LoadedRouterConfig, PathMatch, Route, RouteTitle, Routes,
    RunGuardsAndResolvers, ROUTE_TITLE_KEY,
};
pub use errors::{ConfigError, NavigationCancelingError, RouterError, UrlParseError};
pub use events::{NavigationSource, RouterEvent};
pub use guards::{GuardResult, GuardVerdict};
pub use ids::NavigationId;
pub use params::{Data, ParamMap, QueryParams, QueryValue};
pub use recognition::ParamsInheritance;
pub use scheduler::{
    InitialNavigation, NavigationExtras, NavigationHandle, NavigationOutcome, QueryParamsHandling,
    Router, RouterOptions,
};
pub use state::{ActivatedRoute, ActivatedRouteSnapshot, RouterState, RouterStateSnapshot};
pub use stream::ValueStream;
pub use url::{Command, DefaultUrlSerializer, UrlSegment, UrlSegmentGroup, UrlSerializer, UrlTree, PRIMARY_OUTLET};
