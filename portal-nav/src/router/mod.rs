//! Router module.
//!
//! Route declarations, the immutable route table, and the `Router` that
//! resolves paths, runs navigation hooks and keeps history.

pub mod hook;
pub mod navigation;
pub mod route;
pub mod table;

pub use hook::{AfterEach, BeforeEach, NavigationHook};
pub use navigation::{Navigation, NavigationPhase, Router, DEFAULT_MAX_HISTORY};
pub use route::{normalize_path, Params, PathPattern, Route, RouteMeta};
pub use table::{Match, NotFoundView, RouteTable, RouteTableBuilder, NOT_FOUND_ROUTE};
