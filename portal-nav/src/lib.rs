//! Route-table navigation for terminal portals.
//!
//! Routes map URL-style paths to views that are either built up front or
//! loaded on demand. A [`Router`] resolves paths against an immutable
//! [`RouteTable`], runs navigation hooks (the [`TitleHook`] sets the window
//! title) and keeps a bounded history. [`Application`] drives it all in a
//! ratatui terminal.

pub mod application;
pub mod component;
pub mod error;
pub mod router;
pub mod state;
pub mod task;
pub mod title;

pub use error::{Error, Result};

// Re-export common types for convenience
pub use application::{AppContext, Application, Context, EventContext};
pub use component::{Action, Component, Event, SharedView, ViewProvider};
pub use router::{
    Match, Navigation, NavigationHook, NavigationPhase, Params, Route, RouteMeta, RouteTable,
    Router,
};
pub use state::{Entity, EntityId};
pub use task::{LoadTracker, TaskHandle};
pub use title::{DocumentTitle, TerminalTitle, TitleFormatter, TitleHook, TitleSink};
