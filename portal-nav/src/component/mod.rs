//! Component module.
//!
//! Defines the `Component` trait and the `ViewProvider` that binds views to routes.

pub mod provider;
pub mod traits;

pub use provider::{shared, DeferredView, SharedView, ViewProvider};
pub use traits::{Action, Component, Event};
