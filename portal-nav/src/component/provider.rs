//! View providers.
//!
//! A route's view is either constructed up front or produced by an async
//! loader on first demand. Both shapes sit behind [`ViewProvider`] so the
//! route table and the shell treat them the same way.

use super::Component;
use crate::error::{Result, ViewLoadSnafu};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

/// A view shared between the route table and the shell.
pub type SharedView = Arc<Mutex<dyn Component>>;

/// Boxed future returned by deferred loaders.
pub type LoadFuture = Pin<Box<dyn Future<Output = Result<SharedView>> + Send>>;

type Loader = dyn Fn() -> LoadFuture + Send + Sync;

/// Wrap a component into a [`SharedView`].
pub fn shared<C: Component>(component: C) -> SharedView {
    Arc::new(Mutex::new(component))
}

/// Produces the view for a route.
#[derive(Clone)]
pub enum ViewProvider {
    Eager(SharedView),
    Deferred(DeferredView),
}

/// A view loaded on demand and cached after the first successful load.
#[derive(Clone)]
pub struct DeferredView {
    loader: Arc<Loader>,
    cell: Arc<OnceCell<SharedView>>,
}

impl ViewProvider {
    pub fn eager<C: Component>(component: C) -> Self {
        ViewProvider::Eager(shared(component))
    }

    /// Defer construction to `loader`, which runs at most once on success.
    pub fn deferred<F, Fut, C>(loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<C>> + Send + 'static,
        C: Component,
    {
        let loader: Arc<Loader> = Arc::new(move || {
            let fut = loader();
            Box::pin(async move { fut.await.map(shared) }) as LoadFuture
        });
        ViewProvider::Deferred(DeferredView {
            loader,
            cell: Arc::new(OnceCell::new()),
        })
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, ViewProvider::Deferred(_))
    }

    /// The view, if it is available without loading.
    pub fn loaded(&self) -> Option<SharedView> {
        match self {
            ViewProvider::Eager(view) => Some(Arc::clone(view)),
            ViewProvider::Deferred(deferred) => deferred.cell.get().cloned(),
        }
    }

    /// Return the view, running the loader if needed.
    pub async fn resolve(&self, route: &str) -> Result<SharedView> {
        match self {
            ViewProvider::Eager(view) => Ok(Arc::clone(view)),
            ViewProvider::Deferred(deferred) => {
                let view = deferred
                    .cell
                    .get_or_try_init(|| (deferred.loader)())
                    .await
                    .map_err(|e| {
                        tracing::warn!(route, error = %e, "deferred view failed to load");
                        ViewLoadSnafu {
                            route,
                            message: e.to_string(),
                        }
                        .build()
                    })?;
                Ok(Arc::clone(view))
            }
        }
    }
}

impl fmt::Debug for ViewProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewProvider::Eager(_) => f.write_str("Eager"),
            ViewProvider::Deferred(d) => {
                let state = if d.cell.initialized() { "loaded" } else { "pending" };
                write!(f, "Deferred({state})")
            }
        }
    }
}
