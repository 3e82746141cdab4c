//! The immutable route table and path resolution.

use super::route::{normalize_path, Params, PathPattern, Route, RouteMeta};
use crate::application::Context;
use crate::component::{shared, Component, ViewProvider};
use crate::error::{DuplicateNameSnafu, DuplicatePathSnafu, Result, UnknownRouteNameSnafu};
use snafu::{ensure, OptionExt};
use std::collections::HashSet;
use std::sync::Arc;

/// Name of the built-in route used for unmatched paths.
pub const NOT_FOUND_ROUTE: &str = "NotFound";

/// The result of resolving a path against the table.
#[derive(Debug, Clone)]
pub struct Match {
    pub route: Arc<Route>,
    /// Normalized requested path.
    pub path: String,
    pub params: Params,
}

impl Match {
    pub fn name(&self) -> &str {
        &self.route.name
    }

    pub fn meta(&self) -> &RouteMeta {
        &self.route.meta
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Whether this match landed on the fallback route.
    pub fn is_not_found(&self) -> bool {
        self.route.name == NOT_FOUND_ROUTE
    }
}

/// Routes in declaration order plus the fallback for unmatched paths.
///
/// Built once through [`RouteTable::builder`]; there is no API to mutate it
/// afterwards.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Arc<[Arc<Route>]>,
    not_found: Arc<Route>,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// First route whose pattern matches `target`.
    pub fn resolve(&self, target: &str) -> Option<Match> {
        let path = normalize_path(target);
        let found = self.routes.iter().find_map(|route| {
            route.pattern().matches(&path).map(|params| Match {
                route: Arc::clone(route),
                path: path.clone(),
                params,
            })
        });
        tracing::debug!(requested = target, path = %path, matched = ?found.as_ref().map(Match::name), "resolve");
        found
    }

    /// Like [`resolve`](Self::resolve), falling back to the not-found route.
    pub fn resolve_or_fallback(&self, target: &str) -> Match {
        self.resolve(target).unwrap_or_else(|| Match {
            route: Arc::clone(&self.not_found),
            path: normalize_path(target),
            params: Params::new(),
        })
    }

    pub fn by_name(&self, name: &str) -> Option<&Arc<Route>> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// Build the concrete path of a named route.
    pub fn path_for(&self, name: &str, params: &Params) -> Result<String> {
        let route = self.by_name(name).context(UnknownRouteNameSnafu { name })?;
        route.pattern().build(name, params)
    }

    /// Declared routes in order, without the fallback.
    pub fn routes(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn not_found(&self) -> &Arc<Route> {
        &self.not_found
    }

    /// Position of a route in declaration order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.routes.iter().position(|r| r.name == name)
    }
}

#[derive(Default)]
pub struct RouteTableBuilder {
    routes: Vec<Route>,
    not_found: Option<Route>,
}

impl RouteTableBuilder {
    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Replace the built-in not-found view.
    pub fn not_found(mut self, view: ViewProvider, meta: RouteMeta) -> Self {
        self.not_found = Some(Route {
            pattern: PathPattern::root(),
            name: NOT_FOUND_ROUTE.to_string(),
            view,
            meta,
        });
        self
    }

    /// Validate uniqueness of paths and names and freeze the table.
    pub fn build(self) -> Result<RouteTable> {
        let mut paths = HashSet::new();
        let mut names = HashSet::new();
        names.insert(NOT_FOUND_ROUTE.to_string());

        for route in &self.routes {
            ensure!(
                paths.insert(route.pattern.shape()),
                DuplicatePathSnafu { path: route.path() }
            );
            ensure!(
                names.insert(route.name.clone()),
                DuplicateNameSnafu { name: route.name.as_str() }
            );
        }

        let not_found = self.not_found.unwrap_or_else(default_not_found);
        let routes: Vec<Arc<Route>> = self.routes.into_iter().map(Arc::new).collect();

        tracing::debug!(routes = routes.len(), "route table built");
        Ok(RouteTable {
            routes: routes.into(),
            not_found: Arc::new(not_found),
        })
    }
}

fn default_not_found() -> Route {
    Route {
        pattern: PathPattern::root(),
        name: NOT_FOUND_ROUTE.to_string(),
        view: ViewProvider::Eager(shared(NotFoundView)),
        meta: RouteMeta::titled("页面未找到"),
    }
}

/// Fallback view rendered for unmatched paths.
pub struct NotFoundView;

impl Component for NotFoundView {
    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context) {
        let text = format!("404 · 未找到页面 {}", cx.current.path);
        let paragraph = ratatui::widgets::Paragraph::new(text)
            .alignment(ratatui::layout::Alignment::Center);
        frame.render_widget(paragraph, cx.area);
    }
}
