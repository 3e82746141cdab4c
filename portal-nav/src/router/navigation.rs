//! The router: current location, back stack and hook dispatch.

use super::hook::NavigationHook;
use super::route::Params;
use super::table::{Match, RouteTable};
use crate::error::Result;

/// Default bound on the back stack.
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// Phase of a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationPhase {
    /// Target resolved, hooks running, not yet current.
    Requested,
    /// Target is the current location.
    Committed,
}

/// Outcome of a committed navigation.
#[derive(Debug, Clone)]
pub struct Navigation {
    pub to: Match,
    pub from: Option<Match>,
    pub phase: NavigationPhase,
}

impl Navigation {
    /// Whether the target differs from where the router was.
    pub fn changed(&self) -> bool {
        self.from.as_ref().map(|f| f.path != self.to.path).unwrap_or(true)
    }
}

/// A router that resolves paths against a [`RouteTable`] and keeps a
/// bounded navigation history.
///
/// # Example
/// ```ignore
/// let mut router = Router::new(table);
/// router.navigate("/equipment");
/// assert_eq!(router.current().unwrap().name(), "Equipment");
/// router.go_back();
/// ```
pub struct Router {
    table: RouteTable,
    current: Option<Match>,
    history: Vec<Match>,
    max_history: usize,
    hooks: Vec<Box<dyn NavigationHook>>,
}

impl Router {
    /// Create a router over the table. Nothing is current until the first
    /// navigation.
    pub fn new(table: RouteTable) -> Self {
        Self {
            table,
            current: None,
            history: Vec::new(),
            max_history: DEFAULT_MAX_HISTORY,
            hooks: Vec::new(),
        }
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    /// Register a hook. Hooks run in registration order.
    pub fn add_hook<H: NavigationHook + 'static>(&mut self, hook: H) {
        self.hooks.push(Box::new(hook));
    }

    pub fn with_hook<H: NavigationHook + 'static>(mut self, hook: H) -> Self {
        self.add_hook(hook);
        self
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Get the current location.
    pub fn current(&self) -> Option<&Match> {
        self.current.as_ref()
    }

    /// Navigate to a path. Unmatched paths land on the not-found route.
    /// The current location is pushed to history when the path changes.
    pub fn navigate(&mut self, target: &str) -> Navigation {
        let to = self.table.resolve_or_fallback(target);
        self.transition(to, true)
    }

    /// Navigate to a named route, filling its dynamic segments from `params`.
    pub fn navigate_named(&mut self, name: &str, params: &Params) -> Result<Navigation> {
        let path = self.table.path_for(name, params)?;
        Ok(self.navigate(&path))
    }

    /// Go back to the previous location. Hooks run as for any navigation.
    pub fn go_back(&mut self) -> Option<Navigation> {
        let previous = self.history.pop()?;
        Some(self.transition(previous, false))
    }

    /// Check if there's history to go back to.
    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    /// Get the history length.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Clear the navigation history.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn transition(&mut self, to: Match, record: bool) -> Navigation {
        let from = self.current.clone();
        let mut nav = Navigation {
            to,
            from,
            phase: NavigationPhase::Requested,
        };

        for hook in &self.hooks {
            hook.before_each(&nav.to, nav.from.as_ref());
        }

        if record && nav.changed() {
            if let Some(previous) = self.current.take() {
                self.history.push(previous);
                if self.history.len() > self.max_history {
                    let overflow = self.history.len() - self.max_history;
                    self.history.drain(..overflow);
                }
            }
        }
        self.current = Some(nav.to.clone());
        nav.phase = NavigationPhase::Committed;

        tracing::info!(
            path = %nav.to.path,
            route = nav.to.name(),
            from = nav.from.as_ref().map(|f| f.path.as_str()),
            history = self.history.len(),
            "navigation committed"
        );

        for hook in &self.hooks {
            hook.after_each(&nav.to, nav.from.as_ref());
        }
        nav
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ViewProvider;
    use crate::router::hook::{AfterEach, BeforeEach};
    use crate::router::route::Route;
    use crate::router::table::NotFoundView;
    use std::sync::{Arc, Mutex};

    fn table() -> RouteTable {
        let view = || ViewProvider::eager(NotFoundView);
        RouteTable::builder()
            .route(Route::new("/", "Home", view()).unwrap())
            .route(Route::new("/settings", "Settings", view()).unwrap())
            .route(Route::new("/profile/:user", "Profile", view()).unwrap())
            .build()
            .unwrap()
    }

    fn current_name(router: &Router) -> Option<String> {
        router.current().map(|m| m.name().to_string())
    }

    #[test]
    fn test_router_navigation() {
        let mut router = Router::new(table());
        assert!(router.current().is_none());

        router.navigate("/");
        assert_eq!(current_name(&router).as_deref(), Some("Home"));
        assert!(!router.can_go_back());

        router.navigate("/settings");
        assert_eq!(current_name(&router).as_deref(), Some("Settings"));
        assert!(router.can_go_back());

        router.navigate("/profile/ada");
        assert_eq!(router.current().unwrap().param("user"), Some("ada"));
        assert_eq!(router.history_len(), 2);

        assert!(router.go_back().is_some());
        assert_eq!(current_name(&router).as_deref(), Some("Settings"));

        assert!(router.go_back().is_some());
        assert_eq!(current_name(&router).as_deref(), Some("Home"));

        assert!(router.go_back().is_none());
        assert_eq!(current_name(&router).as_deref(), Some("Home"));
    }

    #[test]
    fn test_router_no_duplicate_navigation() {
        let mut router = Router::new(table());
        router.navigate("/");
        let nav = router.navigate("/");
        assert!(!nav.changed());
        assert_eq!(router.history_len(), 0);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut router = Router::new(table()).with_max_history(2);
        router.navigate("/");
        router.navigate("/profile/a");
        router.navigate("/profile/b");
        router.navigate("/profile/c");
        assert_eq!(router.history_len(), 2);

        router.go_back();
        router.go_back();
        assert_eq!(router.current().unwrap().path, "/profile/a");
        assert!(!router.can_go_back());
    }

    #[test]
    fn test_unknown_path_lands_on_not_found() {
        let mut router = Router::new(table());
        router.navigate("/settings");
        let nav = router.navigate("/labs/unknown");
        assert_eq!(nav.phase, NavigationPhase::Committed);
        assert!(nav.to.is_not_found());
        assert_eq!(nav.to.path, "/labs/unknown");

        router.go_back();
        assert_eq!(current_name(&router).as_deref(), Some("Settings"));
    }

    #[test]
    fn test_navigate_named() {
        let mut router = Router::new(table());
        let mut params = Params::new();
        params.insert("user".into(), "grace".into());

        let nav = router.navigate_named("Profile", &params).unwrap();
        assert_eq!(nav.to.path, "/profile/grace");
        assert!(router.navigate_named("Missing", &params).is_err());
    }

    #[test]
    fn test_hooks_run_on_every_attempt_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));

        let before = Arc::clone(&log);
        let after = Arc::clone(&log);
        let mut router = Router::new(table())
            .with_hook(BeforeEach(move |to: &Match, from: Option<&Match>| {
                let from = from.map(|f| f.name().to_string()).unwrap_or_default();
                before.lock().unwrap().push(format!("before {from}->{}", to.name()));
            }))
            .with_hook(AfterEach(move |to: &Match, _from: Option<&Match>| {
                after.lock().unwrap().push(format!("after {}", to.name()));
            }));

        router.navigate("/");
        router.navigate("/");
        router.navigate("/settings");
        router.go_back();

        let log = log.lock().unwrap();
        assert_eq!(
            *log,
            vec![
                "before ->Home",
                "after Home",
                "before Home->Home",
                "after Home",
                "before Home->Settings",
                "after Settings",
                "before Settings->Home",
                "after Home",
            ]
        );
    }

    #[test]
    fn test_before_hook_sees_uncommitted_state() {
        struct Probe(Arc<Mutex<Option<String>>>);

        impl NavigationHook for Probe {
            fn before_each(&self, _to: &Match, from: Option<&Match>) {
                *self.0.lock().unwrap() = from.map(|f| f.path.clone());
            }
        }

        let seen = Arc::new(Mutex::new(None));
        let mut router = Router::new(table()).with_hook(Probe(Arc::clone(&seen)));
        router.navigate("/");
        router.navigate("/settings");
        assert_eq!(seen.lock().unwrap().as_deref(), Some("/"));
    }
}
