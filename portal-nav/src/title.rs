//! Window title handling.
//!
//! [`TitleFormatter`] turns route metadata into a title string,
//! [`TitleSink`]s receive it, and [`TitleHook`] ties both to navigation.

use crate::error::{Result, TerminalSnafu};
use crate::router::{Match, NavigationHook, RouteMeta};
use crate::state::Entity;
use snafu::ResultExt;

pub const DEFAULT_SEPARATOR: &str = " - ";

/// Formats `"{title}{separator}{app_name}"`, or the bare application name
/// when the route has no title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleFormatter {
    app_name: String,
    separator: String,
}

impl TitleFormatter {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn format(&self, meta: &RouteMeta) -> String {
        match meta.title() {
            Some(title) => format!("{title}{}{}", self.separator, self.app_name),
            None => self.app_name.clone(),
        }
    }
}

/// Destination of the formatted title.
pub trait TitleSink: Send + Sync {
    fn set_title(&self, title: &str) -> Result<()>;
}

/// The in-process document title. Clones observe the same value.
#[derive(Clone)]
pub struct DocumentTitle(Entity<String>);

impl DocumentTitle {
    pub fn new(initial: impl Into<String>) -> Self {
        Self(Entity::new(initial.into()))
    }

    pub fn get(&self) -> String {
        self.0.read(|t| t.clone()).unwrap_or_default()
    }

    pub fn entity(&self) -> &Entity<String> {
        &self.0
    }
}

impl TitleSink for DocumentTitle {
    /// Subscribers are only notified when the title actually changes.
    fn set_title(&self, title: &str) -> Result<()> {
        if self.0.read(|t| t == title)? {
            return Ok(());
        }
        self.0.update(|t| *t = title.to_string())
    }
}

/// Writes the title to the hosting terminal window.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalTitle;

impl TitleSink for TerminalTitle {
    fn set_title(&self, title: &str) -> Result<()> {
        crossterm::execute!(std::io::stdout(), crossterm::terminal::SetTitle(title))
            .context(TerminalSnafu)
    }
}

/// Navigation hook that sets the title before each navigation commits.
pub struct TitleHook {
    formatter: TitleFormatter,
    sinks: Vec<Box<dyn TitleSink>>,
}

impl TitleHook {
    pub fn new(formatter: TitleFormatter) -> Self {
        Self {
            formatter,
            sinks: Vec::new(),
        }
    }

    pub fn with_sink<S: TitleSink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl NavigationHook for TitleHook {
    fn before_each(&self, to: &Match, _from: Option<&Match>) {
        let title = self.formatter.format(to.meta());
        tracing::debug!(%title, route = to.name(), "set title");
        for sink in &self.sinks {
            if let Err(e) = sink.set_title(&title) {
                tracing::warn!(error = %e, "failed to set title");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ViewProvider;
    use crate::router::{NotFoundView, Route, RouteTable, Router};
    use std::sync::{Arc, Mutex};

    const APP: &str = "高校大型仪器设备共享服务平台";

    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl TitleSink for Recorder {
        fn set_title(&self, title: &str) -> Result<()> {
            self.0.lock().unwrap().push(title.to_string());
            Ok(())
        }
    }

    struct Broken;

    impl TitleSink for Broken {
        fn set_title(&self, _title: &str) -> Result<()> {
            Err(crate::Error::LockPoisoned)
        }
    }

    #[test]
    fn test_format_with_and_without_title() {
        let formatter = TitleFormatter::new(APP);
        assert_eq!(
            formatter.format(&RouteMeta::titled("设备管理")),
            "设备管理 - 高校大型仪器设备共享服务平台"
        );
        assert_eq!(formatter.format(&RouteMeta::new()), APP);
        assert_eq!(formatter.format(&RouteMeta::titled("")), APP);
    }

    #[test]
    fn test_custom_separator() {
        let formatter = TitleFormatter::new("Portal").with_separator(" | ");
        assert_eq!(formatter.format(&RouteMeta::titled("Labs")), "Labs | Portal");
    }

    #[test]
    fn test_hook_sets_every_sink_and_survives_failures() {
        let table = RouteTable::builder()
            .route(
                Route::new("/", "Home", ViewProvider::eager(NotFoundView))
                    .unwrap()
                    .with_title("首页"),
            )
            .build()
            .unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let document = DocumentTitle::new(APP);
        let hook = TitleHook::new(TitleFormatter::new(APP))
            .with_sink(Broken)
            .with_sink(Recorder(Arc::clone(&seen)))
            .with_sink(document.clone());

        let mut router = Router::new(table).with_hook(hook);
        let nav = router.navigate("/");

        assert_eq!(nav.to.name(), "Home");
        assert_eq!(document.get(), "首页 - 高校大型仪器设备共享服务平台");
        assert_eq!(*seen.lock().unwrap(), vec!["首页 - 高校大型仪器设备共享服务平台"]);
    }

    #[test]
    fn test_unmatched_path_uses_not_found_title() {
        let table = RouteTable::builder().build().unwrap();
        let document = DocumentTitle::new(APP);
        let mut router = Router::new(table)
            .with_hook(TitleHook::new(TitleFormatter::new(APP)).with_sink(document.clone()));

        router.navigate("/missing");
        assert_eq!(document.get(), "页面未找到 - 高校大型仪器设备共享服务平台");
    }

    #[test]
    fn test_untitled_route_gets_bare_app_name() {
        let table = RouteTable::builder()
            .route(
                Route::new("/", "Home", ViewProvider::eager(NotFoundView))
                    .unwrap()
                    .with_title("首页"),
            )
            .route(Route::new("/about", "About", ViewProvider::eager(NotFoundView)).unwrap())
            .route(
                Route::new("/blank", "Blank", ViewProvider::eager(NotFoundView))
                    .unwrap()
                    .with_title(""),
            )
            .build()
            .unwrap();
        let document = DocumentTitle::new("");
        let mut router = Router::new(table)
            .with_hook(TitleHook::new(TitleFormatter::new(APP)).with_sink(document.clone()));

        router.navigate("/");
        assert_eq!(document.get(), "首页 - 高校大型仪器设备共享服务平台");

        router.navigate("/about");
        assert_eq!(document.get(), APP);

        router.navigate("/blank");
        assert_eq!(document.get(), APP);
    }

    #[test]
    fn test_document_title_notifies_only_on_change() {
        let document = DocumentTitle::new(APP);
        let mut rx = document.entity().subscribe();

        document.set_title(APP).unwrap();
        assert!(!rx.has_changed().unwrap());

        document.set_title("首页 - 高校大型仪器设备共享服务平台").unwrap();
        assert!(rx.has_changed().unwrap());
        rx.mark_unchanged();

        document.set_title("首页 - 高校大型仪器设备共享服务平台").unwrap();
        assert!(!rx.has_changed().unwrap());
    }
}
