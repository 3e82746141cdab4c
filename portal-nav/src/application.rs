//! Terminal application shell driving the router.

use crate::component::{Action, Component, Event, SharedView};
use crate::error::{Error, Result};
use crate::router::{Match, Navigation, Params, Router};
use crate::state::Entity;
use crate::task::{LoadTracker, TaskHandle};
use crate::title::DocumentTitle;
use anyhow::Context as _;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph};
use std::io::{self, stdout};
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

/// Application context providing access to global services.
#[derive(Clone)]
pub struct AppContext {
    re_render_tx: mpsc::UnboundedSender<()>,
    title: DocumentTitle,
}

impl AppContext {
    pub fn new(re_render_tx: mpsc::UnboundedSender<()>, title: DocumentTitle) -> Self {
        Self { re_render_tx, title }
    }

    /// Create a new entity with the given value.
    pub fn new_entity<T>(&self, value: T) -> Entity<T>
    where
        T: Send + Sync + 'static,
    {
        Entity::new(value)
    }

    /// The title shown in the header. Register it as a title sink to keep it
    /// in step with navigation.
    pub fn title(&self) -> &DocumentTitle {
        &self.title
    }

    /// Schedule a task on the runtime.
    pub fn spawn<F, Fut>(&self, f: F)
    where
        F: FnOnce(AppContext) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let cx = self.clone();
        tokio::spawn(async move {
            f(cx).await;
        });
    }

    /// Re-render whenever `entity` changes.
    pub fn subscribe<T>(&self, entity: &Entity<T>)
    where
        T: Send + Sync + 'static,
    {
        let mut rx = entity.subscribe();
        let tx = self.re_render_tx.clone();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                if tx.send(()).is_err() {
                    break;
                }
            }
        });
    }

    /// Trigger a re-render.
    pub fn refresh(&self) {
        let _ = self.re_render_tx.send(());
    }
}

/// Context passed to component methods.
pub struct Context {
    pub app: AppContext,
    pub area: Rect,
    /// The location the view is shown for.
    pub current: Match,
}

impl Context {
    pub fn new(app: AppContext, area: Rect, current: Match) -> Self {
        Self { app, area, current }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.current.param(key)
    }
}

/// Context for event handling, identical to [`Context`].
pub type EventContext = Context;

/// Main application handle.
pub struct Application {
    initial_path: String,
    tick_rate: Duration,
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

impl Application {
    pub fn new() -> Self {
        Self {
            initial_path: "/".to_string(),
            tick_rate: Duration::from_millis(100),
        }
    }

    pub fn initial_path(mut self, path: impl Into<String>) -> Self {
        self.initial_path = path.into();
        self
    }

    pub fn tick_rate(mut self, tick_rate: Duration) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    /// Run the application. `setup` builds the router inside the runtime.
    pub fn run<F>(self, setup: F) -> anyhow::Result<()>
    where
        F: FnOnce(&AppContext) -> anyhow::Result<Router>,
    {
        let rt = Runtime::new().context("failed to start tokio runtime")?;

        let (re_render_tx, re_render_rx) = mpsc::unbounded_channel();
        let app = AppContext::new(re_render_tx, DocumentTitle::new(""));

        let router = {
            let _guard = rt.enter();
            setup(&app)?
        };

        rt.block_on(async move { self.run_loop(app, router, re_render_rx).await })
    }

    async fn run_loop(
        &self,
        app: AppContext,
        router: Router,
        re_render_rx: mpsc::UnboundedReceiver<()>,
    ) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture, event::EnableFocusChange)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.run_app_loop(app, router, &mut terminal, re_render_rx).await;

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            event::DisableFocusChange
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn run_app_loop(
        &self,
        app: AppContext,
        router: Router,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        mut re_render_rx: mpsc::UnboundedReceiver<()>,
    ) -> anyhow::Result<()> {
        let (load_tx, mut load_rx) = mpsc::unbounded_channel();
        let mut shell = Shell::new(app.clone(), router, load_tx);
        app.subscribe(app.title().entity());

        let size = terminal.size()?;
        shell.resize(Rect::new(0, 0, size.width, size.height));
        let nav = shell.router.navigate(&self.initial_path);
        shell.apply(nav)?;
        app.refresh();

        loop {
            tokio::select! {
                Some(_) = re_render_rx.recv() => {
                    while re_render_rx.try_recv().is_ok() {}
                    terminal.draw(|frame| shell.render(frame))?;
                }
                Some(done) = load_rx.recv() => {
                    shell.on_load(done)?;
                    app.refresh();
                }
                event_ready = async { event::poll(self.tick_rate) } => {
                    if let Ok(true) = event_ready {
                        let internal_event = match event::read()? {
                            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
                            CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
                            CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
                            CrosstermEvent::FocusGained => Some(Event::FocusGained),
                            CrosstermEvent::FocusLost => Some(Event::FocusLost),
                            CrosstermEvent::Paste(s) => Some(Event::Paste(s)),
                            _ => None,
                        };

                        if let Some(event) = internal_event {
                            if let Event::Resize(w, h) = event {
                                shell.resize(Rect::new(0, 0, w, h));
                            }
                            let quit = shell.handle_event(event)?;
                            app.refresh();
                            if quit {
                                shell.shutdown();
                                return Ok(());
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Completion message of a deferred view load.
pub(crate) struct LoadDone {
    seq: u64,
    route: String,
    result: Result<SharedView>,
}

enum Active {
    Empty,
    Loading { route: String },
    Ready(SharedView),
    Failed(String),
}

#[derive(Default)]
struct AddressBar {
    open: bool,
    input: String,
}

impl AddressBar {
    fn handle_key(&mut self, code: KeyCode) -> Option<Action> {
        match code {
            KeyCode::Char(c) => self.input.push(c),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Esc => {
                self.open = false;
                self.input.clear();
            }
            KeyCode::Enter => {
                self.open = false;
                let path = std::mem::take(&mut self.input);
                if !path.trim().is_empty() {
                    return Some(Action::Navigate(path));
                }
            }
            _ => {}
        }
        None
    }
}

/// Router plus the state of the view it currently shows.
pub(crate) struct Shell {
    app: AppContext,
    pub(crate) router: Router,
    active: Active,
    mounted: Vec<(String, SharedView)>,
    loads: LoadTracker,
    seq: u64,
    load_tx: mpsc::UnboundedSender<LoadDone>,
    address: AddressBar,
    body: Rect,
}

impl Shell {
    pub(crate) fn new(app: AppContext, router: Router, load_tx: mpsc::UnboundedSender<LoadDone>) -> Self {
        Self {
            app,
            router,
            active: Active::Empty,
            mounted: Vec::new(),
            loads: LoadTracker::new(),
            seq: 0,
            load_tx,
            address: AddressBar::default(),
            body: Rect::default(),
        }
    }

    fn layout(area: Rect) -> [Rect; 3] {
        let chunks = Layout::vertical([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(area);
        [chunks[0], chunks[1], chunks[2]]
    }

    pub(crate) fn resize(&mut self, area: Rect) {
        self.body = Self::layout(area)[1];
    }

    fn call<R>(
        &self,
        view: &SharedView,
        location: Match,
        f: impl FnOnce(&mut dyn Component, &mut Context) -> R,
    ) -> Result<R> {
        let mut cx = Context::new(self.app.clone(), self.body, location);
        let mut guard = view.lock().map_err(|_| Error::LockPoisoned)?;
        Ok(f(&mut *guard, &mut cx))
    }

    /// Show the view of a committed navigation. The title has already been
    /// set by the router's hooks at this point.
    pub(crate) fn apply(&mut self, nav: Navigation) -> Result<()> {
        let showing = matches!(self.active, Active::Ready(_) | Active::Loading { .. });
        if !nav.changed() && showing {
            return Ok(());
        }

        if let Active::Ready(view) = &self.active {
            let location = nav.from.clone().unwrap_or_else(|| nav.to.clone());
            self.call(view, location, |c, cx| c.on_exit(cx))?;
        }

        self.seq += 1;
        let route = nav.to.route.clone();
        self.loads.abort_except(&route.name);

        match route.view.loaded() {
            Some(view) => self.activate(&route.name, view)?,
            None => {
                let seq = self.seq;
                let tx = self.load_tx.clone();
                let task_route = route.clone();
                let handle = tokio::spawn(async move {
                    let result = task_route.view.resolve(&task_route.name).await;
                    let _ = tx.send(LoadDone {
                        seq,
                        route: task_route.name.clone(),
                        result,
                    });
                });
                self.loads
                    .track(TaskHandle::new(route.name.clone(), seq, handle.abort_handle()));
                tracing::debug!(route = %route.name, seq, "loading deferred view");
                self.active = Active::Loading {
                    route: route.name.clone(),
                };
            }
        }
        Ok(())
    }

    fn activate(&mut self, name: &str, view: SharedView) -> Result<()> {
        let Some(location) = self.router.current().cloned() else {
            return Ok(());
        };

        if !self.mounted.iter().any(|(n, _)| n == name) {
            self.call(&view, location.clone(), |c, cx| c.on_mount(cx))?;
            self.mounted.push((name.to_string(), view.clone()));
        }
        self.call(&view, location, |c, cx| c.on_enter(cx))?;
        self.active = Active::Ready(view);
        Ok(())
    }

    pub(crate) fn on_load(&mut self, done: LoadDone) -> Result<()> {
        self.loads.complete(done.seq);
        if done.seq != self.seq {
            tracing::debug!(route = %done.route, seq = done.seq, "ignoring stale view load");
            return Ok(());
        }
        match done.result {
            Ok(view) => self.activate(&done.route, view),
            Err(e) => {
                self.active = Active::Failed(e.to_string());
                Ok(())
            }
        }
    }

    /// Dispatch an event. Returns true when the application should quit.
    pub(crate) fn handle_event(&mut self, event: Event) -> Result<bool> {
        if self.address.open {
            if let Event::Key(key) = &event {
                if let Some(action) = self.address.handle_key(key.code) {
                    return self.perform(action);
                }
            }
            return Ok(false);
        }

        let action = match (&self.active, self.router.current()) {
            (Active::Ready(view), Some(current)) => {
                let current = current.clone();
                self.call(view, current, |c, cx| c.handle_event(event.clone(), cx))?
            }
            _ => None,
        };

        match action.or_else(|| self.global_action(&event)) {
            Some(action) => self.perform(action),
            None => Ok(false),
        }
    }

    fn global_action(&mut self, event: &Event) -> Option<Action> {
        let Event::Key(key) = event else {
            return None;
        };
        let table = self.router.table();
        let position = self
            .router
            .current()
            .and_then(|m| table.position(m.name()));
        let path_at = |i: usize| table.routes().nth(i).map(|r| r.path().to_string());

        match key.code {
            KeyCode::Esc | KeyCode::Backspace => Some(Action::Back),
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char(':') => {
                self.address.open = true;
                Some(Action::Noop)
            }
            KeyCode::Tab if !table.is_empty() => {
                let next = position.map(|p| (p + 1) % table.len()).unwrap_or(0);
                path_at(next).map(Action::Navigate)
            }
            KeyCode::BackTab if !table.is_empty() => {
                let prev = position
                    .map(|p| (p + table.len() - 1) % table.len())
                    .unwrap_or(0);
                path_at(prev).map(Action::Navigate)
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                path_at(index).map(Action::Navigate)
            }
            _ => None,
        }
    }

    fn perform(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::Navigate(path) => {
                let nav = self.router.navigate(&path);
                self.apply(nav)?;
            }
            Action::NavigateNamed(name) => match self.router.navigate_named(&name, &Params::new()) {
                Ok(nav) => self.apply(nav)?,
                Err(e) => tracing::warn!(error = %e, "named navigation failed"),
            },
            Action::Back => {
                if let Some(nav) = self.router.go_back() {
                    self.apply(nav)?;
                }
            }
            Action::Quit => return Ok(true),
            Action::Noop => {}
        }
        Ok(false)
    }

    pub(crate) fn render(&mut self, frame: &mut Frame) {
        let [header, body, footer] = Self::layout(frame.area());
        self.body = body;

        let path = self
            .router
            .current()
            .map(|m| m.path.clone())
            .unwrap_or_default();
        let title = Paragraph::new(self.app.title().get())
            .style(Style::default().add_modifier(Modifier::BOLD))
            .block(Block::bordered().title(format!(" {path} ")));
        frame.render_widget(title, header);

        match &self.active {
            Active::Ready(view) => {
                if let Some(current) = self.router.current().cloned() {
                    let rendered = self.call(view, current, |c, cx| c.render(frame, cx));
                    if let Err(e) = rendered {
                        frame.render_widget(Paragraph::new(e.to_string()), body);
                    }
                }
            }
            Active::Loading { route } => {
                let text = Paragraph::new(format!("正在加载 {route} …")).alignment(Alignment::Center);
                frame.render_widget(text, body);
            }
            Active::Failed(message) => {
                let text = Paragraph::new(format!("{message}\n\nEsc 返回"))
                    .style(Style::default().fg(Color::Red))
                    .alignment(Alignment::Center);
                frame.render_widget(text, body);
            }
            Active::Empty => {}
        }

        let status = if self.address.open {
            Line::from(format!(":{}", self.address.input))
        } else {
            Line::from(format!(
                " Tab/1-9 切换 │ : 输入路径 │ Esc 返回 ({}) │ q 退出 ",
                self.router.history_len()
            ))
            .style(Style::default().fg(Color::DarkGray))
        };
        frame.render_widget(Paragraph::new(status), footer);
    }

    pub(crate) fn shutdown(&mut self) {
        self.loads.abort_all();
        let location = self.router.current().cloned();
        if let Some(location) = location {
            for (name, view) in &self.mounted {
                if let Err(e) = self.call(view, location.clone(), |c, cx| c.on_shutdown(cx)) {
                    tracing::warn!(route = %name, error = %e, "shutdown hook failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ViewProvider;
    use crate::router::{Route, RouteTable};
    use crate::title::{TitleFormatter, TitleHook};
    use crossterm::event::{KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Journal(Arc<Mutex<Vec<String>>>);

    impl Journal {
        fn push(&self, entry: String) {
            self.0.lock().unwrap().push(entry);
        }

        fn entries(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    struct Page {
        name: &'static str,
        journal: Journal,
    }

    impl Component for Page {
        fn on_mount(&mut self, _cx: &mut Context) {
            self.journal.push(format!("mount {}", self.name));
        }

        fn on_enter(&mut self, cx: &mut Context) {
            self.journal.push(format!("enter {} {}", self.name, cx.current.path));
        }

        fn on_exit(&mut self, _cx: &mut Context) {
            self.journal.push(format!("exit {}", self.name));
        }

        fn render(&mut self, frame: &mut Frame, cx: &mut Context) {
            frame.render_widget(Paragraph::new(format!("page {}", self.name)), cx.area);
        }
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn shell(journal: &Journal) -> (Shell, mpsc::UnboundedReceiver<LoadDone>) {
        let (re_render_tx, _) = mpsc::unbounded_channel();
        let app = AppContext::new(re_render_tx, DocumentTitle::new(""));

        let eager = Page { name: "labs", journal: journal.clone() };
        let deferred_journal = journal.clone();
        let table = RouteTable::builder()
            .route(Route::new("/labs", "Labs", ViewProvider::eager(eager)).unwrap().with_title("实验室"))
            .route(
                Route::new(
                    "/equipment",
                    "Equipment",
                    ViewProvider::deferred(move || {
                        let journal = deferred_journal.clone();
                        async move { Ok(Page { name: "equipment", journal }) }
                    }),
                )
                .unwrap()
                .with_title("设备"),
            )
            .build()
            .unwrap();

        let router = Router::new(table).with_hook(
            TitleHook::new(TitleFormatter::new("平台")).with_sink(app.title().clone()),
        );
        let (load_tx, load_rx) = mpsc::unbounded_channel();
        let mut shell = Shell::new(app, router, load_tx);
        shell.resize(Rect::new(0, 0, 60, 12));
        (shell, load_rx)
    }

    #[tokio::test]
    async fn test_eager_view_activates_immediately() {
        let journal = Journal::default();
        let (mut shell, _rx) = shell(&journal);

        let nav = shell.router.navigate("/labs");
        shell.apply(nav).unwrap();

        assert!(matches!(shell.active, Active::Ready(_)));
        assert_eq!(journal.entries(), vec!["mount labs", "enter labs /labs"]);
        assert_eq!(shell.app.title().get(), "实验室 - 平台");
    }

    #[tokio::test]
    async fn test_title_is_set_before_deferred_view_loads() {
        let journal = Journal::default();
        let (mut shell, mut rx) = shell(&journal);

        let nav = shell.router.navigate("/equipment");
        shell.apply(nav).unwrap();
        assert!(matches!(shell.active, Active::Loading { .. }));
        assert_eq!(shell.app.title().get(), "设备 - 平台");
        assert!(journal.entries().is_empty());

        let done = rx.recv().await.unwrap();
        shell.on_load(done).unwrap();
        assert!(matches!(shell.active, Active::Ready(_)));
        assert_eq!(journal.entries(), vec!["mount equipment", "enter equipment /equipment"]);
    }

    #[tokio::test]
    async fn test_stale_load_is_ignored() {
        let journal = Journal::default();
        let (mut shell, mut rx) = shell(&journal);

        let nav = shell.router.navigate("/equipment");
        shell.apply(nav).unwrap();
        let nav = shell.router.navigate("/labs");
        shell.apply(nav).unwrap();

        // The superseded load is aborted; if it still managed to report, it
        // must not replace the current view.
        if let Ok(Some(done)) = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await {
            shell.on_load(done).unwrap();
        }
        assert_eq!(shell.router.current().unwrap().name(), "Labs");
        assert!(!journal.entries().iter().any(|e| e.starts_with("enter equipment")));
    }

    #[tokio::test]
    async fn test_global_keys_navigate_and_go_back() {
        let journal = Journal::default();
        let (mut shell, _rx) = shell(&journal);
        let nav = shell.router.navigate("/labs");
        shell.apply(nav).unwrap();

        assert!(!shell.handle_event(key(KeyCode::Tab)).unwrap());
        assert_eq!(shell.router.current().unwrap().name(), "Equipment");

        shell.handle_event(key(KeyCode::Esc)).unwrap();
        assert_eq!(shell.router.current().unwrap().name(), "Labs");
        assert!(journal.entries().contains(&"exit labs".to_string()));

        assert!(shell.handle_event(key(KeyCode::Char('q'))).unwrap());
    }

    #[tokio::test]
    async fn test_address_bar_reaches_not_found() {
        let journal = Journal::default();
        let (mut shell, _rx) = shell(&journal);
        let nav = shell.router.navigate("/labs");
        shell.apply(nav).unwrap();

        shell.handle_event(key(KeyCode::Char(':'))).unwrap();
        for c in "/nowhere".chars() {
            shell.handle_event(key(KeyCode::Char(c))).unwrap();
        }
        shell.handle_event(key(KeyCode::Enter)).unwrap();

        let current = shell.router.current().unwrap();
        assert!(current.is_not_found());
        assert_eq!(current.path, "/nowhere");
        assert_eq!(shell.app.title().get(), "页面未找到 - 平台");

        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal.draw(|frame| shell.render(frame)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("404"));
        assert!(screen.contains("/nowhere"));
    }
}
