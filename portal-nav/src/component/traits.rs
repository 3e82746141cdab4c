use crate::application::{Context, EventContext};

/// Event type for component interactions.
#[derive(Debug, Clone)]
pub enum Event {
    Key(crossterm::event::KeyEvent),
    Mouse(crossterm::event::MouseEvent),
    Resize(u16, u16),
    FocusGained,
    FocusLost,
    Paste(String),
}

/// Action that a component can return after handling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Navigate to a path, e.g. `/equipment`.
    Navigate(String),
    /// Navigate to a route by its name.
    NavigateNamed(String),
    Back,
    Quit,
    Noop,
}

/// The core Component trait for views.
pub trait Component: Send + 'static {
    /// Called once, the first time the view becomes active.
    fn on_mount(&mut self, cx: &mut Context) {
        let _ = cx;
    }

    /// Called every time navigation lands on this view.
    fn on_enter(&mut self, cx: &mut Context) {
        let _ = cx;
    }

    /// Called when navigation leaves this view.
    fn on_exit(&mut self, cx: &mut Context) {
        let _ = cx;
    }

    /// Called when the application is about to shut down.
    fn on_shutdown(&mut self, cx: &mut Context) {
        let _ = cx;
    }

    /// Render the component into `cx.area`.
    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context);

    /// Handle an event, returning an optional action.
    fn handle_event(&mut self, event: Event, cx: &mut EventContext) -> Option<Action> {
        let _ = event;
        let _ = cx;
        None
    }
}
