use crate::model::{PortalData, ReservationStatus};
use crossterm::event::KeyCode;
use portal_nav::{Action, Component, Context, Entity, Event, EventContext};
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, List, ListItem, ListState, Paragraph},
};

/// Reservation review queue.
pub struct ReservationsPage {
    state: ListState,
    data: Entity<PortalData>,
}

impl ReservationsPage {
    pub fn new(data: Entity<PortalData>) -> Self {
        Self {
            state: ListState::default().with_selected(Some(0)),
            data,
        }
    }

    fn selected_id(&self) -> Option<u32> {
        let index = self.state.selected()?;
        self.data
            .read(|d| d.reservations.get(index).map(|r| r.id))
            .ok()
            .flatten()
    }

    fn review(&self, status: ReservationStatus) {
        let Some(id) = self.selected_id() else {
            return;
        };
        match self.data.update(|d| d.set_reservation_status(id, status)) {
            Ok(true) => tracing::info!(id, status = status.label(), "reservation reviewed"),
            Ok(false) => tracing::debug!(id, "reservation is final, review ignored"),
            Err(e) => tracing::warn!(id, error = %e, "failed to update reservation"),
        }
    }
}

fn status_style(status: ReservationStatus) -> Style {
    match status {
        ReservationStatus::Pending => Style::default().fg(Color::Yellow),
        ReservationStatus::Approved => Style::default().fg(Color::Green),
        ReservationStatus::Cancelled => Style::default().fg(Color::DarkGray),
    }
}

impl Component for ReservationsPage {
    fn on_mount(&mut self, cx: &mut Context) {
        cx.app.subscribe(&self.data);
    }

    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context) {
        let [body, hint] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(cx.area);

        let items: Vec<ListItem> = self
            .data
            .read(|d| {
                d.reservations
                    .iter()
                    .map(|r| {
                        let instrument = d
                            .instrument(&r.instrument_code)
                            .map(|i| i.name.clone())
                            .unwrap_or_else(|| r.instrument_code.clone());
                        ListItem::new(Line::from(vec![
                            Span::raw(format!("#{:<3} ", r.id)),
                            Span::styled(format!("{:<6} ", r.status.label()), status_style(r.status)),
                            Span::raw(format!("{}  {}  ", r.slot, r.applicant)),
                            Span::styled(instrument, Style::default().add_modifier(Modifier::BOLD)),
                        ]))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let list = List::new(items)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("▶ ")
            .block(
                Block::bordered()
                    .title(" 机时预约 ")
                    .border_type(BorderType::Rounded),
            );
        frame.render_stateful_widget(list, body, &mut self.state);

        frame.render_widget(
            Paragraph::new(Line::styled(
                "a 批准 │ x 取消 │ e 查看仪器",
                Style::default().fg(Color::DarkGray),
            )),
            hint,
        );
    }

    fn handle_event(&mut self, event: Event, _cx: &mut EventContext) -> Option<Action> {
        let Event::Key(key) = event else {
            return None;
        };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.select_previous();
                Some(Action::Noop)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.data.read(|d| d.reservations.len()).unwrap_or(0);
                let next = self
                    .state
                    .selected()
                    .map(|i| (i + 1).min(len.saturating_sub(1)))
                    .unwrap_or(0);
                self.state.select(Some(next));
                Some(Action::Noop)
            }
            KeyCode::Char('a') => {
                self.review(ReservationStatus::Approved);
                Some(Action::Noop)
            }
            KeyCode::Char('x') => {
                self.review(ReservationStatus::Cancelled);
                Some(Action::Noop)
            }
            KeyCode::Char('e') => Some(Action::Navigate("/equipment".to_string())),
            _ => None,
        }
    }
}
