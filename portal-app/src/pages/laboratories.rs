use crate::model::PortalData;
use crossterm::event::KeyCode;
use portal_nav::{Action, Component, Context, Entity, Event, EventContext};
use ratatui::{
    layout::Constraint,
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType, Row, Table, TableState},
};

pub struct LaboratoryList {
    state: TableState,
    data: Entity<PortalData>,
}

impl LaboratoryList {
    pub fn new(data: Entity<PortalData>) -> Self {
        Self {
            state: TableState::default().with_selected(Some(0)),
            data,
        }
    }

    fn len(&self) -> usize {
        self.data.read(|d| d.laboratories.len()).unwrap_or(0)
    }
}

impl Component for LaboratoryList {
    fn on_mount(&mut self, cx: &mut Context) {
        cx.app.subscribe(&self.data);
    }

    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context) {
        let rows: Vec<Row> = self
            .data
            .read(|d| {
                d.laboratories
                    .iter()
                    .map(|lab| {
                        Row::new(vec![
                            lab.id.to_string(),
                            lab.name.clone(),
                            lab.building.clone(),
                            lab.manager.clone(),
                            d.instruments_in(lab.id).count().to_string(),
                        ])
                    })
                    .collect()
            })
            .unwrap_or_default();

        let table = Table::new(
            rows,
            [
                Constraint::Length(4),
                Constraint::Min(16),
                Constraint::Length(14),
                Constraint::Length(8),
                Constraint::Length(6),
            ],
        )
        .header(
            Row::new(vec!["编号", "实验室", "位置", "负责人", "仪器"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .row_highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        .block(
            Block::bordered()
                .title(" 共享实验室 ")
                .border_type(BorderType::Rounded),
        );

        frame.render_stateful_widget(table, cx.area, &mut self.state);
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
                let last = self.len().saturating_sub(1);
                let next = self.state.selected().map(|i| (i + 1).min(last)).unwrap_or(0);
                self.state.select(Some(next));
                Some(Action::Noop)
            }
            KeyCode::Enter => Some(Action::Navigate("/equipment".to_string())),
            _ => None,
        }
    }
}
