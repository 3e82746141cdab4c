//! Instrument catalogue with per-laboratory filter and status sync.

use crate::model::{InstrumentStatus, PortalData};
use crossterm::event::KeyCode;
use portal_nav::{Action, Component, Context, Entity, Event, EventContext};
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, Cell, Paragraph, Row, Table, TableState},
};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct SyncState {
    pub syncing: bool,
    pub synced: u32,
}

pub struct EquipmentPage {
    state: TableState,
    /// `None` shows every laboratory.
    lab_filter: Option<u32>,
    data: Entity<PortalData>,
    sync: Entity<SyncState>,
}

impl EquipmentPage {
    pub fn new(data: Entity<PortalData>, sync: Entity<SyncState>) -> Self {
        Self {
            state: TableState::default().with_selected(Some(0)),
            lab_filter: None,
            data,
            sync,
        }
    }

    /// Codes of the instruments currently listed.
    fn visible(&self) -> Vec<String> {
        self.data
            .read(|d| {
                d.instruments
                    .iter()
                    .filter(|i| self.lab_filter.map_or(true, |lab| i.lab_id == lab))
                    .map(|i| i.code.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn selected_code(&self) -> Option<String> {
        let index = self.state.selected()?;
        self.visible().into_iter().nth(index)
    }

    fn next_filter(&mut self) {
        let labs: Vec<u32> = self
            .data
            .read(|d| d.laboratories.iter().map(|l| l.id).collect())
            .unwrap_or_default();
        self.lab_filter = match self.lab_filter {
            None => labs.first().copied(),
            Some(current) => labs
                .iter()
                .position(|&id| id == current)
                .and_then(|p| labs.get(p + 1).copied()),
        };
        self.state.select(Some(0));
    }

    fn toggle_maintenance(&self) {
        let Some(code) = self.selected_code() else {
            return;
        };
        let _ = self.data.update(|d| {
            if let Some(instrument) = d.instruments.iter_mut().find(|i| i.code == code) {
                instrument.status = match instrument.status {
                    InstrumentStatus::Maintenance => InstrumentStatus::Available,
                    _ => InstrumentStatus::Maintenance,
                };
                tracing::info!(code = %instrument.code, status = instrument.status.label(), "instrument status changed");
            }
        });
    }

    fn start_sync(&self, cx: &EventContext) {
        if self.sync.read(|s| s.syncing).unwrap_or(true) {
            return;
        }
        let _ = self.sync.update(|s| s.syncing = true);

        let sync = self.sync.clone();
        let data = self.data.clone();
        cx.app.spawn(move |app| async move {
            tokio::time::sleep(Duration::from_millis(600)).await;
            // Finished sessions free their instruments.
            let _ = data.update(|d| {
                for instrument in &mut d.instruments {
                    if instrument.status == InstrumentStatus::InUse {
                        instrument.status = InstrumentStatus::Available;
                    }
                }
            });
            let _ = sync.update(|s| {
                s.syncing = false;
                s.synced += 1;
            });
            app.refresh();
        });
    }
}

impl Component for EquipmentPage {
    fn on_mount(&mut self, cx: &mut Context) {
        cx.app.subscribe(&self.data);
        cx.app.subscribe(&self.sync);
    }

    fn on_enter(&mut self, _cx: &mut Context) {
        self.state.select(Some(0));
    }

    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context) {
        let [body, status] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(cx.area);

        let filter = self.lab_filter;
        let (rows, scope): (Vec<Row>, String) = self
            .data
            .read(|d| {
                let rows = d
                    .instruments
                    .iter()
                    .filter(|i| filter.map_or(true, |lab| i.lab_id == lab))
                    .map(|i| {
                        let lab = d.laboratory(i.lab_id).map(|l| l.name.clone()).unwrap_or_default();
                        Row::new(vec![
                            Cell::from(i.code.clone()),
                            Cell::from(i.name.clone()),
                            Cell::from(lab),
                            Cell::from(i.status.label()).style(Style::default().fg(i.status.color())),
                            Cell::from(format!("¥{}/h", i.hourly_rate)),
                        ])
                    })
                    .collect();
                let scope = filter
                    .and_then(|id| d.laboratory(id))
                    .map(|l| l.name.clone())
                    .unwrap_or_else(|| "全部实验室".to_string());
                (rows, scope)
            })
            .unwrap_or_default();

        let table = Table::new(
            rows,
            [
                Constraint::Length(10),
                Constraint::Min(20),
                Constraint::Length(16),
                Constraint::Length(8),
                Constraint::Length(8),
            ],
        )
        .header(
            Row::new(vec!["编号", "仪器名称", "所属实验室", "状态", "收费"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .block(
            Block::bordered()
                .title(format!(" 仪器列表 · {scope} "))
                .border_type(BorderType::Rounded),
        );
        frame.render_stateful_widget(table, body, &mut self.state);

        let sync = self.sync.read(|s| s.clone()).unwrap_or_default();
        let text = if sync.syncing {
            "同步中…".to_string()
        } else {
            format!("f 切换实验室 │ m 维护 │ r 同步状态 (已同步 {} 次)", sync.synced)
        };
        frame.render_widget(
            Paragraph::new(Line::styled(text, Style::default().fg(Color::DarkGray))),
            status,
        );
    }

    fn handle_event(&mut self, event: Event, cx: &mut EventContext) -> Option<Action> {
        let Event::Key(key) = event else {
            return None;
        };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.select_previous();
                Some(Action::Noop)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let last = self.visible().len().saturating_sub(1);
                let next = self.state.selected().map(|i| (i + 1).min(last)).unwrap_or(0);
                self.state.select(Some(next));
                Some(Action::Noop)
            }
            KeyCode::Char('f') => {
                self.next_filter();
                Some(Action::Noop)
            }
            KeyCode::Char('m') => {
                self.toggle_maintenance();
                Some(Action::Noop)
            }
            KeyCode::Char('r') => {
                self.start_sync(cx);
                Some(Action::Noop)
            }
            _ => None,
        }
    }
}
