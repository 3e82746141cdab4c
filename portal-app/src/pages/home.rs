use crate::model::PortalData;
use crossterm::event::KeyCode;
use portal_nav::{Action, Component, Context, Entity, Event, EventContext};
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, List, ListItem, Paragraph},
};

/// (label, description, route name)
const SECTIONS: [(&str, &str, &str); 3] = [
    ("实验室管理", "共享实验室与负责人", "LaboratoryList"),
    ("设备管理", "大型仪器状态与机时收费", "Equipment"),
    ("预约管理", "机时预约审核", "Reservations"),
];

pub struct HomePage {
    selected: usize,
    data: Entity<PortalData>,
}

impl HomePage {
    pub fn new(data: Entity<PortalData>) -> Self {
        Self { selected: 0, data }
    }
}

impl Component for HomePage {
    fn on_mount(&mut self, cx: &mut Context) {
        cx.app.subscribe(&self.data);
    }

    fn render(&mut self, frame: &mut ratatui::Frame, cx: &mut Context) {
        let (labs, instruments, pending) = self
            .data
            .read(|d| (d.laboratories.len(), d.instruments.len(), d.pending_reservations()))
            .unwrap_or_default();

        let chunks = Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
            .margin(1)
            .split(cx.area);

        let items: Vec<ListItem> = SECTIONS
            .iter()
            .enumerate()
            .map(|(i, (label, desc, _))| {
                let is_selected = i == self.selected;
                let prefix = if is_selected { "▶ " } else { "  " };
                let style = if is_selected {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(vec![
                    Line::from(vec![Span::styled(prefix, style), Span::styled(*label, style)]),
                    Line::from(Span::styled(
                        format!("    {desc}"),
                        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                    )),
                ])
            })
            .collect();

        let list = List::new(items).block(
            Block::bordered()
                .title(" 功能导航 ")
                .border_type(BorderType::Rounded),
        );
        frame.render_widget(list, chunks[0]);

        let summary = Paragraph::new(vec![
            Line::from(""),
            Line::from(format!(" 共享实验室: {labs}")),
            Line::from(format!(" 在册仪器:   {instruments}")),
            Line::from(vec![
                Span::raw(" 待审核预约: "),
                Span::styled(pending.to_string(), Style::default().fg(Color::Yellow)),
            ]),
            Line::from(""),
            Line::styled(" ↑/↓ 选择  Enter 进入", Style::default().fg(Color::DarkGray)),
        ])
        .block(
            Block::bordered()
                .title(" 平台概况 ")
                .border_type(BorderType::Rounded),
        );
        frame.render_widget(summary, chunks[1]);
    }

    fn handle_event(&mut self, event: Event, _cx: &mut EventContext) -> Option<Action> {
        match event {
            Event::Key(key) => match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.selected = self.selected.checked_sub(1).unwrap_or(SECTIONS.len() - 1);
                    Some(Action::Noop)
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.selected = (self.selected + 1) % SECTIONS.len();
                    Some(Action::Noop)
                }
                KeyCode::Enter => {
                    let (_, _, route) = SECTIONS[self.selected];
                    Some(Action::NavigateNamed(route.to_string()))
                }
                _ => None,
            },
            _ => None,
        }
    }
}
