//! Home screen: pick a recorded session to replay.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, List, ListItem, Padding, Paragraph};
use uuid::Uuid;

use crate::session::SessionMeta;

pub struct HomeScreen {
    /// Each session with its event count.
    items: Vec<(SessionMeta, usize)>,
    selected: usize,
}

impl HomeScreen {
    pub fn new(items: Vec<(SessionMeta, usize)>) -> Self {
        Self { items, selected: 0 }
    }

    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.items.len() {
            self.selected += 1;
        }
    }

    pub fn select(&self) -> Option<Uuid> {
        self.items.get(self.selected).map(|(meta, _)| meta.id)
    }

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::vertical([
            Constraint::Length(3), // title
            Constraint::Min(0),    // list
            Constraint::Length(1), // help
        ])
        .split(area);

        // Title.
        let title = Paragraph::new(Line::from(vec![Span::styled(
            "Wake",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )]))
        .block(Block::default().padding(Padding::new(2, 0, 1, 0)));
        frame.render_widget(title, chunks[0]);

        let muted = Style::default().fg(Color::DarkGray);
        let normal = Style::default().fg(Color::Gray);
        let highlight = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        if self.items.is_empty() {
            let empty = Paragraph::new(Line::from(Span::styled(
                "No sessions yet. Import one with `wake import <file>`.",
                muted,
            )))
            .block(Block::default().padding(Padding::new(2, 2, 0, 0)));
            frame.render_widget(empty, chunks[1]);
        } else {
            let list_items: Vec<ListItem> = self
                .items
                .iter()
                .enumerate()
                .map(|(i, (meta, events))| {
                    let style = if i == self.selected { highlight } else { normal };
                    let pointer = if i == self.selected { "› " } else { "  " };
                    ListItem::new(Line::from(vec![
                        Span::styled(pointer, style),
                        Span::styled(meta.name.clone(), style),
                        Span::styled(format!("  [{events} events]"), muted),
                    ]))
                })
                .collect();

            let list =
                List::new(list_items).block(Block::default().padding(Padding::new(2, 2, 0, 0)));
            frame.render_widget(list, chunks[1]);
        }

        // Help line.
        let help = Paragraph::new(Line::from(vec![Span::styled(
            " ↑↓ navigate  ⏎ open  q quit",
            muted,
        )]));
        frame.render_widget(help, chunks[2]);
    }
}
