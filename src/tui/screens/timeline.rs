//! Timeline screen: the applied widget state for one open session.
//!
//! This is the thin adapter between the reconciler's declarative output
//! and ratatui. [`TimelineScreen::apply`] interprets mutations against the
//! current model (the reload mutation re-reads every row the way a
//! collection view re-queries its data source) and [`TimelineScreen::render`]
//! draws whatever was last applied. The deferred scroll effect is held
//! until the next draw, when the list geometry is known.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use crate::render::{RenderPass, SideEffect, ViewMutation};
use crate::timeline::{DriverView, PlaybackMode, TimelineModel};

/// One cause/effect row as last applied.
#[derive(Debug, Clone)]
struct Row {
    cause: String,
    effect: String,
    approved: bool,
    color: Color,
    background: Color,
}

pub struct TimelineScreen {
    name: String,
    drivers: Vec<DriverView>,
    rows: Vec<Row>,
    presented: String,
    playback: PlaybackMode,
    busy: bool,
    disconnected_banner: bool,
    save_visible: bool,
    selected: Option<usize>,
    editing: bool,

    // Viewport state, refreshed on every draw.
    offset: usize,
    viewport: usize,
    pending_scroll: Option<usize>,
}

impl TimelineScreen {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            drivers: Vec::new(),
            rows: Vec::new(),
            presented: String::new(),
            playback: PlaybackMode::default(),
            busy: false,
            disconnected_banner: false,
            save_visible: false,
            selected: None,
            editing: false,
            offset: 0,
            viewport: 0,
            pending_scroll: None,
        }
    }

    /// Indices of the rows currently on screen, oldest first. Feeds the
    /// reconciler's row-highlight rule.
    pub fn visible_rows(&self) -> Vec<usize> {
        (self.offset..(self.offset + self.viewport).min(self.rows.len())).collect()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn row_approved(&self, index: usize) -> bool {
        self.rows.get(index).is_some_and(|row| row.approved)
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
    }

    pub fn presented(&self) -> &str {
        &self.presented
    }

    /// Applies one render pass in order. `model` plays the data-source
    /// role: the reload mutation carries no rows of its own.
    pub fn apply(&mut self, model: &TimelineModel, pass: &RenderPass) {
        for mutation in &pass.mutations {
            match mutation {
                ViewMutation::ReplaceAllDriverViews(drivers) => {
                    self.drivers = drivers.clone();
                }
                ViewMutation::SetPlaybackModeIndicator(mode) => {
                    self.playback = *mode;
                }
                ViewMutation::SetPresentedStateText(text) => {
                    self.presented = text.clone();
                }
                ViewMutation::ReloadCauseEffectList => {
                    self.reload_rows(model);
                }
                ViewMutation::UpdateRowHighlight {
                    index,
                    is_selected,
                    background,
                } => {
                    if let Some(row) = self.rows.get_mut(*index) {
                        row.background = *background;
                    }
                    if *is_selected {
                        self.selected = Some(*index);
                    }
                }
                ViewMutation::SetConnectionIndicator {
                    busy,
                    disconnected_banner,
                } => {
                    self.busy = *busy;
                    self.disconnected_banner = *disconnected_banner;
                }
                ViewMutation::SetSaveControlVisibility(visible) => {
                    self.save_visible = *visible;
                }
            }
        }
        for effect in &pass.effects {
            match effect {
                // Held until the next draw; a newer pass overwrites an
                // unfired scroll.
                SideEffect::ScrollToIndexAnimated { index } => {
                    self.pending_scroll = Some(*index);
                }
            }
        }
    }

    /// Rebuilds every row from the model, the way a collection view
    /// re-queries its data source on reload.
    fn reload_rows(&mut self, model: &TimelineModel) {
        self.selected = model.selected.map(|s| s.index);
        self.rows = model
            .causes_effects
            .iter()
            .enumerate()
            .map(|(i, row)| Row {
                cause: row.cause.clone(),
                effect: row.effect.clone(),
                approved: row.approved,
                color: row.color,
                background: match model.selected {
                    Some(s) if s.index == i => s.color,
                    _ => Color::Reset,
                },
            })
            .collect();
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::vertical([
            Constraint::Length(1), // title + playback
            Constraint::Length(3), // driver strip
            Constraint::Min(3),    // timeline rows
            Constraint::Length(8), // presented state
            Constraint::Length(1), // status + help
        ])
        .split(area);

        self.render_title(frame, chunks[0]);
        self.render_drivers(frame, chunks[1]);
        self.render_rows(frame, chunks[2]);
        self.render_presented(frame, chunks[3]);
        self.render_status(frame, chunks[4]);
    }

    fn render_title(&self, frame: &mut Frame, area: Rect) {
        let muted = Style::default().fg(Color::DarkGray);
        let mut spans = vec![
            Span::styled(
                format!(" {} ", self.name),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" ", muted),
        ];
        for (mode, label) in [
            (PlaybackMode::Playing, "Play"),
            (PlaybackMode::PlayingAndSendingEffects, "Play On Device"),
            (PlaybackMode::Recording, "Record"),
        ] {
            let style = if self.playback == mode {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Gray)
                    .add_modifier(Modifier::BOLD)
            } else {
                muted
            };
            spans.push(Span::styled(format!(" {label} "), style));
            spans.push(Span::raw(" "));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_drivers(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::raw(" ")];
        for driver in &self.drivers {
            let text = match &driver.action {
                Some(action) => format!(" {} · {action} ", driver.label),
                None => format!(" {} ", driver.label),
            };
            spans.push(Span::styled(
                text,
                Style::default().fg(Color::Black).bg(driver.background),
            ));
            spans.push(Span::styled("▏", Style::default().fg(driver.side)));
            spans.push(Span::raw(" "));
        }
        let strip = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::BOTTOM).title(" drivers "));
        frame.render_widget(strip, area);
    }

    fn render_rows(&mut self, frame: &mut Frame, area: Rect) {
        self.viewport = area.height.saturating_sub(1) as usize;
        self.settle_scroll();

        let end = (self.offset + self.viewport).min(self.rows.len());
        let items: Vec<ListItem> = self.rows[self.offset..end]
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let index = self.offset + i;
                let marker = if row.approved { "✓" } else { " " };
                let pointer = if self.selected == Some(index) { "›" } else { " " };
                ListItem::new(Line::from(vec![
                    Span::raw(format!(" {pointer} ")),
                    Span::styled(format!("{marker} "), Style::default().fg(Color::Green)),
                    Span::styled(row.cause.clone(), Style::default().fg(row.color)),
                    Span::styled(" → ", Style::default().fg(Color::DarkGray)),
                    Span::raw(row.effect.clone()),
                ]))
                .style(Style::default().bg(row.background))
            })
            .collect();

        let list = List::new(items).block(Block::default().borders(Borders::BOTTOM).title(
            format!(" timeline {}/{} ", self.selected.map_or(0, |i| i + 1), self.rows.len()),
        ));
        frame.render_widget(list, area);
    }

    /// Applies a deferred scroll now that geometry is known, then keeps the
    /// selection inside the viewport.
    fn settle_scroll(&mut self) {
        let max_offset = self.rows.len().saturating_sub(self.viewport.max(1));
        self.offset = self.offset.min(max_offset);
        if let Some(index) = self.pending_scroll.take() {
            self.offset = index.saturating_sub(self.viewport / 2).min(max_offset);
        }
        if let Some(selected) = self.selected {
            if selected < self.offset {
                self.offset = selected;
            } else if self.viewport > 0 && selected >= self.offset + self.viewport {
                self.offset = (selected + 1 - self.viewport).min(max_offset);
            }
        }
    }

    fn render_presented(&self, frame: &mut Frame, area: Rect) {
        let title = if self.editing {
            " state · editing: ⏎ commit, esc discard "
        } else {
            " state "
        };
        let mut text = self.presented.clone();
        if self.editing {
            text.push('▏');
        }
        let style = if self.editing {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::Gray)
        };
        let paragraph = Paragraph::new(text)
            .style(style)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::BOTTOM).title(title));
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let muted = Style::default().fg(Color::DarkGray);
        let mut spans = Vec::new();
        if self.busy {
            spans.push(Span::styled(
                " ⟳ connecting… ",
                Style::default().fg(Color::Yellow),
            ));
        }
        if self.disconnected_banner {
            spans.push(Span::styled(
                " disconnected ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        }
        if self.save_visible {
            spans.push(Span::styled(
                " s save ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        spans.push(Span::styled(
            " ←→ scrub  space approve  1/2/3 mode  e edit  esc back  q quit",
            muted,
        ));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
