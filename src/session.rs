//! Session orchestration: folds operator intents into the next timeline.
//!
//! A [`Session`] owns one recorded history and the operator's review state.
//! Each applied action produces a fresh [`TimelineModel`] through
//! [`Session::timeline`]; the caller keeps the previous model only as the
//! `old` operand for reconciliation. Delivery is strictly sequential (one
//! action is folded and rendered before the next is accepted), which the
//! single-threaded app loop enforces by construction.

use jiff::Timestamp;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Driver, Event};
use crate::timeline::{
    Action, CauseEffectView, Connection, DriverView, PlaybackMode, Selection, TimelineModel,
};

/// Session metadata, serialized as `session.json`.
///
/// Approval flags live here rather than on the events: the wire event has
/// no approval field, and review state belongs to the operator, not to the
/// recorded history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMeta {
    pub id: Uuid,
    pub name: String,
    pub created_at: Timestamp,

    /// Per-event approval, index-aligned with the event log.
    pub approved: Vec<bool>,
}

impl SessionMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Timestamp::now(),
            approved: Vec::new(),
        }
    }
}

/// One open session: the event log plus the operator's position in it.
#[derive(Debug, Clone)]
pub struct Session {
    meta: SessionMeta,
    events: Vec<Event>,
    approved: Vec<bool>,
    cursor: Option<usize>,
    playback: PlaybackMode,
    connection: Connection,
    draft: Option<String>,
    dirty: bool,
}

impl Session {
    /// Opens a session over a loaded event log. The cursor starts on the
    /// most recent event; stale approval flags are discarded if the log
    /// length no longer matches.
    pub fn new(meta: SessionMeta, events: Vec<Event>) -> Self {
        let approved = if meta.approved.len() == events.len() {
            meta.approved.clone()
        } else {
            vec![false; events.len()]
        };
        let cursor = events.len().checked_sub(1);
        Self {
            meta,
            events,
            approved,
            cursor,
            playback: PlaybackMode::default(),
            // Replaying from disk involves no transport at all.
            connection: Connection::Idle,
            draft: None,
            dirty: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.meta.id
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Metadata with the current approval flags, ready to persist.
    pub fn meta(&self) -> SessionMeta {
        SessionMeta {
            approved: self.approved.clone(),
            ..self.meta.clone()
        }
    }

    /// Appends one recorded event. While in `Recording` the cursor follows
    /// the newest event; otherwise the operator's position is left alone.
    ///
    /// An arriving event proves the feed, so the connection flips to
    /// `Connected`.
    // TODO: call from the app loop once the live device feed is wired up.
    #[allow(dead_code)]
    pub fn record(&mut self, event: Event) {
        self.events.push(event);
        self.approved.push(false);
        if self.playback == PlaybackMode::Recording || self.cursor.is_none() {
            self.cursor = Some(self.events.len() - 1);
        }
        self.connection = Connection::Connected;
        self.dirty = true;
    }

    /// Folds one operator intent into the session.
    pub fn apply(&mut self, action: &Action) {
        match action {
            Action::None => {}
            Action::ScrolledToIndex(index) => {
                if let Some(last) = self.events.len().checked_sub(1) {
                    self.cursor = Some((*index).min(last));
                    self.draft = None;
                }
            }
            Action::ToggledApproval { index, is_approved } => {
                if let Some(flag) = self.approved.get_mut(*index) {
                    *flag = *is_approved;
                    self.dirty = true;
                }
            }
            Action::PlaybackModeSelected(mode) => {
                self.playback = *mode;
                // Recording needs the live transport: surface the dial-out
                // state until a feed attaches, and drop it when the
                // operator backs out before one does.
                match (*mode, self.connection) {
                    (PlaybackMode::Recording, Connection::Idle) => {
                        self.connection = Connection::Connecting;
                    }
                    (
                        PlaybackMode::Playing | PlaybackMode::PlayingAndSendingEffects,
                        Connection::Connecting,
                    ) => {
                        self.connection = Connection::Idle;
                    }
                    _ => {}
                }
            }
            Action::PendingStateEditDrafted(text) => {
                if self.cursor.is_some() {
                    self.draft = Some(text.clone());
                }
            }
            Action::PendingStateEditCommitted(text) => {
                if let Some(index) = self.cursor {
                    let edit = if text.is_empty() {
                        None
                    } else {
                        Some(text.clone())
                    };
                    self.events[index] = Event {
                        pending_effect_edit: edit,
                        ..self.events[index].clone()
                    };
                    self.draft = None;
                    self.dirty = true;
                }
            }
        }
    }

    /// Transport hook: the owner of the live feed reports connection
    /// changes here.
    // TODO: call from the app loop once the live device feed is wired up.
    #[allow(dead_code)]
    pub fn set_connection(&mut self, connection: Connection) {
        self.connection = connection;
    }

    /// Clears the dirty flag after the log and metadata were persisted.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// The pure projection to the view model.
    ///
    /// Driver actions are normalized to `Option` here: this is the
    /// boundary where the wire's empty-string sentinel stops existing.
    /// `selected.index` always points into `causes_effects`.
    pub fn timeline(&self) -> TimelineModel {
        let drivers = match self.cursor {
            Some(index) => self.events[index].drivers.iter().map(driver_view).collect(),
            None => Vec::new(),
        };

        let causes_effects = self
            .events
            .iter()
            .zip(&self.approved)
            .map(|(event, &approved)| CauseEffectView {
                cause: event.cause.label.clone(),
                effect: event.effect.clone(),
                approved,
                color: palette_color(&event.cause.label),
            })
            .collect();

        let presented_state = match self.cursor {
            Some(index) => self
                .draft
                .clone()
                .or_else(|| self.events[index].pending_effect_edit.clone())
                .unwrap_or_else(|| self.events[index].context.clone()),
            None => String::new(),
        };

        TimelineModel {
            drivers,
            causes_effects,
            presented_state,
            selected: self.cursor.map(|index| Selection {
                color: SELECTION_COLOR,
                index,
            }),
            connection: self.connection,
            playback: self.playback,
            is_displaying_save: self.dirty,
        }
    }
}

/// Highlight for the selected row.
const SELECTION_COLOR: Color = Color::White;

const DRIVER_PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Green,
    Color::Blue,
    Color::Red,
];

/// A stable color per driver label, so the same driver reads the same
/// across the strip and the timeline.
fn palette_color(label: &str) -> Color {
    let sum: usize = label.bytes().map(usize::from).sum();
    DRIVER_PALETTE[sum % DRIVER_PALETTE.len()]
}

fn driver_view(driver: &Driver) -> DriverView {
    DriverView {
        label: driver.label.clone(),
        action: driver.triggered_action().map(str::to_owned),
        background: palette_color(&driver.label),
        side: Color::DarkGray,
    }
}
