//! The view-facing projection of a session, and the intents it emits.
//!
//! [`TimelineModel`] is what the screen renders: one value per update,
//! never mutated in place. The previous value is retained only long enough
//! to diff against the next one. Equality is fully structural, including
//! both fields of `selected`.

use ratatui::style::Color;

/// A driver as displayed in the driver strip.
///
/// The wire-level empty-string action has already been normalized to an
/// `Option` by the time it gets here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverView {
    pub label: String,
    pub action: Option<String>,
    pub background: Color,
    pub side: Color,
}

/// One cause/effect row with the operator's approval flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CauseEffectView {
    pub cause: String,
    pub effect: String,
    pub approved: bool,
    pub color: Color,
}

/// The highlighted row. `index` is always a valid index into
/// `causes_effects`, guaranteed by the producing projection and relied on by
/// the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub color: Color,
    pub index: usize,
}

/// Connection to the observed application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Connection {
    Idle,
    Connecting,
    Connected,
    #[default]
    Disconnected,
}

/// How the session treats incoming events and outgoing effects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaybackMode {
    #[default]
    Playing,
    PlayingAndSendingEffects,
    Recording,
}

/// Everything the timeline screen shows for one session state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineModel {
    pub drivers: Vec<DriverView>,
    pub causes_effects: Vec<CauseEffectView>,
    pub presented_state: String,
    pub selected: Option<Selection>,
    pub connection: Connection,
    pub playback: PlaybackMode,
    pub is_displaying_save: bool,
}

/// An operator intent, emitted outward on the action stream.
///
/// Ephemeral: actions are folded into the next session state and never
/// stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    ScrolledToIndex(usize),
    ToggledApproval { index: usize, is_approved: bool },
    PlaybackModeSelected(PlaybackMode),
    PendingStateEditCommitted(String),
    PendingStateEditDrafted(String),
}
