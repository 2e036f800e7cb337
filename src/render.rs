//! The render reconciler: diffs two timeline models into view mutations.
//!
//! [`reconcile`] is pure and total: it never touches a widget, never
//! sleeps, and never mutates its inputs. The widget layer applies the
//! returned mutations in order and schedules the side effects with its own
//! primitives. Each rule below is an independent check; their results are
//! concatenated.

use ratatui::style::Color;

use crate::timeline::{Connection, DriverView, PlaybackMode, TimelineModel};

/// One observable UI change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMutation {
    /// Tear down and rebuild the driver strip. Whole-list rebuild is the
    /// policy; individual drivers are never diffed.
    ReplaceAllDriverViews(Vec<DriverView>),

    /// Move the playback selector. Idempotent; emitted on every pass.
    SetPlaybackModeIndicator(PlaybackMode),

    /// Overwrite the presented-state text. Gated on inequality: an
    /// unconditional overwrite would clobber an in-progress operator edit.
    SetPresentedStateText(String),

    /// Reload the cause/effect list from the current model, the way a
    /// collection view re-queries its data source. Whole-list reload is the
    /// policy; rows are never diffed individually.
    ReloadCauseEffectList,

    /// Repaint one currently-visible row's selection highlight.
    UpdateRowHighlight {
        index: usize,
        is_selected: bool,
        background: Color,
    },

    /// Drive the connection widgets: a busy indicator and a
    /// "disconnected" banner.
    SetConnectionIndicator {
        busy: bool,
        disconnected_banner: bool,
    },

    /// Show or hide the save control. Emitted on every pass; the widget
    /// layer applies it inside its animated-transition primitive.
    SetSaveControlVisibility(bool),
}

/// A non-mutation action tied to a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    /// Center the timeline on `index`, animated, once the next layout pass
    /// has settled. Scrolling synchronously would race the list reload, so
    /// the widget layer must defer this with its own scheduling primitive.
    ScrollToIndexAnimated { index: usize },
}

/// Everything one reconciliation produced, in application order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderPass {
    pub mutations: Vec<ViewMutation>,
    pub effects: Vec<SideEffect>,
}

/// Row background when a row is not the selection.
const UNSELECTED_ROW: Color = Color::Reset;

/// Computes the minimal set of mutations and side effects that bring a view
/// showing `old` up to date with `new`.
///
/// `visible` is the set of row indices currently on screen, supplied by the
/// widget layer; the reconciler does not itself know what is visible.
/// `force_full` is true exactly once per screen lifetime (the bootstrap
/// render) and forces every gated rule, so the view starts fully populated
/// instead of relying on a diff against a default model.
pub fn reconcile(
    old: &TimelineModel,
    new: &TimelineModel,
    force_full: bool,
    visible: &[usize],
) -> RenderPass {
    let mut mutations = Vec::new();
    let mut effects = Vec::new();

    if force_full || old.drivers != new.drivers {
        mutations.push(ViewMutation::ReplaceAllDriverViews(new.drivers.clone()));
    }

    mutations.push(ViewMutation::SetPlaybackModeIndicator(new.playback));

    if force_full || new.presented_state != old.presented_state {
        mutations.push(ViewMutation::SetPresentedStateText(
            new.presented_state.clone(),
        ));
    }

    if force_full || new.causes_effects != old.causes_effects {
        mutations.push(ViewMutation::ReloadCauseEffectList);
    }

    if let Some(selected) = new.selected {
        if force_full || old.selected != Some(selected) {
            for &index in visible {
                let is_selected = index == selected.index;
                mutations.push(ViewMutation::UpdateRowHighlight {
                    index,
                    is_selected,
                    background: if is_selected {
                        selected.color
                    } else {
                        UNSELECTED_ROW
                    },
                });
            }
        }
    }

    if new.playback == PlaybackMode::Recording
        && new.causes_effects != old.causes_effects
        && !new.causes_effects.is_empty()
    {
        if let Some(selected) = new.selected {
            effects.push(SideEffect::ScrollToIndexAnimated {
                index: selected.index,
            });
        }
    }

    if force_full || new.connection != old.connection {
        let indicator = match new.connection {
            Connection::Connecting => Some((true, false)),
            Connection::Connected => Some((false, false)),
            Connection::Disconnected => Some((false, true)),
            Connection::Idle => None,
        };
        if let Some((busy, disconnected_banner)) = indicator {
            mutations.push(ViewMutation::SetConnectionIndicator {
                busy,
                disconnected_banner,
            });
        }
    }

    mutations.push(ViewMutation::SetSaveControlVisibility(
        new.is_displaying_save,
    ));

    RenderPass { mutations, effects }
}
