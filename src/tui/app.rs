//! Application loop and screen routing.
//!
//! Every keystroke on the timeline becomes an [`Action`] on the session's
//! [`ActionStream`]; the loop then drains the stream and folds one action
//! at a time (fold, project, reconcile, apply) before reading the next
//! input. Delivery is strictly sequential, so no locking is needed
//! anywhere.

use std::io;

use crossterm::event::{self, Event as InputEvent, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use tokio::sync::broadcast;

use crate::actions::ActionStream;
use crate::render;
use crate::session::Session;
use crate::storage::Storage;
use crate::timeline::{Action, PlaybackMode, TimelineModel};

use super::screens::{HomeScreen, TimelineScreen};

/// Which screen is currently displayed.
enum Screen {
    Home(HomeScreen),
    Timeline(Box<TimelineView>),
}

/// Runs the TUI event loop until the user quits.
pub fn run(storage: &Storage) -> io::Result<()> {
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, storage);
    ratatui::restore();
    result
}

fn event_loop(terminal: &mut DefaultTerminal, storage: &Storage) -> io::Result<()> {
    let mut screen = Screen::Home(load_home_screen(storage)?);

    loop {
        terminal.draw(|frame| match &mut screen {
            Screen::Home(s) => s.render(frame),
            Screen::Timeline(view) => view.screen.render(frame),
        })?;

        if let InputEvent::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match &mut screen {
                Screen::Home(home) => match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Up | KeyCode::Char('k') => home.move_up(),
                    KeyCode::Down | KeyCode::Char('j') => home.move_down(),
                    KeyCode::Enter => {
                        if let Some(id) = home.select() {
                            let meta = storage.load_session(id).map_err(io::Error::other)?;
                            let events = storage.load_events(id).map_err(io::Error::other)?;
                            tracing::info!(%id, events = events.len(), "opened session");
                            screen = Screen::Timeline(Box::new(TimelineView::open(
                                Session::new(meta, events),
                            )));
                        }
                    }
                    _ => {}
                },
                Screen::Timeline(view) if view.screen.is_editing() => match key.code {
                    KeyCode::Esc => {
                        view.screen.set_editing(false);
                        // Re-scrubbing to the same index drops the draft.
                        if let Some(index) = view.screen.selected() {
                            view.stream.emit(Action::ScrolledToIndex(index));
                        }
                    }
                    KeyCode::Enter => {
                        view.stream.emit(Action::PendingStateEditCommitted(
                            view.screen.presented().to_owned(),
                        ));
                        view.screen.set_editing(false);
                    }
                    KeyCode::Backspace => {
                        let mut text = view.screen.presented().to_owned();
                        text.pop();
                        view.stream.emit(Action::PendingStateEditDrafted(text));
                    }
                    KeyCode::Char(c) => {
                        let mut text = view.screen.presented().to_owned();
                        text.push(c);
                        view.stream.emit(Action::PendingStateEditDrafted(text));
                    }
                    _ => {}
                },
                Screen::Timeline(view) => match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Esc => {
                        screen = Screen::Home(load_home_screen(storage)?);
                    }
                    KeyCode::Left | KeyCode::Char('h') => {
                        if let Some(index) = view.screen.selected() {
                            view.stream
                                .emit(Action::ScrolledToIndex(index.saturating_sub(1)));
                        }
                    }
                    KeyCode::Right | KeyCode::Char('l') => {
                        if let Some(index) = view.screen.selected() {
                            // The fold clamps to the event range.
                            view.stream.emit(Action::ScrolledToIndex(index + 1));
                        }
                    }
                    KeyCode::Char(' ') => {
                        if let Some(index) = view.screen.selected() {
                            view.stream.emit(Action::ToggledApproval {
                                index,
                                is_approved: !view.screen.row_approved(index),
                            });
                        }
                    }
                    KeyCode::Char('1') => {
                        view.stream
                            .emit(Action::PlaybackModeSelected(PlaybackMode::Playing));
                    }
                    KeyCode::Char('2') => {
                        view.stream.emit(Action::PlaybackModeSelected(
                            PlaybackMode::PlayingAndSendingEffects,
                        ));
                    }
                    KeyCode::Char('3') => {
                        view.stream
                            .emit(Action::PlaybackModeSelected(PlaybackMode::Recording));
                    }
                    KeyCode::Char('e') => {
                        if view.screen.selected().is_some() {
                            view.screen.set_editing(true);
                        }
                    }
                    KeyCode::Char('s') => {
                        if view.session.is_dirty() {
                            storage
                                .save_events(view.session.id(), view.session.events())
                                .map_err(io::Error::other)?;
                            storage
                                .update_session(&view.session.meta())
                                .map_err(io::Error::other)?;
                            view.session.mark_saved();
                            view.sync(false);
                            tracing::info!(id = %view.session.id(), "session saved");
                        }
                    }
                    _ => {}
                },
            }
        }

        // Fold whatever the keystroke emitted before the next draw.
        if let Screen::Timeline(view) = &mut screen {
            view.pump();
        }
    }
}

fn load_home_screen(storage: &Storage) -> io::Result<HomeScreen> {
    let sessions = storage.list_sessions().map_err(io::Error::other)?;
    let mut items = Vec::with_capacity(sessions.len());
    for meta in sessions {
        let events = storage.load_events(meta.id).map_err(io::Error::other)?;
        items.push((meta, events.len()));
    }
    Ok(HomeScreen::new(items))
}

/// One open session: the fold state, the applied widget state, and the
/// stream wiring between them.
struct TimelineView {
    session: Session,
    screen: TimelineScreen,
    model: TimelineModel,
    stream: ActionStream,
    feed: broadcast::Receiver<Action>,
}

impl TimelineView {
    /// Opens a session and runs the one forced bootstrap render.
    fn open(session: Session) -> Self {
        let stream = ActionStream::default();
        let (_seed, feed) = stream.subscribe();
        let mut view = Self {
            screen: TimelineScreen::new(session.name()),
            session,
            model: TimelineModel::default(),
            stream,
            feed,
        };
        view.sync(true);
        view
    }

    /// Drains the intent feed, strictly one action at a time.
    fn pump(&mut self) {
        loop {
            match self.feed.try_recv() {
                Ok(action) => {
                    self.session.apply(&action);
                    self.sync(false);
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "action feed lagged");
                }
                Err(_) => break,
            }
        }
    }

    /// One full update: project, reconcile against the previous model,
    /// apply. `force_full` is true only for the bootstrap render.
    fn sync(&mut self, force_full: bool) {
        let new = self.session.timeline();
        let visible = self.screen.visible_rows();
        let pass = render::reconcile(&self.model, &new, force_full, &visible);
        self.screen.apply(&new, &pass);
        self.model = new;
    }
}
