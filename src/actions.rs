//! Outbound channel of operator intents.
//!
//! [`ActionStream`] is the seam between the widget layer and whatever
//! orchestrates the session: widgets publish [`Action`]s, any number of
//! subscribers consume every one of them in order. The stream is seeded:
//! a fresh subscriber always observes a current value, initially
//! [`Action::None`]. It never closes while the session lives.

use tokio::sync::{broadcast, watch};

use crate::timeline::Action;

/// Default buffer for the broadcast channel. Intents are keystrokes, not
/// bulk data; a slow consumer that lags this far behind has already lost
/// the session.
const DEFAULT_CAPACITY: usize = 64;

/// Multi-subscriber stream of operator intents.
pub struct ActionStream {
    sender: broadcast::Sender<Action>,
    latest: watch::Sender<Action>,
}

impl ActionStream {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        let (latest, _) = watch::channel(Action::None);
        Self { sender, latest }
    }

    /// Publishes an intent to all current subscribers.
    ///
    /// Zero subscribers is not an error; the value still becomes the seed
    /// observed by the next subscriber.
    pub fn emit(&self, action: Action) {
        self.latest.send_replace(action.clone());
        // SendError only means there are no receivers right now.
        let _ = self.sender.send(action);
    }

    /// Subscribes to the stream: the current seed value plus a live feed of
    /// everything emitted from this point on.
    pub fn subscribe(&self) -> (Action, broadcast::Receiver<Action>) {
        (self.latest.borrow().clone(), self.sender.subscribe())
    }
}

impl Default for ActionStream {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
