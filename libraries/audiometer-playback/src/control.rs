//! Inbound notifications
//!
//! Everything that drives a player forward arrives as a [`Notification`]:
//! sink state changes and gap timer expiries. They are handled strictly one
//! at a time, in arrival order.

use crate::events::PlayerEvent;
use crate::types::SinkState;
use serde::{Deserialize, Serialize};

/// Something that happened outside the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    /// The audio sink changed state
    Sink(SinkState),

    /// The gap timer fired
    GapElapsed,
}

/// A player that reacts to notifications
pub trait NotificationHandler {
    /// React to a sink state change
    fn handle_sink_state(&mut self, state: SinkState);

    /// React to a gap timer expiry
    fn handle_gap_elapsed(&mut self) {}

    /// Take all events queued since the last call
    fn drain_events(&mut self) -> Vec<PlayerEvent>;

    /// Route one notification to the matching handler method
    fn dispatch(&mut self, notification: Notification) {
        match notification {
            Notification::Sink(state) => self.handle_sink_state(state),
            Notification::GapElapsed => self.handle_gap_elapsed(),
        }
    }
}
