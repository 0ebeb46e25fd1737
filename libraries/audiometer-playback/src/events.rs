//! Playback events
//!
//! Outward notifications queued by the players. Callers drain them after
//! every call into the player and react (display, logging, advancing UI).

use crate::error::{ErrorKind, PlayerError};
use crate::types::AudiogramData;
use serde::{Deserialize, Serialize};

/// Events emitted by the players
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// The sink started sounding a playlist entry
    NowPlaying {
        /// Intrinsic metadata of the entry
        data: AudiogramData,
    },

    /// The gap elapsed and the next entry is about to be fetched
    AboutToPlayNext,

    /// The iterator has no further entries
    PlaylistEnded,

    /// The sink drained its stream and was stopped
    PlaybackStopped,

    /// A playback attempt failed
    Error {
        kind: ErrorKind,
        message: String,
    },
}

impl PlayerEvent {
    /// Build an error event from a reportable error
    ///
    /// Returns `None` for caller errors, which are returned rather than
    /// reported.
    pub fn from_error(error: &PlayerError) -> Option<Self> {
        error.kind().map(|kind| PlayerEvent::Error {
            kind,
            message: error.to_string(),
        })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, PlayerEvent::Error { .. })
    }
}
