//! Error types for sample playback

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Playback was requested but the playlist yielded no entries
    #[error("Playlist error")]
    Playlist,

    /// A sample stream could not be opened for reading
    #[error("Could not open a sound sample file: {0}")]
    SampleOpen(#[source] std::io::Error),

    /// A channel value other than left or right was supplied
    #[error("Incorrect sound sample channel: {0}")]
    InvalidChannel(String),

    /// An operation needing a playlist iterator was called outside a run
    #[error("No playlist run is active")]
    NoActiveRun,

    /// Single-file source has no left channel location
    #[error("Sound file has no left channel")]
    EmptyLeftChannel,

    /// Single-file player started before a sound file was installed
    #[error("No sound file set")]
    NoFileSound,
}

impl PlayerError {
    /// Classification used when the error is reported as an event.
    ///
    /// Returns `None` for errors that are only ever returned to the caller.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            PlayerError::Playlist => Some(ErrorKind::Playlist),
            PlayerError::SampleOpen(_) => Some(ErrorKind::SampleOpen),
            PlayerError::InvalidChannel(_) => Some(ErrorKind::InvalidChannel),
            PlayerError::NoActiveRun | PlayerError::EmptyLeftChannel | PlayerError::NoFileSound => {
                None
            }
        }
    }
}

/// Error categories carried by [`crate::PlayerEvent::Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Empty playlist on start
    Playlist,
    /// Sample stream failed to open
    SampleOpen,
    /// Unrecognized channel selection
    InvalidChannel,
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlayerError>;
