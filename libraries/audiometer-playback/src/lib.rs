//! Audiometer - Sample Playback
//!
//! Platform-agnostic sequencing of pre-decoded test tones.
//!
//! This crate provides:
//! - Playlist sequencing on a selectable channel with silence gaps
//! - Calibration volume offset applied to every sample
//! - A looping single-file player for device calibration
//! - Event-based reporting (now playing, playlist ended, errors)
//!
//! # Architecture
//!
//! The players never decode or mix audio. They open sample streams and hand
//! them to an [`AudioSink`]; everything else happens in reaction to
//! [`Notification`]s (sink state changes, gap timer expiries) delivered one
//! at a time by the owner. Output devices, timers and playlists are traits.
//!
//! With the `runtime` feature (default) tokio-based adapters are available:
//! [`runtime::TokioGapTimer`], [`runtime::SimulatedSink`] and
//! [`runtime::run_control_loop`].
//!
//! # Example: Deterministic Sequencing
//!
//! ```rust
//! use audiometer_playback::{
//!     shared, AudioSink, Channel, ManualGapTimer, MemoryStream, PlaybackSequencer,
//!     PlayerEvent, SharedStream, SinkState, ToneEntry, TonePlaylist,
//! };
//! use std::time::Duration;
//!
//! #[derive(Default)]
//! struct Silent(f64);
//!
//! impl AudioSink for Silent {
//!     fn start(&mut self, _stream: SharedStream) {}
//!     fn stop(&mut self) {}
//!     fn set_volume(&mut self, volume: f64) { self.0 = volume; }
//!     fn volume(&self) -> f64 { self.0 }
//! }
//!
//! let entry = ToneEntry {
//!     frequency: 1000,
//!     volume_db: 30.0,
//!     volume_percent: 25.0,
//!     volume: 0.5,
//!     left: shared(MemoryStream::new(vec![0u8; 64])),
//!     right: shared(MemoryStream::new(vec![0u8; 64])),
//! };
//!
//! let mut sequencer = PlaybackSequencer::new(Silent::default(), ManualGapTimer::default());
//! sequencer.set_gap_duration(Duration::from_millis(50));
//! sequencer.set_playlist(TonePlaylist::new(vec![entry]));
//! sequencer.play_playlist(Channel::Left);
//!
//! sequencer.on_sink_state(SinkState::Active);
//! assert!(matches!(sequencer.drain_events()[0], PlayerEvent::NowPlaying { .. }));
//! ```

mod control;
mod device;
mod error;
mod events;
mod playlist;
mod sequencer;
mod single_file;
mod sink;
mod stream;
mod timer;
pub mod types;

#[cfg(feature = "runtime")]
pub mod runtime;

// Public exports
pub use control::{Notification, NotificationHandler};
pub use error::{ErrorKind, PlayerError, Result};
pub use events::PlayerEvent;
pub use playlist::{Playlist, PlaylistIter, SequentialIter, ToneEntry, TonePlaylist};
pub use sequencer::PlaybackSequencer;
pub use single_file::{MemorySoundFile, SingleFilePlayer, SoundFile};
pub use sink::AudioSink;
pub use stream::{lock, shared, MemoryStream, OpenMode, SampleRef, SampleStream, SharedStream};
pub use timer::{GapTimer, ManualGapTimer};
pub use types::{AudiogramData, Channel, PlayerConfig, SinkState, DEFAULT_GAP};
