//! Audiometer runner library
//!
//! Plays configured tone playlists and calibration loops through the
//! playback sequencer on a simulated output device.
//!
//! This library exposes the core components for testing purposes.

pub mod config;
pub mod error;
pub mod session;
pub mod tone;

pub use config::{AppConfig, CalibrationSettings, OutputSettings, ToneSettings};
pub use error::{AppError, Result};
pub use session::{build_playlist, calibrate, run_playlist, RunOptions};
