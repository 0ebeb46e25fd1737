/// Runner configuration
use crate::error::{AppError, Result};
use audiometer_playback::PlayerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Longest tone or calibration sample rendered into memory (10 minutes)
pub const MAX_TONE_DURATION_MS: u64 = 600_000;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub playback: PlayerConfig,

    #[serde(default = "default_output")]
    pub output: OutputSettings,

    #[serde(default = "default_tones")]
    pub tones: Vec<ToneSettings>,

    #[serde(default = "default_calibration")]
    pub calibration: CalibrationSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputSettings {
    /// PCM sample rate of rendered tones (16-bit mono)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

impl OutputSettings {
    pub fn bytes_per_second(&self) -> u64 {
        u64::from(self.sample_rate) * 2
    }
}

/// One playlist entry
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ToneSettings {
    pub frequency: u32,

    pub volume_db: f64,

    pub volume_percent: f64,

    /// Sink volume before calibration offset
    pub volume: f64,

    #[serde(default = "default_tone_duration_ms")]
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CalibrationSettings {
    #[serde(default = "default_calibration_frequency")]
    pub frequency: u32,

    #[serde(default = "default_tone_duration_ms")]
    pub duration_ms: u64,

    #[serde(default = "default_calibration_volume")]
    pub volume: f64,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// `audiometer.toml` in the working directory is used when no path is
    /// given. Environment variables prefixed `AUDIOMETER_` override file
    /// values, with `__` separating sections (`AUDIOMETER_PLAYBACK__GAP_MS`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from("audiometer.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("AUDIOMETER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.output.sample_rate == 0 {
            return Err(AppError::Config(
                "output.sample_rate must be positive".to_string(),
            ));
        }

        if self.tones.is_empty() {
            return Err(AppError::Config("at least one tone is required".to_string()));
        }

        if let Some(tone) = self.tones.iter().find(|tone| tone.duration_ms == 0) {
            return Err(AppError::Config(format!(
                "tone at {} Hz has zero duration",
                tone.frequency
            )));
        }

        if let Some(tone) = self
            .tones
            .iter()
            .find(|tone| tone.duration_ms > MAX_TONE_DURATION_MS)
        {
            return Err(AppError::Config(format!(
                "tone at {} Hz is longer than {} ms",
                tone.frequency, MAX_TONE_DURATION_MS
            )));
        }

        if self.calibration.duration_ms == 0 || self.calibration.duration_ms > MAX_TONE_DURATION_MS {
            return Err(AppError::Config(format!(
                "calibration.duration_ms must be between 1 and {}",
                MAX_TONE_DURATION_MS
            )));
        }

        Ok(())
    }
}

// Default values
fn default_output() -> OutputSettings {
    OutputSettings {
        sample_rate: default_sample_rate(),
    }
}

fn default_sample_rate() -> u32 {
    44100
}

fn default_tone_duration_ms() -> u64 {
    1000
}

/// Standard audiogram frequencies at a screening level
fn default_tones() -> Vec<ToneSettings> {
    [1000, 2000, 4000, 500]
        .into_iter()
        .map(|frequency| ToneSettings {
            frequency,
            volume_db: 25.0,
            volume_percent: 25.0,
            volume: 0.25,
            duration_ms: default_tone_duration_ms(),
        })
        .collect()
}

fn default_calibration() -> CalibrationSettings {
    CalibrationSettings {
        frequency: default_calibration_frequency(),
        duration_ms: default_tone_duration_ms(),
        volume: default_calibration_volume(),
    }
}

fn default_calibration_frequency() -> u32 {
    1000
}

fn default_calibration_volume() -> f64 {
    0.5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            playback: PlayerConfig::default(),
            output: default_output(),
            tones: default_tones(),
            calibration: default_calibration(),
        }
    }
}
