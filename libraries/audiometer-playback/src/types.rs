//! Core types for sample playback

use crate::error::PlayerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default silence between two playlist entries
pub const DEFAULT_GAP: Duration = Duration::from_millis(1000);

/// Stereo half of a playlist entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Left ear
    #[default]
    Left,

    /// Right ear
    Right,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Left => f.write_str("left"),
            Channel::Right => f.write_str("right"),
        }
    }
}

impl FromStr for Channel {
    type Err = PlayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Channel::Left),
            "right" | "r" => Ok(Channel::Right),
            other => Err(PlayerError::InvalidChannel(other.to_string())),
        }
    }
}

impl TryFrom<u8> for Channel {
    type Error = PlayerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Channel::Left),
            1 => Ok(Channel::Right),
            other => Err(PlayerError::InvalidChannel(other.to_string())),
        }
    }
}

/// State notifications reported by an audio sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SinkState {
    /// Audio data is being played
    Active,

    /// Output is paused
    Suspended,

    /// Output was stopped and released its stream
    Stopped,

    /// The stream ran out of data
    Idle,
}

/// Metadata of the sample currently sounding
///
/// Always reports the sample's intrinsic level; the calibration offset is
/// never folded in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudiogramData {
    /// Tone frequency in Hz
    pub frequency: u32,

    /// Level in dB HL
    pub volume_db: f64,

    /// Level as a percentage of the output range
    pub volume_percent: f64,
}

impl AudiogramData {
    pub fn new(frequency: u32, volume_db: f64, volume_percent: f64) -> Self {
        Self {
            frequency,
            volume_db,
            volume_percent,
        }
    }
}

/// Configuration for the playback sequencer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Silence between entries in milliseconds (default: 1000)
    pub gap_ms: u64,

    /// Offset added to every sample volume (default: 0.0)
    pub volume_adjustment: f64,

    /// Channel used when none is given explicitly (default: Left)
    pub channel: Channel,
}

impl PlayerConfig {
    pub fn gap(&self) -> Duration {
        Duration::from_millis(self.gap_ms)
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            gap_ms: DEFAULT_GAP.as_millis() as u64,
            volume_adjustment: 0.0,
            channel: Channel::Left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlayerConfig::default();
        assert_eq!(config.gap(), DEFAULT_GAP);
        assert_eq!(config.volume_adjustment, 0.0);
        assert_eq!(config.channel, Channel::Left);
    }

    #[test]
    fn channel_parsing() {
        assert_eq!("left".parse::<Channel>().unwrap(), Channel::Left);
        assert_eq!(" Right ".parse::<Channel>().unwrap(), Channel::Right);
        assert_eq!("r".parse::<Channel>().unwrap(), Channel::Right);
        assert!(matches!(
            "center".parse::<Channel>(),
            Err(PlayerError::InvalidChannel(v)) if v == "center"
        ));
    }

    #[test]
    fn channel_from_index() {
        assert_eq!(Channel::try_from(0u8).unwrap(), Channel::Left);
        assert_eq!(Channel::try_from(1u8).unwrap(), Channel::Right);
        assert!(Channel::try_from(2u8).is_err());
    }

    #[test]
    fn config_fills_missing_fields() {
        let config: PlayerConfig = serde_json::from_str(r#"{"gap_ms": 50}"#).unwrap();
        assert_eq!(config.gap(), Duration::from_millis(50));
        assert_eq!(config.channel, Channel::Left);
    }

    #[test]
    fn channel_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Channel::Right).unwrap(), "\"right\"");
    }
}
