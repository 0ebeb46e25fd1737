/// Playback sessions driven by the tokio control loop
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::tone::tone_stream;
use audiometer_playback::runtime::{
    notification_channel, run_control_loop, LoopControl, SimulatedSink, TokioGapTimer,
};
use audiometer_playback::{
    MemorySoundFile, PlaybackSequencer, PlayerEvent, SingleFilePlayer, ToneEntry, TonePlaylist,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Overrides given on the command line
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub channel: Option<String>,
    pub gap_ms: Option<u64>,
    pub volume_adjustment: Option<f64>,
}

/// Build the playlist described by the configuration
pub fn build_playlist(config: &AppConfig) -> TonePlaylist {
    let sample_rate = config.output.sample_rate;
    let entries = config
        .tones
        .iter()
        .map(|tone| ToneEntry {
            frequency: tone.frequency,
            volume_db: tone.volume_db,
            volume_percent: tone.volume_percent,
            volume: tone.volume,
            left: tone_stream(tone.frequency, tone.duration_ms, sample_rate),
            right: tone_stream(tone.frequency, tone.duration_ms, sample_rate),
        })
        .collect();
    TonePlaylist::new(entries)
}

/// Play the configured playlist once
///
/// Returns when the playlist ends, or with an error when playback fails.
pub async fn run_playlist(config: &AppConfig, options: RunOptions) -> Result<Vec<PlayerEvent>> {
    let (sender, mut receiver) = notification_channel();
    let sink = SimulatedSink::new(sender.clone(), config.output.bytes_per_second());
    let mut sequencer =
        PlaybackSequencer::with_config(sink, TokioGapTimer::new(sender), &config.playback);

    if let Some(gap_ms) = options.gap_ms {
        sequencer.set_gap_duration(Duration::from_millis(gap_ms));
    }
    if let Some(offset) = options.volume_adjustment {
        sequencer.set_volume_adjustment(offset);
    }
    sequencer.set_playlist(build_playlist(config));

    let channel = options
        .channel
        .unwrap_or_else(|| config.playback.channel.to_string());
    info!(
        "Playing {} tones on {} channel, gap {:?}",
        config.tones.len(),
        channel,
        sequencer.gap_duration()
    );
    sequencer.play_playlist_named(&channel);

    let mut events = Vec::new();
    let mut failure = None;
    run_control_loop(&mut sequencer, &mut receiver, |event| {
        log_event(event);
        events.push(event.clone());
        match event {
            PlayerEvent::PlaylistEnded => LoopControl::Break,
            PlayerEvent::Error { message, .. } => {
                failure = Some(message.clone());
                LoopControl::Break
            }
            _ => LoopControl::Continue,
        }
    })
    .await;

    sequencer.stop_playlist();

    match failure {
        Some(message) => Err(AppError::Session(message)),
        None => Ok(events),
    }
}

/// Loop the calibration tone for `duration`
pub async fn calibrate(config: &AppConfig, duration: Duration, volume: Option<f64>) -> Result<()> {
    let settings = &config.calibration;
    let sample_rate = config.output.sample_rate;
    let (sender, mut receiver) = notification_channel();

    let mut player = SingleFilePlayer::new(SimulatedSink::new(sender, config.output.bytes_per_second()));
    let file = MemorySoundFile::new(
        format!("calibration-{}hz.pcm", settings.frequency),
        tone_stream(settings.frequency, settings.duration_ms, sample_rate),
        tone_stream(settings.frequency, settings.duration_ms, sample_rate),
    );
    player.set_file_sound(Arc::new(file))?;
    player.set_volume(volume.unwrap_or(settings.volume));

    info!(
        "Calibrating at {} Hz, volume {:.3}, for {:?}",
        settings.frequency,
        player.volume(),
        duration
    );
    player.start()?;

    let mut failure = None;
    // The loop only returns early on error; otherwise the timeout ends it
    let _ = tokio::time::timeout(
        duration,
        run_control_loop(&mut player, &mut receiver, |event| {
            log_event(event);
            if let PlayerEvent::Error { message, .. } = event {
                failure = Some(message.clone());
                return LoopControl::Break;
            }
            LoopControl::Continue
        }),
    )
    .await;

    player.stop();

    match failure {
        Some(message) => Err(AppError::Session(message)),
        None => Ok(()),
    }
}

fn log_event(event: &PlayerEvent) {
    match event {
        PlayerEvent::NowPlaying { data } => info!(
            frequency = data.frequency,
            volume_db = data.volume_db,
            volume_percent = data.volume_percent,
            "Now playing"
        ),
        PlayerEvent::AboutToPlayNext => info!("Next tone"),
        PlayerEvent::PlaylistEnded => info!("Playlist ended"),
        PlayerEvent::PlaybackStopped => info!("Tone finished"),
        PlayerEvent::Error { kind, message } => error!(?kind, "{}", message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToneSettings;

    fn short_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.output.sample_rate = 1000;
        config.playback.gap_ms = 20;
        config.tones = vec![
            ToneSettings {
                frequency: 250,
                volume_db: 30.0,
                volume_percent: 40.0,
                volume: 0.4,
                duration_ms: 100,
            },
            ToneSettings {
                frequency: 500,
                volume_db: 35.0,
                volume_percent: 45.0,
                volume: 0.45,
                duration_ms: 100,
            },
        ];
        config.calibration.duration_ms = 100;
        config
    }

    #[test]
    fn playlist_follows_config() {
        let playlist = build_playlist(&short_config());
        assert_eq!(playlist.len(), 2);
        assert_eq!(playlist.entries()[1].frequency, 500);
        assert_eq!(playlist.entries()[1].volume, 0.45);
    }

    #[tokio::test(start_paused = true)]
    async fn run_plays_every_tone() {
        let events = run_playlist(&short_config(), RunOptions::default()).await.unwrap();

        let played: Vec<u32> = events
            .iter()
            .filter_map(|event| match event {
                PlayerEvent::NowPlaying { data } => Some(data.frequency),
                _ => None,
            })
            .collect();
        assert_eq!(played, vec![250, 500]);
        assert_eq!(events.last(), Some(&PlayerEvent::PlaylistEnded));
    }

    #[tokio::test(start_paused = true)]
    async fn run_rejects_unknown_channel() {
        let options = RunOptions {
            channel: Some("both".to_string()),
            ..RunOptions::default()
        };
        let result = run_playlist(&short_config(), options).await;
        assert!(matches!(result, Err(AppError::Session(m)) if m.contains("channel")));
    }

    #[tokio::test(start_paused = true)]
    async fn calibrate_runs_for_requested_time() {
        let started = tokio::time::Instant::now();
        calibrate(&short_config(), Duration::from_millis(450), None)
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(450));
    }
}
