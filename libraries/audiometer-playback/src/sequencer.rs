//! Playback sequencer - core orchestration
//!
//! Plays the entries of a playlist one after another on a single channel,
//! with a silence gap between them. Advancement is driven entirely by sink
//! state notifications and gap timer expiries:
//!
//! ```text
//! play_playlist ─▶ start(e1) ─▶ Active ─▶ Idle ─▶ sink.stop() ─▶ Stopped
//!                                                                   │
//!        ┌──────────────────────── gap timer ◀──────────────────────┘
//!        ▼
//! on_gap_elapsed ─▶ start(e2) ─▶ ... ─▶ on_gap_elapsed ─▶ PlaylistEnded
//! ```

use crate::{
    control::NotificationHandler,
    device,
    error::{PlayerError, Result},
    events::PlayerEvent,
    playlist::{Playlist, PlaylistIter},
    sink::AudioSink,
    stream::SampleRef,
    timer::GapTimer,
    types::{Channel, PlayerConfig, SinkState},
};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Sequential playlist player
///
/// Owns the audio sink and the gap timer. The playlist iterator is acquired
/// by [`PlaybackSequencer::play_playlist`] and kept until the next run
/// replaces it.
pub struct PlaybackSequencer<S, T> {
    sink: S,
    gap_timer: T,
    playlist: Option<Box<dyn Playlist>>,
    iter: Option<Box<dyn PlaylistIter>>,
    channel: Channel,

    /// Calibration offset added to every sample volume
    volume_adjustment: f64,

    /// A run is in progress and sink notifications belong to it
    running: bool,

    /// The gap timer was armed and its expiry has not been handled yet
    gap_pending: bool,

    /// The last started sample has not reported `Active` yet; `Stopped` and
    /// `Idle` seen meanwhile were queued before it started
    awaiting_active: bool,

    pending_events: Vec<PlayerEvent>,
}

impl<S: AudioSink, T: GapTimer> PlaybackSequencer<S, T> {
    /// Create a sequencer with the default gap
    pub fn new(sink: S, gap_timer: T) -> Self {
        Self::with_config(sink, gap_timer, &PlayerConfig::default())
    }

    pub fn with_config(sink: S, mut gap_timer: T, config: &PlayerConfig) -> Self {
        gap_timer.set_interval(config.gap());

        Self {
            sink,
            gap_timer,
            playlist: None,
            iter: None,
            channel: config.channel,
            volume_adjustment: config.volume_adjustment,
            running: false,
            gap_pending: false,
            awaiting_active: false,
            pending_events: Vec::new(),
        }
    }

    // ===== Configuration =====

    /// Set the silence between entries
    ///
    /// Applies to the next gap; a gap already counting down keeps its length.
    pub fn set_gap_duration(&mut self, gap: Duration) {
        debug!("Gap duration set to {:?}", gap);
        self.gap_timer.set_interval(gap);
    }

    pub fn gap_duration(&self) -> Duration {
        self.gap_timer.interval()
    }

    /// Associate a playlist without starting playback
    pub fn set_playlist<P: Playlist + 'static>(&mut self, playlist: P) {
        self.playlist = Some(Box::new(playlist));
    }

    /// Set the calibration offset applied from the next sample on
    pub fn set_volume_adjustment(&mut self, offset: f64) {
        debug!("Volume adjustment set to {}", offset);
        self.volume_adjustment = offset;
    }

    pub fn volume_adjustment(&self) -> f64 {
        self.volume_adjustment
    }

    // ===== Playback Control =====

    /// Start a new run from the beginning of the playlist
    ///
    /// The previous iterator is released first. An empty playlist (or no
    /// playlist at all) is reported as a playlist error without touching
    /// the sink.
    pub fn play_playlist(&mut self, channel: Channel) {
        self.iter = None;
        self.running = false;
        self.gap_pending = false;
        self.awaiting_active = false;
        self.gap_timer.stop();

        let Some(playlist) = self.playlist.as_ref() else {
            warn!("Playback requested without a playlist");
            self.report(&PlayerError::Playlist);
            return;
        };

        let iter = playlist.iter();
        if !iter.has_next() {
            warn!("Playback requested on an empty playlist");
            self.report(&PlayerError::Playlist);
            return;
        }

        info!("Starting playlist on {} channel", channel);
        self.channel = channel;
        self.iter = Some(iter);
        self.running = true;

        match self.fetch_sample() {
            Some(sample) => self.start_sample(&sample),
            None => {
                self.running = false;
                self.report(&PlayerError::Playlist);
            }
        }
    }

    /// Start a new run on a channel given by name
    ///
    /// Names other than left/right are reported as an invalid channel and
    /// leave the current run alone.
    pub fn play_playlist_named(&mut self, channel: &str) {
        match channel.parse::<Channel>() {
            Ok(channel) => self.play_playlist(channel),
            Err(e) => self.report(&e),
        }
    }

    /// Halt the current run
    ///
    /// Stops the sink, the gap timer and the iterator. Safe to call at any
    /// time, including before the first run.
    pub fn stop_playlist(&mut self) {
        self.running = false;
        self.gap_pending = false;
        self.awaiting_active = false;
        self.sink.stop();
        self.gap_timer.stop();

        match self.iter.as_mut() {
            Some(iter) => {
                info!("Playlist stopped");
                iter.stop();
            }
            None => debug!("Stop requested with no playlist run"),
        }
    }

    /// Skip the rest of the current sound set
    ///
    /// The sink is not touched; the next gap expiry picks up the new
    /// iterator position.
    pub fn skip_current_sound_set(&mut self) -> Result<()> {
        let iter = self.iter.as_mut().ok_or(PlayerError::NoActiveRun)?;
        debug!("Skipping current sound set");
        iter.skip_current_sound_set();
        Ok(())
    }

    // ===== Notifications =====

    /// React to a sink state change
    ///
    /// `Stopped` and `Idle` only count once the current sample has gone
    /// `Active`; earlier ones belong to a sample that was stopped or
    /// replaced.
    pub fn on_sink_state(&mut self, state: SinkState) {
        if !self.running {
            debug!("Ignoring sink state {:?} outside a run", state);
            return;
        }

        if self.awaiting_active && matches!(state, SinkState::Stopped | SinkState::Idle) {
            debug!("Ignoring sink state {:?} left over from a previous sample", state);
            return;
        }

        match state {
            SinkState::Active => {
                self.awaiting_active = false;
                if let Some(iter) = self.iter.as_ref() {
                    let data = iter.audiogram_data();
                    debug!(
                        "Now playing {} Hz at {} dB ({}%)",
                        data.frequency, data.volume_db, data.volume_percent
                    );
                    self.pending_events.push(PlayerEvent::NowPlaying { data });
                }
            }
            SinkState::Suspended => {}
            SinkState::Stopped if self.gap_pending => {
                debug!("Gap already running, ignoring repeated stop");
            }
            SinkState::Stopped => {
                debug!("Sample stopped, waiting {:?}", self.gap_timer.interval());
                self.gap_pending = true;
                self.gap_timer.start();
            }
            SinkState::Idle => {
                self.sink.stop();
                self.pending_events.push(PlayerEvent::PlaybackStopped);
            }
        }
    }

    /// React to the gap timer firing
    ///
    /// Expiries that arrive after the gap was cancelled are dropped.
    pub fn on_gap_elapsed(&mut self) {
        if !self.gap_pending {
            debug!("Ignoring stale gap expiry");
            return;
        }
        self.gap_pending = false;

        self.pending_events.push(PlayerEvent::AboutToPlayNext);

        let has_next = self.iter.as_ref().is_some_and(|iter| iter.has_next());
        let sample = if has_next { self.fetch_sample() } else { None };

        match sample {
            Some(sample) => self.start_sample(&sample),
            None => {
                info!("Playlist ended");
                self.running = false;
                self.pending_events.push(PlayerEvent::PlaylistEnded);
            }
        }
    }

    // ===== State =====

    /// Whether a run is in progress
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether a gap is counting down
    pub fn is_gap_pending(&self) -> bool {
        self.gap_pending
    }

    /// Whether the last started sample is still waiting for `Active`
    pub fn is_awaiting_active(&self) -> bool {
        self.awaiting_active
    }

    /// Channel of the current (or last) run
    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn gap_timer(&self) -> &T {
        &self.gap_timer
    }

    pub fn gap_timer_mut(&mut self) -> &mut T {
        &mut self.gap_timer
    }

    // ===== Events =====

    /// Drain all pending events
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internal =====

    fn fetch_sample(&mut self) -> Option<SampleRef> {
        let iter = self.iter.as_mut()?;
        match self.channel {
            Channel::Left => iter.next_left(),
            Channel::Right => iter.next_right(),
        }
    }

    fn start_sample(&mut self, sample: &SampleRef) {
        self.sink.set_volume(sample.volume + self.volume_adjustment);

        match device::start_sample(&mut self.sink, &sample.stream) {
            Ok(()) => self.awaiting_active = true,
            Err(e) => {
                // Nothing was started, so no notification will resume the run
                self.running = false;
                self.report(&e);
            }
        }
    }

    fn report(&mut self, error: &PlayerError) {
        warn!("Playback error: {}", error);
        if let Some(event) = PlayerEvent::from_error(error) {
            self.pending_events.push(event);
        }
    }
}

impl<S: AudioSink, T: GapTimer> NotificationHandler for PlaybackSequencer<S, T> {
    fn handle_sink_state(&mut self, state: SinkState) {
        self.on_sink_state(state);
    }

    fn handle_gap_elapsed(&mut self) {
        self.on_gap_elapsed();
    }

    fn drain_events(&mut self) -> Vec<PlayerEvent> {
        PlaybackSequencer::drain_events(self)
    }
}
