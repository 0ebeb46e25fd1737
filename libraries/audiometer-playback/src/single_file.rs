//! Looping player for a single calibration sample

use crate::{
    control::NotificationHandler,
    device,
    error::{PlayerError, Result},
    events::PlayerEvent,
    sink::AudioSink,
    stream::SharedStream,
    types::{Channel, SinkState},
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A stereo sound backed by one source file
pub trait SoundFile {
    /// Location of the left channel data, if the file has one
    fn left_location(&self) -> Option<&str>;

    /// Stream for one channel
    fn sound(&self, channel: Channel) -> SharedStream;
}

/// [`SoundFile`] over two in-memory streams
#[derive(Debug, Clone)]
pub struct MemorySoundFile {
    location: String,
    left: SharedStream,
    right: SharedStream,
}

impl MemorySoundFile {
    pub fn new(location: impl Into<String>, left: SharedStream, right: SharedStream) -> Self {
        Self {
            location: location.into(),
            left,
            right,
        }
    }
}

impl SoundFile for MemorySoundFile {
    fn left_location(&self) -> Option<&str> {
        Some(self.location.as_str()).filter(|location| !location.is_empty())
    }

    fn sound(&self, channel: Channel) -> SharedStream {
        match channel {
            Channel::Left => Arc::clone(&self.left),
            Channel::Right => Arc::clone(&self.right),
        }
    }
}

/// Plays the left channel of one sound file over and over
///
/// Each time the sink runs dry the same sample is started again, until
/// [`SingleFilePlayer::stop`] is called.
pub struct SingleFilePlayer<S: AudioSink> {
    sink: S,
    file: Option<Arc<dyn SoundFile>>,
    looping: bool,
    pending_events: Vec<PlayerEvent>,
}

impl<S: AudioSink> SingleFilePlayer<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            file: None,
            looping: false,
            pending_events: Vec::new(),
        }
    }

    /// Install the calibration sound
    ///
    /// A file without a left channel is rejected and the previously
    /// installed file stays active.
    pub fn set_file_sound(&mut self, file: Arc<dyn SoundFile>) -> Result<()> {
        if file.left_location().map_or(true, str::is_empty) {
            warn!("Rejecting calibration sound without a left channel");
            return Err(PlayerError::EmptyLeftChannel);
        }

        self.file = Some(file);
        Ok(())
    }

    pub fn file_sound(&self) -> Option<&Arc<dyn SoundFile>> {
        self.file.as_ref()
    }

    /// Start looping the left channel of the installed file
    pub fn start(&mut self) -> Result<()> {
        if self.file.is_none() {
            return Err(PlayerError::NoFileSound);
        }

        info!("Starting calibration loop");
        self.looping = true;
        self.play_left();
        Ok(())
    }

    /// Stop playback; later idle notifications no longer restart it
    pub fn stop(&mut self) {
        if self.looping {
            info!("Stopping calibration loop");
        }
        self.looping = false;
        self.sink.stop();
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.sink.set_volume(volume);
    }

    pub fn volume(&self) -> f64 {
        self.sink.volume()
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// React to a sink state change
    pub fn on_sink_state(&mut self, state: SinkState) {
        match state {
            SinkState::Idle if self.looping => {
                debug!("Calibration sample drained, restarting");
                self.play_left();
            }
            SinkState::Idle => debug!("Ignoring idle after stop"),
            SinkState::Active | SinkState::Suspended | SinkState::Stopped => {}
        }
    }

    /// Drain all pending events
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn play_left(&mut self) {
        let Some(sample) = self.file.as_ref().map(|file| file.sound(Channel::Left)) else {
            return;
        };

        if let Err(e) = device::start_sample(&mut self.sink, &sample) {
            warn!("Calibration playback error: {}", e);
            // A sample that cannot be opened would fail again on every idle
            self.looping = false;
            if let Some(event) = PlayerEvent::from_error(&e) {
                self.pending_events.push(event);
            }
        }
    }
}

impl<S: AudioSink> NotificationHandler for SingleFilePlayer<S> {
    fn handle_sink_state(&mut self, state: SinkState) {
        self.on_sink_state(state);
    }

    fn drain_events(&mut self) -> Vec<PlayerEvent> {
        SingleFilePlayer::drain_events(self)
    }
}

impl<S: AudioSink> Drop for SingleFilePlayer<S> {
    fn drop(&mut self) {
        self.sink.stop();
    }
}
