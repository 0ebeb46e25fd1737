//! Audio output abstraction
//!
//! Abstracts the output device so the players work with real hardware,
//! a simulated sink, or a test double.

use crate::stream::SharedStream;

/// One audio output device bound to a fixed format
///
/// State changes ([`crate::SinkState`]) are not returned from these calls.
/// Implementations report them asynchronously to whoever drives the player,
/// usually by posting a [`crate::Notification`] to the control loop.
pub trait AudioSink {
    /// Begin pulling audio from `stream`
    ///
    /// The stream is already open and positioned at its start.
    fn start(&mut self, stream: SharedStream);

    /// Stop output and release the current stream
    fn stop(&mut self);

    /// Set output volume
    fn set_volume(&mut self, volume: f64);

    /// Current output volume
    fn volume(&self) -> f64;
}

impl<S: AudioSink + ?Sized> AudioSink for Box<S> {
    fn start(&mut self, stream: SharedStream) {
        (**self).start(stream);
    }

    fn stop(&mut self) {
        (**self).stop();
    }

    fn set_volume(&mut self, volume: f64) {
        (**self).set_volume(volume);
    }

    fn volume(&self) -> f64 {
        (**self).volume()
    }
}
