//! Tokio adapters
//!
//! Runs a player on a single control task: a [`TokioGapTimer`] and a
//! [`SimulatedSink`] post [`Notification`]s to one unbounded channel, and
//! [`run_control_loop`] feeds them to the player in arrival order.

use crate::{
    control::{Notification, NotificationHandler},
    events::PlayerEvent,
    sink::AudioSink,
    stream::{self, SharedStream},
    timer::GapTimer,
    types::SinkState,
};
use std::io::SeekFrom;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

pub type NotificationSender = mpsc::UnboundedSender<Notification>;
pub type NotificationReceiver = mpsc::UnboundedReceiver<Notification>;

/// Channel connecting timers and sinks to the control loop
pub fn notification_channel() -> (NotificationSender, NotificationReceiver) {
    mpsc::unbounded_channel()
}

/// Returned by the event callback of [`run_control_loop`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Break,
}

/// Dispatch notifications to `handler` until the callback asks to stop
///
/// Events already queued on the handler are delivered first. Returns when
/// `on_event` yields [`LoopControl::Break`] or every sender is gone.
pub async fn run_control_loop<H, F>(handler: &mut H, receiver: &mut NotificationReceiver, mut on_event: F)
where
    H: NotificationHandler + ?Sized,
    F: FnMut(&PlayerEvent) -> LoopControl,
{
    if deliver(handler, &mut on_event) == LoopControl::Break {
        return;
    }

    while let Some(notification) = receiver.recv().await {
        trace!("Dispatching {:?}", notification);
        handler.dispatch(notification);

        if deliver(handler, &mut on_event) == LoopControl::Break {
            return;
        }
    }

    debug!("Notification channel closed");
}

fn deliver<H, F>(handler: &mut H, on_event: &mut F) -> LoopControl
where
    H: NotificationHandler + ?Sized,
    F: FnMut(&PlayerEvent) -> LoopControl,
{
    for event in handler.drain_events() {
        if on_event(&event) == LoopControl::Break {
            return LoopControl::Break;
        }
    }
    LoopControl::Continue
}

/// Gap timer backed by a tokio task
///
/// Must be started from inside a tokio runtime.
#[derive(Debug)]
pub struct TokioGapTimer {
    interval: Duration,
    sender: NotificationSender,
    task: Option<JoinHandle<()>>,
}

impl TokioGapTimer {
    pub fn new(sender: NotificationSender) -> Self {
        Self {
            interval: Duration::ZERO,
            sender,
            task: None,
        }
    }
}

impl GapTimer for TokioGapTimer {
    fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn start(&mut self) {
        self.stop();

        let sender = self.sender.clone();
        let interval = self.interval;
        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(interval).await;
            // Receiver gone means the loop has shut down
            let _ = sender.send(Notification::GapElapsed);
        }));
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for TokioGapTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Sink that plays nothing but reports states like a real device
///
/// `start` reports `Active` immediately and `Idle` once the stream's length
/// has "played" at `bytes_per_second`. `stop` reports `Stopped` if the sink
/// had been started.
#[derive(Debug)]
pub struct SimulatedSink {
    sender: NotificationSender,
    bytes_per_second: u64,
    volume: f64,
    started: bool,
    starts: usize,
    playback: Option<JoinHandle<()>>,
}

impl SimulatedSink {
    pub fn new(sender: NotificationSender, bytes_per_second: u64) -> Self {
        Self {
            sender,
            bytes_per_second: bytes_per_second.max(1),
            volume: 1.0,
            started: false,
            starts: 0,
            playback: None,
        }
    }

    /// Number of `start` calls so far
    pub fn start_count(&self) -> usize {
        self.starts
    }

    fn play_time(&self, sample: &SharedStream) -> Duration {
        let mut stream = stream::lock(sample);
        let len = stream.seek(SeekFrom::End(0)).unwrap_or(0);
        // The player rewinds before every start; keep the stream as handed over
        let _ = stream.rewind();
        Duration::from_secs_f64(len as f64 / self.bytes_per_second as f64)
    }

    fn notify(&self, state: SinkState) {
        let _ = self.sender.send(Notification::Sink(state));
    }

    fn cancel_playback(&mut self) {
        if let Some(task) = self.playback.take() {
            task.abort();
        }
    }
}

impl AudioSink for SimulatedSink {
    fn start(&mut self, sample: SharedStream) {
        self.cancel_playback();

        let play_time = self.play_time(&sample);
        debug!("Simulated playback for {:?} at volume {:.3}", play_time, self.volume);

        self.started = true;
        self.starts += 1;
        self.notify(SinkState::Active);

        let sender = self.sender.clone();
        self.playback = Some(tokio::spawn(async move {
            tokio::time::sleep(play_time).await;
            let _ = sender.send(Notification::Sink(SinkState::Idle));
        }));
    }

    fn stop(&mut self) {
        self.cancel_playback();
        if self.started {
            self.started = false;
            self.notify(SinkState::Stopped);
        }
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn volume(&self) -> f64 {
        self.volume
    }
}

impl Drop for SimulatedSink {
    fn drop(&mut self) {
        self.cancel_playback();
    }
}
