//! Property-based tests for the playback sequencer
//!
//! Uses proptest to check sequencing and calibration invariants over random
//! playlists.

use audiometer_playback::{
    shared, AudioSink, AudiogramData, Channel, ManualGapTimer, MemoryStream, PlaybackSequencer,
    PlayerEvent, SharedStream, SinkState, ToneEntry, TonePlaylist,
};
use proptest::prelude::*;
use std::time::Duration;

#[derive(Default)]
struct VolumeLog {
    start_volumes: Vec<f64>,
    volume: f64,
}

impl AudioSink for VolumeLog {
    fn start(&mut self, _stream: SharedStream) {
        self.start_volumes.push(self.volume);
    }

    fn stop(&mut self) {}

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }

    fn volume(&self) -> f64 {
        self.volume
    }
}

// ===== Helpers =====

fn arbitrary_entry() -> impl Strategy<Value = ToneEntry> {
    (
        prop::sample::select(vec![125u32, 250, 500, 1000, 2000, 4000, 8000]),
        -10i32..=120,
        0.0f64..=1.0,
    )
        .prop_map(|(frequency, db, volume)| ToneEntry {
            frequency,
            volume_db: f64::from(db),
            volume_percent: volume * 100.0,
            volume,
            left: shared(MemoryStream::new(vec![0u8; 32])),
            right: shared(MemoryStream::new(vec![0u8; 32])),
        })
}

fn arbitrary_channel() -> impl Strategy<Value = Channel> {
    prop_oneof![Just(Channel::Left), Just(Channel::Right)]
}

/// Play every entry to the end, returning all events
fn play_through(
    seq: &mut PlaybackSequencer<VolumeLog, ManualGapTimer>,
    channel: Channel,
    entries: usize,
) -> Vec<PlayerEvent> {
    seq.play_playlist(channel);
    let mut events = seq.drain_events();

    for _ in 0..entries {
        seq.on_sink_state(SinkState::Active);
        seq.on_sink_state(SinkState::Idle);
        seq.on_sink_state(SinkState::Stopped);
        let gap = seq.gap_duration();
        if seq.gap_timer_mut().advance(gap) {
            seq.on_gap_elapsed();
        }
        events.extend(seq.drain_events());
    }

    events
}

// ===== Property Tests =====

proptest! {
    /// Property: exactly one PlaylistEnded, and only as the final event
    #[test]
    fn playlist_ends_exactly_once(
        entries in prop::collection::vec(arbitrary_entry(), 1..20),
        channel in arbitrary_channel(),
        gap_ms in 1u64..500,
    ) {
        let count = entries.len();
        let mut seq = PlaybackSequencer::new(VolumeLog::default(), ManualGapTimer::default());
        seq.set_gap_duration(Duration::from_millis(gap_ms));
        seq.set_playlist(TonePlaylist::new(entries));

        let events = play_through(&mut seq, channel, count);

        let ended = events.iter().filter(|e| **e == PlayerEvent::PlaylistEnded).count();
        prop_assert_eq!(ended, 1);
        prop_assert_eq!(events.last(), Some(&PlayerEvent::PlaylistEnded));

        let playing = events.iter().filter(|e| matches!(e, PlayerEvent::NowPlaying { .. })).count();
        prop_assert_eq!(playing, count);
        prop_assert_eq!(seq.sink().start_volumes.len(), count);
    }

    /// Property: every start applies intrinsic volume plus the offset, and
    /// reported levels stay intrinsic
    #[test]
    fn volume_adjustment_is_uniform(
        entries in prop::collection::vec(arbitrary_entry(), 1..15),
        offset in -1.0f64..1.0,
        channel in arbitrary_channel(),
    ) {
        let expected_volumes: Vec<f64> = entries.iter().map(|e| e.volume + offset).collect();
        let expected_data: Vec<AudiogramData> = entries
            .iter()
            .map(|e| AudiogramData::new(e.frequency, e.volume_db, e.volume_percent))
            .collect();
        let count = entries.len();

        let mut seq = PlaybackSequencer::new(VolumeLog::default(), ManualGapTimer::default());
        seq.set_volume_adjustment(offset);
        seq.set_playlist(TonePlaylist::new(entries));

        let events = play_through(&mut seq, channel, count);

        prop_assert_eq!(&seq.sink().start_volumes, &expected_volumes);

        let reported: Vec<AudiogramData> = events
            .iter()
            .filter_map(|e| match e {
                PlayerEvent::NowPlaying { data } => Some(*data),
                _ => None,
            })
            .collect();
        prop_assert_eq!(reported, expected_data);
    }

    /// Property: a gap never elapses early
    #[test]
    fn gap_never_elapses_early(gap_ms in 1u64..2000, early_ms in 1u64..2000) {
        let early = early_ms.min(gap_ms);
        let entry = ToneEntry {
            frequency: 1000,
            volume_db: 20.0,
            volume_percent: 20.0,
            volume: 0.5,
            left: shared(MemoryStream::new(vec![0u8; 8])),
            right: shared(MemoryStream::new(vec![0u8; 8])),
        };

        let mut seq = PlaybackSequencer::new(VolumeLog::default(), ManualGapTimer::default());
        seq.set_gap_duration(Duration::from_millis(gap_ms));
        seq.set_playlist(TonePlaylist::new(vec![entry.clone(), entry]));
        seq.play_playlist(Channel::Left);
        seq.on_sink_state(SinkState::Active);
        seq.on_sink_state(SinkState::Stopped);

        let fired = seq.gap_timer_mut().advance(Duration::from_millis(gap_ms - early));
        prop_assert!(!fired);
        prop_assert!(seq.gap_timer_mut().advance(Duration::from_millis(early)));
    }
}
