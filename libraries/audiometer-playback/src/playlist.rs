//! Playlist collaborators
//!
//! The sequencer only talks to [`Playlist`] and [`PlaylistIter`]; ordering
//! policy lives entirely in the iterator implementation. [`TonePlaylist`]
//! is a plain in-order implementation.

use crate::stream::{SampleRef, SharedStream};
use crate::types::AudiogramData;
use std::sync::Arc;

/// Source of playlist iterators
pub trait Playlist {
    /// Fresh iterator positioned at the start
    ///
    /// Every call returns an independent iterator.
    fn iter(&self) -> Box<dyn PlaylistIter>;
}

/// Cursor over a playlist, polymorphic over ordering policy
pub trait PlaylistIter {
    /// Whether another entry can be fetched
    fn has_next(&self) -> bool;

    /// Advance and return the left half of the next entry
    fn next_left(&mut self) -> Option<SampleRef>;

    /// Advance and return the right half of the next entry
    fn next_right(&mut self) -> Option<SampleRef>;

    /// Frequency of the last fetched entry
    fn current_frequency(&self) -> u32;

    /// Level in dB of the last fetched entry
    fn current_volume_db(&self) -> f64;

    /// Level in percent of the last fetched entry
    fn current_volume_percent(&self) -> f64;

    /// Drop the rest of the group the current entry belongs to
    fn skip_current_sound_set(&mut self);

    /// End iteration; `has_next` returns `false` afterwards
    fn stop(&mut self);

    /// Snapshot of the current entry's metadata
    fn audiogram_data(&self) -> AudiogramData {
        AudiogramData::new(
            self.current_frequency(),
            self.current_volume_db(),
            self.current_volume_percent(),
        )
    }
}

/// One stereo test tone
#[derive(Debug, Clone)]
pub struct ToneEntry {
    pub frequency: u32,
    pub volume_db: f64,
    pub volume_percent: f64,

    /// Level handed to the sink, before calibration offset
    pub volume: f64,

    pub left: SharedStream,
    pub right: SharedStream,
}

/// In-order playlist of tones
///
/// Consecutive entries sharing a frequency form one sound set.
#[derive(Debug, Clone)]
pub struct TonePlaylist {
    entries: Arc<[ToneEntry]>,
}

impl TonePlaylist {
    pub fn new(entries: Vec<ToneEntry>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ToneEntry] {
        &self.entries
    }
}

impl Playlist for TonePlaylist {
    fn iter(&self) -> Box<dyn PlaylistIter> {
        Box::new(SequentialIter::new(Arc::clone(&self.entries)))
    }
}

/// Iterator yielding entries in stored order
#[derive(Debug)]
pub struct SequentialIter {
    entries: Arc<[ToneEntry]>,
    next: usize,
    current: Option<usize>,
    stopped: bool,
}

impl SequentialIter {
    fn new(entries: Arc<[ToneEntry]>) -> Self {
        Self {
            entries,
            next: 0,
            current: None,
            stopped: false,
        }
    }

    fn advance(&mut self) -> Option<&ToneEntry> {
        if !self.has_next() {
            return None;
        }
        self.current = Some(self.next);
        self.next += 1;
        self.entries.get(self.next - 1)
    }

    fn current_entry(&self) -> Option<&ToneEntry> {
        self.current.and_then(|index| self.entries.get(index))
    }
}

impl PlaylistIter for SequentialIter {
    fn has_next(&self) -> bool {
        !self.stopped && self.next < self.entries.len()
    }

    fn next_left(&mut self) -> Option<SampleRef> {
        self.advance()
            .map(|entry| SampleRef::new(Arc::clone(&entry.left), entry.volume))
    }

    fn next_right(&mut self) -> Option<SampleRef> {
        self.advance()
            .map(|entry| SampleRef::new(Arc::clone(&entry.right), entry.volume))
    }

    fn current_frequency(&self) -> u32 {
        self.current_entry().map_or(0, |entry| entry.frequency)
    }

    fn current_volume_db(&self) -> f64 {
        self.current_entry().map_or(0.0, |entry| entry.volume_db)
    }

    fn current_volume_percent(&self) -> f64 {
        self.current_entry().map_or(0.0, |entry| entry.volume_percent)
    }

    fn skip_current_sound_set(&mut self) {
        // Before the first fetch the upcoming set is the one being skipped
        let frequency = match self.current_entry().or_else(|| self.entries.get(self.next)) {
            Some(entry) => entry.frequency,
            None => return,
        };

        while self
            .entries
            .get(self.next)
            .is_some_and(|entry| entry.frequency == frequency)
        {
            self.next += 1;
        }
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}
