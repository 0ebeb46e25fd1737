//! Sample streams handed to the audio sink
//!
//! A stream is a readable, seekable byte source holding one pre-decoded
//! sample. Streams are owned by the playlist (or sound file) that produced
//! them; players only open and start them.

use std::io::{self, Read, Seek, SeekFrom};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Access mode requested when opening a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    ReadOnly,
}

/// Pre-decoded sample data
pub trait SampleStream: Read + Seek + Send {
    /// Whether the stream is ready for reading
    fn is_open(&self) -> bool;

    /// Open the stream
    ///
    /// # Returns
    /// * `Ok(())` - Stream can be read
    /// * `Err(_)` - Underlying resource is unavailable
    fn open(&mut self, mode: OpenMode) -> io::Result<()>;
}

impl std::fmt::Debug for dyn SampleStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleStream")
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}

/// Stream handle shared between its owner and the sink
pub type SharedStream = Arc<Mutex<dyn SampleStream>>;

/// Wrap a stream into a [`SharedStream`]
pub fn shared<S: SampleStream + 'static>(stream: S) -> SharedStream {
    Arc::new(Mutex::new(stream))
}

/// Lock a shared stream, recovering from a poisoned lock
///
/// Stream state is plain bytes and a cursor, so a panic in another holder
/// cannot leave it logically inconsistent.
pub fn lock(stream: &SharedStream) -> MutexGuard<'_, dyn SampleStream + 'static> {
    stream.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A stream together with the volume it should be played at
#[derive(Clone)]
pub struct SampleRef {
    pub stream: SharedStream,

    /// Intrinsic level in the sink's volume unit
    pub volume: f64,
}

impl SampleRef {
    pub fn new(stream: SharedStream, volume: f64) -> Self {
        Self { stream, volume }
    }
}

impl std::fmt::Debug for SampleRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleRef")
            .field("stream", &Arc::as_ptr(&self.stream))
            .field("volume", &self.volume)
            .finish()
    }
}

/// In-memory sample stream
///
/// Starts closed, like a file-backed sample. Can be told to refuse opening
/// to emulate a missing or unreadable file.
#[derive(Debug, Clone)]
pub struct MemoryStream {
    data: Arc<[u8]>,
    position: u64,
    open: bool,
    refuse_open: bool,
}

impl MemoryStream {
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            data: data.into(),
            position: 0,
            open: false,
            refuse_open: false,
        }
    }

    /// A stream whose `open` always fails
    pub fn unopenable(data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            refuse_open: true,
            ..Self::new(data)
        }
    }

    /// Close the stream so the next start has to open it again
    pub fn close(&mut self) {
        self.open = false;
        self.position = 0;
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Read for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.open {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "stream is not open"));
        }

        let start = (self.position as usize).min(self.data.len());
        let remaining = &self.data[start..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.position += n as u64;
        Ok(n)
    }
}

impl Seek for MemoryStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(offset) => (self.data.len() as u64).checked_add_signed(offset),
            SeekFrom::Current(offset) => self.position.checked_add_signed(offset),
        };

        let Some(target) = target else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            ));
        };

        self.position = target;
        Ok(self.position)
    }
}

impl SampleStream for MemoryStream {
    fn is_open(&self) -> bool {
        self.open
    }

    fn open(&mut self, _mode: OpenMode) -> io::Result<()> {
        if self.refuse_open {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "sample could not be opened",
            ));
        }
        self.open = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_requires_open() {
        let mut stream = MemoryStream::new(vec![1u8, 2, 3]);
        let mut buf = [0u8; 3];
        assert!(stream.read(&mut buf).is_err());

        stream.open(OpenMode::ReadOnly).unwrap();
        assert_eq!(stream.read(&mut buf).unwrap(), 3);
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(stream.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn seek_rewinds() {
        let mut stream = MemoryStream::new(vec![7u8; 10]);
        stream.open(OpenMode::ReadOnly).unwrap();
        let mut buf = [0u8; 4];
        stream.read_exact(&mut buf).unwrap();
        assert_eq!(stream.seek(SeekFrom::Current(0)).unwrap(), 4);
        assert_eq!(stream.seek(SeekFrom::End(0)).unwrap(), 10);
        stream.rewind().unwrap();
        assert_eq!(stream.stream_position().unwrap(), 0);
        assert!(stream.seek(SeekFrom::Current(-1)).is_err());
    }

    #[test]
    fn seek_past_u64_range_is_rejected() {
        let mut stream = MemoryStream::new(vec![0u8; 10]);
        stream.seek(SeekFrom::Start(u64::MAX - 2)).unwrap();

        let err = stream.seek(SeekFrom::Current(i64::MAX)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(stream.stream_position().unwrap(), u64::MAX - 2);

        assert_eq!(stream.seek(SeekFrom::End(i64::MAX)).unwrap(), 10 + i64::MAX as u64);
        assert!(stream.seek(SeekFrom::End(i64::MIN)).is_err());
    }

    #[test]
    fn unopenable_stream_stays_closed() {
        let mut stream = MemoryStream::unopenable(vec![0u8; 4]);
        assert!(stream.open(OpenMode::ReadOnly).is_err());
        assert!(!stream.is_open());
    }

    #[test]
    fn shared_stream_locks() {
        let handle = shared(MemoryStream::new(vec![0u8; 4]));
        lock(&handle).open(OpenMode::ReadOnly).unwrap();
        assert!(lock(&handle).is_open());
    }
}
