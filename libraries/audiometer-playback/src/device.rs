//! Shared open-and-start step used by both players

use crate::error::{PlayerError, Result};
use crate::sink::AudioSink;
use crate::stream::{self, OpenMode, SharedStream};
use std::sync::Arc;
use tracing::{debug, warn};

/// Open `sample` if needed and start it on `sink`
///
/// An already open stream is not reopened. The stream is rewound before it
/// is handed over so a repeated entry plays from the top. On failure the
/// sink is left untouched.
pub(crate) fn start_sample<S: AudioSink + ?Sized>(sink: &mut S, sample: &SharedStream) -> Result<()> {
    {
        let mut stream = stream::lock(sample);
        if !stream.is_open() {
            debug!("Opening sample stream");
            stream.open(OpenMode::ReadOnly).map_err(|e| {
                warn!("Failed to open sample stream: {}", e);
                PlayerError::SampleOpen(e)
            })?;
        }
        stream.rewind().map_err(PlayerError::SampleOpen)?;
    }

    sink.start(Arc::clone(sample));
    Ok(())
}
