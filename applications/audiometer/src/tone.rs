/// Test tone rendering
use audiometer_playback::{shared, MemoryStream, SharedStream};
use std::f64::consts::TAU;

/// Peak amplitude as a fraction of full scale
const TONE_AMPLITUDE: f64 = 0.8;

/// Render a sine tone as 16-bit little-endian mono PCM
pub fn render_tone(frequency: u32, duration_ms: u64, sample_rate: u32) -> Vec<u8> {
    let frames = frame_count(duration_ms, sample_rate);
    let step = TAU * f64::from(frequency) / f64::from(sample_rate);
    let peak = TONE_AMPLITUDE * f64::from(i16::MAX);

    let mut pcm = Vec::with_capacity(frames.saturating_mul(2));
    for n in 0..frames {
        let sample = ((n as f64 * step).sin() * peak).round() as i16;
        pcm.extend_from_slice(&sample.to_le_bytes());
    }
    pcm
}

/// Number of frames in `duration_ms` at `sample_rate`, saturating on overflow
fn frame_count(duration_ms: u64, sample_rate: u32) -> usize {
    let frames = u64::from(sample_rate).saturating_mul(duration_ms) / 1000;
    usize::try_from(frames).unwrap_or(usize::MAX)
}

/// Render a tone straight into a closed in-memory stream
pub fn tone_stream(frequency: u32, duration_ms: u64, sample_rate: u32) -> SharedStream {
    shared(MemoryStream::new(render_tone(frequency, duration_ms, sample_rate)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(pcm: &[u8]) -> Vec<i16> {
        pcm.chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect()
    }

    #[test]
    fn length_matches_duration() {
        let pcm = render_tone(1000, 250, 8000);
        assert_eq!(pcm.len(), 2000 * 2);
    }

    #[test]
    fn frame_count_saturates_on_huge_duration() {
        assert_eq!(frame_count(250, 8000), 2000);
        assert_eq!(
            frame_count(u64::MAX, 44100),
            usize::try_from(u64::MAX / 1000).unwrap_or(usize::MAX)
        );
        assert_eq!(frame_count(u64::MAX, 0), 0);
    }

    #[test]
    fn starts_at_zero_crossing() {
        let pcm = render_tone(440, 10, 44100);
        assert_eq!(samples(&pcm)[0], 0);
    }

    #[test]
    fn peak_stays_below_full_scale() {
        let pcm = render_tone(1000, 100, 48000);
        let peak = samples(&pcm).iter().map(|s| s.unsigned_abs()).max().unwrap();
        assert!(peak <= (f64::from(i16::MAX) * TONE_AMPLITUDE).ceil() as u16);
        assert!(peak > (f64::from(i16::MAX) * TONE_AMPLITUDE * 0.95) as u16);
    }

    #[test]
    fn quarter_period_hits_peak() {
        // 1 kHz at 4 kHz sample rate: 0, +peak, 0, -peak
        let pcm = render_tone(1000, 1, 4000);
        let s = samples(&pcm);
        assert_eq!(s.len(), 4);
        assert!(s[1] > 26000);
        assert!(s[3] < -26000);
    }
}
