//! Fixture builders and buffer summaries for codec and conversion tests
use crate::audio_types::{AudioFormat, BitDepth, SampleBuffer};
use crate::error::Result;
use crate::wav::write_wav;
use std::path::Path;

/// Every sample of channel `k` holds the value `k`.
pub fn constant_channels(frame_count: usize, channel_count: usize) -> SampleBuffer {
    let mut samples = Vec::with_capacity(frame_count * channel_count);
    for _ in 0..frame_count {
        samples.extend((0..channel_count).map(|ch| ch as i32));
    }
    SampleBuffer::from_interleaved(samples, channel_count)
}

/// Strictly increasing, never zero: sample `n` (interleaved index) is
/// `(n + 1) * step`.
pub fn ramp(frame_count: usize, channel_count: usize, step: i32) -> SampleBuffer {
    let samples = (0..frame_count * channel_count)
        .map(|n| (n as i32 + 1) * step)
        .collect();
    SampleBuffer::from_interleaved(samples, channel_count)
}

/// Writes `samples` as a WAV file with the buffer's own channel count.
pub fn write_fixture(
    path: &Path,
    bits_per_sample: BitDepth,
    sample_rate: u32,
    samples: &SampleBuffer,
) -> Result<()> {
    let format = AudioFormat::new(
        samples.channel_count() as u16,
        bits_per_sample,
        sample_rate,
        samples.frame_count(),
    );
    write_wav(path, &format, samples)
}

/// Per-buffer extremes and, per channel, the last frame holding a
/// non-zero sample.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSummary {
    pub frame_count: usize,
    pub min: i32,
    pub max: i32,
    pub last_non_zero: Vec<Option<usize>>,
}

impl TrackSummary {
    pub fn of(samples: &SampleBuffer) -> Self {
        let mut last_non_zero = vec![None; samples.channel_count()];
        let mut min = 0;
        let mut max = 0;

        for (frame_idx, frame) in samples.frames().enumerate() {
            for (ch, &sample) in frame.iter().enumerate() {
                if frame_idx == 0 && ch == 0 {
                    min = sample;
                    max = sample;
                }
                min = min.min(sample);
                max = max.max(sample);
                if sample != 0 {
                    last_non_zero[ch] = Some(frame_idx);
                }
            }
        }

        Self {
            frame_count: samples.frame_count(),
            min,
            max,
            last_non_zero,
        }
    }

    pub fn is_silent(&self) -> bool {
        self.last_non_zero.iter().all(Option::is_none)
    }
}
