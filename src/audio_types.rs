use crate::error::{Error, Result};
use serde::Serialize;

/// Number of stereo tracks packed into a TP-7 multitrack file.
pub const TRACK_COUNT: usize = 6;
pub const STEREO_CHANNELS: u16 = 2;
/// `TRACK_COUNT` stereo pairs.
pub const MULTITRACK_CHANNELS: u16 = 12;

/// Integer PCM sample widths the codec understands.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(into = "u16")]
pub enum BitDepth {
    Bits16,
    Bits24,
    Bits32,
}

impl BitDepth {
    pub fn bits(&self) -> u16 {
        match self {
            BitDepth::Bits16 => 16,
            BitDepth::Bits24 => 24,
            BitDepth::Bits32 => 32,
        }
    }

    pub fn bytes_per_sample(&self) -> usize {
        self.bits() as usize / 8
    }
}

impl TryFrom<u16> for BitDepth {
    type Error = Error;

    fn try_from(bits: u16) -> Result<Self> {
        match bits {
            16 => Ok(BitDepth::Bits16),
            24 => Ok(BitDepth::Bits24),
            32 => Ok(BitDepth::Bits32),
            other => Err(Error::UnsupportedBitDepth(other)),
        }
    }
}

impl From<BitDepth> for u16 {
    fn from(depth: BitDepth) -> u16 {
        depth.bits()
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct AudioFormat {
    channel_count: u16,
    bits_per_sample: BitDepth,
    sample_rate: u32,
    frame_count: usize,
}

impl AudioFormat {
    pub fn new(
        channel_count: u16,
        bits_per_sample: BitDepth,
        sample_rate: u32,
        frame_count: usize,
    ) -> Self {
        AudioFormat {
            channel_count,
            bits_per_sample,
            sample_rate,
            frame_count,
        }
    }

    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    pub fn bits_per_sample(&self) -> BitDepth {
        self.bits_per_sample
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn block_align(&self) -> usize {
        self.bits_per_sample.bytes_per_sample() * self.channel_count as usize
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count as f64 / self.sample_rate as f64
    }

    /// Same sample layout with a different channel count and length.
    pub fn with_shape(&self, channel_count: u16, frame_count: usize) -> Self {
        AudioFormat {
            channel_count,
            frame_count,
            ..*self
        }
    }
}

/// Frame-major, channel-minor samples widened to `i32`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SampleBuffer {
    channel_count: usize,
    samples: Vec<i32>,
}

impl SampleBuffer {
    /// Wraps interleaved samples; a trailing partial frame is dropped.
    pub fn from_interleaved(mut samples: Vec<i32>, channel_count: usize) -> Self {
        assert!(channel_count > 0, "Channel count must be > 0");
        let whole = samples.len() - samples.len() % channel_count;
        samples.truncate(whole);
        SampleBuffer {
            channel_count,
            samples,
        }
    }

    /// All-zero buffer; zero is silence for signed PCM.
    pub fn silence(frame_count: usize, channel_count: usize) -> Self {
        Self::from_interleaved(vec![0i32; frame_count * channel_count], channel_count)
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channel_count
    }

    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [i32] {
        &mut self.samples
    }

    pub fn frame(&self, index: usize) -> &[i32] {
        let start = index * self.channel_count;
        &self.samples[start..start + self.channel_count]
    }

    pub fn frames(&self) -> std::slice::ChunksExact<'_, i32> {
        self.samples.chunks_exact(self.channel_count)
    }
}

/// A decoded file held in memory for the duration of one conversion.
#[derive(Debug, Clone)]
pub struct Track {
    format: AudioFormat,
    samples: SampleBuffer,
}

impl Track {
    pub fn new(format: AudioFormat, samples: SampleBuffer) -> Self {
        Track { format, samples }
    }

    pub fn format(&self) -> &AudioFormat {
        &self.format
    }

    pub fn samples(&self) -> &SampleBuffer {
        &self.samples
    }

    pub fn into_parts(self) -> (AudioFormat, SampleBuffer) {
        (self.format, self.samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_depth_rejects_unsupported() {
        assert_eq!(BitDepth::try_from(24).unwrap(), BitDepth::Bits24);
        assert!(matches!(
            BitDepth::try_from(8),
            Err(Error::UnsupportedBitDepth(8))
        ));
        assert!(matches!(
            BitDepth::try_from(20),
            Err(Error::UnsupportedBitDepth(20))
        ));
    }

    #[test]
    fn test_sample_buffer_shape() {
        let buf = SampleBuffer::from_interleaved(vec![1, 2, 3, 4, 5, 6, 7], 2);
        assert_eq!(buf.frame_count(), 3);
        assert_eq!(buf.frame(1), &[3, 4]);
        assert_eq!(buf.frames().count(), 3);
    }

    #[test]
    fn test_format_duration_and_block_align() {
        let format = AudioFormat::new(12, BitDepth::Bits24, 48_000, 96_000);
        assert_eq!(format.block_align(), 36);
        assert!((format.duration_secs() - 2.0).abs() < f64::EPSILON);

        let stereo = format.with_shape(2, 10);
        assert_eq!(stereo.channel_count(), 2);
        assert_eq!(stereo.frame_count(), 10);
        assert_eq!(stereo.sample_rate(), 48_000);
    }

    #[test]
    fn test_bit_depth_serializes_as_number() {
        let format = AudioFormat::new(2, BitDepth::Bits16, 44_100, 0);
        let json = serde_json::to_value(format).unwrap();
        assert_eq!(json["bits_per_sample"], 16);
    }
}
