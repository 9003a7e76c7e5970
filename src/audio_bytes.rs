use crate::audio_types::BitDepth;
use byteorder::{ByteOrder, LittleEndian};
use bytes::BufMut;

pub fn s16le_to_i32(data: &[u8]) -> Vec<i32> {
    let sample_count = data.len() / 2;
    let mut samples = vec![0i16; sample_count];
    LittleEndian::read_i16_into(&data[..sample_count * 2], &mut samples);
    samples.into_iter().map(i32::from).collect()
}

pub fn s24le_to_i32(data: &[u8]) -> Vec<i32> {
    let sample_count = data.len() / 3;
    let mut result = Vec::with_capacity(sample_count);
    data.chunks_exact(3).for_each(|chunk| {
        result.push(s24le_to_i32_sample([chunk[0], chunk[1], chunk[2]]));
    });
    result
}

pub fn s24le_to_i32_sample(sample_bytes: [u8; 3]) -> i32 {
    let [b0, b1, b2] = sample_bytes;
    let unsigned_sample = u32::from_le_bytes([b0, b1, b2, 0]);
    if unsigned_sample & 0x800000 != 0 {
        (unsigned_sample | 0xFF000000) as i32
    } else {
        unsigned_sample as i32
    }
}

pub fn s32le_to_i32(data: &[u8]) -> Vec<i32> {
    let sample_count = data.len() / 4;
    let mut result = vec![0i32; sample_count];
    LittleEndian::read_i32_into(&data[..sample_count * 4], &mut result);
    result
}

/// Truncating cast; values outside the i16 range wrap.
pub fn i32_to_s16le(data: &[i32]) -> Vec<u8> {
    let narrowed: Vec<i16> = data.iter().map(|&s| s as i16).collect();
    let mut bytes = vec![0u8; narrowed.len() * 2];
    LittleEndian::write_i16_into(&narrowed, &mut bytes);
    bytes
}

/// Keeps the low three bytes of each sample, dropping the top byte.
pub fn i32_to_s24le(data: &[i32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(data.len() * 3);
    for value in data {
        bytes.extend_from_slice(&value.to_le_bytes()[..3]);
    }
    bytes
}

pub fn i32_to_s32le(data: &[i32]) -> Vec<u8> {
    let mut bytes = vec![0u8; data.len() * 4];
    LittleEndian::write_i32_into(data, &mut bytes);
    bytes
}

pub fn decode_pcm(data: &[u8], bits_per_sample: BitDepth) -> Vec<i32> {
    match bits_per_sample {
        BitDepth::Bits16 => s16le_to_i32(data),
        BitDepth::Bits24 => s24le_to_i32(data),
        BitDepth::Bits32 => s32le_to_i32(data),
    }
}

pub fn encode_pcm(samples: &[i32], bits_per_sample: BitDepth) -> Vec<u8> {
    match bits_per_sample {
        BitDepth::Bits16 => i32_to_s16le(samples),
        BitDepth::Bits24 => i32_to_s24le(samples),
        BitDepth::Bits32 => i32_to_s32le(samples),
    }
}

/// Packs samples straight into `dst`, same byte layout as [`encode_pcm`].
pub fn put_pcm<B: BufMut>(dst: &mut B, samples: &[i32], bits_per_sample: BitDepth) {
    match bits_per_sample {
        BitDepth::Bits16 => samples.iter().for_each(|&s| dst.put_i16_le(s as i16)),
        BitDepth::Bits24 => samples
            .iter()
            .for_each(|s| dst.put_slice(&s.to_le_bytes()[..3])),
        BitDepth::Bits32 => samples.iter().for_each(|&s| dst.put_i32_le(s)),
    }
}

/// Copies `width` adjacent channels starting at `first` out of an
/// interleaved buffer into a new interleaved buffer.
pub fn extract_channels(
    input: &[i32],
    channel_count: usize,
    first: usize,
    width: usize,
) -> Vec<i32> {
    assert!(
        first + width <= channel_count,
        "Channel range exceeds channel count"
    );

    let frames = input.len() / channel_count;
    let mut out = Vec::with_capacity(frames * width);
    input.chunks_exact(channel_count).for_each(|frame| {
        out.extend_from_slice(&frame[first..first + width]);
    });
    out
}

/// Writes every frame of `src` into channels `first..first + src_channels`
/// of `dst`. Frames of `dst` past the end of `src` are left untouched.
pub fn insert_channels(
    dst: &mut [i32],
    dst_channels: usize,
    src: &[i32],
    src_channels: usize,
    first: usize,
) {
    assert!(
        first + src_channels <= dst_channels,
        "Channel range exceeds channel count"
    );

    dst.chunks_exact_mut(dst_channels)
        .zip(src.chunks_exact(src_channels))
        .for_each(|(out, frame)| {
            out[first..first + src_channels].copy_from_slice(frame);
        });
}
