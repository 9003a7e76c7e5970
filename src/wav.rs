use crate::audio_bytes::{decode_pcm, put_pcm};
use crate::audio_types::{AudioFormat, BitDepth, SampleBuffer, Track};
use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};
use bytes::{BufMut, Bytes, BytesMut};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const WAVE_FORMAT_PCM: u16 = 0x0001;
const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;
const RIFF_HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;
const FMT_CHUNK_LEN: usize = 16;
const CANONICAL_HEADER_LEN: usize = 44;

/// Fields of the `fmt ` chunk the codec cares about.
struct FmtChunk {
    channel_count: u16,
    sample_rate: u32,
    bits_per_sample: BitDepth,
}

fn parse_fmt(body: &[u8]) -> Result<FmtChunk> {
    if body.len() < FMT_CHUNK_LEN {
        return Err(Error::malformed(format!(
            "fmt chunk is {} bytes, expected at least {}",
            body.len(),
            FMT_CHUNK_LEN
        )));
    }

    let format_tag = LittleEndian::read_u16(&body[0..2]);
    let channel_count = LittleEndian::read_u16(&body[2..4]);
    let sample_rate = LittleEndian::read_u32(&body[4..8]);
    let bits = LittleEndian::read_u16(&body[14..16]);

    match format_tag {
        WAVE_FORMAT_PCM => {}
        WAVE_FORMAT_EXTENSIBLE => {
            // SubFormat GUID starts at offset 24; its first two bytes are the format tag.
            if body.len() >= 26 && LittleEndian::read_u16(&body[24..26]) != WAVE_FORMAT_PCM {
                return Err(Error::malformed("extensible sub-format is not integer PCM"));
            }
        }
        other => {
            return Err(Error::malformed(format!(
                "unsupported format tag 0x{:04X}",
                other
            )))
        }
    }

    if channel_count == 0 {
        return Err(Error::malformed("channel count is 0"));
    }

    Ok(FmtChunk {
        channel_count,
        sample_rate,
        bits_per_sample: BitDepth::try_from(bits)?,
    })
}

/// Decodes a complete in-memory WAV file.
pub fn parse_wav(buffer: &[u8]) -> Result<Track> {
    if buffer.len() < RIFF_HEADER_LEN {
        return Err(Error::malformed("file shorter than RIFF header"));
    }
    if &buffer[..4] != b"RIFF" || &buffer[8..12] != b"WAVE" {
        return Err(Error::malformed("Not a WAV file"));
    }

    let mut idx = RIFF_HEADER_LEN;
    let mut fmt: Option<FmtChunk> = None;

    loop {
        if buffer.len() < idx.saturating_add(CHUNK_HEADER_LEN) {
            return Err(Error::malformed("missing data chunk"));
        }

        let id = &buffer[idx..idx + 4];
        let chunk_size = LittleEndian::read_u32(&buffer[idx + 4..idx + 8]) as usize;
        let body_start = idx + CHUNK_HEADER_LEN;

        match id {
            b"fmt " => {
                let body_end = body_start
                    .checked_add(chunk_size)
                    .filter(|end| *end <= buffer.len())
                    .ok_or_else(|| Error::malformed("truncated fmt chunk"))?;
                fmt = Some(parse_fmt(&buffer[body_start..body_end])?);
            }
            b"data" => {
                let fmt = fmt.ok_or_else(|| Error::malformed("data chunk before fmt chunk"))?;
                let available = buffer.len() - body_start;
                let data_len = if chunk_size > available {
                    warn!(
                        "data chunk declares {} bytes but only {} remain, reading what is present",
                        chunk_size, available
                    );
                    available
                } else {
                    chunk_size
                };
                return Ok(decode_data(fmt, &buffer[body_start..body_start + data_len]));
            }
            other => {
                debug!(
                    "skipping chunk {:?} ({} bytes)",
                    String::from_utf8_lossy(other),
                    chunk_size
                );
            }
        }

        // RIFF chunks are word aligned.
        idx = body_start
            .saturating_add(chunk_size)
            .saturating_add(chunk_size & 1);
    }
}

fn decode_data(fmt: FmtChunk, data: &[u8]) -> Track {
    let channel_count = fmt.channel_count as usize;
    let block_align = fmt.bits_per_sample.bytes_per_sample() * channel_count;
    let frame_count = data.len() / block_align;

    let samples = decode_pcm(&data[..frame_count * block_align], fmt.bits_per_sample);
    let format = AudioFormat::new(
        fmt.channel_count,
        fmt.bits_per_sample,
        fmt.sample_rate,
        frame_count,
    );
    debug!(
        "decoded {} frames, {} channels, {}-bit, {} Hz",
        frame_count,
        fmt.channel_count,
        fmt.bits_per_sample.bits(),
        fmt.sample_rate
    );

    Track::new(format, SampleBuffer::from_interleaved(samples, channel_count))
}

/// Reads and decodes a WAV file in one pass.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<Track> {
    let path = path.as_ref();
    let buffer = fs::read(path)?;
    parse_wav(&buffer)
}

/// Serialises samples behind a canonical 44-byte PCM header. The channel
/// count, bit depth and sample rate come from `format`; the frame count
/// comes from `samples`. Samples are packed directly into the output.
pub fn generate_wav_buffer(format: &AudioFormat, samples: &SampleBuffer) -> Result<Bytes> {
    let channel_count = format.channel_count() as usize;
    if samples.channel_count() != channel_count {
        return Err(Error::malformed(format!(
            "buffer has {} channels but header declares {}",
            samples.channel_count(),
            channel_count
        )));
    }

    let bits_per_sample = format.bits_per_sample();
    let block_align = bits_per_sample.bytes_per_sample() * channel_count;
    let data_len = samples.samples().len() * bits_per_sample.bytes_per_sample();

    let data_size = u32::try_from(data_len)
        .ok()
        .filter(|size| size.checked_add(36).is_some())
        .ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "sample data exceeds the 4 GiB RIFF limit",
            )
        })?;
    let byte_rate = (format.sample_rate() as u64)
        .checked_mul(block_align as u64)
        .and_then(|rate| u32::try_from(rate).ok())
        .ok_or_else(|| {
            Error::malformed(format!(
                "byte rate of {} Hz x {} bytes does not fit the header",
                format.sample_rate(),
                block_align
            ))
        })?;
    let block_align = u16::try_from(block_align)
        .map_err(|_| Error::malformed(format!("block align {} does not fit", block_align)))?;

    let mut cursor = BytesMut::with_capacity(CANONICAL_HEADER_LEN + data_len);
    cursor.put_slice(b"RIFF");
    cursor.put_u32_le(36 + data_size);
    cursor.put_slice(b"WAVE");

    cursor.put_slice(b"fmt ");
    cursor.put_u32_le(FMT_CHUNK_LEN as u32);
    cursor.put_u16_le(WAVE_FORMAT_PCM);
    cursor.put_u16_le(format.channel_count());
    cursor.put_u32_le(format.sample_rate());
    cursor.put_u32_le(byte_rate);
    cursor.put_u16_le(block_align);
    cursor.put_u16_le(bits_per_sample.bits());

    cursor.put_slice(b"data");
    cursor.put_u32_le(data_size);
    put_pcm(&mut cursor, samples.samples(), bits_per_sample);

    Ok(cursor.freeze())
}

pub fn write_wav<P: AsRef<Path>>(
    path: P,
    format: &AudioFormat,
    samples: &SampleBuffer,
) -> Result<()> {
    let buffer = generate_wav_buffer(format, samples)?;
    fs::write(path.as_ref(), buffer)?;
    debug!(
        "wrote {} frames to {}",
        samples.frame_count(),
        path.as_ref().display()
    );
    Ok(())
}
