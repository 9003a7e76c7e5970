use crate::audio_bytes::extract_channels;
use crate::audio_types::{
    AudioFormat, SampleBuffer, MULTITRACK_CHANNELS, STEREO_CHANNELS, TRACK_COUNT,
};
use crate::error::{Error, Result};
use crate::wav::{read_wav, write_wav};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub format: AudioFormat,
    pub duration_secs: f64,
    pub tracks: Vec<PathBuf>,
}

/// `<parent>/<stem>_tracks` next to the input file.
pub fn default_output_dir(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(format!("{}_tracks", stem))
}

/// File name of stereo track `index` (0-based), numbered from 01.
pub fn track_file_name(index: usize) -> String {
    format!("track_{:02}.wav", index + 1)
}

/// Channels `2 * index` and `2 * index + 1` of a multitrack buffer.
pub fn split_track(samples: &SampleBuffer, index: usize) -> SampleBuffer {
    let stereo = STEREO_CHANNELS as usize;
    let data = extract_channels(samples.samples(), samples.channel_count(), index * stereo, stereo);
    SampleBuffer::from_interleaved(data, stereo)
}

/// Splits a 12-channel TP-7 recording into six stereo WAV files.
///
/// The output directory defaults to `<input-stem>_tracks` beside the input
/// and is created if missing. Nothing is created on disk unless the input
/// decodes as a 12-channel file.
pub fn export_multitrack(input: &Path, output_dir: Option<&Path>) -> Result<ExportReport> {
    if !input.exists() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Input file '{}' not found", input.display()),
        )));
    }

    let output_dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => default_output_dir(input),
    };

    let (format, samples) = read_wav(input)?.into_parts();
    if format.channel_count() != MULTITRACK_CHANNELS {
        return Err(Error::ChannelCountMismatch {
            path: input.to_path_buf(),
            expected: MULTITRACK_CHANNELS,
            found: format.channel_count(),
        });
    }

    info!("Input file: {}", input.display());
    info!(
        "Format: {} channels, {}-bit, {} Hz",
        format.channel_count(),
        format.bits_per_sample().bits(),
        format.sample_rate()
    );
    info!("Duration: {:.2} seconds", format.duration_secs());
    info!("Output directory: {}", output_dir.display());

    fs::create_dir_all(&output_dir)?;

    let stereo_format = format.with_shape(STEREO_CHANNELS, format.frame_count());
    let mut tracks = Vec::with_capacity(TRACK_COUNT);
    for index in 0..TRACK_COUNT {
        let output_file = output_dir.join(track_file_name(index));
        info!("Exporting track {} to {}", index + 1, track_file_name(index));

        let stereo = split_track(&samples, index);
        write_wav(&output_file, &stereo_format, &stereo)?;
        tracks.push(output_file);
    }

    info!(
        "Successfully exported {} stereo tracks to {}",
        TRACK_COUNT,
        output_dir.display()
    );

    Ok(ExportReport {
        input: input.to_path_buf(),
        output_dir,
        format,
        duration_secs: format.duration_secs(),
        tracks,
    })
}
