use crate::audio_bytes::insert_channels;
use crate::audio_types::{
    AudioFormat, SampleBuffer, Track, MULTITRACK_CHANNELS, STEREO_CHANNELS, TRACK_COUNT,
};
use crate::error::{Error, Result};
use crate::wav::{read_wav, write_wav};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What ended up in one stereo slot of the multitrack file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SlotReport {
    Active {
        source: PathBuf,
        frames: usize,
        padded_frames: usize,
    },
    Empty,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub output: PathBuf,
    pub format: AudioFormat,
    pub duration_secs: f64,
    pub skipped: Vec<PathBuf>,
    pub slots: Vec<SlotReport>,
}

impl ImportReport {
    pub fn active_tracks(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, SlotReport::Active { .. }))
            .count()
    }
}

/// Checks one input against the stereo requirement and, for every file
/// after the first, against the reference format.
fn validate(path: &Path, format: &AudioFormat, reference: Option<&AudioFormat>) -> Result<()> {
    if format.channel_count() != STEREO_CHANNELS {
        return Err(Error::ChannelCountMismatch {
            path: path.to_path_buf(),
            expected: STEREO_CHANNELS,
            found: format.channel_count(),
        });
    }

    let Some(reference) = reference else {
        return Ok(());
    };

    if format.bits_per_sample() != reference.bits_per_sample() {
        return Err(Error::SampleWidthMismatch {
            path: path.to_path_buf(),
            expected: reference.bits_per_sample().bits(),
            found: format.bits_per_sample().bits(),
        });
    }

    if format.sample_rate() != reference.sample_rate() {
        return Err(Error::SampleRateMismatch {
            path: path.to_path_buf(),
            expected: reference.sample_rate(),
            found: format.sample_rate(),
        });
    }

    Ok(())
}

/// Lays stereo tracks side by side in a 12-channel buffer. Track `i` lands
/// in channels `2i` and `2i + 1`; shorter tracks and unused slots stay
/// silent up to the longest track's length.
pub fn combine_tracks(tracks: &[&SampleBuffer]) -> SampleBuffer {
    assert!(tracks.len() <= TRACK_COUNT, "At most 6 stereo tracks");

    let channels = MULTITRACK_CHANNELS as usize;
    let stereo = STEREO_CHANNELS as usize;
    let max_frames = tracks.iter().map(|t| t.frame_count()).max().unwrap_or(0);

    let mut multitrack = SampleBuffer::silence(max_frames, channels);
    for (index, track) in tracks.iter().enumerate() {
        insert_channels(
            multitrack.samples_mut(),
            channels,
            track.samples(),
            stereo,
            index * stereo,
        );
    }
    multitrack
}

/// Combines up to six stereo WAV files into one TP-7 multitrack file.
///
/// Missing inputs are skipped with a warning. Every remaining input is
/// decoded and checked against the first before `output` is written.
pub fn import_to_multitrack<P: AsRef<Path>>(inputs: &[P], output: &Path) -> Result<ImportReport> {
    if inputs.len() > TRACK_COUNT {
        return Err(Error::TooManyTracks(inputs.len()));
    }

    let mut valid_files = Vec::with_capacity(inputs.len());
    let mut skipped = Vec::new();
    for input in inputs {
        let input = input.as_ref();
        if input.exists() {
            valid_files.push(input);
        } else {
            warn!("File '{}' not found, skipping", input.display());
            skipped.push(input.to_path_buf());
        }
    }

    if valid_files.is_empty() {
        return Err(Error::NoValidInputs);
    }
    info!("Found {} valid input file(s)", valid_files.len());

    let mut reference: Option<AudioFormat> = None;
    let mut tracks: Vec<Track> = Vec::with_capacity(valid_files.len());
    for (index, path) in valid_files.iter().enumerate() {
        info!(
            "Loading track {}: {}",
            index + 1,
            path.file_name().unwrap_or_default().to_string_lossy()
        );
        let track = read_wav(path)?;
        validate(path, track.format(), reference.as_ref())?;

        if reference.is_none() {
            let format = track.format();
            info!(
                "Reference format: {}-bit, {} Hz, {} frames",
                format.bits_per_sample().bits(),
                format.sample_rate(),
                format.frame_count()
            );
            reference = Some(*format);
        }
        tracks.push(track);
    }
    let reference = reference.ok_or(Error::NoValidInputs)?;

    let buffers: Vec<&SampleBuffer> = tracks.iter().map(Track::samples).collect();
    let multitrack = combine_tracks(&buffers);
    let max_frames = multitrack.frame_count();
    let format = reference.with_shape(MULTITRACK_CHANNELS, max_frames);
    info!(
        "Max track length: {} frames ({:.2} seconds)",
        max_frames,
        format.duration_secs()
    );

    let mut slots = Vec::with_capacity(TRACK_COUNT);
    for (index, (path, track)) in valid_files.iter().zip(&tracks).enumerate() {
        let frames = track.format().frame_count();
        let padded_frames = max_frames - frames;
        if padded_frames > 0 {
            info!(
                "Track {}: Padding {} frames with silence",
                index + 1,
                padded_frames
            );
        }
        slots.push(SlotReport::Active {
            source: path.to_path_buf(),
            frames,
            padded_frames,
        });
    }
    for index in tracks.len()..TRACK_COUNT {
        info!("Track {}: Empty (silence)", index + 1);
        slots.push(SlotReport::Empty);
    }

    info!("Writing TP-7 multitrack file: {}", output.display());
    write_wav(output, &format, &multitrack)?;
    info!(
        "Successfully created TP-7 multitrack file with {} active tracks",
        tracks.len()
    );

    Ok(ImportReport {
        output: output.to_path_buf(),
        format,
        duration_secs: format.duration_secs(),
        skipped,
        slots,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_types::BitDepth;
    use crate::demux::export_multitrack;
    use crate::test_utils::{constant_channels, ramp, write_fixture, TrackSummary};

    #[test]
    fn test_combine_tracks_slots_in_order() {
        let a = SampleBuffer::from_interleaved(vec![1, 2, 3, 4], 2);
        let b = SampleBuffer::from_interleaved(vec![5, 6], 2);
        let out = combine_tracks(&[&a, &b]);

        assert_eq!(out.frame_count(), 2);
        assert_eq!(out.frame(0), &[1, 2, 5, 6, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(out.frame(1), &[3, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_combine_no_tracks_is_empty() {
        let out = combine_tracks(&[]);
        assert_eq!(out.frame_count(), 0);
        assert_eq!(out.channel_count(), 12);
    }

    #[test]
    fn test_import_pads_short_tracks_with_silence() {
        let dir = tempfile::tempdir().unwrap();
        let long = dir.path().join("long.wav");
        let short = dir.path().join("short.wav");
        write_fixture(&long, BitDepth::Bits16, 48_000, &ramp(100, 2, 1)).unwrap();
        write_fixture(&short, BitDepth::Bits16, 48_000, &ramp(50, 2, 1)).unwrap();
        let output = dir.path().join("multi.wav");

        let report = import_to_multitrack(&[&long, &short], &output).unwrap();

        assert_eq!(report.active_tracks(), 2);
        assert_eq!(
            report.slots[1],
            SlotReport::Active {
                source: short.clone(),
                frames: 50,
                padded_frames: 50,
            }
        );
        assert!(report.slots[2..].iter().all(|s| *s == SlotReport::Empty));

        let (format, samples) = read_wav(&output).unwrap().into_parts();
        assert_eq!(format.channel_count(), 12);
        assert_eq!(format.frame_count(), 100);

        let summary = TrackSummary::of(&samples);
        assert_eq!(summary.last_non_zero[2], Some(49));
        assert_eq!(summary.last_non_zero[3], Some(49));
        assert!(samples.frames().take(50).all(|f| f[2] != 0 && f[3] != 0));
        assert!(samples.frames().skip(50).all(|f| f[2] == 0 && f[3] == 0));
        for channel in 4..12 {
            assert_eq!(summary.last_non_zero[channel], None);
        }
    }

    #[test]
    fn test_import_rejects_sample_rate_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.wav");
        let b = dir.path().join("b.wav");
        write_fixture(&a, BitDepth::Bits24, 48_000, &ramp(10, 2, 1)).unwrap();
        write_fixture(&b, BitDepth::Bits24, 44_100, &ramp(10, 2, 1)).unwrap();
        let output = dir.path().join("multi.wav");

        let err = import_to_multitrack(&[&a, &b], &output).unwrap_err();

        assert!(matches!(
            err,
            Error::SampleRateMismatch {
                expected: 48_000,
                found: 44_100,
                ..
            }
        ));
        assert!(!output.exists());
    }

    #[test]
    fn test_import_rejects_sample_width_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.wav");
        let b = dir.path().join("b.wav");
        write_fixture(&a, BitDepth::Bits24, 48_000, &ramp(10, 2, 1)).unwrap();
        write_fixture(&b, BitDepth::Bits16, 48_000, &ramp(10, 2, 1)).unwrap();
        let output = dir.path().join("multi.wav");

        let err = import_to_multitrack(&[&a, &b], &output).unwrap_err();

        assert!(matches!(
            err,
            Error::SampleWidthMismatch {
                expected: 24,
                found: 16,
                ..
            }
        ));
        assert!(!output.exists());
    }

    #[test]
    fn test_import_rejects_mono() {
        let dir = tempfile::tempdir().unwrap();
        let mono = dir.path().join("mono.wav");
        write_fixture(&mono, BitDepth::Bits16, 48_000, &constant_channels(10, 1)).unwrap();

        let err = import_to_multitrack(&[&mono], &dir.path().join("multi.wav")).unwrap_err();
        assert!(matches!(
            err,
            Error::ChannelCountMismatch {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_import_rejects_mono_after_reference() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.wav");
        let mono = dir.path().join("mono.wav");
        write_fixture(&a, BitDepth::Bits16, 48_000, &ramp(10, 2, 1)).unwrap();
        write_fixture(&mono, BitDepth::Bits16, 48_000, &constant_channels(10, 1)).unwrap();

        let err = import_to_multitrack(&[&a, &mono], &dir.path().join("multi.wav")).unwrap_err();
        assert!(matches!(err, Error::ChannelCountMismatch { found: 1, .. }));
    }

    #[test]
    fn test_import_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.wav");
        let present = dir.path().join("present.wav");
        write_fixture(&present, BitDepth::Bits32, 96_000, &constant_channels(5, 2)).unwrap();
        let output = dir.path().join("multi.wav");

        let report = import_to_multitrack(&[&missing, &present], &output).unwrap();

        assert_eq!(report.skipped, vec![missing]);
        assert_eq!(report.active_tracks(), 1);
        let (format, samples) = read_wav(&output).unwrap().into_parts();
        assert_eq!(format.bits_per_sample(), BitDepth::Bits32);
        assert_eq!(format.sample_rate(), 96_000);
        // first valid input takes the first slot
        assert!(samples.frames().all(|f| f[0] == 0 && f[1] == 1 && f[2] == 0));
    }

    #[test]
    fn test_import_no_valid_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let err = import_to_multitrack(
            &[dir.path().join("a.wav"), dir.path().join("b.wav")],
            &dir.path().join("multi.wav"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::NoValidInputs));
    }

    #[test]
    fn test_import_too_many_tracks() {
        let dir = tempfile::tempdir().unwrap();
        let inputs: Vec<PathBuf> = (0..7)
            .map(|i| dir.path().join(format!("{}.wav", i)))
            .collect();
        let output = dir.path().join("multi.wav");
        let err = import_to_multitrack(inputs.as_slice(), &output).unwrap_err();
        assert!(matches!(err, Error::TooManyTracks(7)));
    }

    #[test]
    fn test_import_write_failure_is_io() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.wav");
        write_fixture(&input, BitDepth::Bits16, 48_000, &ramp(10, 2, 1)).unwrap();
        let output = dir.path().join("no/such/dir/out.wav");

        let err = import_to_multitrack(&[&input], &output).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_export_then_import_roundtrip() {
        for depth in [BitDepth::Bits16, BitDepth::Bits24, BitDepth::Bits32] {
            let dir = tempfile::tempdir().unwrap();
            let original = dir.path().join("take.wav");
            let samples = match depth {
                BitDepth::Bits16 => ramp(300, 12, 9),
                _ => SampleBuffer::from_interleaved(
                    (0..300 * 12).map(|v| (v - 1800) * 4_093).collect(),
                    12,
                ),
            };
            write_fixture(&original, depth, 44_100, &samples).unwrap();

            let exported = export_multitrack(&original, None).unwrap();
            let rebuilt = dir.path().join("rebuilt.wav");
            import_to_multitrack(exported.tracks.as_slice(), &rebuilt).unwrap();

            let (a_format, a_samples) = read_wav(&original).unwrap().into_parts();
            let (b_format, b_samples) = read_wav(&rebuilt).unwrap().into_parts();
            assert_eq!(a_format, b_format);
            assert_eq!(a_samples, b_samples);
        }
    }
}
