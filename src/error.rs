//! Error types for multitrack conversion.

use std::path::PathBuf;

/// Convenience result type using [`Error`] as the error variant.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors returned by the codec, the demultiplexer and the multiplexer.
///
/// Every variant aborts the current operation. The one recoverable
/// condition, a missing import input, is logged and never surfaces here
/// unless no inputs remain.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Opening, reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The RIFF/WAVE header is missing, truncated or not integer PCM.
    #[error("Malformed WAV header: {0}")]
    MalformedHeader(String),

    /// Bits per sample outside {16, 24, 32}.
    #[error("Unsupported bit depth: {0}")]
    UnsupportedBitDepth(u16),

    /// Wrong channel count for the operation (12 on export, 2 on import).
    #[error("Expected {expected} channels, but found {found} in {}", .path.display())]
    ChannelCountMismatch {
        path: PathBuf,
        expected: u16,
        found: u16,
    },

    /// An import input does not share the reference bit depth.
    #[error("Sample width mismatch in {}: {found}-bit vs {expected}-bit", .path.display())]
    SampleWidthMismatch {
        path: PathBuf,
        expected: u16,
        found: u16,
    },

    /// An import input does not share the reference sample rate.
    #[error("Sample rate mismatch in {}: {found} Hz vs {expected} Hz", .path.display())]
    SampleRateMismatch {
        path: PathBuf,
        expected: u32,
        found: u32,
    },

    /// More than six import inputs.
    #[error("TP-7 supports maximum 6 stereo tracks, got {0}")]
    TooManyTracks(usize),

    /// Every import input was missing.
    #[error("No valid input files found")]
    NoValidInputs,
}

impl Error {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedHeader(msg.into())
    }
}
