pub mod audio_bytes;
pub mod audio_types;
pub mod demux;
pub mod error;
pub mod mux;
pub mod test_utils;
pub mod wav;

pub use audio_types::{AudioFormat, BitDepth, SampleBuffer, Track};
pub use demux::{export_multitrack, ExportReport};
pub use error::{Error, Result};
pub use mux::{import_to_multitrack, ImportReport, SlotReport};
pub use wav::{read_wav, write_wav};
