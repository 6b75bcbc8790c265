//! Capability traits for the audio I/O collaborator.
//!
//! The slicer never touches a file format itself. A backend opens sources
//! for frame-wise reading and sinks for frame-wise writing; all buffers
//! are interleaved `f64` frames, wide enough for 32-bit integer PCM.

use crate::error::Result;
use std::path::Path;

/// A readable, frame-streamable audio resource.
pub trait AudioSource {
    fn channels(&self) -> u16;

    /// Effective sample rate (after any resampling).
    fn sample_rate(&self) -> u32;

    /// Total number of frames, if known up front.
    fn total_frames(&self) -> Option<u64> {
        None
    }

    /// Fill `buffer` with interleaved frames, returning the number of frames
    /// read. `buffer.len()` is a multiple of `channels()`. Fewer frames than
    /// requested are returned only at end of stream.
    fn read(&mut self, buffer: &mut [f64]) -> Result<usize>;
}

/// A writable audio resource opened for one slice.
pub trait AudioSink {
    /// Append interleaved frames with the channel count the sink was
    /// opened with.
    fn write(&mut self, frames: &[f64]) -> Result<()>;

    /// Flush and release. Called exactly once.
    fn close(self) -> Result<()>;
}

/// Opens sources and sinks.
pub trait AudioBackend {
    type Source: AudioSource;
    type Sink: AudioSink;

    /// Open `path` for reading at `sample_rate` (0 = native rate).
    fn open_source(&mut self, path: &Path, sample_rate: u32) -> Result<Self::Source>;

    fn open_sink(&mut self, path: &Path, sample_rate: u32, channels: u16) -> Result<Self::Sink>;

    /// File extension of the sinks this backend writes (without dot).
    fn extension(&self) -> &str;
}
