//! [`AudioBackend`] over WAV files.

use crate::dsp::ResampleQuality;
use crate::format::wav::{BitDepth, WavConfig, WavSink, WavSource};
use slicekit_core::{AudioBackend, Result};
use std::path::Path;

/// Reads and writes WAV files through hound.
///
/// Slices are written at the bit depth of the last opened source unless an
/// explicit depth is set, so 16 and 24-bit sources are cut without
/// requantization.
#[derive(Debug, Clone, Default)]
pub struct WavBackend {
    bit_depth: Option<BitDepth>,
    resample_quality: ResampleQuality,
    source_depth: Option<BitDepth>,
}

impl WavBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the output bit depth.
    pub fn bit_depth(mut self, depth: BitDepth) -> Self {
        self.bit_depth = Some(depth);
        self
    }

    /// Quality used when a source is opened at a non-native rate.
    pub fn resample_quality(mut self, quality: ResampleQuality) -> Self {
        self.resample_quality = quality;
        self
    }

    /// Bit depth new sinks will be written with.
    pub fn output_depth(&self) -> BitDepth {
        self.bit_depth.or(self.source_depth).unwrap_or_default()
    }
}

impl AudioBackend for WavBackend {
    type Source = WavSource;
    type Sink = WavSink;

    fn open_source(&mut self, path: &Path, sample_rate: u32) -> Result<WavSource> {
        let source = WavSource::open(path, sample_rate, self.resample_quality)?;
        tracing::debug!(
            "Opened '{}': {} ch, {} Hz, {:?}, {} frames",
            path.display(),
            source.channels(),
            source.sample_rate(),
            source.bit_depth(),
            source.total_frames()
        );
        self.source_depth = Some(source.bit_depth());
        Ok(source)
    }

    fn open_sink(&mut self, path: &Path, sample_rate: u32, channels: u16) -> Result<WavSink> {
        let config = WavConfig::new(sample_rate, channels, self.output_depth());
        Ok(WavSink::create(path, config)?)
    }

    fn extension(&self) -> &str {
        "wav"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
    use slicekit_core::{AudioSink, AudioSource};
    use tempfile::tempdir;

    fn write_fixture(path: &Path, bits: u16) {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: bits,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for i in 0..16i32 {
            writer.write_sample(i * 1000 - 8000).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_output_depth_follows_source() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in24.wav");
        let output = dir.path().join("out.wav");
        write_fixture(&input, 24);

        let mut backend = WavBackend::new();
        assert_eq!(backend.output_depth(), BitDepth::Int16);

        let mut source = backend.open_source(&input, 0).unwrap();
        assert_eq!(backend.output_depth(), BitDepth::Int24);

        let mut buffer = vec![0.0f64; 16];
        assert_eq!(source.read(&mut buffer).unwrap(), 16);

        let mut sink = backend.open_sink(&output, 48000, 1).unwrap();
        sink.write(&buffer).unwrap();
        sink.close().unwrap();

        let mut reader = WavReader::open(&output).unwrap();
        assert_eq!(reader.spec().bits_per_sample, 24);
        let samples: Vec<i32> = reader.samples::<i32>().map(|s| s.unwrap()).collect();
        let expected: Vec<i32> = (0..16).map(|i| i * 1000 - 8000).collect();
        assert_eq!(samples, expected);
    }

    #[test]
    fn test_explicit_depth_wins() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in16.wav");
        write_fixture(&input, 16);

        let mut backend = WavBackend::new().bit_depth(BitDepth::Float32);
        backend.open_source(&input, 0).unwrap();
        assert_eq!(backend.output_depth(), BitDepth::Float32);
    }

    #[test]
    fn test_missing_source_maps_to_io_error() {
        let dir = tempdir().unwrap();
        let mut backend = WavBackend::new();
        let result = backend.open_source(&dir.path().join("missing.wav"), 0);
        assert!(matches!(result, Err(slicekit_core::Error::Io(_))));
    }
}
