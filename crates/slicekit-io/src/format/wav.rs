//! WAV format reader and writer using hound
//!
//! Reads 8 to 32-bit integer and 32-bit float PCM, writes 16, 24, 32-bit
//! integer and 32-bit float. Samples travel as interleaved `f64` in
//! [-1.0, 1.0), which holds every 32-bit integer sample exactly. Integer
//! conversions scale by `2^(bits-1)` so a file written at its source bit
//! depth holds the source samples unchanged.

use crate::dsp::{resample_channels, ResampleQuality};
use crate::error::{FormatError, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Bit depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitDepth {
    #[default]
    Int16,
    Int24,
    Int32,
    Float32,
}

impl BitDepth {
    /// Bits per sample.
    pub fn bits(&self) -> u16 {
        match self {
            BitDepth::Int16 => 16,
            BitDepth::Int24 => 24,
            BitDepth::Int32 | BitDepth::Float32 => 32,
        }
    }

    /// Smallest supported depth holding every sample of `spec` exactly.
    pub fn from_spec(spec: &WavSpec) -> Self {
        match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Float, _) => BitDepth::Float32,
            (SampleFormat::Int, 0..=16) => BitDepth::Int16,
            (SampleFormat::Int, 17..=24) => BitDepth::Int24,
            (SampleFormat::Int, _) => BitDepth::Int32,
        }
    }
}

/// WAV writer configuration
#[derive(Debug, Clone)]
pub struct WavConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Bit depth
    pub bit_depth: BitDepth,
    /// Number of interleaved channels
    pub channels: u16,
}

impl Default for WavConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            bit_depth: BitDepth::Int16,
            channels: 2,
        }
    }
}

impl WavConfig {
    pub fn new(sample_rate: u32, channels: u16, bit_depth: BitDepth) -> Self {
        Self {
            sample_rate,
            bit_depth,
            channels,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.channels == 0 {
            return Err(FormatError::InvalidOptions(
                "WAV output needs at least one channel".into(),
            ));
        }
        if self.sample_rate == 0 {
            return Err(FormatError::InvalidOptions(
                "WAV output needs a non-zero sample rate".into(),
            ));
        }
        Ok(())
    }
}

/// Create hound WavSpec from our config
fn create_wav_spec(config: &WavConfig) -> WavSpec {
    let sample_format = match config.bit_depth {
        BitDepth::Float32 => SampleFormat::Float,
        _ => SampleFormat::Int,
    };

    WavSpec {
        channels: config.channels,
        sample_rate: config.sample_rate,
        bits_per_sample: config.bit_depth.bits(),
        sample_format,
    }
}

enum Samples {
    /// Decoding straight from the file
    Stream {
        reader: WavReader<BufReader<File>>,
        spec: WavSpec,
    },
    /// Decoded (and resampled) up front
    Buffered { samples: Vec<f64>, position: usize },
}

/// Frame-wise WAV reader.
pub struct WavSource {
    channels: u16,
    sample_rate: u32,
    bit_depth: BitDepth,
    total_frames: u64,
    samples: Samples,
}

impl WavSource {
    /// Open `path` for reading at `sample_rate` (0 = native rate).
    ///
    /// At the native rate samples are decoded lazily as frames are read.
    /// Any other rate decodes and resamples the whole file on open.
    pub fn open(
        path: impl AsRef<Path>,
        sample_rate: u32,
        quality: ResampleQuality,
    ) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = WavReader::open(path)?;
        let spec = reader.spec();
        if spec.channels == 0 {
            return Err(FormatError::InvalidData(format!(
                "'{}' declares zero channels",
                path.display()
            )));
        }

        let bit_depth = BitDepth::from_spec(&spec);
        let native_frames = reader.duration() as u64;

        if sample_rate == 0 || sample_rate == spec.sample_rate {
            return Ok(Self {
                channels: spec.channels,
                sample_rate: spec.sample_rate,
                bit_depth,
                total_frames: native_frames,
                samples: Samples::Stream { reader, spec },
            });
        }

        let total_samples = native_frames as usize * spec.channels as usize;
        let mut interleaved = vec![0.0f64; total_samples];
        let read = read_samples(&mut reader, &spec, &mut interleaved)?;
        interleaved.truncate(read - read % spec.channels as usize);

        let planar = deinterleave(&interleaved, spec.channels as usize);
        let resampled = resample_channels(&planar, spec.sample_rate, sample_rate, quality)?;
        let samples = interleave(&resampled);
        let total_frames = resampled.first().map_or(0, Vec::len) as u64;

        tracing::debug!(
            "Resampled '{}' from {} Hz to {} Hz ({} -> {} frames)",
            path.display(),
            spec.sample_rate,
            sample_rate,
            native_frames,
            total_frames
        );

        Ok(Self {
            channels: spec.channels,
            sample_rate,
            bit_depth,
            total_frames,
            samples: Samples::Buffered {
                samples,
                position: 0,
            },
        })
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Bit depth that stores this file's samples without loss.
    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    /// Total frames at the effective sample rate.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Fill `buffer` with interleaved frames, returning the number of
    /// complete frames read.
    pub fn read_frames(&mut self, buffer: &mut [f64]) -> Result<usize> {
        let channels = self.channels as usize;
        let wanted = buffer.len() - buffer.len() % channels;

        let read = match &mut self.samples {
            Samples::Stream { reader, spec } => read_samples(reader, spec, &mut buffer[..wanted])?,
            Samples::Buffered { samples, position } => {
                let count = wanted.min(samples.len() - *position);
                buffer[..count].copy_from_slice(&samples[*position..*position + count]);
                *position += count;
                count
            }
        };

        Ok(read / channels)
    }

    /// Read every remaining frame.
    pub fn read_to_end(&mut self) -> Result<Vec<f64>> {
        let channels = self.channels as usize;
        let mut samples = Vec::with_capacity(self.total_frames as usize * channels);
        let mut chunk = vec![0.0f64; 4096 * channels];
        loop {
            let frames = self.read_frames(&mut chunk)?;
            samples.extend_from_slice(&chunk[..frames * channels]);
            if frames < 4096 {
                break;
            }
        }
        Ok(samples)
    }
}

impl slicekit_core::AudioSource for WavSource {
    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_frames(&self) -> Option<u64> {
        Some(self.total_frames)
    }

    fn read(&mut self, buffer: &mut [f64]) -> slicekit_core::Result<usize> {
        Ok(self.read_frames(buffer)?)
    }
}

/// Decode up to `buffer.len()` samples, returning how many were decoded.
fn read_samples(
    reader: &mut WavReader<BufReader<File>>,
    spec: &WavSpec,
    buffer: &mut [f64],
) -> Result<usize> {
    let mut count = 0;
    match spec.sample_format {
        SampleFormat::Float => {
            for (slot, sample) in buffer.iter_mut().zip(reader.samples::<f32>()) {
                *slot = sample? as f64;
                count += 1;
            }
        }
        SampleFormat::Int => {
            let scale = int_scale(spec.bits_per_sample);
            for (slot, sample) in buffer.iter_mut().zip(reader.samples::<i32>()) {
                *slot = sample? as f64 / scale;
                count += 1;
            }
        }
    }
    Ok(count)
}

/// Frame-wise WAV writer.
pub struct WavSink {
    writer: WavWriter<BufWriter<File>>,
    config: WavConfig,
    frames_written: u64,
}

impl WavSink {
    pub fn create(path: impl AsRef<Path>, config: WavConfig) -> Result<Self> {
        config.validate()?;
        let writer = WavWriter::create(path, create_wav_spec(&config))?;
        Ok(Self {
            writer,
            config,
            frames_written: 0,
        })
    }

    pub fn config(&self) -> &WavConfig {
        &self.config
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Append interleaved frames.
    pub fn write_frames(&mut self, interleaved: &[f64]) -> Result<()> {
        let channels = self.config.channels as usize;
        if interleaved.len() % channels != 0 {
            return Err(FormatError::InvalidData(format!(
                "{} samples do not form whole {}-channel frames",
                interleaved.len(),
                channels
            )));
        }

        match self.config.bit_depth {
            BitDepth::Int16 => {
                for &sample in interleaved {
                    self.writer.write_sample(float_to_i16(sample))?;
                }
            }
            BitDepth::Int24 => {
                for &sample in interleaved {
                    self.writer.write_sample(float_to_i24(sample))?;
                }
            }
            BitDepth::Int32 => {
                for &sample in interleaved {
                    self.writer.write_sample(float_to_i32(sample))?;
                }
            }
            BitDepth::Float32 => {
                for &sample in interleaved {
                    self.writer.write_sample(sample as f32)?;
                }
            }
        }

        self.frames_written += (interleaved.len() / channels) as u64;
        Ok(())
    }

    /// Write the final header and flush.
    pub fn finalize(self) -> Result<()> {
        self.writer.finalize()?;
        Ok(())
    }
}

impl slicekit_core::AudioSink for WavSink {
    fn write(&mut self, frames: &[f64]) -> slicekit_core::Result<()> {
        Ok(self.write_frames(frames)?)
    }

    fn close(self) -> slicekit_core::Result<()> {
        Ok(self.finalize()?)
    }
}

fn int_scale(bits: u16) -> f64 {
    (1u64 << (bits.clamp(1, 32) - 1)) as f64
}

/// Convert float sample to 16-bit integer with clipping
#[inline]
fn float_to_i16(sample: f64) -> i16 {
    (sample * 32768.0).round().clamp(-32768.0, 32767.0) as i16
}

/// Convert float sample to 24-bit integer (stored as i32) with clipping
#[inline]
fn float_to_i24(sample: f64) -> i32 {
    (sample * 8388608.0)
        .round()
        .clamp(-8388608.0, 8388607.0) as i32
}

/// Convert float sample to 32-bit integer with clipping
#[inline]
fn float_to_i32(sample: f64) -> i32 {
    (sample * 2147483648.0)
        .round()
        .clamp(-2147483648.0, 2147483647.0) as i32
}

fn deinterleave(interleaved: &[f64], channels: usize) -> Vec<Vec<f64>> {
    let frames = interleaved.len() / channels;
    (0..channels)
        .map(|channel| {
            (0..frames)
                .map(|frame| interleaved[frame * channels + channel])
                .collect()
        })
        .collect()
}

fn interleave(planar: &[Vec<f64>]) -> Vec<f64> {
    let frames = planar.first().map_or(0, Vec::len);
    let mut interleaved = Vec::with_capacity(frames * planar.len());
    for frame in 0..frames {
        for channel in planar {
            interleaved.push(channel[frame]);
        }
    }
    interleaved
}
