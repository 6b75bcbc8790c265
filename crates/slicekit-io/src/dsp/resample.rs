//! Audio resampling using rubato
//!
//! Provides high-quality sample rate conversion with SIMD optimization.

use crate::error::{FormatError, Result};
use rubato::{FftFixedIn, Resampler};

/// Resampling quality presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResampleQuality {
    /// Fast resampling (lower quality)
    Fast,
    /// Balanced quality/speed (default)
    #[default]
    Medium,
    /// High quality
    High,
    /// Best quality (slowest)
    Best,
}

impl ResampleQuality {
    fn chunk_size(&self) -> usize {
        match self {
            ResampleQuality::Fast => 512,
            ResampleQuality::Medium => 1024,
            ResampleQuality::High => 2048,
            ResampleQuality::Best => 4096,
        }
    }

    fn sub_chunks(&self) -> usize {
        match self {
            ResampleQuality::Fast => 1,
            ResampleQuality::Medium => 2,
            ResampleQuality::High => 4,
            ResampleQuality::Best => 8,
        }
    }
}

/// Resample planar audio (one `Vec` per channel) from `source_rate` to
/// `target_rate`.
///
/// The resampler's output delay is trimmed, so output frame `n` lines up
/// with input time `n / target_rate`. The result holds
/// `ceil(frames * target_rate / source_rate)` frames per channel.
pub fn resample_channels(
    input: &[Vec<f64>],
    source_rate: u32,
    target_rate: u32,
    quality: ResampleQuality,
) -> Result<Vec<Vec<f64>>> {
    if input.is_empty() {
        return Err(FormatError::InvalidData("No channels to resample".into()));
    }
    if source_rate == 0 || target_rate == 0 {
        return Err(FormatError::InvalidOptions(format!(
            "Cannot resample from {source_rate} Hz to {target_rate} Hz"
        )));
    }

    let input_frames = input[0].len();
    if input.iter().any(|channel| channel.len() != input_frames) {
        return Err(FormatError::InvalidData(
            "Channels have different lengths".into(),
        ));
    }

    if source_rate == target_rate || input_frames == 0 {
        return Ok(input.to_vec());
    }

    let chunk_size = quality.chunk_size();
    let mut resampler = FftFixedIn::<f64>::new(
        source_rate as usize,
        target_rate as usize,
        chunk_size,
        quality.sub_chunks(),
        input.len(),
    )?;

    let delay = resampler.output_delay();
    let expected_output_frames =
        (input_frames as f64 * target_rate as f64 / source_rate as f64).ceil() as usize;

    let mut output: Vec<Vec<f64>> = (0..input.len())
        .map(|_| Vec::with_capacity(expected_output_frames + delay + chunk_size))
        .collect();
    let mut chunk: Vec<Vec<f64>> = vec![Vec::with_capacity(chunk_size); input.len()];

    // Keep feeding (zero-padded past the end) until the delayed tail is out
    let mut pos = 0;
    while output[0].len() < expected_output_frames + delay {
        let needed = resampler.input_frames_next();
        for (buffer, channel) in chunk.iter_mut().zip(input) {
            buffer.clear();
            buffer.resize(needed, 0.0);
            if pos < input_frames {
                let copy_frames = needed.min(input_frames - pos);
                buffer[..copy_frames].copy_from_slice(&channel[pos..pos + copy_frames]);
            }
        }

        let processed = resampler.process(&chunk, None)?;
        for (out, frames) in output.iter_mut().zip(processed) {
            out.extend_from_slice(&frames);
        }
        pos += needed;
    }

    for out in output.iter_mut() {
        out.drain(..delay);
        out.truncate(expected_output_frames);
    }

    Ok(output)
}
