//! Builder for configuring and constructing a `Slicer`.

use crate::{Result, SliceReport};
use slicekit_core::{AudioBackend, FilenameTemplate, Region, SliceOptions};
use slicekit_io::{BitDepth, ResampleQuality, WavBackend};
use std::path::{Path, PathBuf};

#[cfg(feature = "analysis")]
use slicekit_analysis::SectionFinder;

/// Cuts WAV files into one file per region.
///
/// # Example
///
/// ```no_run
/// use slicekit::prelude::*;
///
/// let slicer = Slicer::builder()
///     .sample_rate(48000)
///     .exist_ok(true)
///     .build()?;
///
/// let regions = slicer.detect_regions("drums.wav", &SectionFinder::default())?;
/// slicer.slice("drums.wav", &regions)?;
/// # Ok::<(), slicekit::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Slicer {
    options: SliceOptions,
    bit_depth: Option<BitDepth>,
    resample_quality: ResampleQuality,
}

impl Slicer {
    pub fn builder() -> SlicerBuilder {
        SlicerBuilder::default()
    }

    pub fn options(&self) -> &SliceOptions {
        &self.options
    }

    /// The WAV backend this slicer writes through.
    pub fn backend(&self) -> WavBackend {
        let backend = WavBackend::new().resample_quality(self.resample_quality);
        match self.bit_depth {
            Some(depth) => backend.bit_depth(depth),
            None => backend,
        }
    }

    /// Slice `source_path` into one WAV file per region.
    pub fn slice(&self, source_path: impl AsRef<Path>, regions: &[Region]) -> Result<SliceReport> {
        let mut backend = self.backend();
        self.slice_with(&mut backend, source_path, regions)
    }

    /// Slice through a caller-provided backend.
    pub fn slice_with<B: AudioBackend>(
        &self,
        backend: &mut B,
        source_path: impl AsRef<Path>,
        regions: &[Region],
    ) -> Result<SliceReport> {
        Ok(slicekit_core::slice(
            backend,
            source_path.as_ref(),
            regions,
            &self.options,
        )?)
    }

    /// Find the sounds in `source_path` and return them as regions.
    ///
    /// The source is read at the configured sample rate and mixed down to
    /// mono, so the regions line up with what [`Slicer::slice`] reads.
    #[cfg(feature = "analysis")]
    pub fn detect_regions(
        &self,
        source_path: impl AsRef<Path>,
        finder: &SectionFinder,
    ) -> Result<Vec<Region>> {
        let source_path = source_path.as_ref();
        let mut source = slicekit_io::WavSource::open(
            source_path,
            self.options.sample_rate,
            self.resample_quality,
        )?;
        let samples = source.read_to_end()?;
        let mono = downmix(&samples, source.channels() as usize);

        tracing::debug!(
            "Analyzing '{}' ({} frames at {} Hz)",
            source_path.display(),
            mono.len(),
            source.sample_rate()
        );

        Ok(finder.find(&mono, source.sample_rate())?)
    }
}

/// Average interleaved channels into one analysis signal.
#[cfg(feature = "analysis")]
fn downmix(interleaved: &[f64], channels: usize) -> Vec<f32> {
    let channels = channels.max(1);
    interleaved
        .chunks_exact(channels)
        .map(|frame| (frame.iter().sum::<f64>() / channels as f64) as f32)
        .collect()
}

/// Consuming builder for [`Slicer`].
#[derive(Debug, Clone, Default)]
pub struct SlicerBuilder {
    sample_rate: u32,
    chunk_size: Option<usize>,
    output_dir: Option<PathBuf>,
    exist_ok: Option<bool>,
    filename_template: Option<String>,
    verbose: bool,
    bit_depth: Option<BitDepth>,
    resample_quality: ResampleQuality,
}

impl SlicerBuilder {
    /// Default: 0 (the source's native rate)
    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Default: 256
    pub fn chunk_size(mut self, frames: usize) -> Self {
        self.chunk_size = Some(frames);
        self
    }

    /// Default: the directory containing the source file
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Default: true
    pub fn exist_ok(mut self, exist_ok: bool) -> Self {
        self.exist_ok = Some(exist_ok);
        self
    }

    /// Default: `{basename}_{slice:02}.{ext}`
    pub fn filename_template(mut self, template: impl Into<String>) -> Self {
        self.filename_template = Some(template.into());
        self
    }

    /// Log every written slice at info level.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Default: the source's bit depth
    pub fn bit_depth(mut self, depth: BitDepth) -> Self {
        self.bit_depth = Some(depth);
        self
    }

    pub fn resample_quality(mut self, quality: ResampleQuality) -> Self {
        self.resample_quality = quality;
        self
    }

    pub fn build(self) -> Result<Slicer> {
        let defaults = SliceOptions::default();
        let filename_template = match self.filename_template {
            Some(template) => FilenameTemplate::parse(&template)?,
            None => defaults.filename_template,
        };

        let options = SliceOptions {
            sample_rate: self.sample_rate,
            chunk_size: self.chunk_size.unwrap_or(defaults.chunk_size),
            output_dir: self.output_dir,
            exist_ok: self.exist_ok.unwrap_or(defaults.exist_ok),
            filename_template,
            verbose: self.verbose,
        };
        options.validate()?;

        Ok(Slicer {
            options,
            bit_depth: self.bit_depth,
            resample_quality: self.resample_quality,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slicekit_core::memory::{MemoryAudio, MemoryBackend};

    #[test]
    fn test_builder_defaults() {
        let slicer = Slicer::builder().build().unwrap();
        let options = slicer.options();
        assert_eq!(options.chunk_size, 256);
        assert_eq!(options.sample_rate, 0);
        assert!(options.exist_ok);
        assert_eq!(options.filename_template, FilenameTemplate::default());
        assert_eq!(slicer.backend().output_depth(), BitDepth::Int16);
    }

    #[test]
    fn test_builder_rejects_bad_template_and_chunk() {
        let err = Slicer::builder()
            .filename_template("{nope}.wav")
            .build()
            .unwrap_err();
        assert!(err.is_invalid_argument());

        let err = Slicer::builder().chunk_size(0).build().unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_explicit_bit_depth_reaches_backend() {
        let slicer = Slicer::builder()
            .bit_depth(BitDepth::Float32)
            .build()
            .unwrap();
        assert_eq!(slicer.backend().output_depth(), BitDepth::Float32);
    }

    #[test]
    fn test_slice_with_memory_backend() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("ramp.wav");
        let samples: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let mut backend = MemoryBackend::new().with_source(&source, MemoryAudio::new(1, 8000, samples));

        let slicer = Slicer::builder().chunk_size(30).build().unwrap();
        let regions = [Region::new(10, 19).unwrap(), Region::open_ended(90)];
        let report = slicer.slice_with(&mut backend, &source, &regions).unwrap();

        assert_eq!(report.outputs.len(), 2);
        let first = backend.sink(dir.path().join("ramp_01.wav")).unwrap();
        assert_eq!(first.audio.samples, (10..20).map(|i| i as f64).collect::<Vec<_>>());
        let second = backend.sink(dir.path().join("ramp_02.wav")).unwrap();
        assert_eq!(second.audio.frames(), 10);
    }

    #[cfg(feature = "analysis")]
    #[test]
    fn test_downmix() {
        assert_eq!(downmix(&[1.0, 3.0, -1.0, 1.0], 2), vec![2.0, 0.0]);
        assert_eq!(downmix(&[0.5, 0.25], 1), vec![0.5, 0.25]);
    }
}
