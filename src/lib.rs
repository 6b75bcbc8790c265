//! # Slicekit - Streaming Audio Region Slicer
//!
//! Cuts one audio file into many, one per requested region, in a single
//! pass over the source.
//!
//! ## Architecture
//!
//! Slicekit is an umbrella crate that coordinates:
//! - **slicekit-core** - Regions, filename templates, backend traits, the streaming slicer
//! - **slicekit-io** - WAV source and sink via hound, resampling via rubato
//! - **slicekit-analysis** - Onset and silence analysis producing regions
//!
//! ## Quick Start
//!
//! ```no_run
//! use slicekit::prelude::*;
//!
//! let slicer = Slicer::builder()
//!     .output_dir("slices")
//!     .filename_template("{basename}-{timestamp_seconds}.{ext}")
//!     .build()?;
//!
//! let regions = [Region::new(0, 44099)?, Region::new(44100, 88199)?];
//! let report = slicer.slice("loop.wav", &regions)?;
//! for output in &report.outputs {
//!     println!("{} ({} frames)", output.path.display(), output.frames_written);
//! }
//! # Ok::<(), slicekit::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `analysis` (default) - Region discovery from onsets and silence
//! - `cli` (default) - The `slicesamples` binary
//! - `serialization` - serde derives on `Region` and `Transient`

/// Re-export of slicekit-core for direct access
pub use slicekit_core as core;

/// Re-export of slicekit-io for direct access
pub use slicekit_io as io;

pub use slicekit_core::{
    validate_regions, AudioBackend, AudioSink, AudioSource, FilenameTemplate, Region, SliceName,
    SliceOptions, SliceOutput, SliceReport, DEFAULT_CHUNK_SIZE, DEFAULT_TEMPLATE,
};

pub use slicekit_io::{BitDepth, ResampleQuality, WavBackend};

// Analysis tools
#[cfg(feature = "analysis")]
pub use slicekit_analysis as analysis;

#[cfg(feature = "analysis")]
pub use slicekit_analysis::{DetectionMethod, MinInterval, SectionFinder};

mod builder;
mod error;

pub use builder::{Slicer, SlicerBuilder};
pub use error::{Error, Result};

/// Slice a WAV file with default backend settings.
///
/// Output files are written at the source's bit depth.
pub fn slice(
    source_path: impl AsRef<std::path::Path>,
    regions: &[Region],
    options: &SliceOptions,
) -> Result<SliceReport> {
    let mut backend = WavBackend::new();
    Ok(slicekit_core::slice(
        &mut backend,
        source_path.as_ref(),
        regions,
        options,
    )?)
}

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{Slicer, SlicerBuilder};

    pub use crate::core::{FilenameTemplate, Region, SliceOptions, SliceReport};

    pub use crate::io::{BitDepth, WavBackend};

    #[cfg(feature = "analysis")]
    pub use crate::analysis::{MinInterval, SectionFinder};
}
