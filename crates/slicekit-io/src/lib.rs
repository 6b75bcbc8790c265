//! # Slicekit IO
//!
//! WAV reading and writing for the slicekit region slicer.
//!
//! - **Format**: streaming WAV source and sink via hound
//! - **DSP**: sample rate conversion via rubato
//! - **Backend**: [`WavBackend`], the [`slicekit_core::AudioBackend`] used
//!   for real files
//!
//! ```no_run
//! use slicekit_core::{slice, Region, SliceOptions};
//! use slicekit_io::WavBackend;
//! use std::path::Path;
//!
//! let regions = [Region::new(0, 44099)?, Region::open_ended(44100)];
//! let report = slice(
//!     &mut WavBackend::new(),
//!     Path::new("loop.wav"),
//!     &regions,
//!     &SliceOptions::default(),
//! )?;
//! println!("wrote {} slices", report.outputs.len());
//! # Ok::<(), slicekit_core::Error>(())
//! ```

pub mod backend;
pub mod dsp;
pub mod error;
pub mod format;

pub use backend::WavBackend;
pub use dsp::{resample_channels, ResampleQuality};
pub use error::{FormatError, Result};
pub use format::wav::{BitDepth, WavConfig, WavSink, WavSource};
