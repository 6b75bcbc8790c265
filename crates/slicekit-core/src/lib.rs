//! # slicekit-core
//!
//! Streaming region slicer: reads an audio source once and writes one
//! output per region, handling overlapping regions and sources shorter
//! than the requested ranges.
//!
//! File formats are out of scope here. The slicer talks to an
//! [`AudioBackend`]; `slicekit-io` provides the WAV backend and
//! [`memory::MemoryBackend`] keeps everything in memory.
//!
//! ## Example
//!
//! ```rust
//! use slicekit_core::memory::{MemoryAudio, MemoryBackend};
//! use slicekit_core::{slice, Region, SliceOptions};
//!
//! let samples: Vec<f64> = (0..200).map(|i| i as f64).collect();
//! let mut backend = MemoryBackend::new()
//!     .with_source("in/loop.wav", MemoryAudio::new(2, 44100, samples));
//!
//! let regions = [Region::new(0, 49)?, Region::new(50, 99)?];
//! let options = SliceOptions {
//!     chunk_size: 30,
//!     output_dir: Some("out".into()),
//!     ..Default::default()
//! };
//! # let dir = tempfile::tempdir()?;
//! # let options = SliceOptions { output_dir: Some(dir.path().to_path_buf()), ..options };
//! let report = slice(&mut backend, "in/loop.wav".as_ref(), &regions, &options)?;
//! assert_eq!(report.outputs.len(), 2);
//! assert_eq!(report.outputs[0].frames_written, 50);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backend;
pub mod error;
pub mod memory;
mod options;
mod region;
mod slicer;
pub mod template;

pub use backend::{AudioBackend, AudioSink, AudioSource};
pub use error::{Error, Result};
pub use options::{SliceOptions, DEFAULT_CHUNK_SIZE};
pub use region::{validate_regions, Region};
pub use slicer::{slice, ActiveSlice, SliceOutput, SliceReport};
pub use template::{FilenameTemplate, SliceName, DEFAULT_TEMPLATE};
