//! # Slicekit Analysis
//!
//! Finds the regions of a recording worth slicing out.
//!
//! - **Transient detection**: onset detection using spectral flux and other methods
//! - **Silence**: hop level in dBFS against a threshold
//! - **Sections**: onsets and silence runs combined into [`Region`]s
//!
//! All functions operate on mono `&[f32]` sample buffers.
//!
//! ## Example
//!
//! ```rust
//! use slicekit_analysis::SectionFinder;
//!
//! let mut samples = vec![0.0f32; 44100];
//! for (i, sample) in samples[11025..22050].iter_mut().enumerate() {
//!     *sample = (i as f32 * 0.06).sin() * 0.5;
//! }
//!
//! let regions = SectionFinder::new().find(&samples, 44100)?;
//! for region in &regions {
//!     println!("{region}");
//! }
//! # Ok::<(), slicekit_core::Error>(())
//! ```
//!
//! [`Region`]: slicekit_core::Region

pub mod interval;
pub mod sections;
pub mod silence;
pub mod transient;

pub use interval::MinInterval;
pub use sections::SectionFinder;
pub use silence::{is_silent, level_db, DEFAULT_SILENCE_THRESHOLD_DB};
pub use transient::{DetectionMethod, Transient, TransientDetector};
