//! DSP utilities for audio I/O.

mod resample;

pub use resample::{resample_channels, ResampleQuality};
