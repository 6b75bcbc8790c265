//! Audio file formats
//!
//! - `wav`: WAV via hound (pure Rust)

pub mod wav;
