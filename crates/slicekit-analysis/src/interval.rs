//! Minimum inter-onset interval.

use slicekit_core::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Minimum distance between two onsets, in frames or wall-clock time.
///
/// Parses from `"12ms"`, `"1.5s"` or a bare frame count like `"512"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MinInterval {
    Frames(u64),
    Millis(f64),
    Seconds(f64),
}

impl Default for MinInterval {
    fn default() -> Self {
        MinInterval::Millis(12.0)
    }
}

impl MinInterval {
    /// The interval in frames at `sample_rate`, rounded to the nearest frame.
    pub fn to_frames(&self, sample_rate: u32) -> usize {
        match *self {
            MinInterval::Frames(frames) => frames as usize,
            MinInterval::Millis(ms) => (ms / 1000.0 * sample_rate as f64).round() as usize,
            MinInterval::Seconds(s) => (s * sample_rate as f64).round() as usize,
        }
    }
}

fn parse_duration(value: &str, original: &str) -> Result<f64> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(Error::InvalidArgument(format!(
            "invalid minimum interval {original:?}"
        ))),
    }
}

impl FromStr for MinInterval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Some(ms) = trimmed.strip_suffix("ms") {
            return Ok(MinInterval::Millis(parse_duration(ms, s)?));
        }
        if let Some(secs) = trimmed.strip_suffix('s') {
            return Ok(MinInterval::Seconds(parse_duration(secs, s)?));
        }
        trimmed
            .parse::<u64>()
            .map(MinInterval::Frames)
            .map_err(|_| Error::InvalidArgument(format!("invalid minimum interval {s:?}")))
    }
}

impl fmt::Display for MinInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinInterval::Frames(frames) => write!(f, "{frames}"),
            MinInterval::Millis(ms) => write!(f, "{ms}ms"),
            MinInterval::Seconds(s) => write!(f, "{s}s"),
        }
    }
}
