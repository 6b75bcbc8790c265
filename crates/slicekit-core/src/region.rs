//! Regions: the caller's requests for one output file each.
//!
//! All positions are sample-frame indices into the source. Both ends are
//! inclusive; an end of `None` means "until the source is exhausted".

use crate::error::{Error, Result};
use std::fmt;

/// A closed interval of source frames to extract into its own file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Region {
    /// First frame of the region (inclusive)
    pub start_frame: u64,
    /// Last frame of the region (inclusive), `None` for open-ended
    pub end_frame: Option<u64>,
}

impl Region {
    /// Create a bounded region covering `[start_frame, end_frame]`.
    pub fn new(start_frame: u64, end_frame: u64) -> Result<Self> {
        if end_frame < start_frame {
            return Err(Error::invalid(format!(
                "region end {end_frame} precedes its start {start_frame}"
            )));
        }
        Ok(Self {
            start_frame,
            end_frame: Some(end_frame),
        })
    }

    /// Create a region running from `start_frame` to the end of the source.
    pub fn open_ended(start_frame: u64) -> Self {
        Self {
            start_frame,
            end_frame: None,
        }
    }

    /// Create a region from an optional end, as produced by region files
    /// and the command line.
    pub fn to_end(start_frame: u64, end_frame: Option<u64>) -> Result<Self> {
        match end_frame {
            Some(end) => Self::new(start_frame, end),
            None => Ok(Self::open_ended(start_frame)),
        }
    }

    pub fn is_open_ended(&self) -> bool {
        self.end_frame.is_none()
    }

    /// Nominal number of frames, `None` for open-ended regions.
    ///
    /// Saturates at `u64::MAX` for `[0, u64::MAX]`.
    pub fn len(&self) -> Option<u64> {
        self.end_frame
            .map(|end| (end - self.start_frame).saturating_add(1))
    }

    /// Whether `frame` lies inside the region.
    pub fn contains(&self, frame: u64) -> bool {
        frame >= self.start_frame && self.end_frame.map_or(true, |end| frame <= end)
    }

    fn check(&self) -> Result<()> {
        match self.end_frame {
            Some(end) if end < self.start_frame => Err(Error::invalid(format!(
                "region {self} ends before it starts"
            ))),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end_frame {
            Some(end) => write!(f, "[{}, {}]", self.start_frame, end),
            None => write!(f, "[{}, end]", self.start_frame),
        }
    }
}

/// Check a region list before any I/O happens.
///
/// The list must be non-empty, every region well-formed, and the regions
/// sorted ascending by `start_frame`. Unsorted input is rejected rather
/// than reordered, since output numbering follows input order.
pub fn validate_regions(regions: &[Region]) -> Result<()> {
    if regions.is_empty() {
        return Err(Error::invalid("no regions given"));
    }

    for region in regions {
        region.check()?;
    }

    if let Some(pair) = regions
        .windows(2)
        .find(|pair| pair[1].start_frame < pair[0].start_frame)
    {
        return Err(Error::invalid(format!(
            "regions must be sorted by start frame: {} follows {}",
            pair[1], pair[0]
        )));
    }

    Ok(())
}
