//! Section finding: onsets and silence turned into slice regions.
//!
//! The signal is walked hop by hop. Each onset starts a section and closes
//! the previous one. A section ends either just before the first run of
//! `min_silent_hops` consecutive silent hops that follows its onset, or
//! just before the next onset, or at the last frame of the signal.

use crate::interval::MinInterval;
use crate::silence::{is_silent, DEFAULT_SILENCE_THRESHOLD_DB};
use crate::transient::{DetectionMethod, TransientDetector};
use slicekit_core::{Error, Region, Result};
use tracing::debug;

/// Finds sounds separated by onsets or silence.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionFinder {
    /// Onset detection function
    pub method: DetectionMethod,
    /// Frames per analysis hop
    pub hop_size: usize,
    /// FFT window size for onset detection
    pub buffer_size: usize,
    /// Onset peak picking threshold
    pub onset_threshold: f32,
    /// Minimum distance between onsets
    pub min_interval: MinInterval,
    /// Silent hops in a row needed to end a section
    pub min_silent_hops: usize,
    /// Level below which a hop counts as silent, in dBFS
    pub silence_threshold_db: f32,
}

impl Default for SectionFinder {
    fn default() -> Self {
        Self {
            method: DetectionMethod::default(),
            hop_size: 256,
            buffer_size: 512,
            onset_threshold: 0.3,
            min_interval: MinInterval::default(),
            min_silent_hops: 10,
            silence_threshold_db: DEFAULT_SILENCE_THRESHOLD_DB,
        }
    }
}

/// Silence run following the current onset.
#[derive(Debug, Clone, Copy)]
struct SilenceRun {
    start: u64,
    hops: usize,
}

impl SectionFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.hop_size == 0 {
            return Err(Error::InvalidArgument("hop size must be at least 1".into()));
        }
        if self.buffer_size < self.hop_size {
            return Err(Error::InvalidArgument(format!(
                "analysis buffer ({}) must not be smaller than the hop size ({})",
                self.buffer_size, self.hop_size
            )));
        }
        if self.silence_threshold_db.is_nan() {
            return Err(Error::InvalidArgument("silence threshold is NaN".into()));
        }
        Ok(())
    }

    /// Find the sections of mono `samples`.
    ///
    /// Returned regions are sorted and never overlap.
    pub fn find(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<Region>> {
        self.validate()?;
        if sample_rate == 0 {
            return Err(Error::InvalidArgument("sample rate must be non-zero".into()));
        }

        let mut detector =
            TransientDetector::with_params(sample_rate as f64, self.buffer_size, self.hop_size);
        detector.set_method(self.method);
        detector.set_threshold(self.onset_threshold);
        detector.set_min_gap(self.min_interval.to_frames(sample_rate));

        let transients = detector.detect(samples);
        let mut onsets = transients.iter().peekable();

        let hop_size = self.hop_size as u64;
        let mut sections = Vec::new();
        let mut signal_start: Option<u64> = None;
        let mut silence: Option<SilenceRun> = None;
        let mut section_end: Option<u64> = None;
        let mut onset_count = 0;
        let mut hops = 0;
        let mut nframes: u64 = 0;

        loop {
            let from = (nframes as usize).min(samples.len());
            let to = (from + self.hop_size).min(samples.len());
            let hop = &samples[from..to];
            let read = hop.len();

            if let Some(onset) =
                onsets.next_if(|t| (t.sample_position as u64) < nframes + hop_size)
            {
                onset_count += 1;
                debug!("Onset #{:02} detected at {:.4}s", onset_count, onset.time);

                let onset_frame = onset.sample_position as u64;
                if let Some(start) = signal_start {
                    let end = section_end.unwrap_or(onset_frame.saturating_sub(1));
                    sections.push(Region::new(start, end)?);
                }

                signal_start = Some(onset_frame);
                silence = None;
                section_end = None;
            } else if signal_start.is_some() && section_end.is_none() {
                if is_silent(hop, self.silence_threshold_db) {
                    let run = silence.get_or_insert(SilenceRun {
                        start: nframes,
                        hops: 0,
                    });
                    run.hops += 1;
                    if run.hops >= self.min_silent_hops {
                        section_end = Some(run.start.saturating_sub(1));
                    }
                } else {
                    silence = None;
                }
            }

            nframes += read as u64;
            hops += 1;

            if read < self.hop_size {
                break;
            }
        }

        if let Some(start) = signal_start {
            let end = section_end.unwrap_or(nframes.saturating_sub(1));
            sections.push(Region::new(start, end)?);
        }

        debug!(
            "Read frames={}, hops={}, hop_size={}: {} onsets, {} sections",
            nframes,
            hops,
            self.hop_size,
            onset_count,
            sections.len()
        );

        Ok(sections)
    }
}
