//! Transient detection for audio analysis
//!
//! Onset detection for finding where sounds start in a recording.
//! Every detection function is rectified so only rising content produces
//! peaks; peaks are picked against an adaptive threshold and thinned to a
//! minimum gap.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Default FFT size for analysis
const DEFAULT_FFT_SIZE: usize = 512;

/// Default hop size (samples between analysis frames)
const DEFAULT_HOP_SIZE: usize = 256;

const DEFAULT_THRESHOLD: f32 = 0.3;

/// A detected transient/onset
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Transient {
    /// Sample position of the transient
    pub sample_position: usize,
    /// Time position in seconds
    pub time: f64,
    /// Strength/confidence of detection (0.0 - 1.0)
    pub strength: f32,
}

/// Transient detection algorithm type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum DetectionMethod {
    /// Spectral flux (default, good for most audio)
    #[default]
    SpectralFlux,
    /// High-frequency content (good for percussive material)
    HighFrequencyContent,
    /// Energy-based (simple, fast)
    Energy,
    /// Rectified complex domain (magnitude and phase deviation)
    ComplexDomain,
}

impl DetectionMethod {
    /// Parse a method name as accepted on the command line.
    ///
    /// `default` selects spectral flux.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "default" | "specflux" | "specdiff" => Some(DetectionMethod::SpectralFlux),
            "hfc" => Some(DetectionMethod::HighFrequencyContent),
            "energy" => Some(DetectionMethod::Energy),
            "complex" | "complexdomain" => Some(DetectionMethod::ComplexDomain),
            _ => None,
        }
    }
}

/// Transient detector for audio analysis
pub struct TransientDetector {
    /// Sample rate
    sample_rate: f64,
    /// FFT size
    fft_size: usize,
    /// Hop size (samples between frames)
    hop_size: usize,
    /// Peak picking threshold
    threshold: f32,
    /// Minimum gap between detections in samples
    min_gap: usize,
    /// Detection method
    method: DetectionMethod,
    fft: Arc<dyn Fft<f32>>,
    /// Window function
    window: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    /// Previous magnitude spectrum (for flux calculation)
    prev_magnitudes: Vec<f32>,
    prev_phases: Vec<f32>,
    prev_prev_phases: Vec<f32>,
    /// Previous scalar value for the energy and HFC functions
    prev_value: f32,
}

impl TransientDetector {
    /// Create a new transient detector
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz
    pub fn new(sample_rate: f64) -> Self {
        Self::with_params(sample_rate, DEFAULT_FFT_SIZE, DEFAULT_HOP_SIZE)
    }

    /// Create with custom FFT and hop size
    pub fn with_params(sample_rate: f64, fft_size: usize, hop_size: usize) -> Self {
        let hop_size = hop_size.max(1);
        let fft_size = fft_size.max(2).next_power_of_two();
        let bins = fft_size / 2;

        Self {
            sample_rate,
            fft_size,
            hop_size,
            threshold: DEFAULT_THRESHOLD,
            min_gap: (sample_rate * 0.012).round() as usize,
            method: DetectionMethod::SpectralFlux,
            fft: FftPlanner::new().plan_fft_forward(fft_size),
            window: Self::create_hann_window(fft_size),
            spectrum: vec![Complex::new(0.0, 0.0); fft_size],
            prev_magnitudes: vec![0.0; bins],
            prev_phases: vec![0.0; bins],
            prev_prev_phases: vec![0.0; bins],
            prev_value: 0.0,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Set the peak picking threshold. Higher values need stronger peaks.
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold.max(0.0);
    }

    /// Set minimum gap between detections in samples
    pub fn set_min_gap(&mut self, frames: usize) {
        self.min_gap = frames;
    }

    /// Set minimum gap between detections in milliseconds
    pub fn set_min_gap_ms(&mut self, gap_ms: f32) {
        self.min_gap = (gap_ms as f64 / 1000.0 * self.sample_rate).round() as usize;
    }

    /// Set detection method
    pub fn set_method(&mut self, method: DetectionMethod) {
        self.method = method;
        self.reset();
    }

    /// Reset detector state
    pub fn reset(&mut self) {
        self.prev_magnitudes.fill(0.0);
        self.prev_phases.fill(0.0);
        self.prev_prev_phases.fill(0.0);
        self.prev_value = 0.0;
    }

    /// Create Hann window
    fn create_hann_window(size: usize) -> Vec<f32> {
        (0..size)
            .map(|i| {
                let angle = 2.0 * core::f32::consts::PI * i as f32 / (size - 1) as f32;
                0.5 * (1.0 - angle.cos())
            })
            .collect()
    }

    /// Analyze audio and detect transients
    ///
    /// One analysis frame starts at every multiple of the hop size; frames
    /// running past the end are zero-padded. A transient is reported at
    /// the start of the hop, inside the frame whose detection value peaked,
    /// where the signal level rises the most. For a sound following silence
    /// that is the hop the sound begins in.
    ///
    /// # Arguments
    /// * `samples` - Mono audio samples
    ///
    /// # Returns
    /// Vector of detected transients sorted by time
    pub fn detect(&mut self, samples: &[f32]) -> Vec<Transient> {
        self.reset();
        if samples.is_empty() {
            return Vec::new();
        }

        let num_frames = samples.len().div_ceil(self.hop_size);
        let mut detection_function = Vec::with_capacity(num_frames);
        let mut frame = vec![0.0f32; self.fft_size];

        for frame_idx in 0..num_frames {
            let start = frame_idx * self.hop_size;
            let end = (start + self.fft_size).min(samples.len());
            frame[..end - start].copy_from_slice(&samples[start..end]);
            frame[end - start..].fill(0.0);

            let value = match self.method {
                DetectionMethod::SpectralFlux => self.spectral_flux(&frame),
                DetectionMethod::HighFrequencyContent => self.high_frequency_content(&frame),
                DetectionMethod::Energy => self.energy(&frame),
                DetectionMethod::ComplexDomain => self.complex_domain(&frame),
            };

            detection_function.push((start, value));
        }

        // Apply adaptive thresholding
        let peaks = self.find_peaks(&detection_function);

        // Convert peaks to transients with minimum gap enforcement
        let mut transients = Vec::new();
        let mut last_position: Option<usize> = None;

        for (frame_start, strength) in peaks {
            let position = self.locate_onset(samples, frame_start);
            if last_position.map_or(true, |last| {
                position > last && position >= last + self.min_gap
            }) {
                transients.push(Transient {
                    sample_position: position,
                    time: position as f64 / self.sample_rate,
                    strength,
                });
                last_position = Some(position);
            }
        }

        transients
    }

    /// Start of the hop within the frame at `frame_start` whose energy
    /// rises the most over the hop before it.
    fn locate_onset(&self, samples: &[f32], frame_start: usize) -> usize {
        let hop_energy = |hop: usize| -> f32 {
            let from = (hop * self.hop_size).min(samples.len());
            let to = (from + self.hop_size).min(samples.len());
            samples[from..to].iter().map(|s| s * s).sum()
        };

        let first = frame_start / self.hop_size;
        let frame_end = (frame_start + self.fft_size).min(samples.len());
        let last = frame_end.saturating_sub(1) / self.hop_size;

        let mut best = first;
        let mut best_rise = f32::MIN;
        let mut prev = if first > 0 { hop_energy(first - 1) } else { 0.0 };
        for hop in first..=last.max(first) {
            let energy = hop_energy(hop);
            let rise = energy / (prev + 1e-10);
            if rise > best_rise {
                best = hop;
                best_rise = rise;
            }
            prev = energy;
        }

        best * self.hop_size
    }

    /// Windowed FFT of `frame` into `self.spectrum`.
    fn transform(&mut self, frame: &[f32]) {
        for ((slot, &sample), &w) in self.spectrum.iter_mut().zip(frame).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.spectrum);
    }

    /// Positive change against the previous frame's scalar value.
    fn rise(&mut self, value: f32) -> f32 {
        let diff = value - self.prev_value;
        self.prev_value = value;
        diff.max(0.0)
    }

    /// Spectral flux detection function
    fn spectral_flux(&mut self, frame: &[f32]) -> f32 {
        self.transform(frame);
        let bins = self.fft_size / 2;

        // Sum of positive magnitude differences
        let mut flux = 0.0;
        for (c, prev) in self.spectrum[..bins]
            .iter()
            .zip(self.prev_magnitudes.iter_mut())
        {
            let mag = c.norm();
            let diff = mag - *prev;
            if diff > 0.0 {
                flux += diff;
            }
            *prev = mag;
        }

        flux
    }

    /// High-frequency content detection function
    fn high_frequency_content(&mut self, frame: &[f32]) -> f32 {
        self.transform(frame);
        let bins = self.fft_size / 2;

        // Weight bins by frequency (higher bins weighted more)
        let hfc: f32 = self.spectrum[..bins]
            .iter()
            .enumerate()
            .map(|(i, c)| (i + 1) as f32 * c.norm_sqr())
            .sum();

        self.rise(hfc.sqrt() * 0.01)
    }

    /// Energy-based detection function
    fn energy(&mut self, frame: &[f32]) -> f32 {
        let energy: f32 = frame.iter().map(|s| s * s).sum();
        self.rise(energy.sqrt())
    }

    /// Complex domain detection function
    ///
    /// Distance between each bin and its prediction from the previous two
    /// frames (same magnitude, phase advancing at the same rate), counted
    /// only for bins that did not lose energy.
    fn complex_domain(&mut self, frame: &[f32]) -> f32 {
        self.transform(frame);
        let bins = self.fft_size / 2;

        let mut value = 0.0;
        for i in 0..bins {
            let c = self.spectrum[i];
            let mag = c.norm();
            let phase = c.arg();

            if mag >= self.prev_magnitudes[i] {
                let predicted_phase = 2.0 * self.prev_phases[i] - self.prev_prev_phases[i];
                let predicted = Complex::from_polar(self.prev_magnitudes[i], predicted_phase);
                value += (c - predicted).norm();
            }

            self.prev_prev_phases[i] = self.prev_phases[i];
            self.prev_phases[i] = phase;
            self.prev_magnitudes[i] = mag;
        }

        value
    }

    /// Find peaks in detection function using adaptive threshold
    fn find_peaks(&self, detection_fn: &[(usize, f32)]) -> Vec<(usize, f32)> {
        if detection_fn.is_empty() {
            return Vec::new();
        }

        let mut peaks = Vec::new();

        // Calculate adaptive threshold (single-pass: sum, sum_sq, max)
        let len = detection_fn.len() as f32;
        let (sum, sum_sq, max_val) = detection_fn
            .iter()
            .fold((0.0f32, 0.0f32, 0.0f32), |(s, sq, mx), &(_, v)| {
                (s + v, sq + v * v, mx.max(v))
            });
        let mean = sum / len;
        let variance = (sum_sq / len - mean * mean).max(0.0);
        let std_dev = variance.sqrt();

        let adaptive_threshold = mean + std_dev * self.threshold * 3.0;

        // Local maxima above threshold; the signal is taken as zero outside
        // the analysed range so the first and last frames can peak too
        for (i, &(pos, val)) in detection_fn.iter().enumerate() {
            let prev_val = if i > 0 { detection_fn[i - 1].1 } else { 0.0 };
            let next_val = detection_fn.get(i + 1).map_or(0.0, |&(_, v)| v);

            if val > prev_val && val >= next_val && val > adaptive_threshold {
                let strength = if max_val > 0.0 {
                    (val / max_val).min(1.0)
                } else {
                    0.0
                };

                peaks.push((pos, strength));
            }
        }

        peaks
    }

    /// Clean up transient list by removing closely spaced detections
    pub fn cleanup_transients(transients: &mut Vec<Transient>, min_gap_seconds: f64) {
        if transients.len() < 2 {
            return;
        }

        let mut i = 1;
        while i < transients.len() {
            if transients[i].time - transients[i - 1].time < min_gap_seconds {
                // Keep the stronger one
                if transients[i].strength > transients[i - 1].strength {
                    transients.remove(i - 1);
                } else {
                    transients.remove(i);
                }
            } else {
                i += 1;
            }
        }
    }
}
