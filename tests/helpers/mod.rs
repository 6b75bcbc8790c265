//! WAV fixtures generated at test time.

#![allow(dead_code)]

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

pub const SAMPLE_RATE: u32 = 44100;

/// Stereo ramp: frame `f` is `(f * 100, -f * 100)`.
pub fn stereo_ramp(frames: usize) -> Vec<i16> {
    (0..frames)
        .flat_map(|f| {
            let value = f as i16 * 100;
            [value, -value]
        })
        .collect()
}

pub fn write_i16_wav(path: &Path, channels: u16, sample_rate: u32, samples: &[i16]) {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for &sample in samples {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}

/// Integer PCM at `bits` per sample (up to 32).
pub fn write_int_wav(path: &Path, channels: u16, bits: u16, samples: &[i32]) {
    let spec = WavSpec {
        channels,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: bits,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for &sample in samples {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}

pub fn read_i16_wav(path: &Path) -> (WavSpec, Vec<i16>) {
    let mut reader = WavReader::open(path).unwrap();
    let spec = reader.spec();
    let samples = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    (spec, samples)
}

pub fn read_i32_wav(path: &Path) -> (WavSpec, Vec<i32>) {
    let mut reader = WavReader::open(path).unwrap();
    let spec = reader.spec();
    let samples = reader.samples::<i32>().map(|s| s.unwrap()).collect();
    (spec, samples)
}

/// Stereo frames `[from, to)` of an interleaved buffer.
pub fn frames(samples: &[i16], from: usize, to: usize) -> Vec<i16> {
    samples[from * 2..to * 2].to_vec()
}

/// Mono 440 Hz bursts over each `[start, end)`, 10ms release, silence elsewhere.
pub fn bursts(total: usize, spans: &[(usize, usize)]) -> Vec<i16> {
    let mut samples = vec![0i16; total];
    for &(start, end) in spans {
        let len = end - start;
        for i in 0..len {
            let phase = 2.0 * std::f32::consts::PI * 440.0 * i as f32 / SAMPLE_RATE as f32;
            let gain = ((len - i) as f32 / 441.0).min(1.0);
            samples[start + i] = (phase.sin() * gain * 16000.0) as i16;
        }
    }
    samples
}

/// Sorted file names in `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
