//! In-memory audio backend.
//!
//! Sources are registered buffers, sinks record everything written to them
//! along with how many times they were closed. Cloning the backend shares
//! its state, so a caller can keep a handle for inspection after handing a
//! clone to the slicer. Failures can be injected on sink open, write and
//! close.

use crate::backend::{AudioBackend, AudioSink, AudioSource};
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Interleaved audio held in memory.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemoryAudio {
    pub channels: u16,
    pub sample_rate: u32,
    /// Interleaved samples
    pub samples: Vec<f64>,
}

impl MemoryAudio {
    pub fn new(channels: u16, sample_rate: u32, samples: Vec<f64>) -> Self {
        Self {
            channels,
            sample_rate,
            samples,
        }
    }

    /// Number of complete frames.
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// Interleaved samples of frames `[from, to)`.
    pub fn frame_range(&self, from: usize, to: usize) -> &[f64] {
        let channels = self.channels as usize;
        &self.samples[from * channels..to * channels]
    }
}

/// A sink as seen after (or during) a run.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkRecord {
    pub path: PathBuf,
    pub audio: MemoryAudio,
    pub write_calls: usize,
    pub close_count: usize,
}

#[derive(Debug, Default)]
struct State {
    sources: HashMap<PathBuf, MemoryAudio>,
    sinks: Vec<SinkRecord>,
    sink_opens: usize,
    writes: usize,
    closes: usize,
    fail_sink_open_at: Option<usize>,
    fail_write_at: Option<usize>,
    fail_close_at: Option<usize>,
}

/// Backend keeping sources and sinks in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source readable at `path`.
    pub fn with_source(self, path: impl Into<PathBuf>, audio: MemoryAudio) -> Self {
        self.state.lock().sources.insert(path.into(), audio);
        self
    }

    /// Make the `n`-th sink open (1-based) fail.
    pub fn fail_sink_open_at(self, n: usize) -> Self {
        self.state.lock().fail_sink_open_at = Some(n);
        self
    }

    /// Make the `n`-th write call (1-based, across all sinks) fail.
    pub fn fail_write_at(self, n: usize) -> Self {
        self.state.lock().fail_write_at = Some(n);
        self
    }

    /// Make the `n`-th sink close (1-based, across all sinks) fail.
    ///
    /// The failed close still counts towards the sink's `close_count`.
    pub fn fail_close_at(self, n: usize) -> Self {
        self.state.lock().fail_close_at = Some(n);
        self
    }

    /// All sinks in the order they were opened.
    pub fn sinks(&self) -> Vec<SinkRecord> {
        self.state.lock().sinks.clone()
    }

    /// The most recently opened sink at `path`.
    pub fn sink(&self, path: impl AsRef<Path>) -> Option<SinkRecord> {
        let path = path.as_ref();
        self.state
            .lock()
            .sinks
            .iter()
            .rev()
            .find(|sink| sink.path == path)
            .cloned()
    }
}

impl AudioBackend for MemoryBackend {
    type Source = MemorySource;
    type Sink = MemorySink;

    fn open_source(&mut self, path: &Path, sample_rate: u32) -> Result<MemorySource> {
        let audio = self.state.lock().sources.get(path).cloned().ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no in-memory source at '{}'", path.display()),
            ))
        })?;

        if sample_rate != 0 && sample_rate != audio.sample_rate {
            return Err(Error::InvalidArgument(format!(
                "in-memory sources cannot be resampled ({} Hz requested, {} Hz available)",
                sample_rate, audio.sample_rate
            )));
        }

        Ok(MemorySource { audio, position: 0 })
    }

    fn open_sink(&mut self, path: &Path, sample_rate: u32, channels: u16) -> Result<MemorySink> {
        let mut state = self.state.lock();
        state.sink_opens += 1;
        if state.fail_sink_open_at == Some(state.sink_opens) {
            return Err(Error::io_other(format!(
                "injected failure opening '{}'",
                path.display()
            )));
        }

        state.sinks.push(SinkRecord {
            path: path.to_path_buf(),
            audio: MemoryAudio::new(channels, sample_rate, Vec::new()),
            write_calls: 0,
            close_count: 0,
        });

        Ok(MemorySink {
            state: Arc::clone(&self.state),
            slot: state.sinks.len() - 1,
        })
    }

    fn extension(&self) -> &str {
        "wav"
    }
}

/// Reader over a [`MemoryAudio`] buffer.
#[derive(Debug, Clone)]
pub struct MemorySource {
    audio: MemoryAudio,
    position: usize,
}

impl MemorySource {
    pub fn new(audio: MemoryAudio) -> Self {
        Self { audio, position: 0 }
    }
}

impl AudioSource for MemorySource {
    fn channels(&self) -> u16 {
        self.audio.channels
    }

    fn sample_rate(&self) -> u32 {
        self.audio.sample_rate
    }

    fn total_frames(&self) -> Option<u64> {
        Some(self.audio.frames() as u64)
    }

    fn read(&mut self, buffer: &mut [f64]) -> Result<usize> {
        let channels = self.audio.channels as usize;
        let wanted = buffer.len() / channels;
        let frames = wanted.min(self.audio.frames() - self.position);

        buffer[..frames * channels]
            .copy_from_slice(self.audio.frame_range(self.position, self.position + frames));
        self.position += frames;

        Ok(frames)
    }
}

/// Sink recording into the shared [`MemoryBackend`] state.
#[derive(Debug)]
pub struct MemorySink {
    state: Arc<Mutex<State>>,
    slot: usize,
}

impl AudioSink for MemorySink {
    fn write(&mut self, frames: &[f64]) -> Result<()> {
        let mut state = self.state.lock();
        state.writes += 1;
        if state.fail_write_at == Some(state.writes) {
            return Err(Error::io_other("injected write failure"));
        }

        let sink = &mut state.sinks[self.slot];
        sink.audio.samples.extend_from_slice(frames);
        sink.write_calls += 1;
        Ok(())
    }

    fn close(self) -> Result<()> {
        let mut state = self.state.lock();
        state.closes += 1;
        state.sinks[self.slot].close_count += 1;
        if state.fail_close_at == Some(state.closes) {
            return Err(Error::io_other(format!(
                "injected failure closing '{}'",
                state.sinks[self.slot].path.display()
            )));
        }
        Ok(())
    }
}
