//! Streaming region slicer.
//!
//! Reads the source once, chunk by chunk, and fans each chunk out to every
//! slice whose region overlaps it. The running count of frames read is the
//! only clock: a region is activated as soon as its start falls within the
//! chunk about to be written, and reaped once the count passes its end.
//!
//! Every sink is owned by an [`ActiveSlice`] guard, so it is closed exactly
//! once on every path: when its region ends, when the source is exhausted,
//! or (best-effort) when the run aborts with an error.

use crate::backend::{AudioBackend, AudioSink, AudioSource};
use crate::error::{Error, Result};
use crate::options::SliceOptions;
use crate::region::{validate_regions, Region};
use crate::template::SliceName;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A region currently receiving frames, with exclusive ownership of its sink.
pub struct ActiveSlice<S: AudioSink> {
    index: usize,
    region: Region,
    path: PathBuf,
    sink: Option<S>,
    frames_written: u64,
}

impl<S: AudioSink> ActiveSlice<S> {
    fn new(index: usize, region: Region, path: PathBuf, sink: S) -> Self {
        Self {
            index,
            region,
            path,
            sink: Some(sink),
            frames_written: 0,
        }
    }

    /// 1-based slice index.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn is_open(&self) -> bool {
        self.sink.is_some()
    }

    /// Whether the read cursor has moved past the end of the region.
    fn has_ended(&self, total_frames_read: u64) -> bool {
        self.region
            .end_frame
            .is_some_and(|end| end < total_frames_read)
    }

    /// Write the part of `chunk` that belongs to this slice.
    ///
    /// `chunk` holds `read` frames starting at source frame `total_frames_read`.
    fn consume(
        &mut self,
        chunk: &[f64],
        total_frames_read: u64,
        read: u64,
        channels: usize,
    ) -> Result<()> {
        let start = self.region.start_frame.saturating_sub(total_frames_read);

        match self.region.end_frame {
            Some(end) => {
                let remaining = end.saturating_add(1).saturating_sub(total_frames_read);
                if remaining < read {
                    if remaining > start {
                        self.write(chunk, start, remaining, channels)?;
                    }
                    self.close()?;
                } else if read > start {
                    self.write(chunk, start, read, channels)?;
                }
            }
            None => {
                if read > start {
                    self.write(chunk, start, read, channels)?;
                }
            }
        }

        Ok(())
    }

    fn write(&mut self, chunk: &[f64], from: u64, to: u64, channels: usize) -> Result<()> {
        let Some(sink) = self.sink.as_mut() else {
            return Ok(());
        };
        let frames = &chunk[from as usize * channels..to as usize * channels];
        sink.write(frames)?;
        self.frames_written += to - from;
        Ok(())
    }

    /// Close the sink if it is still open.
    fn close(&mut self) -> Result<()> {
        if let Some(sink) = self.sink.take() {
            sink.close()?;
            debug!(
                "Closed slice #{} ({} frames) '{}'",
                self.index,
                self.frames_written,
                self.path.display()
            );
        }
        Ok(())
    }

    fn output(&self) -> SliceOutput {
        SliceOutput {
            index: self.index,
            region: self.region,
            path: self.path.clone(),
            frames_written: self.frames_written,
        }
    }
}

impl<S: AudioSink> Drop for ActiveSlice<S> {
    fn drop(&mut self) {
        if let Some(sink) = self.sink.take() {
            if let Err(e) = sink.close() {
                warn!(
                    "Failed to close slice #{} '{}': {}",
                    self.index,
                    self.path.display(),
                    e
                );
            }
        }
    }
}

/// One file produced by a slicing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceOutput {
    /// 1-based slice index
    pub index: usize,
    pub region: Region,
    pub path: PathBuf,
    /// Frames actually written; less than the region length when the
    /// source ends early
    pub frames_written: u64,
}

/// Summary of a slicing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceReport {
    /// Produced files, ordered by slice index
    pub outputs: Vec<SliceOutput>,
    /// Regions that start past the end of the source and got no file
    pub skipped: usize,
    /// Frames read from the source
    pub total_frames: u64,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Slice `source_path` into one output file per region.
///
/// `regions` must be non-empty and sorted by start frame; they may overlap.
/// A region extending past the end of the source yields a shorter file. A
/// region starting exactly at the end of the source yields an empty file,
/// one starting later yields none and is counted in
/// [`SliceReport::skipped`].
///
/// Invalid input fails with [`Error::InvalidArgument`] before any I/O.
/// The first I/O failure aborts the run; sinks still open at that point
/// are closed before the error is returned.
pub fn slice<B: AudioBackend>(
    backend: &mut B,
    source_path: &Path,
    regions: &[Region],
    options: &SliceOptions,
) -> Result<SliceReport> {
    validate_regions(regions)?;
    options.validate()?;

    let basename = source_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| {
            Error::invalid(format!(
                "cannot derive a base name from '{}'",
                source_path.display()
            ))
        })?
        .to_string();

    let output_dir = options.resolve_output_dir(source_path);
    create_output_dir(&output_dir, options.exist_ok)?;

    let mut source = backend.open_source(source_path, options.sample_rate)?;
    let channels = source.channels();
    let sample_rate = source.sample_rate();
    if channels == 0 {
        return Err(Error::io_other(format!(
            "source '{}' reports zero channels",
            source_path.display()
        )));
    }
    let ext = backend.extension().to_string();
    let channel_count = channels as usize;

    debug!(
        "Slicing '{}' ({} ch, {} Hz) into {} regions",
        source_path.display(),
        channels,
        sample_rate,
        regions.len()
    );

    let mut buffer = vec![0.0f64; options.chunk_size * channel_count];
    let mut pending = regions.iter().copied().peekable();
    let mut active: Vec<ActiveSlice<B::Sink>> = Vec::new();
    let mut outputs = Vec::with_capacity(regions.len());
    let mut slice_counter = 0;
    let mut total_frames_read: u64 = 0;

    loop {
        let read_count = source.read(&mut buffer)?;
        if read_count > options.chunk_size {
            return Err(Error::io_other(format!(
                "source returned {read_count} frames for a {} frame read",
                options.chunk_size
            )));
        }
        let read = read_count as u64;

        // Activate every region starting within (or right after) this chunk
        while let Some(region) =
            pending.next_if(|region| total_frames_read + read >= region.start_frame)
        {
            slice_counter += 1;
            let file_name = options.filename_template.render(&SliceName {
                basename: &basename,
                slice: slice_counter,
                start_frame: region.start_frame,
                sample_rate,
                ext: &ext,
            });
            let path = output_dir.join(file_name);
            let sink = backend.open_sink(&path, sample_rate, channels)?;

            if options.verbose {
                info!("Writing slice #{} to '{}'", slice_counter, path.display());
            } else {
                debug!("Writing slice #{} to '{}'", slice_counter, path.display());
            }

            active.push(ActiveSlice::new(slice_counter, region, path, sink));
        }

        let chunk = &buffer[..read_count * channel_count];
        for slice in active.iter_mut() {
            slice.consume(chunk, total_frames_read, read, channel_count)?;
        }

        total_frames_read += read;

        reap(&mut active, total_frames_read, &mut outputs)?;

        if read_count < options.chunk_size {
            break;
        }
    }

    // Open-ended regions and regions running past the end of the source
    for mut slice in active.drain(..) {
        slice.close()?;
        outputs.push(slice.output());
    }

    let skipped = pending.count();
    if skipped > 0 {
        warn!(
            "{} region(s) start after the end of '{}' ({} frames) and were skipped",
            skipped,
            source_path.display(),
            total_frames_read
        );
    }

    outputs.sort_by_key(|output| output.index);

    Ok(SliceReport {
        outputs,
        skipped,
        total_frames: total_frames_read,
        sample_rate,
        channels,
    })
}

/// Close and remove every slice whose region ended before `total_frames_read`.
fn reap<S: AudioSink>(
    active: &mut Vec<ActiveSlice<S>>,
    total_frames_read: u64,
    outputs: &mut Vec<SliceOutput>,
) -> Result<()> {
    let mut i = 0;
    while i < active.len() {
        if active[i].has_ended(total_frames_read) {
            let mut slice = active.remove(i);
            // Still open when the region ended exactly on a chunk boundary
            slice.close()?;
            outputs.push(slice.output());
        } else {
            i += 1;
        }
    }
    Ok(())
}

fn create_output_dir(dir: &Path, exist_ok: bool) -> Result<()> {
    if !exist_ok && dir.exists() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("output directory '{}' already exists", dir.display()),
        )));
    }
    fs::create_dir_all(dir)?;
    Ok(())
}
