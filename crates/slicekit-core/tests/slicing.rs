//! Region slicer behaviour against the in-memory backend.
//!
//! Sources are ramps where every sample encodes its own position
//! (`frame * channels + channel`), so any misplaced, duplicated or dropped
//! frame shows up as a value mismatch.

use proptest::prelude::*;
use slicekit_core::memory::{MemoryAudio, MemoryBackend, SinkRecord};
use slicekit_core::{slice, Error, FilenameTemplate, Region, SliceOptions, SliceReport};
use std::path::PathBuf;
use tempfile::TempDir;

const SAMPLE_RATE: u32 = 44100;

struct Fixture {
    dir: TempDir,
    source: PathBuf,
    audio: MemoryAudio,
    backend: MemoryBackend,
}

fn ramp(channels: u16, frames: usize) -> MemoryAudio {
    let samples = (0..frames * channels as usize).map(|i| i as f64).collect();
    MemoryAudio::new(channels, SAMPLE_RATE, samples)
}

fn fixture(channels: u16, frames: usize) -> Fixture {
    fixture_with(channels, frames, MemoryBackend::new())
}

fn fixture_with(channels: u16, frames: usize, backend: MemoryBackend) -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = dir.path().join("loop.wav");
    let audio = ramp(channels, frames);
    let backend = backend.with_source(&source, audio.clone());
    Fixture {
        dir,
        source,
        audio,
        backend,
    }
}

impl Fixture {
    fn out_dir(&self) -> PathBuf {
        self.dir.path().join("slices")
    }

    fn options(&self, chunk_size: usize) -> SliceOptions {
        SliceOptions {
            chunk_size,
            output_dir: Some(self.out_dir()),
            ..Default::default()
        }
    }

    fn run(&mut self, regions: &[Region], chunk_size: usize) -> Result<SliceReport, Error> {
        let options = self.options(chunk_size);
        slice(&mut self.backend, &self.source, regions, &options)
    }

    fn slice_path(&self, index: usize) -> PathBuf {
        self.out_dir().join(format!("loop_{index:02}.wav"))
    }

    fn sink(&self, index: usize) -> SinkRecord {
        self.backend
            .sink(self.slice_path(index))
            .unwrap_or_else(|| panic!("slice #{index} was not opened"))
    }

    /// Assert that slice `index` holds exactly source frames `[from, to)`.
    fn assert_slice(&self, index: usize, from: usize, to: usize) {
        let sink = self.sink(index);
        assert_eq!(sink.audio.channels, self.audio.channels);
        assert_eq!(sink.audio.sample_rate, SAMPLE_RATE);
        assert_eq!(
            sink.audio.frames(),
            to - from,
            "slice #{index} frame count"
        );
        assert_eq!(
            sink.audio.samples,
            self.audio.frame_range(from, to),
            "slice #{index} content"
        );
        assert_eq!(sink.close_count, 1, "slice #{index} close count");
    }
}

fn region(start: u64, end: u64) -> Region {
    Region::new(start, end).unwrap()
}

#[test]
fn test_adjacent_regions_across_unaligned_chunks() {
    let mut fx = fixture(2, 100);
    let report = fx.run(&[region(0, 49), region(50, 99)], 30).unwrap();

    assert_eq!(report.outputs.len(), 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.total_frames, 100);
    assert_eq!(report.channels, 2);
    fx.assert_slice(1, 0, 50);
    fx.assert_slice(2, 50, 100);
    assert_eq!(fx.backend.sinks().len(), 2);
}

#[test]
fn test_nested_regions() {
    let mut fx = fixture(2, 100);
    fx.run(&[region(0, 99), region(10, 19)], 30).unwrap();

    fx.assert_slice(1, 0, 100);
    fx.assert_slice(2, 10, 20);
}

#[test]
fn test_partially_overlapping_regions() {
    let mut fx = fixture(1, 100);
    let report = fx.run(&[region(10, 60), region(40, 90)], 16).unwrap();

    fx.assert_slice(1, 10, 61);
    fx.assert_slice(2, 40, 91);
    assert_eq!(report.outputs[0].frames_written, 51);
    assert_eq!(report.outputs[1].frames_written, 51);
}

#[test]
fn test_identical_regions_get_separate_files() {
    let mut fx = fixture(1, 64);
    fx.run(&[region(5, 20), region(5, 20)], 8).unwrap();

    fx.assert_slice(1, 5, 21);
    fx.assert_slice(2, 5, 21);
}

#[test]
fn test_region_past_end_of_source_is_truncated() {
    let mut fx = fixture(2, 100);
    let report = fx.run(&[region(80, 500)], 30).unwrap();

    fx.assert_slice(1, 80, 100);
    assert_eq!(report.outputs[0].frames_written, 20);
    assert_eq!(report.outputs[0].region.len(), Some(421));
}

#[test]
fn test_open_ended_region_runs_to_end() {
    let mut fx = fixture(2, 100);
    fx.run(&[region(0, 9), Region::open_ended(70)], 30).unwrap();

    fx.assert_slice(1, 0, 10);
    fx.assert_slice(2, 70, 100);
}

#[test]
fn test_region_ending_on_chunk_boundary_is_closed_once() {
    let mut fx = fixture(1, 90);
    fx.run(&[region(0, 29), region(30, 59)], 30).unwrap();

    fx.assert_slice(1, 0, 30);
    fx.assert_slice(2, 30, 60);
}

#[test]
fn test_single_frame_regions() {
    let mut fx = fixture(2, 50);
    fx.run(&[region(0, 0), region(29, 29), region(30, 30), region(49, 49)], 30)
        .unwrap();

    fx.assert_slice(1, 0, 1);
    fx.assert_slice(2, 29, 30);
    fx.assert_slice(3, 30, 31);
    fx.assert_slice(4, 49, 50);
}

#[test]
fn test_region_starting_at_source_length_yields_empty_file() {
    for chunk_size in [25, 30] {
        let mut fx = fixture(2, 100);
        let report = fx.run(&[region(0, 9), region(100, 150)], chunk_size).unwrap();

        assert_eq!(report.skipped, 0, "chunk size {chunk_size}");
        fx.assert_slice(1, 0, 10);
        let empty = fx.sink(2);
        assert!(empty.audio.samples.is_empty());
        assert_eq!(empty.close_count, 1);
        assert_eq!(report.outputs[1].frames_written, 0);
    }
}

#[test]
fn test_region_starting_past_source_length_is_skipped() {
    for chunk_size in [25, 30] {
        let mut fx = fixture(2, 100);
        let report = fx
            .run(&[region(0, 9), region(101, 150), Region::open_ended(400)], chunk_size)
            .unwrap();

        assert_eq!(report.skipped, 2, "chunk size {chunk_size}");
        assert_eq!(report.outputs.len(), 1);
        assert_eq!(fx.backend.sinks().len(), 1);
        fx.assert_slice(1, 0, 10);
    }
}

#[test]
fn test_chunk_size_does_not_change_output() {
    let regions = [
        region(0, 12),
        region(3, 77),
        region(40, 40),
        region(41, 63),
        Region::open_ended(90),
    ];

    let mut reference: Option<Vec<Vec<f64>>> = None;
    for chunk_size in [1, 2, 7, 13, 64, 100, 1000] {
        let mut fx = fixture(3, 100);
        fx.run(&regions, chunk_size).unwrap();

        let outputs: Vec<Vec<f64>> = fx
            .backend
            .sinks()
            .into_iter()
            .map(|sink| sink.audio.samples)
            .collect();
        assert_eq!(outputs.len(), regions.len());

        match reference.take() {
            Some(expected) => {
                assert_eq!(outputs, expected, "chunk size {chunk_size}");
                reference = Some(expected);
            }
            None => reference = Some(outputs),
        }
    }
}

#[test]
fn test_empty_regions_fail_without_io() {
    let mut fx = fixture(2, 100);
    let result = fx.run(&[], 30);

    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert!(!fx.out_dir().exists());
    assert!(fx.backend.sinks().is_empty());
}

#[test]
fn test_unsorted_regions_fail_without_io() {
    let mut fx = fixture(2, 100);
    let result = fx.run(&[region(50, 99), region(0, 49)], 30);

    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert!(!fx.out_dir().exists());
}

#[test]
fn test_missing_source_is_io_error() {
    let mut fx = fixture(2, 100);
    let options = fx.options(30);
    let missing = fx.dir.path().join("missing.wav");
    let result = slice(&mut fx.backend, &missing, &[region(0, 1)], &options);

    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_existing_output_dir() {
    let mut fx = fixture(1, 10);
    std::fs::create_dir_all(fx.out_dir()).unwrap();

    // exist_ok (default) reuses the directory
    fx.run(&[region(0, 4)], 4).unwrap();
    fx.assert_slice(1, 0, 5);

    let options = SliceOptions {
        exist_ok: false,
        ..fx.options(4)
    };
    let result = slice(&mut fx.backend, &fx.source, &[region(0, 4)], &options);
    match result {
        Err(Error::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::AlreadyExists),
        other => panic!("expected AlreadyExists, got {other:?}"),
    }
}

#[test]
fn test_output_dir_defaults_to_source_dir() {
    let mut fx = fixture(1, 10);
    let options = SliceOptions {
        chunk_size: 4,
        ..Default::default()
    };
    let report = slice(&mut fx.backend, &fx.source, &[region(0, 4)], &options).unwrap();

    assert_eq!(report.outputs[0].path, fx.dir.path().join("loop_01.wav"));
}

#[test]
fn test_filename_template_fields() {
    let mut fx = fixture(1, 88200);
    let options = SliceOptions {
        filename_template: FilenameTemplate::parse(
            "{basename}_{slice}_{timestamp}_{timestamp_seconds}_{samplerate}.{ext}",
        )
        .unwrap(),
        ..fx.options(4096)
    };
    let report = slice(
        &mut fx.backend,
        &fx.source,
        &[region(0, 99), region(66150, 66199)],
        &options,
    )
    .unwrap();

    let names: Vec<String> = report
        .outputs
        .iter()
        .map(|output| {
            output
                .path
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    assert_eq!(
        names,
        vec![
            "loop_1_0_0000.000000_44100.wav",
            "loop_2_66150_0001.500000_44100.wav"
        ]
    );
}

#[test]
fn test_sink_open_failure_closes_open_sinks() {
    let mut fx = fixture_with(2, 100, MemoryBackend::new().fail_sink_open_at(2));
    let result = fx.run(&[region(0, 99), region(10, 19)], 30);

    assert!(matches!(result, Err(Error::Io(_))));
    let sinks = fx.backend.sinks();
    assert_eq!(sinks.len(), 1);
    assert_eq!(sinks[0].close_count, 1);
}

#[test]
fn test_write_failure_closes_every_open_sink() {
    // Writes: chunk 1 -> slice 1; chunk 2 -> slices 1 and 2 (second fails)
    let mut fx = fixture_with(1, 100, MemoryBackend::new().fail_write_at(3));
    let result = fx.run(&[region(0, 99), region(40, 80)], 30);

    assert!(matches!(result, Err(Error::Io(_))));
    let sinks = fx.backend.sinks();
    assert_eq!(sinks.len(), 2);
    for sink in sinks {
        assert_eq!(sink.close_count, 1, "{}", sink.path.display());
    }
}

#[test]
fn test_close_failure_on_chunk_boundary_closes_remaining_sinks() {
    // Slice 1 ends on the first chunk boundary and is closed by reaping
    let mut fx = fixture_with(1, 100, MemoryBackend::new().fail_close_at(1));
    let result = fx.run(&[region(0, 29), region(0, 99), Region::open_ended(50)], 30);

    assert!(matches!(result, Err(Error::Io(_))));
    let sinks = fx.backend.sinks();
    assert_eq!(sinks.len(), 2);
    for sink in sinks {
        assert_eq!(sink.close_count, 1, "{}", sink.path.display());
    }
}

#[test]
fn test_close_failure_at_end_of_source_closes_remaining_sinks() {
    // Open-ended slices are closed after the last read
    let mut fx = fixture_with(1, 100, MemoryBackend::new().fail_close_at(1));
    let result = fx.run(&[Region::open_ended(0), Region::open_ended(10)], 30);

    assert!(matches!(result, Err(Error::Io(_))));
    let sinks = fx.backend.sinks();
    assert_eq!(sinks.len(), 2);
    assert_eq!(sinks[0].audio.frames(), 100);
    assert_eq!(sinks[1].audio.frames(), 90);
    for sink in sinks {
        assert_eq!(sink.close_count, 1, "{}", sink.path.display());
    }
}

#[test]
fn test_repeated_runs_are_identical() {
    let mut fx = fixture(2, 100);
    let regions = [region(0, 49), region(25, 74), Region::open_ended(60)];

    let first = fx.run(&regions, 30).unwrap();
    let first_sinks: Vec<_> = fx.backend.sinks().into_iter().map(|s| s.audio).collect();

    let second = fx.run(&regions, 30).unwrap();
    let second_sinks: Vec<_> = fx.backend.sinks()[regions.len()..]
        .iter()
        .map(|s| s.audio.clone())
        .collect();

    assert_eq!(first, second);
    assert_eq!(first_sinks, second_sinks);
}

fn sorted_regions(frames: u64) -> impl Strategy<Value = Vec<(u64, u64)>> {
    prop::collection::vec((0..frames, 0..frames), 1..8).prop_map(|mut pairs| {
        for pair in pairs.iter_mut() {
            if pair.1 < pair.0 {
                *pair = (pair.1, pair.0);
            }
        }
        pairs.sort_by_key(|pair| pair.0);
        pairs
    })
}

proptest! {
    #[test]
    fn prop_every_slice_matches_source(
        bounds in sorted_regions(200),
        chunk_size in 1usize..96,
        channels in 1u16..4,
    ) {
        let mut fx = fixture(channels, 200);
        let regions: Vec<Region> = bounds.iter().map(|&(s, e)| region(s, e)).collect();
        let report = fx.run(&regions, chunk_size).unwrap();

        prop_assert_eq!(report.outputs.len(), regions.len());
        let sinks = fx.backend.sinks();
        for (sink, &(start, end)) in sinks.iter().zip(&bounds) {
            prop_assert_eq!(
                sink.audio.samples.as_slice(),
                fx.audio.frame_range(start as usize, end as usize + 1)
            );
            prop_assert_eq!(sink.close_count, 1);
        }
    }

    #[test]
    fn prop_truncated_slices_hold_remaining_frames(
        start in 0u64..120,
        overshoot in 1u64..500,
        chunk_size in 1usize..64,
    ) {
        let mut fx = fixture(2, 120);
        fx.run(&[region(start, 119 + overshoot)], chunk_size).unwrap();

        let sink = fx.backend.sinks().remove(0);
        prop_assert_eq!(sink.audio.frames() as u64, 120 - start);
        prop_assert_eq!(sink.close_count, 1);
    }
}
