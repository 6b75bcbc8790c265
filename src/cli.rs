//! Command line interface of `slicesamples`.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use slicekit::{DetectionMethod, MinInterval, Region, SectionFinder, DEFAULT_TEMPLATE};
use std::fs;
use std::path::{Path, PathBuf};

/// Slice an audio file with recordings of samples separated by silence
#[derive(Parser, Debug)]
#[command(name = "slicesamples", version)]
#[command(
    about = "Slice an audio file with recordings of samples separated by silence",
    long_about = None
)]
pub struct Cli {
    /// Input audio file
    pub input_file: PathBuf,

    /// Output directory (default: same as input file)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output filename template
    #[arg(short = 'f', long, value_name = "TEMPLATE", default_value = DEFAULT_TEMPLATE)]
    pub output_format: String,

    /// Onset detection method: default|specflux|hfc|energy|complexdomain
    #[arg(
        short = 'O',
        long,
        value_name = "METHOD",
        default_value = "default",
        value_parser = parse_method
    )]
    pub onset_method: DetectionMethod,

    /// Minimum inter-onset interval (e.g. 12ms, 1s, or frames)
    #[arg(short = 'm', long, value_name = "INTERVAL", default_value = "12ms")]
    pub min_interval: MinInterval,

    /// Minimum number of hop periods under threshold to start a silence period
    #[arg(short = 'M', long, value_name = "HOPS", default_value_t = 10)]
    pub min_silent_hops: usize,

    /// Onset peak picking threshold
    #[arg(short = 't', long, value_name = "VAL", default_value_t = 0.3)]
    pub onset_threshold: f32,

    /// Silence threshold in dBFS
    #[arg(
        short = 's',
        long,
        value_name = "dBFS",
        default_value_t = -70.0,
        allow_negative_numbers = true
    )]
    pub silence_threshold: f32,

    /// Hop size in sample frames
    #[arg(short = 'H', long, value_name = "FRAMES", default_value_t = 256)]
    pub hop_size: usize,

    /// Sample rate to read the input at (0 = native)
    #[arg(short = 'r', long = "samplerate", value_name = "HZ", default_value_t = 0)]
    pub sample_rate: u32,

    /// Slice this region instead of detecting them; END may be left empty
    #[arg(
        short = 'R',
        long = "region",
        value_name = "START:END",
        value_parser = parse_region,
        action = ArgAction::Append
    )]
    pub regions: Vec<Region>,

    /// Read regions from a JSON list of [start, end] pairs
    #[arg(long = "regions", value_name = "FILE", conflicts_with = "regions")]
    pub regions_file: Option<PathBuf>,

    /// Print the regions without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Analysis settings from the command line.
    pub fn section_finder(&self) -> SectionFinder {
        SectionFinder {
            method: self.onset_method,
            hop_size: self.hop_size,
            buffer_size: self.hop_size.max(512),
            onset_threshold: self.onset_threshold,
            min_interval: self.min_interval,
            min_silent_hops: self.min_silent_hops,
            silence_threshold_db: self.silence_threshold,
        }
    }
}

fn parse_method(name: &str) -> Result<DetectionMethod, String> {
    DetectionMethod::from_name(name).ok_or_else(|| {
        format!("unknown onset method '{name}' (expected default, specflux, hfc, energy or complexdomain)")
    })
}

/// Parse `START:END` or `START:` into a region.
pub fn parse_region(value: &str) -> Result<Region, String> {
    let (start, end) = value
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got '{value}'"))?;
    let start = start
        .trim()
        .parse::<u64>()
        .map_err(|_| format!("invalid region start in '{value}'"))?;

    let end = end.trim();
    if end.is_empty() {
        return Ok(Region::open_ended(start));
    }
    let end = end
        .parse::<u64>()
        .map_err(|_| format!("invalid region end in '{value}'"))?;
    Region::new(start, end).map_err(|e| e.to_string())
}

/// Load regions from a JSON file of `[start, end]` pairs, `end` may be null.
pub fn load_regions(path: &Path) -> Result<Vec<Region>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read regions from '{}'", path.display()))?;
    let pairs: Vec<(u64, Option<u64>)> = serde_json::from_str(&text)
        .with_context(|| format!("'{}' is not a list of [start, end] pairs", path.display()))?;

    pairs
        .into_iter()
        .map(|(start, end)| {
            Region::to_end(start, end)
                .with_context(|| format!("invalid region in '{}'", path.display()))
        })
        .collect()
}
