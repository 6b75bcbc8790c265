//! `slicesamples`: cut a recording into one file per sound.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use slicekit::Slicer;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cli::{load_regions, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Quiet by default, -v for more; RUST_LOG overrides
    let log_level = match cli.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut builder = Slicer::builder()
        .sample_rate(cli.sample_rate)
        .filename_template(cli.output_format.as_str())
        .verbose(cli.verbose > 0);
    if let Some(dir) = &cli.output_dir {
        builder = builder.output_dir(dir);
    }
    let slicer = builder.build().context("invalid slicing options")?;

    let regions = if !cli.regions.is_empty() {
        cli.regions.clone()
    } else if let Some(path) = &cli.regions_file {
        load_regions(path)?
    } else {
        info!("Analyzing file '{}'...", cli.input_file.display());
        slicer
            .detect_regions(&cli.input_file, &cli.section_finder())
            .with_context(|| format!("failed to analyze '{}'", cli.input_file.display()))?
    };

    if regions.is_empty() {
        info!("No sections found in '{}'", cli.input_file.display());
        return Ok(());
    }

    if cli.dry_run {
        println!("Dry run: would write {} slice(s):", regions.len());
        for (i, region) in regions.iter().enumerate() {
            println!("  #{:02} {}", i + 1, region);
        }
        return Ok(());
    }

    let report = slicer
        .slice(&cli.input_file, &regions)
        .with_context(|| format!("failed to slice '{}'", cli.input_file.display()))?;

    info!(
        "Wrote {} slice(s) from {} frames at {} Hz",
        report.outputs.len(),
        report.total_frames,
        report.sample_rate
    );

    Ok(())
}
