//! Slicing options.

use crate::error::{Error, Result};
use crate::template::FilenameTemplate;
use std::path::{Path, PathBuf};

/// Default number of frames read from the source per iteration.
pub const DEFAULT_CHUNK_SIZE: usize = 256;

/// Options for a slicing run.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceOptions {
    /// Sample rate to read the source at (0 = native).
    ///
    /// Region bounds are expressed at this rate.
    pub sample_rate: u32,
    /// Frames read from the source per iteration. Only affects I/O
    /// granularity, never the output.
    pub chunk_size: usize,
    /// Output directory (None = the source file's directory).
    pub output_dir: Option<PathBuf>,
    /// Reuse an existing output directory instead of failing.
    pub exist_ok: bool,
    /// Output file name template.
    pub filename_template: FilenameTemplate,
    /// Report every slice at info level instead of debug.
    pub verbose: bool,
}

impl Default for SliceOptions {
    fn default() -> Self {
        Self {
            sample_rate: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            output_dir: None,
            exist_ok: true,
            filename_template: FilenameTemplate::default(),
            verbose: false,
        }
    }
}

impl SliceOptions {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::invalid("chunk_size must be greater than zero"));
        }
        Ok(())
    }

    /// Directory the slices of `source_path` are written to.
    pub fn resolve_output_dir(&self, source_path: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => source_path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}
