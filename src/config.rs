// SPDX-License-Identifier: MIT

use crate::error::ConfigError;
use crate::partition::ChunkSize;
use crate::pools::standardpool::StandardPool;
use clap::Parser;
use std::path::PathBuf;

/// Chunk size used by the chunked task queue unless overridden.
pub const DEFAULT_CHUNK_SIZE: usize = 10;

/// Command-line arguments of the benchmark binary.
#[derive(Parser, Debug)]
#[command(name = "geomean-bench", version)]
#[command(about = "Geometric mean of file bytes under several parallel work-distribution policies")]
pub struct Cli {
    /// Input files; their bytes are concatenated in order. Unreadable files
    /// are skipped.
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Worker threads in the pool (default: available parallelism)
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Indices per claim for the chunked task queue
    #[arg(short, long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Validated settings for one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// `None` sizes the pool to the machine.
    pub threads: Option<usize>,
    pub chunk_size: ChunkSize,
}

impl RunConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        if cli.threads == Some(0) {
            return Err(ConfigError::ZeroWorkers);
        }
        Ok(RunConfig {
            threads: cli.threads,
            chunk_size: ChunkSize::new(cli.chunk_size)?,
        })
    }

    pub fn build_pool(&self) -> Result<StandardPool, ConfigError> {
        match self.threads {
            Some(threads) => StandardPool::new(threads),
            None => Ok(StandardPool::with_available_parallelism()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["geomean-bench", "a.bin", "b.bin"]).unwrap();
        assert_eq!(cli.files, vec![PathBuf::from("a.bin"), PathBuf::from("b.bin")]);

        let config = RunConfig::from_cli(&cli).unwrap();
        assert_eq!(config.threads, None);
        assert_eq!(config.chunk_size.get(), DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_overrides() {
        let cli =
            Cli::try_parse_from(["geomean-bench", "-t", "3", "--chunk-size", "64", "-v"])
                .unwrap();
        assert!(cli.verbose);
        assert!(cli.files.is_empty());

        let config = RunConfig::from_cli(&cli).unwrap();
        assert_eq!(config.threads, Some(3));
        assert_eq!(config.chunk_size.get(), 64);
        assert_eq!(config.build_pool().unwrap().team_size(), 3);
    }

    #[test]
    fn test_zero_values_rejected() {
        let cli = Cli::try_parse_from(["geomean-bench", "--threads", "0"]).unwrap();
        assert_eq!(RunConfig::from_cli(&cli), Err(ConfigError::ZeroWorkers));

        let cli = Cli::try_parse_from(["geomean-bench", "-c", "0"]).unwrap();
        assert_eq!(RunConfig::from_cli(&cli), Err(ConfigError::ZeroChunkSize));
    }
}
