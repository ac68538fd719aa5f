// SPDX-License-Identifier: MIT

use clap::Parser;
use geomean_pools::config::{Cli, RunConfig};
use geomean_pools::harness;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "geomean_pools=debug,geomean_bench=debug"
    } else {
        "geomean_pools=info,geomean_bench=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = RunConfig::from_cli(&cli)?;
    let pool = config.build_pool()?;
    tracing::debug!(team = pool.team_size(), chunk = config.chunk_size.get(), "configured");

    let buffer: Arc<[u8]> = harness::load_inputs(&cli.files).into();

    for report in harness::run_all(&pool, &buffer, config.chunk_size) {
        println!("{report}");
    }

    Ok(())
}
