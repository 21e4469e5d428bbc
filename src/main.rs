//! graypipe CLI: process a directory of images; use --dry-run to list pending work.

use anyhow::Result;
use clap::Parser;
use graypipe::engine::arg_parser::Cli;
use graypipe::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
