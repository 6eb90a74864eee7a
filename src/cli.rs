use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fetchpipe")]
#[command(about = "Concurrent remote file fetch and process pipeline", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch every file in a manifest and store it in the configured sink
    Run(RunArgs),
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Job manifest (.json or .toml)
    #[arg(long)]
    pub manifest: PathBuf,

    /// Configuration file (defaults to $FETCHPIPE_CONFIG or config/fetchpipe.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override pipeline.fetch_concurrency
    #[arg(long)]
    pub fetch_concurrency: Option<usize>,

    /// Override pipeline.process_concurrency
    #[arg(long)]
    pub process_concurrency: Option<usize>,

    /// Override pipeline.buffer_size
    #[arg(long)]
    pub buffer_size: Option<usize>,
}
