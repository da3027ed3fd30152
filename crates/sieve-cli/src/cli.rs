use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "sieve",
    about = "Sieve: composite widget filter conditions",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file; defaults apply when it does not exist
    #[arg(long, global = true, default_value = "sieve.toml")]
    pub config: PathBuf,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge a script of widget updates into a composite, step by step
    Replay(ReplayArgs),
    /// Print the wire document and cache key of a composite tree
    Encode(EncodeArgs),
    /// List condition operators and their arities
    Operators,
}

#[derive(Args)]
pub struct ReplayArgs {
    /// JSON array of `{ "component": id, "condition": node }` updates
    pub script: PathBuf,
    /// Show a rendered diff for every step that changes the composite
    #[arg(long)]
    pub diff: bool,
}

#[derive(Args)]
pub struct EncodeArgs {
    /// JSON file holding a composite tree
    pub tree: PathBuf,
}
