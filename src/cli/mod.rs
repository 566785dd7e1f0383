// src/cli/mod.rs — CLI definition (clap derive)

pub mod progress;
pub mod run;

use clap::Parser;

/// Every tunable lives in the config file; the command line only picks the file.
#[derive(Parser, Debug)]
#[command(
    name = "convoloop",
    about = "Build a two-agent conversation against a chat-completion API",
    version
)]
pub struct Cli {
    /// Config file path (defaults to ./convoloop.toml or $CONVOLOOP_CONFIG)
    #[arg(long)]
    pub config: Option<String>,

    /// Suppress progress output
    #[arg(long)]
    pub quiet: bool,
}
