// src/main.rs — convoloop entry point

use clap::Parser;

use convoloop::cli::Cli;
use convoloop::infra::config::Config;
use convoloop::infra::logger;

#[tokio::main]
async fn main() {
    // A missing .env is not an error
    dotenvy::dotenv().ok();

    // Initialize logging (respects RUST_LOG)
    logger::init_logging("warn");

    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

/// Returns whether the conversation reached its configured length.
async fn run() -> anyhow::Result<bool> {
    let cli = Cli::parse();

    // Load config (falls back to defaults if no convoloop.toml)
    let config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };

    let report = convoloop::cli::run::run_conversation(&config, cli.quiet).await?;
    Ok(report.is_completed())
}
