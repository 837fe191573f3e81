//! Narrate - image narration gateway.
//!
//! A single-route HTTP service that forwards uploaded images to a
//! third-party image-understanding API (vision label detection or hosted
//! captioning) and returns a normalized JSON result.
//!
//! # Usage
//!
//! ```bash
//! # Run the gateway with the configured provider
//! narrate serve
//!
//! # Bind somewhere else
//! narrate serve --host 0.0.0.0 --port 9000
//!
//! # View configuration
//! narrate config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;
mod server;

/// Narrate - turns uploaded images into labels or captions via third-party vision APIs.
#[derive(Parser, Debug)]
#[command(name = "narrate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the narration gateway HTTP server
    Serve(cli::serve::ServeArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI verbose override.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match narrate_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `narrate config path`."
            );
            narrate_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("narrate v{}", narrate_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
