//! LensTag - tag product images with a hosted vision model.
//!
//! Runs an HTTP gateway that accepts image uploads and returns structured
//! eCommerce tags and attributes produced by an OpenAI or Gemini model.
//!
//! # Usage
//!
//! ```bash
//! # Start the HTTP server
//! lenstag serve --port 8000
//!
//! # Tag a single local image
//! lenstag tag shirt.jpg --pretty
//!
//! # View configuration
//! lenstag config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;

/// LensTag - tag product images with a hosted vision model.
#[derive(Parser, Debug)]
#[command(name = "lenstag")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "LENSTAG_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP gateway
    Serve(cli::serve::ServeArgs),

    /// Tag a single local image and print the JSON result
    Tag(cli::tag::TagArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // API keys commonly live in a .env file next to the service.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logging needs the config, so a broken config is reported after
    // logging is up with defaults.
    let config = cli::load_config(cli.config.as_deref());
    match &config {
        Ok(config) => logging::init_from_config(config, cli.verbose, cli.json_logs),
        Err(_) => logging::init_from_config(
            &lenstag_core::Config::default(),
            cli.verbose,
            cli.json_logs,
        ),
    }

    tracing::debug!("LensTag v{}", lenstag_core::VERSION);

    // Dispatch to the appropriate command handler. `config` subcommands get
    // the raw load result so `config init --force` can repair a broken file.
    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, config?).await,
        Commands::Tag(args) => cli::tag::execute(args, config?).await,
        Commands::Config(args) => cli::config::execute(args, config, cli.config).await,
    }
}
