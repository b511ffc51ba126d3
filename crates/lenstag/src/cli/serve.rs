//! The `lenstag serve` command.

use clap::Args;
use lenstag::server::{build_app_state, run};
use lenstag_core::Config;
use tokio::net::TcpListener;

use super::types::ProviderArgs;

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Interface to bind (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,

    #[command(flatten)]
    pub provider: ProviderArgs,
}

/// Execute the serve command.
pub async fn execute(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    args.provider.apply(&mut config)?;

    // Fails here, before binding, when the provider credential is missing.
    let app_state = build_app_state(config)?;

    let addr = app_state.config.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {addr}: {e}"))?;

    run(listener, app_state).await
}
