//! The `narrate serve` command.

use clap::Args;
use narrate_core::Config;

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Bind address override
    #[arg(long, env = "NARRATE_HOST")]
    pub host: Option<String>,

    /// Bind port override
    #[arg(long, env = "NARRATE_PORT")]
    pub port: Option<u16>,
}

/// Execute the serve command.
pub async fn execute(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    crate::server::run(config).await
}
