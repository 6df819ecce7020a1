//! RPC sensor server: pushes flight data to Horizon consumers.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

mod config;
mod demo;
mod registry;
mod server;
mod session;
mod source;

use config::{ServerConfig, SessionConfig};

/// Flight-data source for Horizon displays.
#[derive(Parser, Debug)]
#[command(name = "rpcsensor-server", about = "Flight-data source for Horizon displays")]
struct Args {
    /// Address to accept consumer connections on.
    #[arg(long, default_value_t = ServerConfig::default().bind)]
    bind: SocketAddr,

    /// Interval between sensor, override and generic pushes.
    #[arg(long, default_value_t = 33)]
    high_rate_ms: u64,

    /// Interval between traffic pushes.
    #[arg(long, default_value_t = 500)]
    low_rate_ms: u64,

    /// Sleep between two passes over all sessions.
    #[arg(long, default_value_t = 10)]
    idle_ms: u64,
}

impl Args {
    fn config(&self) -> ServerConfig {
        ServerConfig {
            bind: self.bind,
            session: SessionConfig {
                high_rate_interval: Duration::from_millis(self.high_rate_ms),
                low_rate_interval: Duration::from_millis(self.low_rate_ms),
            },
            idle_sleep: Duration::from_millis(self.idle_ms),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (controlled via RUST_LOG env var).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut server = server::SensorServer::bind(args.config()).await?;
    server.run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_match_config_defaults() {
        let args = Args::parse_from(["rpcsensor-server"]);
        assert_eq!(args.config(), ServerConfig::default());
    }

    #[test]
    fn cli_overrides() {
        let args = Args::parse_from([
            "rpcsensor-server",
            "--bind",
            "127.0.0.1:9000",
            "--high-rate-ms",
            "50",
            "--low-rate-ms",
            "1000",
        ]);
        let config = args.config();
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.session.high_rate_interval, Duration::from_millis(50));
        assert_eq!(config.session.low_rate_interval, Duration::from_millis(1000));
        assert_eq!(config.idle_sleep, Duration::from_millis(10));
    }
}
