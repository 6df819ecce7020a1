//! The control loop: accept, tick every session, sleep, repeat.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use rpcsensor_sdk::{JsonRpcConnection, JsonRpcListener};
use tracing::info;

use crate::config::ServerConfig;
use crate::demo::DemoDataSource;
use crate::registry::SessionRegistry;

/// Serves demo telemetry to every consumer that connects.
///
/// Runs on a single task. All suspension happens in the idle sleep between
/// two passes; accepting and ticking never wait on the network.
pub struct SensorServer {
    listener: JsonRpcListener,
    registry: SessionRegistry<JsonRpcConnection, DemoDataSource>,
    idle_sleep: Duration,
}

impl SensorServer {
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        let listener = JsonRpcListener::bind(config.bind)
            .await
            .with_context(|| format!("failed to listen on {}", config.bind))?;
        Ok(Self {
            listener,
            registry: SessionRegistry::new(config.session),
            idle_sleep: config.idle_sleep,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    /// Run until interrupted with Ctrl-C.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            addr = %self.local_addr(),
            idle_sleep_ms = self.idle_sleep.as_millis(),
            "sensor server listening"
        );

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            self.step(Instant::now());
            tokio::select! {
                result = &mut shutdown => {
                    result.context("failed to wait for Ctrl-C")?;
                    info!(sessions = self.registry.len(), "shutting down");
                    return Ok(());
                }
                () = tokio::time::sleep(self.idle_sleep) => {}
            }
        }
    }

    /// One pass: take every pending connection, then tick all sessions.
    fn step(&mut self, now: Instant) {
        while let Some(connection) = self.listener.accept() {
            let peer = connection.peer();
            let session = self.registry.insert(connection, DemoDataSource::new(), now);
            info!(session, %peer, active = self.registry.len(), "consumer connected");
        }

        let had_sessions = !self.registry.is_empty();
        self.registry.tick_all(now);
        if had_sessions && self.registry.is_empty() {
            info!("no consumers connected");
        }
    }
}
