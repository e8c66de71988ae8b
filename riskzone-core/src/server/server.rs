//! HTTP server wiring: listener, router and graceful shutdown

use super::api::build_router;
use super::state::AppState;
use crate::config::Config;
use crate::shutdown::ShutdownCoordinator;
use crate::sync::{SyncHub, SyncHubHandle};
use anyhow::{Context, Result};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// RiskZone HTTP + WebSocket server
pub struct ZoneServer {
    state: Arc<AppState>,
    listener: TcpListener,
    shutdown_timeout: Duration,
}

impl ZoneServer {
    /// Bind the configured address. Port 0 picks a free port; see `local_addr`.
    pub async fn bind(config: &Config, hub: SyncHubHandle) -> Result<Self> {
        let listener = TcpListener::bind(config.server.bind_address)
            .await
            .with_context(|| format!("failed to bind {}", config.server.bind_address))?;

        Ok(Self {
            state: Arc::new(AppState::new(hub, config.server.max_connections)),
            listener,
            shutdown_timeout: config.server.shutdown_timeout,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` fires, then drain for at most the shutdown timeout
    pub async fn run(self, shutdown: Arc<ShutdownCoordinator>) -> Result<()> {
        let addr = self.local_addr()?;
        let router = build_router(self.state);
        info!(%addr, "RiskZone server listening");

        let signal = {
            let shutdown = shutdown.clone();
            async move { shutdown.wait_for_shutdown().await }
        };
        let serve = axum::serve(self.listener, router)
            .with_graceful_shutdown(signal)
            .into_future();
        tokio::pin!(serve);

        tokio::select! {
            result = &mut serve => result?,
            _ = shutdown.wait_for_shutdown() => {
                match tokio::time::timeout(self.shutdown_timeout, &mut serve).await {
                    Ok(result) => result?,
                    Err(_) => warn!(
                        timeout = ?self.shutdown_timeout,
                        "Shutdown timeout elapsed with requests in flight"
                    ),
                }
            }
        }

        info!("HTTP server stopped");
        Ok(())
    }
}

/// Run a server with its own hub until `shutdown` fires
pub async fn start_server(config: Config, shutdown: Arc<ShutdownCoordinator>) -> Result<()> {
    config.validate()?;

    let (hub, hub_task) = SyncHub::spawn(&config);
    let server = match ZoneServer::bind(&config, hub.clone()).await {
        Ok(server) => server,
        Err(e) => {
            hub.shutdown().await;
            return Err(e);
        }
    };

    let result = server.run(shutdown.clone()).await;

    // Ends every open push session
    hub.shutdown().await;
    if let Err(e) = hub_task.await {
        warn!(error = %e, "Sync hub task failed");
    }
    shutdown.mark_complete().await;

    result
}
