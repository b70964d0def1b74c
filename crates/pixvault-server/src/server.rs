use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::handler::AppState;
use crate::router::build_router;

/// Picture store server.
pub struct PixvaultServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl PixvaultServer {
    pub fn new(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests.
    pub async fn serve(self) -> Result<(), ApiError> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr)
            .await
            .map_err(|e| ApiError::StorageUnavailable(e.to_string()))?;
        tracing::info!(
            "picture server listening on {} under {}",
            self.config.bind_addr,
            self.state.prefix
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ApiError::StorageUnavailable(e.to_string()))
    }
}
