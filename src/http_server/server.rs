//! # HTTP Server
//!
//! Main HTTP server combining all endpoint routers over one database.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::balance_routes::{balance_routes, BalanceState};
use super::config::HttpServerConfig;
use super::observability_routes::{health_routes, observability_routes};
use super::resource_routes::{resource_routes, ResourceState};
use crate::balance::BalanceEngine;
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::resources::ResourceService;
use crate::store::Database;

/// HTTP Server for the multiverse API
pub struct HttpServer {
    config: HttpServerConfig,
    metrics: Arc<MetricsRegistry>,
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with default configuration
    pub fn new(db: Arc<Database>) -> Self {
        Self::with_config(HttpServerConfig::default(), db)
    }

    /// Create a new HTTP server with custom configuration
    pub fn with_config(config: HttpServerConfig, db: Arc<Database>) -> Self {
        let metrics = Arc::new(MetricsRegistry::new());
        let router = Self::build_router(&config, db, metrics.clone());
        Self {
            config,
            metrics,
            router,
        }
    }

    /// Build the combined router with all endpoints
    fn build_router(
        config: &HttpServerConfig,
        db: Arc<Database>,
        metrics: Arc<MetricsRegistry>,
    ) -> Router {
        let balance_state = Arc::new(BalanceState::new(BalanceEngine::new(
            db.clone(),
            metrics.clone(),
        )));
        let resource_state = Arc::new(ResourceState::new(ResourceService::new(
            db,
            metrics.clone(),
        )));

        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .merge(health_routes())
            .merge(balance_routes(balance_state))
            .merge(resource_routes(resource_state))
            .nest("/observability", observability_routes(metrics))
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Counters shared with every handler
    pub fn metrics(&self) -> Arc<MetricsRegistry> {
        self.metrics.clone()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server (async)
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid socket address '{}': {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        log_event_with_fields(Event::Serving, &[("addr", &addr.to_string())]);
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_creation() {
        let server = HttpServer::new(Arc::new(Database::in_memory()));
        assert_eq!(server.socket_addr(), "0.0.0.0:5000");
    }

    #[test]
    fn test_server_with_custom_port() {
        let config = HttpServerConfig::with_port(8080);
        let server = HttpServer::with_config(config, Arc::new(Database::in_memory()));
        assert_eq!(server.socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_router_builds_with_origin_list() {
        let config = HttpServerConfig {
            cors_origins: vec!["http://localhost:3000".to_string()],
            ..Default::default()
        };
        let server = HttpServer::with_config(config, Arc::new(Database::in_memory()));
        let _router = server.router();
    }
}
