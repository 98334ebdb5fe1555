//! # HTTP Server Module
//!
//! JSON-over-HTTP API for the multiverse store. Combines every endpoint
//! router into one Axum server.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/families/check/:name_identifier`, `/families/fix` - Power balance
//! - `/universes`, `/families`, `/people` and friends - Resource CRUD
//! - `/observability/*` - Metrics

pub mod balance_routes;
pub mod config;
pub mod errors;
pub mod observability_routes;
pub mod resource_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use server::HttpServer;
