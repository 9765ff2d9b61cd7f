//! Keyhole secrets server library
//!
//! This library provides the components for serving secret lookups over HTTP.
//! It can be used to embed the API in other applications or for testing.

mod api;
mod config;
mod routes;
mod tls;

// Re-export public types
pub use api::{SecretsApi, NOT_FOUND_MESSAGE};
pub use config::{ResolvedServerConfig, ResolvedTls, ServerConfig, TlsConfig};
pub use routes::{path_for, route, RouteMatch, SECRETS_PREFIX};
pub use tls::{load_server_config_from_pem, TlsError};
