//! Secret resolution across heterogeneous sources
//!
//! This crate provides a uniform way to look up a named value from one of
//! several backing stores:
//!
//! - **Local environment** (`SourceKind::LocalEnv`): process environment, Windows hosts only
//! - **Remote environment** (`SourceKind::RemoteEnv`): process environment, any host
//! - **Connection strings** (`SourceKind::ConnectionString`): `ConnectionStrings:<name>` in configuration
//! - **App settings** (`SourceKind::AppSetting`): colon-separated configuration paths
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use keyhole_secrets::{
//!     ConfigurationBuilder, ProcessEnvironment, SecretRequest, SecretResolver, SourceKind,
//! };
//!
//! let configuration = ConfigurationBuilder::new()
//!     .add_json_file("appsettings.json", true)
//!     .add_environment_variables(None)
//!     .build()?;
//!
//! let resolver = SecretResolver::new(Arc::new(ProcessEnvironment), Arc::new(configuration));
//! let outcome = resolver.resolve(&SecretRequest::with_default_key(SourceKind::AppSetting));
//! ```

mod configuration;
mod environment;
mod error;
mod outcome;
mod platform;
mod request;
mod resolver;

pub use configuration::{ConfigurationBuilder, ConfigurationProvider, LayeredConfiguration};
pub use environment::{EnvironmentAccessor, ProcessEnvironment, StaticEnvironment};
pub use error::ConfigError;
pub use outcome::SecretOutcome;
pub use platform::PlatformFamily;
pub use request::{SecretRequest, SourceKind};
pub use resolver::{SecretResolver, WINDOWS_ONLY_MESSAGE};
