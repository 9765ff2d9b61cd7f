//! Server configuration with environment variable priority
//!
//! Configuration is resolved in this order (first found wins):
//! 1. Environment variables (KEYHOLE_*)
//! 2. Config file (keyhole.toml)
//! 3. Default values (where applicable)

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use keyhole_secrets::{ConfigError, ConfigurationBuilder, LayeredConfiguration};

/// Environment variable prefix
const ENV_PREFIX: &str = "KEYHOLE";

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ENVIRONMENT: &str = "Production";

/// Server configuration (parsed from TOML, can be overridden by env)
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the API binds to (e.g., "0.0.0.0:8080")
    pub listen_addr: Option<String>,

    /// Environment name selecting `appsettings.<environment>.json`
    pub environment: Option<String>,

    /// Directory holding the JSON settings files
    pub settings_dir: Option<PathBuf>,

    /// Only environment variables with this prefix feed configuration
    pub config_env_prefix: Option<String>,

    /// HTTPS configuration
    pub tls: Option<TlsConfig>,
}

/// HTTPS certificate and key locations
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct TlsConfig {
    /// Certificate chain PEM file
    pub cert: Option<PathBuf>,

    /// Private key PEM file
    pub key: Option<PathBuf>,
}

/// Resolved server configuration
#[derive(Debug)]
pub struct ResolvedServerConfig {
    pub listen_addr: SocketAddr,
    pub environment: String,
    pub settings_dir: PathBuf,
    pub config_env_prefix: Option<String>,
    pub tls: Option<ResolvedTls>,
}

/// PEM content read from the configured TLS files
pub struct ResolvedTls {
    pub cert_pem: String,
    pub key_pem: String,
}

impl std::fmt::Debug for ResolvedTls {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedTls").finish_non_exhaustive()
    }
}

/// Get process environment variable with prefix
fn process_env(name: &str) -> Option<String> {
    std::env::var(prefixed(name)).ok()
}

fn prefixed(name: &str) -> String {
    format!("{}_{}", ENV_PREFIX, name)
}

impl ServerConfig {
    /// Load configuration from a TOML file; a missing file yields defaults
    pub fn load(path: &str) -> anyhow::Result<Self> {
        if !Path::new(path).exists() {
            tracing::info!("Config file {} not found, using defaults", path);
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("Failed to parse {}", path))?;
        tracing::info!("Loaded config from {}", path);
        Ok(config)
    }

    /// Resolve configuration from environment variables first, then config file
    pub fn resolve(self) -> anyhow::Result<ResolvedServerConfig> {
        self.resolve_with(process_env)
    }

    /// Resolve using `env` for unprefixed `KEYHOLE_*` names
    pub fn resolve_with<F>(self, env: F) -> anyhow::Result<ResolvedServerConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Listen address: ENV > config > default 0.0.0.0:8080
        let listen_source = env("LISTEN_ADDR")
            .or(self.listen_addr)
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr: SocketAddr = listen_source
            .parse()
            .with_context(|| format!("Invalid listen address '{}'", listen_source))?;

        // Environment name: ENV > config > default Production
        let environment = env("ENVIRONMENT")
            .or(self.environment)
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

        // Settings directory: ENV > config > current directory
        let settings_dir = env("SETTINGS_DIR")
            .map(PathBuf::from)
            .or(self.settings_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let config_env_prefix = env("CONFIG_ENV_PREFIX").or(self.config_env_prefix);

        // TLS: ENV > config > disabled; both halves or neither
        let tls_config = self.tls.unwrap_or_default();
        let cert = env("TLS_CERT").map(PathBuf::from).or(tls_config.cert);
        let key = env("TLS_KEY").map(PathBuf::from).or(tls_config.key);

        let tls = match (cert, key) {
            (Some(cert), Some(key)) => {
                let cert_pem = std::fs::read_to_string(&cert)
                    .with_context(|| format!("Failed to read TLS certificate {}", cert.display()))?;
                let key_pem = std::fs::read_to_string(&key)
                    .with_context(|| format!("Failed to read TLS key {}", key.display()))?;
                Some(ResolvedTls { cert_pem, key_pem })
            }
            (None, None) => None,
            _ => anyhow::bail!(
                "TLS needs both a certificate and a key. Set {} and {}, or tls.cert and tls.key in config",
                prefixed("TLS_CERT"),
                prefixed("TLS_KEY")
            ),
        };

        Ok(ResolvedServerConfig {
            listen_addr,
            environment,
            settings_dir,
            config_env_prefix,
            tls,
        })
    }

    /// Load config file and resolve with environment variable overrides
    pub fn load_and_resolve(path: &str) -> anyhow::Result<ResolvedServerConfig> {
        Self::load(path)?.resolve()
    }
}

impl ResolvedServerConfig {
    /// Settings files in load order
    pub fn settings_files(&self) -> [PathBuf; 2] {
        [
            self.settings_dir.join("appsettings.json"),
            self.settings_dir
                .join(format!("appsettings.{}.json", self.environment)),
        ]
    }

    /// Build the layered configuration the resolver reads from
    ///
    /// Both settings files are optional; process environment variables
    /// override them.
    pub fn build_configuration(&self) -> Result<LayeredConfiguration, ConfigError> {
        let [base, overlay] = self.settings_files();
        ConfigurationBuilder::new()
            .add_json_file(base, true)
            .add_json_file(overlay, true)
            .add_environment_variables(self.config_env_prefix.as_deref())
            .build()
    }
}
