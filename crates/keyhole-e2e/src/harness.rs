//! Test server harness for E2E tests
//!
//! Starts the secrets API on an ephemeral port with a `StaticEnvironment`
//! and in-memory configuration, optionally behind TLS.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_rustls::TlsAcceptor;

use keyhole_secrets::{LayeredConfiguration, SecretResolver, SourceKind, StaticEnvironment};
use keyhole_server::{load_server_config_from_pem, path_for, SecretsApi};

use crate::certificates::TestCertificates;

/// A running test server instance
pub struct TestServer {
    /// Bound API address
    pub addr: SocketAddr,
    /// Environment handed to the resolver, kept for assertions
    pub environment: Arc<StaticEnvironment>,
    scheme: &'static str,
    /// Shutdown signal sender
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    /// Start a plain HTTP server
    pub async fn start(environment: StaticEnvironment, configuration: LayeredConfiguration) -> Self {
        Self::spawn(environment, configuration, None).await
    }

    /// Start an HTTPS server using the given certificates
    pub async fn start_tls(
        environment: StaticEnvironment,
        configuration: LayeredConfiguration,
        certs: &TestCertificates,
    ) -> Self {
        let tls_config = load_server_config_from_pem(&certs.server_cert_pem, &certs.server_key_pem)
            .expect("Failed to load server TLS config");
        let acceptor = TlsAcceptor::from(Arc::new(tls_config));
        Self::spawn(environment, configuration, Some(acceptor)).await
    }

    async fn spawn(
        environment: StaticEnvironment,
        configuration: LayeredConfiguration,
        tls_acceptor: Option<TlsAcceptor>,
    ) -> Self {
        let environment = Arc::new(environment);
        let scheme = if tls_acceptor.is_some() { "https" } else { "http" };

        let resolver = SecretResolver::new(environment.clone(), Arc::new(configuration));
        let api = SecretsApi::new(resolver, tls_acceptor);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind secrets API");
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            tokio::select! {
                result = api.run_with_listener(listener) => {
                    if let Err(e) = result {
                        tracing::error!("Secrets API error: {}", e);
                    }
                }
                _ = shutdown_rx => {
                    tracing::debug!("Secrets API shutting down");
                }
            }
        });

        Self {
            addr,
            environment,
            scheme,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Full URL for a raw path and query (e.g., "/api/secrets/local?variable=X")
    pub fn url(&self, path_and_query: &str) -> String {
        format!("{}://{}{}", self.scheme, self.addr, path_and_query)
    }

    /// URL of the endpoint serving `kind`, without a query
    pub fn url_for(&self, kind: SourceKind) -> String {
        self.url(&path_for(kind))
    }

    /// Shutdown the test server
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
