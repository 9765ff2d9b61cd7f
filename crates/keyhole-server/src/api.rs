use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode, Uri};
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

use keyhole_secrets::{SecretOutcome, SecretRequest, SecretResolver};

use crate::routes::{route, RouteMatch};

/// Body returned when the requested value is absent or empty
pub const NOT_FOUND_MESSAGE: &str = "Variable not found";

/// Query parameter naming the key to look up
const VARIABLE_PARAM: &str = "variable";

/// HTTP API serving secret lookups
pub struct SecretsApi {
    resolver: SecretResolver,
    /// Optional TLS acceptor for HTTPS mode
    tls_acceptor: Option<TlsAcceptor>,
}

impl SecretsApi {
    pub fn new(resolver: SecretResolver, tls_acceptor: Option<TlsAcceptor>) -> Arc<Self> {
        Arc::new(Self {
            resolver,
            tls_acceptor,
        })
    }

    /// Serve an HTTP connection on any AsyncRead + AsyncWrite stream
    async fn serve_connection<S>(self: Arc<Self>, stream: S, peer_addr: SocketAddr)
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let io = TokioIo::new(stream);

        let service = service_fn(move |req| {
            let this = self.clone();
            async move { this.handle_request(req).await }
        });

        if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
            tracing::debug!("HTTP connection error from {}: {}", peer_addr, e);
        }
    }

    /// Bind `addr` and serve until the listener fails
    pub async fn run(self: Arc<Self>, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.run_with_listener(listener).await
    }

    /// Serve on an already-bound listener
    pub async fn run_with_listener(self: Arc<Self>, listener: TcpListener) -> Result<()> {
        let addr = listener.local_addr()?;
        if self.tls_acceptor.is_some() {
            tracing::info!("Secrets API listening on https://{}", addr);
        } else {
            tracing::info!("Secrets API listening on http://{}", addr);
        }

        loop {
            let (stream, peer_addr) = listener.accept().await?;
            tracing::debug!("HTTP connection from {}", peer_addr);
            let this = self.clone();

            tokio::spawn(async move {
                if let Some(ref acceptor) = this.tls_acceptor {
                    match acceptor.accept(stream).await {
                        Ok(tls_stream) => {
                            this.serve_connection(tls_stream, peer_addr).await;
                        }
                        Err(e) => {
                            tracing::warn!("TLS handshake failed from {}: {}", peer_addr, e);
                        }
                    }
                } else {
                    this.serve_connection(stream, peer_addr).await;
                }
            });
        }
    }

    async fn handle_request(
        self: Arc<Self>,
        req: Request<Incoming>,
    ) -> Result<Response<Full<Bytes>>, Infallible> {
        Ok(self.handle(req.method(), req.uri()))
    }

    /// Route a request and build its response
    pub fn handle(&self, method: &Method, uri: &Uri) -> Response<Full<Bytes>> {
        let path = uri.path();

        let source = match route(path) {
            RouteMatch::Secret(source) => source,
            RouteMatch::Unknown => {
                tracing::debug!(%method, path, "No route");
                return text_response(StatusCode::NOT_FOUND, "Not Found");
            }
        };

        if method != Method::GET {
            tracing::debug!(%method, path, "Method not allowed");
            let mut response = text_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("GET"));
            return response;
        }

        let request = SecretRequest::new(source, query_variable(uri.query()));
        let outcome = self.resolver.resolve(&request);
        let response = outcome_response(&outcome);

        tracing::info!(
            source = source.name(),
            key = request.key(),
            outcome = outcome.kind_name(),
            status = response.status().as_u16(),
            "Secret request"
        );

        response
    }
}

/// First `variable` query parameter, name matched ignoring ASCII case
fn query_variable(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(name, _)| name.eq_ignore_ascii_case(VARIABLE_PARAM))
        .map(|(_, value)| value.into_owned())
}

fn outcome_response(outcome: &SecretOutcome) -> Response<Full<Bytes>> {
    match outcome {
        SecretOutcome::Found(value) => text_response(StatusCode::OK, value.clone()),
        SecretOutcome::NotFound => text_response(StatusCode::BAD_REQUEST, NOT_FOUND_MESSAGE),
        SecretOutcome::Unsupported(reason) => {
            text_response(StatusCode::BAD_REQUEST, reason.clone())
        }
    }
}

fn text_response(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
