use std::io::Cursor;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;
use rustls_pemfile::{certs, private_key};
use thiserror::Error;

/// Errors from loading HTTPS material
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("Certificate error: {0}")]
    Certificate(String),

    #[error("TLS error: {0}")]
    Tls(String),
}

/// Load certificates from PEM content string
fn load_certs_from_pem(pem_content: &str) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let mut cursor = Cursor::new(pem_content.as_bytes());
    let certs = certs(&mut cursor)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| TlsError::Certificate(format!("Failed to parse certificates: {}", e)))?;

    if certs.is_empty() {
        return Err(TlsError::Certificate(
            "No certificates found in PEM content".to_string(),
        ));
    }
    Ok(certs)
}

/// Load a private key from PEM content string
fn load_private_key_from_pem(pem_content: &str) -> Result<PrivateKeyDer<'static>, TlsError> {
    let mut cursor = Cursor::new(pem_content.as_bytes());
    private_key(&mut cursor)
        .map_err(|e| TlsError::Certificate(format!("Failed to parse private key: {}", e)))?
        .ok_or_else(|| TlsError::Certificate("No private key found in PEM content".to_string()))
}

/// Load server TLS config from PEM content strings
///
/// Clients are not asked for certificates; the API has no authentication.
///
/// # Arguments
/// * `cert_pem` - Server certificate chain PEM content
/// * `key_pem` - Server private key PEM content
pub fn load_server_config_from_pem(cert_pem: &str, key_pem: &str) -> Result<ServerConfig, TlsError> {
    let certs = load_certs_from_pem(cert_pem)?;
    let key = load_private_key_from_pem(key_pem)?;

    let mut config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| TlsError::Tls(format!("Failed to build server config: {}", e)))?;
    config.alpn_protocols = vec![b"http/1.1".to_vec()];

    Ok(config)
}
