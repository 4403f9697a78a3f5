//! TLS configuration and certificate loading.

use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;

use crate::config::TlsConfig;

/// Error type for TLS material loading.
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no PEM certificate found in {0}")]
    NoCertificate(String),

    #[error("no PEM private key found in {0}")]
    NoPrivateKey(String),

    #[error("invalid PEM data: {0}")]
    Pem(std::io::Error),

    #[error("rejected TLS material: {0}")]
    Rustls(std::io::Error),
}

/// PEM certificate chain and private key as read from disk.
#[derive(Clone)]
pub struct TlsMaterial {
    pub cert_pem: Vec<u8>,
    pub key_pem: Vec<u8>,
}

impl std::fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsMaterial")
            .field("cert_pem", &format_args!("{} bytes", self.cert_pem.len()))
            .field("key_pem", &"<redacted>")
            .finish()
    }
}

impl TlsMaterial {
    /// Read certificate and key files.
    pub async fn load(config: &TlsConfig) -> Result<Self, TlsError> {
        Ok(Self {
            cert_pem: read(Path::new(&config.cert_path)).await?,
            key_pem: read(Path::new(&config.key_path)).await?,
        })
    }

    /// Check that the blobs contain a certificate and a private key.
    pub fn validate(&self, config: &TlsConfig) -> Result<(), TlsError> {
        let certs = rustls_pemfile::certs(&mut self.cert_pem.as_slice())
            .collect::<Result<Vec<_>, _>>()
            .map_err(TlsError::Pem)?;
        if certs.is_empty() {
            return Err(TlsError::NoCertificate(config.cert_path.clone()));
        }

        rustls_pemfile::private_key(&mut self.key_pem.as_slice())
            .map_err(TlsError::Pem)?
            .ok_or_else(|| TlsError::NoPrivateKey(config.key_path.clone()))?;

        Ok(())
    }

    /// Build the acceptor configuration for `axum-server`.
    pub async fn into_rustls_config(self) -> Result<RustlsConfig, TlsError> {
        RustlsConfig::from_pem(self.cert_pem, self.key_pem)
            .await
            .map_err(TlsError::Rustls)
    }
}

/// Load, validate and convert the configured TLS material.
pub async fn load_tls_config(config: &TlsConfig) -> Result<RustlsConfig, TlsError> {
    let material = TlsMaterial::load(config).await?;
    material.validate(config)?;
    material.into_rustls_config().await
}

async fn read(path: &Path) -> Result<Vec<u8>, TlsError> {
    tokio::fs::read(path).await.map_err(|source| TlsError::Read {
        path: path.display().to_string(),
        source,
    })
}
