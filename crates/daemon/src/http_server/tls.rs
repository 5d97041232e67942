//! Server-side rustls configuration for the mutual-TLS listener

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustls::server::{VerifierBuilderError, WebPkiClientVerifier};
use rustls::{RootCertStore, ServerConfig};
use rustls_pki_types::pem::{self, PemObject};
use rustls_pki_types::{CertificateDer, PrivateKeyDer};

use crate::state::TlsConfig;

#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("failed to read PEM from {path}: {source}")]
    Pem {
        path: PathBuf,
        #[source]
        source: pem::Error,
    },
    #[error("no certificates found in {0}")]
    NoCertificates(PathBuf),
    #[error("invalid client CA certificate in {path}: {source}")]
    ClientCa {
        path: PathBuf,
        #[source]
        source: rustls::Error,
    },
    #[error("failed to build client certificate verifier: {0}")]
    Verifier(#[from] VerifierBuilderError),
    #[error("invalid server certificate or key: {0}")]
    ServerCert(#[from] rustls::Error),
}

fn read_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let pem_error = |source| TlsError::Pem {
        path: path.to_path_buf(),
        source,
    };
    let certs = CertificateDer::pem_file_iter(path)
        .map_err(pem_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(pem_error)?;
    if certs.is_empty() {
        return Err(TlsError::NoCertificates(path.to_path_buf()));
    }
    Ok(certs)
}

/// Build a rustls server config that presents `cert_path`/`key_path`
///  and requires a client certificate chaining to `client_ca_path`.
///  Negotiates h2 and http/1.1.
pub fn load_server_config(tls: &TlsConfig) -> Result<Arc<ServerConfig>, TlsError> {
    // errors only when a provider is already installed
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let mut roots = RootCertStore::empty();
    for ca in read_certs(&tls.client_ca_path)? {
        roots.add(ca).map_err(|source| TlsError::ClientCa {
            path: tls.client_ca_path.clone(),
            source,
        })?;
    }
    let verifier = WebPkiClientVerifier::builder(Arc::new(roots)).build()?;

    let certs = read_certs(&tls.cert_path)?;
    let key = PrivateKeyDer::from_pem_file(&tls.key_path).map_err(|source| TlsError::Pem {
        path: tls.key_path.clone(),
        source,
    })?;

    let mut config = ServerConfig::builder()
        .with_client_cert_verifier(verifier)
        .with_single_cert(certs, key)?;
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    tracing::info!(
        cert = %tls.cert_path.display(),
        client_ca = %tls.client_ca_path.display(),
        "loaded TLS material"
    );
    Ok(Arc::new(config))
}
