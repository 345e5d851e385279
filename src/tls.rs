//! TLS material loading and cross-verification
//!
//! Mutual-TLS backends are configured with a path triple: client
//! certificate, private key, and root certificate. [`TlsMaterial::load`]
//! reads the triple from disk, parses it, verifies that the client
//! certificate chains to the loaded roots, and compiles a rustls client
//! configuration restricted to TLS 1.2 and newer. Material that fails
//! verification is never handed out.

use crate::{Error, Result};
use rustls::crypto::CryptoProvider;
use rustls::server::danger::ClientCertVerifier;
use rustls::server::WebPkiClientVerifier;
use rustls::{ClientConfig, RootCertStore};
use rustls_pki_types::{CertificateDer, PrivateKeyDer, UnixTime};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_rustls::TlsConnector;

/// File-system paths to a mutual-TLS triple.
///
/// Carried inside backend configurations; absence of a value means the
/// backend is provisioned over plaintext.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TlsPaths {
    /// Client certificate (PEM)
    pub certificate: PathBuf,
    /// Client private key (PEM)
    pub key: PathBuf,
    /// Root certificate(s) the client certificate must chain to (PEM)
    pub root_certificate: PathBuf,
}

/// Verified TLS bundle.
///
/// Holds the raw PEM inputs for drivers that ingest material directly, the
/// parsed client certificate chain, the root trust store, and a compiled
/// [`ClientConfig`] with the certificate/key pair attached as client auth.
/// A value of this type only exists after the client certificate verified
/// against the loaded roots.
#[derive(Clone)]
pub struct TlsMaterial {
    cert_pem: Vec<u8>,
    key_pem: Vec<u8>,
    root_pem: Vec<u8>,
    cert_chain: Vec<CertificateDer<'static>>,
    roots: Arc<RootCertStore>,
    client_config: Arc<ClientConfig>,
}

impl TlsMaterial {
    /// Load and cross-verify a path triple.
    ///
    /// # Errors
    ///
    /// * [`Error::Io`] when a file is missing or unreadable, naming the path
    /// * [`Error::CertificateFormat`] when a file does not parse as PEM
    ///   certificate or key material
    /// * [`Error::UntrustedCertificate`] when the client certificate does
    ///   not chain to the loaded roots
    /// * [`Error::Tls`] when the verifier or client configuration cannot be
    ///   assembled from otherwise valid material
    pub fn load(paths: &TlsPaths) -> Result<Self> {
        let cert_pem = read_file(&paths.certificate)?;
        let key_pem = read_file(&paths.key)?;
        let root_pem = read_file(&paths.root_certificate)?;

        let roots = parse_roots(&root_pem, &paths.root_certificate)?;
        let cert_chain = parse_cert_chain(&cert_pem, &paths.certificate)?;
        let key = parse_key(&key_pem, &paths.key)?;

        verify_against_roots(&cert_chain, roots.clone(), &paths.certificate)?;

        let provider = crypto_provider();
        let client_config = ClientConfig::builder_with_provider(provider)
            .with_protocol_versions(&[&rustls::version::TLS13, &rustls::version::TLS12])
            .map_err(|e| Error::Tls(format!("unsupported protocol versions: {e}")))?
            .with_root_certificates(roots.clone())
            .with_client_auth_cert(cert_chain.clone(), key)
            .map_err(|e| Error::Tls(format!("could not assemble client config: {e}")))?;

        Ok(Self {
            cert_pem,
            key_pem,
            root_pem,
            cert_chain,
            roots,
            client_config: Arc::new(client_config),
        })
    }

    /// Raw PEM bytes of the client certificate file.
    pub fn cert_pem(&self) -> &[u8] {
        &self.cert_pem
    }

    /// Raw PEM bytes of the private-key file.
    pub fn key_pem(&self) -> &[u8] {
        &self.key_pem
    }

    /// Raw PEM bytes of the root-certificate file.
    pub fn root_pem(&self) -> &[u8] {
        &self.root_pem
    }

    /// Parsed client certificate chain, end-entity first.
    pub fn cert_chain(&self) -> &[CertificateDer<'static>] {
        &self.cert_chain
    }

    /// Root trust store the client certificate verified against.
    pub fn roots(&self) -> Arc<RootCertStore> {
        self.roots.clone()
    }

    /// Compiled rustls client configuration (TLS 1.2 floor, client auth).
    pub fn client_config(&self) -> Arc<ClientConfig> {
        self.client_config.clone()
    }

    /// Connector for callers that drive their own TLS streams.
    pub fn connector(&self) -> TlsConnector {
        TlsConnector::from(self.client_config.clone())
    }
}

impl std::fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsMaterial")
            .field("cert_chain_len", &self.cert_chain.len())
            .field("roots", &self.roots.len())
            .field("client_config", &"<ClientConfig>")
            .finish()
    }
}

fn crypto_provider() -> Arc<CryptoProvider> {
    Arc::new(rustls::crypto::ring::default_provider())
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_roots(pem: &[u8], path: &Path) -> Result<Arc<RootCertStore>> {
    let certs = rustls_pemfile::certs(&mut &pem[..])
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::CertificateFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    if certs.is_empty() {
        return Err(Error::CertificateFormat {
            path: path.to_path_buf(),
            reason: "no certificates found".into(),
        });
    }

    let mut store = RootCertStore::empty();
    for cert in certs {
        store.add(cert).map_err(|e| Error::CertificateFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    }
    Ok(Arc::new(store))
}

fn parse_cert_chain(pem: &[u8], path: &Path) -> Result<Vec<CertificateDer<'static>>> {
    let chain = rustls_pemfile::certs(&mut &pem[..])
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::CertificateFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    if chain.is_empty() {
        return Err(Error::CertificateFormat {
            path: path.to_path_buf(),
            reason: "no certificates found".into(),
        });
    }
    Ok(chain)
}

fn parse_key(pem: &[u8], path: &Path) -> Result<PrivateKeyDer<'static>> {
    rustls_pemfile::private_key(&mut &pem[..])
        .map_err(|e| Error::CertificateFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
        .ok_or_else(|| Error::CertificateFormat {
            path: path.to_path_buf(),
            reason: "no private key found".into(),
        })
}

/// Verify the end-entity certificate against the loaded anchors under the
/// default webpki policy, with no custom intermediate set.
fn verify_against_roots(
    chain: &[CertificateDer<'static>],
    roots: Arc<RootCertStore>,
    path: &Path,
) -> Result<()> {
    let verifier = WebPkiClientVerifier::builder_with_provider(roots, crypto_provider())
        .build()
        .map_err(|e| Error::Tls(format!("could not build certificate verifier: {e}")))?;

    let end_entity = chain.first().ok_or_else(|| Error::CertificateFormat {
        path: path.to_path_buf(),
        reason: "no certificates found".into(),
    })?;

    verifier
        .verify_client_cert(end_entity, &[], UnixTime::now())
        .map_err(|e| Error::UntrustedCertificate {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    Ok(())
}
