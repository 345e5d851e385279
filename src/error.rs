//! Error taxonomy
//!
//! Every failure names the phase it came from: configuration validation,
//! TLS material loading, transport establishment, or the liveness probe.
//! All variants are terminal for the provisioning call that produced them;
//! the caller decides whether to retry, fall back, or abort.

use std::path::PathBuf;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Provisioning error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or missing configuration field, raised before any I/O
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A TLS input file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path of the unreadable file
        path: PathBuf,
        /// Underlying filesystem error
        #[source]
        source: std::io::Error,
    },

    /// A TLS input file did not parse as certificate or key material
    #[error("invalid certificate material in {path}: {reason}")]
    CertificateFormat {
        /// Path of the malformed file
        path: PathBuf,
        /// Parser diagnostic
        reason: String,
    },

    /// The client certificate does not chain to the configured roots
    #[error("certificate {path} is not trusted by the configured roots: {reason}")]
    UntrustedCertificate {
        /// Path of the rejected certificate
        path: PathBuf,
        /// Verifier diagnostic
        reason: String,
    },

    /// TLS client configuration could not be assembled from verified material
    #[error("TLS setup failed: {0}")]
    Tls(String),

    /// Transport could not be established (the open step)
    #[error("{backend}: could not open connection to {target}: {reason}")]
    Connection {
        /// Backend kind
        backend: &'static str,
        /// Address the connection was aimed at
        target: String,
        /// Driver diagnostic
        reason: String,
    },

    /// Connected, but the liveness probe failed (the probe step)
    #[error("{backend}: liveness probe failed for {target}: {reason}")]
    Liveness {
        /// Backend kind
        backend: &'static str,
        /// Address the probe was aimed at
        target: String,
        /// Driver diagnostic
        reason: String,
    },
}
