//! Error taxonomy for the server core.
//!
//! Anything that invalidates the server as a whole (bind, initial corpus,
//! initial config, initial TLS material) should be treated as fatal by
//! callers; anything scoped to one connection is logged and discarded.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("config file not found: {0}")]
    ConfigMissing(PathBuf),

    #[error("config file malformed: {0}")]
    ConfigMalformed(String),

    #[error("corpus file not found: {0}")]
    CorpusMissing(PathBuf),

    #[error("failed to bind {host}:{port}: {source}")]
    Bind {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("certificate generation failed: {0}")]
    CertGenerateFailed(String),

    #[error("TLS handshake failed: {0}")]
    TlsHandshake(String),

    #[error("client I/O error: {0}")]
    ClientIo(#[from] std::io::Error),

    #[error("could not decode query as UTF-8")]
    Decode,
}

pub type Result<T> = std::result::Result<T, ServerError>;
