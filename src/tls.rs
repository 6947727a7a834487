//! TLS provisioner (C4): locates or generates a self-signed certificate
//! pair, and wraps an accepted `TcpStream` in a `rustls` server connection.
//!
//! Certificate generation shells out to the system `openssl`, exactly as
//! `fsearch/utils.py::generate_self_signed_cert` does, rather than
//! embedding a certificate-generation stack (spec §9, "TLS provisioning by
//! subprocess" — an intentional choice carried forward). Socket wrapping
//! follows `artemonad-QuiverDB/follower/src/main.rs::tls_wrap_server`,
//! which is the teacher's own precedent for `rustls` + `rustls-pemfile`.

use std::fs::File;
use std::io::BufReader;
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use log::info;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs1KeyDer, PrivatePkcs8KeyDer};
use rustls::{ServerConfig, ServerConnection, StreamOwned};
use rustls_pemfile::{certs, pkcs8_private_keys, rsa_private_keys};

use crate::error::{Result, ServerError};

const PLACEHOLDER_SUBJECT: &str =
    "/C=US/ST=California/L=San Francisco/O=My Company/OU=Org/CN=mydomain.com";

/// A TLS-wrapped connection, ready for one request/response round trip.
pub type TlsStream = StreamOwned<ServerConnection, TcpStream>;

/// Returns `(certfile, keyfile)` unchanged if both already exist;
/// otherwise creates `dir` and generates a fresh self-signed 2048-bit RSA
/// pair valid 365 days via `openssl`. Never overwrites an existing pair
/// (spec §4.4).
pub fn ensure_certs(dir: &Path, certfile: &Path, keyfile: &Path) -> Result<(PathBuf, PathBuf)> {
    if certfile.exists() && keyfile.exists() {
        return Ok((certfile.to_path_buf(), keyfile.to_path_buf()));
    }

    std::fs::create_dir_all(dir)
        .map_err(|e| ServerError::CertGenerateFailed(format!("create {}: {e}", dir.display())))?;

    info!(
        "generating self-signed TLS certificate at {} / {}",
        certfile.display(),
        keyfile.display()
    );

    let status = Command::new("openssl")
        .args([
            "req",
            "-x509",
            "-nodes",
            "-days",
            "365",
            "-newkey",
            "rsa:2048",
            "-keyout",
        ])
        .arg(keyfile)
        .arg("-out")
        .arg(certfile)
        .args(["-subj", PLACEHOLDER_SUBJECT])
        .status()
        .map_err(|e| ServerError::CertGenerateFailed(format!("spawn openssl: {e}")))?;

    if !status.success() {
        return Err(ServerError::CertGenerateFailed(format!(
            "openssl exited with {status}"
        )));
    }

    Ok((certfile.to_path_buf(), keyfile.to_path_buf()))
}

fn load_cert_chain(path: &Path) -> Result<Vec<CertificateDer<'static>>> {
    let file = File::open(path).map_err(|e| {
        ServerError::TlsHandshake(format!("open cert {}: {e}", path.display()))
    })?;
    let mut reader = BufReader::new(file);
    let raw = certs(&mut reader)
        .map_err(|e| ServerError::TlsHandshake(format!("parse cert {}: {e}", path.display())))?;
    if raw.is_empty() {
        return Err(ServerError::TlsHandshake(format!(
            "no certificates found in {}",
            path.display()
        )));
    }
    Ok(raw.into_iter().map(CertificateDer::from).collect())
}

fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>> {
    let open = || {
        File::open(path)
            .map_err(|e| ServerError::TlsHandshake(format!("open key {}: {e}", path.display())))
    };

    let mut reader = BufReader::new(open()?);
    let pkcs8 = pkcs8_private_keys(&mut reader)
        .map_err(|e| ServerError::TlsHandshake(format!("parse pkcs8 key: {e}")))?;
    if let Some(k) = pkcs8.into_iter().next() {
        return Ok(PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(k)));
    }

    let mut reader2 = BufReader::new(open()?);
    let rsa = rsa_private_keys(&mut reader2)
        .map_err(|e| ServerError::TlsHandshake(format!("parse rsa key: {e}")))?;
    let k = rsa.into_iter().next().ok_or_else(|| {
        ServerError::TlsHandshake(format!("no private keys found in {}", path.display()))
    })?;
    Ok(PrivateKeyDer::Pkcs1(PrivatePkcs1KeyDer::from(k)))
}

/// Builds a reusable `rustls::ServerConfig` from a cert/key pair on disk.
pub fn server_config(certfile: &Path, keyfile: &Path) -> Result<Arc<ServerConfig>> {
    let chain = load_cert_chain(certfile)?;
    let key = load_private_key(keyfile)?;

    let cfg = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(chain, key)
        .map_err(|e| ServerError::TlsHandshake(format!("build server config: {e}")))?;

    Ok(Arc::new(cfg))
}

/// Wraps an accepted, plaintext `TcpStream` in a TLS server connection.
pub fn wrap(stream: TcpStream, cfg: Arc<ServerConfig>) -> Result<TlsStream> {
    let conn = ServerConnection::new(cfg)
        .map_err(|e| ServerError::TlsHandshake(format!("create server connection: {e}")))?;
    Ok(StreamOwned::new(conn, stream))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_pair_is_returned_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("server.crt");
        let key = dir.path().join("server.key");
        std::fs::write(&cert, b"existing-cert").unwrap();
        std::fs::write(&key, b"existing-key").unwrap();

        let (c, k) = ensure_certs(dir.path(), &cert, &key).unwrap();
        assert_eq!(c, cert);
        assert_eq!(k, key);
        assert_eq!(std::fs::read(&c).unwrap(), b"existing-cert");
    }
}
