//! Per-connection worker (C6): one thread per accepted connection, doing
//! exactly one read/search/write round trip. Mirrors
//! `fsearch/server.py::Server._handle_client`, but as a free function
//! generic over any `Read + Write` stream so the same code path serves
//! both plain and TLS-wrapped connections.

use std::io::{Read, Write};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, warn};
use serde::Serialize;

use crate::corpus::CorpusSnapshot;
use crate::search::Algorithm;

pub const MAX_PAYLOAD: usize = 1024;
pub const RESPONSE_EXISTS: &[u8] = b"STRING EXISTS";
pub const RESPONSE_NOT_FOUND: &[u8] = b"STRING NOT FOUND";

/// One structured diagnostic line per request (spec §4.7 step 5 / §7),
/// serialized the same way the teacher serializes its own on-disk
/// manifests: a derived `Serialize` impl fed through `serde_json`.
#[derive(Serialize)]
struct QueryLog<'a> {
    query: &'a str,
    client_addr: String,
    elapsed_ms: f64,
    algorithm: &'static str,
}

/// Strips trailing NUL bytes and decodes the remainder as UTF-8. Returns
/// `None` on invalid UTF-8, which the caller treats as a non-match rather
/// than an error (spec §7, `ErrDecode`).
fn decode_query(raw: &[u8]) -> Option<String> {
    let trimmed = {
        let end = raw.iter().rposition(|&b| b != 0).map(|i| i + 1).unwrap_or(0);
        &raw[..end]
    };
    std::str::from_utf8(trimmed).ok().map(|s| s.to_string())
}

/// Runs one request/response round trip over `stream`: read up to
/// `MAX_PAYLOAD` bytes, decode, search, respond, log. Never retries, never
/// loops — one payload per connection (spec §4.7).
pub fn handle<S: Read + Write>(
    mut stream: S,
    client_addr: SocketAddr,
    corpus: &Arc<CorpusSnapshot>,
    algorithm: Algorithm,
    start: Instant,
) {
    let mut buf = [0u8; MAX_PAYLOAD];
    let n = match stream.read(&mut buf) {
        Ok(n) => n,
        Err(e) => {
            warn!("client I/O error from {client_addr}: {e}");
            return;
        }
    };

    let response: &[u8] = match decode_query(&buf[..n]) {
        Some(query) => {
            let found = algorithm.exists(corpus, &query);
            let resp = if found {
                RESPONSE_EXISTS
            } else {
                RESPONSE_NOT_FOUND
            };
            let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
            let log_entry = QueryLog {
                query: &query,
                client_addr: client_addr.to_string(),
                elapsed_ms,
                algorithm: algorithm.name(),
            };
            match serde_json::to_string(&log_entry) {
                Ok(line) => debug!("{line}"),
                Err(e) => warn!("failed to serialize query log: {e}"),
            }
            resp
        }
        None => {
            warn!("non-UTF8 payload from {client_addr}, treating as no match");
            RESPONSE_NOT_FOUND
        }
    };

    if let Err(e) = stream.write_all(response) {
        warn!("client I/O error writing to {client_addr}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct InMemStream {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl Read for InMemStream {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for InMemStream {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.output.write(buf)
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn addr() -> SocketAddr {
        "127.0.0.1:9".parse().unwrap()
    }

    #[test]
    fn strips_trailing_nul_and_matches() {
        let corpus = Arc::new(CorpusSnapshot::from_lines(vec![
            "alpha".to_string(),
            "beta".to_string(),
        ]));
        let mut stream = InMemStream {
            input: Cursor::new(b"beta\x00\x00".to_vec()),
            output: Vec::new(),
        };
        handle(&mut stream, addr(), &corpus, Algorithm::Naive, Instant::now());
        assert_eq!(stream.output, RESPONSE_EXISTS);
    }

    #[test]
    fn non_utf8_payload_is_not_found() {
        let corpus = Arc::new(CorpusSnapshot::from_lines(vec!["alpha".to_string()]));
        let mut stream = InMemStream {
            input: Cursor::new(vec![0xff, 0xfe, 0xfd]),
            output: Vec::new(),
        };
        handle(&mut stream, addr(), &corpus, Algorithm::Naive, Instant::now());
        assert_eq!(stream.output, RESPONSE_NOT_FOUND);
    }

    #[test]
    fn no_match_response() {
        let corpus = Arc::new(CorpusSnapshot::from_lines(vec!["alpha".to_string()]));
        let mut stream = InMemStream {
            input: Cursor::new(b"zzz".to_vec()),
            output: Vec::new(),
        };
        handle(&mut stream, addr(), &corpus, Algorithm::Naive, Instant::now());
        assert_eq!(stream.output, RESPONSE_NOT_FOUND);
    }

    #[test]
    fn oversized_payload_is_bounded_to_max_payload() {
        let corpus = Arc::new(CorpusSnapshot::from_lines(vec!["x".repeat(2000)]));
        let mut big = vec![b'x'; 4096];
        big.truncate(4096);
        let mut stream = InMemStream {
            input: Cursor::new(big),
            output: Vec::new(),
        };
        // a single read() call never returns more than MAX_PAYLOAD bytes
        // because the destination buffer itself is that size.
        handle(&mut stream, addr(), &corpus, Algorithm::Naive, Instant::now());
        assert_eq!(stream.output, RESPONSE_NOT_FOUND);
    }
}
