//! Listener (C5): binds a TCP socket with hot-restart-friendly options and
//! runs the single-threaded accept loop. Built on `socket2` for
//! `SO_REUSEADDR`/`SO_REUSEPORT`, the same crate/feature combination the
//! teacher's own `Cargo.toml` carries (`socket2 = { version = "0.5",
//! features = ["all"] }`), grounded on the low-level socket tuning pattern
//! in `open-telemetry-otel-arrow`'s `receiver`/`engine` crates
//! (`effect.rs::std_tcp_listener`, `effect_handler.rs`).

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use socket2::{Domain, Socket, Type};

use crate::error::{Result, ServerError};

/// Shared stop flag the accept loop polls between accepts, and that
/// `Listener::shutdown` flips. `Arc`'d so a caller can hold a handle and
/// request shutdown from another thread (spec §4.5's `stopping` state).
#[derive(Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct Listener {
    inner: TcpListener,
    stop: StopSignal,
}

impl Listener {
    /// Binds `host:port` with `SO_REUSEADDR` and `SO_REUSEPORT` set, then
    /// listens with a backlog of `backlog` (spec's `max_conn`, default 5).
    pub fn bind(host: &str, port: u16, backlog: i32) -> Result<Self> {
        let addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e| ServerError::Bind {
                host: host.to_string(),
                port,
                source: io::Error::new(io::ErrorKind::InvalidInput, format!("{e}")),
            })?;

        let bind_err = |source: io::Error| ServerError::Bind {
            host: host.to_string(),
            port,
            source,
        };

        let domain = if addr.is_ipv4() { Domain::IPV4 } else { Domain::IPV6 };
        let sock = Socket::new(domain, Type::STREAM, None).map_err(bind_err)?;
        sock.set_reuse_address(true).map_err(bind_err)?;
        #[cfg(unix)]
        sock.set_reuse_port(true).map_err(bind_err)?;
        sock.bind(&addr.into()).map_err(bind_err)?;
        sock.listen(backlog).map_err(bind_err)?;
        // accept() polls non-blockingly so shutdown() can't wedge the loop.
        sock.set_nonblocking(true).map_err(bind_err)?;

        let inner: TcpListener = sock.into();
        info!("listening on {host}:{port} (backlog={backlog})");

        Ok(Self {
            inner,
            stop: StopSignal::new(),
        })
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Accepts connections until `stop` is set, invoking `handler` for each
    /// one. `handler` is expected to hand the connection off quickly (e.g.
    /// spawn a worker thread) so the single-threaded accept loop can keep
    /// polling.
    pub fn accept_loop<F>(&self, mut handler: F)
    where
        F: FnMut(TcpStream, SocketAddr),
    {
        info!("accept loop started");
        while !self.stop.is_set() {
            match self.inner.accept() {
                Ok((stream, addr)) => handler(stream, addr),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(e) => {
                    warn!("accept error: {e}");
                    std::thread::sleep(Duration::from_millis(10));
                }
            }
        }
        info!("accept loop stopped");
    }

    /// Flips the stop flag. Idempotent; does not itself block, since the
    /// accept loop polls non-blockingly and will observe the flag on its
    /// next wakeup at most `10ms` later.
    pub fn shutdown(&self) {
        self.stop.trigger();
    }
}
