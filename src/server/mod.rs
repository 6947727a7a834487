//! Server runtime: wires together the config store (C1), corpus loader
//! (C2), search engine (C3), TLS provisioner (C4), listener (C5), worker
//! (C6), hot-reload coordinator (C7) and lifecycle controller (C8) into
//! the programmatic surface `Server::new` / `Server::start` /
//! `Server::stop` (spec §6).

mod coordinator;
mod lifecycle;
pub mod worker;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use log::{error, info};

use crate::config::{self, ConfigOverrides, ConfigSnapshot};
use crate::corpus::{self, CorpusSnapshot, DEFAULT_MAX_LINES};
use crate::error::{Result, ServerError};
use crate::net::{Listener, StopSignal};
use crate::search::Algorithm;
use crate::tls;

pub use lifecycle::State as LifecycleState;

/// Deployment-time knobs that sit outside the INI config file: which
/// search algorithm backs every connection, how many lines to cap the
/// corpus at, the listen backlog, and where self-signed certs land.
#[derive(Clone, Debug)]
pub struct ServerOptions {
    pub algorithm: Algorithm,
    pub max_conn: i32,
    pub max_lines: usize,
    pub certs_dir: PathBuf,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            max_conn: 5,
            max_lines: DEFAULT_MAX_LINES,
            certs_dir: PathBuf::from("./.certs"),
        }
    }
}

pub struct Server {
    config_path: PathBuf,
    overrides: ConfigOverrides,
    options: ServerOptions,
    config: RwLock<Arc<ConfigSnapshot>>,
    corpus: RwLock<Arc<CorpusSnapshot>>,
    tls_config: Option<Arc<rustls::ServerConfig>>,
    lifecycle: lifecycle::Lifecycle,
    stop: RwLock<Option<StopSignal>>,
}

impl Server {
    /// Builds a server from a config file path plus overrides. Fails
    /// fatally (spec §7) if the config or corpus cannot be loaded at
    /// startup, or if TLS is requested and certificate material cannot be
    /// provisioned.
    pub fn new(config_path: PathBuf, overrides: ConfigOverrides) -> Result<Self> {
        Self::with_options(config_path, overrides, ServerOptions::default())
    }

    pub fn with_options(
        config_path: PathBuf,
        overrides: ConfigOverrides,
        options: ServerOptions,
    ) -> Result<Self> {
        let parsed = config::load(&config_path)?;
        let merged = overrides.apply(parsed);

        let corpus = corpus::read(&merged.linuxpath, options.max_lines)?;

        let tls_config = if merged.ssl {
            let (cert, key) = tls::ensure_certs(&options.certs_dir, &merged.certfile, &merged.keyfile)?;
            Some(tls::server_config(&cert, &key)?)
        } else {
            None
        };

        Ok(Self {
            config_path,
            overrides,
            options,
            config: RwLock::new(Arc::new(merged)),
            corpus: RwLock::new(Arc::new(corpus)),
            tls_config,
            lifecycle: lifecycle::Lifecycle::new(),
            stop: RwLock::new(None),
        })
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.get()
    }

    /// Binds the listener and runs the accept loop on the calling thread
    /// until `stop()` is called. Each accepted connection re-runs the
    /// hot-reload coordinator, then is dispatched to an independent worker
    /// thread (spec §5: parallel execution, one task per connection).
    pub fn start(&self) -> Result<()> {
        let cfg = self.config.read().unwrap().clone();
        let listener = Listener::bind(&cfg.host, cfg.port, self.options.max_conn)?;
        self.lifecycle.transition(LifecycleState::Bound);

        *self.stop.write().unwrap() = Some(listener.stop_signal());
        self.lifecycle.transition(LifecycleState::Accepting);

        listener.accept_loop(|stream, addr| self.dispatch(stream, addr));

        self.lifecycle.transition(LifecycleState::Stopping);
        self.lifecycle.transition(LifecycleState::Closed);
        info!("server closed");
        Ok(())
    }

    /// Flips the lifecycle to stopping and signals the accept loop to
    /// exit. Idempotent; safe to call from a different thread than the one
    /// running `start()`. In-flight workers are allowed to finish
    /// (best-effort drain, spec §5).
    pub fn stop(&self) {
        self.lifecycle.transition(LifecycleState::Stopping);
        if let Some(stop) = self.stop.read().unwrap().as_ref() {
            stop.trigger();
        }
    }

    fn dispatch(&self, stream: std::net::TcpStream, addr: SocketAddr) {
        let start = Instant::now();

        let (_cfg, corpus) = coordinator::reload_before_dispatch(
            &self.config_path,
            &self.overrides,
            self.options.max_lines,
            &self.config,
            &self.corpus,
        );

        let algorithm = self.options.algorithm;
        let tls_config = self.tls_config.clone();

        std::thread::spawn(move || {
            if let Some(cfg) = tls_config {
                match tls::wrap(stream, cfg) {
                    Ok(tls_stream) => {
                        worker::handle(tls_stream, addr, &corpus, algorithm, start);
                    }
                    Err(e) => {
                        error!("TLS handshake failed for {addr}: {e}");
                    }
                }
            } else {
                worker::handle(stream, addr, &corpus, algorithm, start);
            }
        });
    }
}
