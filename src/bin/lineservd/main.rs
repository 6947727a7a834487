//! Thin CLI wrapper around the `lineserv` library: parses a config path
//! plus override flags, builds a `Server`, and runs it until interrupted.
//! CLI wrapping is explicitly out of the core's scope (spec §6), but a
//! library with no entry point is not a deployable server, so this bin
//! exists the way `quiverdb`/`quiverdb-follower` sit around
//! `artemonad-QuiverDB`'s library crate.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::{error, info};

use lineserv::config::{self, ConfigOverrides, LogLevel};
use lineserv::search::Algorithm;
use lineserv::server::ServerOptions;
use lineserv::Server;

#[derive(Parser, Debug)]
#[command(
    name = "lineservd",
    version,
    about = "TCP server answering exact whole-line corpus lookups"
)]
struct Cli {
    /// Path to the INI-style server config file.
    #[arg(long, default_value = "config.ini")]
    config: PathBuf,

    /// Override: bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override: bind port.
    #[arg(long)]
    port: Option<u16>,

    /// Override: enable TLS termination.
    #[arg(long)]
    ssl: Option<bool>,

    /// Override: TLS certificate file path.
    #[arg(long)]
    certfile: Option<PathBuf>,

    /// Override: TLS private key file path.
    #[arg(long)]
    keyfile: Option<PathBuf>,

    /// Override: diagnostic log level (DEBUG|INFO|WARN|ERROR).
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Override: path to the corpus text file.
    #[arg(long)]
    linuxpath: Option<PathBuf>,

    /// Override: re-read the corpus on every connection.
    #[arg(long)]
    reread_on_query: Option<bool>,

    /// Search algorithm backing every connection.
    #[arg(long, default_value = "regex")]
    algorithm: Algorithm,

    /// Directory self-signed TLS material is generated into when missing.
    #[arg(long, default_value = "./.certs")]
    certs_dir: PathBuf,

    /// TCP accept backlog / max concurrent connections.
    #[arg(long, default_value_t = 5)]
    max_conn: i32,

    /// Maximum number of corpus lines to hold in memory.
    #[arg(long, default_value_t = lineserv::corpus::DEFAULT_MAX_LINES)]
    max_lines: usize,
}

fn main() {
    if let Err(e) = run() {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Cli::parse();

    let overrides = ConfigOverrides {
        host: args.host,
        port: args.port,
        ssl: args.ssl,
        certfile: args.certfile,
        keyfile: args.keyfile,
        log_level: args.log_level,
        linuxpath: args.linuxpath,
        reread_on_query: args.reread_on_query,
    };

    // The config file's (or CLI's) `log_level` is what spec §3 means by
    // "applies to diagnostic output only", so the logger has to be built
    // from it rather than a hardcoded default. RUST_LOG still wins if the
    // operator set it explicitly (`Env::default().default_filter_or` only
    // falls back to our default when the env var is absent).
    let log_level = resolve_log_level(&args.config, &overrides);
    init_logger(log_level);

    let options = ServerOptions {
        algorithm: args.algorithm,
        max_conn: args.max_conn,
        max_lines: args.max_lines,
        certs_dir: args.certs_dir,
    };

    let server = Arc::new(Server::with_options(args.config, overrides, options)?);

    let stop_handle = server.clone();
    ctrlc::set_handler(move || {
        info!("received interrupt, shutting down");
        stop_handle.stop();
    })?;

    server.start()?;
    Ok(())
}

/// Resolves the `log_level` the logger should start at: the CLI override if
/// given, else the value parsed from the config file, else the
/// `ConfigSnapshot` default. Kept separate from the full `config::load` +
/// `ConfigOverrides::apply` path run later so a malformed/missing config
/// file doesn't prevent the logger (and thus the real error message) from
/// being set up.
fn resolve_log_level(config_path: &std::path::Path, overrides: &ConfigOverrides) -> LogLevel {
    overrides.log_level.unwrap_or_else(|| {
        config::load(config_path)
            .map(|cfg| cfg.log_level)
            .unwrap_or_default()
    })
}

fn init_logger(level: LogLevel) {
    env_logger::Builder::from_env(Env::default().default_filter_or(level.to_string()))
        .format_timestamp_millis()
        .init();
}
