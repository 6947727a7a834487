//! Hot-reload coordinator (C7): on every accepted connection, re-parse the
//! config file and, if the freshly-parsed `reread_on_query` is set, reload
//! the corpus before dispatch. Mirrors `fsearch/server.py::receive`'s
//! reread block, run inline in the accept loop before a worker thread is
//! spawned.
//!
//! Per spec §9's "Open question — reread scope": a re-read config's own
//! `reread_on_query` governs *that* connection's reload decision, even if
//! it just flipped from the previous connection's value. This is preserved
//! deliberately rather than made sticky.

use std::path::Path;
use std::sync::{Arc, RwLock};

use log::warn;

use crate::config::{self, ConfigOverrides, ConfigSnapshot};
use crate::corpus::{self, CorpusSnapshot};

/// Re-parses `config_path`, applies `overrides`, and publishes the result
/// into `current_config`. On a parse failure the previous snapshot is
/// retained and a warning logged (spec §7: non-fatal during hot-reload).
/// If the resulting config has `reread_on_query` set, also reloads the
/// corpus and publishes it into `current_corpus`.
///
/// Returns the config snapshot this connection should search against.
pub fn reload_before_dispatch(
    config_path: &Path,
    overrides: &ConfigOverrides,
    max_lines: usize,
    current_config: &RwLock<Arc<ConfigSnapshot>>,
    current_corpus: &RwLock<Arc<CorpusSnapshot>>,
) -> (Arc<ConfigSnapshot>, Arc<CorpusSnapshot>) {
    let effective = match config::load(config_path) {
        Ok(parsed) => {
            let merged = Arc::new(overrides.apply(parsed));
            *current_config.write().unwrap() = merged.clone();
            merged
        }
        Err(e) => {
            warn!("config reread failed, keeping previous snapshot: {e}");
            current_config.read().unwrap().clone()
        }
    };

    if effective.reread_on_query {
        match corpus::read(&effective.linuxpath, max_lines) {
            Ok(fresh) => {
                let fresh = Arc::new(fresh);
                *current_corpus.write().unwrap() = fresh.clone();
                return (effective, fresh);
            }
            Err(e) => {
                warn!("corpus reread failed, keeping previous snapshot: {e}");
            }
        }
    }

    let corpus = current_corpus.read().unwrap().clone();
    (effective, corpus)
}
