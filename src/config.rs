//! Configuration store (C1).
//!
//! Parses an INI-style file: a default (sectionless) block plus any number
//! of `[section]` blocks, all merged into one flat, case-insensitive key
//! mapping. Unknown keys are preserved in `extra` rather than rejected, so
//! forward-compatible config files keep working (see spec §9).

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Result, ServerError};

const TRUE_VALUES: &[&str] = &["yes", "true", "on", "1"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Debug
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        write!(f, "{s}")
    }
}

impl clap::ValueEnum for LogLevel {
    fn value_variants<'a>() -> &'a [Self] {
        &[LogLevel::Debug, LogLevel::Info, LogLevel::Warn, LogLevel::Error]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.to_string()))
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            other => Err(ServerError::ConfigMalformed(format!(
                "invalid log_level '{other}': expected DEBUG|INFO|WARN|ERROR"
            ))),
        }
    }
}

/// Immutable configuration snapshot produced by parsing one config file.
#[derive(Clone, Debug)]
pub struct ConfigSnapshot {
    pub host: String,
    pub port: u16,
    pub ssl: bool,
    pub certfile: PathBuf,
    pub keyfile: PathBuf,
    pub log_level: LogLevel,
    pub linuxpath: PathBuf,
    pub reread_on_query: bool,
    /// Unknown keys, preserved verbatim and ignored by the core.
    pub extra: HashMap<String, String>,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            ssl: false,
            certfile: PathBuf::from("server.crt"),
            keyfile: PathBuf::from("server.key"),
            log_level: LogLevel::Debug,
            linuxpath: PathBuf::new(),
            reread_on_query: false,
            extra: HashMap::new(),
        }
    }
}

/// CLI/programmatic overrides layered on top of a parsed config file.
/// Every field mirrors `ConfigSnapshot`; `Some` wins over the file value.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub ssl: Option<bool>,
    pub certfile: Option<PathBuf>,
    pub keyfile: Option<PathBuf>,
    pub log_level: Option<LogLevel>,
    pub linuxpath: Option<PathBuf>,
    pub reread_on_query: Option<bool>,
}

impl ConfigOverrides {
    pub fn apply(&self, mut snap: ConfigSnapshot) -> ConfigSnapshot {
        if let Some(v) = &self.host {
            snap.host = v.clone();
        }
        if let Some(v) = self.port {
            snap.port = v;
        }
        if let Some(v) = self.ssl {
            snap.ssl = v;
        }
        if let Some(v) = &self.certfile {
            snap.certfile = v.clone();
        }
        if let Some(v) = &self.keyfile {
            snap.keyfile = v.clone();
        }
        if let Some(v) = self.log_level {
            snap.log_level = v;
        }
        if let Some(v) = &self.linuxpath {
            snap.linuxpath = v.clone();
        }
        if let Some(v) = self.reread_on_query {
            snap.reread_on_query = v;
        }
        snap
    }
}

fn parse_bool(s: &str) -> bool {
    TRUE_VALUES.contains(&s.trim().to_ascii_lowercase().as_str())
}

/// Parses the INI-style text into a flat, case-insensitive key/value map.
/// Sections are merged: a key set in a later section overwrites an earlier
/// one, mirroring Python `configparser`'s `defaults() + sections()` merge
/// that the original implementation relies on.
fn parse_flat(text: &str) -> Result<HashMap<String, String>> {
    let mut flat = HashMap::new();

    for (lineno, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') {
            if !line.ends_with(']') {
                return Err(ServerError::ConfigMalformed(format!(
                    "line {}: unterminated section header",
                    lineno + 1
                )));
            }
            continue; // section name itself doesn't matter: everything flattens together
        }

        let (key, value) = line.split_once('=').ok_or_else(|| {
            ServerError::ConfigMalformed(format!("line {}: expected 'key = value'", lineno + 1))
        })?;
        flat.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    Ok(flat)
}

fn resolve_linuxpath(raw: &str) -> PathBuf {
    let p = PathBuf::from(raw);
    if p.is_absolute() {
        p
    } else {
        std::env::current_dir().map(|cwd| cwd.join(&p)).unwrap_or(p)
    }
}

/// Parses `path` into a `ConfigSnapshot`. Pure: no side effects beyond the
/// one read, safe to call repeatedly and concurrently (C7 depends on this).
pub fn load(path: &Path) -> Result<ConfigSnapshot> {
    if !path.is_file() {
        return Err(ServerError::ConfigMissing(path.to_path_buf()));
    }

    let text = std::fs::read_to_string(path)
        .map_err(|e| ServerError::ConfigMalformed(format!("read {}: {e}", path.display())))?;
    let flat = parse_flat(&text)?;

    let mut snap = ConfigSnapshot::default();
    let mut known: std::collections::HashSet<&'static str> = std::collections::HashSet::new();
    known.extend([
        "host",
        "port",
        "ssl",
        "certfile",
        "keyfile",
        "log_level",
        "linuxpath",
        "reread_on_query",
    ]);

    if let Some(v) = flat.get("host") {
        snap.host = v.clone();
    }
    if let Some(v) = flat.get("port") {
        snap.port = v
            .parse::<u16>()
            .map_err(|e| ServerError::ConfigMalformed(format!("invalid port '{v}': {e}")))?;
    }
    if let Some(v) = flat.get("ssl") {
        snap.ssl = parse_bool(v);
    }
    if let Some(v) = flat.get("certfile") {
        snap.certfile = PathBuf::from(v);
    }
    if let Some(v) = flat.get("keyfile") {
        snap.keyfile = PathBuf::from(v);
    }
    if let Some(v) = flat.get("log_level") {
        snap.log_level = v.parse()?;
    }
    if let Some(v) = flat.get("reread_on_query") {
        snap.reread_on_query = parse_bool(v);
    }

    match flat.get("linuxpath") {
        Some(v) => snap.linuxpath = resolve_linuxpath(v),
        None => {
            return Err(ServerError::ConfigMalformed(
                "missing required key 'linuxpath'".to_string(),
            ))
        }
    }

    snap.extra = flat
        .into_iter()
        .filter(|(k, _)| !known.contains(k.as_str()))
        .collect();

    Ok(snap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn defaults_applied_when_keys_absent() {
        let f = write_tmp("linuxpath = /tmp/data.txt\n");
        let cfg = load(f.path()).unwrap();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
        assert!(!cfg.ssl);
        assert!(!cfg.reread_on_query);
        assert_eq!(cfg.log_level, LogLevel::Debug);
    }

    #[test]
    fn boolean_truthy_forms_are_case_insensitive() {
        for v in ["yes", "YES", "true", "True", "on", "1"] {
            let f = write_tmp(&format!("linuxpath = /tmp/d.txt\nreread_on_query = {v}\n"));
            let cfg = load(f.path()).unwrap();
            assert!(cfg.reread_on_query, "expected '{v}' to parse truthy");
        }
        for v in ["no", "false", "off", "0", "nope"] {
            let f = write_tmp(&format!("linuxpath = /tmp/d.txt\nreread_on_query = {v}\n"));
            let cfg = load(f.path()).unwrap();
            assert!(!cfg.reread_on_query, "expected '{v}' to parse falsy");
        }
    }

    #[test]
    fn sections_merge_into_one_flat_mapping() {
        let f = write_tmp(
            "linuxpath = /tmp/d.txt\n[server]\nport = 9090\n[extra]\nport = 9999\nhost = 127.0.0.1\n",
        );
        let cfg = load(f.path()).unwrap();
        // last write wins across sections, as with configparser's merged dict
        assert_eq!(cfg.port, 9999);
        assert_eq!(cfg.host, "127.0.0.1");
    }

    #[test]
    fn unknown_keys_are_preserved_not_rejected() {
        let f = write_tmp("linuxpath = /tmp/d.txt\nmax_rows = 250000\n");
        let cfg = load(f.path()).unwrap();
        assert_eq!(cfg.extra.get("max_rows").map(String::as_str), Some("250000"));
    }

    #[test]
    fn relative_linuxpath_is_resolved_absolute() {
        let f = write_tmp("linuxpath = samples/200k.txt\n");
        let cfg = load(f.path()).unwrap();
        assert!(cfg.linuxpath.is_absolute());
    }

    #[test]
    fn keys_are_matched_case_insensitively() {
        let f = write_tmp("LinuxPath = /tmp/d.txt\nPORT = 1234\n");
        let cfg = load(f.path()).unwrap();
        assert_eq!(cfg.port, 1234);
    }

    #[test]
    fn missing_file_is_config_missing() {
        let err = load(Path::new("/nonexistent/path/to/config.ini")).unwrap_err();
        assert!(matches!(err, ServerError::ConfigMissing(_)));
    }

    #[test]
    fn malformed_line_is_config_malformed() {
        let f = write_tmp("linuxpath = /tmp/d.txt\nnot-a-kv-line\n");
        let err = load(f.path()).unwrap_err();
        assert!(matches!(err, ServerError::ConfigMalformed(_)));
    }

    #[test]
    fn overrides_win_over_file_values() {
        let f = write_tmp("linuxpath = /tmp/d.txt\nport = 1111\n");
        let cfg = load(f.path()).unwrap();
        let overrides = ConfigOverrides {
            port: Some(2222),
            ..Default::default()
        };
        let merged = overrides.apply(cfg);
        assert_eq!(merged.port, 2222);
    }
}
