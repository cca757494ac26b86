//! Server config loader (strict parsing + environment overrides).

pub mod schema;

use std::fs;
use std::path::Path;

use hitcount_core::error::{HitCountError, Result};

pub use schema::{redact_url, RetrySection, ServerConfig, ServerSection, StoreKind, StoreSection};

/// Config file used when `HITCOUNT_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "hitcount.yaml";

pub fn load_from_file(path: &str) -> Result<ServerConfig> {
    let cfg = parse_file(path)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Parse and validate with no environment overrides.
pub fn load_from_str(s: &str) -> Result<ServerConfig> {
    let cfg = parse_str(s)?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn parse_str(s: &str) -> Result<ServerConfig> {
    serde_yaml::from_str(s).map_err(|e| HitCountError::Config(format!("invalid yaml: {e}")))
}

/// Startup path: file (if any), then env overrides, then validation.
///
/// A missing file at the default path falls back to built-in defaults; a
/// missing file named by `HITCOUNT_CONFIG` is an error.
pub fn load<F>(lookup: F) -> Result<ServerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = match lookup("HITCOUNT_CONFIG") {
        Some(path) => parse_file(&path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => parse_file(DEFAULT_CONFIG_PATH)?,
        None => ServerConfig::default(),
    };
    cfg.apply_env(&lookup)?;
    cfg.validate()?;
    Ok(cfg)
}

/// `load` against the process environment.
pub fn load_from_env() -> Result<ServerConfig> {
    load(|k| std::env::var(k).ok())
}

fn parse_file(path: &str) -> Result<ServerConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| HitCountError::Config(format!("read config {path} failed: {e}")))?;
    parse_str(&s)
}
