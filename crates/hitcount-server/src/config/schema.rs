use std::net::SocketAddr;
use std::time::Duration;

use hitcount_core::error::{HitCountError, Result};
use hitcount_core::RetryPolicy;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub retry: RetrySection,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            store: StoreSection::default(),
            retry: RetrySection::default(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(HitCountError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.store.validate()?;
        self.retry.validate()?;

        Ok(())
    }

    /// Apply environment overrides: `REDIS_URL` replaces `store.url`,
    /// `PORT` replaces the port of `server.listen`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("REDIS_URL").filter(|s| !s.trim().is_empty()) {
            self.store.url = Some(url.trim().to_string());
        }
        if let Some(port) = lookup("PORT").filter(|s| !s.trim().is_empty()) {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|e| HitCountError::Config(format!("PORT must be a port number: {e}")))?;
            let mut addr = self.server.listen_addr()?;
            addr.set_port(port);
            self.server.listen = addr.to_string();
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { listen: default_listen() }
    }
}

impl ServerSection {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            HitCountError::Config(format!("server.listen must be a valid SocketAddr: {e}"))
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Redis,
    Memory,
}

impl StoreKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKind::Redis => "redis",
            StoreKind::Memory => "memory",
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    #[serde(default)]
    pub kind: StoreKind,

    /// Connection URL. Never defaulted: a redis store without one fails startup.
    #[serde(default)]
    pub url: Option<String>,
}

const URL_SCHEMES: [&str; 4] = ["redis://", "rediss://", "unix://", "redis+unix://"];

impl StoreSection {
    pub fn validate(&self) -> Result<()> {
        if self.kind != StoreKind::Redis {
            return Ok(());
        }
        let url = self.url.as_deref().ok_or_else(|| {
            HitCountError::Config("store.url (or REDIS_URL) is required for the redis store".into())
        })?;
        if !URL_SCHEMES.iter().any(|s| url.starts_with(s)) {
            return Err(HitCountError::Config(format!(
                "store.url must use one of {}: got {}",
                URL_SCHEMES.join(", "),
                redact_url(url)
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySection {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl RetrySection {
    pub fn validate(&self) -> Result<()> {
        if self.max_retries > 20 {
            return Err(HitCountError::Config(
                "retry.max_retries must be between 0 and 20".into(),
            ));
        }
        if !(1..=10000).contains(&self.delay_ms) {
            return Err(HitCountError::Config(
                "retry.delay_ms must be between 1 and 10000".into(),
            ));
        }
        Ok(())
    }

    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.delay_ms))
    }
}

fn default_max_retries() -> u32 {
    5
}
fn default_delay_ms() -> u64 {
    500
}

/// Hide the password part of a connection URL for logging.
pub fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let authority_end = rest.find('/').unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(authority_end);
    match authority.rsplit_once('@') {
        Some((userinfo, host)) => {
            let user = userinfo.split_once(':').map(|(u, _)| u).unwrap_or(userinfo);
            if userinfo.contains(':') {
                format!("{scheme}://{user}:***@{host}{tail}")
            } else {
                format!("{scheme}://***@{host}{tail}")
            }
        }
        None => url.to_string(),
    }
}
