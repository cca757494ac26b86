//! Local host name lookup for the `/redis` page.

use hitcount_core::error::{HitCountError, Result};

pub trait HostResolver: Send + Sync {
    fn hostname(&self) -> Result<String>;
}

/// The kernel's host name (`gethostname(2)`), independent of the environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHostResolver;

impl HostResolver for SystemHostResolver {
    fn hostname(&self) -> Result<String> {
        let raw = gethostname::gethostname();
        let name = raw.into_string().map_err(|raw| {
            HitCountError::HostResolution(format!("host name is not valid UTF-8: {raw:?}"))
        })?;
        non_empty(name).ok_or_else(|| HitCountError::HostResolution("host name is empty".into()))
    }
}

/// Always answers with the same name.
#[derive(Debug, Clone)]
pub struct FixedHost(pub String);

impl FixedHost {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl HostResolver for FixedHost {
    fn hostname(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

fn non_empty(s: String) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}
