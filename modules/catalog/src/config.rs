use std::time::Duration;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

/// Configuration of the catalog module (`modules.catalog` in the app config).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// HS256 signing secret shared by access and refresh tokens.
    #[serde(default)]
    pub token_secret: String,
    #[serde(default = "default_access_ttl", with = "humantime_serde")]
    pub access_token_ttl: Duration,
    #[serde(default = "default_refresh_ttl", with = "humantime_serde")]
    pub refresh_token_ttl: Duration,
    /// Deadline of every service call.
    #[serde(default = "default_call_timeout", with = "humantime_serde")]
    pub call_timeout: Duration,
    /// Page size used when a listing request omits `limit`.
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            access_token_ttl: default_access_ttl(),
            refresh_token_ttl: default_refresh_ttl(),
            call_timeout: default_call_timeout(),
            default_page_size: default_page_size(),
        }
    }
}

impl CatalogConfig {
    /// Deserialize the module section; a missing section yields defaults.
    pub fn from_value(raw: Option<&serde_json::Value>) -> anyhow::Result<Self> {
        let cfg = match raw {
            Some(v) => serde_json::from_value(v.clone()).context("invalid modules.catalog")?,
            None => Self::default(),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.token_secret.trim().is_empty() {
            bail!("modules.catalog.token_secret must be set");
        }
        if self.access_token_ttl.is_zero() || self.refresh_token_ttl.is_zero() {
            bail!("token TTLs must be positive");
        }
        if self.access_token_ttl >= self.refresh_token_ttl {
            bail!("access_token_ttl must be shorter than refresh_token_ttl");
        }
        if self.call_timeout.is_zero() {
            bail!("modules.catalog.call_timeout must be positive");
        }
        Ok(())
    }
}

fn default_access_ttl() -> Duration {
    Duration::from_secs(15 * 60)
}

fn default_refresh_ttl() -> Duration {
    Duration::from_secs(7 * 24 * 60 * 60)
}

fn default_call_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_page_size() -> u64 {
    10
}
