use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Top-level settings
// ---------------------------------------------------------------------------

/// Tunables read from the optional TOML settings file.
///
/// Every section and key is optional; missing values take the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub github: GitHubSettings,
    pub zenhub: ZenHubSettings,
    pub http: HttpSettings,
}

impl Settings {
    /// Reject values the clients cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.github.page_size) {
            return Err(ConfigError::InvalidSetting {
                key: "github.page_size",
                reason: format!("must be between 1 and 100, got {}", self.github.page_size),
            });
        }
        for (key, secs) in [
            ("http.connect_timeout_secs", self.http.connect_timeout_secs),
            ("http.timeout_secs", self.http.timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::InvalidSetting {
                    key,
                    reason: "must be at least 1 second".to_owned(),
                });
            }
        }
        if self.http.max_attempts == 0 {
            return Err(ConfigError::InvalidSetting {
                key: "http.max_attempts",
                reason: "must be at least 1".to_owned(),
            });
        }
        if self.http.initial_backoff_ms > self.http.max_backoff_ms {
            return Err(ConfigError::InvalidSetting {
                key: "http.initial_backoff_ms",
                reason: format!(
                    "must not exceed http.max_backoff_ms ({})",
                    self.http.max_backoff_ms
                ),
            });
        }
        for (key, url) in [
            ("github.api_url", &self.github.api_url),
            ("zenhub.api_url", &self.zenhub.api_url),
        ] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(ConfigError::InvalidSetting {
                    key,
                    reason: format!("{url:?} is not an http(s) URL"),
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubSettings {
    pub api_url: String,
    /// Issues requested per page (GitHub caps this at 100).
    pub page_size: u32,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_owned(),
            page_size: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ZenHubSettings {
    pub api_url: String,
    /// Request budget per minute; `0` disables pacing.
    pub requests_per_minute: u32,
}

impl Default for ZenHubSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.zenhub.com".to_owned(),
            requests_per_minute: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
    /// Total attempts per request, including the first.
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Longest server-requested wait (`Retry-After`, rate-limit reset) that
    /// is honoured before giving up. The default covers GitHub's hourly
    /// window.
    pub max_retry_wait_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: 30,
            max_attempts: 4,
            initial_backoff_ms: 1_000,
            max_backoff_ms: 16_000,
            max_retry_wait_secs: 3_600,
        }
    }
}

impl HttpSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
