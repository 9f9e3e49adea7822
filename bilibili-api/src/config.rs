//! Client configuration.
//!
//! Can be built in code or loaded from a JSON file; missing fields fall back
//! to [`ClientConfig::default`]:
//!
//! ```json
//! { "proxy": "http://127.0.0.1:7890", "timeout_ms": 8000 }
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Desktop browser user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Proxy URL (`http://` or `https://`) for all requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    /// Timeout for requests that do not set their own, in milliseconds.
    pub timeout_ms: u64,
    /// Retries after a transport failure for requests that do not set their own.
    pub retry: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            proxy: None,
            timeout_ms: 10_000,
            retry: 2,
        }
    }
}

impl ClientConfig {
    /// Load configuration from a JSON file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "proxy": "http://127.0.0.1:7890", "timeout_ms": 8000 }}"#).unwrap();

        let cfg = ClientConfig::load_from(file.path()).unwrap();
        assert_eq!(cfg.proxy.as_deref(), Some("http://127.0.0.1:7890"));
        assert_eq!(cfg.timeout(), Duration::from_secs(8));
        assert_eq!(cfg.retry, 2);
        assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::load_from(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, crate::BiliError::Io(_)));
    }

    #[test]
    fn with_proxy_sets_proxy() {
        let cfg = ClientConfig::default().with_proxy("http://proxy:8080");
        assert_eq!(cfg.proxy.as_deref(), Some("http://proxy:8080"));
    }
}
