//! Session persistence: saves the cookie jar to disk between runs.
//!
//! The default session file is `~/.config/bilibili-api/session.json`:
//!
//! ```json
//! { "cookies": [ { "name": "SESSDATA", "value": "..." }, { "name": "bili_jct", "value": "..." } ] }
//! ```
//!
//! Nothing in the client reads or writes this file on its own; callers load
//! a [`Session`] into a [`CookieStore`] at startup and snapshot it back when
//! they see fit (typically after a QR login).

use crate::cookie::{Cookie, CookieStore};
use crate::error::{BiliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Snapshot of a cookie jar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Session {
    pub cookies: Vec<Cookie>,
}

impl Session {
    /// Snapshot the current contents of `store`.
    pub fn from_store(store: &CookieStore) -> Self {
        Self {
            cookies: store.get_all(),
        }
    }

    /// Build a fresh cookie store from this snapshot.
    pub fn into_store(self) -> CookieStore {
        CookieStore::with_cookies(self.cookies)
    }

    /// Whether the snapshot carries the `SESSDATA` login cookie (does not validate it).
    pub fn is_logged_in(&self) -> bool {
        self.cookies
            .iter()
            .any(|c| c.name == "SESSDATA" && !c.value.is_empty())
    }

    /// Load from the default session file.
    ///
    /// Returns an empty session if the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Save to the default session file, creating parent directories.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Delete the default session file.
    pub fn clear() -> Result<()> {
        let path = Self::path()?;
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        log::debug!("saved {} cookies to {}", self.cookies.len(), path.display());
        Ok(())
    }

    fn path() -> Result<PathBuf> {
        let config = dirs::config_dir()
            .ok_or_else(|| BiliError::Other("cannot determine config directory".into()))?;
        Ok(config.join("bilibili-api").join("session.json"))
    }
}
