//! Shared cookie store.
//!
//! Every outgoing request reads the store to build its `Cookie` header and
//! every response writes `Set-Cookie` values back into it, so the store sits
//! behind an [`RwLock`]: many readers, one writer. Cookies are keyed by name
//! only; domain, path and expiry attributes are not tracked.

use crate::error::{BiliError, Result};
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Name of the cookie holding the CSRF token for state-changing requests.
pub const CSRF_COOKIE: &str = "bili_jct";

/// A single `name=value` cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse the leading `name=value` pair of a `Set-Cookie` header value.
    ///
    /// Attributes after the first `;` are dropped. Returns `None` when there
    /// is no `=` or the name is empty.
    pub fn parse_set_cookie(header: &str) -> Option<Self> {
        let pair = header.split(';').next()?;
        let (name, value) = pair.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self::new(name, value.trim()))
    }
}

/// In-memory, name-keyed cookie jar shared between all calls of a session.
///
/// Cookies keep their first insertion order so the rendered header is
/// deterministic.
#[derive(Debug, Default)]
pub struct CookieStore {
    cookies: RwLock<Vec<Cookie>>,
}

impl CookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with `cookies` (later duplicates win).
    pub fn with_cookies(cookies: impl IntoIterator<Item = Cookie>) -> Self {
        let store = Self::new();
        store.merge(cookies);
        store
    }

    /// Parse a `Cookie` header style string (`a=1; b=2`) into cookies.
    ///
    /// Segments without `=` are skipped. Useful for seeding a store from a
    /// cookie string copied out of a browser.
    pub fn parse_header(header: &str) -> Vec<Cookie> {
        header
            .split(';')
            .filter_map(|seg| {
                let (name, value) = seg.split_once('=')?;
                let name = name.trim();
                (!name.is_empty()).then(|| Cookie::new(name, value.trim()))
            })
            .collect()
    }

    /// Current value of the cookie called `name`.
    pub fn get(&self, name: &str) -> Result<String> {
        self.read()
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.clone())
            .ok_or_else(|| BiliError::CookieNotFound(name.to_owned()))
    }

    /// The CSRF token (`bili_jct`), present only for logged-in sessions.
    pub fn csrf(&self) -> Result<String> {
        self.get(CSRF_COOKIE)
    }

    /// Snapshot of all cookies in insertion order.
    pub fn get_all(&self) -> Vec<Cookie> {
        self.read().clone()
    }

    /// Overwrite cookies with matching names and append the rest.
    ///
    /// The whole batch is applied under one write lock; readers see either
    /// none or all of it.
    pub fn merge(&self, cookies: impl IntoIterator<Item = Cookie>) {
        let incoming: Vec<Cookie> = cookies.into_iter().collect();
        if incoming.is_empty() {
            return;
        }
        let mut jar = self.write();
        for cookie in incoming {
            log::debug!("cookie store: set {}", cookie.name);
            match jar.iter_mut().find(|c| c.name == cookie.name) {
                Some(existing) => existing.value = cookie.value,
                None => jar.push(cookie),
            }
        }
    }

    /// Render the `Cookie` request header: `n1=v1; n2=v2`.
    pub fn header(&self) -> String {
        self.read()
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Remove every cookie (logout).
    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A panicking writer cannot leave a half-applied merge behind (the
    // per-cookie update is a single assignment), so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Cookie>> {
        self.cookies.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Cookie>> {
        self.cookies.write().unwrap_or_else(PoisonError::into_inner)
    }
}
