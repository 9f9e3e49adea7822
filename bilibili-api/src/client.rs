//! Client facade for the Bilibili web and live APIs.
//!
//! Every call follows the same path:
//!
//! 1. signed endpoints fetch WBI key material through the one-hour nav cache
//!    ([`BiliClient::nav`]) and sign their query ([`BiliClient::sign_query`])
//! 2. the current cookie jar is rendered into the `Cookie` header
//! 3. the request goes to the [`Executor`]
//! 4. cookies set by the response are merged back into the jar
//! 5. the JSON envelope is decoded; a non-zero `code` becomes
//!    [`BiliError::Api`](crate::BiliError::Api)
//!
//! # Response format
//!
//! ```json
//! { "code": 0, "message": "0", "ttl": 1, "data": { ... } }
//! ```

use crate::cache::TtlCache;
use crate::config::ClientConfig;
use crate::cookie::CookieStore;
use crate::error::{BiliError, Result};
use crate::executor::{Executor, HttpExecutor, Request, Response};
use crate::types::SessionMetadata;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// How long nav metadata (login state + WBI keys) stays fresh.
pub const NAV_TTL: Duration = Duration::from_secs(60 * 60);

pub(crate) const NAV_CACHE_KEY: &str = "nav";

const SITE_URL: &str = "https://www.bilibili.com/";

/// The `{ code, message, data }` wrapper around every API payload.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// The envelope `code`; a body without one is not an API response.
    pub fn code(&self) -> Result<i64> {
        self.code.ok_or(BiliError::MissingField("code"))
    }

    /// Fail with [`BiliError::Api`] unless `code == 0`.
    pub fn check(self) -> Result<Option<T>> {
        let code = self.code()?;
        if code != 0 {
            return Err(BiliError::Api {
                code,
                message: self.message,
            });
        }
        Ok(self.data)
    }

    pub fn into_data(self) -> Result<T> {
        self.check()?.ok_or(BiliError::MissingField("data"))
    }
}

/// Blocking client for the Bilibili web/live API.
///
/// Cheap to share across threads (`&BiliClient` is enough). The cookie jar
/// is an injectable [`Arc<CookieStore>`], so several clients can share one
/// session or each run their own.
pub struct BiliClient {
    executor: Arc<dyn Executor>,
    cookies: Arc<CookieStore>,
    pub(crate) nav_cache: TtlCache<&'static str, SessionMetadata>,
    config: ClientConfig,
}

impl BiliClient {
    /// Create a client with default configuration and an empty cookie jar.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::with_cookies(config, Arc::new(CookieStore::new()))
    }

    /// Create a client that reads and writes the given cookie jar.
    pub fn with_cookies(config: ClientConfig, cookies: Arc<CookieStore>) -> Result<Self> {
        let executor = Arc::new(HttpExecutor::new(&config)?);
        Ok(Self::with_executor(executor, cookies, config))
    }

    /// Create a client around a custom [`Executor`].
    pub fn with_executor(
        executor: Arc<dyn Executor>,
        cookies: Arc<CookieStore>,
        config: ClientConfig,
    ) -> Self {
        Self {
            executor,
            cookies,
            nav_cache: TtlCache::new(NAV_TTL),
            config,
        }
    }

    pub fn cookies(&self) -> &Arc<CookieStore> {
        &self.cookies
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a request with the session cookies and store the cookies the
    /// response sets. An explicit `Cookie` header on `request` is kept as is.
    pub fn send(&self, mut request: Request) -> Result<Response> {
        if request.header_value("Cookie").is_none() {
            let cookie = self.cookies.header();
            if !cookie.is_empty() {
                request = request.header("Cookie", cookie);
            }
        }
        let resp = self.executor.execute(&request)?;
        self.cookies.merge(resp.cookies.iter().cloned());
        Ok(resp)
    }

    /// Send and decode `data` from the envelope.
    pub(crate) fn request_data<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        let resp = self.send(request)?;
        let envelope: Envelope<T> = serde_json::from_slice(&resp.body)?;
        envelope.into_data()
    }

    /// Send and only check the envelope `code`.
    pub(crate) fn request_ok(&self, request: Request) -> Result<()> {
        let resp = self.send(request)?;
        let envelope: Envelope<serde::de::IgnoredAny> = serde_json::from_slice(&resp.body)?;
        envelope.check().map(|_| ())
    }

    /// Append `w_rid` and `wts` to `query` using the cached WBI keys.
    ///
    /// An empty query stays empty and does not touch the network.
    pub fn sign_query(&self, query: &str) -> Result<String> {
        if query.is_empty() {
            return Ok(String::new());
        }
        let nav = self.nav()?;
        Ok(nav.signing_key_material.sign(query))
    }

    /// Visit the main site once and keep the cookies it sets.
    ///
    /// Anonymous jars need the device cookies handed out here (`buvid3`,
    /// `b_nut`) before signed search calls are accepted.
    pub fn fetch_site_cookies(&self) -> Result<()> {
        let request = Request::get(SITE_URL)
            .header("Accept", "text/html,application/xhtml+xml")
            .timeout(Duration::from_secs(10))
            .retry(2);
        let resp = self.send(request)?;
        log::debug!("main site set {} cookies", resp.cookies.len());
        Ok(())
    }

    /// Check reachability of the main site. The jar is neither sent nor updated.
    pub fn is_connected(&self) -> Result<()> {
        self.executor
            .execute(&Request::get(SITE_URL).timeout(Duration::from_secs(10)))
            .map(|_| ())
    }
}
