//! Request execution.
//!
//! The client never talks to the network directly; it hands a [`Request`] to
//! an [`Executor`]. [`HttpExecutor`] is the `reqwest` implementation; tests
//! plug in scripted executors.
//!
//! Retries and timeouts belong to the executor. A request is attempted up to
//! `retry + 1` times when the transport fails; an HTTP error status is final.

use crate::config::ClientConfig;
use crate::cookie::Cookie;
use crate::error::{BiliError, Result};
use reqwest::blocking::Client;
use reqwest::header::SET_COOKIE;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One outgoing HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub method: Method,
    /// Headers in send order. `Cookie` is filled in by the client.
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    /// Overrides the configured default timeout.
    pub timeout: Option<Duration>,
    /// Overrides the configured default retry count.
    pub retry: Option<u32>,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            headers: Vec::new(),
            body: None,
            timeout: None,
            retry: None,
        }
    }

    /// A form POST (`application/x-www-form-urlencoded`).
    pub fn post_form(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            body: Some(body.into()),
            ..Self::get(url)
        }
        .header("Content-Type", "application/x-www-form-urlencoded")
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn retry(mut self, retry: u32) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Value of the first header called `name` (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A successful (2xx) HTTP response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
    /// Cookies set by the server, reduced to `name=value`.
    pub cookies: Vec<Cookie>,
}

impl Response {
    /// A 200 response with a body and no cookies.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            cookies: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_cookies(mut self, cookies: impl IntoIterator<Item = Cookie>) -> Self {
        self.cookies.extend(cookies);
        self
    }
}

/// Capability to perform an HTTP request.
pub trait Executor: Send + Sync {
    fn execute(&self, request: &Request) -> Result<Response>;
}

/// [`Executor`] backed by a blocking [`reqwest`] client.
pub struct HttpExecutor {
    http: Client,
    timeout: Duration,
    retry: u32,
}

impl HttpExecutor {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout());
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }
        Ok(Self {
            http: builder.build()?,
            timeout: config.timeout(),
            retry: config.retry,
        })
    }

    fn attempt(&self, request: &Request) -> Result<Response> {
        let mut req = match request.method {
            Method::Get => self.http.get(&request.url),
            Method::Post => self.http.post(&request.url),
        };
        for (name, value) in &request.headers {
            req = req.header(name, value);
        }
        if let Some(body) = &request.body {
            req = req.body(body.clone());
        }
        let resp = req.timeout(request.timeout.unwrap_or(self.timeout)).send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BiliError::Status(status.as_u16()));
        }
        let cookies = resp
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(Cookie::parse_set_cookie)
            .collect();
        let body = resp.bytes()?.to_vec();
        Ok(Response {
            status: status.as_u16(),
            body,
            cookies,
        })
    }
}

impl Executor for HttpExecutor {
    fn execute(&self, request: &Request) -> Result<Response> {
        let retry = request.retry.unwrap_or(self.retry);
        let mut attempt = 0;
        loop {
            match self.attempt(request) {
                Err(BiliError::Http(e)) if attempt < retry => {
                    attempt += 1;
                    log::warn!(
                        "{} failed ({e}), retry {attempt}/{retry}",
                        request.url
                    );
                }
                other => return other,
            }
        }
    }
}
