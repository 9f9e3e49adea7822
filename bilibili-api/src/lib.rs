//! Bilibili web/live API client library.
//!
//! Provides the shared plumbing every endpoint call goes through, plus a few
//! endpoint wrappers built on it:
//!
//! - [`CookieStore`]: the session cookie jar, read before every request and
//!   updated from every response; safe to share across threads.
//! - [`wbi`]: the `w_rid`/`wts` query signature required by `/wbi/` endpoints.
//! - [`BiliClient::nav`]: login state and WBI keys, cached for one hour with
//!   at most one refresh in flight.
//!
//! ```no_run
//! use bilibili_api::BiliClient;
//!
//! let client = BiliClient::new().unwrap();
//! client.fetch_site_cookies().unwrap();
//! for user in client.search_live_users("C酱").unwrap() {
//!     println!("{} {} live={}", user.room_id, user.uname, user.is_live);
//! }
//! ```
//!
//! # Sessions
//!
//! The cookie jar can be seeded from a browser cookie string or from the
//! [`Session`] file written after a QR login:
//!
//! ```no_run
//! use std::sync::Arc;
//! use bilibili_api::{BiliClient, ClientConfig, CookieStore, Session};
//!
//! let store = Arc::new(Session::load().unwrap().into_store());
//! store.merge(CookieStore::parse_header("buvid3=...; SESSDATA=..."));
//! let client = BiliClient::with_cookies(ClientConfig::default(), store).unwrap();
//! client.room_entry_action(92613).unwrap();
//! Session::from_store(client.cookies()).save().unwrap();
//! ```
//!
//! # API endpoint mapping
//!
//! | Method                              | Endpoint                                   | Signed |
//! |-------------------------------------|--------------------------------------------|--------|
//! | [`BiliClient::fetch_site_cookies`]  | `https://www.bilibili.com/`                | no     |
//! | [`BiliClient::nav`]                 | `/x/web-interface/nav`                     | no     |
//! | [`BiliClient::search_live_users`]   | `/x/web-interface/wbi/search/type`         | yes    |
//! | [`BiliClient::login_qr_code`]       | `/x/passport-login/web/qrcode/generate`    | no     |
//! | [`BiliClient::login_qr_poll`]       | `/x/passport-login/web/qrcode/poll`        | no     |
//! | [`BiliClient::room_entry_action`]   | `/xlive/web-room/v1/index/roomEntryAction` | CSRF   |
//! | [`BiliClient::history_danmu`]       | `/xlive/web-room/v1/dM/gethistory`         | no     |

pub mod cache;
pub mod client;
pub mod config;
pub mod cookie;
pub mod error;
pub mod executor;
mod login;
mod nav;
mod room;
mod search;
pub mod session;
pub mod types;
pub mod wbi;

pub use client::{BiliClient, NAV_TTL};
pub use config::ClientConfig;
pub use cookie::{CSRF_COOKIE, Cookie, CookieStore};
pub use error::{BiliError, Result};
pub use executor::{Executor, HttpExecutor, Method, Request, Response};
pub use session::Session;
pub use types::{LiveUser, QrLogin, QrLoginStatus, SessionMetadata};
pub use wbi::SigningKeyMaterial;
