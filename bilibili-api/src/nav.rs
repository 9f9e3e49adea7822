//! Nav API: login state and WBI signing keys.
//!
//! Endpoint: `GET https://api.bilibili.com/x/web-interface/nav`
//!
//! Response:
//! ```json
//! {
//!   "code": 0,
//!   "data": {
//!     "isLogin": true,
//!     "wbi_img": {
//!       "img_url": "https://i0.hdslb.com/bfs/wbi/7cd084941338484aae1ad9425b84077c.png",
//!       "sub_url": "https://i0.hdslb.com/bfs/wbi/4932caff0ff746eab6f01bf08b70ac45.png"
//!     }
//!   }
//! }
//! ```
//!
//! Anonymous sessions get `code: -101` but still receive `wbi_img`, which is
//! all signing needs, so that answer is a valid result with
//! `is_logged_in = false`.

use crate::client::{BiliClient, Envelope, NAV_CACHE_KEY};
use crate::error::{BiliError, Result};
use crate::executor::Request;
use crate::types::SessionMetadata;
use crate::wbi::SigningKeyMaterial;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const NAV_URL: &str = "https://api.bilibili.com/x/web-interface/nav";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NavData {
    #[serde(rename = "isLogin")]
    is_login: bool,
    wbi_img: WbiImg,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WbiImg {
    img_url: String,
    sub_url: String,
}

impl BiliClient {
    /// Current login state and WBI key material.
    ///
    /// Served from cache for one hour after a successful fetch. Concurrent
    /// callers with no fresh value share one request; a failed request is
    /// not cached and its error goes to every caller that waited on it.
    pub fn nav(&self) -> Result<Arc<SessionMetadata>> {
        self.nav_cache
            .get_or_fetch(&NAV_CACHE_KEY, || self.fetch_nav())
    }

    /// Forget the cached nav metadata, e.g. after logging in or out.
    ///
    /// A nav request already in flight still answers its own callers, but
    /// its result is not cached.
    pub fn invalidate_nav(&self) {
        self.nav_cache.invalidate_all();
    }

    fn fetch_nav(&self) -> Result<SessionMetadata> {
        let request = Request::get(NAV_URL)
            .header("Accept", "application/json, text/plain, */*")
            .header("Origin", "https://t.bilibili.com")
            .header("Referer", "https://t.bilibili.com/pages/nav/index_new")
            .header("Pragma", "no-cache")
            .header("Cache-Control", "no-cache")
            .timeout(Duration::from_secs(3))
            .retry(2);
        let resp = self.send(request)?;
        let envelope: Envelope<NavData> = serde_json::from_slice(&resp.body)?;
        let code = envelope.code()?;

        let data = envelope.data.unwrap_or_default();
        let material = SigningKeyMaterial::new(data.wbi_img.img_url, data.wbi_img.sub_url);
        if material.is_empty() {
            return Err(if code == 0 {
                BiliError::MissingField("data.wbi_img")
            } else {
                BiliError::Api {
                    code,
                    message: envelope.message,
                }
            });
        }
        log::debug!("nav refreshed (logged in: {})", data.is_login);
        Ok(SessionMetadata {
            is_logged_in: data.is_login,
            signing_key_material: material,
        })
    }
}
