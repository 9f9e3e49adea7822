//! QR code login.
//!
//! 1. `GET https://passport.bilibili.com/x/passport-login/web/qrcode/generate`
//!    → `data: { url, qrcode_key }`; render `url` as a QR code.
//! 2. Poll `GET .../qrcode/poll?qrcode_key=...` until `data.code` is `0`
//!    (confirmed) or `86038` (expired). The confirming response sets
//!    `SESSDATA`, `bili_jct`, `DedeUserID` etc., which land in the cookie
//!    store like any other response cookies.

use crate::client::BiliClient;
use crate::error::{BiliError, Result};
use crate::executor::Request;
use crate::types::{QrLogin, QrLoginStatus};
use serde::Deserialize;
use std::time::Duration;

const QR_GENERATE_URL: &str =
    "https://passport.bilibili.com/x/passport-login/web/qrcode/generate?source=main-fe-header";
const QR_POLL_URL: &str = "https://passport.bilibili.com/x/passport-login/web/qrcode/poll";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateData {
    url: String,
    qrcode_key: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PollData {
    code: i64,
}

impl BiliClient {
    /// Generate a login QR code.
    pub fn login_qr_code(&self) -> Result<QrLogin> {
        let request = Request::get(QR_GENERATE_URL)
            .timeout(Duration::from_secs(10))
            .retry(2);
        let data: GenerateData = self.request_data(request)?;
        if data.url.is_empty() {
            return Err(BiliError::MissingField("data.url"));
        }
        if data.qrcode_key.is_empty() {
            return Err(BiliError::MissingField("data.qrcode_key"));
        }
        Ok(QrLogin {
            url: data.url,
            qrcode_key: data.qrcode_key,
        })
    }

    /// Check the state of a QR login.
    ///
    /// On [`QrLoginStatus::Confirmed`] the session cookies are already in
    /// [`cookies`](Self::cookies) and the cached nav metadata is dropped so
    /// the next signed call sees the logged-in state.
    pub fn login_qr_poll(&self, qrcode_key: &str) -> Result<QrLoginStatus> {
        let url = format!(
            "{QR_POLL_URL}?qrcode_key={}&source=main-fe-header",
            urlencoding::encode(qrcode_key)
        );
        let request = Request::get(url).timeout(Duration::from_secs(10)).retry(2);
        let data: PollData = self.request_data(request)?;
        let status = QrLoginStatus::from(data.code);
        if status == QrLoginStatus::Confirmed {
            log::debug!("QR login confirmed");
            self.invalidate_nav();
        }
        Ok(status)
    }
}
