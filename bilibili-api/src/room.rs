//! Live room actions.
//!
//! ## `room_entry_action` (`POST /xlive/web-room/v1/index/roomEntryAction`)
//!
//! Form body: `room_id=...&platform=pc&csrf_token=...&csrf=...&visit_id=`.
//! The CSRF token is the `bili_jct` cookie, so this needs a logged-in jar.
//!
//! ## `history_danmu` (`GET /xlive/web-room/v1/dM/gethistory?roomid=...`)
//!
//! Response:
//! ```json
//! { "code": 0, "data": { "room": [ { "text": "hello", "nickname": "..." } ] } }
//! ```

use crate::client::BiliClient;
use crate::error::Result;
use crate::executor::Request;
use serde::Deserialize;
use std::time::Duration;

const LIVE_API: &str = "https://api.live.bilibili.com";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HistoryData {
    room: Vec<HistoryItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HistoryItem {
    text: String,
}

impl BiliClient {
    /// Report entering a live room (counts the visit, may grant daily rewards).
    ///
    /// Fails with [`BiliError::CookieNotFound`](crate::BiliError::CookieNotFound)
    /// before any request is sent when the jar holds no CSRF token.
    pub fn room_entry_action(&self, room_id: u64) -> Result<()> {
        let csrf = self.cookies().csrf()?;
        let body = format!(
            "room_id={room_id}&platform=pc&csrf_token={csrf}&csrf={csrf}&visit_id=",
            csrf = urlencoding::encode(&csrf)
        );
        let request = Request::post_form(
            format!("{LIVE_API}/xlive/web-room/v1/index/roomEntryAction"),
            body,
        )
        .header("Accept", "application/json, text/plain, */*")
        .header("Origin", "https://live.bilibili.com")
        .header("Referer", format!("https://live.bilibili.com/{room_id}"))
        .timeout(Duration::from_secs(3))
        .retry(2);
        self.request_ok(request)
    }

    /// Recent chat lines of a live room, oldest first. Empty lines are skipped.
    pub fn history_danmu(&self, room_id: u64) -> Result<Vec<String>> {
        let request = Request::get(format!(
            "{LIVE_API}/xlive/web-room/v1/dM/gethistory?roomid={room_id}"
        ))
        .header("Referer", format!("https://live.bilibili.com/{room_id}"))
        .timeout(Duration::from_secs(10))
        .retry(2);
        let data: HistoryData = self.request_data(request)?;
        Ok(data
            .room
            .into_iter()
            .map(|item| item.text)
            .filter(|text| !text.is_empty())
            .collect())
    }
}
