//! Live user search (WBI-signed).
//!
//! Endpoint: `GET https://api.bilibili.com/x/web-interface/wbi/search/type`
//!
//! Query: `page=1&page_size=10&order=online&platform=pc&search_type=live_user&keyword=...`
//! followed by `w_rid`/`wts`.
//!
//! Response:
//! ```json
//! {
//!   "code": 0,
//!   "data": {
//!     "result": [
//!       { "roomid": 92613, "uname": "<em class=\"keyword\">C酱</em>", "is_live": true }
//!     ]
//!   }
//! }
//! ```
//!
//! `result` is absent when nothing matches.

use crate::client::BiliClient;
use crate::error::Result;
use crate::executor::Request;
use crate::types::LiveUser;
use serde::Deserialize;
use std::time::Duration;

const SEARCH_URL: &str = "https://api.bilibili.com/x/web-interface/wbi/search/type";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchData {
    result: Vec<LiveUserItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LiveUserItem {
    roomid: u64,
    uname: String,
    is_live: bool,
}

impl BiliClient {
    /// Search live streamers by name, most popular first.
    pub fn search_live_users(&self, keyword: &str) -> Result<Vec<LiveUser>> {
        let query = format!(
            "page=1&page_size=10&order=online&platform=pc&search_type=live_user&keyword={}",
            urlencoding::encode(keyword)
        );
        let signed = self.sign_query(&query)?;
        let request = Request::get(format!("{SEARCH_URL}?{signed}"))
            .timeout(Duration::from_secs(10))
            .retry(2);
        let data: SearchData = self.request_data(request)?;
        Ok(data
            .result
            .into_iter()
            .map(|item| LiveUser {
                room_id: item.roomid,
                uname: strip_highlight(&item.uname),
                is_live: item.is_live,
            })
            .collect())
    }
}

/// Remove the `<em class="keyword">` markup the search engine wraps matches in.
fn strip_highlight(uname: &str) -> String {
    uname
        .replace(r#"<em class="keyword">"#, "")
        .replace("</em>", "")
}
