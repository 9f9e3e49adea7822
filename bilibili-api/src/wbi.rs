//! WBI query signing.
//!
//! Endpoints under `/wbi/` reject queries that do not carry a valid
//! `w_rid`/`wts` pair. The server re-derives the signature, so every step
//! below must match byte for byte:
//!
//! 1. Take the file stem of `img_url` and `sub_url` (after the last `/`,
//!    before the last `.`) and concatenate them (64 chars in practice).
//! 2. Pick characters of that string in [`MIXIN_KEY_ENC_TAB`] order,
//!    skipping out-of-range indices, until 32 are collected: the mixin key.
//! 3. Split the query on `&`, add `wts=<unix seconds>`, sort the parameters
//!    byte-wise.
//! 4. Percent-encode key and value of each parameter, join with `&`,
//!    append the mixin key, MD5 the result: lowercase hex is `w_rid`.
//! 5. Return the original query with `&w_rid=<hex>&wts=<wts>` appended.
//!
//! Key sources are not validated. A URL lacking `/` contributes its whole
//! text up to the last `.`; one lacking a `.` after its last `/` contributes
//! the whole tail. Well-formed CDN URLs never hit either case.

use md5::{Digest, Md5};

/// Character selection order for the mixin key.
///
/// Fixed by the platform's web client; any change breaks every signed call.
pub const MIXIN_KEY_ENC_TAB: [usize; 64] = [
    46, 47, 18, 2, 53, 8, 23, 32, 15, 50, 10, 31, 58, 3, 45, 35, 27, 43, 5, 49, 33, 9, 42, 19, 29,
    28, 14, 39, 12, 38, 41, 13, 37, 48, 7, 16, 24, 55, 40, 61, 26, 17, 0, 1, 60, 51, 30, 4, 22, 25,
    54, 21, 56, 59, 6, 63, 57, 62, 11, 36, 20, 34, 44, 52,
];

const MIXIN_KEY_LEN: usize = 32;

/// The two `wbi_img` URLs from the nav endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SigningKeyMaterial {
    /// `data.wbi_img.img_url`
    pub img_url: String,
    /// `data.wbi_img.sub_url`
    pub sub_url: String,
}

impl SigningKeyMaterial {
    pub fn new(img_url: impl Into<String>, sub_url: impl Into<String>) -> Self {
        Self {
            img_url: img_url.into(),
            sub_url: sub_url.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.img_url.is_empty() || self.sub_url.is_empty()
    }

    /// The 32-character mixin key derived from both URLs.
    pub fn mixin_key(&self) -> String {
        mixin_key(&self.img_url, &self.sub_url)
    }

    /// Sign `query` with the current time as `wts`.
    pub fn sign(&self, query: &str) -> String {
        sign(query, &self.img_url, &self.sub_url)
    }
}

/// File stem of a key URL: `.../7cd0...077c.png` → `7cd0...077c`.
fn key_stem(url: &str) -> &str {
    let tail = url.rfind('/').map_or(url, |i| &url[i + 1..]);
    tail.rfind('.').map_or(tail, |i| &tail[..i])
}

/// Derive the mixin key from the two key-source URLs.
pub fn mixin_key(img_url: &str, sub_url: &str) -> String {
    let raw: Vec<u8> = [key_stem(img_url), key_stem(sub_url)].concat().into_bytes();
    MIXIN_KEY_ENC_TAB
        .iter()
        .filter_map(|&i| raw.get(i).copied())
        .take(MIXIN_KEY_LEN)
        .map(char::from)
        .collect()
}

/// Sign `query` using the current Unix time as `wts`.
///
/// An empty query is returned unchanged (empty).
pub fn sign(query: &str, img_url: &str, sub_url: &str) -> String {
    sign_at(query, img_url, sub_url, chrono::Utc::now().timestamp())
}

/// Sign `query` with an explicit `wts` (Unix seconds).
pub fn sign_at(query: &str, img_url: &str, sub_url: &str, wts: i64) -> String {
    if query.is_empty() {
        return String::new();
    }
    let wts = wts.to_string();
    let w_rid = w_rid(query, &mixin_key(img_url, sub_url), &wts);
    format!("{query}&w_rid={w_rid}&wts={wts}")
}

/// Compute `w_rid` for `query` with a precomputed mixin key.
pub fn w_rid(query: &str, mixin_key: &str, wts: &str) -> String {
    let wts_param = format!("wts={wts}");
    let mut params: Vec<&str> = query.split('&').collect();
    params.push(&wts_param);
    params.sort_unstable();

    let mut payload = params
        .iter()
        .map(|p| encode_param(p))
        .collect::<Vec<_>>()
        .join("&");
    payload.push_str(mixin_key);

    format!("{:x}", Md5::digest(payload.as_bytes()))
}

/// Percent-encode one `key=value` parameter, keeping the separating `=`.
fn encode_param(param: &str) -> String {
    match param.split_once('=') {
        Some((k, v)) => format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)),
        None => urlencoding::encode(param).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMG: &str = "https://i0.hdslb.com/bfs/wbi/7cd084941338484aae1ad9425b84077c.png";
    const SUB: &str = "https://i0.hdslb.com/bfs/wbi/4932caff0ff746eab6f01bf08b70ac45.png";
    const WTS: i64 = 1_702_204_169;

    #[test]
    fn mixin_key_matches_known_value() {
        assert_eq!(mixin_key(IMG, SUB), "ea1db124af3c7062474693fa704f4ff8");
    }

    #[test]
    fn golden_vector() {
        assert_eq!(
            sign_at("foo=114&bar=514&zab=1919810", IMG, SUB, WTS),
            "foo=114&bar=514&zab=1919810&w_rid=8f6f2b5b3d485fe1886cec6a0be8c5d4&wts=1702204169"
        );
    }

    #[test]
    fn short_key_sources() {
        // 12-char raw string: only indices < 12 are picked.
        let img = "https://i0.hdslb.com/bfs/wbi/abc123.png";
        let sub = "https://i0.hdslb.com/bfs/wbi/def456.png";
        assert_eq!(mixin_key(img, sub), "cf5134eab2d6");
        assert_eq!(
            sign_at("foo=bar", img, sub, 1_700_000_000),
            "foo=bar&w_rid=1793dca90ba61944e09f3fee70591b19&wts=1700000000"
        );
    }

    #[test]
    fn parameter_order_does_not_change_signature() {
        let a = sign_at("foo=114&bar=514&zab=1919810", IMG, SUB, WTS);
        let b = sign_at("bar=514&foo=114&zab=1919810", IMG, SUB, WTS);
        let rid = |s: &str| s.split("w_rid=").nth(1).map(str::to_owned);
        assert_eq!(rid(&a), rid(&b));
        assert!(b.starts_with("bar=514&foo=114&zab=1919810&w_rid="));
    }

    #[test]
    fn values_are_percent_encoded_before_hashing() {
        assert_eq!(
            sign_at("keyword=C%E9%85%B1&page=1", IMG, SUB, WTS),
            "keyword=C%E9%85%B1&page=1&w_rid=733c9c1e3371076f8a5e02ce9af26598&wts=1702204169"
        );
        assert_eq!(
            sign_at("keyword=a b&x=1=2", IMG, SUB, WTS),
            "keyword=a b&x=1=2&w_rid=422a702653b61769da6a9e70757a6ae1&wts=1702204169"
        );
    }

    #[test]
    fn empty_query_is_not_signed() {
        assert_eq!(sign("", IMG, SUB), "");
        assert_eq!(sign_at("", IMG, SUB, WTS), "");
    }

    #[test]
    fn signing_is_deterministic() {
        let q = "mid=2&platform=web";
        assert_eq!(sign_at(q, IMG, SUB, WTS), sign_at(q, IMG, SUB, WTS));
    }

    #[test]
    fn wts_uses_current_time() {
        let before = chrono::Utc::now().timestamp();
        let signed = sign("a=1", IMG, SUB);
        let wts: i64 = signed.rsplit("wts=").next().unwrap().parse().unwrap();
        assert!(wts >= before && wts <= before + 5);
    }

    #[test]
    fn key_stem_tolerates_malformed_urls() {
        assert_eq!(key_stem("https://x/y/abc.def.png"), "abc.def");
        assert_eq!(key_stem("nodots"), "nodots");
        assert_eq!(key_stem("noslash.png"), "noslash");
        assert_eq!(key_stem("https://a.b/c"), "c");
        assert_eq!(key_stem(""), "");
        assert_eq!(mixin_key("", ""), "");
    }

    #[test]
    fn key_material_helpers() {
        let km = SigningKeyMaterial::new(IMG, SUB);
        assert!(!km.is_empty());
        assert_eq!(km.mixin_key(), "ea1db124af3c7062474693fa704f4ff8");
        assert!(SigningKeyMaterial::default().is_empty());
        assert!(km.sign("a=1").starts_with("a=1&w_rid="));
    }
}
