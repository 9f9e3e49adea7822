//! Result records returned by the API wrappers.
//!
//! Field names follow Rust conventions; the JSON they are read from is
//! described on each wrapper.

use crate::wbi::SigningKeyMaterial;
use serde::{Deserialize, Serialize};

/// Login status plus WBI key material, from the nav endpoint.
///
/// Cached for one hour by [`BiliClient::nav`](crate::BiliClient::nav).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMetadata {
    pub is_logged_in: bool,
    pub signing_key_material: SigningKeyMaterial,
}

/// A live streamer found by
/// [`BiliClient::search_live_users`](crate::BiliClient::search_live_users).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveUser {
    pub room_id: u64,
    /// Display name with search highlighting removed.
    pub uname: String,
    pub is_live: bool,
}

/// A freshly generated login QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrLogin {
    /// URL to encode in the QR image.
    pub url: String,
    /// Key for [`BiliClient::login_qr_poll`](crate::BiliClient::login_qr_poll).
    pub qrcode_key: String,
}

/// State of a QR login, from `data.code` of the poll endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrLoginStatus {
    /// `0`: confirmed; session cookies have been stored.
    Confirmed,
    /// `86101`: not scanned yet.
    NotScanned,
    /// `86090`: scanned, waiting for confirmation on the phone.
    Scanned,
    /// `86038`: the QR code expired; generate a new one.
    Expired,
    Unknown(i64),
}

impl From<i64> for QrLoginStatus {
    fn from(code: i64) -> Self {
        match code {
            0 => Self::Confirmed,
            86_101 => Self::NotScanned,
            86_090 => Self::Scanned,
            86_038 => Self::Expired,
            other => Self::Unknown(other),
        }
    }
}
