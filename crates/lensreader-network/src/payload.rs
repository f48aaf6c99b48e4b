//! Tap notification body.
//!
//! ```json
//! {
//!   "nfc_tag": { "uid": "04a52cf22a5e80" },
//!   "tap_datetime": "2024-05-10T12:46:06.123456+10:00",
//!   "label": "gallery-1",
//!   "data": {
//!     "nfc_reader": {
//!       "mac_address": "b8:27:eb:00:00:01",
//!       "reader_ip": "10.0.0.42",
//!       "reader_model": "idtech",
//!       "reader_name": "nfc-42"
//!     }
//!   }
//! }
//! ```

use chrono::{DateTime, SecondsFormat, TimeZone};
use lensreader_core::TagId;
use lensreader_core::constants::{READER_NAME_PREFIX, UNKNOWN_IDENTITY};
use serde::{Deserialize, Serialize};

/// Metadata identifying the reader that saw a tap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderIdentity {
    /// Hardware address of the reader's network interface.
    pub mac_address: String,

    /// Network address of the reader.
    #[serde(rename = "reader_ip")]
    pub ip_address: String,

    /// Reader hardware model, if configured.
    pub reader_model: Option<String>,

    /// Human-readable reader name.
    pub reader_name: String,
}

impl ReaderIdentity {
    /// Create an identity, deriving the name from the IP address when none is
    /// given.
    ///
    /// ```
    /// use lensreader_network::ReaderIdentity;
    ///
    /// let identity = ReaderIdentity::new("aa:bb:cc:dd:ee:ff", "10.0.0.42", None, None);
    /// assert_eq!(identity.reader_name, "nfc-42");
    /// ```
    pub fn new(
        mac_address: impl Into<String>,
        ip_address: impl Into<String>,
        reader_model: Option<String>,
        reader_name: Option<String>,
    ) -> Self {
        let ip_address = ip_address.into();
        let reader_name = reader_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| default_reader_name(&ip_address));

        Self {
            mac_address: mac_address.into(),
            ip_address,
            reader_model: reader_model.filter(|model| !model.is_empty()),
            reader_name,
        }
    }
}

impl Default for ReaderIdentity {
    fn default() -> Self {
        Self::new(UNKNOWN_IDENTITY, UNKNOWN_IDENTITY, None, None)
    }
}

/// Reader name derived from the last component of an IPv4 address.
pub fn default_reader_name(ip_address: &str) -> String {
    let suffix = ip_address.rsplit('.').next().unwrap_or(ip_address);
    format!("{READER_NAME_PREFIX}{suffix}")
}

/// Tag portion of the notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NfcTag {
    /// Canonical tag identifier.
    pub uid: TagId,
}

/// Reader portion of the notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapData {
    /// Reader that saw the tap.
    pub nfc_reader: ReaderIdentity,
}

/// Body of a tap-on notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapPayload {
    /// Tag that was tapped on.
    pub nfc_tag: NfcTag,

    /// Local time of the tap, ISO-8601 with offset.
    pub tap_datetime: String,

    /// Configured label for this reader.
    pub label: Option<String>,

    /// Reader metadata.
    pub data: TapData,
}

impl TapPayload {
    /// Build the payload for a tap seen at `at`.
    pub fn new<Tz: TimeZone>(
        id: &TagId,
        at: DateTime<Tz>,
        label: Option<&str>,
        identity: &ReaderIdentity,
    ) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            nfc_tag: NfcTag { uid: id.clone() },
            tap_datetime: at.to_rfc3339_opts(SecondsFormat::Micros, false),
            label: label.map(str::to_string),
            data: TapData {
                nfc_reader: identity.clone(),
            },
        }
    }
}
