use crate::{
    Result,
    constants::{BYTE_DELIMITER, GROUP_WIDTH, PREFIX_GROUPS},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical tag identifier: lowercase hex, no separators.
///
/// Two reads belong to the same tap session exactly when their identifiers
/// compare equal.
///
/// # Examples
///
/// ```
/// use lensreader_core::{TagId, normalize};
///
/// let id = normalize("04:04:A5:2C:F2:2A:5E:80").unwrap();
/// assert_eq!(id.as_str(), "04a52cf22a5e80");
/// assert_eq!(id, TagId::new("04A52CF22A5E80").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagId(String);

impl TagId {
    /// Create a tag identifier from separator-free hex.
    ///
    /// The input is trimmed and lowercased.
    ///
    /// # Errors
    /// Returns `Error::InvalidTagId` if the value is empty, has an odd number
    /// of digits or contains non-hex characters.
    pub fn new(hex: &str) -> Result<Self> {
        let hex = hex.trim();

        if hex.is_empty() || hex.len() % GROUP_WIDTH != 0 {
            return Err(Error::InvalidTagId(format!(
                "expected whole hex bytes, got {:?}",
                hex
            )));
        }

        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidTagId(format!("non-hex characters in {:?}", hex)));
        }

        Ok(TagId(hex.to_ascii_lowercase()))
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of UID bytes the identifier represents.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.0.len() / GROUP_WIDTH
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for TagId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TagId::new(s)
    }
}

impl TryFrom<String> for TagId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        TagId::new(&value)
    }
}

impl From<TagId> for String {
    fn from(id: TagId) -> Self {
        id.0
    }
}

impl AsRef<str> for TagId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_byte_group(group: &str) -> bool {
    group.len() == GROUP_WIDTH && group.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Check whether a raw line from the reader process carries a tag read.
///
/// A tag line is a colon-delimited sequence of two-digit hex groups with at
/// least one group following the reader-type prefix. Surrounding whitespace
/// is ignored.
///
/// # Examples
///
/// ```
/// use lensreader_core::is_tag_line;
///
/// assert!(is_tag_line("04:AA:BB:CC\n"));
/// assert!(!is_tag_line("Waiting for card..."));
/// assert!(!is_tag_line("04"));
/// ```
#[must_use]
pub fn is_tag_line(raw: &str) -> bool {
    let mut groups = 0usize;
    for group in raw.trim().split(BYTE_DELIMITER) {
        if !is_byte_group(group) {
            return false;
        }
        groups += 1;
    }
    groups > PREFIX_GROUPS
}

/// Convert a raw reader line into a canonical [`TagId`].
///
/// Strips surrounding whitespace, drops the leading reader-type group, joins
/// the remaining groups and lowercases the result.
///
/// # Errors
/// Returns `Error::InvalidTagLine` if the line is not a tag line
/// (see [`is_tag_line`]).
///
/// # Examples
///
/// ```
/// use lensreader_core::normalize;
///
/// let id = normalize("  04:AA:BB:CC:DD:EE:FF:01\r\n").unwrap();
/// assert_eq!(id.as_str(), "aabbccddeeff01");
///
/// assert!(normalize("reader ready").is_err());
/// ```
pub fn normalize(raw: &str) -> Result<TagId> {
    if !is_tag_line(raw) {
        return Err(Error::InvalidTagLine(raw.trim().to_string()));
    }

    let hex: String = raw
        .trim()
        .split(BYTE_DELIMITER)
        .skip(PREFIX_GROUPS)
        .collect::<String>()
        .to_ascii_lowercase();

    Ok(TagId(hex))
}
