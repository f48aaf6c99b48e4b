//! Reader-wide constants.
//!
//! The external reader process prints one line per successful read while a
//! tag sits in the field:
//!
//! ```text
//! 04:04:A5:2C:F2:2A:5E:80
//! ^^ reader-type prefix, not part of the tag UID
//! ```
//!
//! # Usage
//!
//! ```
//! use lensreader_core::constants::*;
//! use std::time::Duration;
//!
//! let timeout = Duration::from_millis(DEFAULT_TAP_OFF_TIMEOUT_MS);
//! assert_eq!(timeout, Duration::from_millis(500));
//! ```

// ============================================================================
// Input Format
// ============================================================================

/// Separator between hex byte groups in a raw tag line.
pub const BYTE_DELIMITER: char = ':';

/// Number of leading byte groups that identify the reader type rather than
/// the tag and are dropped during normalization.
pub const PREFIX_GROUPS: usize = 1;

/// Hex digits per byte group.
pub const GROUP_WIDTH: usize = 2;

/// Longest input line accepted from the reader process.
///
/// Longer lines are discarded whole; a legitimate tag line (up to a 10-byte
/// UID plus prefix) is well under 40 characters.
pub const MAX_LINE_LENGTH: usize = 1024;

// ============================================================================
// Session Timing
// ============================================================================

/// Default inactivity window after which a present tag is considered lifted.
pub const DEFAULT_TAP_OFF_TIMEOUT_MS: u64 = 500;

/// Number of tap transitions retained in the in-memory history.
pub const DEFAULT_HISTORY_SIZE: usize = 100;

// ============================================================================
// Notification
// ============================================================================

/// Default notification endpoint.
pub const DEFAULT_ENDPOINT_URL: &str = "http://localhost:8888";

/// Default bound on a single notification request.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Scheme word placed before the token in the `Authorization` header.
pub const AUTH_SCHEME: &str = "Token";

/// Prefix used to derive a reader name from its IP address (`nfc-42`).
pub const READER_NAME_PREFIX: &str = "nfc-";

/// Placeholder for identity fields that could not be detected.
pub const UNKNOWN_IDENTITY: &str = "unknown";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_fits_in_short_line() {
        assert!(GROUP_WIDTH * (PREFIX_GROUPS + 10) + 10 < MAX_LINE_LENGTH);
    }

    #[test]
    fn test_default_timeouts() {
        assert_eq!(DEFAULT_TAP_OFF_TIMEOUT_MS, 500);
        assert!(DEFAULT_REQUEST_TIMEOUT_MS > DEFAULT_TAP_OFF_TIMEOUT_MS);
    }
}
