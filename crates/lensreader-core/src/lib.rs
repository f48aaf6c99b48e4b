//! Core types shared across the lens reader crates.
//!
//! Holds the canonical tag identifier, the line normalizer that produces it,
//! reader-wide default constants and the common error type.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{TagId, is_tag_line, normalize};

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
