//! Network layer for the lens reader
//!
//! This crate announces tap-on events to the remote service over HTTP and
//! gathers the reader metadata that accompanies each announcement.
//!
//! # Components
//!
//! - **NotificationClient**: one POST per tap on, outcome classified as
//!   delivered, rejected or unreachable
//! - **ReaderIdentity**: MAC/IP/model/name metadata, detected at startup
//! - **Notifier**: seam used by the state machine, with a scripted mock
//!
//! # Example
//!
//! ```no_run
//! use lensreader_network::{NotificationClient, NotificationConfig, identity};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let identity = identity::detect(None, Some("idtech".to_string()), None);
//! let client = NotificationClient::new(NotificationConfig::default(), identity)?;
//! # Ok(())
//! # }
//! ```

mod client;
pub mod identity;
mod notifier;
mod payload;

pub use client::{DispatchOutcome, NotificationClient, NotificationConfig, NotifyError};
pub use notifier::{MockNotifier, MockNotifierHandle, Notifier};
pub use payload::{NfcTag, ReaderIdentity, TapData, TapPayload, default_reader_name};
