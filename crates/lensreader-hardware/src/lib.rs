//! LED output layer for the lens reader.
//!
//! This crate drives the reader's visual indicator: a strip of RGB LEDs that
//! fades between a resting color and a success color as tags are tapped on and
//! off.
//!
//! # Design Philosophy
//!
//! - **Async-first**: output goes through native `async fn` in traits
//!   (Rust 1.90 + Edition 2024 RPITIT).
//! - **Capability injection**: whether LEDs are attached is decided once, by
//!   choosing an [`AnyLedSink`] variant. A device without LEDs gets
//!   [`AnyLedSink::Logging`] and runs exactly the same animation code.
//! - **Never fatal**: write failures are logged by the animator and never
//!   propagate to the caller.
//!
//! # Animation
//!
//! ```no_run
//! use lensreader_hardware::{AnyLedSink, LedAnimator, LedConfig};
//!
//! # async fn example() {
//! let mut animator = LedAnimator::new(AnyLedSink::logging(), LedConfig::default());
//!
//! animator.to_default().await;          // fade in at startup
//! animator.indicate_success_on().await; // tag presented
//! animator.indicate_success_off().await; // tag lifted
//! # }
//! ```
//!
//! Each call supersedes whatever ramp was running; see [`animator`] for the
//! cancellation rules.
//!
//! # Error Handling
//!
//! Sink operations return [`Result<T>`][error::Result] with the
//! [`HardwareError`] error type.

pub mod animator;
pub mod devices;
pub mod error;
pub mod logging;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use animator::{LedAnimator, Ramp};
pub use devices::AnyLedSink;
pub use error::{HardwareError, Result};
pub use logging::LoggingSink;
pub use mock::{MockLed, MockLedHandle};
pub use traits::LedSink;
pub use types::{DeviceInfo, LedConfig, LedFrame, Rgb};
