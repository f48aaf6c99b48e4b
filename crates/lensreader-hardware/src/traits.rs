//! LED output trait definition.
//!
//! This module defines the contract between the [`LedAnimator`] and whatever
//! actually displays a color: a physical LED strip driver, a logging stand-in
//! when no strip is attached, or a recording mock in tests.
//!
//! The trait uses native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.
//!
//! [`LedAnimator`]: crate::animator::LedAnimator

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::{DeviceInfo, LedFrame};

/// Trait for LED outputs.
///
/// A sink receives one [`LedFrame`] per animation tick. Implementations must
/// return promptly: the animator writes at roughly 60 frames per second and
/// a slow sink delays cancellation of the ramp that owns it.
///
/// # Object Safety
///
/// Native `async fn` in traits returns `impl Future`, which is an opaque type
/// that cannot be used in trait objects. Use [`AnyLedSink`] for dispatch over
/// the available implementations.
///
/// # Examples
///
/// ```no_run
/// use lensreader_hardware::traits::LedSink;
/// use lensreader_hardware::types::{LedFrame, Rgb};
/// use lensreader_hardware::error::Result;
///
/// async fn blank<S: LedSink>(sink: &mut S) -> Result<()> {
///     sink.write(LedFrame::new(Rgb::BLACK, 0.0)).await
/// }
/// ```
///
/// [`AnyLedSink`]: crate::devices::AnyLedSink
pub trait LedSink: Send + Sync {
    /// Display a frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame could not be delivered to the device.
    /// Callers log the failure and continue; a failed frame is never retried.
    async fn write(&mut self, frame: LedFrame) -> Result<()>;

    /// Describe the device behind this sink.
    fn info(&self) -> DeviceInfo;
}
