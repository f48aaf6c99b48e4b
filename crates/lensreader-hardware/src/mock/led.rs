//! Mock LED strip implementation for testing and development.
//!
//! This module provides a simulated LED strip that records every frame it is
//! given, so tests can assert on the exact sequence the animator produced.

use crate::{
    HardwareError, Result,
    traits::LedSink,
    types::{DeviceInfo, LedFrame, Rgb},
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

type FrameLog = Arc<Mutex<Vec<LedFrame>>>;

fn lock(frames: &FrameLog) -> MutexGuard<'_, Vec<LedFrame>> {
    // A panicking writer cannot leave a half-pushed frame behind.
    frames.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Mock LED strip for testing and development.
///
/// # Examples
///
/// ```
/// use lensreader_hardware::mock::MockLed;
/// use lensreader_hardware::traits::LedSink;
/// use lensreader_hardware::types::{LedFrame, Rgb};
///
/// #[tokio::main]
/// async fn main() -> lensreader_hardware::Result<()> {
///     let (mut strip, handle) = MockLed::new();
///
///     strip.write(LedFrame::new(Rgb::new(0, 255, 0), 1.0)).await?;
///
///     assert_eq!(handle.last_color(), Some(Rgb::new(0, 255, 0)));
///     assert_eq!(handle.frame_count(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockLed {
    /// Device name
    name: String,

    /// Frames written so far
    frames: FrameLog,

    /// When set, writes fail as if the strip were unplugged
    failing: Arc<AtomicBool>,
}

impl MockLed {
    /// Create a new mock LED strip with the default name.
    ///
    /// Returns a tuple of (MockLed, MockLedHandle) where the handle
    /// can be used to inspect written frames.
    pub fn new() -> (Self, MockLedHandle) {
        Self::with_name("Mock LED Strip".to_string())
    }

    /// Create a new mock LED strip with a custom name.
    pub fn with_name(name: String) -> (Self, MockLedHandle) {
        let frames = FrameLog::default();
        let failing = Arc::new(AtomicBool::new(false));

        let strip = Self {
            name: name.clone(),
            frames: frames.clone(),
            failing: failing.clone(),
        };

        let handle = MockLedHandle {
            name,
            frames,
            failing,
        };

        (strip, handle)
    }
}

impl LedSink for MockLed {
    async fn write(&mut self, frame: LedFrame) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(HardwareError::disconnected(self.name.clone()));
        }

        lock(&self.frames).push(frame);
        Ok(())
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo::new(self.name.clone(), 12)
    }
}

/// Handle for inspecting a mock LED strip.
///
/// Clones share the same frame log as the strip they were created with.
#[derive(Debug, Clone)]
pub struct MockLedHandle {
    /// Device name
    name: String,

    /// Frames written so far
    frames: FrameLog,

    /// Failure switch shared with the strip
    failing: Arc<AtomicBool>,
}

impl MockLedHandle {
    /// Get a copy of every frame written so far.
    pub fn frames(&self) -> Vec<LedFrame> {
        lock(&self.frames).clone()
    }

    /// Get the colors of every frame written so far.
    pub fn colors(&self) -> Vec<Rgb> {
        lock(&self.frames).iter().map(|frame| frame.color).collect()
    }

    /// Get the most recent frame, if any.
    pub fn last_frame(&self) -> Option<LedFrame> {
        lock(&self.frames).last().copied()
    }

    /// Get the color of the most recent frame, if any.
    pub fn last_color(&self) -> Option<Rgb> {
        self.last_frame().map(|frame| frame.color)
    }

    /// Get the number of frames written so far.
    pub fn frame_count(&self) -> usize {
        lock(&self.frames).len()
    }

    /// Forget all recorded frames.
    pub fn clear(&self) {
        lock(&self.frames).clear();
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
