//! Stand-in LED sink for devices without an LED strip.
//!
//! When no strip is detected at startup the animator still runs its ramps
//! against this sink, so every code path behaves the same with or without
//! hardware. Frames are only traced.

use crate::{
    Result,
    traits::LedSink,
    types::{DeviceInfo, LedFrame},
};
use tracing::trace;

/// LED sink that logs frames instead of displaying them.
#[derive(Debug, Clone)]
pub struct LoggingSink {
    name: String,
}

impl LoggingSink {
    /// Create a logging sink with the default name.
    pub fn new() -> Self {
        Self::with_name("No LEDs")
    }

    /// Create a logging sink with a custom name.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for LoggingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LedSink for LoggingSink {
    async fn write(&mut self, frame: LedFrame) -> Result<()> {
        trace!(
            sink = %self.name,
            color = %frame.color,
            brightness = frame.brightness,
            "Setting LEDs"
        );
        Ok(())
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo::new(self.name.clone(), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rgb;

    #[tokio::test]
    async fn test_logging_sink_accepts_every_frame() {
        let mut sink = LoggingSink::new();
        for value in [0u8, 128, 255] {
            let frame = LedFrame::new(Rgb::new(value, value, value), 1.0);
            assert!(sink.write(frame).await.is_ok());
        }
    }

    #[test]
    fn test_logging_sink_info_is_virtual() {
        let info = LoggingSink::with_name("headless").info();
        assert_eq!(info.name, "headless");
        assert_eq!(info.pixel_count, 0);
        assert!(!info.physical);
    }
}
