//! Enum wrapper for LED sink dispatch.
//!
//! Native `async fn` in traits (RPITIT - Rust Edition 2024) are not
//! object-safe, so we cannot use `Box<dyn LedSink>`. [`AnyLedSink`] provides
//! concrete type dispatch instead, and is what the [`LedAnimator`] owns.
//!
//! Whether LEDs are attached is decided once at startup by choosing the
//! variant; the animation loop never checks for missing hardware.
//!
//! # Examples
//!
//! ```
//! use lensreader_hardware::devices::AnyLedSink;
//! use lensreader_hardware::traits::LedSink;
//!
//! let sink = AnyLedSink::logging();
//! assert!(!sink.info().physical);
//! ```
//!
//! [`LedAnimator`]: crate::animator::LedAnimator

use crate::logging::LoggingSink;
use crate::mock::MockLed;
use crate::traits::LedSink;
use crate::{DeviceInfo, LedFrame, Result};

/// Enum wrapper for LED sink dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyLedSink {
    /// No LED hardware; frames are traced.
    Logging(LoggingSink),

    /// Recording strip for development and testing.
    Mock(MockLed),
    // TODO: Add an SPI DotStar variant once a Linux SPI driver is chosen
}

impl AnyLedSink {
    /// Sink used when no LED hardware is present.
    pub fn logging() -> Self {
        Self::Logging(LoggingSink::new())
    }
}

impl From<LoggingSink> for AnyLedSink {
    fn from(sink: LoggingSink) -> Self {
        Self::Logging(sink)
    }
}

impl From<MockLed> for AnyLedSink {
    fn from(sink: MockLed) -> Self {
        Self::Mock(sink)
    }
}

impl LedSink for AnyLedSink {
    async fn write(&mut self, frame: LedFrame) -> Result<()> {
        match self {
            Self::Logging(sink) => sink.write(frame).await,
            Self::Mock(sink) => sink.write(frame).await,
        }
    }

    fn info(&self) -> DeviceInfo {
        match self {
            Self::Logging(sink) => sink.info(),
            Self::Mock(sink) => sink.info(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rgb;

    #[tokio::test]
    async fn test_any_sink_dispatches_to_mock() {
        let (strip, handle) = MockLed::new();
        let mut sink = AnyLedSink::from(strip);

        sink.write(LedFrame::new(Rgb::new(9, 9, 9), 1.0))
            .await
            .unwrap();

        assert_eq!(handle.last_color(), Some(Rgb::new(9, 9, 9)));
        assert_eq!(sink.info().name, "Mock LED Strip");
    }

    #[tokio::test]
    async fn test_any_sink_logging_never_fails() {
        let mut sink = AnyLedSink::logging();
        assert!(sink.write(LedFrame::new(Rgb::BLACK, 1.0)).await.is_ok());
        assert_eq!(sink.info().name, "No LEDs");
    }
}
