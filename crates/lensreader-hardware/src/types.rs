//! Common types for the LED output path.
//!
//! This module defines the color value animated by the [`LedAnimator`],
//! the frame handed to an LED sink and the LED configuration.
//!
//! [`LedAnimator`]: crate::animator::LedAnimator

use crate::error::{HardwareError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// An RGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,

    /// Green channel.
    pub g: u8,

    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// All channels off.
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    /// Create a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Get the channels as an array, in `[r, g, b]` order.
    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Build a color from an `[r, g, b]` array.
    pub fn from_channels([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = HardwareError;

    /// Parse a color from the `"r,g,b"` form used in configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use lensreader_hardware::Rgb;
    ///
    /// let white: Rgb = "130, 127, 127".parse().unwrap();
    /// assert_eq!(white, Rgb::new(130, 127, 127));
    /// assert!("256,0,0".parse::<Rgb>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(HardwareError::invalid_data(format!(
                "expected \"r,g,b\", got {:?}",
                s
            )));
        }

        let mut channels = [0u8; 3];
        for (channel, part) in channels.iter_mut().zip(&parts) {
            *channel = part.parse().map_err(|_| {
                HardwareError::invalid_data(format!("invalid color channel {:?} in {:?}", part, s))
            })?;
        }

        Ok(Rgb::from_channels(channels))
    }
}

/// A single output frame handed to an LED sink.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LedFrame {
    /// Color to display.
    pub color: Rgb,

    /// Global brightness scalar, 0.0 to 1.0.
    pub brightness: f32,
}

impl LedFrame {
    /// Create a new frame.
    pub fn new(color: Rgb, brightness: f32) -> Self {
        Self { color, brightness }
    }
}

/// Device information reported by an LED sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "DotStar strip", "Mock LED").
    pub name: String,

    /// Number of addressable pixels driven with the same color.
    pub pixel_count: usize,

    /// Whether frames reach physical hardware.
    pub physical: bool,
}

impl DeviceInfo {
    /// Create a new DeviceInfo for a virtual (non-physical) sink.
    pub fn new(name: impl Into<String>, pixel_count: usize) -> Self {
        Self {
            name: name.into(),
            pixel_count,
            physical: false,
        }
    }

    /// Mark the device as physical hardware.
    pub fn physical(mut self) -> Self {
        self.physical = true;
        self
    }
}

/// Colors, brightness and frame rate used by the LED indicator.
///
/// # Examples
///
/// ```
/// use lensreader_hardware::{LedConfig, Rgb};
///
/// let config = LedConfig::default()
///     .success_color(Rgb::new(0, 0, 255))
///     .brightness(0.5);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LedConfig {
    /// Resting color shown between taps.
    pub default_color: Rgb,

    /// Color shown while a tag is present.
    pub success_color: Rgb,

    /// Color flashed on a failed tap.
    pub failure_color: Rgb,

    /// Brightness applied to every frame.
    pub brightness: f32,

    /// Interval between ramp frames.
    pub refresh_interval: Duration,
}

impl Default for LedConfig {
    fn default() -> Self {
        Self {
            default_color: Rgb::new(130, 127, 127),
            success_color: Rgb::new(0, 255, 0),
            failure_color: Rgb::new(255, 0, 0),
            brightness: 1.0,
            refresh_interval: Duration::from_micros(16_667), // 60 Hz
        }
    }
}

impl LedConfig {
    /// Set the resting color.
    pub fn default_color(mut self, color: Rgb) -> Self {
        self.default_color = color;
        self
    }

    /// Set the tag-present color.
    pub fn success_color(mut self, color: Rgb) -> Self {
        self.success_color = color;
        self
    }

    /// Set the failure color.
    pub fn failure_color(mut self, color: Rgb) -> Self {
        self.failure_color = color;
        self
    }

    /// Set the frame brightness.
    pub fn brightness(mut self, brightness: f32) -> Self {
        self.brightness = brightness;
        self
    }

    /// Set the interval between ramp frames.
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Check that brightness and frame interval are usable.
    ///
    /// # Errors
    /// Returns `HardwareError::ConfigurationError` if brightness is outside
    /// 0.0 to 1.0 or the refresh interval is zero.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.brightness) {
            return Err(HardwareError::configuration(format!(
                "brightness must be within 0.0-1.0, got {}",
                self.brightness
            )));
        }

        if self.refresh_interval.is_zero() {
            return Err(HardwareError::configuration(
                "refresh interval must be non-zero",
            ));
        }

        Ok(())
    }
}
