//! Mock device implementations for testing and development.
//!
//! This module provides simulated device implementations that can be inspected
//! programmatically without requiring physical hardware.

pub mod led;

// Re-export commonly used types
pub use led::{MockLed, MockLedHandle};
