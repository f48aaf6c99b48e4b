//! Tap session handling for the lens reader.
//!
//! Wires tag input, the debounce timer, the LED animator and the notifier
//! into one sequential state machine.
//!
//! ```text
//! reader stdout ─> TagLineReader ─> TapSessionMachine ─┬─> LedAnimator
//!                                        ▲             └─> Notifier
//!                                        └── DebounceTimer
//! ```
//!
//! All transitions run on the caller's task. The only concurrency is the LED
//! ramp task owned by the animator.

pub mod input;
pub mod state_machine;
pub mod timer;

pub use input::{TagLineReader, TagSource};
pub use state_machine::{
    SessionConfig, TapEvent, TapSession, TapSessionMachine, TapState, TapTransition,
};
pub use timer::DebounceTimer;
