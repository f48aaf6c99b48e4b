//! Tap session state machine.
//!
//! Turns the stream of tag reads into tap-on and tap-off events. A tag is
//! "present" from its first read until no read of it arrives for the tap-off
//! timeout, or until a different tag is read.
//!
//! # States
//!
//! - `Idle`: no tag in the field
//! - `Present(id)`: tag `id` is being read
//!
//! # Transitions
//!
//! - Idle → Present(id): tap on `id` (success ramp, one notification)
//! - Present(a) → Present(b): tap off `a`, then tap on `b`
//! - Present(id) → Idle: debounce timer fired, tap off `id`
//!
//! Repeated reads of the present tag only re-arm the timer.
//!
//! # Examples
//!
//! ```
//! use lensreader_core::TagId;
//! use lensreader_hardware::{LedAnimator, LedConfig, LoggingSink};
//! use lensreader_network::MockNotifier;
//! use lensreader_session::{SessionConfig, TapSessionMachine, TapState};
//!
//! #[tokio::main]
//! async fn main() {
//!     let animator = LedAnimator::new(LoggingSink::new(), LedConfig::default());
//!     let (notifier, calls) = MockNotifier::new();
//!     let mut machine = TapSessionMachine::new(SessionConfig::default(), animator, notifier);
//!
//!     let id = TagId::new("04a52cf22a5e80").unwrap();
//!     machine.on_identifier(id.clone()).await;
//!     machine.on_identifier(id.clone()).await;
//!
//!     assert_eq!(machine.state(), TapState::Present(id));
//!     assert_eq!(calls.call_count(), 1);
//! }
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use lensreader_core::constants::{DEFAULT_HISTORY_SIZE, DEFAULT_TAP_OFF_TIMEOUT_MS};
use lensreader_core::{Error, Result, TagId};
use lensreader_hardware::LedAnimator;
use lensreader_network::{DispatchOutcome, Notifier};

use crate::input::TagSource;
use crate::timer::DebounceTimer;

/// Presence of a tag in the reader field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TapState {
    /// No tag in the field.
    Idle,

    /// The given tag is being read.
    Present(TagId),
}

impl fmt::Display for TapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TapState::Idle => write!(f, "Idle"),
            TapState::Present(id) => write!(f, "Present({id})"),
        }
    }
}

/// Tap event emitted on a session boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TapEvent {
    /// A session started.
    TapOn(TagId),

    /// A session ended.
    TapOff(TagId),
}

impl TapEvent {
    /// Tag the event refers to.
    pub fn tag(&self) -> &TagId {
        match self {
            TapEvent::TapOn(id) | TapEvent::TapOff(id) => id,
        }
    }
}

impl fmt::Display for TapEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TapEvent::TapOn(id) => write!(f, "Tap On {id}"),
            TapEvent::TapOff(id) => write!(f, "Tap Off {id}"),
        }
    }
}

/// A tap event with the time it happened.
///
/// The timestamp is not serialized; deserialized records carry the time of
/// deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapTransition {
    /// What happened.
    pub event: TapEvent,

    /// When it happened.
    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl TapTransition {
    /// Record `event` at the current time.
    pub fn new(event: TapEvent) -> Self {
        Self {
            event,
            timestamp: Instant::now(),
        }
    }
}

/// Session tuning.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Silence after the last read before a tap off
    pub tap_off_timeout: Duration,

    /// Number of transitions kept in history
    pub history_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tap_off_timeout: Duration::from_millis(DEFAULT_TAP_OFF_TIMEOUT_MS),
            history_size: DEFAULT_HISTORY_SIZE,
        }
    }
}

impl SessionConfig {
    /// Set the tap-off timeout
    pub fn tap_off_timeout(mut self, timeout: Duration) -> Self {
        self.tap_off_timeout = timeout;
        self
    }

    /// Set the history size
    pub fn history_size(mut self, size: usize) -> Self {
        self.history_size = size;
        self
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.tap_off_timeout.is_zero() {
            return Err(Error::Config(
                "tap-off timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Active tag and when it was last read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TapSession {
    /// Tag currently in the field
    pub active_id: Option<TagId>,

    /// Time of the most recent read of any tag
    pub last_seen_at: Option<Instant>,
}

/// Tap session state machine.
///
/// Owns the LED animator and the notifier. Every transition runs to
/// completion before the next input is handled; the notification for a tap
/// on is awaited inline, so a tap off can never be observed before its tap
/// on.
pub struct TapSessionMachine<N> {
    session: TapSession,
    timer: DebounceTimer,
    animator: LedAnimator,
    notifier: N,
    history: VecDeque<TapTransition>,
    history_size: usize,
    last_outcome: Option<DispatchOutcome>,
}

impl<N: Notifier> TapSessionMachine<N> {
    /// Create an idle machine.
    pub fn new(config: SessionConfig, animator: LedAnimator, notifier: N) -> Self {
        Self {
            session: TapSession::default(),
            timer: DebounceTimer::new(config.tap_off_timeout),
            animator,
            notifier,
            history: VecDeque::with_capacity(config.history_size),
            history_size: config.history_size,
            last_outcome: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> TapState {
        match &self.session.active_id {
            Some(id) => TapState::Present(id.clone()),
            None => TapState::Idle,
        }
    }

    /// Active tag and last read time.
    pub fn session(&self) -> &TapSession {
        &self.session
    }

    /// The debounce timer.
    pub fn timer(&self) -> &DebounceTimer {
        &self.timer
    }

    /// The LED animator.
    pub fn animator(&self) -> &LedAnimator {
        &self.animator
    }

    /// Mutable access to the LED animator.
    pub fn animator_mut(&mut self) -> &mut LedAnimator {
        &mut self.animator
    }

    /// The notifier.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<TapTransition> {
        &self.history
    }

    /// Recent events, oldest first.
    pub fn events(&self) -> Vec<TapEvent> {
        self.history.iter().map(|t| t.event.clone()).collect()
    }

    /// Outcome of the most recent notification.
    pub fn last_outcome(&self) -> Option<&DispatchOutcome> {
        self.last_outcome.as_ref()
    }

    /// Handle one normalized tag read.
    pub async fn on_identifier(&mut self, id: TagId) {
        self.session.last_seen_at = Some(Instant::now());

        if self.session.active_id.as_ref() != Some(&id) {
            if self.session.active_id.is_some() {
                self.timer.cancel();
                self.tap_off().await;
            }
            self.tap_on(id).await;
        }

        self.timer.arm();
    }

    /// Handle expiry of the debounce timer. No-op while idle.
    pub async fn on_timer_fired(&mut self) {
        self.tap_off().await;
    }

    /// Drive the machine from `source` until it closes or `shutdown` is
    /// cancelled.
    ///
    /// Fades the LEDs to the resting color first. When the source closes, an
    /// active session is ended with a tap off. Either way the running LED
    /// ramp is allowed to finish before returning.
    pub async fn run<S: TagSource>(&mut self, source: &mut S, shutdown: CancellationToken) {
        info!(timeout = ?self.timer.timeout(), "Tap session started");
        self.animator.to_default().await;

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Shutdown requested");
                    break;
                }
                next = source.next_tag() => match next {
                    Some(id) => self.on_identifier(id).await,
                    None => {
                        info!("Reader input closed");
                        self.timer.cancel();
                        self.tap_off().await;
                        break;
                    }
                },
                _ = self.timer.fired() => self.on_timer_fired().await,
            }
        }

        let color = self.animator.settle().await;
        debug!(%color, "LEDs settled");
    }

    async fn tap_on(&mut self, id: TagId) {
        info!(tag = %id, "Tap On");
        self.session.active_id = Some(id.clone());
        self.record(TapEvent::TapOn(id.clone()));

        self.animator.indicate_success_on().await;

        let outcome = self.notifier.notify_tap_on(&id).await;
        debug!(tag = %id, %outcome, "Tap notification finished");
        self.last_outcome = Some(outcome);
    }

    async fn tap_off(&mut self) {
        let Some(id) = self.session.active_id.take() else {
            return;
        };

        info!(tag = %id, "Tap Off");
        self.record(TapEvent::TapOff(id));
        self.animator.indicate_success_off().await;
    }

    fn record(&mut self, event: TapEvent) {
        if self.history_size == 0 {
            return;
        }
        if self.history.len() >= self.history_size {
            self.history.pop_front();
        }
        self.history.push_back(TapTransition::new(event));
    }
}

impl<N> fmt::Debug for TapSessionMachine<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TapSessionMachine")
            .field("session", &self.session)
            .field("timer", &self.timer)
            .field("animator", &self.animator)
            .field("history_len", &self.history.len())
            .field("last_outcome", &self.last_outcome)
            .finish()
    }
}
