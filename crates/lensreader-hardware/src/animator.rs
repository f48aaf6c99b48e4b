//! LED color animation.
//!
//! The [`LedAnimator`] owns the indicator's current color and runs at most one
//! ramp at a time. A ramp is a spawned task that interpolates from a start
//! color to a target color with an ease-in cubic curve, writing one frame per
//! refresh tick to the LED sink.
//!
//! # Ownership
//!
//! ```text
//!            idle                          ramping
//! ┌──────────────────────┐      ┌────────────────────────────────┐
//! │ LedAnimator          │      │ LedAnimator                    │
//! │   idle_sink: Some ───┼─────►│   active: Some(token, handle)  │
//! └──────────────────────┘      │        │                       │
//!            ▲                  │        ▼                       │
//!            │ join returns     │   ramp task owns the sink,     │
//!            └──the sink────────┤   publishes color via watch    │
//!                               └────────────────────────────────┘
//! ```
//!
//! Starting a ramp cancels the previous task and awaits its exit before the
//! start color is snapshotted, so a stale task can never write after the new
//! ramp begins.
//!
//! # Examples
//!
//! ```
//! use lensreader_hardware::{LedAnimator, LedConfig, Rgb};
//! use lensreader_hardware::mock::MockLed;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (strip, handle) = MockLed::new();
//!     let mut animator = LedAnimator::new(strip, LedConfig::default());
//!
//!     animator.ramp_to(Rgb::new(0, 255, 0), Duration::from_millis(50)).await;
//!     let color = animator.settle().await;
//!
//!     assert_eq!(color, Rgb::new(0, 255, 0));
//!     assert_eq!(handle.last_color(), Some(color));
//! }
//! ```

use crate::devices::AnyLedSink;
use crate::logging::LoggingSink;
use crate::traits::LedSink;
use crate::types::{DeviceInfo, LedConfig, LedFrame, Rgb};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

/// Duration of the fade to the resting color.
pub const DEFAULT_RAMP: Duration = Duration::from_secs(1);

/// Duration of the tap-on and tap-off fades.
pub const SUCCESS_RAMP: Duration = Duration::from_millis(600);

/// Time the failure color is held before fading back.
pub const FAILURE_HOLD: Duration = Duration::from_secs(1);

/// Penner's ease-in cubic.
///
/// `t` is the elapsed time, `base` the start value, `change` the total change
/// and `duration` the ramp length. `duration` must be non-zero.
///
/// ```
/// use lensreader_hardware::animator::ease_in_cubic;
///
/// assert_eq!(ease_in_cubic(0.0, 10.0, 100.0, 2.0), 10.0);
/// assert_eq!(ease_in_cubic(1.0, 0.0, 80.0, 2.0), 10.0);
/// assert_eq!(ease_in_cubic(2.0, 10.0, 100.0, 2.0), 110.0);
/// ```
#[must_use]
pub fn ease_in_cubic(t: f32, base: f32, change: f32, duration: f32) -> f32 {
    let t = t / duration;
    change * t * t * t + base
}

/// A single color transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ramp {
    /// Color at the start of the ramp.
    pub start: Rgb,

    /// Color at and after the end of the ramp.
    pub target: Rgb,

    /// Length of the ramp.
    pub duration: Duration,
}

impl Ramp {
    /// Create a new ramp.
    pub fn new(start: Rgb, target: Rgb, duration: Duration) -> Self {
        Self {
            start,
            target,
            duration,
        }
    }

    /// Color the ramp shows after `elapsed`.
    ///
    /// Returns the exact target once `elapsed >= duration`, which includes
    /// every instant of a zero-length ramp. Channels are truncated toward
    /// zero.
    #[must_use]
    pub fn color_at(&self, elapsed: Duration) -> Rgb {
        if elapsed >= self.duration {
            return self.target;
        }

        let t = elapsed.as_secs_f32();
        let duration = self.duration.as_secs_f32();

        let mut channels = [0u8; 3];
        for ((out, start), target) in channels
            .iter_mut()
            .zip(self.start.channels())
            .zip(self.target.channels())
        {
            let base = f32::from(start);
            let change = f32::from(target) - base;
            *out = ease_in_cubic(t, base, change, duration) as u8;
        }

        Rgb::from_channels(channels)
    }

    /// Whether the ramp has reached its target after `elapsed`.
    #[must_use]
    pub fn is_complete(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}

struct ActiveRamp {
    ramp: Ramp,
    cancel: CancellationToken,
    handle: JoinHandle<AnyLedSink>,
}

/// Animated LED indicator.
///
/// Holds the LED sink while idle and hands it to the ramp task while a ramp
/// runs. The current color is readable at any time through
/// [`current_color`](Self::current_color) or a [`subscribe`](Self::subscribe)d
/// watch receiver.
pub struct LedAnimator {
    config: LedConfig,
    sink_info: DeviceInfo,
    idle_sink: Option<AnyLedSink>,
    active: Option<ActiveRamp>,
    color: Arc<watch::Sender<Rgb>>,
}

impl LedAnimator {
    /// Create an animator driving `sink`. The initial color is black.
    pub fn new(sink: impl Into<AnyLedSink>, config: LedConfig) -> Self {
        let sink = sink.into();
        let (color, _) = watch::channel(Rgb::BLACK);

        Self {
            config,
            sink_info: sink.info(),
            idle_sink: Some(sink),
            active: None,
            color: Arc::new(color),
        }
    }

    /// Get the LED configuration.
    pub fn config(&self) -> &LedConfig {
        &self.config
    }

    /// Describe the sink this animator drives.
    pub fn sink_info(&self) -> &DeviceInfo {
        &self.sink_info
    }

    /// The color most recently written to the sink.
    pub fn current_color(&self) -> Rgb {
        *self.color.borrow()
    }

    /// Subscribe to color changes.
    pub fn subscribe(&self) -> watch::Receiver<Rgb> {
        self.color.subscribe()
    }

    /// Target of the most recently started ramp, if one was started and
    /// has not been settled.
    pub fn target(&self) -> Option<Rgb> {
        self.active.as_ref().map(|active| active.ramp.target)
    }

    /// Whether a ramp task is still writing frames.
    pub fn is_ramping(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.handle.is_finished())
    }

    /// Transition from the current color to `target` over `duration`.
    ///
    /// Any ramp in progress is cancelled and awaited first; the new ramp
    /// starts from whatever color that ramp last wrote. Returns as soon as
    /// the new ramp task is started.
    pub async fn ramp_to(&mut self, target: Rgb, duration: Duration) {
        let sink = self.reclaim(true).await;
        let ramp = Ramp::new(self.current_color(), target, duration);

        debug!(from = %ramp.start, to = %ramp.target, ?duration, "Ramping LEDs");

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_ramp(
            sink,
            ramp,
            self.config.brightness,
            self.config.refresh_interval,
            cancel.clone(),
            self.color.clone(),
        ));

        self.active = Some(ActiveRamp {
            ramp,
            cancel,
            handle,
        });
    }

    /// Fade to the resting color.
    pub async fn to_default(&mut self) {
        self.ramp_to(self.config.default_color, DEFAULT_RAMP).await;
    }

    /// Fade to the success color after a tap on.
    pub async fn indicate_success_on(&mut self) {
        self.ramp_to(self.config.success_color, SUCCESS_RAMP).await;
    }

    /// Fade back to the resting color after a tap off.
    pub async fn indicate_success_off(&mut self) {
        self.ramp_to(self.config.default_color, SUCCESS_RAMP).await;
    }

    /// Flash the failure color, hold it, then fade back to rest.
    ///
    /// Returns once the fade back has started, roughly [`FAILURE_HOLD`]
    /// after the call.
    pub async fn indicate_failure(&mut self) {
        self.ramp_to(self.config.failure_color, SUCCESS_RAMP).await;
        tokio::time::sleep(FAILURE_HOLD).await;
        self.ramp_to(self.config.default_color, SUCCESS_RAMP).await;
    }

    /// Stop the ramp in progress, leaving the LEDs at their current color.
    pub async fn cancel(&mut self) {
        let sink = self.reclaim(true).await;
        self.idle_sink = Some(sink);
    }

    /// Wait for the ramp in progress to finish and return the final color.
    pub async fn settle(&mut self) -> Rgb {
        let sink = self.reclaim(false).await;
        self.idle_sink = Some(sink);
        self.current_color()
    }

    /// Take the sink back from the ramp task, or from the idle slot.
    async fn reclaim(&mut self, cancel: bool) -> AnyLedSink {
        if let Some(active) = self.active.take() {
            if cancel {
                active.cancel.cancel();
            }

            return match active.handle.await {
                Ok(sink) => sink,
                Err(e) => {
                    error!(error = %e, "LED ramp task failed, continuing without LED output");
                    AnyLedSink::from(LoggingSink::with_name(self.sink_info.name.clone()))
                }
            };
        }

        self.idle_sink
            .take()
            .unwrap_or_else(|| AnyLedSink::from(LoggingSink::with_name(self.sink_info.name.clone())))
    }
}

impl Drop for LedAnimator {
    fn drop(&mut self) {
        if let Some(active) = &self.active {
            active.cancel.cancel();
        }
    }
}

impl std::fmt::Debug for LedAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedAnimator")
            .field("sink", &self.sink_info.name)
            .field("color", &self.current_color())
            .field("target", &self.target())
            .finish()
    }
}

/// Body of a ramp task. Returns the sink when the ramp completes or is
/// cancelled.
async fn run_ramp(
    mut sink: AnyLedSink,
    ramp: Ramp,
    brightness: f32,
    tick: Duration,
    cancel: CancellationToken,
    color: Arc<watch::Sender<Rgb>>,
) -> AnyLedSink {
    let started = Instant::now();
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut write_failed = false;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(target = %ramp.target, "LED ramp cancelled");
                break;
            }
            _ = ticker.tick() => {}
        }

        let elapsed = started.elapsed();
        let value = ramp.color_at(elapsed);

        color.send_replace(value);
        if let Err(e) = sink.write(LedFrame::new(value, brightness)).await {
            if write_failed {
                trace!(error = %e, "LED write failed");
            } else {
                warn!(error = %e, "LED write failed, continuing without output");
                write_failed = true;
            }
        }

        if ramp.is_complete(elapsed) {
            break;
        }
    }

    sink
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockLed;

    const GREEN: Rgb = Rgb::new(0, 255, 0);
    const RED: Rgb = Rgb::new(255, 0, 0);

    fn animator() -> (LedAnimator, crate::mock::MockLedHandle) {
        let (strip, handle) = MockLed::new();
        (LedAnimator::new(strip, LedConfig::default()), handle)
    }

    #[test]
    fn test_ramp_color_at_follows_ease_in_cubic() {
        let ramp = Ramp::new(Rgb::BLACK, GREEN, Duration::from_secs(1));

        assert_eq!(ramp.color_at(Duration::ZERO), Rgb::BLACK);
        // 255 * 0.5^3 = 31.875
        assert_eq!(ramp.color_at(Duration::from_millis(500)), Rgb::new(0, 31, 0));
        assert_eq!(ramp.color_at(Duration::from_secs(1)), GREEN);
        assert_eq!(ramp.color_at(Duration::from_secs(5)), GREEN);
    }

    #[test]
    fn test_ramp_color_at_decreasing_channel() {
        let ramp = Ramp::new(Rgb::new(130, 127, 127), GREEN, Duration::from_secs(2));
        let mid = ramp.color_at(Duration::from_secs(1));

        // 130 - 130 * 0.125 = 113.75, 127 + 128 * 0.125 = 143, 127 - 127 * 0.125 = 111.125
        assert_eq!(mid, Rgb::new(113, 143, 111));
    }

    #[test]
    fn test_ramp_zero_duration_is_complete_immediately() {
        let ramp = Ramp::new(Rgb::BLACK, RED, Duration::ZERO);
        assert!(ramp.is_complete(Duration::ZERO));
        assert_eq!(ramp.color_at(Duration::ZERO), RED);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ramp_ends_exactly_on_target() {
        let (mut animator, handle) = animator();

        animator.ramp_to(GREEN, SUCCESS_RAMP).await;
        assert_eq!(animator.target(), Some(GREEN));

        let color = animator.settle().await;
        assert_eq!(color, GREEN);
        assert_eq!(handle.last_color(), Some(GREEN));
        assert!(!animator.is_ramping());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ramp_frames_are_monotonic() {
        let (mut animator, handle) = animator();

        animator.ramp_to(GREEN, Duration::from_secs(1)).await;
        animator.settle().await;

        let greens: Vec<u8> = handle.colors().iter().map(|c| c.g).collect();
        assert!(greens.len() > 30, "expected ~60 frames, got {}", greens.len());
        assert!(greens.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(greens.first(), Some(&0));
        assert_eq!(greens.last(), Some(&255));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_duration_snaps_without_intermediate_frames() {
        let (mut animator, handle) = animator();

        animator.ramp_to(RED, Duration::ZERO).await;
        let color = animator.settle().await;

        assert_eq!(color, RED);
        assert_eq!(handle.colors(), vec![RED]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseding_ramp_wins_and_starts_from_snapshot() {
        let (mut animator, handle) = animator();

        animator.ramp_to(GREEN, Duration::from_secs(1)).await;
        tokio::time::sleep(Duration::from_millis(700)).await;

        animator.ramp_to(RED, SUCCESS_RAMP).await;
        let superseded_frames = handle.frame_count();
        let snapshot = animator.current_color();
        assert_ne!(snapshot, GREEN, "first ramp should have been cut short");

        let color = animator.settle().await;
        let colors = handle.colors();

        assert_eq!(color, RED);
        assert_eq!(colors.last(), Some(&RED));
        assert_eq!(colors[superseded_frames], snapshot);
        assert!(!colors[superseded_frames..].contains(&GREEN));
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_ramps_only_last_target_sticks() {
        let (mut animator, handle) = animator();

        animator.ramp_to(GREEN, Duration::from_secs(1)).await;
        animator.ramp_to(RED, Duration::from_secs(1)).await;
        animator.ramp_to(Rgb::new(0, 0, 255), Duration::from_millis(100)).await;

        assert_eq!(animator.target(), Some(Rgb::new(0, 0, 255)));
        assert_eq!(animator.settle().await, Rgb::new(0, 0, 255));
        assert_eq!(handle.last_color(), Some(Rgb::new(0, 0, 255)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_leaves_color_mid_ramp() {
        let (mut animator, handle) = animator();

        animator.ramp_to(GREEN, Duration::from_secs(1)).await;
        tokio::time::sleep(Duration::from_millis(500)).await;
        animator.cancel().await;

        let frames = handle.frame_count();
        let color = animator.current_color();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_ne!(color, GREEN);
        assert_eq!(handle.frame_count(), frames);
        assert_eq!(handle.last_color(), Some(color));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_sink_does_not_stop_animation() {
        let (mut animator, handle) = animator();
        handle.set_failing(true);

        animator.indicate_success_on().await;
        let color = animator.settle().await;

        assert_eq!(color, GREEN);
        assert_eq!(handle.frame_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_indicate_failure_flashes_then_returns_to_default() {
        let (mut animator, handle) = animator();

        animator.indicate_failure().await;
        let color = animator.settle().await;

        assert!(handle.colors().contains(&RED));
        assert_eq!(color, animator.config().default_color);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_off_sequence() {
        let (mut animator, handle) = animator();

        animator.to_default().await;
        assert_eq!(animator.settle().await, Rgb::new(130, 127, 127));

        animator.indicate_success_on().await;
        assert_eq!(animator.settle().await, GREEN);

        animator.indicate_success_off().await;
        assert_eq!(animator.settle().await, Rgb::new(130, 127, 127));
        assert!(handle.frame_count() > 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribe_sees_final_color() {
        let (mut animator, _handle) = animator();
        let rx = animator.subscribe();

        animator.ramp_to(GREEN, Duration::from_millis(100)).await;
        animator.settle().await;

        assert_eq!(*rx.borrow(), GREEN);
    }

    #[tokio::test]
    async fn test_logging_sink_animator() {
        let mut animator = LedAnimator::new(AnyLedSink::logging(), LedConfig::default());
        assert!(!animator.sink_info().physical);

        animator.ramp_to(RED, Duration::ZERO).await;
        assert_eq!(animator.settle().await, RED);
    }
}
