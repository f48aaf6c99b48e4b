//! Notification seam used by the tap session state machine.
//!
//! The state machine is generic over [`Notifier`] so that tests can script
//! outcomes with [`MockNotifier`] instead of running an HTTP server.

#![allow(async_fn_in_trait)]

use crate::client::{DispatchOutcome, NotificationClient};
use lensreader_core::TagId;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Something that can announce a tap on.
///
/// Implementations classify failures into the returned outcome and must not
/// retry.
pub trait Notifier: Send + Sync {
    /// Send one tap-on notification for `id`.
    async fn notify_tap_on(&self, id: &TagId) -> DispatchOutcome;
}

impl Notifier for NotificationClient {
    async fn notify_tap_on(&self, id: &TagId) -> DispatchOutcome {
        NotificationClient::notify_tap_on(self, id).await
    }
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<TagId>,
    scripted: VecDeque<DispatchOutcome>,
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Notifier that records calls and replays scripted outcomes.
///
/// Outcomes are consumed in order; once the script is empty every call is
/// [`DispatchOutcome::Delivered`].
///
/// # Examples
///
/// ```
/// use lensreader_core::TagId;
/// use lensreader_network::{DispatchOutcome, MockNotifier, Notifier};
///
/// #[tokio::main]
/// async fn main() {
///     let (notifier, handle) = MockNotifier::new();
///     handle.push_outcome(DispatchOutcome::Unreachable("refused".into()));
///
///     let id = TagId::new("aabb").unwrap();
///     assert!(!notifier.notify_tap_on(&id).await.is_delivered());
///     assert!(notifier.notify_tap_on(&id).await.is_delivered());
///     assert_eq!(handle.call_count(), 2);
/// }
/// ```
#[derive(Debug)]
pub struct MockNotifier {
    state: Arc<Mutex<MockState>>,
}

impl MockNotifier {
    /// Create a mock notifier and the handle used to script and inspect it.
    pub fn new() -> (Self, MockNotifierHandle) {
        let state = Arc::new(Mutex::new(MockState::default()));
        (
            Self {
                state: state.clone(),
            },
            MockNotifierHandle { state },
        )
    }
}

impl Notifier for MockNotifier {
    async fn notify_tap_on(&self, id: &TagId) -> DispatchOutcome {
        let mut state = lock(&self.state);
        state.calls.push(id.clone());
        state
            .scripted
            .pop_front()
            .unwrap_or(DispatchOutcome::Delivered)
    }
}

/// Handle for scripting and inspecting a [`MockNotifier`].
#[derive(Debug, Clone)]
pub struct MockNotifierHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockNotifierHandle {
    /// Queue the outcome for a future call.
    pub fn push_outcome(&self, outcome: DispatchOutcome) {
        lock(&self.state).scripted.push_back(outcome);
    }

    /// Tags notified so far, in call order.
    pub fn calls(&self) -> Vec<TagId> {
        lock(&self.state).calls.clone()
    }

    /// Number of notifications sent so far.
    pub fn call_count(&self) -> usize {
        lock(&self.state).calls.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_notifier_replays_script_in_order() {
        let (notifier, handle) = MockNotifier::new();
        handle.push_outcome(DispatchOutcome::Rejected {
            status: 500,
            message: "boom".to_string(),
        });
        handle.push_outcome(DispatchOutcome::Unreachable("refused".to_string()));

        let a = TagId::new("aa").unwrap();
        let b = TagId::new("bb").unwrap();

        assert!(matches!(
            notifier.notify_tap_on(&a).await,
            DispatchOutcome::Rejected { status: 500, .. }
        ));
        assert!(matches!(
            notifier.notify_tap_on(&b).await,
            DispatchOutcome::Unreachable(_)
        ));
        assert_eq!(notifier.notify_tap_on(&a).await, DispatchOutcome::Delivered);
        assert_eq!(handle.calls(), vec![a.clone(), b, a]);
    }
}
