use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

/// Why the wall clock can no longer be trusted.
///
/// The scheduler reacts identically to every kind (full re-arm); the kind is
/// carried so hosts and logs can tell a timezone move from a manual time set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockChange {
    /// The system time was set, by the user or a time service.
    TimeSet,
    /// The device moved to a different timezone.
    ZoneChanged,
    /// The calendar date changed outside a normal midnight rollover.
    DateChanged,
}

/// Receiver half handed to the scheduler engine.
pub type TimeChangeSignal = watch::Receiver<Option<ClockChange>>;

/// Owner side of the wall-clock discontinuity channel.
///
/// The composition root keeps the notifier and wires it to whatever the
/// platform offers (clock-change broadcasts, an NTP hook, a test harness);
/// every subscriber sees every `notify`.
pub struct TimeChangeNotifier {
    tx: watch::Sender<Option<ClockChange>>,
}

impl TimeChangeNotifier {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    pub fn subscribe(&self) -> TimeChangeSignal {
        self.tx.subscribe()
    }

    /// Signal a discontinuity. Delivery is level-triggered per subscriber:
    /// rapid repeated changes may coalesce into one re-arm, and re-arming
    /// from current time is idempotent.
    pub fn notify(&self, change: ClockChange) {
        debug!(?change, "wall-clock discontinuity signalled");
        self.tx.send_replace(Some(change));
    }
}

impl Default for TimeChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_the_latest_change() {
        let notifier = TimeChangeNotifier::new();
        let mut signal = notifier.subscribe();
        assert!(signal.borrow().is_none());

        notifier.notify(ClockChange::ZoneChanged);
        signal.changed().await.expect("notifier alive");
        assert_eq!(*signal.borrow(), Some(ClockChange::ZoneChanged));
    }

    #[tokio::test]
    async fn notify_without_subscribers_is_harmless() {
        let notifier = TimeChangeNotifier::new();
        notifier.notify(ClockChange::TimeSet);

        // A subscriber attached afterwards still observes the current value.
        let signal = notifier.subscribe();
        assert_eq!(*signal.borrow(), Some(ClockChange::TimeSet));
    }
}
