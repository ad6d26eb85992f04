use chrono::{DateTime, Local, TimeZone};

/// Host-supplied wall clock.
///
/// The scheduler never reads system time directly; it asks its `Clock` so
/// tests and simulations can substitute a deterministic source. The timezone
/// matters: `Cadence::Midnight` means midnight in `now()`'s zone.
pub trait Clock: Send + 'static {
    type Tz: TimeZone;

    fn now(&self) -> DateTime<Self::Tz>;
}

/// The production clock: current time in the system-local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Tz = Local;

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
