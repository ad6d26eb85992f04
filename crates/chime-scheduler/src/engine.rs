use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use chime_core::cadence::MINUTE_IN_MILLIS;
use chime_core::{Cadence, Clock, ClockChange, TimeChangeSignal};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::boundary;
use crate::error::{Result, SchedulerError};
use crate::types::{Callback, CallbackId};

enum Command {
    Add {
        id: CallbackId,
        cadence: Cadence,
        offset_ms: i64,
        callback: Callback,
    },
    Remove {
        id: CallbackId,
    },
}

struct Registration {
    cadence: Cadence,
    offset_ms: i64,
    callback: Callback,
    /// Next firing instant. Recomputed after every dispatch and on every
    /// wall-clock discontinuity.
    due_at: Instant,
}

/// Cloneable registration surface for [`SchedulerEngine`].
///
/// Handed out by the composition root to every component that wants periodic
/// callbacks. All operations are synchronous and non-blocking; the only
/// failure modes are an out-of-range minute offset and an engine that has
/// already exited.
#[derive(Clone)]
pub struct SchedulerHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl SchedulerHandle {
    /// Register `callback` to run every minute, `offset` past the top of the
    /// minute.
    ///
    /// The offset exists so callers can fire shortly after the boundary and
    /// never race the system clock's own minute rollover. It must be below
    /// one minute; anything larger is rejected before it is enqueued.
    pub fn add_minute_callback<F>(&self, callback: F, offset: Duration) -> Result<CallbackId>
    where
        F: FnMut() + Send + 'static,
    {
        let offset_ms = offset.as_millis();
        if offset_ms >= MINUTE_IN_MILLIS as u128 {
            return Err(SchedulerError::InvalidOffset { offset_ms });
        }
        self.register(Cadence::Minute, offset_ms as i64, Box::new(callback))
    }

    /// Register `callback` to run at minute 0, 15, 30 and 45 of every hour.
    pub fn add_quarter_hour_callback<F>(&self, callback: F) -> Result<CallbackId>
    where
        F: FnMut() + Send + 'static,
    {
        self.register(Cadence::QuarterHour, 0, Box::new(callback))
    }

    /// Register `callback` to run at the top of every hour.
    pub fn add_hour_callback<F>(&self, callback: F) -> Result<CallbackId>
    where
        F: FnMut() + Send + 'static,
    {
        self.register(Cadence::Hour, 0, Box::new(callback))
    }

    /// Register `callback` to run at 00:00:00 of every calendar day, in the
    /// engine clock's timezone.
    pub fn add_midnight_callback<F>(&self, callback: F) -> Result<CallbackId>
    where
        F: FnMut() + Send + 'static,
    {
        self.register(Cadence::Midnight, 0, Box::new(callback))
    }

    /// Remove a registration. Removing an id that is not registered (or was
    /// already removed) is a no-op, so removal is safe to call twice.
    ///
    /// Once the remove has been applied the callback never fires again, even
    /// if its boundary was already due when the remove was issued.
    pub fn remove_callback(&self, id: CallbackId) -> Result<()> {
        self.commands
            .send(Command::Remove { id })
            .map_err(|_| SchedulerError::EngineStopped)
    }

    fn register(&self, cadence: Cadence, offset_ms: i64, callback: Callback) -> Result<CallbackId> {
        let id = CallbackId::new();
        self.commands
            .send(Command::Add {
                id,
                cadence,
                offset_ms,
                callback,
            })
            .map_err(|_| SchedulerError::EngineStopped)?;
        Ok(id)
    }
}

/// Owns every registration and fires callbacks at wall-clock boundaries.
///
/// The engine is the single logical thread of the scheduler: registrations,
/// removals, boundary re-computation and dispatch all happen on its task, so
/// no state is ever observable mid-mutation. Handles talk to it purely by
/// message.
pub struct SchedulerEngine<C: Clock> {
    clock: C,
    registry: HashMap<CallbackId, Registration>,
    commands: mpsc::UnboundedReceiver<Command>,
    time_signal: TimeChangeSignal,
    signal_alive: bool,
}

impl<C: Clock> SchedulerEngine<C> {
    /// Create an engine reading wall time from `clock` and watching
    /// `time_signal` for discontinuities. Returns the engine and the handle
    /// to hand out; clone the handle freely.
    pub fn new(clock: C, time_signal: TimeChangeSignal) -> (Self, SchedulerHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = Self {
            clock,
            registry: HashMap::new(),
            commands: rx,
            time_signal,
            signal_alive: true,
        };
        (engine, SchedulerHandle { commands: tx })
    }

    /// Main event loop. Runs until `shutdown` broadcasts `true` or every
    /// handle is dropped.
    ///
    /// Commands are drained before the timer is checked, so a removal issued
    /// before a boundary always wins over the firing.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("periodic scheduler started");
        loop {
            let next_due = self.registry.values().map(|r| r.due_at).min();
            // Empty registry means no armed timer: the wait arm pends forever.
            let boundary_wait = async move {
                match next_due {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                biased;
                cmd = self.commands.recv() => match cmd {
                    Some(cmd) => self.apply(cmd),
                    None => {
                        info!("all scheduler handles dropped; engine exiting");
                        break;
                    }
                },
                changed = self.time_signal.changed(), if self.signal_alive => match changed {
                    Ok(()) => {
                        let change = *self.time_signal.borrow_and_update();
                        self.rearm_all(change);
                    }
                    Err(_) => {
                        warn!("time-change notifier dropped; clock discontinuities will go unnoticed");
                        self.signal_alive = false;
                    }
                },
                res = shutdown.changed() => {
                    if res.is_err() || *shutdown.borrow() {
                        info!("periodic scheduler shutting down");
                        break;
                    }
                }
                _ = boundary_wait => self.fire_due(),
            }
        }
    }

    fn apply(&mut self, cmd: Command) {
        match cmd {
            Command::Add {
                id,
                cadence,
                offset_ms,
                callback,
            } => {
                let now = self.clock.now();
                let delay = boundary::delay_to_next(cadence, &now, offset_ms);
                let due_at = Instant::now() + delay;
                self.registry.insert(
                    id,
                    Registration {
                        cadence,
                        offset_ms,
                        callback,
                        due_at,
                    },
                );
                info!(
                    callback = %id,
                    %cadence,
                    offset_ms,
                    delay_ms = delay.as_millis() as u64,
                    "callback registered"
                );
            }
            Command::Remove { id } => {
                // Unknown ids are a no-op by contract.
                if self.registry.remove(&id).is_some() {
                    info!(callback = %id, "callback removed");
                }
            }
        }
    }

    /// Invoke every registration whose deadline has arrived, then chain each
    /// one to its next boundary.
    fn fire_due(&mut self) {
        let arrived = Instant::now();
        // Snapshot the due set first: a callback may register or remove
        // through a handle mid-pass, and those commands must land after the
        // pass, not corrupt it.
        let due: Vec<CallbackId> = self
            .registry
            .iter()
            .filter(|(_, r)| r.due_at <= arrived)
            .map(|(id, _)| *id)
            .collect();

        for id in due {
            let Some(reg) = self.registry.get_mut(&id) else {
                continue;
            };
            let cadence = reg.cadence;
            if panic::catch_unwind(AssertUnwindSafe(|| (reg.callback)())).is_err() {
                // A faulting callback must not stop the rest of the pass or
                // the re-arm that follows.
                error!(callback = %id, %cadence, "periodic callback panicked");
            }
            // Chain from the post-dispatch clock, so a slow callback cannot
            // produce a boundary that is already in the past. Boundaries
            // missed while suspended are skipped, not replayed.
            let now = self.clock.now();
            let delay = boundary::delay_to_next(cadence, &now, reg.offset_ms);
            reg.due_at = Instant::now() + delay;
            debug!(
                callback = %id,
                %cadence,
                delay_ms = delay.as_millis() as u64,
                "re-armed"
            );
        }
    }

    /// Drop every computed deadline and re-derive it from the current clock.
    ///
    /// Runs as one synchronous pass, so no firing can interleave with the
    /// cancel-and-re-arm sequence.
    fn rearm_all(&mut self, change: Option<ClockChange>) {
        if self.registry.is_empty() {
            debug!(?change, "wall clock changed; nothing registered");
            return;
        }
        let now = self.clock.now();
        let base = Instant::now();
        for (id, reg) in &mut self.registry {
            let delay = boundary::delay_to_next(reg.cadence, &now, reg.offset_ms);
            reg.due_at = base + delay;
            debug!(
                callback = %id,
                cadence = %reg.cadence,
                delay_ms = delay.as_millis() as u64,
                "re-armed"
            );
        }
        info!(
            ?change,
            count = self.registry.len(),
            "wall clock changed; all cadences re-armed"
        );
    }
}
