//! `chime-scheduler` — callbacks aligned to wall-clock boundaries.
//!
//! # Overview
//!
//! Components register callbacks against one of four fixed [`Cadence`]
//! classes through a [`SchedulerHandle`]. The [`engine::SchedulerEngine`]
//! task owns every registration, sleeps until the earliest due boundary,
//! invokes whatever is due, then chains each registration to its next
//! boundary. A wall-clock discontinuity signal (time set, timezone change,
//! date change) throws away every computed deadline and re-derives it from
//! the new current time.
//!
//! # Cadence classes
//!
//! | Cadence       | Fires at                                              |
//! |---------------|-------------------------------------------------------|
//! | `Minute`      | Top of every minute, plus a per-registration offset   |
//! | `QuarterHour` | Minute 0 / 15 / 30 / 45 of every hour                 |
//! | `Hour`        | Top of every hour                                     |
//! | `Midnight`    | 00:00:00 of every calendar day, in the clock's zone   |
//!
//! Late wake-ups (host suspension, scheduling delay) fire once and chain
//! from the current time; missed boundaries are never replayed.
//!
//! [`Cadence`]: chime_core::Cadence

pub mod boundary;
pub mod engine;
pub mod error;
pub mod types;

pub use engine::{SchedulerEngine, SchedulerHandle};
pub use error::{Result, SchedulerError};
pub use types::CallbackId;
