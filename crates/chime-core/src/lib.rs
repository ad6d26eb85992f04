//! `chime-core` — shared vocabulary and host-context seams for the chime
//! workspace.
//!
//! The scheduler crate builds on three things defined here: the closed set of
//! [`Cadence`] classes, the [`Clock`] trait that supplies timezone-aware wall
//! time, and the [`TimeChangeNotifier`] channel through which the host reports
//! wall-clock discontinuities.

pub mod cadence;
pub mod clock;
pub mod signal;

pub use cadence::Cadence;
pub use clock::{Clock, SystemClock};
pub use signal::{ClockChange, TimeChangeNotifier, TimeChangeSignal};
