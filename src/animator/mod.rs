//! Progress animator
//!
//! Drives the timed edit operation shown while a session is in the Edit
//! stage. The animator is tick-driven: the host calls into it at a fixed
//! cadence and it never reads a clock of its own.
//!
//! # Architecture
//!
//! - [`AnimatorRun`] - Value state of one activation (progress, phase, markers)
//! - [`advance`] - Pure per-tick step producing the next run
//! - [`elapse`] - Pure marker-expiry step driven by simulated time
//! - [`MarkerSource`] - Seeded pseudo-random source for marker injection

pub mod engine;
pub mod state;

pub use engine::{TickOutcome, TickReport, advance, elapse, phase_for};
pub use state::{AnimatorConfig, AnimatorRun, Marker, MarkerSource, RunId};
