//! Stage machine
//!
//! A session walks Select → Analyze → (Mechanism) → Edit → Result and can
//! be reset from anywhere. [`transition`] holds the pure transition
//! functions over [`Session`] values; [`StageController`] owns the live
//! session and wires transitions to logging, metrics and events.

mod controller;
mod outcome;
mod state;
pub mod transition;

pub use controller::{EditRequest, StageController};
pub use outcome::{Confidence, EditGrade, EditReport};
pub use state::{Session, SessionSnapshot, Stage};
