//! `crispr-lab` - tick-driven CRISPR gene editing simulator
//!
//! A single-user learning session moves through trait selection, risk
//! analysis, an optional mechanism explainer, a timed edit animation and a
//! graded result, with a short knowledge quiz alongside. The core is a set
//! of pure transitions over immutable session values; the scheduler and
//! CLI host them on tokio.

pub mod animator;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod observability;
pub mod quiz;
pub mod risk;
pub mod scheduler;
pub mod session;
