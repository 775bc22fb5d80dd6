//! Observability
//!
//! Logging, metrics, and the JSONL event stream describing a lab session.

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{Event, EventEmitter};
pub use logging::{LogFormat, init_logging};
pub use metrics::init_metrics;
