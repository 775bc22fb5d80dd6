//! Lab configuration
//!
//! An optional YAML file can replace the trait catalog or question bank
//! and tune the animator and risk thresholds. Anything it leaves out falls
//! back to the built-in content and defaults.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLimits, ConfigLoader, LoadResult, LoadWarning, LoaderOptions};
pub use schema::LabConfig;
pub use validation::{ValidationResult, Validator};
