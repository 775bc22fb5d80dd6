//! Command dispatch and handlers.

pub mod completions;
pub mod quiz;
pub mod run;
pub mod traits;
pub mod validate;
pub mod version;

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::cli::args::{Cli, Commands};
use crate::config::{ConfigLoader, LabConfig};
use crate::error::LabError;

/// Routes a parsed invocation to its handler.
///
/// `cancel` fires when the process receives Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns whatever the handler fails with.
pub async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<(), LabError> {
    match cli.command {
        Commands::Traits(args) => traits::run(&args),
        Commands::Run(args) => run::run(&args, cancel).await,
        Commands::Quiz(args) => quiz::run(&args),
        Commands::Validate(args) => validate::run(&args),
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(())
        }
        Commands::Version(args) => version::run(&args),
    }
}

/// Loads the lab configuration at `path`, or the defaults without one.
///
/// # Errors
///
/// Returns [`LabError::Config`] if the file cannot be loaded.
pub fn load_config(path: Option<&Path>) -> Result<Arc<LabConfig>, LabError> {
    let Some(path) = path else {
        return Ok(Arc::new(LabConfig::default()));
    };
    let result = ConfigLoader::with_defaults().load(path)?;
    for warning in &result.warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }
    tracing::info!(file = %path.display(), "configuration loaded");
    Ok(result.config)
}
