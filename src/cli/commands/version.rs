//! Version display.

use serde_json::json;

use crate::cli::args::{OutputFormat, VersionArgs};
use crate::error::LabError;

/// Prints the package name and version.
///
/// # Errors
///
/// Returns [`LabError::Json`] if JSON rendering fails.
pub fn run(args: &VersionArgs) -> Result<(), LabError> {
    let name = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    match args.format {
        OutputFormat::Human => println!("{name} {version}"),
        OutputFormat::Json => {
            let out = json!({ "name": name, "version": version });
            println!("{}", serde_json::to_string(&out)?);
        }
    }
    Ok(())
}
