//! `validate`: check lab configuration files.

use std::path::Path;

use serde::Serialize;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::ConfigLoader;
use crate::error::{ConfigError, LabError, Severity, ValidationIssue};

#[derive(Serialize)]
struct FileReport {
    file: String,
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

/// Validates each file, reporting every issue found.
///
/// # Errors
///
/// Returns [`LabError::Config`] for the first file that fails, after all
/// files have been reported. With `--strict`, warnings count as failures.
pub fn run(args: &ValidateArgs) -> Result<(), LabError> {
    let loader = ConfigLoader::with_defaults();
    let mut reports = Vec::with_capacity(args.files.len());
    let mut first_failure: Option<ConfigError> = None;

    for path in &args.files {
        tracing::info!(file = %path.display(), "validating configuration");
        let (report, failure) = check(&loader, path, args.strict);
        if first_failure.is_none() {
            first_failure = failure;
        }
        reports.push(report);
    }

    match args.format {
        OutputFormat::Human => {
            for report in &reports {
                let status = if report.valid { "ok" } else { "FAILED" };
                println!("{}: {status}", report.file);
                for e in &report.errors {
                    println!("  {e}");
                }
                for w in &report.warnings {
                    println!("  {w}");
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    first_failure.map_or(Ok(()), |e| Err(e.into()))
}

fn check(loader: &ConfigLoader, path: &Path, strict: bool) -> (FileReport, Option<ConfigError>) {
    let file = path.display().to_string();
    match loader.load(path) {
        Ok(result) => {
            let warnings: Vec<String> = result
                .warnings
                .iter()
                .map(|w| match &w.location {
                    Some(at) => format!("warning: {} at {at}", w.message),
                    None => format!("warning: {}", w.message),
                })
                .collect();
            let failure = (strict && !warnings.is_empty()).then(|| ConfigError::ValidationError {
                path: file.clone(),
                errors: result
                    .warnings
                    .iter()
                    .map(|w| ValidationIssue {
                        path: w.location.clone().unwrap_or_default(),
                        message: w.message.clone(),
                        severity: Severity::Warning,
                    })
                    .collect(),
            });
            let report = FileReport {
                file,
                valid: failure.is_none(),
                errors: Vec::new(),
                warnings,
            };
            (report, failure)
        }
        Err(e) => {
            let errors = match &e {
                ConfigError::ValidationError { errors, .. } => {
                    errors.iter().map(ToString::to_string).collect()
                }
                other => vec![other.to_string()],
            };
            let report = FileReport {
                file,
                valid: false,
                errors,
                warnings: Vec::new(),
            };
            (report, Some(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn valid_file_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "ok.yaml", "simulation:\n  seed: 3\n");
        let (report, failure) = check(&ConfigLoader::with_defaults(), &path, false);
        assert!(report.valid);
        assert!(failure.is_none());
    }

    #[test]
    fn strict_turns_warnings_into_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "warn.yaml", "simulation:\n  marker_ttl_ms: 0\n");
        let loader = ConfigLoader::with_defaults();

        let (report, failure) = check(&loader, &path, false);
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 1);
        assert!(failure.is_none());

        let (report, failure) = check(&loader, &path, true);
        assert!(!report.valid);
        assert!(matches!(failure, Some(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn validation_errors_are_listed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "bad.yaml",
            "simulation:\n  progress_increment: -1\n  marker_probability: 2\n",
        );
        let (report, failure) = check(&ConfigLoader::with_defaults(), &path, false);
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 2);
        assert!(failure.is_some());
    }
}
