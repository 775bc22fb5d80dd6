//! Configuration loader
//!
//! Loading runs in fixed stages:
//! 1. size check against [`ConfigLimits`]
//! 2. environment variable expansion on the raw text
//! 3. YAML parsing into [`LabConfig`]
//! 4. validation, collecting every issue
//! 5. freeze behind an `Arc`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::config::schema::LabConfig;
use crate::config::validation::Validator;
use crate::error::ConfigError;

// ============================================================================
// Public API
// ============================================================================

/// Options for the configuration loader.
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    /// Size and count limits.
    pub config_limits: ConfigLimits,
}

/// Limits that keep a configuration file within sane bounds.
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    /// Maximum file size in bytes.
    pub max_config_size: u64,
    /// Maximum number of traits.
    pub max_traits: usize,
    /// Maximum number of quiz questions.
    pub max_questions: usize,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_config_size: env_or("CRISPR_LAB_MAX_CONFIG_SIZE", 1024 * 1024),
            max_traits: env_or("CRISPR_LAB_MAX_TRAITS", 256),
            max_questions: env_or("CRISPR_LAB_MAX_QUESTIONS", 256),
        }
    }
}

/// A loaded, validated configuration.
#[derive(Debug)]
pub struct LoadResult {
    /// The frozen configuration.
    pub config: Arc<LabConfig>,
    /// Non-fatal issues found while loading.
    pub warnings: Vec<LoadWarning>,
}

/// Non-fatal issue found while loading.
#[derive(Debug, Clone)]
pub struct LoadWarning {
    /// What is wrong.
    pub message: String,
    /// Where, if known.
    pub location: Option<String>,
}

/// Loads lab configuration files.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    /// Creates a loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Creates a loader with default options.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Loads and validates the configuration at `path`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingFile`] if the file does not exist
    /// - [`ConfigError::TooLarge`] if it exceeds the size limit
    /// - [`ConfigError::Io`] if it cannot be read
    /// - anything [`ConfigLoader::load_str`] returns
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        let limit = self.options.config_limits.max_config_size;
        if metadata.len() > limit {
            return Err(ConfigError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit,
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = raw.len(), "loading lab configuration");
        self.load_str(&raw, path)
    }

    /// Parses and validates configuration text. `path` is only used in
    /// error messages.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EnvVarNotSet`] for an unset `${VAR:?message}`
    /// - [`ConfigError::ParseError`] for empty or malformed YAML
    /// - [`ConfigError::ValidationError`] if validation finds errors
    pub fn load_str(&self, raw: &str, path: &Path) -> Result<LoadResult, ConfigError> {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

        let mut env_sub = EnvSubstitution::new(path);
        let substituted = env_sub.substitute(raw)?;
        let mut warnings = env_sub.warnings;

        if substituted.trim().is_empty() {
            return Err(ConfigError::ParseError {
                path: path.to_path_buf(),
                line: None,
                message: "configuration file is empty".to_string(),
            });
        }

        let config: LabConfig =
            serde_yaml::from_str(&substituted).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        let result = Validator::new().validate(&config, &self.options.config_limits);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: path.display().to_string(),
                errors: result.errors,
            });
        }

        warnings.extend(result.warnings.into_iter().map(|issue| LoadWarning {
            message: issue.message,
            location: Some(issue.path),
        }));

        Ok(LoadResult {
            config: Arc::new(config),
            warnings,
        })
    }
}

// ============================================================================
// Environment Variable Substitution
// ============================================================================

/// Expands `${VAR}`, `${VAR:-default}` and `${VAR:?message}` in raw text.
/// `$$` is a literal `$`.
struct EnvSubstitution {
    source: PathBuf,
    warnings: Vec<LoadWarning>,
}

impl EnvSubstitution {
    fn new(source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            warnings: Vec::new(),
        }
    }

    fn substitute(&mut self, raw: &str) -> Result<String, ConfigError> {
        let mut out = String::with_capacity(raw.len());
        let mut chars = raw.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                out.push(c);
                continue;
            }
            match chars.peek() {
                Some('$') => {
                    chars.next();
                    out.push('$');
                }
                Some('{') => {
                    chars.next();
                    let reference = self.read_reference(&mut chars)?;
                    out.push_str(&self.expand(&reference)?);
                }
                _ => out.push('$'),
            }
        }

        Ok(out)
    }

    fn read_reference(
        &self,
        chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    ) -> Result<String, ConfigError> {
        let mut reference = String::new();
        let mut depth = 1;
        for c in chars.by_ref() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(reference);
                    }
                }
                _ => {}
            }
            reference.push(c);
        }
        Err(ConfigError::ParseError {
            path: self.source.clone(),
            line: None,
            message: format!("unclosed environment variable reference: ${{{reference}"),
        })
    }

    fn expand(&mut self, reference: &str) -> Result<String, ConfigError> {
        let (name, fallback) = match reference.split_once(":-") {
            Some((name, default)) => (name, Fallback::Default(default)),
            None => match reference.split_once(":?") {
                Some((name, message)) => (name, Fallback::Required(message)),
                None => (reference, Fallback::Empty),
            },
        };

        if let Ok(value) = std::env::var(name) {
            return Ok(value);
        }
        match fallback {
            Fallback::Default(default) => Ok(default.to_string()),
            Fallback::Required(message) => Err(ConfigError::EnvVarNotSet {
                var: name.to_string(),
                message: message.to_string(),
            }),
            Fallback::Empty => {
                self.warnings.push(LoadWarning {
                    message: format!("environment variable '{name}' is not set, using empty string"),
                    location: Some(self.source.display().to_string()),
                });
                Ok(String::new())
            }
        }
    }
}

enum Fallback<'a> {
    Default(&'a str),
    Required(&'a str),
    Empty,
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ============================================================================
// Tests
// ============================================================================
