//! Error types for `crispr-lab`
//!
//! Every error the core can raise is local and recoverable. The CLI maps
//! the top-level [`LabError`] onto process exit codes.

use std::path::PathBuf;
use thiserror::Error;

use crate::session::Stage;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `crispr-lab` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Session error (unknown trait, invalid stage transition)
    pub const SESSION_ERROR: i32 = 5;

    /// Quiz error (incomplete submission, bad answer index)
    pub const QUIZ_ERROR: i32 = 6;

    /// The edit was abandoned at the risk prompt
    pub const EDIT_ABORTED: i32 = 7;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `crispr-lab` operations.
///
/// Aggregates the domain errors and maps each one to an exit code.
#[derive(Debug, Error)]
pub enum LabError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Stage controller error
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Quiz engine error
    #[error(transparent)]
    Quiz(#[from] QuizError),

    /// The user declined to proceed past the risk prompt
    #[error("edit aborted at risk prompt for '{trait_id}'")]
    EditAborted {
        /// Trait whose edit was abandoned
        trait_id: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LabError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => ExitCode::CONFIG_ERROR,
            Self::Session(_) => ExitCode::SESSION_ERROR,
            Self::Quiz(_) => ExitCode::QUIZ_ERROR,
            Self::EditAborted { .. } => ExitCode::EDIT_ABORTED,
            Self::Io(_) => ExitCode::IO_ERROR,
            Self::Json(_) => ExitCode::ERROR,
        }
    }
}

// ============================================================================
// Session Errors
// ============================================================================

/// Stage controller errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The requested trait id is not in the catalog
    #[error("unknown trait '{id}'{}", suggestion.as_ref().map_or_else(String::new, |s| format!(" (did you mean '{s}'?)")))]
    UnknownTrait {
        /// The id that was requested
        id: String,
        /// Closest catalog id, if one is near enough
        suggestion: Option<String>,
    },

    /// A stage-specific action was invoked outside its valid stage
    #[error("cannot {action} while in the {stage} stage")]
    InvalidTransition {
        /// Name of the rejected action (e.g. `"request_edit"`)
        action: &'static str,
        /// Stage the session was in
        stage: Stage,
    },
}

// ============================================================================
// Quiz Errors
// ============================================================================

/// Quiz engine errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// Submission attempted before every question was answered
    #[error("quiz incomplete: {answered} of {total} questions answered")]
    IncompleteQuiz {
        /// Number of questions with a recorded answer
        answered: usize,
        /// Number of questions in the bank
        total: usize,
    },

    /// No question with this id exists in the bank
    #[error("unknown question id {0}")]
    UnknownQuestion(u32),

    /// Answer index is past the end of the question's options
    #[error("answer {index} out of range for question {question} ({options} options)")]
    AnswerOutOfRange {
        /// Question id
        question: u32,
        /// Rejected answer index
        index: usize,
        /// Number of options the question offers
        options: usize,
    },

    /// Answers are frozen once the quiz has been scored
    #[error("quiz already submitted; retake it to change answers")]
    AlreadySubmitted,
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}: {}", errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    ValidationError {
        /// Path to the configuration file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Configuration file exceeds the size limit
    #[error("{path} is {size} bytes (limit: {limit})")]
    TooLarge {
        /// Path to the configuration file
        path: PathBuf,
        /// Actual size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },

    /// A required environment variable is unset
    #[error("environment variable {var} is not set: {message}")]
    EnvVarNotSet {
        /// Variable name
        var: String,
        /// Message from the `${VAR:?message}` reference
        message: String,
    },

    /// I/O error while reading the configuration
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path being read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., `"traits.rice.success_rate"`)
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Prevents the configuration from being used
    Error,
    /// Reported, but the configuration still loads
    Warning,
}

/// Result type alias for `crispr-lab` operations.
pub type Result<T> = std::result::Result<T, LabError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitCode::SUCCESS, 0);
        assert_eq!(ExitCode::ERROR, 1);
        assert_eq!(ExitCode::CONFIG_ERROR, 2);
        assert_eq!(ExitCode::IO_ERROR, 3);
        assert_eq!(ExitCode::SESSION_ERROR, 5);
        assert_eq!(ExitCode::QUIZ_ERROR, 6);
        assert_eq!(ExitCode::EDIT_ABORTED, 7);
        assert_eq!(ExitCode::INTERRUPTED, 130);
        assert_eq!(ExitCode::TERMINATED, 143);
    }

    #[test]
    fn test_every_variant_maps_to_its_own_exit_code() {
        let errors: Vec<LabError> = vec![
            ConfigError::MissingFile {
                path: PathBuf::from("/lab.yaml"),
            }
            .into(),
            SessionError::InvalidTransition {
                action: "tick",
                stage: Stage::Select,
            }
            .into(),
            QuizError::AlreadySubmitted.into(),
            LabError::EditAborted {
                trait_id: "drought-tolerance".to_string(),
            },
            std::io::Error::other("disk full").into(),
            serde_json::from_str::<u8>("nope").unwrap_err().into(),
        ];
        let codes: Vec<i32> = errors.iter().map(LabError::exit_code).collect();
        assert_eq!(
            codes,
            vec![
                ExitCode::CONFIG_ERROR,
                ExitCode::SESSION_ERROR,
                ExitCode::QUIZ_ERROR,
                ExitCode::EDIT_ABORTED,
                ExitCode::IO_ERROR,
                ExitCode::ERROR,
            ]
        );
    }

    #[test]
    fn test_session_error_exit_code() {
        let err: LabError = SessionError::InvalidTransition {
            action: "request_edit",
            stage: Stage::Select,
        }
        .into();
        assert_eq!(err.exit_code(), ExitCode::SESSION_ERROR);
    }

    #[test]
    fn test_quiz_error_exit_code() {
        let err: LabError = QuizError::IncompleteQuiz {
            answered: 4,
            total: 5,
        }
        .into();
        assert_eq!(err.exit_code(), ExitCode::QUIZ_ERROR);
    }

    #[test]
    fn test_config_error_exit_code() {
        let err: LabError = ConfigError::MissingFile {
            path: PathBuf::from("/test"),
        }
        .into();
        assert_eq!(err.exit_code(), ExitCode::CONFIG_ERROR);
    }

    #[test]
    fn test_unknown_trait_display_with_suggestion() {
        let err = SessionError::UnknownTrait {
            id: "drought-tolerence".to_string(),
            suggestion: Some("drought-tolerance".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "unknown trait 'drought-tolerence' (did you mean 'drought-tolerance'?)"
        );
    }

    #[test]
    fn test_unknown_trait_display_without_suggestion() {
        let err = SessionError::UnknownTrait {
            id: "zzz".to_string(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "unknown trait 'zzz'");
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = SessionError::InvalidTransition {
            action: "request_edit",
            stage: Stage::Select,
        };
        assert_eq!(err.to_string(), "cannot request_edit while in the select stage");
    }

    #[test]
    fn test_validation_issue_display() {
        let issue = ValidationIssue {
            path: "traits.rice.success_rate".to_string(),
            message: "must be within 0..=100".to_string(),
            severity: Severity::Error,
        };
        assert_eq!(
            issue.to_string(),
            "error: must be within 0..=100 at traits.rice.success_rate"
        );
    }

    #[test]
    fn test_incomplete_quiz_display() {
        let err = QuizError::IncompleteQuiz {
            answered: 4,
            total: 5,
        };
        assert!(err.to_string().contains("4 of 5"));
    }
}
