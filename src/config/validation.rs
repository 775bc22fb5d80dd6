//! Configuration validation
//!
//! Runs on the deserialized [`LabConfig`] and collects every issue rather
//! than stopping at the first one.

use std::collections::HashSet;

use crate::catalog::{Trait, TraitCatalog};
use crate::config::loader::ConfigLimits;
use crate::config::schema::LabConfig;
use crate::error::{Severity, ValidationIssue};
use crate::quiz::QuizQuestion;

// ============================================================================
// Public API
// ============================================================================

/// Outcome of validating a configuration.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Issues that prevent the configuration from being used.
    pub errors: Vec<ValidationIssue>,
    /// Issues worth reporting that do not block loading.
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if there are no errors.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `config` against `limits`.
    pub fn validate(&mut self, config: &LabConfig, limits: &ConfigLimits) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_simulation(config);
        self.validate_risk(config);
        if let Some(traits) = &config.traits {
            self.validate_traits(traits, limits);
        }
        if let Some(questions) = &config.quiz {
            self.validate_quiz(questions, limits);
        }

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Sections
    // ========================================================================

    fn validate_simulation(&mut self, config: &LabConfig) {
        let sim = &config.simulation;
        if !sim.progress_increment.is_finite()
            || sim.progress_increment <= 0.0
            || sim.progress_increment > 100.0
        {
            self.add_error(
                "simulation.progress_increment",
                format!(
                    "progress increment must be in (0, 100], got {}",
                    sim.progress_increment
                ),
            );
        }
        if !(0.0..=1.0).contains(&sim.marker_probability) {
            self.add_error(
                "simulation.marker_probability",
                format!(
                    "marker probability must be in [0, 1], got {}",
                    sim.marker_probability
                ),
            );
        }
        if sim.tick_interval_ms == 0 {
            self.add_error("simulation.tick_interval_ms", "tick interval must be positive");
        }
        if sim.marker_ttl_ms == 0 {
            self.add_warning(
                "simulation.marker_ttl_ms",
                "markers with a zero lifetime expire on the next clock update",
            );
        }
    }

    fn validate_risk(&mut self, config: &LabConfig) {
        if config.risk.max_off_target >= 100 {
            self.add_warning(
                "risk.max_off_target",
                "off-target threshold of 100 or more never triggers the risk prompt",
            );
        }
        if config.risk.max_mutation_rate >= 100 {
            self.add_warning(
                "risk.max_mutation_rate",
                "mutation rate threshold of 100 or more never triggers the risk prompt",
            );
        }
    }

    fn validate_traits(&mut self, traits: &TraitCatalog, limits: &ConfigLimits) {
        if traits.is_empty() {
            self.add_error("traits", "trait catalog must not be empty when given");
            return;
        }
        if traits.len() > limits.max_traits {
            self.add_error(
                "traits",
                format!(
                    "catalog has {} traits (limit: {})",
                    traits.len(),
                    limits.max_traits
                ),
            );
        }
        for (id, entry) in traits.iter() {
            self.validate_trait(id, entry);
        }
    }

    fn validate_trait(&mut self, id: &str, entry: &Trait) {
        let base = format!("traits.{id}");
        if id.is_empty() || id.chars().any(char::is_whitespace) {
            self.add_error(&base, "trait id must be non-empty and contain no whitespace");
        }
        if entry.name.trim().is_empty() {
            self.add_error(format!("{base}.name"), "trait name is required");
        }
        if entry.description.trim().is_empty() {
            self.add_warning(format!("{base}.description"), "trait has no description");
        }

        for (field, value) in [
            ("success_rate", entry.metrics.success_rate),
            ("off_target_risk", entry.metrics.off_target_risk),
            ("mutation_rate", entry.metrics.mutation_rate),
        ] {
            if value > 100 {
                self.add_error(
                    format!("{base}.{field}"),
                    format!("percentage must be at most 100, got {value}"),
                );
            }
        }

        if let Some(bad) = first_non_base(&entry.dna_original) {
            self.add_error(
                format!("{base}.dna_original"),
                format!("unexpected character '{bad}' in sequence"),
            );
        }
        let outside_marker = strip_insertion(&entry.dna_edited);
        if let Some(bad) = first_non_base(&outside_marker) {
            self.add_error(
                format!("{base}.dna_edited"),
                format!("unexpected character '{bad}' outside the insertion marker"),
            );
        }
        if entry.insertion_label().is_none() {
            self.add_warning(
                format!("{base}.dna_edited"),
                "edited sequence has no [LABEL] insertion marker",
            );
        }
    }

    fn validate_quiz(&mut self, questions: &[QuizQuestion], limits: &ConfigLimits) {
        if questions.is_empty() {
            self.add_error("quiz", "question bank must not be empty when given");
            return;
        }
        if questions.len() > limits.max_questions {
            self.add_error(
                "quiz",
                format!(
                    "bank has {} questions (limit: {})",
                    questions.len(),
                    limits.max_questions
                ),
            );
        }

        let mut seen = HashSet::new();
        for (i, q) in questions.iter().enumerate() {
            let base = format!("quiz[{i}]");
            if !seen.insert(q.id) {
                self.add_error(format!("{base}.id"), format!("duplicate question id {}", q.id));
            }
            if q.question.trim().is_empty() {
                self.add_error(format!("{base}.question"), "question text is required");
            }
            if q.options.len() < 2 {
                self.add_error(
                    format!("{base}.options"),
                    "a question needs at least two options",
                );
            }
            if q.correct >= q.options.len() {
                self.add_error(
                    format!("{base}.correct"),
                    format!(
                        "correct index {} is out of range for {} options",
                        q.correct,
                        q.options.len()
                    ),
                );
            }
            if q.explanation.trim().is_empty() {
                self.add_warning(format!("{base}.explanation"), "question has no explanation");
            }
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn add_error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
            severity: Severity::Warning,
        });
    }
}

fn first_non_base(sequence: &str) -> Option<char> {
    sequence
        .chars()
        .find(|c| !matches!(c.to_ascii_uppercase(), 'A' | 'C' | 'G' | 'T'))
}

/// Removes every `[...]` segment from a sequence.
fn strip_insertion(sequence: &str) -> String {
    let mut out = String::with_capacity(sequence.len());
    let mut depth = 0usize;
    for c in sequence.chars() {
        match c {
            '[' => depth += 1,
            ']' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}
