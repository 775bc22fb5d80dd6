//! Configuration schema.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::animator::AnimatorConfig;
use crate::catalog::{TraitCatalog, builtin_catalog};
use crate::quiz::{QuestionBank, QuizQuestion, builtin_bank};
use crate::risk::RiskPolicy;

/// Root of a lab configuration file.
///
/// ```yaml
/// simulation:
///   progress_increment: 1.5
///   marker_probability: 0.3
///   seed: 42
/// risk:
///   max_off_target: 20
///   max_mutation_rate: 15
/// traits:
///   golden-rice:
///     name: Golden Rice
///     ...
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabConfig {
    /// Animator tunables
    pub simulation: AnimatorConfig,
    /// Risk gate thresholds
    pub risk: RiskPolicy,
    /// Replacement trait catalog
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traits: Option<TraitCatalog>,
    /// Replacement question bank
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz: Option<Vec<QuizQuestion>>,
}

impl LabConfig {
    /// The configured catalog, or the built-in one.
    #[must_use]
    pub fn catalog(&self) -> Arc<TraitCatalog> {
        Arc::new(self.traits.clone().unwrap_or_else(builtin_catalog))
    }

    /// The configured question bank, or the built-in one.
    #[must_use]
    pub fn question_bank(&self) -> QuestionBank {
        self.quiz
            .as_ref()
            .map_or_else(builtin_bank, |q| QuestionBank::new(q.clone()))
    }
}
