//! Graded result of a completed edit.

use serde::Serialize;

use crate::catalog::{Metrics, Trait};

/// Success-rate threshold above which an edit counts as fully successful.
pub const SUCCESS_THRESHOLD: u8 = 80;

/// Success-rate threshold above which confidence is at least medium.
pub const MEDIUM_CONFIDENCE_THRESHOLD: u8 = 60;

/// Overall grade of the edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditGrade {
    /// Predicted success above 80 %.
    Successful,
    /// Anything lower.
    PartialSuccess,
}

impl EditGrade {
    /// Grade for a predicted success rate.
    #[must_use]
    pub const fn for_success_rate(success_rate: u8) -> Self {
        if success_rate > SUCCESS_THRESHOLD {
            Self::Successful
        } else {
            Self::PartialSuccess
        }
    }

    /// Headline shown with the result.
    #[must_use]
    pub const fn headline(self) -> &'static str {
        match self {
            Self::Successful => "Edit Successful!",
            Self::PartialSuccess => "Partial Success",
        }
    }
}

/// Confidence in the predicted outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Success rate above 80 %
    High,
    /// Success rate above 60 %
    Medium,
    /// Anything lower
    Low,
}

impl Confidence {
    /// Confidence for a predicted success rate.
    #[must_use]
    pub const fn for_success_rate(success_rate: u8) -> Self {
        if success_rate > SUCCESS_THRESHOLD {
            Self::High
        } else if success_rate > MEDIUM_CONFIDENCE_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Everything the Result stage presents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditReport {
    /// Edited trait id
    pub trait_id: String,
    /// Edited trait name
    pub trait_name: String,
    /// Host organism
    pub organism: String,
    /// Overall grade
    pub grade: EditGrade,
    /// Confidence in the prediction
    pub confidence: Confidence,
    /// Metrics the edit ran with
    pub metrics: Metrics,
    /// Expected phenotype
    pub phenotype: String,
    /// Before/after functional change
    pub function_change: String,
    /// Sequence before the edit
    pub dna_original: String,
    /// Sequence after the edit
    pub dna_edited: String,
    /// Label of the inserted construct
    pub insertion: Option<String>,
    /// Whether the edit went ahead over a risk prompt
    pub risk_acknowledged: bool,
}

impl EditReport {
    /// Builds the report for `edited`.
    #[must_use]
    pub fn new(trait_id: &str, edited: &Trait, risk_acknowledged: bool) -> Self {
        let success_rate = edited.metrics.success_rate;
        Self {
            trait_id: trait_id.to_string(),
            trait_name: edited.name.clone(),
            organism: edited.organism.clone(),
            grade: EditGrade::for_success_rate(success_rate),
            confidence: Confidence::for_success_rate(success_rate),
            metrics: edited.metrics,
            phenotype: edited.phenotype.clone(),
            function_change: edited.function_change.clone(),
            dna_original: edited.dna_original.clone(),
            dna_edited: edited.dna_edited.clone(),
            insertion: edited.insertion_label().map(str::to_string),
            risk_acknowledged,
        }
    }
}
