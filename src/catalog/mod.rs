//! Trait catalog
//!
//! Read-only table of gene-edit scenarios keyed by id. The catalog is
//! either the built-in set compiled into the binary or one loaded from a
//! lab configuration file; either way it is frozen before a session
//! starts and never mutated by the controller.

mod builtin;
pub mod mechanism;

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use builtin::builtin_catalog;
pub use mechanism::{AnimationPhase, MECHANISM_STEPS, MechanismStep};

// ============================================================================
// Types
// ============================================================================

/// How hard an edit is to carry out in the lab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Single-site edit in a tractable organism.
    Easy,
    /// Single insertion with a well-characterised target.
    Medium,
    /// Pathway-level change with known side effects.
    Hard,
    /// Multi-gene cluster insertion.
    Expert,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::Expert => "Expert",
        };
        f.pad(label)
    }
}

/// Predicted metrics for one edit, each a percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metrics {
    /// Predicted likelihood that the edit takes.
    pub success_rate: u8,
    /// Predicted likelihood of cutting an unintended site.
    pub off_target_risk: u8,
    /// Predicted rate of unintended mutations at the cut site.
    pub mutation_rate: u8,
}

/// One catalog entry describing a simulated gene-edit scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trait {
    /// Display name
    pub name: String,
    /// Host organism
    pub organism: String,
    /// One-line summary of the edit
    pub description: String,
    /// Gene or construct being targeted
    pub target_gene: String,
    /// Molecular mechanism of the change
    pub mechanism: String,
    /// Lab difficulty
    pub difficulty: Difficulty,
    /// Predicted success and risk figures
    #[serde(flatten)]
    pub metrics: Metrics,
    /// Expected phenotype after the edit
    pub phenotype: String,
    /// Benefits, in display order
    #[serde(default)]
    pub benefits: Vec<String>,
    /// Risks, in display order
    #[serde(default)]
    pub risks: Vec<String>,
    /// Sequence before the edit
    pub dna_original: String,
    /// Sequence after the edit, with a `[LABEL]` insertion marker
    pub dna_edited: String,
    /// Before/after summary of the functional change
    pub function_change: String,
}

impl Trait {
    /// Returns the label inside the `[...]` insertion marker of the edited
    /// sequence, if there is one.
    #[must_use]
    pub fn insertion_label(&self) -> Option<&str> {
        let start = self.dna_edited.find('[')?;
        let end = self.dna_edited[start..].find(']')? + start;
        let label = &self.dna_edited[start + 1..end];
        (!label.is_empty()).then_some(label)
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Ordered, read-only mapping from trait id to [`Trait`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraitCatalog {
    traits: IndexMap<String, Trait>,
}

impl TraitCatalog {
    /// Builds a catalog from `(id, trait)` pairs, keeping their order.
    ///
    /// Later duplicates replace earlier entries in place.
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = (String, Trait)>) -> Self {
        Self {
            traits: entries.into_iter().collect(),
        }
    }

    /// Looks up a trait by exact id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Trait> {
        self.traits.get(id)
    }

    /// Returns `true` if the id is in the catalog.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.traits.contains_key(id)
    }

    /// Iterates entries in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Trait)> {
        self.traits.iter().map(|(id, t)| (id.as_str(), t))
    }

    /// Returns all ids in catalog order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.traits.keys().map(String::as_str).collect()
    }

    /// Number of traits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.traits.len()
    }

    /// Returns `true` if the catalog has no traits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    /// Suggests the closest id for typo correction.
    ///
    /// Returns the closest match if its Damerau-Levenshtein distance is ≤ 3.
    #[must_use]
    pub fn suggest(&self, input: &str) -> Option<String> {
        self.traits
            .keys()
            .map(|id| (id, strsim::damerau_levenshtein(input, id)))
            .filter(|(_, dist)| *dist <= 3)
            .min_by_key(|(_, dist)| *dist)
            .map(|(id, _)| id.clone())
    }
}

// ============================================================================
// Tests
// ============================================================================
