//! Mechanism explainer steps and animation phase labels.

use std::fmt;

use serde::Serialize;

/// One page of the multi-step mechanism explainer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MechanismStep {
    /// Short title
    pub title: &'static str,
    /// What happens at this step
    pub description: &'static str,
    /// What the prediction model contributes
    pub ai_role: &'static str,
    /// Typical duration in the cell
    pub timeline: &'static str,
}

/// The explainer pages in viewing order.
pub const MECHANISM_STEPS: [MechanismStep; 8] = [
    MechanismStep {
        title: "CRISPR RNA Maturation",
        description: "The CRISPR array is transcribed and cut by Cas6 into individual crRNAs",
        ai_role: "Predicts optimal crRNA sequences and secondary structure stability",
        timeline: "~2-5 minutes in bacterial cells",
    },
    MechanismStep {
        title: "Synthetic gRNA Engineering",
        description: "A chimeric guide RNA combines crRNA and tracrRNA functions",
        ai_role: "Scores the 20-nt spacer for specificity, GC content and seed strength",
        timeline: "Design: seconds; synthesis: 24-48 hours",
    },
    MechanismStep {
        title: "Cas9-gRNA Complex Formation",
        description: "Guide RNA binding switches Cas9 into its active conformation",
        ai_role: "Structural modeling predicts binding affinity and complex stability",
        timeline: "~10-30 seconds",
    },
    MechanismStep {
        title: "Genomic Scanning and PAM Validation",
        description: "The complex scans chromatin for 5'-NGG-3' PAM sequences",
        ai_role: "Maps candidate PAM sites genome-wide and scores their accessibility",
        timeline: "~1 second for prokaryotic genomes",
    },
    MechanismStep {
        title: "DNA Unwinding and Sequence Validation",
        description: "PAM recognition unwinds DNA; seed-region mismatches prevent cutting",
        ai_role: "Thermodynamic modeling predicts R-loop stability and mismatch tolerance",
        timeline: "~0.1-1 second",
    },
    MechanismStep {
        title: "Coordinated Nuclease Activity",
        description: "HNH cuts the target strand and RuvC the non-target strand",
        ai_role: "Kinetic modeling predicts cutting efficiency and timing",
        timeline: "~1-10 seconds",
    },
    MechanismStep {
        title: "Cellular Repair Pathway Activation",
        description: "The break triggers ATM/ATR kinases and recruits repair factors",
        ai_role: "Predicts NHEJ versus HDR choice from cell cycle and chromatin context",
        timeline: "~30 seconds to detect; minutes to assemble",
    },
    MechanismStep {
        title: "NHEJ vs HDR Pathway Resolution",
        description: "NHEJ ligates ends with indels; HDR integrates a donor template",
        ai_role: "Predicts repair outcomes and integration efficiency",
        timeline: "NHEJ: ~2-10 minutes; HDR: ~2-6 hours",
    },
];

/// Discrete sub-state of the edit animation, derived from progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum AnimationPhase {
    /// Cas9-gRNA complex approaches DNA
    Targeting,
    /// Scanning for the NGG sequence
    PamRecognition,
    /// R-loop formation begins
    Unwinding,
    /// gRNA hybridizes with the target
    Binding,
    /// Nuclease domains activate
    Cutting,
    /// Cellular repair machinery
    Repair,
}

impl AnimationPhase {
    /// Number of phases.
    pub const COUNT: u8 = 6;

    /// Returns the phase at `index`, saturating at [`AnimationPhase::Repair`].
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        match index {
            0 => Self::Targeting,
            1 => Self::PamRecognition,
            2 => Self::Unwinding,
            3 => Self::Binding,
            4 => Self::Cutting,
            _ => Self::Repair,
        }
    }

    /// Zero-based index of the phase.
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Targeting => "Targeting",
            Self::PamRecognition => "PAM Recognition",
            Self::Unwinding => "DNA Unwinding",
            Self::Binding => "Binding",
            Self::Cutting => "Cutting",
            Self::Repair => "Repair",
        }
    }

    /// What the animation shows during this phase.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Targeting => "Cas9-gRNA complex approaches DNA",
            Self::PamRecognition => "Scanning for NGG sequence",
            Self::Unwinding => "R-loop formation begins",
            Self::Binding => "gRNA hybridizes with target",
            Self::Cutting => "Nuclease domains activate",
            Self::Repair => "Cellular repair machinery",
        }
    }
}

impl fmt::Display for AnimationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_index_round_trips() {
        for i in 0..AnimationPhase::COUNT {
            assert_eq!(AnimationPhase::from_index(i).index(), i);
        }
    }

    #[test]
    fn phase_index_saturates() {
        assert_eq!(AnimationPhase::from_index(6), AnimationPhase::Repair);
        assert_eq!(AnimationPhase::from_index(u8::MAX), AnimationPhase::Repair);
    }

    #[test]
    fn phase_labels() {
        assert_eq!(AnimationPhase::PamRecognition.to_string(), "PAM Recognition");
        assert_eq!(
            AnimationPhase::Cutting.description(),
            "Nuclease domains activate"
        );
    }

    #[test]
    fn eight_explainer_steps() {
        assert_eq!(MECHANISM_STEPS.len(), 8);
        assert!(MECHANISM_STEPS.iter().all(|s| !s.title.is_empty()));
    }
}
