//! Question bank.

use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

/// One multiple-choice question with a single correct option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    /// Stable question id
    pub id: u32,
    /// Question text
    pub question: String,
    /// Answer options in display order
    pub options: Vec<String>,
    /// Index into `options` of the correct answer
    pub correct: usize,
    /// Shown after scoring
    #[serde(default)]
    pub explanation: String,
}

/// Read-only, ordered sequence of questions.
///
/// Cheap to clone; all clones share the same questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Arc<[QuizQuestion]>,
}

impl QuestionBank {
    /// Builds a bank from questions in display order.
    #[must_use]
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        Self {
            questions: questions.into(),
        }
    }

    /// Questions in display order.
    #[must_use]
    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    /// Looks up a question by id.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&QuizQuestion> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Number of questions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Returns `true` if the bank is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

fn question(id: u32, text: &str, options: [&str; 4], correct: usize, explanation: &str) -> QuizQuestion {
    QuizQuestion {
        id,
        question: text.to_string(),
        options: options.iter().map(ToString::to_string).collect(),
        correct,
        explanation: explanation.to_string(),
    }
}

static BUILTIN_BANK: LazyLock<QuestionBank> = LazyLock::new(|| {
    QuestionBank::new(vec![
        question(
            1,
            "What is the optimal GC content for CRISPR guide RNAs?",
            ["20-30%", "40-60%", "70-80%", "90-100%"],
            1,
            "40-60% GC content balances binding stability against off-target effects.",
        ),
        question(
            2,
            "Which nuclease domain in Cas9 cuts the target DNA strand?",
            ["RuvC domain", "HNH domain", "PAM domain", "Bridge helix"],
            1,
            "HNH cuts the strand complementary to the gRNA; RuvC cuts the other one.",
        ),
        question(
            3,
            "What triggers the cellular DNA damage response after CRISPR cutting?",
            ["PAM recognition", "gRNA binding", "Double-strand break", "Protein folding"],
            2,
            "Double-strand breaks activate ATM/ATR kinases, which recruit repair machinery.",
        ),
        question(
            4,
            "Why is the seed region (positions 1-12) most critical for CRISPR specificity?",
            [
                "It binds to PAM",
                "It activates Cas9",
                "Mismatches here prevent cutting",
                "It contains the promoter",
            ],
            2,
            "Single seed-region mismatches can block cutting; distal ones are often tolerated.",
        ),
        question(
            5,
            "What determines whether a cell uses NHEJ or HDR for DNA repair?",
            ["Temperature", "Cell cycle phase", "pH level", "Oxygen concentration"],
            1,
            "HDR needs a sister chromatid, so it is most active in S/G2; NHEJ dominates in G1.",
        ),
    ])
});

/// Returns the built-in five-question bank.
#[must_use]
pub fn builtin_bank() -> QuestionBank {
    BUILTIN_BANK.clone()
}
