//! Quiz answer recording and scoring.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::QuizError;

use super::bank::QuestionBank;

/// Result of a scored quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Score {
    /// Answers matching the correct option
    pub correct: usize,
    /// Questions in the bank
    pub total: usize,
}

/// Award tier for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Medal {
    /// Every answer correct
    Perfect,
    /// At least 80 %
    Gold,
    /// At least 60 %
    Silver,
    /// Below 60 %
    Study,
}

impl Score {
    /// Percentage of correct answers, rounded to the nearest integer.
    #[must_use]
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let pct = (self.correct * 200 + self.total) / (self.total * 2);
        u32::try_from(pct).unwrap_or(100)
    }

    /// Award tier for this score.
    #[must_use]
    pub const fn medal(&self) -> Medal {
        // integer forms of correct/total >= 0.8 and >= 0.6
        if self.correct == self.total {
            Medal::Perfect
        } else if self.correct * 5 >= self.total * 4 {
            Medal::Gold
        } else if self.correct * 5 >= self.total * 3 {
            Medal::Silver
        } else {
            Medal::Study
        }
    }
}

/// Answers recorded so far and the frozen score, if submitted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct QuizState {
    answers: BTreeMap<u32, usize>,
    score: Option<Score>,
}

impl QuizState {
    /// Chosen answer index for a question, if any.
    #[must_use]
    pub fn answer(&self, question: u32) -> Option<usize> {
        self.answers.get(&question).copied()
    }

    /// All recorded answers keyed by question id.
    #[must_use]
    pub const fn answers(&self) -> &BTreeMap<u32, usize> {
        &self.answers
    }

    /// Number of questions answered.
    #[must_use]
    pub fn answered(&self) -> usize {
        self.answers.len()
    }

    /// Score frozen by the last submission.
    #[must_use]
    pub const fn score(&self) -> Option<Score> {
        self.score
    }
}

/// Per-question feedback after scoring.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionReview {
    /// Question id
    pub id: u32,
    /// Question text
    pub question: String,
    /// The option the user chose
    pub chosen: String,
    /// The correct option
    pub correct: String,
    /// Whether the chosen option was correct
    pub is_correct: bool,
    /// Explanation of the correct answer
    pub explanation: String,
}

/// Records answers against a [`QuestionBank`] and scores them.
#[derive(Debug, Clone)]
pub struct QuizEngine {
    bank: QuestionBank,
    state: QuizState,
}

impl QuizEngine {
    /// Creates an engine with no answers recorded.
    #[must_use]
    pub fn new(bank: QuestionBank) -> Self {
        Self {
            bank,
            state: QuizState::default(),
        }
    }

    /// The question bank.
    #[must_use]
    pub const fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Current quiz state.
    #[must_use]
    pub const fn state(&self) -> &QuizState {
        &self.state
    }

    /// Stores or overwrites the answer to one question.
    ///
    /// # Errors
    ///
    /// - [`QuizError::AlreadySubmitted`] once the quiz has been scored
    /// - [`QuizError::UnknownQuestion`] if the id is not in the bank
    /// - [`QuizError::AnswerOutOfRange`] if the index has no option
    pub fn record_answer(&mut self, question: u32, index: usize) -> Result<&QuizState, QuizError> {
        if self.state.score.is_some() {
            return Err(QuizError::AlreadySubmitted);
        }
        let q = self
            .bank
            .get(question)
            .ok_or(QuizError::UnknownQuestion(question))?;
        if index >= q.options.len() {
            return Err(QuizError::AnswerOutOfRange {
                question,
                index,
                options: q.options.len(),
            });
        }

        let mut next = self.state.clone();
        next.answers.insert(question, index);
        self.state = next;
        debug!(question, index, "quiz answer recorded");
        Ok(&self.state)
    }

    /// Scores the quiz and freezes the result.
    ///
    /// Submitting again returns the frozen score.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::IncompleteQuiz`] unless every question in the
    /// bank has an answer.
    pub fn submit(&mut self) -> Result<Score, QuizError> {
        if let Some(score) = self.state.score {
            return Ok(score);
        }

        let total = self.bank.len();
        let answered = self
            .bank
            .questions()
            .iter()
            .filter(|q| self.state.answers.contains_key(&q.id))
            .count();
        if answered < total {
            return Err(QuizError::IncompleteQuiz { answered, total });
        }

        let correct = self
            .bank
            .questions()
            .iter()
            .filter(|q| self.state.answer(q.id) == Some(q.correct))
            .count();
        let score = Score { correct, total };

        self.state = QuizState {
            score: Some(score),
            ..self.state.clone()
        };
        info!(correct, total, "quiz submitted");
        Ok(score)
    }

    /// Clears answers and score.
    pub fn retake(&mut self) -> &QuizState {
        self.state = QuizState::default();
        debug!("quiz reset for retake");
        &self.state
    }

    /// Per-question feedback, available once the quiz has been scored.
    #[must_use]
    pub fn review(&self) -> Option<Vec<QuestionReview>> {
        self.state.score?;
        Some(
            self.bank
                .questions()
                .iter()
                .map(|q| {
                    let chosen = self.state.answer(q.id);
                    QuestionReview {
                        id: q.id,
                        question: q.question.clone(),
                        chosen: chosen
                            .and_then(|i| q.options.get(i))
                            .cloned()
                            .unwrap_or_default(),
                        correct: q.options.get(q.correct).cloned().unwrap_or_default(),
                        is_correct: chosen == Some(q.correct),
                        explanation: q.explanation.clone(),
                    }
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::builtin_bank;

    const CORRECT: [(u32, usize); 5] = [(1, 1), (2, 1), (3, 2), (4, 2), (5, 1)];

    fn answered(answers: &[(u32, usize)]) -> QuizEngine {
        let mut engine = QuizEngine::new(builtin_bank());
        for &(q, a) in answers {
            engine.record_answer(q, a).unwrap();
        }
        engine
    }

    #[test]
    fn all_correct_scores_five() {
        let mut engine = answered(&CORRECT);
        assert_eq!(engine.submit(), Ok(Score { correct: 5, total: 5 }));
    }

    #[test]
    fn one_wrong_scores_four() {
        let mut answers = CORRECT;
        answers[2] = (3, 0);
        let mut engine = answered(&answers);
        assert_eq!(engine.submit(), Ok(Score { correct: 4, total: 5 }));
    }

    #[test]
    fn four_of_five_is_incomplete() {
        let mut engine = answered(&CORRECT[..4]);
        assert_eq!(
            engine.submit(),
            Err(QuizError::IncompleteQuiz {
                answered: 4,
                total: 5
            })
        );
        assert!(engine.state().score().is_none());
    }

    #[test]
    fn overwrite_answer() {
        let mut engine = answered(&[(1, 0)]);
        engine.record_answer(1, 1).unwrap();
        assert_eq!(engine.state().answer(1), Some(1));
        assert_eq!(engine.state().answered(), 1);
    }

    #[test]
    fn unknown_question_rejected() {
        let mut engine = QuizEngine::new(builtin_bank());
        assert_eq!(
            engine.record_answer(42, 0).unwrap_err(),
            QuizError::UnknownQuestion(42)
        );
    }

    #[test]
    fn out_of_range_answer_rejected() {
        let mut engine = QuizEngine::new(builtin_bank());
        assert_eq!(
            engine.record_answer(1, 4).unwrap_err(),
            QuizError::AnswerOutOfRange {
                question: 1,
                index: 4,
                options: 4
            }
        );
    }

    #[test]
    fn score_is_frozen() {
        let mut engine = answered(&CORRECT);
        let first = engine.submit().unwrap();
        assert_eq!(
            engine.record_answer(1, 0).unwrap_err(),
            QuizError::AlreadySubmitted
        );
        assert_eq!(engine.submit().unwrap(), first);
    }

    #[test]
    fn retake_clears_everything() {
        let mut engine = answered(&CORRECT);
        engine.submit().unwrap();
        let state = engine.retake();
        assert_eq!(state, &QuizState::default());
        assert!(engine.record_answer(1, 0).is_ok());
    }

    #[test]
    fn review_after_submit() {
        let mut answers = CORRECT;
        answers[0] = (1, 0);
        let mut engine = answered(&answers);
        assert!(engine.review().is_none());
        engine.submit().unwrap();
        let review = engine.review().unwrap();
        assert_eq!(review.len(), 5);
        assert!(!review[0].is_correct);
        assert_eq!(review[0].chosen, "20-30%");
        assert_eq!(review[0].correct, "40-60%");
        assert!(review[1].is_correct);
    }

    #[test]
    fn medals() {
        let s = |correct| Score { correct, total: 5 };
        assert_eq!(s(5).medal(), Medal::Perfect);
        assert_eq!(s(4).medal(), Medal::Gold);
        assert_eq!(s(3).medal(), Medal::Silver);
        assert_eq!(s(2).medal(), Medal::Study);
    }

    #[test]
    fn percent_rounds() {
        assert_eq!(Score { correct: 4, total: 5 }.percent(), 80);
        assert_eq!(Score { correct: 2, total: 3 }.percent(), 67);
        assert_eq!(Score { correct: 1, total: 3 }.percent(), 33);
        assert_eq!(Score { correct: 0, total: 0 }.percent(), 0);
    }
}
