//! Knowledge quiz
//!
//! A fixed, ordered bank of single-answer multiple-choice questions and
//! the engine that records answers and scores them. The quiz lives next
//! to the stage machine rather than inside it: answers can be recorded
//! and scored from any stage.

mod bank;
mod engine;

pub use bank::{QuestionBank, QuizQuestion, builtin_bank};
pub use engine::{Medal, QuestionReview, QuizEngine, QuizState, Score};
