//! `quiz`: print the question bank or score answers.

use serde::Serialize;

use crate::cli::args::{OutputFormat, QuizArgs};
use crate::cli::commands::load_config;
use crate::error::LabError;
use crate::quiz::{Medal, QuestionBank, QuestionReview, QuizEngine, Score};

#[derive(Debug, Serialize)]
struct ScoreView {
    #[serde(flatten)]
    score: Score,
    percent: u32,
    medal: Medal,
    review: Vec<QuestionReview>,
}

/// Prints the questions, or scores `--answers` against them.
///
/// # Errors
///
/// - [`LabError::Config`] if the configuration cannot be loaded
/// - [`LabError::Quiz`] if an answer is out of range or some are missing
/// - [`LabError::Json`] if JSON rendering fails
pub fn run(args: &QuizArgs) -> Result<(), LabError> {
    let config = load_config(args.config.as_deref())?;
    let bank = config.question_bank();

    let Some(answers) = &args.answers else {
        match args.format {
            OutputFormat::Human => print_questions(&bank),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(bank.questions())?),
        }
        return Ok(());
    };

    let view = score(bank, answers)?;
    match args.format {
        OutputFormat::Human => print_score(&view),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
    }
    Ok(())
}

/// Records `answers` in question order and submits.
fn score(bank: QuestionBank, answers: &[usize]) -> Result<ScoreView, LabError> {
    let ids: Vec<u32> = bank.questions().iter().map(|q| q.id).collect();
    let mut engine = QuizEngine::new(bank);
    for (id, &answer) in ids.iter().zip(answers) {
        engine.record_answer(*id, answer)?;
    }
    if answers.len() > ids.len() {
        tracing::warn!(
            given = answers.len(),
            questions = ids.len(),
            "ignoring answers beyond the last question"
        );
    }

    let score = engine.submit()?;
    Ok(ScoreView {
        score,
        percent: score.percent(),
        medal: score.medal(),
        review: engine.review().unwrap_or_default(),
    })
}

fn print_questions(bank: &QuestionBank) {
    for q in bank.questions() {
        println!("{}. {}", q.id, q.question);
        for (i, option) in q.options.iter().enumerate() {
            println!("   [{i}] {option}");
        }
        println!();
    }
}

fn print_score(view: &ScoreView) {
    for r in &view.review {
        let mark = if r.is_correct { "✓" } else { "✗" };
        println!("{mark} {}. {}", r.id, r.question);
        if !r.is_correct {
            println!("    your answer: {}", r.chosen);
            println!("    correct:     {}", r.correct);
        }
        if !r.explanation.is_empty() {
            println!("    {}", r.explanation);
        }
    }
    let medal = match view.medal {
        Medal::Perfect => "perfect score",
        Medal::Gold => "gold",
        Medal::Silver => "silver",
        Medal::Study => "keep studying",
    };
    println!(
        "\nScore: {}/{} ({}%) - {medal}",
        view.score.correct, view.score.total, view.percent
    );
}
