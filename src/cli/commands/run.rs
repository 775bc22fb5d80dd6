//! `run`: a scripted edit session.
//!
//! Selects a trait, optionally pages through the mechanism explainer,
//! answers the risk prompt as instructed, then hosts the edit on the
//! scheduler and prints the graded result.

use std::sync::{Arc, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::catalog::Trait;
use crate::cli::args::{OutputFormat, RiskChoice, RunArgs};
use crate::cli::commands::load_config;
use crate::error::LabError;
use crate::observability::EventEmitter;
use crate::risk::RiskPrompt;
use crate::scheduler::{EditScheduler, RunEnd, ScheduleOptions, SchedulerUpdate, share};
use crate::session::{Confidence, EditReport, EditRequest, SessionSnapshot, StageController};

#[derive(Serialize)]
struct RunSummary {
    session: SessionSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    risk_prompt: Option<RiskPrompt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<EditReport>,
    markers_emitted: u64,
    cancelled: bool,
}

/// Runs one scripted session.
///
/// # Errors
///
/// - [`LabError::Config`] if the configuration cannot be loaded
/// - [`LabError::Session`] for an unknown trait
/// - [`LabError::EditAborted`] if the risk gate fires with `--on-risk abort`
/// - [`LabError::Io`] if the events file cannot be created
pub async fn run(args: &RunArgs, cancel: CancellationToken) -> Result<(), LabError> {
    let config = load_config(args.config.as_deref())?;
    let mut animator = config.simulation;
    if let Some(seed) = args.seed {
        animator.seed = seed;
    }
    if let Some(ms) = args.tick_ms {
        animator.tick_interval_ms = ms;
    }

    let mut controller =
        StageController::new(config.catalog(), config.question_bank(), config.risk, animator);
    if let Some(path) = &args.events {
        controller = controller.with_events(Arc::new(EventEmitter::from_file(path)?));
    }
    let human = args.format == OutputFormat::Human;

    controller.select_trait(&args.trait_id)?;
    if human && let Some(selected) = controller.selected_trait() {
        print_analysis(&args.trait_id, selected);
    }

    if args.mechanism {
        controller.request_mechanism_view()?;
        loop {
            if human && let Some(step) = controller.current_mechanism_step() {
                let page = controller.session().mechanism_step() + 1;
                println!("\n[{page}] {} ({})", step.title, step.timeline);
                println!("    {}", step.description);
                println!("    AI: {}", step.ai_role);
            }
            let before = controller.session().mechanism_step();
            if controller.next_mechanism_step()?.mechanism_step() == before {
                break;
            }
        }
    }

    let mut risk_prompt = None;
    if let EditRequest::Blocked(prompt) = controller.request_edit()? {
        risk_prompt = Some(prompt);
        if human {
            print_risk(&prompt, args.on_risk);
        }
        match args.on_risk {
            RiskChoice::Proceed => {
                controller.confirm_proceed()?;
            }
            RiskChoice::Redesign => {
                controller.confirm_redesign()?;
                return finish(args.format, &controller, risk_prompt, false);
            }
            RiskChoice::Abort => {
                return Err(LabError::EditAborted {
                    trait_id: args.trait_id.clone(),
                });
            }
        }
    }

    let cadence = Duration::from_millis(animator.tick_interval_ms);
    let shared = share(controller);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = EditScheduler::new(Arc::clone(&shared), cancel)
        .with_updates(tx)
        .spawn(ScheduleOptions {
            cadence,
            fast: args.fast,
        });

    if human {
        println!("\nEditing...");
    }
    while let Some(update) = rx.recv().await {
        if human {
            print_update(&update);
        }
    }

    let end = handle
        .await
        .map_err(|e| LabError::Io(std::io::Error::other(e.to_string())))?;
    tracing::debug!(?end, "scheduler finished");

    let controller = shared.lock().unwrap_or_else(PoisonError::into_inner);
    finish(
        args.format,
        &controller,
        risk_prompt,
        matches!(end, RunEnd::Cancelled(_)),
    )
}

fn finish(
    format: OutputFormat,
    controller: &StageController,
    risk_prompt: Option<RiskPrompt>,
    cancelled: bool,
) -> Result<(), LabError> {
    let summary = RunSummary {
        session: controller.session().snapshot(),
        risk_prompt,
        outcome: controller.outcome(),
        markers_emitted: controller.session().animation().map_or(0, |a| a.emitted()),
        cancelled,
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Human => print_summary(&summary),
    }
    Ok(())
}

// ============================================================================
// Human output
// ============================================================================

fn print_analysis(id: &str, selected: &Trait) {
    let m = selected.metrics;
    println!("{} ({id}) in {}", selected.name, selected.organism);
    println!("  {}", selected.description);
    println!(
        "  predicted: success {}% | off-target {}% | mutation {}%",
        m.success_rate, m.off_target_risk, m.mutation_rate
    );
}

fn print_risk(prompt: &RiskPrompt, choice: RiskChoice) {
    println!("\nRisk check: this edit exceeds the safety thresholds");
    if prompt.off_target_exceeded {
        println!("  off-target risk {}% is too high", prompt.off_target_risk);
    }
    if prompt.mutation_exceeded {
        println!("  mutation rate {}% is too high", prompt.mutation_rate);
    }
    let decision = match choice {
        RiskChoice::Proceed => "proceeding anyway",
        RiskChoice::Redesign => "returning to redesign",
        RiskChoice::Abort => "aborting",
    };
    println!("  -> {decision}");
}

fn print_update(update: &SchedulerUpdate) {
    match update {
        SchedulerUpdate::Tick {
            progress,
            phase,
            phase_changed: true,
            ..
        } => println!("  [{progress:5.1}%] {phase}: {}", phase.description()),
        SchedulerUpdate::Completed { run } => println!("  {run} complete"),
        SchedulerUpdate::Tick { .. } | SchedulerUpdate::MarkersExpired { .. } => {}
    }
}

fn print_summary(summary: &RunSummary) {
    if summary.cancelled {
        println!(
            "\nInterrupted at {:.1}% ({})",
            summary.session.progress, summary.session.phase_name
        );
        return;
    }
    let Some(report) = &summary.outcome else {
        println!("\nStopped in the {} stage.", summary.session.stage);
        return;
    };
    println!("\n{}", report.grade.headline());
    println!(
        "  {} in {}: {} confidence",
        report.trait_name,
        report.organism,
        match report.confidence {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    );
    println!("  phenotype:  {}", report.phenotype);
    println!("  change:     {}", report.function_change);
    println!("  before:     {}", report.dna_original);
    println!("  after:      {}", report.dna_edited);
    if let Some(insertion) = &report.insertion {
        println!("  inserted:   {insertion}");
    }
    println!("  markers:    {}", summary.markers_emitted);
}
