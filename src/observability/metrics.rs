//! Prometheus metrics.
//!
//! Label values are limited to stage and phase names known at compile
//! time, so no label set can grow without bound.

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::LabError;

static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Installs the global recorder.
///
/// With a port, a Prometheus scrape endpoint listens on
/// `127.0.0.1:<port>`. Without one, metrics are recorded in-process only.
///
/// # Errors
///
/// Returns [`LabError::Io`] if the recorder or listener cannot be
/// installed.
pub fn init_metrics(port: Option<u16>) -> Result<(), LabError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| LabError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

fn describe_metrics() {
    describe_counter!(
        "crispr_lab_stage_transitions_total",
        "Stage transitions by source and target stage"
    );
    describe_counter!(
        "crispr_lab_risk_prompts_total",
        "Edit requests held back by the risk gate"
    );
    describe_counter!(
        "crispr_lab_risk_decisions_total",
        "Risk prompt resolutions by decision"
    );
    describe_counter!("crispr_lab_ticks_total", "Animator ticks applied");
    describe_gauge!("crispr_lab_edit_progress", "Edit progress in percent");
    describe_counter!(
        "crispr_lab_phase_entries_total",
        "Animation phases entered"
    );
    describe_counter!("crispr_lab_markers_emitted_total", "Markers emitted");
    describe_counter!("crispr_lab_markers_expired_total", "Markers expired");
    describe_counter!("crispr_lab_edits_completed_total", "Edits completed");
    describe_histogram!(
        "crispr_lab_quiz_score_percent",
        "Quiz scores in percent"
    );
    describe_counter!(
        "crispr_lab_errors_total",
        "Rejected operations by category"
    );
}

/// Records a stage transition.
pub fn record_stage_transition(from: &'static str, to: &'static str) {
    counter!("crispr_lab_stage_transitions_total", "from" => from, "to" => to).increment(1);
}

/// Records a risk prompt being raised.
pub fn record_risk_prompt() {
    counter!("crispr_lab_risk_prompts_total").increment(1);
}

/// Records how a risk prompt was resolved.
pub fn record_risk_decision(decision: &'static str) {
    counter!("crispr_lab_risk_decisions_total", "decision" => decision).increment(1);
}

/// Records an applied tick and the resulting progress.
pub fn record_tick(progress: f64) {
    counter!("crispr_lab_ticks_total").increment(1);
    gauge!("crispr_lab_edit_progress").set(progress);
}

/// Records entry into an animation phase.
pub fn record_phase_entered(phase: &'static str) {
    counter!("crispr_lab_phase_entries_total", "phase" => phase).increment(1);
}

/// Records an emitted marker.
pub fn record_marker_emitted() {
    counter!("crispr_lab_markers_emitted_total").increment(1);
}

/// Records expired markers.
pub fn record_markers_expired(count: u64) {
    if count > 0 {
        counter!("crispr_lab_markers_expired_total").increment(count);
    }
}

/// Records a completed edit.
pub fn record_edit_completed() {
    counter!("crispr_lab_edits_completed_total").increment(1);
}

/// Records a quiz score.
pub fn record_quiz_score(percent: u32) {
    histogram!("crispr_lab_quiz_score_percent").record(f64::from(percent));
}

/// Records a rejected operation.
pub fn record_error(category: &'static str) {
    counter!("crispr_lab_errors_total", "category" => category).increment(1);
}
