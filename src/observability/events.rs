//! JSONL event stream.
//!
//! Every observable step of a lab session is written as one JSON object
//! per line, tagged by `"type"` and numbered with a sequence counter so
//! a consumer can replay the session in order.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Event variants
// ============================================================================

/// A discrete session event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A controller was created.
    SessionStarted {
        /// When the controller was created.
        timestamp: DateTime<Utc>,
        /// Number of traits in the catalog.
        catalog_size: usize,
        /// Seed feeding the marker generator.
        seed: u64,
    },

    /// The session moved to a new stage.
    StageEntered {
        /// When the transition happened.
        timestamp: DateTime<Utc>,
        /// Stage left.
        from: String,
        /// Stage entered.
        stage: String,
        /// Selected trait, if any.
        trait_id: Option<String>,
    },

    /// An edit request was held back by the risk gate.
    RiskPromptRaised {
        /// When the prompt was raised.
        timestamp: DateTime<Utc>,
        /// Trait being edited.
        trait_id: String,
        /// Off-target risk in percent.
        off_target_risk: u8,
        /// Mutation rate in percent.
        mutation_rate: u8,
    },

    /// A pending risk prompt was answered.
    RiskResolved {
        /// When the user decided.
        timestamp: DateTime<Utc>,
        /// Trait being edited.
        trait_id: String,
        /// `"proceed"` or `"redesign"`.
        decision: String,
    },

    /// The edit animation entered a new phase.
    PhaseEntered {
        /// When the tick landed.
        timestamp: DateTime<Utc>,
        /// Animator run id.
        run: u64,
        /// Phase label.
        phase_name: String,
        /// Zero-based phase index.
        phase_index: u8,
    },

    /// A transient marker appeared.
    MarkerEmitted {
        /// When the tick landed.
        timestamp: DateTime<Utc>,
        /// Animator run id.
        run: u64,
        /// Marker id within the run.
        marker_id: u64,
        /// Simulated clock at emission, in milliseconds.
        at_ms: u64,
    },

    /// A marker reached the end of its lifetime.
    MarkerExpired {
        /// When the expiry was observed.
        timestamp: DateTime<Utc>,
        /// Animator run id.
        run: u64,
        /// Marker id within the run.
        marker_id: u64,
    },

    /// The edit animation reached 100 %.
    EditCompleted {
        /// When the final tick landed.
        timestamp: DateTime<Utc>,
        /// Animator run id.
        run: u64,
        /// Edited trait.
        trait_id: String,
        /// Ticks taken.
        ticks: u32,
    },

    /// The quiz was scored.
    QuizSubmitted {
        /// When the quiz was scored.
        timestamp: DateTime<Utc>,
        /// Correct answers.
        correct: usize,
        /// Questions in the bank.
        total: usize,
    },

    /// The session was reset to Select.
    SessionReset {
        /// When the reset happened.
        timestamp: DateTime<Utc>,
        /// Stage the session was in.
        from: String,
    },
}

// ============================================================================
// Envelope
// ============================================================================

#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: Event,
}

// ============================================================================
// Emitter
// ============================================================================

/// Thread-safe, buffered JSONL event writer.
///
/// Write and serialization failures are dropped: a broken event sink
/// never interrupts the session.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter over any writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Emitter writing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Emitter writing to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Emitter discarding everything.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Emitter writing to a freshly created file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Writes one event as a JSON line and flushes.
    pub fn emit(&self, event: Event) {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope { sequence, event };

        if let Ok(mut w) = self.writer.lock()
            && let Ok(line) = serde_json::to_string(&envelope)
        {
            let _ = writeln!(w, "{line}");
            let _ = w.flush();
        }
    }

    /// Number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}
