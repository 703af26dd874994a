//! CommandSequencer: drains a [`Sequence`] against the device, one step at a
//! time.
//!
//! # State machine
//!
//! ```text
//!           ┌──────────── Delay(d): sleep d ms ────────────┐
//!           │                                              │
//!   cursor = 0 ──► step[cursor] ──► cursor += 1 ──► cursor == len ──► on_complete()
//!           │                                              │
//!           └── Action(cmd): POST, wait for body drained ──┘
//! ```
//!
//! Each call to [`CommandSequencer::run`] gets its own Tokio task, so a long
//! pause in one routine never holds up discovery, the HTTP server, or another
//! routine.  Two routines started back to back are *not* serialized against
//! each other; if a caller needs that, it must wait for the first
//! `on_complete` before starting the second.
//!
//! # Failure policy
//!
//! A failed action (device unreachable, location not yet discovered, body
//! read error) is logged and the cursor advances anyway.  No error is ever
//! returned to the caller of `run`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use roku_core::{format_command, Command, DeviceLocation, Sequence, Step};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Why a single ECP action did not complete cleanly.
///
/// These are reported in logs only; see the module-level failure policy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    /// No discovery response has arrived yet, so there is no URL to post to.
    #[error("device location is not known yet")]
    NoDeviceLocation,
    /// The request could not be sent or no response arrived.
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },
    /// A response arrived but its body could not be read to the end.
    #[error("failed to drain response from {url}: {reason}")]
    Drain { url: String, reason: String },
}

/// Sends one fire-and-forget ECP command to a fully formed URL.
///
/// The returned future is the per-call continuation: it resolves exactly once,
/// after the response body has been consumed in full (or the attempt failed).
/// Implementations must always drain the body themselves so the underlying
/// connection is released.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute(&self, url: &str) -> Result<(), ActionError>;
}

/// Zero-argument continuation fired once a sequence reaches its last step.
pub type CompletionCallback = Box<dyn FnOnce() + Send + 'static>;

/// Counters describing how a sequence run went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceOutcome {
    /// Steps processed, delays included.  Always equals the sequence length.
    pub steps_run: usize,
    /// Actions whose request completed.
    pub actions_sent: usize,
    /// Actions that failed and were skipped over.
    pub actions_failed: usize,
}

/// The cursor over one sequence.
struct SequenceRun {
    id: Uuid,
    sequence: Sequence,
    cursor: usize,
    outcome: SequenceOutcome,
}

impl SequenceRun {
    fn new(sequence: Sequence) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence,
            cursor: 0,
            outcome: SequenceOutcome::default(),
        }
    }

    /// Returns the step under the cursor and moves the cursor past it.
    fn advance(&mut self) -> Option<Step> {
        let step = self.sequence.get(self.cursor)?.clone();
        self.cursor += 1;
        self.outcome.steps_run += 1;
        Some(step)
    }
}

/// Executes sequences against the device currently held in [`DeviceLocation`].
///
/// Cheap to clone: both fields are shared handles.
#[derive(Clone)]
pub struct CommandSequencer {
    executor: Arc<dyn ActionExecutor>,
    location: DeviceLocation,
}

impl CommandSequencer {
    pub fn new(executor: Arc<dyn ActionExecutor>, location: DeviceLocation) -> Self {
        Self { executor, location }
    }

    /// The location cell every action resolves its URL against.
    pub fn location(&self) -> &DeviceLocation {
        &self.location
    }

    /// Starts `sequence` in the background and returns immediately.
    ///
    /// `on_complete` fires exactly once, after the last step.  For an empty
    /// sequence it fires before this method returns, no task is spawned, and
    /// `None` is returned.  Otherwise the handle of the spawned task is
    /// returned; callers that only want fire-and-forget may drop it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn run(
        &self,
        sequence: Sequence,
        on_complete: Option<CompletionCallback>,
    ) -> Option<JoinHandle<SequenceOutcome>> {
        if sequence.is_empty() {
            if let Some(done) = on_complete {
                done();
            }
            return None;
        }

        let this = self.clone();
        Some(tokio::spawn(async move {
            let outcome = this.drive(sequence).await;
            if let Some(done) = on_complete {
                done();
            }
            outcome
        }))
    }

    /// Executes `sequence` on the current task, returning when the last step
    /// has completed.
    pub async fn drive(&self, sequence: Sequence) -> SequenceOutcome {
        let mut run = SequenceRun::new(sequence);
        let span = info_span!("sequence", run = %run.id, steps = run.sequence.len());

        async move {
            debug!("sequence started");
            while let Some(step) = run.advance() {
                match step {
                    Step::Delay(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
                    Step::Action(command) => match self.perform(&command).await {
                        Ok(()) => run.outcome.actions_sent += 1,
                        Err(e) => {
                            warn!(step = run.cursor - 1, %command, "action failed: {e}");
                            run.outcome.actions_failed += 1;
                        }
                    },
                }
            }
            info!(
                sent = run.outcome.actions_sent,
                failed = run.outcome.actions_failed,
                "sequence complete"
            );
            run.outcome
        }
        .instrument(span)
        .await
    }

    /// Resolves the URL for `command` *now* and hands it to the executor.
    async fn perform(&self, command: &Command) -> Result<(), ActionError> {
        let base = self.location.get().ok_or(ActionError::NoDeviceLocation)?;
        let url = format_command(&base, &command.path());
        debug!(%url, "posting");
        self.executor.execute(&url).await
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
