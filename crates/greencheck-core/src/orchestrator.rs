//! Coordination root: runs the dispatcher and the progress timetable as two
//! independently suspending tasks, joins them, and settles the attempt into
//! one renderable report.

use tokio_util::sync::CancellationToken;

use crate::client::{GreenbookClient, ServiceResponse};
use crate::outcome::VerificationOutcome;
use crate::progress::{ProgressEvent, ProgressPlan, StageStatus, run_plan};
use crate::request::VerificationRequest;
use crate::{CoreError, DISPATCH_FAILURE_MESSAGE};

/// What an attempt settles into: the normalized outcome plus the terminal
/// stage statuses for rendering.
#[derive(Debug, Clone)]
pub struct AttemptReport {
    pub outcome: VerificationOutcome,
    pub stages: Vec<StageStatus>,
}

/// Lifecycle of one verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No attempt in flight; the only phase a submission may start from.
    Idle,
    /// Dispatcher and progress timetable running.
    Submitting,
    /// Terminal for the attempt; exited only by [`Verifier::reset`].
    Settled,
}

/// User-facing submission payloads, validated on submit.
#[derive(Debug, Clone)]
pub enum Submission {
    ImageBytes(Vec<u8>),
    ImageDataUrl(String),
    Manual(String),
}

/// Run one verification attempt to settlement.
///
/// The dispatcher call and the progress timetable are launched concurrently
/// and joined; the report is never produced before both have settled, for
/// every relative ordering of their completions. A fast remote response
/// still waits out the full illustrative progression. On dispatcher failure
/// the progression is halted where it stands and the active stage is marked
/// [`StageStatus::Error`].
///
/// Returns `None` if `cancel` fires first: both in-flight tasks are dropped
/// at that point, so nothing from the abandoned attempt can mutate state
/// afterwards.
pub async fn run_attempt(
    client: &GreenbookClient,
    request: &VerificationRequest,
    plan: &ProgressPlan,
    progress: impl Fn(ProgressEvent),
    cancel: CancellationToken,
) -> Option<AttemptReport> {
    let wire = request.to_wire();

    // Child token: a dispatcher failure freezes the progression without
    // touching the caller's cancellation signal.
    let halt = cancel.child_token();

    let dispatch = async {
        let result = client.submit(&wire).await;
        if result.is_err() {
            halt.cancel();
        }
        result
    };

    let attempt = async {
        let (service, stages) = tokio::join!(dispatch, run_plan(plan, &progress, halt.clone()));
        settle(service, stages)
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        report = attempt => Some(report),
    }
}

/// Reconcile the two timelines once both have settled.
fn settle(
    service: Result<ServiceResponse, CoreError>,
    mut stages: Vec<StageStatus>,
) -> AttemptReport {
    match service {
        Ok(resp) => {
            // The full progression ran; force every stage terminal.
            for status in &mut stages {
                *status = StageStatus::Completed;
            }
            AttemptReport {
                outcome: VerificationOutcome::from_response(resp),
                stages,
            }
        }
        Err(_) => {
            // Raw cause was already logged at the dispatcher; only the safe
            // message reaches the display.
            if let Some(active) = stages
                .iter_mut()
                .find(|status| **status == StageStatus::Active)
            {
                *active = StageStatus::Error;
            }
            AttemptReport {
                outcome: VerificationOutcome::failure(DISPATCH_FAILURE_MESSAGE),
                stages,
            }
        }
    }
}

/// Single-attempt-at-a-time verification state machine.
///
/// Owns the current attempt's cancellation token and report. All state is
/// mutated from the caller's task; the engine needs no locks beyond the
/// one-attempt discipline enforced by [`Phase`].
pub struct Verifier {
    client: GreenbookClient,
    phase: Phase,
    cancel: CancellationToken,
    report: Option<AttemptReport>,
}

impl Verifier {
    pub fn new(client: GreenbookClient) -> Self {
        Self {
            client,
            phase: Phase::Idle,
            cancel: CancellationToken::new(),
            report: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Report of the settled attempt, if any.
    pub fn report(&self) -> Option<&AttemptReport> {
        self.report.as_ref()
    }

    /// Token an external event (Ctrl-C, "verify another product") can use to
    /// cut the in-flight attempt short.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Validate and run one submission to settlement.
    ///
    /// Local validation failure (no image, oversized image, empty number)
    /// surfaces immediately as `Err` and leaves the verifier Idle — neither
    /// the dispatcher nor the progress timetable starts. A cancelled attempt
    /// returns `Ok(None)` and also lands back in Idle, with the abandoned
    /// attempt's results discarded.
    pub async fn submit(
        &mut self,
        submission: Submission,
        progress: impl Fn(ProgressEvent),
    ) -> Result<Option<&AttemptReport>, CoreError> {
        if self.phase != Phase::Idle {
            return Err(CoreError::Validation(
                "A verification is already in progress".into(),
            ));
        }

        let request = match submission {
            Submission::ImageBytes(bytes) => VerificationRequest::from_image_bytes(&bytes),
            Submission::ImageDataUrl(data) => VerificationRequest::from_image_data_url(&data),
            Submission::Manual(number) => VerificationRequest::from_manual(&number),
        }?;

        self.phase = Phase::Submitting;
        let plan = ProgressPlan::for_mode(request.mode);
        let cancel = self.cancel.clone();

        match run_attempt(&self.client, &request, &plan, progress, cancel).await {
            Some(report) => {
                self.report = Some(report);
                self.phase = Phase::Settled;
                Ok(self.report.as_ref())
            }
            None => {
                // The fired token is spent; the next submission needs a
                // fresh one or it would be discarded on arrival.
                self.cancel = CancellationToken::new();
                self.phase = Phase::Idle;
                Ok(None)
            }
        }
    }

    /// Clear the current attempt and return to Idle. Permitted from any
    /// phase; cancels an in-flight attempt and discards its late results.
    pub fn reset(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.report = None;
        self.phase = Phase::Idle;
    }
}
