//! Illustrative progress plans and the timer that advances them.
//!
//! The remote call's latency is irregular (OCR, AI inference, live registry
//! scraping), so the user-facing progression runs on a fixed timetable that
//! never consults the real operation. The orchestrator reconciles the two
//! timelines once both have settled.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::request::VerificationMode;

/// Runtime status of one stage of the progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Pending,
    Active,
    Completed,
    Error,
}

/// One named phase of the illustrative progress sequence.
#[derive(Debug, Clone)]
pub struct Stage {
    /// Ordinal, contiguous starting at 1.
    pub id: usize,
    pub label: &'static str,
    pub planned: Duration,
}

/// An ordered, mode-specific sequence of stages. Constant configuration; a
/// fresh mutable status vector is produced per attempt.
#[derive(Debug, Clone)]
pub struct ProgressPlan {
    stages: Vec<Stage>,
}

/// Progress events emitted while a plan runs.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    StageStarted {
        id: usize,
        total: usize,
        label: &'static str,
    },
    StageCompleted {
        id: usize,
        total: usize,
    },
}

impl ProgressPlan {
    /// Build the plan for the given verification mode.
    pub fn for_mode(mode: VerificationMode) -> Self {
        let stages = match mode {
            VerificationMode::Image => vec![
                ("Uploading image", 1500),
                ("Extracting text from image", 2500),
                ("Detecting NAFDAC number", 2000),
                ("Searching NAFDAC Greenbook", 3500),
                ("Validating product details", 1500),
            ],
            VerificationMode::Manual => vec![
                ("Connecting to NAFDAC Greenbook", 1000),
                ("Searching registration database", 2500),
                ("Retrieving product details", 1500),
            ],
        };
        Self::new(stages)
    }

    /// Build a plan from `(label, millis)` pairs. Ids are assigned
    /// contiguously starting at 1.
    pub fn new(stages: Vec<(&'static str, u64)>) -> Self {
        let stages = stages
            .into_iter()
            .enumerate()
            .map(|(i, (label, ms))| Stage {
                id: i + 1,
                label,
                planned: Duration::from_millis(ms),
            })
            .collect();
        Self { stages }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// A fresh all-Pending status vector for one attempt.
    pub fn initial_statuses(&self) -> Vec<StageStatus> {
        vec![StageStatus::Pending; self.stages.len()]
    }
}

/// Advance a plan's statuses on the wall clock, emitting an event at each
/// transition.
///
/// For each stage in order: mark it Active, wait out its planned duration,
/// mark it Completed. Exactly one stage is Active at a time and transitions
/// happen in ascending id order. The scheduler has no failure mode of its
/// own; it runs to completion unless `cancel` fires, in which case it returns
/// immediately with the in-flight stage still Active and later stages
/// Pending. The caller decides what that freeze means.
pub async fn run_plan(
    plan: &ProgressPlan,
    progress: impl Fn(ProgressEvent),
    cancel: CancellationToken,
) -> Vec<StageStatus> {
    let total = plan.len();
    let mut statuses = plan.initial_statuses();

    for (idx, stage) in plan.stages().iter().enumerate() {
        statuses[idx] = StageStatus::Active;
        progress(ProgressEvent::StageStarted {
            id: stage.id,
            total,
            label: stage.label,
        });

        tokio::select! {
            _ = cancel.cancelled() => return statuses,
            _ = tokio::time::sleep(stage.planned) => {}
        }

        statuses[idx] = StageStatus::Completed;
        progress(ProgressEvent::StageCompleted {
            id: stage.id,
            total,
        });
    }

    statuses
}
