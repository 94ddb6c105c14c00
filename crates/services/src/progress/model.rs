use std::fmt;

use storage::{ProgressStore, StorageKey};
use tracing::{debug, info};
use tutorial_core::model::{
    PhaseKey, PhaseStatus, PhaseTransitionError, ProgressBoard, ProgressMetrics, ProgressRecord,
    ProgressSnapshot, StepKey, StepUpdate, TutorialOutline,
};

//
// ─── PROGRESS MODEL ────────────────────────────────────────────────────────────
//

/// Store-backed owner of the session's step flags and phase statuses.
///
/// The in-memory board is the source of truth. Every mutation is applied to
/// the board first and then written through to the store; a failed write is
/// logged by the store and otherwise ignored.
pub struct ProgressModel {
    board: ProgressBoard,
    store: ProgressStore,
}

impl ProgressModel {
    /// Build the model from the outline and whatever the store holds.
    pub async fn load(outline: TutorialOutline, store: ProgressStore) -> Self {
        let record = store.load_record().await;
        let board = ProgressBoard::from_record(outline, &record);
        debug!(
            steps = record.completed_steps.len(),
            phases = record.completed_phases.len(),
            "loaded progress record"
        );
        Self { board, store }
    }

    /// Set a step's flag and persist the full completed-steps set.
    ///
    /// Unknown steps are ignored and nothing is written.
    pub async fn set_step_completion(
        &mut self,
        step: &StepKey,
        completed: bool,
    ) -> Option<StepUpdate> {
        let Some(update) = self.board.set_step(step, completed) else {
            debug!(%step, "ignoring toggle for unknown step");
            return None;
        };
        self.store
            .save_completed_steps(&self.board.completed_step_keys())
            .await;
        Some(update)
    }

    /// Move a `Ready` phase to `Completed` and persist the completed phases.
    ///
    /// Returns `false` (and writes nothing) when the phase is unknown, not
    /// ready, or already completed.
    pub async fn mark_phase_completed(&mut self, phase: &PhaseKey) -> bool {
        match self.board.confirm_phase(phase) {
            Ok(()) => {
                self.store
                    .save_completed_phases(&self.board.completed_phase_keys())
                    .await;
                true
            }
            Err(PhaseTransitionError::AlreadyCompleted) => false,
            Err(err) => {
                debug!(%phase, reason = %err, "ignoring phase confirmation");
                false
            }
        }
    }

    /// Forget all progress, in memory and in the store.
    pub async fn reset(&mut self) {
        self.board.reset();
        self.store.clear(StorageKey::CompletedSteps).await;
        self.store.clear(StorageKey::CompletedPhases).await;
        info!("progress reset");
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.board.snapshot()
    }

    #[must_use]
    pub fn metrics(&self) -> ProgressMetrics {
        ProgressMetrics::from_snapshot(&self.board.snapshot())
    }

    #[must_use]
    pub fn phase_status(&self, phase: &PhaseKey) -> Option<PhaseStatus> {
        self.board.phase_status(phase)
    }

    #[must_use]
    pub fn is_step_completed(&self, step: &StepKey) -> bool {
        self.board.is_step_completed(step)
    }

    #[must_use]
    pub fn record(&self) -> ProgressRecord {
        self.board.record()
    }

    #[must_use]
    pub fn outline(&self) -> &TutorialOutline {
        self.board.outline()
    }
}

impl fmt::Debug for ProgressModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressModel")
            .field("board", &self.board)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
