use std::sync::Arc;

use tracing::{debug, info};
use tutorial_core::model::{PhaseKey, StepKey, StepUpdate};

use super::model::ProgressModel;
use crate::reporting::{CompletionEvent, CompletionReporter, IdentityProvider};

/// Drives phase transitions from user actions.
///
/// Readiness is re-evaluated on every step toggle. Completion needs an
/// explicit confirm and emits a completion report; the report's outcome
/// never affects the transition.
#[derive(Clone)]
pub struct PhaseCompletionEvaluator {
    reporter: Arc<dyn CompletionReporter>,
    identity: Arc<dyn IdentityProvider>,
}

impl PhaseCompletionEvaluator {
    #[must_use]
    pub fn new(reporter: Arc<dyn CompletionReporter>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { reporter, identity }
    }

    /// Apply a step toggle; the owning phase moves between `NotStarted` and
    /// `Ready` unless it is already `Completed`.
    pub async fn step_toggled(
        &self,
        model: &mut ProgressModel,
        step: &StepKey,
        completed: bool,
    ) -> Option<StepUpdate> {
        let update = model.set_step_completion(step, completed).await?;
        if update.phase_status_changed() {
            debug!(
                phase = %update.phase,
                from = update.previous_status.as_str(),
                to = update.status.as_str(),
                "phase status changed"
            );
        }
        Some(update)
    }

    /// Confirm a phase. Returns `true` only on the `Ready -> Completed` edge,
    /// which is also the only time a report is emitted.
    pub async fn confirm(&self, model: &mut ProgressModel, phase: &PhaseKey) -> bool {
        if !model.mark_phase_completed(phase).await {
            return false;
        }
        info!(%phase, "phase completed");
        self.emit_report(phase);
        true
    }

    fn emit_report(&self, phase: &PhaseKey) {
        let Some(identity) = self.identity.identity() else {
            debug!(%phase, "no identity; skipping completion report");
            return;
        };
        let event = CompletionEvent::phase_completed(identity, phase.clone());
        if let Err(err) = self.reporter.report(&event) {
            debug!(%phase, error = %err, "completion report dropped");
        }
    }
}
