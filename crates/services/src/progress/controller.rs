use std::fmt;
use std::sync::Arc;

use tutorial_core::model::PhaseStatus;

use super::evaluator::PhaseCompletionEvaluator;
use super::model::ProgressModel;
use super::notifier::{NoticeHandle, ResumptionNotifier};
use super::view::{ProgressView, ViewEvent};

/// Boundary between a view adapter and the progress core.
///
/// Translates `ViewEvent`s into core calls and core results into rendering
/// callbacks. Events are handled one at a time.
pub struct ProgressController {
    model: ProgressModel,
    evaluator: PhaseCompletionEvaluator,
    view: Arc<dyn ProgressView>,
    notice: Option<NoticeHandle>,
}

impl ProgressController {
    /// Render the loaded state and run the resumption notifier once.
    pub fn start(
        model: ProgressModel,
        evaluator: PhaseCompletionEvaluator,
        notifier: &ResumptionNotifier,
        view: Arc<dyn ProgressView>,
    ) -> Self {
        let mut controller = Self {
            model,
            evaluator,
            view,
            notice: None,
        };
        controller.render_all();
        controller.notice = notifier.present(&controller.model.metrics(), Arc::clone(&controller.view));
        controller
    }

    pub async fn handle(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::StepToggled { step, completed } => {
                let Some(update) = self
                    .evaluator
                    .step_toggled(&mut self.model, &step, completed)
                    .await
                else {
                    return;
                };
                self.view.render_step(&update.step, update.completed);
                self.view.render_percentage(&self.model.metrics());
                if update.phase_status_changed() {
                    self.view.render_phase_status(&update.phase, update.status);
                }
            }
            ViewEvent::PhaseConfirmRequested(phase) => {
                if self.evaluator.confirm(&mut self.model, &phase).await {
                    self.view
                        .render_phase_status(&phase, PhaseStatus::Completed);
                    self.view.show_celebration(&phase);
                }
            }
            ViewEvent::NoticeDismissed => {
                if let Some(notice) = &self.notice {
                    notice.dismiss();
                }
            }
            ViewEvent::ResetRequested => {
                self.model.reset().await;
                self.render_all();
            }
        }
    }

    #[must_use]
    pub fn model(&self) -> &ProgressModel {
        &self.model
    }

    #[must_use]
    pub fn notice(&self) -> Option<&NoticeHandle> {
        self.notice.as_ref()
    }

    fn render_all(&self) {
        let snapshot = self.model.snapshot();
        for step in &snapshot.steps {
            self.view.render_step(&step.key, step.completed);
        }
        for phase in &snapshot.phases {
            self.view.render_phase_status(&phase.key, phase.status);
        }
        self.view.render_percentage(&self.model.metrics());
    }
}

impl fmt::Debug for ProgressController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressController")
            .field("model", &self.model)
            .field("notice", &self.notice)
            .finish_non_exhaustive()
    }
}
