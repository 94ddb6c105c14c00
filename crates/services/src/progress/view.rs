use tutorial_core::model::{PhaseKey, PhaseStatus, ProgressMetrics, ResumptionNotice, StepKey};

/// How the resumption notice went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    Manual,
    Timeout,
}

/// Discrete user actions delivered by a view adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    StepToggled { step: StepKey, completed: bool },
    PhaseConfirmRequested(PhaseKey),
    NoticeDismissed,
    ResetRequested,
}

/// Rendering callbacks implemented by a view adapter.
///
/// Implementations only draw; they hold no progress state of their own.
pub trait ProgressView: Send + Sync {
    fn render_percentage(&self, metrics: &ProgressMetrics);

    fn render_step(&self, step: &StepKey, completed: bool);

    fn render_phase_status(&self, phase: &PhaseKey, status: PhaseStatus);

    fn show_resumption_notice(&self, notice: &ResumptionNotice);

    fn hide_resumption_notice(&self, reason: DismissReason);

    fn show_celebration(&self, phase: &PhaseKey);
}
