use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use services::{DismissReason, ProgressView};
use tutorial_core::model::{PhaseKey, PhaseStatus, ProgressMetrics, ResumptionNotice, StepKey};

/// Line-oriented view adapter.
///
/// With `checklist` off, per-step and per-phase lines are printed only for
/// changes after startup, so single commands stay terse.
pub struct TerminalView<W: Write + Send> {
    out: Mutex<W>,
    checklist: bool,
    started: AtomicBool,
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W, checklist: bool) -> Self {
        Self {
            out: Mutex::new(out),
            checklist,
            started: AtomicBool::new(false),
        }
    }

    /// Mark startup rendering as done; later callbacks always print.
    pub fn mark_started(&self) {
        self.started.store(true, Ordering::SeqCst);
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn verbose(&self) -> bool {
        self.checklist || self.started.load(Ordering::SeqCst)
    }

    fn line(&self, text: &str) {
        if let Ok(mut out) = self.out.lock() {
            // Terminal output is best-effort like every other view callback.
            let _ = writeln!(out, "{text}");
        }
    }
}

fn status_label(status: PhaseStatus) -> &'static str {
    match status {
        PhaseStatus::NotStarted => "in progress",
        PhaseStatus::Ready => "ready to confirm",
        PhaseStatus::Completed => "phase complete",
    }
}

impl<W: Write + Send> ProgressView for TerminalView<W> {
    fn render_percentage(&self, metrics: &ProgressMetrics) {
        self.line(&format!(
            "progress: {}/{} ({}%)",
            metrics.completed_steps, metrics.total_steps, metrics.percentage
        ));
    }

    fn render_step(&self, step: &StepKey, completed: bool) {
        if self.verbose() {
            let mark = if completed { 'x' } else { ' ' };
            self.line(&format!("  [{mark}] {step}"));
        }
    }

    fn render_phase_status(&self, phase: &PhaseKey, status: PhaseStatus) {
        if self.verbose() {
            self.line(&format!("phase {phase}: {}", status_label(status)));
        }
    }

    fn show_resumption_notice(&self, notice: &ResumptionNotice) {
        self.line(&notice.message());
    }

    fn hide_resumption_notice(&self, _reason: DismissReason) {}

    fn show_celebration(&self, phase: &PhaseKey) {
        self.line(&format!("🎉 phase {phase} complete!"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(view: TerminalView<Vec<u8>>) -> String {
        String::from_utf8(view.into_inner()).unwrap()
    }

    #[test]
    fn terse_view_skips_startup_checklist() {
        let view = TerminalView::new(Vec::new(), false);
        view.render_step(&StepKey::new("1-1"), true);
        view.render_percentage(&ProgressMetrics::from_counts(1, 3));
        view.mark_started();
        view.render_phase_status(&PhaseKey::new("1"), PhaseStatus::Ready);

        assert_eq!(
            output(view),
            "progress: 1/3 (33%)\nphase 1: ready to confirm\n"
        );
    }

    #[test]
    fn checklist_view_prints_steps() {
        let view = TerminalView::new(Vec::new(), true);
        view.render_step(&StepKey::new("1-1"), true);
        view.render_step(&StepKey::new("1-2"), false);
        assert_eq!(output(view), "  [x] 1-1\n  [ ] 1-2\n");
    }
}
