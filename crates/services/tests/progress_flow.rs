use std::sync::{Arc, Mutex};
use std::time::Duration;

use services::{
    AppServices, DismissReason, NotifierConfig, ProgressView, RecordingReporter, StaticIdentity,
    ViewEvent,
};
use storage::repository::{InMemoryStore, StateStore, Storage};
use storage::StorageKey;
use tutorial_core::model::{
    OutlineDraft, PhaseKey, PhaseStatus, ProgressMetrics, ResumptionNotice, StepKey,
    TutorialOutline,
};
use tutorial_core::time::fixed_clock;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Rendered {
    Percentage(usize, usize, u8),
    Step(String, bool),
    Phase(String, PhaseStatus),
    Notice(String),
    NoticeHidden(DismissReason),
    Celebration(String),
}

#[derive(Default)]
struct RecordingView {
    calls: Mutex<Vec<Rendered>>,
}

impl RecordingView {
    fn take(&self) -> Vec<Rendered> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }

    fn push(&self, call: Rendered) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ProgressView for RecordingView {
    fn render_percentage(&self, m: &ProgressMetrics) {
        self.push(Rendered::Percentage(m.completed_steps, m.total_steps, m.percentage));
    }
    fn render_step(&self, step: &StepKey, completed: bool) {
        self.push(Rendered::Step(step.to_string(), completed));
    }
    fn render_phase_status(&self, phase: &PhaseKey, status: PhaseStatus) {
        self.push(Rendered::Phase(phase.to_string(), status));
    }
    fn show_resumption_notice(&self, notice: &ResumptionNotice) {
        self.push(Rendered::Notice(notice.message()));
    }
    fn hide_resumption_notice(&self, reason: DismissReason) {
        self.push(Rendered::NoticeHidden(reason));
    }
    fn show_celebration(&self, phase: &PhaseKey) {
        self.push(Rendered::Celebration(phase.to_string()));
    }
}

fn outline() -> TutorialOutline {
    OutlineDraft::new()
        .phase("1", ["1-1", "1-2", "1-3", "1-4", "1-5"])
        .phase("2", ["2-1", "2-2", "2-3", "2-4", "2-5"])
        .validate()
        .unwrap()
}

fn services(raw: &InMemoryStore, reporter: &RecordingReporter) -> AppServices {
    let storage = Storage {
        state: Arc::new(raw.clone()),
    };
    AppServices::from_storage(
        &storage,
        fixed_clock(),
        NotifierConfig::default(),
        Arc::new(reporter.clone()),
        Arc::new(StaticIdentity::new(Some("learner@example.com".into()))),
    )
}

fn toggle(step: &str, completed: bool) -> ViewEvent {
    ViewEvent::StepToggled {
        step: StepKey::new(step),
        completed,
    }
}

#[tokio::test(start_paused = true)]
async fn fresh_user_gets_no_notice_and_can_complete_a_phase() {
    let raw = InMemoryStore::new();
    let reporter = RecordingReporter::new();
    let view = Arc::new(RecordingView::default());
    let mut controller = services(&raw, &reporter).start(outline(), view.clone()).await;

    assert!(controller.notice().is_none());
    let initial = view.take();
    assert_eq!(initial.last(), Some(&Rendered::Percentage(0, 10, 0)));

    for step in ["1-1", "1-2", "1-3", "1-4"] {
        controller.handle(toggle(step, true)).await;
    }
    controller
        .handle(ViewEvent::PhaseConfirmRequested(PhaseKey::new("1")))
        .await;
    assert!(reporter.events().is_empty());
    view.take();

    controller.handle(toggle("1-5", true)).await;
    assert_eq!(
        view.take(),
        vec![
            Rendered::Step("1-5".into(), true),
            Rendered::Percentage(5, 10, 50),
            Rendered::Phase("1".into(), PhaseStatus::Ready),
        ]
    );

    controller
        .handle(ViewEvent::PhaseConfirmRequested(PhaseKey::new("1")))
        .await;
    assert_eq!(
        view.take(),
        vec![
            Rendered::Phase("1".into(), PhaseStatus::Completed),
            Rendered::Celebration("1".into()),
        ]
    );

    // Second confirm is a no-op and does not report again.
    controller
        .handle(ViewEvent::PhaseConfirmRequested(PhaseKey::new("1")))
        .await;
    assert!(view.take().is_empty());
    assert_eq!(reporter.events().len(), 1);

    // Unchecking after completion leaves the phase completed.
    controller.handle(toggle("1-3", false)).await;
    assert_eq!(
        controller.model().phase_status(&PhaseKey::new("1")),
        Some(PhaseStatus::Completed)
    );
}

#[tokio::test(start_paused = true)]
async fn returning_user_sees_notice_that_self_dismisses() {
    let raw = InMemoryStore::new();
    raw.put(StorageKey::CompletedSteps.as_str(), r#"["1-1","2-3","retired-step"]"#)
        .await
        .unwrap();
    let reporter = RecordingReporter::new();
    let view = Arc::new(RecordingView::default());
    let mut controller = services(&raw, &reporter).start(outline(), view.clone()).await;

    let rendered = view.take();
    assert!(rendered.contains(&Rendered::Percentage(2, 10, 20)));
    assert_eq!(
        rendered.last(),
        Some(&Rendered::Notice(
            "Welcome back! You're 20% complete (2/10 steps)".into()
        ))
    );

    tokio::time::sleep(Duration::from_secs(9)).await;
    assert_eq!(view.take(), vec![Rendered::NoticeHidden(DismissReason::Timeout)]);

    controller.handle(ViewEvent::NoticeDismissed).await;
    assert!(view.take().is_empty());
}

#[tokio::test(start_paused = true)]
async fn manual_dismiss_beats_timer() {
    let raw = InMemoryStore::new();
    raw.put(StorageKey::CompletedSteps.as_str(), r#"["1-1"]"#)
        .await
        .unwrap();
    let view = Arc::new(RecordingView::default());
    let mut controller = services(&raw, &RecordingReporter::new())
        .start(outline(), view.clone())
        .await;
    view.take();

    controller.handle(ViewEvent::NoticeDismissed).await;
    controller.handle(ViewEvent::NoticeDismissed).await;
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(view.take(), vec![Rendered::NoticeHidden(DismissReason::Manual)]);
}

#[tokio::test]
async fn finished_user_gets_no_notice() {
    let raw = InMemoryStore::new();
    let all: Vec<String> = outline().steps().map(ToString::to_string).collect();
    raw.put(
        StorageKey::CompletedSteps.as_str(),
        &serde_json::to_string(&all).unwrap(),
    )
    .await
    .unwrap();
    let view = Arc::new(RecordingView::default());
    let controller = services(&raw, &RecordingReporter::new())
        .start(outline(), view.clone())
        .await;

    assert!(controller.notice().is_none());
    let rendered = view.take();
    assert!(rendered.contains(&Rendered::Phase("1".into(), PhaseStatus::Ready)));
    assert!(rendered.contains(&Rendered::Percentage(10, 10, 100)));
}

#[tokio::test]
async fn progress_survives_restart_and_reset_clears_it() {
    let raw = InMemoryStore::new();
    let reporter = RecordingReporter::new();
    let view = Arc::new(RecordingView::default());
    let app = services(&raw, &reporter);

    let mut first = app.start(outline(), view.clone()).await;
    for step in ["2-1", "2-2", "2-3", "2-4", "2-5"] {
        first.handle(toggle(step, true)).await;
    }
    first
        .handle(ViewEvent::PhaseConfirmRequested(PhaseKey::new("2")))
        .await;
    let before = first.model().snapshot();
    drop(first);

    let mut second = app.start(outline(), view.clone()).await;
    assert_eq!(second.model().snapshot(), before);
    assert_eq!(
        second.model().phase_status(&PhaseKey::new("2")),
        Some(PhaseStatus::Completed)
    );

    second.handle(ViewEvent::ResetRequested).await;
    assert_eq!(second.model().metrics().completed_steps, 0);
    assert_eq!(raw.get(StorageKey::CompletedSteps.as_str()).await.unwrap(), None);
    assert_eq!(raw.get(StorageKey::CompletedPhases.as_str()).await.unwrap(), None);
}

#[tokio::test]
async fn corrupt_store_starts_empty_and_is_overwritten() {
    let raw = InMemoryStore::new();
    raw.put(StorageKey::CompletedSteps.as_str(), "not-json")
        .await
        .unwrap();
    let view = Arc::new(RecordingView::default());
    let mut controller = services(&raw, &RecordingReporter::new())
        .start(outline(), view.clone())
        .await;

    assert_eq!(controller.model().metrics().completed_steps, 0);
    controller.handle(toggle("1-1", true)).await;
    assert_eq!(
        raw.get(StorageKey::CompletedSteps.as_str())
            .await
            .unwrap()
            .as_deref(),
        Some(r#"["1-1"]"#)
    );
}
