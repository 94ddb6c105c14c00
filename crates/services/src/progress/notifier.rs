use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;
use tutorial_core::Clock;
use tutorial_core::model::{DEFAULT_NOTICE_DURATION_SECS, ProgressMetrics, ResumptionNotice};

use super::view::{DismissReason, ProgressView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifierConfig {
    /// How long the notice stays up without a manual dismiss.
    pub lifetime: Duration,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            lifetime: Duration::from_secs(DEFAULT_NOTICE_DURATION_SECS.unsigned_abs()),
        }
    }
}

/// Decides, once per startup, whether to greet a returning user.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResumptionNotifier {
    clock: Clock,
    config: NotifierConfig,
}

impl ResumptionNotifier {
    #[must_use]
    pub fn new(clock: Clock, config: NotifierConfig) -> Self {
        Self { clock, config }
    }

    #[must_use]
    pub fn config(&self) -> NotifierConfig {
        self.config
    }

    /// The notice to show for these metrics, if any.
    #[must_use]
    pub fn evaluate(&self, metrics: &ProgressMetrics) -> Option<ResumptionNotice> {
        let lifetime = chrono::Duration::from_std(self.config.lifetime)
            .unwrap_or_else(|_| chrono::Duration::seconds(DEFAULT_NOTICE_DURATION_SECS));
        ResumptionNotice::for_metrics(metrics, self.clock.now(), lifetime)
    }

    /// Show the notice (if any) and arm its self-dismiss timer.
    ///
    /// Without a tokio runtime no timer is armed; the view can still use
    /// `ResumptionNotice::dismiss_at`.
    pub fn present(
        &self,
        metrics: &ProgressMetrics,
        view: Arc<dyn ProgressView>,
    ) -> Option<NoticeHandle> {
        let notice = self.evaluate(metrics)?;
        view.show_resumption_notice(&notice);

        let inner = Arc::new(NoticeInner {
            dismissed: AtomicBool::new(false),
            view,
        });

        let timer = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let lifetime = self.config.lifetime;
                let inner = Arc::clone(&inner);
                Some(runtime.spawn(async move {
                    tokio::time::sleep(lifetime).await;
                    inner.finish(DismissReason::Timeout);
                }))
            }
            Err(_) => {
                debug!("no runtime; resumption notice will not self-dismiss");
                None
            }
        };

        Some(NoticeHandle {
            notice,
            inner,
            timer: Mutex::new(timer),
        })
    }
}

struct NoticeInner {
    dismissed: AtomicBool,
    view: Arc<dyn ProgressView>,
}

impl NoticeInner {
    // First caller wins; later calls are no-ops.
    fn finish(&self, reason: DismissReason) -> bool {
        if self.dismissed.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.view.hide_resumption_notice(reason);
        true
    }
}

/// A live resumption notice.
///
/// Dropping the handle leaves the timer armed so the notice still goes away.
pub struct NoticeHandle {
    notice: ResumptionNotice,
    inner: Arc<NoticeInner>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl NoticeHandle {
    #[must_use]
    pub fn notice(&self) -> &ResumptionNotice {
        &self.notice
    }

    #[must_use]
    pub fn is_dismissed(&self) -> bool {
        self.inner.dismissed.load(Ordering::SeqCst)
    }

    /// Dismiss manually and cancel the pending timer.
    ///
    /// Returns `true` only for the call that actually hid the notice.
    pub fn dismiss(&self) -> bool {
        if let Ok(mut timer) = self.timer.lock() {
            if let Some(handle) = timer.take() {
                handle.abort();
            }
        }
        self.inner.finish(DismissReason::Manual)
    }
}

impl fmt::Debug for NoticeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoticeHandle")
            .field("notice", &self.notice)
            .field("dismissed", &self.is_dismissed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutorial_core::model::{PhaseKey, PhaseStatus, StepKey};
    use tutorial_core::time::fixed_clock;

    #[derive(Default)]
    struct NoticeView {
        shown: Mutex<Vec<String>>,
        hidden: Mutex<Vec<DismissReason>>,
    }

    impl NoticeView {
        fn hidden(&self) -> Vec<DismissReason> {
            self.hidden.lock().unwrap().clone()
        }
    }

    impl ProgressView for NoticeView {
        fn render_percentage(&self, _metrics: &ProgressMetrics) {}
        fn render_step(&self, _step: &StepKey, _completed: bool) {}
        fn render_phase_status(&self, _phase: &PhaseKey, _status: PhaseStatus) {}
        fn show_resumption_notice(&self, notice: &ResumptionNotice) {
            self.shown.lock().unwrap().push(notice.message());
        }
        fn hide_resumption_notice(&self, reason: DismissReason) {
            self.hidden.lock().unwrap().push(reason);
        }
        fn show_celebration(&self, _phase: &PhaseKey) {}
    }

    fn notifier() -> ResumptionNotifier {
        ResumptionNotifier::new(fixed_clock(), NotifierConfig::default())
    }

    #[test]
    fn suppressed_for_fresh_and_finished_users() {
        let view = Arc::new(NoticeView::default());
        let fresh = ProgressMetrics::from_counts(0, 10);
        let done = ProgressMetrics::from_counts(10, 10);
        assert!(notifier().present(&fresh, view.clone()).is_none());
        assert!(notifier().present(&done, view.clone()).is_none());
        assert!(view.shown.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn self_dismisses_after_lifetime() {
        let view = Arc::new(NoticeView::default());
        let metrics = ProgressMetrics::from_counts(2, 10);
        let handle = notifier().present(&metrics, view.clone()).unwrap();

        assert_eq!(
            view.shown.lock().unwrap().as_slice(),
            ["Welcome back! You're 20% complete (2/10 steps)"]
        );

        tokio::time::sleep(Duration::from_secs(7)).await;
        assert!(!handle.is_dismissed());
        assert!(view.hidden().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(handle.is_dismissed());
        assert_eq!(view.hidden(), vec![DismissReason::Timeout]);

        assert!(!handle.dismiss());
        assert_eq!(view.hidden(), vec![DismissReason::Timeout]);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_dismiss_cancels_timer() {
        let view = Arc::new(NoticeView::default());
        let metrics = ProgressMetrics::from_counts(3, 10);
        let handle = notifier().present(&metrics, view.clone()).unwrap();

        assert!(handle.dismiss());
        assert!(!handle.dismiss());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(view.hidden(), vec![DismissReason::Manual]);
    }

    #[test]
    fn without_runtime_notice_is_shown_but_not_timed() {
        let view = Arc::new(NoticeView::default());
        let metrics = ProgressMetrics::from_counts(1, 3);
        let handle = notifier().present(&metrics, view.clone()).unwrap();

        assert_eq!(handle.notice().percentage(), 33);
        assert!(handle.dismiss());
        assert_eq!(view.hidden(), vec![DismissReason::Manual]);
    }
}
