use chrono::{DateTime, Duration, Utc};

use crate::model::metrics::ProgressMetrics;

/// Default lifetime of the welcome-back notice.
pub const DEFAULT_NOTICE_DURATION_SECS: i64 = 8;

/// One-time summary presented to a returning, partially complete user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumptionNotice {
    percentage: u8,
    completed_steps: usize,
    total_steps: usize,
    shown_at: DateTime<Utc>,
    dismiss_at: DateTime<Utc>,
}

impl ResumptionNotice {
    /// Decide whether a returning user gets a notice.
    ///
    /// No notice when nothing is completed or when the percentage has reached
    /// 100.
    #[must_use]
    pub fn for_metrics(
        metrics: &ProgressMetrics,
        shown_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Option<Self> {
        if metrics.completed_steps == 0 || metrics.percentage >= 100 {
            return None;
        }
        Some(Self {
            percentage: metrics.percentage,
            completed_steps: metrics.completed_steps,
            total_steps: metrics.total_steps,
            shown_at,
            dismiss_at: shown_at + lifetime,
        })
    }

    #[must_use]
    pub fn percentage(&self) -> u8 {
        self.percentage
    }

    #[must_use]
    pub fn completed_steps(&self) -> usize {
        self.completed_steps
    }

    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    #[must_use]
    pub fn shown_at(&self) -> DateTime<Utc> {
        self.shown_at
    }

    /// When the notice dismisses itself if the user has not.
    #[must_use]
    pub fn dismiss_at(&self) -> DateTime<Utc> {
        self.dismiss_at
    }

    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "Welcome back! You're {}% complete ({}/{} steps)",
            self.percentage, self.completed_steps, self.total_steps
        )
    }
}
