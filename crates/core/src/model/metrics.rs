use crate::model::progress::ProgressSnapshot;

/// Derived progress figures shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressMetrics {
    pub total_steps: usize,
    pub completed_steps: usize,
    pub percentage: u8,
}

impl ProgressMetrics {
    /// Count known steps and the ones flagged completed.
    #[must_use]
    pub fn from_snapshot(snapshot: &ProgressSnapshot) -> Self {
        let total_steps = snapshot.steps.len();
        let completed_steps = snapshot.steps.iter().filter(|step| step.completed).count();
        Self::from_counts(completed_steps, total_steps)
    }

    /// Build metrics from raw counts; `completed` is clamped to `total`.
    #[must_use]
    pub fn from_counts(completed: usize, total: usize) -> Self {
        let completed = completed.min(total);
        Self {
            total_steps: total,
            completed_steps: completed,
            percentage: percentage(completed, total),
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total_steps > 0 && self.completed_steps == self.total_steps
    }
}

/// `round(100 * completed / total)` with halves rounded up, `0` when empty.
#[must_use]
pub fn percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total) as u128;
    let total = total as u128;
    // floor((200c + t) / 2t) == floor(100c/t + 1/2)
    let pct = (200 * completed + total) / (2 * total);
    u8::try_from(pct).unwrap_or(100)
}
