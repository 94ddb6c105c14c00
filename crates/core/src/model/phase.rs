use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Why a confirm action did not move a phase to `Completed`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PhaseTransitionError {
    #[error("phase is not ready: every step must be checked first")]
    NotReady,

    #[error("phase is already completed")]
    AlreadyCompleted,

    #[error("unknown phase")]
    UnknownPhase,
}

//
// ─── PHASE STATUS ─────────────────────────────────────────────────────────────
//

/// Lifecycle of a phase.
///
/// - `NotStarted`: at least one step is unchecked (or the phase has no steps)
/// - `Ready`: every step is checked, awaiting explicit confirmation
/// - `Completed`: confirmed while `Ready`; terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    #[default]
    NotStarted,
    Ready,
    Completed,
}

impl PhaseStatus {
    /// Re-evaluate readiness after a step in the phase was toggled.
    ///
    /// `Completed` never changes here.
    #[must_use]
    pub fn evaluate(self, all_steps_checked: bool) -> Self {
        match (self, all_steps_checked) {
            (Self::Completed, _) => Self::Completed,
            (_, true) => Self::Ready,
            (_, false) => Self::NotStarted,
        }
    }

    /// Apply the user's confirm action.
    ///
    /// # Errors
    ///
    /// Returns `PhaseTransitionError::NotReady` from `NotStarted` and
    /// `PhaseTransitionError::AlreadyCompleted` from `Completed`.
    pub fn confirm(self) -> Result<Self, PhaseTransitionError> {
        match self {
            Self::Ready => Ok(Self::Completed),
            Self::NotStarted => Err(PhaseTransitionError::NotReady),
            Self::Completed => Err(PhaseTransitionError::AlreadyCompleted),
        }
    }

    #[must_use]
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Ready => "ready",
            Self::Completed => "completed",
        }
    }
}
