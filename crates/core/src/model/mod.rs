mod ids;
mod metrics;
mod outline;
mod phase;
mod preferences;
mod progress;
mod resumption;

pub use ids::{KeyError, PhaseKey, StepKey};
pub use metrics::{ProgressMetrics, percentage};
pub use outline::{OutlineDraft, OutlineError, PhaseDraft, PhaseOutline, TutorialOutline};
pub use phase::{PhaseStatus, PhaseTransitionError};
pub use preferences::{OsPreference, PreferenceError, Preferences, ThemePreference};
pub use progress::{
    PhaseState, ProgressBoard, ProgressRecord, ProgressSnapshot, StepState, StepUpdate,
};
pub use resumption::{DEFAULT_NOTICE_DURATION_SECS, ResumptionNotice};
