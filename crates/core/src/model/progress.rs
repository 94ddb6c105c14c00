use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::model::ids::{PhaseKey, StepKey};
use crate::model::outline::TutorialOutline;
use crate::model::phase::{PhaseStatus, PhaseTransitionError};

//
// ─── PROGRESS RECORD ──────────────────────────────────────────────────────────
//

/// Durable shape of a user's progress: two independent key sets.
///
/// Keys are not checked against any outline; stale keys are tolerated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub completed_steps: BTreeSet<StepKey>,
    pub completed_phases: BTreeSet<PhaseKey>,
}

impl ProgressRecord {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.completed_steps.is_empty() && self.completed_phases.is_empty()
    }
}

//
// ─── SNAPSHOT ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepState {
    pub key: StepKey,
    pub phase: PhaseKey,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseState {
    pub key: PhaseKey,
    pub status: PhaseStatus,
    pub total_steps: usize,
    pub completed_steps: usize,
}

/// Read-only view of every known step and phase, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub steps: Vec<StepState>,
    pub phases: Vec<PhaseState>,
}

impl ProgressSnapshot {
    #[must_use]
    pub fn phase(&self, key: &PhaseKey) -> Option<&PhaseState> {
        self.phases.iter().find(|phase| phase.key == *key)
    }

    #[must_use]
    pub fn step(&self, key: &StepKey) -> Option<&StepState> {
        self.steps.iter().find(|step| step.key == *key)
    }
}

//
// ─── BOARD ────────────────────────────────────────────────────────────────────
//

/// Result of applying a step toggle to a known step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepUpdate {
    pub step: StepKey,
    pub completed: bool,
    pub phase: PhaseKey,
    pub previous_status: PhaseStatus,
    pub status: PhaseStatus,
}

impl StepUpdate {
    #[must_use]
    pub fn phase_status_changed(&self) -> bool {
        self.previous_status != self.status
    }
}

/// In-memory step flags and phase statuses for one session.
///
/// Pure state: no persistence, no rendering. Keys from the loaded record that
/// the outline does not know are carried along untouched so they survive the
/// next write, but they never count toward any metric.
#[derive(Debug, Clone)]
pub struct ProgressBoard {
    outline: TutorialOutline,
    completed_steps: BTreeSet<StepKey>,
    statuses: HashMap<PhaseKey, PhaseStatus>,
    stale_steps: BTreeSet<StepKey>,
    stale_phases: BTreeSet<PhaseKey>,
}

impl ProgressBoard {
    /// A board with nothing completed.
    #[must_use]
    pub fn new(outline: TutorialOutline) -> Self {
        Self::from_record(outline, &ProgressRecord::default())
    }

    /// Build a board by intersecting a stored record with the outline.
    ///
    /// A known phase in `completed_phases` is restored as `Completed`; every
    /// other phase starts `Ready` or `NotStarted` from its restored steps.
    #[must_use]
    pub fn from_record(outline: TutorialOutline, record: &ProgressRecord) -> Self {
        let known_steps: BTreeSet<&StepKey> = outline.steps().collect();
        let (completed_steps, stale_steps): (BTreeSet<_>, BTreeSet<_>) = record
            .completed_steps
            .iter()
            .cloned()
            .partition(|key| known_steps.contains(key));

        let stale_phases = record
            .completed_phases
            .iter()
            .filter(|key| outline.phase(key).is_none())
            .cloned()
            .collect();

        let mut board = Self {
            outline,
            completed_steps,
            statuses: HashMap::new(),
            stale_steps,
            stale_phases,
        };

        let keys: Vec<PhaseKey> = board
            .outline
            .phases()
            .iter()
            .map(|phase| phase.key().clone())
            .collect();
        for key in keys {
            let status = if record.completed_phases.contains(&key) {
                PhaseStatus::Completed
            } else {
                PhaseStatus::NotStarted.evaluate(board.all_steps_checked(&key))
            };
            board.statuses.insert(key, status);
        }

        board
    }

    #[must_use]
    pub fn outline(&self) -> &TutorialOutline {
        &self.outline
    }

    #[must_use]
    pub fn is_step_completed(&self, key: &StepKey) -> bool {
        self.completed_steps.contains(key)
    }

    #[must_use]
    pub fn phase_status(&self, key: &PhaseKey) -> Option<PhaseStatus> {
        self.statuses.get(key).copied()
    }

    /// Set a step's flag and re-evaluate its phase.
    ///
    /// Returns `None` when the step is not part of the outline.
    pub fn set_step(&mut self, key: &StepKey, completed: bool) -> Option<StepUpdate> {
        let phase = self.outline.phase_of(key)?.key().clone();

        if completed {
            self.completed_steps.insert(key.clone());
        } else {
            self.completed_steps.remove(key);
        }

        let all_checked = self.all_steps_checked(&phase);
        let previous_status = self.statuses.get(&phase).copied().unwrap_or_default();
        let status = previous_status.evaluate(all_checked);
        self.statuses.insert(phase.clone(), status);

        Some(StepUpdate {
            step: key.clone(),
            completed,
            phase,
            previous_status,
            status,
        })
    }

    /// Confirm a phase milestone.
    ///
    /// # Errors
    ///
    /// Returns `PhaseTransitionError::UnknownPhase` for keys outside the
    /// outline, otherwise whatever `PhaseStatus::confirm` rejects.
    pub fn confirm_phase(&mut self, key: &PhaseKey) -> Result<(), PhaseTransitionError> {
        let status = self
            .statuses
            .get_mut(key)
            .ok_or(PhaseTransitionError::UnknownPhase)?;
        *status = status.confirm()?;
        Ok(())
    }

    /// Forget all progress, including stale keys.
    pub fn reset(&mut self) {
        self.completed_steps.clear();
        self.stale_steps.clear();
        self.stale_phases.clear();
        for status in self.statuses.values_mut() {
            *status = PhaseStatus::NotStarted;
        }
    }

    /// Completed step keys to persist, stale keys included.
    #[must_use]
    pub fn completed_step_keys(&self) -> BTreeSet<StepKey> {
        self.completed_steps
            .union(&self.stale_steps)
            .cloned()
            .collect()
    }

    /// Completed phase keys to persist, stale keys included.
    #[must_use]
    pub fn completed_phase_keys(&self) -> BTreeSet<PhaseKey> {
        self.statuses
            .iter()
            .filter(|(_, status)| status.is_completed())
            .map(|(key, _)| key.clone())
            .chain(self.stale_phases.iter().cloned())
            .collect()
    }

    #[must_use]
    pub fn record(&self) -> ProgressRecord {
        ProgressRecord {
            completed_steps: self.completed_step_keys(),
            completed_phases: self.completed_phase_keys(),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        let mut snapshot = ProgressSnapshot::default();
        for phase in self.outline.phases() {
            let mut done = 0;
            for step in phase.steps() {
                let completed = self.completed_steps.contains(step);
                if completed {
                    done += 1;
                }
                snapshot.steps.push(StepState {
                    key: step.clone(),
                    phase: phase.key().clone(),
                    completed,
                });
            }
            snapshot.phases.push(PhaseState {
                key: phase.key().clone(),
                status: self.phase_status(phase.key()).unwrap_or_default(),
                total_steps: phase.steps().len(),
                completed_steps: done,
            });
        }
        snapshot
    }

    // A phase with no steps is never ready.
    fn all_steps_checked(&self, phase: &PhaseKey) -> bool {
        self.outline.phase(phase).is_some_and(|outline| {
            !outline.steps().is_empty()
                && outline
                    .steps()
                    .iter()
                    .all(|step| self.completed_steps.contains(step))
        })
    }
}
