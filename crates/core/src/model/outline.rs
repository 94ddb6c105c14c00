use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{PhaseKey, StepKey};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OutlineError {
    #[error("phase key must not be empty")]
    EmptyPhaseKey,

    #[error("step key in phase {phase} must not be empty")]
    EmptyStepKey { phase: PhaseKey },

    #[error("duplicate phase key: {0}")]
    DuplicatePhase(PhaseKey),

    #[error("step {step} appears in more than one phase")]
    DuplicateStep { step: StepKey },
}

//
// ─── DRAFT ────────────────────────────────────────────────────────────────────
//

/// Unvalidated outline as enumerated by a view adapter or read from a file.
///
/// The JSON shape is `{"phases":[{"key":"1","steps":["1-1","1-2"]}]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineDraft {
    pub phases: Vec<PhaseDraft>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDraft {
    pub key: String,
    #[serde(default)]
    pub steps: Vec<String>,
}

impl OutlineDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a phase with its steps in document order.
    #[must_use]
    pub fn phase<I, S>(mut self, key: impl Into<String>, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.phases.push(PhaseDraft {
            key: key.into(),
            steps: steps.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Validate the draft into an immutable outline.
    ///
    /// # Errors
    ///
    /// Returns `OutlineError` if a key is blank, a phase key repeats, or a step
    /// is listed under more than one phase.
    pub fn validate(self) -> Result<TutorialOutline, OutlineError> {
        let mut seen_phases = HashSet::new();
        let mut seen_steps = HashSet::new();
        let mut phases = Vec::with_capacity(self.phases.len());

        for draft in self.phases {
            let key = draft.key.trim();
            if key.is_empty() {
                return Err(OutlineError::EmptyPhaseKey);
            }
            let key = PhaseKey::new(key);
            if !seen_phases.insert(key.clone()) {
                return Err(OutlineError::DuplicatePhase(key));
            }

            let mut steps = Vec::with_capacity(draft.steps.len());
            for raw in draft.steps {
                let raw = raw.trim();
                if raw.is_empty() {
                    return Err(OutlineError::EmptyStepKey { phase: key });
                }
                let step = StepKey::new(raw);
                if !seen_steps.insert(step.clone()) {
                    return Err(OutlineError::DuplicateStep { step });
                }
                steps.push(step);
            }

            phases.push(PhaseOutline { key, steps });
        }

        Ok(TutorialOutline { phases })
    }
}

//
// ─── OUTLINE ──────────────────────────────────────────────────────────────────
//

/// A phase and the ordered steps it contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseOutline {
    key: PhaseKey,
    steps: Vec<StepKey>,
}

impl PhaseOutline {
    #[must_use]
    pub fn key(&self) -> &PhaseKey {
        &self.key
    }

    #[must_use]
    pub fn steps(&self) -> &[StepKey] {
        &self.steps
    }
}

/// The fixed set of known phases and steps for one session.
///
/// Every step belongs to exactly one phase; keys are unique.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TutorialOutline {
    phases: Vec<PhaseOutline>,
}

impl TutorialOutline {
    #[must_use]
    pub fn phases(&self) -> &[PhaseOutline] {
        &self.phases
    }

    #[must_use]
    pub fn phase(&self, key: &PhaseKey) -> Option<&PhaseOutline> {
        self.phases.iter().find(|phase| phase.key == *key)
    }

    /// The phase a step belongs to.
    #[must_use]
    pub fn phase_of(&self, step: &StepKey) -> Option<&PhaseOutline> {
        self.phases.iter().find(|phase| phase.steps.contains(step))
    }

    /// All steps in document order.
    pub fn steps(&self) -> impl Iterator<Item = &StepKey> {
        self.phases.iter().flat_map(|phase| phase.steps.iter())
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.phases.iter().map(|phase| phase.steps.len()).sum()
    }
}
