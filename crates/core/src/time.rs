use chrono::{DateTime, Duration, Utc};

/// Where notice timestamps come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    /// Real wall-clock time.
    #[default]
    System,
    /// Always reports the same instant.
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }
}

// 2023-11-14T22:13:20Z
const FIXED_TEST_SECS: i64 = 1_700_000_000;

/// Deterministic instant shared by tests across the workspace.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH + Duration::seconds(FIXED_TEST_SECS)
}

#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_never_moves() {
        let clock = fixed_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn system_clock_is_default_and_live() {
        let before = Utc::now();
        let clock = Clock::default();
        assert_eq!(clock, Clock::system());
        assert!(clock.now() >= before);
    }
}
