use std::fmt;

/// The four independent entries of the persisted layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Os,
    Theme,
    CompletedSteps,
    CompletedPhases,
}

impl StorageKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Os => "tutorial-guide.os",
            Self::Theme => "tutorial-guide.theme",
            Self::CompletedSteps => "tutorial-guide.progress",
            Self::CompletedPhases => "tutorial-guide.completed-phases",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
