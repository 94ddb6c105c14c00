use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PreferenceError {
    #[error("unknown OS preference: {0}")]
    UnknownOs(String),

    #[error("unknown theme preference: {0}")]
    UnknownTheme(String),
}

/// Which platform's instructions the guide shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OsPreference {
    #[default]
    Mac,
    Windows,
}

impl OsPreference {
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Mac => "mac",
            Self::Windows => "windows",
        }
    }
}

impl FromStr for OsPreference {
    type Err = PreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mac" => Ok(Self::Mac),
            "windows" => Ok(Self::Windows),
            other => Err(PreferenceError::UnknownOs(other.to_owned())),
        }
    }
}

impl fmt::Display for OsPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemePreference {
    Light,
    #[default]
    Dark,
}

impl ThemePreference {
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl FromStr for ThemePreference {
    type Err = PreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(PreferenceError::UnknownTheme(other.to_owned())),
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Display preferences persisted next to progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Preferences {
    pub os: OsPreference,
    pub theme: ThemePreference,
}
