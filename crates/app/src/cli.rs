use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tutorial_core::model::{OsPreference, PhaseKey, StepKey, ThemePreference};

/// Track progress through a multi-phase tutorial from the terminal.
#[derive(Parser, Debug)]
#[command(name = "tutorial-progress", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// SQLite database holding persisted progress.
    #[arg(long = "db", env = "TUTORIAL_DB_URL", default_value = "sqlite://progress.sqlite3")]
    pub db_url: String,

    /// JSON outline listing phases and their steps.
    #[arg(long, env = "TUTORIAL_OUTLINE", value_name = "FILE")]
    pub outline: PathBuf,

    /// Identity attached to completion reports.
    #[arg(long, env = "TUTORIAL_IDENTITY")]
    pub identity: Option<String>,

    /// Endpoint that receives completion reports.
    #[arg(long, env = "TUTORIAL_REPORT_URL")]
    pub report_url: Option<String>,

    #[arg(long, global = true, value_name = "LEVEL", env = "TUTORIAL_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the checklist and overall progress (default).
    Status,
    /// Mark a step as done.
    Check { step: StepKey },
    /// Mark a step as not done.
    Uncheck { step: StepKey },
    /// Confirm a phase whose steps are all done.
    Confirm { phase: PhaseKey },
    /// Forget all progress.
    Reset,
    /// Show or change display preferences.
    Prefs {
        #[arg(long, value_enum)]
        os: Option<OsArg>,
        #[arg(long, value_enum)]
        theme: Option<ThemeArg>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsArg {
    Mac,
    Windows,
}

impl From<OsArg> for OsPreference {
    fn from(value: OsArg) -> Self {
        match value {
            OsArg::Mac => OsPreference::Mac,
            OsArg::Windows => OsPreference::Windows,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for ThemePreference {
    fn from(value: ThemeArg) -> Self {
        match value {
            ThemeArg::Light => ThemePreference::Light,
            ThemeArg::Dark => ThemePreference::Dark,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_check_command() {
        let cli = Cli::try_parse_from([
            "tutorial-progress",
            "--outline",
            "guide.json",
            "check",
            "1-2",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Check {
                step: StepKey::new("1-2")
            })
        );
        assert_eq!(cli.outline, PathBuf::from("guide.json"));
    }

    #[test]
    fn rejects_blank_phase_key() {
        let result = Cli::try_parse_from([
            "tutorial-progress",
            "--outline",
            "guide.json",
            "confirm",
            " ",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_prefs_flags() {
        let cli = Cli::try_parse_from([
            "tutorial-progress",
            "--outline",
            "guide.json",
            "prefs",
            "--os",
            "windows",
            "--theme",
            "light",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Prefs {
                os: Some(OsArg::Windows),
                theme: Some(ThemeArg::Light)
            })
        );
    }
}
