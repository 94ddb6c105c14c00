mod cli;
mod db;
mod logging;
mod outline;
mod terminal_view;

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use services::{
    AppServices, Clock, CompletionReporter, HttpCompletionReporter, HttpReporterConfig,
    NoopReporter, NotifierConfig, ProgressController, StaticIdentity, ViewEvent,
};
use tracing::{error, info, warn};
use tutorial_core::model::PhaseStatus;

use crate::cli::{Cli, Command};
use crate::logging::LoggingConfig;
use crate::terminal_view::TerminalView;

/// Upper bound on how long exit waits for completion reports.
const REPORT_FLUSH_LIMIT: Duration = Duration::from_secs(3);

fn http_reporter(url: Option<&str>) -> Option<Arc<HttpCompletionReporter>> {
    let endpoint = url.map(str::trim).filter(|url| !url.is_empty())?;
    Some(Arc::new(HttpCompletionReporter::new(HttpReporterConfig {
        endpoint: endpoint.to_owned(),
    })))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let command = cli.command.unwrap_or(Command::Status);

    let db_url = db::normalize_sqlite_url(&cli.db_url);
    db::prepare_sqlite_file(&db_url)?;
    let outline = outline::load_outline(&cli.outline)?;

    let http = http_reporter(cli.report_url.as_deref());
    let reporter: Arc<dyn CompletionReporter> = match &http {
        Some(http) => Arc::clone(http) as Arc<dyn CompletionReporter>,
        None => Arc::new(NoopReporter),
    };

    let services = AppServices::new_sqlite(
        &db_url,
        Clock::system(),
        NotifierConfig::default(),
        reporter,
        Arc::new(StaticIdentity::new(cli.identity)),
    )
    .await
    .with_context(|| format!("opening {db_url}"))?;
    info!(db = %db_url, phases = outline.phases().len(), "progress store ready");

    if let Command::Prefs { os, theme } = command {
        let prefs = services.preferences();
        if let Some(os) = os {
            prefs.set_os(os.into()).await;
        }
        if let Some(theme) = theme {
            prefs.set_theme(theme.into()).await;
        }
        let current = prefs.load().await;
        println!("os: {}", current.os);
        println!("theme: {}", current.theme);
        return Ok(());
    }

    let view = Arc::new(TerminalView::new(
        std::io::stdout(),
        command == Command::Status,
    ));
    let mut controller = services.start(outline, view.clone()).await;
    view.mark_started();
    let outcome = dispatch(&mut controller, command, &mut std::io::stdout()).await;

    // The runtime shuts down when `main` returns; give reports a chance first.
    if let Some(http) = http {
        if !http.flush(REPORT_FLUSH_LIMIT).await {
            warn!(endpoint = http.endpoint(), "completion report still in flight at exit");
        }
    }
    outcome
}

async fn dispatch(
    controller: &mut ProgressController,
    command: Command,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        Command::Status | Command::Prefs { .. } => Ok(()),
        Command::Check { step } | Command::Uncheck { step }
            if controller.model().outline().phase_of(&step).is_none() =>
        {
            bail!("unknown step: {step}")
        }
        Command::Check { step } => {
            controller
                .handle(ViewEvent::StepToggled {
                    step,
                    completed: true,
                })
                .await;
            Ok(())
        }
        Command::Uncheck { step } => {
            controller
                .handle(ViewEvent::StepToggled {
                    step,
                    completed: false,
                })
                .await;
            Ok(())
        }
        Command::Confirm { phase } => match controller.model().phase_status(&phase) {
            None => bail!("unknown phase: {phase}"),
            Some(PhaseStatus::NotStarted) => bail!("phase {phase} still has unchecked steps"),
            Some(PhaseStatus::Completed) => {
                writeln!(out, "phase {phase} is already complete")?;
                Ok(())
            }
            Some(PhaseStatus::Ready) => {
                controller
                    .handle(ViewEvent::PhaseConfirmRequested(phase))
                    .await;
                Ok(())
            }
        },
        Command::Reset => {
            controller.handle(ViewEvent::ResetRequested).await;
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(LoggingConfig::from_args(
        cli.log_level.as_deref(),
        cli.log_json,
    ));

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use services::RecordingReporter;
    use tutorial_core::model::{PhaseKey, StepKey};

    async fn controller(reporter: &RecordingReporter) -> ProgressController {
        let services = AppServices::in_memory(
            Clock::system(),
            NotifierConfig::default(),
            Arc::new(reporter.clone()),
            Arc::new(StaticIdentity::new(Some("ada@example.com".into()))),
        );
        let outline =
            outline::parse_outline(r#"{"phases":[{"key":"1","steps":["1-1","1-2"]}]}"#).unwrap();
        services
            .start(outline, Arc::new(TerminalView::new(std::io::sink(), false)))
            .await
    }

    async fn run_command(
        controller: &mut ProgressController,
        command: Command,
    ) -> (anyhow::Result<()>, String) {
        let mut out = Vec::new();
        let result = dispatch(controller, command, &mut out).await;
        (result, String::from_utf8(out).unwrap())
    }

    fn check(step: &str) -> Command {
        Command::Check {
            step: StepKey::new(step),
        }
    }

    fn confirm(phase: &str) -> Command {
        Command::Confirm {
            phase: PhaseKey::new(phase),
        }
    }

    #[tokio::test]
    async fn unknown_step_is_rejected() {
        let mut controller = controller(&RecordingReporter::new()).await;
        let (result, _) = run_command(&mut controller, check("9-9")).await;
        assert_eq!(result.unwrap_err().to_string(), "unknown step: 9-9");

        let uncheck = Command::Uncheck {
            step: StepKey::new("9-9"),
        };
        assert!(run_command(&mut controller, uncheck).await.0.is_err());
        assert_eq!(controller.model().metrics().completed_steps, 0);
    }

    #[tokio::test]
    async fn unknown_phase_is_rejected() {
        let mut controller = controller(&RecordingReporter::new()).await;
        let (result, _) = run_command(&mut controller, confirm("7")).await;
        assert_eq!(result.unwrap_err().to_string(), "unknown phase: 7");
    }

    #[tokio::test]
    async fn confirm_with_unchecked_steps_is_rejected() {
        let reporter = RecordingReporter::new();
        let mut controller = controller(&reporter).await;
        run_command(&mut controller, check("1-1")).await.0.unwrap();

        let (result, _) = run_command(&mut controller, confirm("1")).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "phase 1 still has unchecked steps"
        );
        assert!(reporter.events().is_empty());
    }

    #[tokio::test]
    async fn confirm_twice_reports_once_and_says_already_complete() {
        let reporter = RecordingReporter::new();
        let mut controller = controller(&reporter).await;
        for step in ["1-1", "1-2"] {
            run_command(&mut controller, check(step)).await.0.unwrap();
        }

        let (result, out) = run_command(&mut controller, confirm("1")).await;
        result.unwrap();
        assert!(out.is_empty());
        assert_eq!(
            controller.model().phase_status(&PhaseKey::new("1")),
            Some(PhaseStatus::Completed)
        );

        let (result, out) = run_command(&mut controller, confirm("1")).await;
        result.unwrap();
        assert_eq!(out, "phase 1 is already complete\n");
        assert_eq!(reporter.events().len(), 1);
    }

    #[tokio::test]
    async fn uncheck_and_reset_update_progress() {
        let mut controller = controller(&RecordingReporter::new()).await;
        run_command(&mut controller, check("1-1")).await.0.unwrap();
        run_command(&mut controller, check("1-2")).await.0.unwrap();

        let uncheck = Command::Uncheck {
            step: StepKey::new("1-2"),
        };
        run_command(&mut controller, uncheck).await.0.unwrap();
        assert_eq!(controller.model().metrics().completed_steps, 1);

        run_command(&mut controller, Command::Reset).await.0.unwrap();
        assert_eq!(controller.model().metrics().completed_steps, 0);
    }

    #[test]
    fn blank_report_url_means_no_http_reporter() {
        assert!(http_reporter(None).is_none());
        assert!(http_reporter(Some("  ")).is_none());
        let http = http_reporter(Some(" http://127.0.0.1:9/report ")).unwrap();
        assert_eq!(http.endpoint(), "http://127.0.0.1:9/report");
    }
}
