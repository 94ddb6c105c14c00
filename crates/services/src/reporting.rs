//! Completion reporting and identity collaborators.
//!
//! Reports are fire-and-forget. Nothing returned from a reporter can change
//! the outcome of a phase transition.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::debug;
use tutorial_core::model::PhaseKey;

use crate::error::ReportError;

/// Event name sent for a confirmed phase.
pub const PHASE_COMPLETED: &str = "phase_completed";

/// A phase completion to hand to an external collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionEvent {
    pub identity: String,
    pub event: &'static str,
    pub phase: PhaseKey,
}

impl CompletionEvent {
    #[must_use]
    pub fn phase_completed(identity: impl Into<String>, phase: PhaseKey) -> Self {
        Self {
            identity: identity.into(),
            event: PHASE_COMPLETED,
            phase,
        }
    }
}

pub trait CompletionReporter: Send + Sync {
    /// Hand off an event. Must not block on delivery.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the event could not even be handed off.
    /// Callers log and ignore it.
    fn report(&self, event: &CompletionEvent) -> Result<(), ReportError>;
}

/// Supplies the current user's identity, if any. Treated as opaque.
pub trait IdentityProvider: Send + Sync {
    fn identity(&self) -> Option<String>;
}

/// Fixed identity, typically from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(Option<String>);

impl StaticIdentity {
    #[must_use]
    pub fn new(identity: Option<String>) -> Self {
        Self(identity.filter(|value| !value.trim().is_empty()))
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl IdentityProvider for StaticIdentity {
    fn identity(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl CompletionReporter for NoopReporter {
    fn report(&self, _event: &CompletionEvent) -> Result<(), ReportError> {
        Ok(())
    }
}

/// Keeps every event in memory; useful for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    events: Arc<Mutex<Vec<CompletionEvent>>>,
}

impl RecordingReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<CompletionEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl CompletionReporter for RecordingReporter {
    fn report(&self, event: &CompletionEvent) -> Result<(), ReportError> {
        let mut guard = self.events.lock().map_err(|_| ReportError::Poisoned)?;
        guard.push(event.clone());
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct HttpReporterConfig {
    pub endpoint: String,
}

#[derive(Serialize)]
struct ReportPayload<'a> {
    email: &'a str,
    status: &'a str,
    phase: &'a str,
}

/// POSTs each event as JSON on a background task.
///
/// Sends in flight are tracked so a short-lived process can `flush` them
/// before its runtime shuts down.
#[derive(Clone)]
pub struct HttpCompletionReporter {
    client: Client,
    config: HttpReporterConfig,
    pending: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl HttpCompletionReporter {
    #[must_use]
    pub fn new(config: HttpReporterConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    #[must_use]
    pub fn with_client(config: HttpReporterConfig, client: Client) -> Self {
        Self {
            client,
            config,
            pending: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Wait up to `limit` for every report handed off so far.
    ///
    /// Returns `false` if some sends were still running at the deadline;
    /// those keep running detached.
    pub async fn flush(&self, limit: Duration) -> bool {
        let handles = match self.pending.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => return false,
        };
        if handles.is_empty() {
            return true;
        }
        let count = handles.len();
        let drained = tokio::time::timeout(limit, async move {
            for handle in handles {
                let _ = handle.await;
            }
        })
        .await
        .is_ok();
        debug!(count, drained, "flushed completion reports");
        drained
    }
}

async fn deliver(request: RequestBuilder) -> Result<(), ReportError> {
    request.send().await?.error_for_status()?;
    Ok(())
}

impl CompletionReporter for HttpCompletionReporter {
    fn report(&self, event: &CompletionEvent) -> Result<(), ReportError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ReportError::NoRuntime)?;
        let mut pending = self.pending.lock().map_err(|_| ReportError::Poisoned)?;
        let request = self.client.post(&self.config.endpoint).json(&ReportPayload {
            email: &event.identity,
            status: event.event,
            phase: event.phase.as_str(),
        });
        let phase = event.phase.clone();

        pending.retain(|handle| !handle.is_finished());
        pending.push(runtime.spawn(async move {
            match deliver(request).await {
                Ok(()) => debug!(%phase, "completion report delivered"),
                Err(err) => debug!(%phase, error = %err, "completion report failed"),
            }
        }));
        Ok(())
    }
}
