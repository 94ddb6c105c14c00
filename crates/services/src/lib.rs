#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod preferences_service;
pub mod progress;
pub mod reporting;

pub use tutorial_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, ReportError};
pub use preferences_service::PreferencesService;
pub use progress::{
    DismissReason, NoticeHandle, NotifierConfig, PhaseCompletionEvaluator, ProgressController,
    ProgressModel, ProgressView, ResumptionNotifier, ViewEvent,
};
pub use reporting::{
    CompletionEvent, CompletionReporter, HttpCompletionReporter, HttpReporterConfig,
    IdentityProvider, NoopReporter, RecordingReporter, StaticIdentity,
};
