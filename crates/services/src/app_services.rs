use std::sync::Arc;

use storage::ProgressStore;
use storage::repository::Storage;
use tutorial_core::model::TutorialOutline;

use crate::Clock;
use crate::error::AppServicesError;
use crate::preferences_service::PreferencesService;
use crate::progress::{
    NotifierConfig, PhaseCompletionEvaluator, ProgressController, ProgressModel, ProgressView,
    ResumptionNotifier,
};
use crate::reporting::{CompletionReporter, IdentityProvider};

/// Assembles app-facing services around one state store.
#[derive(Clone)]
pub struct AppServices {
    store: ProgressStore,
    preferences: Arc<PreferencesService>,
    evaluator: PhaseCompletionEvaluator,
    notifier: ResumptionNotifier,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        notifier: NotifierConfig,
        reporter: Arc<dyn CompletionReporter>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(
            &storage, clock, notifier, reporter, identity,
        ))
    }

    /// Build services over a throwaway in-memory store.
    #[must_use]
    pub fn in_memory(
        clock: Clock,
        notifier: NotifierConfig,
        reporter: Arc<dyn CompletionReporter>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, notifier, reporter, identity)
    }

    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        clock: Clock,
        notifier: NotifierConfig,
        reporter: Arc<dyn CompletionReporter>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let store = ProgressStore::new(Arc::clone(&storage.state));
        Self {
            preferences: Arc::new(PreferencesService::new(store.clone())),
            evaluator: PhaseCompletionEvaluator::new(reporter, identity),
            notifier: ResumptionNotifier::new(clock, notifier),
            store,
        }
    }

    /// Build the progress model for this session's outline.
    pub async fn load_model(&self, outline: TutorialOutline) -> ProgressModel {
        ProgressModel::load(outline, self.store.clone()).await
    }

    /// Load the model, render it, and run the resumption notifier.
    pub async fn start(
        &self,
        outline: TutorialOutline,
        view: Arc<dyn ProgressView>,
    ) -> ProgressController {
        let model = self.load_model(outline).await;
        ProgressController::start(model, self.evaluator.clone(), &self.notifier, view)
    }

    #[must_use]
    pub fn preferences(&self) -> Arc<PreferencesService> {
        Arc::clone(&self.preferences)
    }

    #[must_use]
    pub fn evaluator(&self) -> &PhaseCompletionEvaluator {
        &self.evaluator
    }

    #[must_use]
    pub fn notifier(&self) -> &ResumptionNotifier {
        &self.notifier
    }
}
