use storage::ProgressStore;
use tracing::debug;
use tutorial_core::model::{OsPreference, Preferences, ThemePreference};

/// Reads and writes the OS and theme entries of the persisted layout.
#[derive(Clone)]
pub struct PreferencesService {
    store: ProgressStore,
}

impl PreferencesService {
    #[must_use]
    pub fn new(store: ProgressStore) -> Self {
        Self { store }
    }

    /// Stored preferences, or defaults for missing or unknown tokens.
    pub async fn load(&self) -> Preferences {
        self.store.load_preferences().await
    }

    /// Like `load`, but a theme never chosen explicitly follows the system.
    pub async fn load_with_system_theme(&self, system: Option<ThemePreference>) -> Preferences {
        let mut prefs = self.store.load_preferences().await;
        if let Some(system) = system {
            if !self.store.has_theme().await {
                debug!(theme = %system, "using system theme");
                prefs.theme = system;
            }
        }
        prefs
    }

    /// Persist the OS choice. Returns whether the write landed.
    pub async fn set_os(&self, os: OsPreference) -> bool {
        self.store.save_os(os).await
    }

    /// Persist the theme choice. Returns whether the write landed.
    pub async fn set_theme(&self, theme: ThemePreference) -> bool {
        self.store.save_theme(theme).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use storage::repository::InMemoryStore;

    fn service() -> PreferencesService {
        PreferencesService::new(ProgressStore::new(Arc::new(InMemoryStore::new())))
    }

    #[tokio::test]
    async fn system_theme_applies_until_user_chooses() {
        let prefs = service();
        let loaded = prefs
            .load_with_system_theme(Some(ThemePreference::Light))
            .await;
        assert_eq!(loaded.theme, ThemePreference::Light);

        assert!(prefs.set_theme(ThemePreference::Dark).await);
        let loaded = prefs
            .load_with_system_theme(Some(ThemePreference::Light))
            .await;
        assert_eq!(loaded.theme, ThemePreference::Dark);
    }

    #[tokio::test]
    async fn os_choice_persists() {
        let prefs = service();
        assert_eq!(prefs.load().await.os, OsPreference::Mac);
        assert!(prefs.set_os(OsPreference::Windows).await);
        assert_eq!(prefs.load().await.os, OsPreference::Windows);
    }
}
