//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::GamificationSettings;
use crate::domain::ResourceRepository;
use crate::infrastructure::SeaOrmResourceRepository;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection for the service layer
    db: DatabaseConnection,
    /// Program and resource repository
    pub resource_repo: Arc<dyn ResourceRepository>,
    /// Streak window and daily mission quota
    pub gamification: GamificationSettings,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_settings(db, GamificationSettings::default())
    }

    pub fn with_settings(db: DatabaseConnection, gamification: GamificationSettings) -> Self {
        let resource_repo = Arc::new(SeaOrmResourceRepository::new(db.clone()));

        Self {
            db,
            resource_repo,
            gamification,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

// Implement FromRef to allow extracting DatabaseConnection from AppState
impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
