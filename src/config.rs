use chrono::Duration;
use std::env;

use crate::domain::gamification::{DEFAULT_DAILY_MISSION_QUOTA, DEFAULT_STREAK_WINDOW_MINUTES};

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub seed_demo: bool,
    pub gamification: GamificationSettings,
}

impl Config {
    pub fn from_env() -> Self {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://portal.db?mode=rwc".to_string());

        Self {
            database_url,
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(Vec::new),
            seed_demo: env::var("SEED_DEMO").is_ok(),
            gamification: GamificationSettings::default(),
        }
    }
}

/// Tunables of the streak and daily mission rules
#[derive(Debug, Clone, Copy)]
pub struct GamificationSettings {
    /// Max gap between two logins that still extends the streak
    pub streak_window: Duration,
    /// Assignments per profile and day, daily login included
    pub daily_quota: usize,
}

impl Default for GamificationSettings {
    fn default() -> Self {
        Self {
            streak_window: Duration::minutes(DEFAULT_STREAK_WINDOW_MINUTES),
            daily_quota: DEFAULT_DAILY_MISSION_QUOTA,
        }
    }
}
