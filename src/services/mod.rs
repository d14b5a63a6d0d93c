//! Services Layer
//!
//! Business logic shared by the HTTP handlers. Services take a
//! `DatabaseConnection` (or any `ConnectionTrait` when they can run inside a
//! caller's transaction) and return `DomainError`.

pub mod activity_service;
pub mod dashboard_service;
pub mod gamification_service;
pub mod mission_service;
pub mod rating_service;
pub mod user_service;

pub use gamification_service::{
    DailyMissionView, LoginOutcome, MissionCompletion, complete_mission, record_login,
};
