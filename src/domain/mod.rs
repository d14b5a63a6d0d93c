//! Domain layer - Pure business abstractions
//!
//! Trait definitions, domain error types and the rules that do not need a
//! database: streak computation, mission planning, catalog vocabulary.

pub mod catalog;
pub mod errors;
pub mod gamification;
pub mod repositories;

pub use errors::DomainError;
pub use repositories::*;
