//! Repository implementations using SeaORM

pub mod resource_repository;

pub use resource_repository::SeaOrmResourceRepository;
