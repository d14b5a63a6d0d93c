pub mod daily_mission;
pub mod favorite;
pub mod mission;
pub mod profile;
pub mod program;
pub mod rating;
pub mod resource;
pub mod resource_program;
pub mod user;
pub mod visit;
