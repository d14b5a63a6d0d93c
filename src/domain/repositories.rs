//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::DomainError;
use super::catalog::{ResourceStatus, ResourceType};

/// Resources shown per page when browsing a program
pub const RESOURCES_PER_PAGE: u64 = 9;

/// Academic program data for API responses
#[derive(Debug, Clone, Serialize)]
pub struct Program {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

/// Program with the number of resources linked to it
#[derive(Debug, Clone, Serialize)]
pub struct ProgramResourceCount {
    pub id: i32,
    pub name: String,
    pub resource_count: u64,
}

/// Resource data for API responses
#[derive(Debug, Clone, Serialize)]
pub struct Resource {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub ideal_use: Vec<String>,
    pub url: String,
    pub resource_type: String,
    pub status: String,
    pub suggested_by: Option<i32>,
    pub program_ids: Vec<i32>,
    /// Mean score, 0.0 when nobody rated it yet
    pub avg_rating: f64,
    pub rating_count: u64,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResourceSort {
    /// Newest first
    #[default]
    Recent,
    /// Highest average score first, newest first on ties
    TopRated,
}

impl ResourceSort {
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("rated") => Self::TopRated,
            _ => Self::Recent,
        }
    }
}

/// Filter criteria for browsing the approved resources of a program
#[derive(Debug, Clone)]
pub struct ResourceFilter {
    pub program_id: i32,
    pub resource_type: ResourceType,
    pub query: Option<String>,
    pub sort: ResourceSort,
    /// 1-based
    pub page: u64,
}

/// Paginated result with total count
#[derive(Debug, Serialize)]
pub struct PaginatedResources {
    pub resources: Vec<Resource>,
    pub total: u64,
    pub page: u64,
    pub num_pages: u64,
}

/// Input for suggesting a resource
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestResourceInput {
    pub name: String,
    pub description: String,
    pub ideal_use: Option<String>,
    pub url: String,
    pub resource_type: String,
    #[serde(default)]
    pub program_ids: Vec<i32>,
}

/// Repository trait for programs and resources
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// All programs, ordered by name
    async fn list_programs(&self) -> Result<Vec<Program>, DomainError>;

    /// Find a program by ID
    async fn find_program(&self, id: i32) -> Result<Option<Program>, DomainError>;

    /// Programs ordered by number of linked resources, skipping empty ones
    async fn top_programs(&self, limit: usize) -> Result<Vec<ProgramResourceCount>, DomainError>;

    /// Approved resources of one program and type, searched, sorted and paginated
    async fn browse(&self, filter: ResourceFilter) -> Result<PaginatedResources, DomainError>;

    /// Approved resources linked to a program, newest first
    async fn approved_for_program(
        &self,
        program_id: i32,
        limit: u64,
    ) -> Result<Vec<Resource>, DomainError>;

    /// Find a resource by ID, whatever its status
    async fn find_by_id(&self, id: i32) -> Result<Option<Resource>, DomainError>;

    /// Resources by ID, in the order of `ids`
    async fn find_many(&self, ids: &[i32]) -> Result<Vec<Resource>, DomainError>;

    /// Count resources in a given status, optionally only those suggested by a user
    async fn count_by_status(
        &self,
        status: ResourceStatus,
        suggested_by: Option<i32>,
    ) -> Result<u64, DomainError>;

    /// Create a pending resource linked to programs
    async fn suggest(
        &self,
        input: SuggestResourceInput,
        suggested_by: i32,
    ) -> Result<Resource, DomainError>;

    /// Approve or reject a resource
    async fn set_status(&self, id: i32, status: ResourceStatus) -> Result<Resource, DomainError>;
}
