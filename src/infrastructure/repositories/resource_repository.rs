//! SeaORM implementation of ResourceRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::domain::catalog::{ResourceStatus, ResourceType};
use crate::domain::{
    DomainError, PaginatedResources, Program, ProgramResourceCount, RESOURCES_PER_PAGE, Resource,
    ResourceFilter, ResourceRepository, ResourceSort, SuggestResourceInput,
};
use crate::models::program::{self, Entity as ProgramEntity};
use crate::models::rating::{self, Entity as RatingEntity};
use crate::models::resource::{self, ActiveModel, Column, Entity as ResourceEntity};
use crate::models::resource_program::{self, Entity as ResourceProgramEntity};

/// SeaORM-based implementation of ResourceRepository
pub struct SeaOrmResourceRepository {
    db: DatabaseConnection,
}

impl SeaOrmResourceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resource IDs linked to a program
    async fn resource_ids_for_program(&self, program_id: i32) -> Result<Vec<i32>, DomainError> {
        let links = ResourceProgramEntity::find()
            .filter(resource_program::Column::ProgramId.eq(program_id))
            .all(&self.db)
            .await?;

        Ok(links.into_iter().map(|l| l.resource_id).collect())
    }

    /// Attach rating stats and program links to raw rows
    async fn enrich(&self, models: Vec<resource::Model>) -> Result<Vec<Resource>, DomainError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();

        let ratings = RatingEntity::find()
            .filter(rating::Column::ResourceId.is_in(ids.clone()))
            .all(&self.db)
            .await?;

        let mut scores: HashMap<i32, (i64, u64)> = HashMap::new();
        for r in ratings {
            let entry = scores.entry(r.resource_id).or_insert((0, 0));
            entry.0 += i64::from(r.score);
            entry.1 += 1;
        }

        let links = ResourceProgramEntity::find()
            .filter(resource_program::Column::ResourceId.is_in(ids))
            .all(&self.db)
            .await?;

        let mut programs: HashMap<i32, Vec<i32>> = HashMap::new();
        for link in links {
            programs
                .entry(link.resource_id)
                .or_default()
                .push(link.program_id);
        }

        Ok(models
            .into_iter()
            .map(|m| {
                let (sum, count) = scores.get(&m.id).copied().unwrap_or((0, 0));
                let avg_rating = if count == 0 {
                    0.0
                } else {
                    sum as f64 / count as f64
                };
                let mut program_ids = programs.remove(&m.id).unwrap_or_default();
                program_ids.sort_unstable();

                Resource {
                    id: m.id,
                    name: m.name,
                    description: m.description,
                    ideal_use: m
                        .ideal_use
                        .as_deref()
                        .map(|uses| {
                            uses.lines()
                                .map(str::trim)
                                .filter(|l| !l.is_empty())
                                .map(str::to_string)
                                .collect()
                        })
                        .unwrap_or_default(),
                    url: m.url,
                    resource_type: m.resource_type,
                    status: m.status,
                    suggested_by: m.suggested_by,
                    program_ids,
                    avg_rating,
                    rating_count: count,
                    created_at: m.created_at,
                }
            })
            .collect())
    }
}

fn to_program(p: program::Model) -> Program {
    Program {
        id: p.id,
        name: p.name,
        description: p.description,
    }
}

fn by_rating_then_recent(a: &Resource, b: &Resource) -> Ordering {
    b.avg_rating
        .partial_cmp(&a.avg_rating)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| b.id.cmp(&a.id))
}

#[async_trait]
impl ResourceRepository for SeaOrmResourceRepository {
    async fn list_programs(&self) -> Result<Vec<Program>, DomainError> {
        let programs = ProgramEntity::find()
            .order_by_asc(program::Column::Name)
            .all(&self.db)
            .await?;

        Ok(programs.into_iter().map(to_program).collect())
    }

    async fn find_program(&self, id: i32) -> Result<Option<Program>, DomainError> {
        let program = ProgramEntity::find_by_id(id).one(&self.db).await?;
        Ok(program.map(to_program))
    }

    async fn top_programs(&self, limit: usize) -> Result<Vec<ProgramResourceCount>, DomainError> {
        let links = ResourceProgramEntity::find().all(&self.db).await?;

        let mut counts: HashMap<i32, u64> = HashMap::new();
        for link in links {
            *counts.entry(link.program_id).or_insert(0) += 1;
        }

        if counts.is_empty() {
            return Ok(Vec::new());
        }

        let programs = ProgramEntity::find()
            .filter(program::Column::Id.is_in(counts.keys().copied().collect::<Vec<_>>()))
            .all(&self.db)
            .await?;

        let mut ranked: Vec<ProgramResourceCount> = programs
            .into_iter()
            .map(|p| ProgramResourceCount {
                resource_count: counts.get(&p.id).copied().unwrap_or(0),
                id: p.id,
                name: p.name,
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.resource_count
                .cmp(&a.resource_count)
                .then_with(|| a.name.cmp(&b.name))
        });
        ranked.truncate(limit);

        Ok(ranked)
    }

    async fn browse(&self, filter: ResourceFilter) -> Result<PaginatedResources, DomainError> {
        let ids = self.resource_ids_for_program(filter.program_id).await?;

        let mut query = ResourceEntity::find()
            .filter(Column::Id.is_in(ids))
            .filter(Column::ResourceType.eq(filter.resource_type.as_str()))
            .filter(Column::Status.eq(ResourceStatus::Approved.as_str()));

        if let Some(q) = filter.query.as_deref().map(str::trim)
            && !q.is_empty()
        {
            // LIKE is case-insensitive for ASCII on SQLite
            let cond = Condition::any()
                .add(Column::Name.contains(q))
                .add(Column::Description.contains(q));
            query = query.filter(cond);
        }

        let models = query
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await?;

        let mut resources = self.enrich(models).await?;
        if filter.sort == ResourceSort::TopRated {
            resources.sort_by(by_rating_then_recent);
        }

        let total = resources.len() as u64;
        let num_pages = total.div_ceil(RESOURCES_PER_PAGE).max(1);
        let page = filter.page.clamp(1, num_pages);

        let resources = resources
            .into_iter()
            .skip(((page - 1) * RESOURCES_PER_PAGE) as usize)
            .take(RESOURCES_PER_PAGE as usize)
            .collect();

        Ok(PaginatedResources {
            resources,
            total,
            page,
            num_pages,
        })
    }

    async fn approved_for_program(
        &self,
        program_id: i32,
        limit: u64,
    ) -> Result<Vec<Resource>, DomainError> {
        let ids = self.resource_ids_for_program(program_id).await?;

        let models = ResourceEntity::find()
            .filter(Column::Id.is_in(ids))
            .filter(Column::Status.eq(ResourceStatus::Approved.as_str()))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;

        self.enrich(models).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Resource>, DomainError> {
        let Some(model) = ResourceEntity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        Ok(self.enrich(vec![model]).await?.pop())
    }

    async fn find_many(&self, ids: &[i32]) -> Result<Vec<Resource>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = ResourceEntity::find()
            .filter(Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await?;

        let mut by_id: HashMap<i32, Resource> = self
            .enrich(models)
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn count_by_status(
        &self,
        status: ResourceStatus,
        suggested_by: Option<i32>,
    ) -> Result<u64, DomainError> {
        let mut query = ResourceEntity::find().filter(Column::Status.eq(status.as_str()));

        if let Some(user_id) = suggested_by {
            query = query.filter(Column::SuggestedBy.eq(user_id));
        }

        Ok(query.count(&self.db).await?)
    }

    async fn suggest(
        &self,
        input: SuggestResourceInput,
        suggested_by: i32,
    ) -> Result<Resource, DomainError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::Validation("name is required".to_string()));
        }
        if input.description.trim().is_empty() {
            return Err(DomainError::Validation("description is required".to_string()));
        }
        if !(input.url.starts_with("http://") || input.url.starts_with("https://")) {
            return Err(DomainError::Validation(
                "url must start with http:// or https://".to_string(),
            ));
        }
        let resource_type = ResourceType::parse(&input.resource_type).ok_or_else(|| {
            DomainError::Validation(format!("unknown resource type '{}'", input.resource_type))
        })?;

        let taken = ResourceEntity::find()
            .filter(Column::Name.eq(name.as_str()))
            .one(&self.db)
            .await?;
        if taken.is_some() {
            return Err(DomainError::Conflict(format!(
                "a resource named '{}' already exists",
                name
            )));
        }

        let mut program_ids = input.program_ids.clone();
        program_ids.sort_unstable();
        program_ids.dedup();

        if !program_ids.is_empty() {
            let found = ProgramEntity::find()
                .filter(program::Column::Id.is_in(program_ids.clone()))
                .count(&self.db)
                .await?;
            if found != program_ids.len() as u64 {
                return Err(DomainError::Validation("unknown program".to_string()));
            }
        }

        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.db.begin().await?;

        let saved = ActiveModel {
            name: Set(name),
            description: Set(input.description.trim().to_string()),
            ideal_use: Set(input.ideal_use.filter(|u| !u.trim().is_empty())),
            url: Set(input.url),
            resource_type: Set(resource_type.as_str().to_string()),
            status: Set(ResourceStatus::Pending.as_str().to_string()),
            suggested_by: Set(Some(suggested_by)),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for program_id in program_ids {
            ResourceProgramEntity::insert(resource_program::ActiveModel {
                resource_id: Set(saved.id),
                program_id: Set(program_id),
            })
            .exec_without_returning(&txn)
            .await?;
        }

        txn.commit().await?;

        tracing::info!(resource_id = saved.id, suggested_by, "Resource suggested");

        self.find_by_id(saved.id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("resource {}", saved.id)))
    }

    async fn set_status(&self, id: i32, status: ResourceStatus) -> Result<Resource, DomainError> {
        let existing = ResourceEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("resource {}", id)))?;

        let mut active: ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.db).await?;

        tracing::info!(resource_id = id, status = status.as_str(), "Resource status changed");

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("resource {}", id)))
    }
}
