use chrono::NaiveDate;
use sea_orm::*;
use serde::Serialize;

use crate::domain::catalog::{ResourceStatus, Role};
use crate::domain::{DomainError, Program, ProgramResourceCount, Resource, ResourceRepository};
use crate::models::program::Entity as ProgramEntity;
use crate::services::activity_service::{self, RECENT_VISITS};
use crate::services::gamification_service::{self, DailyMissionView};

/// Items in each role-specific list
const HIGHLIGHTS: usize = 5;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub program_count: u64,
    pub approved_resources: u64,
    pub points: i32,
    pub streak: i32,
    pub missions: Vec<DailyMissionView>,
    pub recent_visits: Vec<Resource>,
    pub role: &'static str,
    #[serde(flatten)]
    pub block: RoleBlock,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RoleBlock {
    Moderator {
        pending_resources: u64,
        top_programs: Vec<ProgramResourceCount>,
    },
    Teacher {
        pending_suggestions: u64,
        program: Option<Program>,
        program_resources: Vec<Resource>,
    },
    Student {
        program: Option<Program>,
        program_resources: Vec<Resource>,
    },
}

pub async fn build_dashboard(
    db: &DatabaseConnection,
    repo: &dyn ResourceRepository,
    user_id: i32,
    role: Role,
    today: NaiveDate,
) -> Result<Dashboard, DomainError> {
    let profile = gamification_service::profile_for_user(db, user_id).await?;

    let program_count = ProgramEntity::find().count(db).await?;
    let approved_resources = repo.count_by_status(ResourceStatus::Approved, None).await?;
    let missions = gamification_service::get_daily_missions(db, profile.id, today).await?;

    let visited = activity_service::recent_visit_ids(db, profile.id, RECENT_VISITS).await?;
    let recent_visits = repo.find_many(&visited).await?;

    let block = match role {
        Role::Admin | Role::ContentManager => RoleBlock::Moderator {
            pending_resources: repo.count_by_status(ResourceStatus::Pending, None).await?,
            top_programs: repo.top_programs(HIGHLIGHTS).await?,
        },
        Role::Teacher => {
            let (program, program_resources) = own_program(repo, profile.program_id).await?;
            RoleBlock::Teacher {
                pending_suggestions: repo
                    .count_by_status(ResourceStatus::Pending, Some(user_id))
                    .await?,
                program,
                program_resources,
            }
        }
        Role::Student => {
            let (program, program_resources) = own_program(repo, profile.program_id).await?;
            RoleBlock::Student {
                program,
                program_resources,
            }
        }
    };

    Ok(Dashboard {
        program_count,
        approved_resources,
        points: profile.points,
        streak: profile.current_streak,
        missions,
        recent_visits,
        role: role.as_str(),
        block,
    })
}

async fn own_program(
    repo: &dyn ResourceRepository,
    program_id: Option<i32>,
) -> Result<(Option<Program>, Vec<Resource>), DomainError> {
    let Some(program_id) = program_id else {
        return Ok((None, Vec::new()));
    };

    let program = repo.find_program(program_id).await?;
    let resources = repo
        .approved_for_program(program_id, HIGHLIGHTS as u64)
        .await?;

    Ok((program, resources))
}
