//! Gamification Service - streaks, daily missions and rewards
//!
//! Each public operation runs in its own transaction. Dropping a transaction
//! without committing rolls it back, so an error anywhere leaves profile and
//! mission rows untouched.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::*;
use serde::Serialize;

use crate::config::GamificationSettings;
use crate::domain::DomainError;
use crate::domain::gamification::{MissionKey, next_streak, plan_daily_missions};
use crate::models::daily_mission::{self, Entity as DailyMission};
use crate::models::mission::{self, Entity as Mission};
use crate::models::profile::{self, Entity as Profile};

/// State of the profile after a login has been recorded
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub profile_id: i32,
    pub streak: i32,
    pub points: i32,
    pub points_awarded: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MissionCompletion {
    pub completed: bool,
    pub points_awarded: i32,
}

impl MissionCompletion {
    pub const NOTHING: Self = Self {
        completed: false,
        points_awarded: 0,
    };
}

/// A day's assignment joined with its mission, for display
#[derive(Debug, Clone, Serialize)]
pub struct DailyMissionView {
    pub id: i32,
    pub key: String,
    pub name: String,
    pub description: String,
    pub reward_points: i32,
    pub assigned_on: NaiveDate,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Find the profile of a user
pub async fn profile_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<profile::Model, DomainError> {
    Profile::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("profile for user {}", user_id)))
}

/// Record a login: update the streak, make sure today's missions exist,
/// complete the daily-login mission and persist the profile.
///
/// The profile row is read with an exclusive lock and everything commits
/// together, so concurrent logins of one user serialize.
pub async fn record_login(
    db: &DatabaseConnection,
    user_id: i32,
    now: DateTime<Utc>,
    settings: &GamificationSettings,
) -> Result<LoginOutcome, DomainError> {
    let txn = db.begin().await?;

    let profile = Profile::find()
        .filter(profile::Column::UserId.eq(user_id))
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("profile for user {}", user_id)))?;

    let streak = next_streak(
        profile.current_streak,
        profile.last_streak_at,
        now,
        settings.streak_window,
    );
    tracing::debug!(
        user_id,
        previous = profile.current_streak,
        streak,
        "Streak updated"
    );

    assign_daily_missions(&txn, profile.id, now.date_naive(), settings).await?;

    let points_awarded = mark_completed(&txn, profile.id, MissionKey::DailyLogin, now)
        .await?
        .unwrap_or(0);

    let profile_id = profile.id;

    let mut active: profile::ActiveModel = profile.into();
    active.current_streak = Set(streak);
    active.last_streak_at = Set(Some(now));
    active.update(&txn).await?;

    if points_awarded > 0 {
        credit_points(&txn, profile_id, points_awarded).await?;
    }

    let points = Profile::find_by_id(profile_id)
        .one(&txn)
        .await?
        .map(|p| p.points)
        .ok_or_else(|| DomainError::NotFound(format!("profile {}", profile_id)))?;

    txn.commit().await?;

    tracing::info!(user_id, profile_id, streak, points, points_awarded, "Login recorded");

    Ok(LoginOutcome {
        profile_id,
        streak,
        points,
        points_awarded,
    })
}

/// Make sure the profile has its missions for `date`.
///
/// A no-op when any assignment already exists for that day. Otherwise the
/// daily-login mission (if active) plus a random sample of the other active
/// missions are assigned, up to the daily quota. Returns the day's
/// assignments.
pub async fn assign_daily_missions<C: ConnectionTrait>(
    conn: &C,
    profile_id: i32,
    date: NaiveDate,
    settings: &GamificationSettings,
) -> Result<Vec<daily_mission::Model>, DomainError> {
    let existing = assignments_on(conn, profile_id, date).await?;
    if !existing.is_empty() {
        return Ok(existing);
    }

    let catalog = Mission::find()
        .filter(mission::Column::Active.eq(true))
        .order_by_asc(mission::Column::Id)
        .all(conn)
        .await?;

    let planned: Vec<i32> = {
        let mut rng = rand::thread_rng();
        plan_daily_missions(
            &catalog,
            |m: &mission::Model| m.key.as_str(),
            settings.daily_quota,
            &mut rng,
        )
        .into_iter()
        .map(|m| m.id)
        .collect()
    };

    for mission_id in planned {
        get_or_create_assignment(conn, profile_id, mission_id, date).await?;
    }

    let assigned = assignments_on(conn, profile_id, date).await?;
    tracing::debug!(profile_id, %date, count = assigned.len(), "Daily missions assigned");
    Ok(assigned)
}

/// Complete today's assignment of `key` for a profile and credit its reward.
///
/// Not assigned today, or already completed: succeeds without awarding
/// anything. The completion is a conditional update, so of two concurrent
/// callers at most one gets the points.
pub async fn complete_mission(
    db: &DatabaseConnection,
    profile_id: i32,
    key: MissionKey,
    now: DateTime<Utc>,
) -> Result<MissionCompletion, DomainError> {
    let txn = db.begin().await?;

    if Profile::find_by_id(profile_id).one(&txn).await?.is_none() {
        return Err(DomainError::NotFound(format!("profile {}", profile_id)));
    }

    let Some(reward) = mark_completed(&txn, profile_id, key, now).await? else {
        return Ok(MissionCompletion::NOTHING);
    };

    credit_points(&txn, profile_id, reward).await?;

    txn.commit().await?;

    tracing::info!(profile_id, mission = key.as_str(), reward, "Mission completed");

    Ok(MissionCompletion {
        completed: true,
        points_awarded: reward,
    })
}

/// Same as [`complete_mission`], addressed by user
pub async fn complete_mission_for_user(
    db: &DatabaseConnection,
    user_id: i32,
    key: MissionKey,
    now: DateTime<Utc>,
) -> Result<MissionCompletion, DomainError> {
    let profile = profile_for_user(db, user_id).await?;
    complete_mission(db, profile.id, key, now).await
}

/// Assignments of a profile for one day: pending first, then by mission name
pub async fn get_daily_missions<C: ConnectionTrait>(
    db: &C,
    profile_id: i32,
    date: NaiveDate,
) -> Result<Vec<DailyMissionView>, DomainError> {
    if Profile::find_by_id(profile_id).one(db).await?.is_none() {
        return Err(DomainError::NotFound(format!("profile {}", profile_id)));
    }

    let rows = DailyMission::find()
        .filter(daily_mission::Column::ProfileId.eq(profile_id))
        .filter(daily_mission::Column::AssignedOn.eq(date))
        .find_also_related(Mission)
        .all(db)
        .await?;

    let mut views: Vec<DailyMissionView> = rows
        .into_iter()
        .filter_map(|(assignment, mission)| {
            let mission = mission?;
            Some(DailyMissionView {
                id: assignment.id,
                key: mission.key,
                name: mission.name,
                description: mission.description,
                reward_points: mission.reward_points,
                assigned_on: assignment.assigned_on,
                completed: assignment.completed,
                completed_at: assignment.completed_at,
            })
        })
        .collect();

    views.sort_by(|a, b| {
        a.completed
            .cmp(&b.completed)
            .then_with(|| a.name.cmp(&b.name))
    });

    Ok(views)
}

/// `points = points + reward`, evaluated by the database
async fn credit_points<C: ConnectionTrait>(
    conn: &C,
    profile_id: i32,
    reward: i32,
) -> Result<(), DomainError> {
    Profile::update_many()
        .col_expr(
            profile::Column::Points,
            Expr::col(profile::Column::Points).add(reward),
        )
        .filter(profile::Column::Id.eq(profile_id))
        .exec(conn)
        .await?;
    Ok(())
}

async fn assignments_on<C: ConnectionTrait>(
    conn: &C,
    profile_id: i32,
    date: NaiveDate,
) -> Result<Vec<daily_mission::Model>, DomainError> {
    Ok(DailyMission::find()
        .filter(daily_mission::Column::ProfileId.eq(profile_id))
        .filter(daily_mission::Column::AssignedOn.eq(date))
        .order_by_asc(daily_mission::Column::Id)
        .all(conn)
        .await?)
}

async fn get_or_create_assignment<C: ConnectionTrait>(
    conn: &C,
    profile_id: i32,
    mission_id: i32,
    date: NaiveDate,
) -> Result<daily_mission::Model, DomainError> {
    let assignment = daily_mission::ActiveModel {
        profile_id: Set(profile_id),
        mission_id: Set(mission_id),
        assigned_on: Set(date),
        completed: Set(false),
        completed_at: Set(None),
        ..Default::default()
    };

    // Losing a race against a concurrent insert is fine: the unique key keeps
    // one row and we read that one back.
    DailyMission::insert(assignment)
        .on_conflict(
            OnConflict::columns([
                daily_mission::Column::ProfileId,
                daily_mission::Column::MissionId,
                daily_mission::Column::AssignedOn,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    DailyMission::find()
        .filter(daily_mission::Column::ProfileId.eq(profile_id))
        .filter(daily_mission::Column::MissionId.eq(mission_id))
        .filter(daily_mission::Column::AssignedOn.eq(date))
        .one(conn)
        .await?
        .ok_or_else(|| {
            DomainError::Internal(format!(
                "assignment of mission {} to profile {} vanished",
                mission_id, profile_id
            ))
        })
}

/// Flip today's pending assignment of `key` to completed.
/// Returns the mission reward when this call did the flip.
async fn mark_completed<C: ConnectionTrait>(
    conn: &C,
    profile_id: i32,
    key: MissionKey,
    now: DateTime<Utc>,
) -> Result<Option<i32>, DomainError> {
    let pending = DailyMission::find()
        .filter(daily_mission::Column::ProfileId.eq(profile_id))
        .filter(daily_mission::Column::AssignedOn.eq(now.date_naive()))
        .filter(daily_mission::Column::Completed.eq(false))
        .find_also_related(Mission)
        .filter(mission::Column::Key.eq(key.as_str()))
        .one(conn)
        .await?;

    let Some((assignment, Some(mission))) = pending else {
        return Ok(None);
    };

    let result = DailyMission::update_many()
        .col_expr(daily_mission::Column::Completed, Expr::value(true))
        .col_expr(daily_mission::Column::CompletedAt, Expr::value(now))
        .filter(daily_mission::Column::Id.eq(assignment.id))
        .filter(daily_mission::Column::Completed.eq(false))
        .exec(conn)
        .await?;

    if result.rows_affected != 1 {
        tracing::debug!(profile_id, mission = key.as_str(), "Mission completed concurrently");
        return Ok(None);
    }

    Ok(Some(mission.reward_points))
}
