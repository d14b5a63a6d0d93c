//! Demo data for local development (`SEED_DEMO=1`)

use crate::auth::hash_password;
use crate::domain::catalog::{ResourceStatus, ResourceType, Role};
use crate::models::{profile, program, resource, resource_program, user};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;

const PROGRAMS: [(&str, &str); 3] = [
    ("Software Engineering", "Design, construction and maintenance of software systems."),
    ("Agronomy", "Crop production and sustainable agriculture."),
    ("Business Administration", "Management, finance and entrepreneurship."),
];

const RESOURCES: [(&str, &str, &str, ResourceType); 4] = [
    (
        "ChatGPT",
        "Conversational assistant for drafting, summarising and explaining topics.",
        "https://chat.openai.com",
        ResourceType::Ai,
    ),
    (
        "Draw.io",
        "Diagram editor that runs in the browser.",
        "https://app.diagrams.net",
        ResourceType::Tool,
    ),
    (
        "Visual Studio Code",
        "Source code editor with a large extension ecosystem.",
        "https://code.visualstudio.com",
        ResourceType::App,
    ),
    (
        "MDN Web Docs",
        "Reference documentation for web technologies.",
        "https://developer.mozilla.org",
        ResourceType::Website,
    ),
];

pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    let already = user::Entity::find()
        .filter(user::Column::Username.eq("admin"))
        .one(db)
        .await?;
    if already.is_some() {
        tracing::info!("Demo data already present, skipping");
        return Ok(());
    }

    let now = chrono::Utc::now().to_rfc3339();

    // 1. Programs
    for (name, description) in PROGRAMS {
        program::Entity::insert(program::ActiveModel {
            name: Set(name.to_owned()),
            description: Set(Some(description.to_owned())),
            created_at: Set(now.clone()),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::column(program::Column::Name)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    }

    let software = program::Entity::find()
        .filter(program::Column::Name.eq(PROGRAMS[0].0))
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound("seeded program".to_owned()))?;

    // 2. Users, each with a profile; the password equals the username
    let txn = db.begin().await?;
    let mut admin_id = None;
    for (i, role) in [Role::Admin, Role::ContentManager, Role::Teacher, Role::Student]
        .into_iter()
        .enumerate()
    {
        let username = role.as_str().replace('_', "");
        let password_hash =
            hash_password(&username).map_err(|e| DbErr::Custom(format!("hash: {}", e)))?;

        let saved = user::ActiveModel {
            username: Set(username.clone()),
            password_hash: Set(password_hash),
            role: Set(role.as_str().to_owned()),
            first_name: Set(Some("Demo".to_owned())),
            last_name: Set(Some(username)),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        profile::ActiveModel {
            user_id: Set(saved.id),
            national_id: Set(format!("090000000{}", i)),
            program_id: Set(Some(software.id)),
            points: Set(0),
            current_streak: Set(0),
            last_streak_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if role == Role::Admin {
            admin_id = Some(saved.id);
        }
    }

    // 3. Approved resources linked to the first program
    for (name, description, url, resource_type) in RESOURCES {
        let saved = resource::ActiveModel {
            name: Set(name.to_owned()),
            description: Set(description.to_owned()),
            ideal_use: Set(None),
            url: Set(url.to_owned()),
            resource_type: Set(resource_type.as_str().to_owned()),
            status: Set(ResourceStatus::Approved.as_str().to_owned()),
            suggested_by: Set(admin_id),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        resource_program::Entity::insert(resource_program::ActiveModel {
            resource_id: Set(saved.id),
            program_id: Set(software.id),
        })
        .exec_without_returning(&txn)
        .await?;
    }

    txn.commit().await?;

    tracing::info!(
        programs = PROGRAMS.len(),
        resources = RESOURCES.len(),
        "Demo data inserted"
    );
    Ok(())
}
