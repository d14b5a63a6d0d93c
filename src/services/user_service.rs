//! User Service - registration and credential checks
//!
//! Registration creates the user and its profile in one transaction, so a
//! user never exists without exactly one profile.

use rand::Rng;
use sea_orm::*;
use serde::{Deserialize, Serialize};

use crate::auth::{hash_password, verify_password};
use crate::domain::DomainError;
use crate::domain::catalog::Role;
use crate::models::program::Entity as Program;
use crate::models::profile::{self, Entity as Profile};
use crate::models::user::{self, Entity as User};

/// Max length of a national identity number
const NATIONAL_ID_MAX_LEN: usize = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub national_id: String,
    pub program_id: Option<i32>,
}

/// A freshly registered account. The temporary password is only ever
/// available here; handing it to the user is the caller's job.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub user_id: i32,
    pub profile_id: i32,
    pub username: String,
    pub temporary_password: String,
}

/// Register a user with the given role
pub async fn register(
    db: &DatabaseConnection,
    input: RegisterInput,
    role: Role,
) -> Result<Registration, DomainError> {
    let national_id = input.national_id.trim().to_string();
    if national_id.is_empty()
        || national_id.len() > NATIONAL_ID_MAX_LEN
        || !national_id.chars().all(|c| c.is_ascii_digit())
    {
        return Err(DomainError::Validation(format!(
            "national id must be 1 to {} digits",
            NATIONAL_ID_MAX_LEN
        )));
    }

    if let Some(program_id) = input.program_id
        && Program::find_by_id(program_id).one(db).await?.is_none()
    {
        return Err(DomainError::Validation("unknown program".to_string()));
    }

    let txn = db.begin().await?;

    let taken = Profile::find()
        .filter(profile::Column::NationalId.eq(national_id.as_str()))
        .one(&txn)
        .await?;
    if taken.is_some() {
        return Err(DomainError::Conflict(
            "this national id is already registered".to_string(),
        ));
    }

    let base = base_username(&input.first_name, &input.last_name, input.email.as_deref())
        .unwrap_or_else(|| "user".to_string());
    let username = unique_username(&txn, &base).await?;

    let temporary_password = format!(
        "{}*{}",
        national_id,
        rand::thread_rng().gen_range(1000..=9999)
    );
    let password_hash = hash_password(&temporary_password).map_err(DomainError::Internal)?;

    let now = chrono::Utc::now().to_rfc3339();
    let saved_user = user::ActiveModel {
        username: Set(username.clone()),
        password_hash: Set(password_hash),
        role: Set(role.as_str().to_string()),
        first_name: Set(non_empty(&input.first_name)),
        last_name: Set(non_empty(&input.last_name)),
        email: Set(input.email.as_deref().and_then(non_empty)),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let saved_profile = profile::ActiveModel {
        user_id: Set(saved_user.id),
        national_id: Set(national_id),
        program_id: Set(input.program_id),
        points: Set(0),
        current_streak: Set(0),
        last_streak_at: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(user_id = saved_user.id, %username, role = role.as_str(), "User registered");

    Ok(Registration {
        user_id: saved_user.id,
        profile_id: saved_profile.id,
        username,
        temporary_password,
    })
}

/// Check credentials; `None` when the user is unknown or the password wrong
pub async fn authenticate(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<Option<user::Model>, DomainError> {
    let Some(found) = User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?
    else {
        tracing::warn!("User not found: {}", username);
        return Ok(None);
    };

    match verify_password(password, &found.password_hash) {
        Ok(true) => Ok(Some(found)),
        Ok(false) => {
            tracing::warn!("Password verification failed for user: {}", username);
            Ok(None)
        }
        Err(e) => {
            tracing::error!("Stored password hash for {} is unreadable: {}", username, e);
            Ok(None)
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Lowercase ASCII letters only, accents folded
fn normalize(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect()
}

/// Username from names: first initial + first surname + initial of the
/// second surname ("María José", "Pérez Gómez" -> "mperezg"). Falls back to
/// the local part of the email.
pub fn base_username(first_name: &str, last_name: &str, email: Option<&str>) -> Option<String> {
    let first = normalize(first_name);
    let surnames = normalize(last_name);
    let mut surnames = surnames.split_whitespace();

    if let (Some(initial), Some(first_surname)) = (first.chars().find(|c| !c.is_whitespace()), surnames.next()) {
        let mut username = format!("{}{}", initial, first_surname);
        if let Some(second_initial) = surnames.next().and_then(|s| s.chars().next()) {
            username.push(second_initial);
        }
        return Some(username);
    }

    email
        .and_then(|e| e.split('@').next())
        .map(normalize)
        .map(|local| local.split_whitespace().collect::<String>())
        .filter(|local| !local.is_empty())
}

async fn unique_username<C: ConnectionTrait>(conn: &C, base: &str) -> Result<String, DomainError> {
    let mut candidate = base.to_string();
    let mut counter = 1;

    while User::find()
        .filter(user::Column::Username.eq(candidate.as_str()))
        .one(conn)
        .await?
        .is_some()
    {
        candidate = format!("{}{}", base, counter);
        counter += 1;
    }

    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_uses_both_surnames() {
        assert_eq!(
            base_username("María José", "Pérez Gómez", None).as_deref(),
            Some("mperezg")
        );
    }

    #[test]
    fn username_with_single_surname() {
        assert_eq!(
            base_username("Luis", "Núñez", None).as_deref(),
            Some("lnunez")
        );
    }

    #[test]
    fn username_falls_back_to_email() {
        assert_eq!(
            base_username("", "", Some("ana.torres@uni.edu")).as_deref(),
            Some("anatorres")
        );
        assert_eq!(base_username("", "", None), None);
    }
}
