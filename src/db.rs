use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

async fn execute(db: &DatabaseConnection, sql: &str) -> Result<(), DbErr> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        sql.to_owned(),
    ))
    .await?;
    Ok(())
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Create users table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'student',
            first_name TEXT,
            last_name TEXT,
            email TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    // Create programs table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS programs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            description TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    // Create profiles table (exactly one per user)
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL UNIQUE,
            national_id TEXT NOT NULL UNIQUE,
            program_id INTEGER,
            points INTEGER NOT NULL DEFAULT 0 CHECK (points >= 0),
            current_streak INTEGER NOT NULL DEFAULT 0 CHECK (current_streak >= 0),
            last_streak_at TEXT,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (program_id) REFERENCES programs(id) ON DELETE SET NULL
        )
        "#,
    )
    .await?;

    // Backfill profiles for users created before profiles existed
    execute(
        db,
        r#"
        INSERT OR IGNORE INTO profiles (user_id, national_id)
        SELECT id, 'unset-' || id FROM users
        "#,
    )
    .await?;

    // Create resources table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS resources (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL,
            ideal_use TEXT,
            url TEXT NOT NULL,
            resource_type TEXT NOT NULL DEFAULT 'other',
            status TEXT NOT NULL DEFAULT 'pending',
            suggested_by INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (suggested_by) REFERENCES users(id) ON DELETE SET NULL
        )
        "#,
    )
    .await?;

    // Create resource_programs junction table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS resource_programs (
            resource_id INTEGER NOT NULL,
            program_id INTEGER NOT NULL,
            PRIMARY KEY (resource_id, program_id),
            FOREIGN KEY (resource_id) REFERENCES resources(id) ON DELETE CASCADE,
            FOREIGN KEY (program_id) REFERENCES programs(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;

    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_resource_programs_program ON resource_programs(program_id)",
    )
    .await?;

    // Create ratings table (one rating per user and resource)
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS ratings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            resource_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            score INTEGER NOT NULL CHECK (score BETWEEN 1 AND 5),
            comment TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE(resource_id, user_id),
            FOREIGN KEY (resource_id) REFERENCES resources(id) ON DELETE CASCADE,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;

    // Create favorites junction table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS favorites (
            profile_id INTEGER NOT NULL,
            resource_id INTEGER NOT NULL,
            PRIMARY KEY (profile_id, resource_id),
            FOREIGN KEY (profile_id) REFERENCES profiles(id) ON DELETE CASCADE,
            FOREIGN KEY (resource_id) REFERENCES resources(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;

    // Create visits table (append-only history)
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS visits (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            profile_id INTEGER NOT NULL,
            resource_id INTEGER NOT NULL,
            visited_at TEXT NOT NULL,
            FOREIGN KEY (profile_id) REFERENCES profiles(id) ON DELETE CASCADE,
            FOREIGN KEY (resource_id) REFERENCES resources(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;

    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_visits_profile ON visits(profile_id, visited_at)",
    )
    .await?;

    // Gamification: mission catalog
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS missions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            "key" TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            reward_points INTEGER NOT NULL DEFAULT 10 CHECK (reward_points > 0),
            active BOOLEAN NOT NULL DEFAULT 1
        )
        "#,
    )
    .await?;

    // Gamification: one row per (profile, mission, day)
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS daily_missions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            profile_id INTEGER NOT NULL,
            mission_id INTEGER NOT NULL,
            assigned_on TEXT NOT NULL,
            completed BOOLEAN NOT NULL DEFAULT 0,
            completed_at TEXT,
            UNIQUE(profile_id, mission_id, assigned_on),
            FOREIGN KEY (profile_id) REFERENCES profiles(id) ON DELETE CASCADE,
            FOREIGN KEY (mission_id) REFERENCES missions(id) ON DELETE CASCADE
        )
        "#,
    )
    .await?;

    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_daily_missions_profile_day ON daily_missions(profile_id, assigned_on)",
    )
    .await?;

    // Standard missions; administrators may rename or disable them later
    execute(
        db,
        r#"
        INSERT OR IGNORE INTO missions ("key", name, description, reward_points, active) VALUES
            ('daily_login', 'Daily Login', 'Sign in to the portal today.', 10, 1),
            ('rate_resource', 'Rate a Resource', 'Leave a rating and a comment on any resource.', 10, 1),
            ('suggest_resource', 'Suggest a Resource', 'Propose a new resource for review.', 10, 1),
            ('visit_resource', 'Visit a Resource', 'Open any resource from the catalog.', 10, 1)
        "#,
    )
    .await?;

    Ok(())
}
