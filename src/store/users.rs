// src/store/users.rs

use chrono::Utc;
use sqlx::SqliteConnection;

use crate::{
    error::AppError,
    models::user::{Role, User},
};

const USER_COLUMNS: &str = "id, name, email, password, role, avatar, created_at, updated_at";

/// Fields of a user about to be inserted. `password_hash` is already hashed.
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
    pub avatar: Option<&'a str>,
}

pub async fn insert(conn: &mut SqliteConnection, user: NewUser<'_>) -> Result<User, AppError> {
    let now = Utc::now();
    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (name, email, password, role, avatar, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(user.name)
    .bind(user.email)
    .bind(user.password_hash)
    .bind(user.role)
    .bind(user.avatar)
    .bind(now)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            AppError::Conflict(format!("User with email '{}' already exists", user.email))
        }
        e => {
            tracing::error!("Failed to insert user: {:?}", e);
            AppError::from(e)
        }
    })
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(user)
}

/// Exact, case-sensitive lookup.
pub async fn find_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ?1"
    ))
    .bind(email)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(user)
}

pub async fn list(conn: &mut SqliteConnection) -> Result<Vec<User>, AppError> {
    let users = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
        .fetch_all(&mut *conn)
        .await?;
    Ok(users)
}

/// Updates name and/or avatar. Returns `None` when the user does not exist.
pub async fn update_profile(
    conn: &mut SqliteConnection,
    id: i64,
    name: Option<&str>,
    avatar: Option<&str>,
) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET name = COALESCE(?2, name),
            avatar = COALESCE(?3, avatar),
            updated_at = ?4
        WHERE id = ?1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(name)
    .bind(avatar)
    .bind(Utc::now())
    .fetch_optional(&mut *conn)
    .await?;
    Ok(user)
}
