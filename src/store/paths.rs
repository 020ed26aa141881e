// src/store/paths.rs

use chrono::Utc;
use sqlx::{SqliteConnection, types::Json};

use crate::{
    error::AppError,
    models::learning_path::{LearningPath, LearningPathRow},
};

const PATH_COLUMNS: &str = "id, title, description, courses, created_by, created_at, updated_at";

pub async fn find(conn: &mut SqliteConnection, id: i64) -> Result<Option<LearningPath>, AppError> {
    let row = sqlx::query_as::<_, LearningPathRow>(&format!(
        "SELECT {PATH_COLUMNS} FROM learning_paths WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(LearningPath::from))
}

pub async fn list(conn: &mut SqliteConnection) -> Result<Vec<LearningPath>, AppError> {
    let rows = sqlx::query_as::<_, LearningPathRow>(&format!(
        "SELECT {PATH_COLUMNS} FROM learning_paths ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.into_iter().map(LearningPath::from).collect())
}

pub async fn insert(
    conn: &mut SqliteConnection,
    title: &str,
    description: &str,
    courses: &[i64],
    created_by: i64,
) -> Result<LearningPath, AppError> {
    let row = sqlx::query_as::<_, LearningPathRow>(&format!(
        r#"
        INSERT INTO learning_paths (title, description, courses, created_by, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?5)
        RETURNING {PATH_COLUMNS}
        "#
    ))
    .bind(title)
    .bind(description)
    .bind(Json(courses))
    .bind(created_by)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        tracing::error!("Failed to insert learning path: {:?}", e);
        AppError::from(e)
    })?;
    Ok(row.into())
}

pub async fn update(conn: &mut SqliteConnection, path: &LearningPath) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE learning_paths
        SET title = ?2, description = ?3, courses = ?4, updated_at = ?5
        WHERE id = ?1
        "#,
    )
    .bind(path.id)
    .bind(&path.title)
    .bind(&path.description)
    .bind(Json(&path.courses))
    .bind(path.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
