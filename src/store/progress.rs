// src/store/progress.rs

use sqlx::{SqliteConnection, types::Json};

use crate::{
    error::AppError,
    models::progress::{Progress, ProgressRow},
};

const PROGRESS_COLUMNS: &str = "user_id, course_id, completed_lessons, last_accessed_lesson, \
     quiz_scores, overall_progress, created_at, updated_at";

pub async fn find(
    conn: &mut SqliteConnection,
    user_id: i64,
    course_id: i64,
) -> Result<Option<Progress>, AppError> {
    let row = sqlx::query_as::<_, ProgressRow>(&format!(
        "SELECT {PROGRESS_COLUMNS} FROM progress WHERE user_id = ?1 AND course_id = ?2"
    ))
    .bind(user_id)
    .bind(course_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(Progress::from))
}

pub async fn list_for_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Vec<Progress>, AppError> {
    let rows = sqlx::query_as::<_, ProgressRow>(&format!(
        "SELECT {PROGRESS_COLUMNS} FROM progress WHERE user_id = ?1 ORDER BY course_id"
    ))
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.into_iter().map(Progress::from).collect())
}

/// Inserts a new record. An existing record for the same pair is left
/// untouched; returns `false` in that case.
pub async fn insert_if_absent(
    conn: &mut SqliteConnection,
    progress: &Progress,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO progress
            (user_id, course_id, completed_lessons, last_accessed_lesson,
             quiz_scores, overall_progress, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT (user_id, course_id) DO NOTHING
        "#,
    )
    .bind(progress.user_id)
    .bind(progress.course_id)
    .bind(Json(&progress.completed_lessons))
    .bind(progress.last_accessed_lesson.as_deref())
    .bind(Json(&progress.quiz_scores))
    .bind(progress.overall_progress)
    .bind(progress.created_at)
    .bind(progress.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Overwrites the mutable fields of an existing record.
pub async fn save(conn: &mut SqliteConnection, progress: &Progress) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        UPDATE progress
        SET completed_lessons = ?3, last_accessed_lesson = ?4, quiz_scores = ?5,
            overall_progress = ?6, updated_at = ?7
        WHERE user_id = ?1 AND course_id = ?2
        "#,
    )
    .bind(progress.user_id)
    .bind(progress.course_id)
    .bind(Json(&progress.completed_lessons))
    .bind(progress.last_accessed_lesson.as_deref())
    .bind(Json(&progress.quiz_scores))
    .bind(progress.overall_progress)
    .bind(progress.updated_at)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Progress not found".to_string()));
    }
    Ok(())
}
