// src/handlers/paths.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use validator::Validate;

use crate::{
    engine::paths::path_completion,
    error::AppError,
    models::learning_path::{
        CreatePathRequest, PathCourseProgress, PathProgress, UpdatePathRequest,
    },
    store,
};

pub async fn list_paths(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;
    let paths = store::paths::list(&mut conn).await?;
    Ok(Json(paths))
}

pub async fn get_path(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;
    let path = store::paths::find(&mut conn, id)
        .await?
        .ok_or(AppError::NotFound("Learning path not found".to_string()))?;
    Ok(Json(path))
}

/// Creates a learning path. The creator must be an instructor and every
/// referenced course must exist.
pub async fn create_path(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreatePathRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mut conn = pool.acquire().await?;
    let creator = store::users::find_by_id(&mut conn, payload.created_by)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    if !creator.is_instructor() {
        return Err(AppError::Forbidden(
            "Only instructors can create learning paths".to_string(),
        ));
    }

    ensure_courses_exist(&mut conn, &payload.courses).await?;

    let path = store::paths::insert(
        &mut conn,
        &payload.title,
        &payload.description,
        &payload.courses,
        creator.id,
    )
    .await?;

    tracing::info!(path_id = path.id, created_by = creator.id, "Learning path created");

    Ok((StatusCode::CREATED, Json(path)))
}

/// Updates a learning path. Only its creator may do so.
pub async fn update_path(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePathRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mut conn = pool.acquire().await?;
    if let Some(courses) = &payload.courses {
        ensure_courses_exist(&mut conn, courses).await?;
    }

    let mut path = store::paths::find(&mut conn, id)
        .await?
        .ok_or(AppError::NotFound("Learning path not found".to_string()))?;

    if path.created_by != payload.user_id {
        return Err(AppError::Forbidden(
            "Not authorized to update this learning path".to_string(),
        ));
    }

    if let Some(title) = payload.title {
        path.title = title;
    }
    if let Some(description) = payload.description {
        path.description = description;
    }
    if let Some(courses) = payload.courses {
        path.courses = courses;
    }
    path.updated_at = Utc::now();

    store::paths::update(&mut conn, &path).await?;

    Ok(Json(path))
}

/// Derived completion of a path for one learner: the rounded mean of the
/// member courses' percentages, with missing progress counted as 0.
///
/// Each course percentage is the stored one, computed against that course's
/// lesson total at the learner's last completion.
pub async fn get_path_progress(
    State(pool): State<SqlitePool>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;
    let path = store::paths::find(&mut conn, id)
        .await?
        .ok_or(AppError::NotFound("Learning path not found".to_string()))?;

    store::users::find_by_id(&mut conn, user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let mut courses = Vec::with_capacity(path.courses.len());
    for &course_id in &path.courses {
        let Some(course) = store::courses::find(&mut conn, course_id).await? else {
            continue;
        };
        let overall_progress = store::progress::find(&mut conn, user_id, course_id)
            .await?
            .map_or(0, |progress| progress.overall_progress);

        courses.push(PathCourseProgress {
            course_id,
            title: course.title,
            overall_progress,
        });
    }

    let percentages: Vec<i64> = courses.iter().map(|c| c.overall_progress).collect();

    Ok(Json(PathProgress {
        path_id: path.id,
        user_id,
        overall_progress: path_completion(&percentages),
        courses,
    }))
}

async fn ensure_courses_exist(conn: &mut SqliteConnection, courses: &[i64]) -> Result<(), AppError> {
    for &course_id in courses {
        if !store::courses::exists(conn, course_id).await? {
            return Err(AppError::BadRequest(format!(
                "Course with ID {} does not exist",
                course_id
            )));
        }
    }
    Ok(())
}
