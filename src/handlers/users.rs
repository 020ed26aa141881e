// src/handlers/users.rs

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    auth::authenticate,
    db,
    engine::navigation::next_lesson_for,
    error::AppError,
    models::{
        progress::EnrolledCourse,
        user::{CreateUserRequest, LoginRequest, UpdateUserRequest},
    },
    store::{self, users::NewUser},
    utils::hash::hash_password,
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the user object (excluding password).
pub async fn register(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let hashed_password = hash_password(&payload.password)?;

    let mut conn = pool.acquire().await?;
    let user = store::users::insert(
        &mut conn,
        NewUser {
            name: &payload.name,
            email: &payload.email,
            password_hash: &hashed_password,
            role: payload.role,
            avatar: payload.avatar.as_deref(),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, role = ?user.role, "User registered");

    Ok((StatusCode::CREATED, Json(user)))
}

/// Verifies email and password and returns the user record.
///
/// The client keeps the returned identity for its session; no token is issued.
pub async fn login(
    State(pool): State<SqlitePool>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.validate().is_err() {
        return Err(AppError::invalid_credentials());
    }

    let mut conn = pool.acquire().await?;
    let user = authenticate(&mut conn, &payload.email, &payload.password).await?;

    Ok(Json(user))
}

pub async fn list_users(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;
    let users = store::users::list(&mut conn).await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;
    let user = store::users::find_by_id(&mut conn, id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

/// Updates name and avatar. Role and email stay as registered.
///
/// Renaming an instructor also rewrites the name shown on their courses.
pub async fn update_user(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut tx = db::begin_write(&pool).await?;
    let user = store::users::update_profile(
        &mut tx,
        id,
        payload.name.as_deref(),
        payload.avatar.as_deref(),
    )
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    if payload.name.is_some() && user.is_instructor() {
        let courses = store::courses::rename_instructor(&mut tx, user.id, &user.name).await?;
        tracing::info!(user_id = user.id, courses, "Instructor renamed");
    }

    tx.commit().await?;

    Ok(Json(user))
}

/// Learner dashboard: enrolled courses with their progress and the lesson
/// to resume at.
pub async fn list_user_courses(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;
    store::users::find_by_id(&mut conn, id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let courses = store::courses::list_enrolled(&mut conn, id).await?;
    let mut progress_by_course: HashMap<i64, _> = store::progress::list_for_user(&mut conn, id)
        .await?
        .into_iter()
        .map(|progress| (progress.course_id, progress))
        .collect();

    let dashboard: Vec<EnrolledCourse> = courses
        .into_iter()
        .map(|course| {
            let progress = progress_by_course.remove(&course.id);
            let next_lesson = next_lesson_for(&course, progress.as_ref());
            EnrolledCourse {
                course,
                progress,
                next_lesson,
            }
        })
        .collect();

    Ok(Json(dashboard))
}
