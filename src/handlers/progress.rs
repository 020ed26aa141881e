// src/handlers/progress.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use validator::Validate;

use crate::{
    db,
    engine::progress::{LessonCompletion, complete_lesson, total_lessons, upsert_quiz_score},
    error::AppError,
    models::{
        course::Course,
        progress::{CompleteLessonRequest, Progress, QuizScore, SubmitQuizRequest},
    },
    store,
    utils::locks::ProgressLocks,
};

/// Retrieves the progress record of a user in a course.
///
/// `overallProgress` is the stored value: it reflects the course's lesson
/// total at the learner's last completion, not any later module change.
pub async fn get_progress(
    State(pool): State<SqlitePool>,
    Path((user_id, course_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;
    let progress = store::progress::find(&mut conn, user_id, course_id)
        .await?
        .ok_or(AppError::NotFound("Progress not found".to_string()))?;
    Ok(Json(progress))
}

/// Marks a lesson as completed and recomputes the overall percentage.
///
/// * Creates the progress record (and the matching enrollment) if missing.
/// * Rejects lesson ids that are not part of the course.
/// * Completing an already completed lesson returns the record unchanged.
pub async fn update_lesson_progress(
    State(pool): State<SqlitePool>,
    State(locks): State<ProgressLocks>,
    Path((user_id, course_id)): Path<(i64, i64)>,
    Json(payload): Json<CompleteLessonRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let _guard = locks.lock(user_id, course_id).await;
    let mut tx = db::begin_write(&pool).await?;
    let now = Utc::now();

    let course = load_course(&mut tx, course_id).await?;
    if !course.has_lesson(&payload.lesson_id) {
        return Err(AppError::BadRequest(format!(
            "Lesson '{}' does not belong to course {}",
            payload.lesson_id, course_id
        )));
    }

    let mut progress = find_or_start(&mut tx, &course, user_id, now).await?;

    let outcome = complete_lesson(&mut progress, &payload.lesson_id, total_lessons(&course), now);
    if outcome == LessonCompletion::Recorded {
        store::progress::save(&mut tx, &progress).await?;
        tracing::info!(
            user_id,
            course_id,
            lesson_id = %payload.lesson_id,
            overall_progress = progress.overall_progress,
            "Lesson completed"
        );
    }

    tx.commit().await?;

    Ok(Json(progress))
}

/// Records a quiz result, replacing any earlier result for the same quiz.
/// Quiz results never change the overall percentage.
pub async fn submit_quiz(
    State(pool): State<SqlitePool>,
    State(locks): State<ProgressLocks>,
    Path((user_id, course_id)): Path<(i64, i64)>,
    Json(payload): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    if payload.score > payload.total_questions {
        return Err(AppError::BadRequest(
            "Score cannot exceed the number of questions".to_string(),
        ));
    }

    let _guard = locks.lock(user_id, course_id).await;
    let mut tx = db::begin_write(&pool).await?;
    let now = Utc::now();

    let course = load_course(&mut tx, course_id).await?;
    let mut progress = find_or_start(&mut tx, &course, user_id, now).await?;

    upsert_quiz_score(
        &mut progress,
        QuizScore {
            quiz_id: payload.quiz_id,
            score: payload.score,
            total_questions: payload.total_questions,
            completed_at: now,
        },
    );
    store::progress::save(&mut tx, &progress).await?;
    tx.commit().await?;

    tracing::info!(user_id, course_id, "Quiz score recorded");

    Ok(Json(progress))
}

async fn load_course(conn: &mut SqliteConnection, course_id: i64) -> Result<Course, AppError> {
    store::courses::find(conn, course_id)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))
}

/// Returns the existing record, or creates an empty one. Either way the
/// matching enrollment row is ensured, so progress never exists without it.
async fn find_or_start(
    conn: &mut SqliteConnection,
    course: &Course,
    user_id: i64,
    now: DateTime<Utc>,
) -> Result<Progress, AppError> {
    let existing = store::progress::find(conn, user_id, course.id).await?;

    if existing.is_none() {
        store::users::find_by_id(conn, user_id)
            .await?
            .ok_or(AppError::NotFound("User not found".to_string()))?;
    }

    if store::courses::add_enrollment(conn, course.id, user_id, now).await? {
        tracing::info!(user_id, course_id = course.id, "Enrolled on first activity");
    }

    match existing {
        Some(progress) => Ok(progress),
        None => {
            let progress = Progress::new(user_id, course.id, now);
            store::progress::insert_if_absent(conn, &progress).await?;
            Ok(progress)
        }
    }
}
