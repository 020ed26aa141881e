// src/handlers/courses.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    db,
    engine::{
        enrollment::{Enrollment, enroll},
        navigation::next_lesson_for,
    },
    error::AppError,
    models::{
        course::{
            CourseListParams, CreateCourseRequest, EnrollRequest, NextLessonParams,
            UpdateCourseRequest, prepare_modules,
        },
        progress::{EnrollResponse, Progress},
    },
    store::{self, courses::NewCourse},
    utils::locks::ProgressLocks,
};

/// Lists all courses, optionally filtered by category, title keyword or instructor.
pub async fn list_courses(
    State(pool): State<SqlitePool>,
    Query(params): Query<CourseListParams>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;
    let courses = store::courses::list(&mut conn, &params).await?;
    Ok(Json(courses))
}

/// Retrieves a single course by ID.
pub async fn get_course(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;
    let course = store::courses::find(&mut conn, id)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))?;
    Ok(Json(course))
}

/// Creates a course owned by `instructor_id`.
///
/// The owner must exist and hold the instructor role. The instructor's name is
/// copied onto the course and the enrolled set starts empty.
pub async fn create_course(
    State(pool): State<SqlitePool>,
    Json(mut payload): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    prepare_modules(&mut payload.modules)?;

    let mut conn = pool.acquire().await?;
    let instructor = store::users::find_by_id(&mut conn, payload.instructor_id)
        .await?
        .ok_or(AppError::NotFound("Instructor not found".to_string()))?;

    if !instructor.is_instructor() {
        return Err(AppError::Forbidden(
            "Only instructors can create courses".to_string(),
        ));
    }

    let course = store::courses::insert(
        &mut conn,
        NewCourse {
            title: &payload.title,
            description: &payload.description,
            instructor_id: instructor.id,
            instructor_name: &instructor.name,
            thumbnail: &payload.thumbnail,
            duration: &payload.duration,
            category: &payload.category,
            modules: &payload.modules,
            rating: payload.rating,
        },
    )
    .await?;

    tracing::info!(course_id = course.id, instructor_id = instructor.id, "Course created");

    Ok((StatusCode::CREATED, Json(course)))
}

/// Updates a course. Only its instructor may do so.
///
/// Provided fields replace the stored ones. Replacing `modules` changes the
/// lesson total used by future progress computations.
pub async fn update_course(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(mut payload): Json<UpdateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    if let Some(modules) = payload.modules.as_mut() {
        prepare_modules(modules)?;
    }

    let mut conn = pool.acquire().await?;
    let mut course = store::courses::find(&mut conn, id)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))?;

    if course.instructor_id != payload.user_id {
        return Err(AppError::Forbidden(
            "Not authorized to update this course".to_string(),
        ));
    }

    if let Some(title) = payload.title {
        course.title = title;
    }
    if let Some(description) = payload.description {
        course.description = description;
    }
    if let Some(thumbnail) = payload.thumbnail {
        course.thumbnail = thumbnail;
    }
    if let Some(duration) = payload.duration {
        course.duration = duration;
    }
    if let Some(category) = payload.category {
        course.category = category;
    }
    if let Some(modules) = payload.modules {
        course.modules = modules;
    }
    course.updated_at = Utc::now();

    store::courses::update(&mut conn, &course).await?;

    tracing::info!(course_id = course.id, "Course updated");

    Ok(Json(course))
}

/// Enrolls a user in a course and creates their progress record.
///
/// * 201 with status "enrolled" on a new enrollment.
/// * 200 with status "already_enrolled" when the user was already in the set;
///   the existing progress record is returned untouched.
///
/// The enrollment row and the progress record are written in one transaction.
pub async fn enroll_student(
    State(pool): State<SqlitePool>,
    State(locks): State<ProgressLocks>,
    Path(course_id): Path<i64>,
    Json(payload): Json<EnrollRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = payload.user_id;
    let _guard = locks.lock(user_id, course_id).await;

    let mut tx = db::begin_write(&pool).await?;

    let mut course = store::courses::find(&mut tx, course_id)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))?;

    store::users::find_by_id(&mut tx, user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let now = Utc::now();
    let outcome = enroll(&mut course, user_id);
    if outcome == Enrollment::Enrolled {
        store::courses::add_enrollment(&mut tx, course_id, user_id, now).await?;
    }

    // An existing record is authoritative; only a missing one is created.
    let progress = match store::progress::find(&mut tx, user_id, course_id).await? {
        Some(existing) => existing,
        None => {
            let fresh = Progress::new(user_id, course_id, now);
            store::progress::insert_if_absent(&mut tx, &fresh).await?;
            fresh
        }
    };

    tx.commit().await?;

    let status = match outcome {
        Enrollment::Enrolled => {
            tracing::info!(user_id, course_id, "Student enrolled");
            StatusCode::CREATED
        }
        Enrollment::AlreadyEnrolled => {
            tracing::info!(user_id, course_id, "Student already enrolled");
            StatusCode::OK
        }
    };

    Ok((
        status,
        Json(EnrollResponse {
            status: outcome.status(),
            message: outcome.message().to_string(),
            course,
            progress,
        }),
    ))
}

/// Returns the lesson the learner should open next, or a "no lessons" /
/// "review course" signal. Without `userId` the first lesson is suggested.
pub async fn next_lesson(
    State(pool): State<SqlitePool>,
    Path(course_id): Path<i64>,
    Query(params): Query<NextLessonParams>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;
    let course = store::courses::find(&mut conn, course_id)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))?;

    let progress = match params.user_id {
        Some(user_id) => store::progress::find(&mut conn, user_id, course_id).await?,
        None => None,
    };

    Ok(Json(next_lesson_for(&course, progress.as_ref())))
}
