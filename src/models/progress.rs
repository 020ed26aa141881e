// src/models/progress.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use validator::Validate;

use crate::{
    engine::navigation::NextLesson,
    models::course::Course,
};

/// Latest result for one quiz. At most one entry per `quiz_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizScore {
    pub quiz_id: String,
    pub score: u32,
    pub total_questions: u32,
    pub completed_at: DateTime<Utc>,
}

/// Completion state of one user in one course.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub user_id: i64,
    pub course_id: i64,
    /// Completed lesson ids in completion order, without duplicates.
    pub completed_lessons: Vec<String>,
    pub last_accessed_lesson: Option<String>,
    pub quiz_scores: Vec<QuizScore>,
    /// Always derived from `completed_lessons`; 0..=100.
    pub overall_progress: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Progress {
    /// A fresh record with nothing completed.
    pub fn new(user_id: i64, course_id: i64, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            course_id,
            completed_lessons: Vec::new(),
            last_accessed_lesson: None,
            quiz_scores: Vec::new(),
            overall_progress: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Represents the 'progress' table in the database.
#[derive(Debug, FromRow)]
pub struct ProgressRow {
    pub user_id: i64,
    pub course_id: i64,
    pub completed_lessons: Json<Vec<String>>,
    pub last_accessed_lesson: Option<String>,
    pub quiz_scores: Json<Vec<QuizScore>>,
    pub overall_progress: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProgressRow> for Progress {
    fn from(row: ProgressRow) -> Self {
        Self {
            user_id: row.user_id,
            course_id: row.course_id,
            completed_lessons: row.completed_lessons.0,
            last_accessed_lesson: row.last_accessed_lesson,
            quiz_scores: row.quiz_scores.0,
            overall_progress: row.overall_progress,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompleteLessonRequest {
    #[validate(length(min = 1, max = 100))]
    pub lesson_id: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizRequest {
    #[validate(length(min = 1, max = 100))]
    pub quiz_id: String,
    pub score: u32,
    #[validate(range(min = 1))]
    pub total_questions: u32,
}

/// Response of the enroll endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollResponse {
    /// "enrolled" or "already_enrolled".
    pub status: &'static str,
    pub message: String,
    pub course: Course,
    pub progress: Progress,
}

/// One row of the learner dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledCourse {
    pub course: Course,
    pub progress: Option<Progress>,
    pub next_lesson: NextLesson,
}
