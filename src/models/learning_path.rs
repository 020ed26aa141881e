// src/models/learning_path.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use validator::Validate;

/// An ordered grouping of courses. Has no progress record of its own.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPath {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub courses: Vec<i64>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Represents the 'learning_paths' table in the database.
#[derive(Debug, FromRow)]
pub struct LearningPathRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub courses: Json<Vec<i64>>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LearningPathRow> for LearningPath {
    fn from(row: LearningPathRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            courses: row.courses.0,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePathRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[serde(default)]
    pub courses: Vec<i64>,
    pub created_by: i64,
}

/// DTO for updating a path. `user_id` is the acting user and must be the creator.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePathRequest {
    pub user_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub description: Option<String>,
    pub courses: Option<Vec<i64>>,
}

/// Completion of one member course, as shown on a path page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathCourseProgress {
    pub course_id: i64,
    pub title: String,
    pub overall_progress: i64,
}

/// Derived path completion for one learner. Computed per request, never stored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathProgress {
    pub path_id: i64,
    pub user_id: i64,
    pub overall_progress: i64,
    pub courses: Vec<PathCourseProgress>,
}
