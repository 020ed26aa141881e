// src/models/course.rs

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use uuid::Uuid;
use validator::Validate;

use crate::{error::AppError, models::validate_url_string, utils::html::clean_html};

/// A multiple-choice question inside a lesson quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default)]
    pub id: String,
    #[validate(length(min = 1, max = 1000))]
    pub text: String,
    #[validate(length(min = 2, max = 10))]
    pub options: Vec<String>,
    pub correct_option_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    #[serde(default)]
    pub id: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(nested)]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    #[serde(default)]
    pub id: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Lesson body. Sanitized HTML.
    #[validate(length(min = 1, max = 100_000))]
    pub content: String,
    #[serde(default)]
    #[validate(custom(function = validate_url_string))]
    pub video_url: Option<String>,
    /// Display label such as "15 min".
    #[validate(length(min = 1, max = 50))]
    pub duration: String,
    #[serde(default)]
    #[validate(nested)]
    pub quizzes: Vec<Quiz>,
}

/// An ordered group of lessons. Module order, then lesson order, is the
/// linear progression through a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    #[serde(default)]
    pub id: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(nested)]
    pub lessons: Vec<Lesson>,
}

/// A course as served by the API, including its enrolled-student set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub instructor_id: i64,
    pub instructor_name: String,
    pub thumbnail: String,
    pub duration: String,
    pub category: String,
    pub modules: Vec<Module>,
    pub enrolled_students: BTreeSet<i64>,
    pub rating: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    pub fn lessons(&self) -> impl Iterator<Item = (&Module, &Lesson)> {
        self.modules
            .iter()
            .flat_map(|module| module.lessons.iter().map(move |lesson| (module, lesson)))
    }

    pub fn has_lesson(&self, lesson_id: &str) -> bool {
        self.lessons().any(|(_, lesson)| lesson.id == lesson_id)
    }
}

/// Represents the 'courses' table in the database.
/// Enrolled students live in the 'enrollments' table and are attached on load.
#[derive(Debug, FromRow)]
pub struct CourseRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub instructor_id: i64,
    pub instructor_name: String,
    pub thumbnail: String,
    pub duration: String,
    pub category: String,
    pub modules: Json<Vec<Module>>,
    pub rating: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CourseRow {
    pub fn into_course(self, enrolled_students: BTreeSet<i64>) -> Course {
        Course {
            id: self.id,
            title: self.title,
            description: self.description,
            instructor_id: self.instructor_id,
            instructor_name: self.instructor_name,
            thumbnail: self.thumbnail,
            duration: self.duration,
            category: self.category,
            modules: self.modules.0,
            enrolled_students,
            rating: self.rating,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Query parameters for listing courses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseListParams {
    pub category: Option<String>,
    pub q: Option<String>,
    pub instructor_id: Option<i64>,
}

/// DTO for creating a new course.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    pub instructor_id: i64,
    #[validate(length(min = 1, max = 500))]
    pub thumbnail: String,
    #[validate(length(min = 1, max = 50))]
    pub duration: String,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[serde(default)]
    #[validate(nested)]
    pub modules: Vec<Module>,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f64>,
}

/// DTO for updating a course. `user_id` is the acting user and must own the course.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    pub user_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub thumbnail: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub duration: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub category: Option<String>,
    #[validate(nested)]
    pub modules: Option<Vec<Module>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextLessonParams {
    pub user_id: Option<i64>,
}

/// Fills blank ids, checks structural rules the derive cannot express and
/// sanitizes lesson bodies. Run on every module list before it is stored.
pub fn prepare_modules(modules: &mut [Module]) -> Result<(), AppError> {
    let mut lesson_ids = HashSet::new();

    for module in modules.iter_mut() {
        assign_id(&mut module.id);

        for lesson in module.lessons.iter_mut() {
            assign_id(&mut lesson.id);
            if !lesson_ids.insert(lesson.id.clone()) {
                return Err(AppError::BadRequest(format!(
                    "Duplicate lesson id '{}'",
                    lesson.id
                )));
            }
            lesson.content = clean_html(&lesson.content);

            for quiz in lesson.quizzes.iter_mut() {
                assign_id(&mut quiz.id);
                for question in quiz.questions.iter_mut() {
                    assign_id(&mut question.id);
                    if question.correct_option_index >= question.options.len() {
                        return Err(AppError::BadRequest(format!(
                            "Question '{}' has no option at index {}",
                            question.text, question.correct_option_index
                        )));
                    }
                }
            }
        }
    }

    Ok(())
}

fn assign_id(id: &mut String) {
    if id.trim().is_empty() {
        *id = Uuid::new_v4().to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(id: &str) -> Lesson {
        Lesson {
            id: id.to_string(),
            title: "Intro".to_string(),
            content: "<p>Hello</p><script>alert(1)</script>".to_string(),
            video_url: None,
            duration: "5 min".to_string(),
            quizzes: vec![],
        }
    }

    #[test]
    fn prepare_assigns_missing_ids_and_sanitizes() {
        let mut modules = vec![Module {
            id: String::new(),
            title: "Basics".to_string(),
            lessons: vec![lesson(""), lesson("kept")],
        }];

        prepare_modules(&mut modules).unwrap();

        assert!(!modules[0].id.is_empty());
        assert!(!modules[0].lessons[0].id.is_empty());
        assert_eq!(modules[0].lessons[1].id, "kept");
        assert!(!modules[0].lessons[0].content.contains("script"));
    }

    #[test]
    fn prepare_rejects_duplicate_lesson_ids_across_modules() {
        let mut modules = vec![
            Module {
                id: "m1".to_string(),
                title: "One".to_string(),
                lessons: vec![lesson("same")],
            },
            Module {
                id: "m2".to_string(),
                title: "Two".to_string(),
                lessons: vec![lesson("same")],
            },
        ];

        assert!(matches!(
            prepare_modules(&mut modules),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn prepare_rejects_out_of_range_answer() {
        let mut with_quiz = lesson("l1");
        with_quiz.quizzes.push(Quiz {
            id: String::new(),
            title: "Check".to_string(),
            questions: vec![Question {
                id: String::new(),
                text: "2 + 2?".to_string(),
                options: vec!["3".to_string(), "4".to_string()],
                correct_option_index: 2,
            }],
        });
        let mut modules = vec![Module {
            id: "m1".to_string(),
            title: "One".to_string(),
            lessons: vec![with_quiz],
        }];

        assert!(prepare_modules(&mut modules).is_err());
    }
}
