// src/engine/navigation.rs

//! "Resume / next lesson" derivation. Read-only; recomputed on every view.

use serde::Serialize;

use crate::models::{
    course::{Course, Lesson, Module},
    progress::Progress,
};

/// Pointer to a lesson within the flattened course sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonRef {
    pub module_id: String,
    pub module_title: String,
    pub lesson_id: String,
    pub lesson_title: String,
    /// Zero-based index in module order, then lesson order.
    pub position: usize,
}

impl LessonRef {
    fn new(position: usize, module: &Module, lesson: &Lesson) -> Self {
        Self {
            module_id: module.id.clone(),
            module_title: module.title.clone(),
            lesson_id: lesson.id.clone(),
            lesson_title: lesson.title.clone(),
            position,
        }
    }
}

/// What the learner should see next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NextLesson {
    Lesson { lesson: LessonRef },
    /// The course has no lessons at all.
    NoLessons,
    /// Every lesson is completed.
    ReviewCourse,
}

pub fn next_lesson_for(course: &Course, progress: Option<&Progress>) -> NextLesson {
    let mut sequence = course.lessons().enumerate();

    let started = progress.filter(|p| p.last_accessed_lesson.is_some());
    let Some(progress) = started else {
        return match sequence.next() {
            Some((position, (module, lesson))) => NextLesson::Lesson {
                lesson: LessonRef::new(position, module, lesson),
            },
            None => NextLesson::NoLessons,
        };
    };

    let mut any = false;
    for (position, (module, lesson)) in sequence {
        any = true;
        if !progress.completed_lessons.contains(&lesson.id) {
            return NextLesson::Lesson {
                lesson: LessonRef::new(position, module, lesson),
            };
        }
    }

    if any {
        NextLesson::ReviewCourse
    } else {
        NextLesson::NoLessons
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{progress::complete_lesson, test_support::course_with_modules};
    use chrono::Utc;

    fn lesson_id(next: &NextLesson) -> Option<&str> {
        match next {
            NextLesson::Lesson { lesson } => Some(&lesson.lesson_id),
            _ => None,
        }
    }

    fn progress_with(completed: &[&str]) -> Progress {
        let now = Utc::now();
        let mut progress = Progress::new(1, 1, now);
        for id in completed {
            complete_lesson(&mut progress, id, 3, now);
        }
        progress
    }

    #[test]
    fn without_progress_starts_at_first_lesson() {
        let course = course_with_modules(&[&["L1", "L2"], &["L3"]]);
        assert_eq!(lesson_id(&next_lesson_for(&course, None)), Some("L1"));
    }

    #[test]
    fn returns_first_incomplete_lesson() {
        let course = course_with_modules(&[&["L1", "L2", "L3"]]);
        let progress = progress_with(&["L1"]);

        let next = next_lesson_for(&course, Some(&progress));
        assert_eq!(lesson_id(&next), Some("L2"));
    }

    #[test]
    fn scans_in_order_rather_than_after_last_accessed() {
        let course = course_with_modules(&[&["L1", "L2"], &["L3"]]);
        let progress = progress_with(&["L3"]);

        let next = next_lesson_for(&course, Some(&progress));
        assert_eq!(lesson_id(&next), Some("L1"));
    }

    #[test]
    fn crosses_module_boundaries() {
        let course = course_with_modules(&[&["L1"], &["L2"]]);
        let progress = progress_with(&["L1"]);

        match next_lesson_for(&course, Some(&progress)) {
            NextLesson::Lesson { lesson } => {
                assert_eq!(lesson.lesson_id, "L2");
                assert_eq!(lesson.position, 1);
                assert_eq!(lesson.module_id, "m1");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn all_completed_means_review() {
        let course = course_with_modules(&[&["L1", "L2", "L3"]]);
        let progress = progress_with(&["L1", "L2", "L3"]);

        assert_eq!(
            next_lesson_for(&course, Some(&progress)),
            NextLesson::ReviewCourse
        );
    }

    #[test]
    fn empty_course_signals_no_lessons() {
        let course = course_with_modules(&[&[]]);
        assert_eq!(next_lesson_for(&course, None), NextLesson::NoLessons);

        let progress = progress_with(&["gone"]);
        assert_eq!(
            next_lesson_for(&course, Some(&progress)),
            NextLesson::NoLessons
        );
    }

    #[test]
    fn progress_without_resume_point_starts_over() {
        let course = course_with_modules(&[&["L1", "L2"]]);
        let progress = Progress::new(1, 1, Utc::now());

        assert_eq!(
            lesson_id(&next_lesson_for(&course, Some(&progress))),
            Some("L1")
        );
    }

    #[test]
    fn serializes_with_status_tag() {
        let json = serde_json::to_value(NextLesson::ReviewCourse).unwrap();
        assert_eq!(json["status"], "review_course");

        let course = course_with_modules(&[&["L1"]]);
        let json = serde_json::to_value(next_lesson_for(&course, None)).unwrap();
        assert_eq!(json["status"], "lesson");
        assert_eq!(json["lesson"]["lessonId"], "L1");
    }
}
