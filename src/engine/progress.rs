// src/engine/progress.rs

//! Lesson completion and quiz scoring rules for a single progress record.

use chrono::{DateTime, Utc};

use crate::models::{
    course::Course,
    progress::{Progress, QuizScore},
};

/// Outcome of recording a lesson completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonCompletion {
    /// The lesson was new and the record changed.
    Recorded,
    /// The lesson was already completed; the record is untouched.
    AlreadyCompleted,
}

/// Number of lessons across all modules of the course as currently defined.
pub fn total_lessons(course: &Course) -> usize {
    course.modules.iter().map(|module| module.lessons.len()).sum()
}

/// `round(100 * completed / total)` with half-up rounding, 0 for an empty
/// course and never above 100.
pub fn overall_progress(completed: usize, total: usize) -> i64 {
    if total == 0 {
        return 0;
    }
    let completed = completed as u64;
    let total = total as u64;
    let percent = (200 * completed + total) / (2 * total);
    percent.min(100) as i64
}

/// Marks `lesson_id` complete and recomputes the percentage against
/// `total_lessons`. Idempotent per lesson id.
pub fn complete_lesson(
    progress: &mut Progress,
    lesson_id: &str,
    total_lessons: usize,
    now: DateTime<Utc>,
) -> LessonCompletion {
    if progress.completed_lessons.iter().any(|id| id == lesson_id) {
        return LessonCompletion::AlreadyCompleted;
    }

    progress.completed_lessons.push(lesson_id.to_string());
    progress.last_accessed_lesson = Some(lesson_id.to_string());
    progress.overall_progress = overall_progress(progress.completed_lessons.len(), total_lessons);
    progress.updated_at = now;

    LessonCompletion::Recorded
}

/// Replaces the score for `score.quiz_id` or appends it. Does not touch
/// `overall_progress`.
pub fn upsert_quiz_score(progress: &mut Progress, score: QuizScore) {
    progress.updated_at = score.completed_at;
    match progress
        .quiz_scores
        .iter_mut()
        .find(|existing| existing.quiz_id == score.quiz_id)
    {
        Some(existing) => *existing = score,
        None => progress.quiz_scores.push(score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::course_with_modules;

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(overall_progress(1, 4), 25);
        assert_eq!(overall_progress(3, 4), 75);
        assert_eq!(overall_progress(1, 3), 33);
        assert_eq!(overall_progress(2, 3), 67);
        assert_eq!(overall_progress(1, 8), 13);
        assert_eq!(overall_progress(4, 4), 100);
    }

    #[test]
    fn percentage_guards_empty_course_and_overflow() {
        assert_eq!(overall_progress(0, 0), 0);
        assert_eq!(overall_progress(3, 0), 0);
        assert_eq!(overall_progress(5, 4), 100);
    }

    #[test]
    fn total_counts_every_module() {
        let course = course_with_modules(&[&["l1", "l2"], &["l3", "l4"], &[]]);
        assert_eq!(total_lessons(&course), 4);
    }

    #[test]
    fn completion_appends_and_recomputes() {
        let now = Utc::now();
        let mut progress = Progress::new(3, 1, now);

        assert_eq!(
            complete_lesson(&mut progress, "lesson1", 4, now),
            LessonCompletion::Recorded
        );
        assert_eq!(progress.overall_progress, 25);

        complete_lesson(&mut progress, "lesson2", 4, now);
        assert_eq!(progress.overall_progress, 50);
        assert_eq!(progress.completed_lessons, vec!["lesson1", "lesson2"]);
        assert_eq!(progress.last_accessed_lesson.as_deref(), Some("lesson2"));
    }

    #[test]
    fn repeated_completion_is_a_no_op() {
        let now = Utc::now();
        let mut progress = Progress::new(3, 1, now);
        complete_lesson(&mut progress, "lesson1", 4, now);
        complete_lesson(&mut progress, "lesson2", 4, now);
        let before = progress.clone();

        assert_eq!(
            complete_lesson(&mut progress, "lesson1", 4, Utc::now()),
            LessonCompletion::AlreadyCompleted
        );
        assert_eq!(progress, before);
    }

    #[test]
    fn denominator_follows_current_course_size() {
        let now = Utc::now();
        let mut progress = Progress::new(3, 1, now);
        complete_lesson(&mut progress, "l1", 2, now);
        assert_eq!(progress.overall_progress, 50);

        // A module was added: the next completion uses the new total.
        complete_lesson(&mut progress, "l2", 8, now);
        assert_eq!(progress.overall_progress, 25);
    }

    #[test]
    fn quiz_upsert_keeps_one_entry_per_quiz() {
        let now = Utc::now();
        let mut progress = Progress::new(3, 1, now);
        let score = |points| QuizScore {
            quiz_id: "quiz1".to_string(),
            score: points,
            total_questions: 10,
            completed_at: now,
        };

        upsert_quiz_score(&mut progress, score(4));
        upsert_quiz_score(&mut progress, score(9));

        assert_eq!(progress.quiz_scores.len(), 1);
        assert_eq!(progress.quiz_scores[0].score, 9);
        assert_eq!(progress.overall_progress, 0);
    }

    #[test]
    fn quiz_upsert_appends_distinct_quizzes() {
        let now = Utc::now();
        let mut progress = Progress::new(3, 1, now);
        for id in ["a", "b"] {
            upsert_quiz_score(
                &mut progress,
                QuizScore {
                    quiz_id: id.to_string(),
                    score: 1,
                    total_questions: 2,
                    completed_at: now,
                },
            );
        }
        assert_eq!(progress.quiz_scores.len(), 2);
    }
}
