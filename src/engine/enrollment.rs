// src/engine/enrollment.rs

use crate::models::course::Course;

/// Outcome of adding a user to a course's enrolled-student set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enrollment {
    Enrolled,
    AlreadyEnrolled,
}

impl Enrollment {
    pub fn status(self) -> &'static str {
        match self {
            Enrollment::Enrolled => "enrolled",
            Enrollment::AlreadyEnrolled => "already_enrolled",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Enrollment::Enrolled => "Student enrolled successfully",
            Enrollment::AlreadyEnrolled => "User already enrolled in this course",
        }
    }
}

/// Adds `user_id` to the course. Any role may enroll.
pub fn enroll(course: &mut Course, user_id: i64) -> Enrollment {
    if course.enrolled_students.insert(user_id) {
        Enrollment::Enrolled
    } else {
        Enrollment::AlreadyEnrolled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::course_with_modules;

    #[test]
    fn first_enroll_adds_student() {
        let mut course = course_with_modules(&[&["l1"]]);
        assert_eq!(enroll(&mut course, 7), Enrollment::Enrolled);
        assert!(course.enrolled_students.contains(&7));
    }

    #[test]
    fn second_enroll_leaves_set_unchanged() {
        let mut course = course_with_modules(&[&["l1"]]);
        enroll(&mut course, 7);
        let before = course.enrolled_students.clone();

        assert_eq!(enroll(&mut course, 7), Enrollment::AlreadyEnrolled);
        assert_eq!(course.enrolled_students, before);
    }
}
