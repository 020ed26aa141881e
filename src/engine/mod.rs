// src/engine/mod.rs

//! Enrollment and progress rules. Pure functions over the API models; the
//! handlers load records, apply these, and persist the result.

pub mod enrollment;
pub mod navigation;
pub mod paths;
pub mod progress;

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::BTreeSet;

    use chrono::Utc;

    use crate::models::course::{Course, Lesson, Module};

    /// Course whose module `i` is `m{i+1}` holding the given lesson ids.
    pub fn course_with_modules(modules: &[&[&str]]) -> Course {
        let now = Utc::now();
        Course {
            id: 1,
            title: "Course".to_string(),
            description: "Description".to_string(),
            instructor_id: 1,
            instructor_name: "Instructor".to_string(),
            thumbnail: "/thumb.png".to_string(),
            duration: "1h".to_string(),
            category: "General".to_string(),
            modules: modules
                .iter()
                .enumerate()
                .map(|(i, lessons)| Module {
                    id: format!("m{}", i + 1),
                    title: format!("Module {}", i + 1),
                    lessons: lessons
                        .iter()
                        .map(|id| Lesson {
                            id: id.to_string(),
                            title: format!("Lesson {}", id),
                            content: "Body".to_string(),
                            video_url: None,
                            duration: "5 min".to_string(),
                            quizzes: vec![],
                        })
                        .collect(),
                })
                .collect(),
            enrolled_students: BTreeSet::new(),
            rating: None,
            created_at: now,
            updated_at: now,
        }
    }
}
