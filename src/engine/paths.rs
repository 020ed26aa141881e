// src/engine/paths.rs

/// Rounded mean of member-course percentages. An empty path is 0.
pub fn path_completion(course_percentages: &[i64]) -> i64 {
    if course_percentages.is_empty() {
        return 0;
    }
    let count = course_percentages.len() as i64;
    let sum: i64 = course_percentages.iter().map(|p| (*p).clamp(0, 100)).sum();
    (2 * sum + count) / (2 * count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_member_courses() {
        assert_eq!(path_completion(&[100, 50, 0]), 50);
        assert_eq!(path_completion(&[25, 50]), 38);
        assert_eq!(path_completion(&[33, 33, 34]), 33);
    }

    #[test]
    fn empty_path_is_zero() {
        assert_eq!(path_completion(&[]), 0);
    }
}
