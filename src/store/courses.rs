// src/store/courses.rs

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, types::Json};

use crate::{
    error::AppError,
    models::course::{Course, CourseListParams, CourseRow, Module},
};

const COURSE_COLUMNS: &str = "id, title, description, instructor_id, instructor_name, thumbnail, \
     duration, category, modules, rating, created_at, updated_at";

/// Fields of a course about to be inserted.
pub struct NewCourse<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub instructor_id: i64,
    pub instructor_name: &'a str,
    pub thumbnail: &'a str,
    pub duration: &'a str,
    pub category: &'a str,
    pub modules: &'a [Module],
    pub rating: Option<f64>,
}

pub async fn find(conn: &mut SqliteConnection, id: i64) -> Result<Option<Course>, AppError> {
    let row = sqlx::query_as::<_, CourseRow>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let enrolled: Vec<i64> =
        sqlx::query_scalar("SELECT user_id FROM enrollments WHERE course_id = ?1")
            .bind(id)
            .fetch_all(&mut *conn)
            .await?;

    Ok(Some(row.into_course(enrolled.into_iter().collect())))
}

pub async fn exists(conn: &mut SqliteConnection, id: i64) -> Result<bool, AppError> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM courses WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

/// Lists courses, newest first, optionally filtered by category, title
/// keyword and instructor.
pub async fn list(
    conn: &mut SqliteConnection,
    params: &CourseListParams,
) -> Result<Vec<Course>, AppError> {
    let search_pattern = params.q.as_deref().map(contains_pattern);

    let rows = sqlx::query_as::<_, CourseRow>(&format!(
        r#"
        SELECT {COURSE_COLUMNS}
        FROM courses
        WHERE (?1 IS NULL OR category = ?1)
          AND (?2 IS NULL OR title LIKE ?2 ESCAPE '\')
          AND (?3 IS NULL OR instructor_id = ?3)
        ORDER BY created_at DESC, id DESC
        "#
    ))
    .bind(params.category.as_deref())
    .bind(search_pattern)
    .bind(params.instructor_id)
    .fetch_all(&mut *conn)
    .await?;

    attach_enrollments(conn, rows).await
}

/// Substring pattern for `LIKE ... ESCAPE '\'`; wildcards in the keyword match literally.
fn contains_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for ch in keyword.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Courses whose enrolled-student set contains `user_id`, in enrollment order.
pub async fn list_enrolled(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Vec<Course>, AppError> {
    let rows = sqlx::query_as::<_, CourseRow>(
        r#"
        SELECT c.id, c.title, c.description, c.instructor_id, c.instructor_name, c.thumbnail,
               c.duration, c.category, c.modules, c.rating, c.created_at, c.updated_at
        FROM courses c
        JOIN enrollments e ON e.course_id = c.id
        WHERE e.user_id = ?1
        ORDER BY e.enrolled_at, c.id
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    attach_enrollments(conn, rows).await
}

async fn attach_enrollments(
    conn: &mut SqliteConnection,
    rows: Vec<CourseRow>,
) -> Result<Vec<Course>, AppError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    // Use QueryBuilder for dynamic IN clause
    let mut query_builder =
        QueryBuilder::<Sqlite>::new("SELECT course_id, user_id FROM enrollments WHERE course_id IN (");
    let mut separated = query_builder.separated(",");
    for row in &rows {
        separated.push_bind(row.id);
    }
    separated.push_unseparated(")");

    let pairs: Vec<(i64, i64)> = query_builder
        .build_query_as::<(i64, i64)>()
        .fetch_all(&mut *conn)
        .await?;

    let mut enrolled: HashMap<i64, BTreeSet<i64>> = HashMap::new();
    for (course_id, user_id) in pairs {
        enrolled.entry(course_id).or_default().insert(user_id);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let students = enrolled.remove(&row.id).unwrap_or_default();
            row.into_course(students)
        })
        .collect())
}

pub async fn insert(conn: &mut SqliteConnection, course: NewCourse<'_>) -> Result<Course, AppError> {
    let now = Utc::now();
    let row = sqlx::query_as::<_, CourseRow>(&format!(
        r#"
        INSERT INTO courses
            (title, description, instructor_id, instructor_name, thumbnail, duration,
             category, modules, rating, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
        RETURNING {COURSE_COLUMNS}
        "#
    ))
    .bind(course.title)
    .bind(course.description)
    .bind(course.instructor_id)
    .bind(course.instructor_name)
    .bind(course.thumbnail)
    .bind(course.duration)
    .bind(course.category)
    .bind(Json(course.modules))
    .bind(course.rating)
    .bind(now)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        tracing::error!("Failed to insert course: {:?}", e);
        AppError::from(e)
    })?;

    Ok(row.into_course(BTreeSet::new()))
}

/// Writes the editable fields and `updated_at` of an existing course.
pub async fn update(conn: &mut SqliteConnection, course: &Course) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE courses
        SET title = ?2, description = ?3, thumbnail = ?4, duration = ?5,
            category = ?6, modules = ?7, updated_at = ?8
        WHERE id = ?1
        "#,
    )
    .bind(course.id)
    .bind(&course.title)
    .bind(&course.description)
    .bind(&course.thumbnail)
    .bind(&course.duration)
    .bind(&course.category)
    .bind(Json(&course.modules))
    .bind(course.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Refreshes the instructor name copied onto every course they own.
pub async fn rename_instructor(
    conn: &mut SqliteConnection,
    instructor_id: i64,
    name: &str,
) -> Result<u64, AppError> {
    let result = sqlx::query("UPDATE courses SET instructor_name = ?2 WHERE instructor_id = ?1")
        .bind(instructor_id)
        .bind(name)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

/// Inserts the enrollment row. Returns `false` if it already existed.
pub async fn add_enrollment(
    conn: &mut SqliteConnection,
    course_id: i64,
    user_id: i64,
    now: DateTime<Utc>,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO enrollments (course_id, user_id, enrolled_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT (course_id, user_id) DO NOTHING
        "#,
    )
    .bind(course_id)
    .bind(user_id)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

#[cfg(test)]
mod tests {
    use super::contains_pattern;

    #[test]
    fn keyword_wildcards_are_escaped() {
        assert_eq!(contains_pattern("rust"), "%rust%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b\\c"), "%a\\_b\\\\c%");
    }
}
