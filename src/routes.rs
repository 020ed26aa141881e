// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{courses, paths, progress, users},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (users, courses, progress, paths).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (pool, config, progress locks).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE]);

    let user_routes = Router::new()
        .route("/", get(users::list_users).post(users::register))
        .route("/login", post(users::login))
        .route("/{id}", get(users::get_user).put(users::update_user))
        .route("/{id}/courses", get(users::list_user_courses));

    let course_routes = Router::new()
        .route("/", get(courses::list_courses).post(courses::create_course))
        .route(
            "/{id}",
            get(courses::get_course).put(courses::update_course),
        )
        .route("/{id}/enroll", post(courses::enroll_student))
        .route("/{id}/next", get(courses::next_lesson));

    let progress_routes = Router::new()
        .route("/{user_id}/{course_id}", get(progress::get_progress))
        .route(
            "/{user_id}/{course_id}/lesson",
            put(progress::update_lesson_progress),
        )
        .route("/{user_id}/{course_id}/quiz", post(progress::submit_quiz));

    let path_routes = Router::new()
        .route("/", get(paths::list_paths).post(paths::create_path))
        .route("/{id}", get(paths::get_path).put(paths::update_path))
        .route("/{id}/progress/{user_id}", get(paths::get_path_progress));

    Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/courses", course_routes)
        .nest("/api/progress", progress_routes)
        .nest("/api/paths", path_routes)
        // Global Middleware (outermost first)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
