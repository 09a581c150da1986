// src/routes.rs

use axum::{
    Router,
    http::{Method, header},
    middleware,
    routing::{delete, get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{admin, assessment, auth, course, profile},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, courses, skills, profile, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (repository and configuration).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_layer = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let course_routes = Router::new()
        .route("/", get(course::list_courses))
        // Protected assessment routes
        .merge(
            Router::new()
                .route(
                    "/{id}/assessment",
                    get(assessment::get_assessment).post(assessment::submit_assessment),
                )
                .route_layer(auth_layer.clone()),
        );

    let me_routes = Router::new()
        .route("/api/me", get(profile::get_me))
        .route("/api/skills", get(assessment::list_my_skills))
        .route("/api/skills/{course_id}", get(assessment::get_my_skill))
        .route_layer(auth_layer.clone());

    let admin_routes = Router::new()
        .route("/courses", post(admin::create_course))
        .route("/items", post(admin::create_item))
        .route("/items/{id}", delete(admin::delete_item))
        // Auth first, then the admin check
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(auth_layer);

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/courses", course_routes)
        .nest("/api/admin", admin_routes)
        .route("/api/leaderboard", get(assessment::get_leaderboard))
        .merge(me_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
