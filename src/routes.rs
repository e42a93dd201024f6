// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, question, scoring_result, user_answer},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Nests one router per resource under `/api`.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool, Config).
///
/// Authentication is per handler: endpoints that take a `Caller` require a bearer token.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let user_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/get/login", get(auth::get_login_user));

    let scoring_result_routes = Router::new()
        .route("/add", post(scoring_result::add_scoring_result))
        .route("/delete", post(scoring_result::delete_scoring_result))
        .route("/update", post(scoring_result::update_scoring_result))
        .route("/edit", post(scoring_result::edit_scoring_result))
        .route("/get/vo", get(scoring_result::get_scoring_result_vo))
        .route("/list/page", post(scoring_result::list_scoring_result_by_page))
        .route("/list/page/vo", post(scoring_result::list_scoring_result_vo_by_page))
        .route(
            "/my/list/page/vo",
            post(scoring_result::list_my_scoring_result_vo_by_page),
        );

    let question_routes = Router::new()
        .route("/add", post(question::add_question))
        .route("/delete", post(question::delete_question))
        .route("/update", post(question::update_question))
        .route("/edit", post(question::edit_question))
        .route("/get/vo", get(question::get_question_vo))
        .route("/list/page", post(question::list_question_by_page))
        .route("/list/page/vo", post(question::list_question_vo_by_page))
        .route("/my/list/page/vo", post(question::list_my_question_vo_by_page));

    // Answer history is private, so there is no public listing.
    let user_answer_routes = Router::new()
        .route("/add", post(user_answer::add_user_answer))
        .route("/delete", post(user_answer::delete_user_answer))
        .route("/get/vo", get(user_answer::get_user_answer_vo))
        .route("/list/page", post(user_answer::list_user_answer_by_page))
        .route("/my/list/page/vo", post(user_answer::list_my_user_answer_vo_by_page));

    Router::new()
        .nest("/api/user", user_routes)
        .nest("/api/scoring_result", scoring_result_routes)
        .nest("/api/question", question_routes)
        .nest("/api/user_answer", user_answer_routes)
        // Global Middleware (applied top to bottom)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
