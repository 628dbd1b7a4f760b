// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    ApiDoc,
    handlers::{auth, document, quiz},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, documents, quizzes).
/// * Applies global middleware (Trace, CORS) and mounts Swagger UI.
/// * Injects shared state (pool, config, AI client, summary queue).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let document_routes = Router::new()
        // Reading a single document is public; everything else acts on the
        // caller's own rows.
        .route("/{id}", get(document::get_document))
        .merge(
            Router::new()
                .route("/", get(document::list_documents))
                .route("/text", post(document::create_text_document))
                .route("/image", post(document::create_image_document))
                .route("/file", post(document::create_file_document))
                .route("/{id}/summary", post(document::request_summary))
                .route("/{id}/question", post(document::ask_question))
                .route(
                    "/{id}/generate-quiz",
                    post(quiz::generate_quiz_from_document),
                )
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let quiz_routes = Router::new()
        .route("/{id}", get(quiz::get_quiz))
        .merge(
            Router::new()
                .route("/", post(quiz::create_quiz).get(quiz::list_quizzes))
                .route("/{id}/attempt", post(quiz::submit_attempt))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/documents", document_routes)
        .nest("/api/quizzes", quiz_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
