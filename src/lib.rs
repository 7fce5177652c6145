use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, MethodRouter},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod ownership;
pub mod validation;

use auth::IdentityProvider;
use config::AppConfig;
use database::Store;

/// Shared per-process state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub identity: Arc<dyn IdentityProvider>,
    pub config: Arc<AppConfig>,
}

/// Build the full HTTP application
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    // Layered over the fallback too, so unknown /api paths answer 401 before 404
    let api = api_routes()
        .fallback(handlers::public::not_found)
        .layer(from_fn_with_state(state.clone(), middleware::require_auth));

    let router = Router::new()
        // Public
        .route("/", methods(get(handlers::public::root)))
        .route("/health", methods(get(handlers::public::health)))
        // Protected
        .nest("/api", api)
        .fallback(handlers::public::not_found)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .with_state(state);

    let router = match cors_layer(&config) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    if config.api.enable_request_logging {
        router.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
    } else {
        router
    }
}

fn api_routes() -> Router<AppState> {
    use handlers::protected::{
        documents, flashcards, lessons, profiles, progress, quiz_attempts, quizzes, reviews,
    };

    Router::new()
        .route("/documents", methods(get(documents::list).post(documents::create)))
        .route(
            "/documents/:id",
            methods(get(documents::get).patch(documents::update).delete(documents::delete)),
        )
        .route("/lessons", methods(get(lessons::list).post(lessons::create)))
        .route(
            "/lessons/:id",
            methods(get(lessons::get).patch(lessons::update).delete(lessons::delete)),
        )
        .route("/quizzes", methods(get(quizzes::list).post(quizzes::create)))
        .route(
            "/quizzes/:id",
            methods(get(quizzes::get).patch(quizzes::update).delete(quizzes::delete)),
        )
        .route(
            "/quiz-attempts",
            methods(get(quiz_attempts::list).post(quiz_attempts::create)),
        )
        .route(
            "/quiz-attempts/:id",
            methods(
                get(quiz_attempts::get)
                    .patch(quiz_attempts::update)
                    .delete(quiz_attempts::delete),
            ),
        )
        .route("/flashcards", methods(get(flashcards::list).post(flashcards::create)))
        .route(
            "/flashcards/:id",
            methods(get(flashcards::get).patch(flashcards::update).delete(flashcards::delete)),
        )
        .route("/reviews", methods(get(reviews::list).post(reviews::create)))
        .route(
            "/reviews/:id",
            methods(get(reviews::get).patch(reviews::update).delete(reviews::delete)),
        )
        .route(
            "/profiles",
            methods(get(profiles::get).patch(profiles::update).delete(profiles::delete)),
        )
        .route(
            "/progress",
            methods(get(progress::get).patch(progress::update).delete(progress::delete)),
        )
}

/// JSON 405 in place of axum's empty default
fn methods(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.fallback(handlers::public::method_not_allowed)
}

/// Explicit allow-list when origins are configured; permissive only in development
fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    let security = &config.security;
    if !security.enable_cors {
        return None;
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        if config.is_development() {
            return Some(CorsLayer::permissive());
        }
        tracing::warn!("CORS enabled without origins outside development; cross-origin requests stay blocked");
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
    )
}
