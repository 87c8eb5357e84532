use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tower_sessions::{cookie::SameSite, Expiry, SessionManagerLayer, SessionStore};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware_hooks;
pub mod models;
pub mod server;
pub mod session;


pub use server::{start_server_with_config, ApiConfig, Environment};
pub use tower_sessions_sqlx_store::SqliteStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: catalog::Catalog,
    pub config: Arc<ApiConfig>,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::books::list_books,
        handlers::books::get_book,
        handlers::books::create_book,
        handlers::books::update_book,
        handlers::books::delete_book,
        handlers::reviews::list_reviews,
        handlers::reviews::get_review,
        handlers::reviews::create_review,
        handlers::reviews::update_review,
        handlers::reviews::delete_review,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::me,
        handlers::users::list_users,
        handlers::users::change_role,
        handlers::health::health_check,
    ),
    components(
        schemas(
            entities::BookResponse,
            entities::ReviewResponse,
            entities::PublicUser,
            entities::OwnerView,
            entities::PageMeta,
            authz::Permissions,
            authz::Role,
            models::AuthData,
            models::MeData,
            models::SessionUser,
            models::BookDeletedData,
            models::HealthResponse,
            models::DatabaseHealth,
            error::ApiErrorResponse,
        )
    ),
    tags(
        (name = "books", description = "Book catalog"),
        (name = "reviews", description = "Book reviews"),
        (name = "auth", description = "Sign-in and session management"),
        (name = "users", description = "Account administration"),
        (name = "health", description = "Health check endpoints"),
    ),
    info(
        title = "Bookshelf API",
        version = "1.0.0",
        description = "Book catalog with owner-scoped reviews",
    ),
)]
pub struct ApiDoc;

/// Create the main API router with all routes and middleware
pub fn create_router<S>(state: AppState, sessions: S) -> Router
where
    S: SessionStore + Clone,
{
    let api = Router::new()
        .route(
            "/books",
            get(handlers::books::list_books).post(handlers::books::create_book),
        )
        .route(
            "/books/:id",
            get(handlers::books::get_book)
                .put(handlers::books::update_book)
                .delete(handlers::books::delete_book),
        )
        .route(
            "/reviews",
            get(handlers::reviews::list_reviews).post(handlers::reviews::create_review),
        )
        .route(
            "/reviews/:id",
            get(handlers::reviews::get_review)
                .put(handlers::reviews::update_review)
                .delete(handlers::reviews::delete_review),
        )
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
        .route("/users", get(handlers::users::list_users))
        .route("/users/:id/role", patch(handlers::users::change_role))
        .route("/health", get(handlers::health::health_check));

    let session_layer = SessionManagerLayer::new(sessions)
        .with_name(state.config.session_cookie_name.clone())
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(state.config.secure_cookies())
        .with_expiry(Expiry::OnInactivity(session_expiry(&state.config)));

    Router::new()
        .nest("/api", api)
        .merge(SwaggerUi::new("/api/swagger").url("/api/openapi.json", ApiDoc::openapi()))
        .fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middleware_hooks::response_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middleware_hooks::request_middleware,
        ))
        .layer(session_layer)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Upper bound on session lifetime; keeps expiry arithmetic in range.
const MAX_SESSION_AGE_SECS: u64 = 10 * 365 * 24 * 60 * 60;

fn session_expiry(config: &ApiConfig) -> time::Duration {
    let secs = config.session_max_age.as_secs().min(MAX_SESSION_AGE_SECS);
    time::Duration::seconds(secs as i64)
}
