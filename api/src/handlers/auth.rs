//! Password authentication and session lifecycle handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use tower_sessions::Session;
use tracing::{debug, info};

use crate::{
    error::{ApiErrorResponse, ApiResult},
    extract::JsonBody,
    models::{ApiResponse, AuthData, MeData, SessionUser},
    session::{MaybeUser, SessionTransport},
    AppState,
};
use catalog::SignedIn;

/// Start a fresh session for a signed-in account.
async fn establish(session: &Session, signed_in: &SignedIn) -> ApiResult<()> {
    session.regenerate().await?;
    session.save_principal(&signed_in.principal).await?;
    debug!(user_id = %signed_in.principal.id, "Session established");
    Ok(())
}

/// Register a new account and sign it in
///
/// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = serde_json::Value,
    responses(
        (status = 201, description = "Registration successful", body = AuthData),
        (status = 400, description = "Invalid username or password", body = ApiErrorResponse),
        (status = 409, description = "Username is already taken", body = ApiErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    JsonBody(payload): JsonBody,
) -> ApiResult<impl IntoResponse> {
    let signed_in = state.catalog.users.register(&payload).await?;
    establish(&session, &signed_in).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Registration successful",
            AuthData {
                user: signed_in.user,
            },
        )),
    ))
}

/// Sign in with username and password
///
/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Login successful", body = AuthData),
        (status = 400, description = "Username and password are required", body = ApiErrorResponse),
        (status = 401, description = "Invalid credentials", body = ApiErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    JsonBody(payload): JsonBody,
) -> ApiResult<impl IntoResponse> {
    let signed_in = state.catalog.users.authenticate(&payload).await?;
    establish(&session, &signed_in).await?;

    Ok(Json(ApiResponse::with_message(
        "Login successful",
        AuthData {
            user: signed_in.user,
        },
    )))
}

/// End the current session
///
/// POST /api/auth/logout
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Logout successful")),
    tag = "auth"
)]
pub async fn logout(Extension(session): Extension<Session>) -> ApiResult<impl IntoResponse> {
    if let Some(principal) = session.load_principal().await? {
        info!(user_id = %principal.id, "User signed out");
    }
    session.destroy().await?;

    Ok(Json(ApiResponse::message("Logout successful")))
}

/// Describe the current session
///
/// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses((status = 200, description = "Session state", body = MeData)),
    tag = "auth"
)]
pub async fn me(MaybeUser(principal): MaybeUser) -> ApiResult<impl IntoResponse> {
    let data = MeData {
        authenticated: principal.is_some(),
        user: principal.map(SessionUser::from),
    };
    Ok(Json(ApiResponse::data(data)))
}
