//! Session-backed identity.
//!
//! The principal of a request only ever comes from the server-side session;
//! handlers receive it through the extractors below. The stored account is
//! consulted on every request, so role changes apply to live sessions.

use async_trait::async_trait;
use authz::Principal;
use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Session key holding the signed-in principal.
pub const PRINCIPAL_KEY: &str = "user";

/// Lifecycle of an authenticated session.
#[async_trait]
pub trait SessionTransport {
    /// Drop whatever the session held and move it to a fresh identifier.
    async fn regenerate(&self) -> ApiResult<()>;

    /// Persist the principal in the session.
    async fn save_principal(&self, principal: &Principal) -> ApiResult<()>;

    /// Remove the session entirely.
    async fn destroy(&self) -> ApiResult<()>;

    async fn load_principal(&self) -> ApiResult<Option<Principal>>;
}

#[async_trait]
impl SessionTransport for Session {
    async fn regenerate(&self) -> ApiResult<()> {
        self.clear().await;
        self.cycle_id().await?;
        Ok(())
    }

    async fn save_principal(&self, principal: &Principal) -> ApiResult<()> {
        self.insert(PRINCIPAL_KEY, principal).await?;
        self.save().await?;
        Ok(())
    }

    async fn destroy(&self) -> ApiResult<()> {
        self.flush().await?;
        Ok(())
    }

    async fn load_principal(&self) -> ApiResult<Option<Principal>> {
        Ok(self.get::<Principal>(PRINCIPAL_KEY).await?)
    }
}

async fn session_principal(parts: &Parts, state: &AppState) -> ApiResult<Option<Principal>> {
    let session = parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or_else(|| ApiError::internal("Session layer is not installed"))?;
    let Some(stored) = session.load_principal().await? else {
        return Ok(None);
    };

    let current = state.catalog.users.current_principal(&stored).await?;
    if current.is_none() {
        debug!(user_id = %stored.id, "Session refers to a missing account");
    }
    Ok(current)
}

/// The caller's principal, if signed in.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Principal>);

/// A signed-in caller; rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

/// A signed-in administrator; 401 without a session, 403 for other roles.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Principal);

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(session_principal(parts, state).await?))
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match session_principal(parts, state).await? {
            Some(principal) => Ok(AuthUser(principal)),
            None => {
                debug!(path = %parts.uri.path(), "Rejected anonymous request");
                Err(ApiError::unauthenticated())
            }
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(principal) = AuthUser::from_request_parts(parts, state).await?;
        if principal.is_admin() {
            Ok(AdminUser(principal))
        } else {
            Err(ApiError::Forbidden("Insufficient permissions".to_string()))
        }
    }
}
