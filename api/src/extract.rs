use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde_json::Value;

use crate::error::ApiError;

/// A JSON request body. Validation happens downstream, so any syntactically
/// valid JSON value is accepted here.
#[derive(Debug, Clone)]
pub struct JsonBody(pub Value);

#[axum::async_trait]
impl<S: Send + Sync> FromRequest<S> for JsonBody {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<Value>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(invalid_json(rejection)),
        }
    }
}

fn invalid_json(rejection: JsonRejection) -> ApiError {
    ApiError::InvalidJson(rejection.body_text())
}
