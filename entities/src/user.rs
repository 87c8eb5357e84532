use crate::query::{param, ListQuery};
use crate::{from_document, null_as_default, QueryParams, Result};
use authz::{Principal, Role};
use database::{Document, SortDirection, SortSpec};
use fields::{escape_regex, ValidationErrors};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 40;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;

static USERNAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._-]+$").expect("username pattern is valid")
});

/// An account as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub username: String,
    pub password_hash: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub role: Role,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl User {
    pub fn from_document(document: Document) -> Result<Self> {
        from_document(document)
    }

    /// The identity carried by a session once this user signs in.
    pub fn principal(&self) -> Principal {
        Principal::new(self.id.clone(), self.username.clone(), self.role)
    }
}

/// Usernames are compared trimmed and lower-cased.
pub fn normalize_username(raw: Option<&JsonValue>) -> String {
    raw.and_then(JsonValue::as_str)
        .map(|name| name.trim().to_lowercase())
        .unwrap_or_default()
}

/// Validated registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub password: String,
}

impl Registration {
    pub fn validate(payload: &JsonValue) -> fields::Result<Self> {
        let Some(body) = payload.as_object() else {
            return Err(ValidationErrors::single("Request body must be a JSON object"));
        };

        let username = normalize_username(body.get("username"));
        let password = body
            .get("password")
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string();

        let mut errors = ValidationErrors::new();

        let length = username.chars().count();
        if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&length) {
            errors.push(format!(
                "Username must be between {} and {} characters",
                MIN_USERNAME_LENGTH, MAX_USERNAME_LENGTH
            ));
        }
        if !USERNAME_PATTERN.is_match(&username) {
            errors.push("Username may contain only letters, numbers, dot, underscore, and hyphen");
        }

        let length = password.chars().count();
        if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
            errors.push(format!(
                "Password must be between {} and {} characters",
                MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH
            ));
        }

        errors.into_result(Self { username, password })
    }
}

/// Login input. Only presence is checked; a wrong pair is reported as
/// invalid credentials, never as a validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn parse(payload: &JsonValue) -> fields::Result<Self> {
        let username = normalize_username(payload.get("username"));
        let password = payload
            .get("password")
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string();

        if username.is_empty() || password.is_empty() {
            return Err(ValidationErrors::single("Username and password are required"));
        }
        Ok(Self { username, password })
    }
}

/// Parse `{ "role": ... }` from an administrative role change.
pub fn parse_role_change(payload: &JsonValue) -> fields::Result<Role> {
    if !payload.is_object() {
        return Err(ValidationErrors::single("Request body must be a JSON object"));
    }
    payload
        .get("role")
        .and_then(JsonValue::as_str)
        .and_then(Role::parse_strict)
        .ok_or_else(|| ValidationErrors::single("role must be one of: user, admin"))
}

/// Build the filter and sort of a user list request. Users always list
/// newest first.
pub fn build_user_query(params: &QueryParams) -> ListQuery {
    let mut query = ListQuery::default();
    if let Some(username) = param(params, "username") {
        query.filter = std::mem::take(&mut query.filter).matches("username", escape_regex(username));
    }
    query.sort = vec![SortSpec::new("createdAt", SortDirection::Descending)];
    query
}

/// An account as exposed to clients. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::Condition;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_registration_normalizes_username() {
        let registration =
            Registration::validate(&json!({"username": "  Alice.B ", "password": "correct horse"}))
                .unwrap();
        assert_eq!(registration.username, "alice.b");
    }

    #[rstest]
    #[case(json!({"username": "al", "password": "longenough"}), "Username must be between 3 and 40 characters")]
    #[case(json!({"username": "al ice", "password": "longenough"}), "Username may contain only letters, numbers, dot, underscore, and hyphen")]
    #[case(json!({"username": "alice", "password": "short"}), "Password must be between 8 and 128 characters")]
    #[case(json!({"username": "alice"}), "Password must be between 8 and 128 characters")]
    #[case(json!("alice"), "Request body must be a JSON object")]
    fn test_registration_errors(#[case] payload: JsonValue, #[case] expected: &str) {
        let errors = Registration::validate(&payload).unwrap_err();
        assert_eq!(errors.first(), Some(expected));
    }

    #[test]
    fn test_login_requires_both_values() {
        assert!(LoginRequest::parse(&json!({"username": "Alice", "password": "x"})).is_ok());

        let err = LoginRequest::parse(&json!({"username": "alice"})).unwrap_err();
        assert_eq!(err.first(), Some("Username and password are required"));

        let err = LoginRequest::parse(&json!({"username": 7, "password": "secret"})).unwrap_err();
        assert_eq!(err.first(), Some("Username and password are required"));
    }

    #[test]
    fn test_role_change() {
        assert_eq!(parse_role_change(&json!({"role": "ADMIN"})), Ok(Role::Admin));
        assert!(parse_role_change(&json!({"role": "root"})).is_err());
        assert!(parse_role_change(&json!({})).is_err());
    }

    #[test]
    fn test_user_query() {
        let params = QueryParams::from([("username".to_string(), "a.b".to_string())]);
        let query = build_user_query(&params);

        assert_eq!(query.filter.get("username"), Some(&Condition::Matches(r"a\.b".into())));
        assert_eq!(
            query.sort,
            vec![SortSpec::new("createdAt", SortDirection::Descending)]
        );
    }

    #[test]
    fn test_public_user_hides_hash() {
        let user = User::from_document(
            json!({
                "id": "u1",
                "username": "alice",
                "passwordHash": "$argon2id$...",
                "role": "Admin",
                "createdAt": "2024-01-01T00:00:00.000000Z"
            })
            .as_object()
            .cloned()
            .unwrap(),
        )
        .unwrap();

        assert_eq!(user.role, Role::Admin);
        let public = serde_json::to_value(PublicUser::from(user)).unwrap();
        assert!(public.get("passwordHash").is_none());
        assert_eq!(public["role"], json!("admin"));
        assert_eq!(public["createdAt"], json!("2024-01-01T00:00:00.000000Z"));
    }
}
