//! Identity types for ownership-based authorization.
//!
//! A [`Principal`] is derived from an authenticated session only. It is never
//! built from request payloads.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Role of an account. Parsing is case-insensitive and anything unknown
/// falls back to [`Role::User`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Strict parse used for administrative input; unlike `From<&str>` it
    /// rejects unknown values.
    pub fn parse_strict(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Role::parse_strict(value).unwrap_or_default()
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Role::from(value.as_str())
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Role::from(s))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub username: String,
    pub role: Role,
}

impl Principal {
    pub fn new(id: impl Into<String>, username: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            role,
        }
    }

    /// Creates a principal with the `user` role.
    pub fn user(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self::new(id, username, Role::User)
    }

    /// Creates a principal with the `admin` role.
    pub fn admin(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self::new(id, username, Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Mutating actions gated by ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Edit,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Edit => f.write_str("edit"),
            Action::Delete => f.write_str("delete"),
        }
    }
}

/// Anything carrying an owner reference. A `None` owner means the resource
/// belongs to the system and no regular user owns it.
pub trait Owned {
    fn owner_id(&self) -> Option<&str>;
}

/// Bare owner reference, handy when only the identifier is at hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerRef<'a>(pub Option<&'a str>);

impl Owned for OwnerRef<'_> {
    fn owner_id(&self) -> Option<&str> {
        self.0
    }
}

/// Permission flags attached to every shaped book and review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub can_edit: bool,
    pub can_delete: bool,
    pub is_owner: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing_is_case_insensitive() {
        assert_eq!(Role::from("ADMIN"), Role::Admin);
        assert_eq!(Role::from(" Admin "), Role::Admin);
        assert_eq!(Role::from("user"), Role::User);
    }

    #[test]
    fn test_unknown_role_falls_back_to_user() {
        assert_eq!(Role::from("superuser"), Role::User);
        assert_eq!(Role::from(""), Role::User);
        assert_eq!(Role::parse_strict("superuser"), None);
    }

    #[test]
    fn test_role_serde() {
        let role: Role = serde_json::from_str("\"Admin\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }

    #[test]
    fn test_principal_constructors() {
        let admin = Principal::admin("a1", "root");
        assert!(admin.is_admin());
        assert_eq!(admin.username, "root");

        let user = Principal::user("u1", "reader");
        assert!(!user.is_admin());
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn test_permissions_serialize_camel_case() {
        let json = serde_json::to_value(Permissions {
            can_edit: true,
            can_delete: false,
            is_owner: true,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"canEdit": true, "canDelete": false, "isOwner": true})
        );
    }
}
