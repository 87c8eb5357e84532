use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Display name of resources that no user owns.
pub const SYSTEM_OWNER: &str = "system";
/// Display name when an owner is recorded but its username snapshot is missing.
pub const UNKNOWN_OWNER: &str = "unknown";

/// Owner block embedded in book and review responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OwnerView {
    pub id: Option<String>,
    pub username: String,
}

impl OwnerView {
    /// Resolve from the stored owner id and username snapshot, without
    /// looking the user up.
    pub fn resolve(owner_id: Option<&str>, username_snapshot: Option<&str>) -> Self {
        let username = match (owner_id, username_snapshot) {
            (None, _) => SYSTEM_OWNER,
            (Some(_), Some(name)) if !name.trim().is_empty() => name,
            (Some(_), _) => UNKNOWN_OWNER,
        };
        Self {
            id: owner_id.map(str::to_string),
            username: username.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        assert_eq!(OwnerView::resolve(None, Some("ghost")).username, SYSTEM_OWNER);
        assert_eq!(OwnerView::resolve(Some("u1"), None).username, UNKNOWN_OWNER);
        assert_eq!(OwnerView::resolve(Some("u1"), Some("")).username, UNKNOWN_OWNER);

        let owner = OwnerView::resolve(Some("u1"), Some("alice"));
        assert_eq!(owner.id.as_deref(), Some("u1"));
        assert_eq!(owner.username, "alice");
    }
}
