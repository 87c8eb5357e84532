//! Ownership-based authorization for books and reviews.
//!
//! The rules are small and fixed:
//!
//! - an admin may manage any resource;
//! - anyone else may manage only resources whose owner id equals their own;
//! - without a principal nothing may be managed;
//! - a resource with no owner is system-owned and only admins manage it.
//!
//! "Manage" covers both editing and deleting. [`is_owner`] is a display flag
//! and ignores the role.

pub mod error;
pub mod types;

pub use error::{AuthzError, Result};
pub use types::{Action, OwnerRef, Owned, Permissions, Principal, Role};

use tracing::warn;

/// Whether the principal owns the resource. Identifiers compare as text.
pub fn is_owner<R: Owned + ?Sized>(resource: &R, principal: Option<&Principal>) -> bool {
    match (resource.owner_id(), principal) {
        (Some(owner), Some(principal)) => owner == principal.id,
        _ => false,
    }
}

/// Whether the principal may edit or delete the resource.
pub fn can_manage<R: Owned + ?Sized>(resource: &R, principal: Option<&Principal>) -> bool {
    match principal {
        Some(p) if p.is_admin() => true,
        Some(_) => is_owner(resource, principal),
        None => false,
    }
}

/// Permission flags for display alongside the resource.
pub fn permissions<R: Owned + ?Sized>(resource: &R, principal: Option<&Principal>) -> Permissions {
    let manage = can_manage(resource, principal);
    Permissions {
        can_edit: manage,
        can_delete: manage,
        is_owner: is_owner(resource, principal),
    }
}

/// Require that the principal may perform `action` on the resource.
pub fn authorize<R: Owned + ?Sized>(
    action: Action,
    resource: &R,
    principal: Option<&Principal>,
) -> Result<()> {
    let Some(p) = principal else {
        return Err(AuthzError::Unauthenticated);
    };

    if can_manage(resource, Some(p)) {
        Ok(())
    } else {
        warn!(
            principal = %p.id,
            owner = ?resource.owner_id(),
            %action,
            "Denied access to resource owned by someone else"
        );
        Err(AuthzError::Forbidden { action })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn owned(owner: Option<&str>) -> OwnerRef<'_> {
        OwnerRef(owner)
    }

    #[test]
    fn test_owner_can_manage() {
        let alice = Principal::user("u1", "alice");
        assert!(can_manage(&owned(Some("u1")), Some(&alice)));
        assert!(is_owner(&owned(Some("u1")), Some(&alice)));
    }

    #[test]
    fn test_other_user_cannot_manage() {
        let bob = Principal::user("u2", "bob");
        assert!(!can_manage(&owned(Some("u1")), Some(&bob)));
        assert!(!is_owner(&owned(Some("u1")), Some(&bob)));
    }

    #[test]
    fn test_admin_manages_everything_but_owns_nothing_else() {
        let root = Principal::admin("a1", "root");
        assert!(can_manage(&owned(Some("u1")), Some(&root)));
        assert!(can_manage(&owned(None), Some(&root)));
        assert!(!is_owner(&owned(Some("u1")), Some(&root)));
    }

    #[test]
    fn test_system_owned_resource() {
        let alice = Principal::user("u1", "alice");
        assert!(!can_manage(&owned(None), Some(&alice)));
        assert!(!is_owner(&owned(None), Some(&alice)));
    }

    #[test]
    fn test_anonymous_gets_nothing() {
        assert!(!can_manage(&owned(Some("u1")), None));
        assert_eq!(permissions(&owned(Some("u1")), None), Permissions::default());
    }

    #[test]
    fn test_authorize_distinguishes_unauthenticated_from_forbidden() {
        let bob = Principal::user("u2", "bob");

        assert_eq!(
            authorize(Action::Edit, &owned(Some("u1")), None),
            Err(AuthzError::Unauthenticated)
        );
        assert_eq!(
            authorize(Action::Delete, &owned(Some("u1")), Some(&bob)),
            Err(AuthzError::Forbidden {
                action: Action::Delete
            })
        );
        assert!(authorize(Action::Edit, &owned(Some("u2")), Some(&bob)).is_ok());
    }

    proptest! {
        #[test]
        fn prop_can_manage_iff_admin_or_owner(
            owner in proptest::option::of("[a-f0-9]{4}"),
            principal_id in "[a-f0-9]{4}",
            admin in any::<bool>(),
        ) {
            let role = if admin { Role::Admin } else { Role::User };
            let principal = Principal::new(principal_id.clone(), "someone", role);
            let resource = owned(owner.as_deref());

            let expected = admin || owner.as_deref() == Some(principal_id.as_str());
            prop_assert_eq!(can_manage(&resource, Some(&principal)), expected);

            let flags = permissions(&resource, Some(&principal));
            prop_assert_eq!(flags.can_edit, flags.can_delete);
            prop_assert_eq!(flags.is_owner, owner.as_deref() == Some(principal_id.as_str()));
        }
    }
}
