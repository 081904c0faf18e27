use thiserror::Error;

use storefront_core::{DomainError, Owned, UserId};

use crate::Principal;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("not authorized to access this resource")]
    NotOwner { caller: UserId, owner: UserId },

    #[error("forbidden: role '{0}' may not access this route")]
    NotPrivileged(String),
}

impl From<AuthzError> for DomainError {
    fn from(value: AuthzError) -> Self {
        DomainError::unauthorized(value.to_string())
    }
}

/// Ownership gate: the caller must own the resource or hold a privileged role.
///
/// - No IO
/// - No panics
/// - Entity-agnostic (takes the owner id, not the resource)
pub fn check_permissions(principal: &Principal, resource_owner: UserId) -> Result<(), AuthzError> {
    if principal.is_privileged() || principal.user_id == resource_owner {
        return Ok(());
    }

    tracing::debug!(
        caller = %principal.user_id,
        owner = %resource_owner,
        role = %principal.role,
        "ownership check denied"
    );
    Err(AuthzError::NotOwner {
        caller: principal.user_id,
        owner: resource_owner,
    })
}

/// [`check_permissions`] against any entity that records its owner.
pub fn authorize_owned<E: Owned>(principal: &Principal, resource: &E) -> Result<(), AuthzError> {
    check_permissions(principal, resource.owner())
}

/// Role gate for privileged-only operations (e.g. listing every order).
pub fn require_privileged(principal: &Principal) -> Result<(), AuthzError> {
    if principal.is_privileged() {
        Ok(())
    } else {
        Err(AuthzError::NotPrivileged(principal.role.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use storefront_core::Entity;

    struct Note {
        id: u32,
        author: UserId,
    }

    impl Entity for Note {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.id
        }
    }

    impl Owned for Note {
        fn owner(&self) -> UserId {
            self.author
        }
    }

    #[test]
    fn owner_passes() {
        let owner = UserId::new();
        assert!(check_permissions(&Principal::user(owner), owner).is_ok());
    }

    #[test]
    fn admin_passes_for_foreign_resource() {
        let owner = UserId::new();
        assert!(check_permissions(&Principal::admin(UserId::new()), owner).is_ok());
    }

    #[test]
    fn other_user_is_rejected() {
        let owner = UserId::new();
        let caller = UserId::new();
        let err = check_permissions(&Principal::user(caller), owner).unwrap_err();
        assert_eq!(err, AuthzError::NotOwner { caller, owner });
    }

    #[test]
    fn unknown_roles_are_not_privileged() {
        let principal = Principal::new(UserId::new(), Role::new("manager"));
        assert!(check_permissions(&principal, UserId::new()).is_err());
        assert_eq!(
            require_privileged(&principal),
            Err(AuthzError::NotPrivileged("manager".to_string()))
        );
    }

    #[test]
    fn authorize_owned_reads_owner_from_entity() {
        let author = UserId::new();
        let note = Note { id: 1, author };
        assert_eq!(*note.id(), 1);
        assert!(authorize_owned(&Principal::user(author), &note).is_ok());
        assert!(authorize_owned(&Principal::user(UserId::new()), &note).is_err());
    }

    #[test]
    fn converts_into_unauthorized_domain_error() {
        let err: DomainError = AuthzError::NotPrivileged("user".into()).into();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }
}
