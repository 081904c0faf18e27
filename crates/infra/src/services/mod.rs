//! Application services for orders and reviews.
//!
//! Services compose the catalog, stores, and payment client behind traits and
//! apply ownership checks. Every failure is reported as a [`ServiceError`],
//! whose variants are the error kinds the HTTP layer maps to status codes.

use thiserror::Error;

use storefront_auth::AuthzError;
use storefront_core::DomainError;

use crate::payment::PaymentError;
use crate::store::StoreError;

pub mod orders;
pub mod reviews;

pub use orders::OrderService;
pub use reviews::{ReviewInput, ReviewService};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Bad or missing input, including a duplicate review pre-check.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Caller is neither the owner nor privileged.
    #[error("{0}")]
    Unauthorized(String),

    /// Store-level uniqueness rejection or an illegal state transition.
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error("storage failure: {0}")]
    Store(StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => ServiceError::Validation(msg),
            DomainError::NotFound(msg) => ServiceError::NotFound(msg),
            DomainError::Conflict(msg) => ServiceError::Conflict(msg),
            DomainError::Unauthorized(msg) => ServiceError::Unauthorized(msg),
        }
    }
}

impl From<AuthzError> for ServiceError {
    fn from(value: AuthzError) -> Self {
        ServiceError::Unauthorized(value.to_string())
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(msg) => ServiceError::Conflict(msg),
            StoreError::Missing(msg) => ServiceError::NotFound(msg),
            other => ServiceError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::UserId;

    #[test]
    fn store_conflict_becomes_service_conflict() {
        let err: ServiceError = StoreError::Conflict("dup".into()).into();
        assert_eq!(err, ServiceError::Conflict("dup".into()));

        let err: ServiceError = StoreError::Backend("down".into()).into();
        assert!(matches!(err, ServiceError::Store(_)));
    }

    #[test]
    fn record_deleted_under_a_write_is_not_found() {
        let err: ServiceError = StoreError::Missing("review 42".into()).into();
        assert_eq!(err, ServiceError::NotFound("review 42".into()));
    }

    #[test]
    fn invalid_id_is_a_validation_failure() {
        let err: ServiceError = DomainError::invalid_id("OrderId: bad").into();
        assert_eq!(err, ServiceError::Validation("OrderId: bad".into()));
    }

    #[test]
    fn authz_errors_are_unauthorized() {
        let err: ServiceError = AuthzError::NotOwner {
            caller: UserId::new(),
            owner: UserId::new(),
        }
        .into();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }
}
