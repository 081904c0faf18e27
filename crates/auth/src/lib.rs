//! `storefront-auth` — pure authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it turns a
//! verified token into a [`Principal`] and answers ownership questions about it.

pub mod authorize;
pub mod claims;
pub mod principal;
pub mod roles;

pub use authorize::{authorize_owned, check_permissions, require_privileged, AuthzError};
pub use claims::{validate_claims, Hs256JwtValidator, JwtClaims, JwtValidator, TokenValidationError};
pub use principal::Principal;
pub use roles::Role;
