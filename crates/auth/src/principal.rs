use serde::{Deserialize, Serialize};

use storefront_core::UserId;

use crate::Role;

/// An authenticated caller, as handed to the application services.
///
/// Construction is decoupled from transport: the API derives it from verified
/// token claims, tests build it directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn user(user_id: UserId) -> Self {
        Self::new(user_id, Role::user())
    }

    pub fn admin(user_id: UserId) -> Self {
        Self::new(user_id, Role::admin())
    }

    pub fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }
}
