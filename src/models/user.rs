//! User accounts, permissions and session claims

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::AppError;

use super::form::FormInput;

/// Named capabilities granted to users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Librarian capability: manage the catalog and loans
    CanMarkReturned,
}

impl Permission {
    pub fn codename(&self) -> &'static str {
        match self {
            Permission::CanMarkReturned => "can_mark_returned",
        }
    }
}

/// User row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_superuser: bool,
}

/// Logged-in user with the permissions currently granted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserClaims {
    pub user_id: i32,
    pub username: String,
    pub is_superuser: bool,
    /// Permission codenames held by the user
    pub permissions: Vec<String>,
}

impl UserClaims {
    pub fn new(user: &User, permissions: Vec<String>) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            is_superuser: user.is_superuser,
            permissions,
        }
    }

    /// Superusers hold every permission
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.is_superuser || self.permissions.iter().any(|p| p == permission.codename())
    }

    pub fn require_permission(&self, permission: Permission) -> Result<(), AppError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Permission '{}' required",
                permission.codename()
            )))
        }
    }

    pub fn require_can_mark_returned(&self) -> Result<(), AppError> {
        self.require_permission(Permission::CanMarkReturned)
    }
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl FormInput for LoginRequest {}

/// Logged-in user as returned by the accounts endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub is_superuser: bool,
    pub permissions: Vec<String>,
}

impl From<UserClaims> for UserInfo {
    fn from(claims: UserClaims) -> Self {
        Self {
            id: claims.user_id,
            username: claims.username,
            is_superuser: claims.is_superuser,
            permissions: claims.permissions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(is_superuser: bool, permissions: &[&str]) -> UserClaims {
        UserClaims {
            user_id: 7,
            username: "reader".to_string(),
            is_superuser,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn borrower_without_capability_is_forbidden() {
        let result = claims(false, &[]).require_can_mark_returned();
        assert!(matches!(result, Err(AppError::Authorization(_))));
    }

    #[test]
    fn librarian_holds_capability() {
        assert!(claims(false, &["can_mark_returned"])
            .require_can_mark_returned()
            .is_ok());
    }

    #[test]
    fn superuser_holds_every_capability() {
        assert!(claims(true, &[]).has_permission(Permission::CanMarkReturned));
    }
}
