//! Authentication and user accounts service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;

use crate::{
    config::BootstrapConfig,
    error::{AppError, AppResult},
    models::user::{Permission, User, UserClaims},
    repository::Repository,
};

/// Current identity and permissions of a session's user
#[async_trait]
pub trait AccountLookup: Send + Sync {
    /// `None` when the account no longer exists
    async fn claims_for(&self, user_id: i32) -> AppResult<Option<UserClaims>>;
}

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Check credentials and load the user's claims
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<UserClaims> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !verify_password(&user, password)? {
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        let permissions = self.repository.users.permissions(user.id).await?;
        tracing::info!(user_id = user.id, "User logged in");

        Ok(UserClaims::new(&user, permissions))
    }

    /// Create the configured superuser unless an account with that name exists
    pub async fn ensure_superuser(&self, config: &BootstrapConfig) -> AppResult<Option<User>> {
        let (Some(username), Some(password)) =
            (config.superuser_username.as_deref(), config.superuser_password.as_deref())
        else {
            return Ok(None);
        };

        if self.repository.users.get_by_username(username).await?.is_some() {
            return Ok(None);
        }

        let hash = hash_password(password)?;
        let user = self.repository.users.create(username, &hash, true).await?;
        self.repository
            .users
            .grant(user.id, Permission::CanMarkReturned)
            .await?;

        tracing::info!(user_id = user.id, username, "Bootstrap superuser created");
        Ok(Some(user))
    }
}

#[async_trait]
impl AccountLookup for UsersService {
    async fn claims_for(&self, user_id: i32) -> AppResult<Option<UserClaims>> {
        let user = match self.repository.users.get_by_id(user_id).await {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let permissions = self.repository.users.permissions(user.id).await?;
        Ok(Some(UserClaims::new(&user, permissions)))
    }
}

/// Verify a password against the stored argon2 hash
fn verify_password(user: &User, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}
