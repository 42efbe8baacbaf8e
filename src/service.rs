//! Account operations
//!
//! Registration and login on top of a `UserRepository` and a
//! `PasswordHasher`. Username rules come from the `AccountPolicy` passed
//! in at construction.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AccountPolicy;
use crate::error::{AppError, AuthError, RegistryError};
use crate::password::PasswordHasher;
use crate::registry::{NewUser, User, UserRepository};
use crate::types::{Role, UserId};

/// Registration and login
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    policy: AccountPolicy,
}

impl UserService {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        hasher: PasswordHasher,
        policy: AccountPolicy,
    ) -> Result<Self, AppError> {
        policy.validate()?;
        Ok(Self {
            repo,
            hasher,
            policy,
        })
    }

    /// Register a new user
    ///
    /// Checks the username length, rejects taken names, and stores the
    /// password as a salted hash.
    pub fn create_user(&self, username: &str, password: &str, role: Role) -> Result<User, AppError> {
        self.validate_username(username)?;

        // Fail fast before paying for the hash; create() re-checks under the lock.
        if self.repo.get_by_name(username).is_ok() {
            return Err(RegistryError::UserExists(username.to_string()).into());
        }

        let salt = self.hasher.generate_salt();
        let password_hash = self.hasher.hash(password, &salt)?;
        let user = self.repo.create(NewUser {
            username: username.to_string(),
            password_hash,
            salt,
            role,
        })?;

        info!("User created: {}", user.username);
        Ok(user)
    }

    /// Check credentials and return the matching user
    pub fn login(&self, username: &str, password: &str) -> Result<User, AppError> {
        let user = self.repo.get_by_name(username)?;

        if !self
            .hasher
            .verify(password, &user.salt, &user.password_hash)
        {
            warn!("Failed login for {}", username);
            return Err(AuthError::InvalidPassword.into());
        }

        info!("Login successful: {} with role: {}", user.username, user.role);
        Ok(user)
    }

    pub fn get_user_by_id(&self, id: UserId) -> Result<User, AppError> {
        Ok(self.repo.get_by_id(id)?)
    }

    pub fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.repo.list()?)
    }

    pub fn update_user(&self, user: User) -> Result<User, AppError> {
        Ok(self.repo.update(user)?)
    }

    /// Change a user's password, generating a new salt
    pub fn change_password(&self, username: &str, new_password: &str) -> Result<User, AppError> {
        let mut user = self.repo.get_by_name(username)?;
        user.salt = self.hasher.generate_salt();
        user.password_hash = self.hasher.hash(new_password, &user.salt)?;
        Ok(self.repo.update(user)?)
    }

    fn validate_username(&self, username: &str) -> Result<(), AuthError> {
        let len = username.len();
        if len < self.policy.min_username_len || len > self.policy.max_username_len {
            return Err(AuthError::UsernameLength {
                min: self.policy.min_username_len,
                max: self.policy.max_username_len,
            });
        }
        Ok(())
    }
}
