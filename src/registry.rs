//! User registry
//!
//! `UserRepository` is the storage seam; `InMemoryUserRepository` keeps
//! users in two maps (by name and by id) behind a single lock so both
//! indexes change together.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::info;

use crate::error::RegistryError;
use crate::types::{Role, UserId};

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Base64 Argon2id digest
    pub password_hash: String,
    pub salt: Vec<u8>,
    pub role: Role,
}

/// A user about to be registered; the repository assigns the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub salt: Vec<u8>,
    pub role: Role,
}

/// User storage, safe to share between concurrent callers
pub trait UserRepository: Send + Sync {
    /// Store a new user under a fresh id
    ///
    /// Fails with `UserExists` if the username is taken.
    fn create(&self, user: NewUser) -> Result<User, RegistryError>;

    fn get_by_id(&self, id: UserId) -> Result<User, RegistryError>;

    fn get_by_name(&self, username: &str) -> Result<User, RegistryError>;

    /// All users, ordered by id
    fn list(&self) -> Result<Vec<User>, RegistryError>;

    /// Replace the stored record for `user.username`
    ///
    /// The stored id is kept; the id on `user` is ignored.
    fn update(&self, user: User) -> Result<User, RegistryError>;
}

#[derive(Debug, Default)]
struct Users {
    last_id: i64,
    by_name: HashMap<String, User>,
    names_by_id: HashMap<UserId, String>,
}

/// In-process user repository
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Users>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Users>, RegistryError> {
        self.users.read().map_err(|_| RegistryError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Users>, RegistryError> {
        self.users.write().map_err(|_| RegistryError::Poisoned)
    }
}

impl UserRepository for InMemoryUserRepository {
    fn create(&self, user: NewUser) -> Result<User, RegistryError> {
        let mut users = self.write()?;

        if users.by_name.contains_key(&user.username) {
            return Err(RegistryError::UserExists(user.username));
        }

        users.last_id += 1;
        let id = UserId(users.last_id);
        let user = User {
            id,
            username: user.username,
            password_hash: user.password_hash,
            salt: user.salt,
            role: user.role,
        };
        users.names_by_id.insert(id, user.username.clone());
        users.by_name.insert(user.username.clone(), user.clone());

        info!("Created user: {} with ID: {}", user.username, id);
        Ok(user)
    }

    fn get_by_id(&self, id: UserId) -> Result<User, RegistryError> {
        let users = self.read()?;
        users
            .names_by_id
            .get(&id)
            .and_then(|name| users.by_name.get(name))
            .cloned()
            .ok_or(RegistryError::UserNotFound)
    }

    fn get_by_name(&self, username: &str) -> Result<User, RegistryError> {
        self.read()?
            .by_name
            .get(username)
            .cloned()
            .ok_or(RegistryError::UserNotFound)
    }

    fn list(&self) -> Result<Vec<User>, RegistryError> {
        let mut all: Vec<User> = self.read()?.by_name.values().cloned().collect();
        all.sort_by_key(|user| user.id);
        Ok(all)
    }

    fn update(&self, mut user: User) -> Result<User, RegistryError> {
        let mut users = self.write()?;

        let Some(stored) = users.by_name.get_mut(&user.username) else {
            return Err(RegistryError::UserNotFound);
        };
        user.id = stored.id;
        *stored = user.clone();

        info!("Updated user: {}", user.username);
        Ok(user)
    }
}
