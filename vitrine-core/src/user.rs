//! Admin users, stored flat with argon2 password hashes.

use std::path::PathBuf;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::store::{StoreError, read_collection, write_collection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// PHC-format argon2 hash, never the password itself.
    pub password: String,
    pub role: Role,
    pub created_at: String,
}

#[derive(Debug)]
pub enum UserError {
    DuplicateUsername(String),
    Hash(argon2::password_hash::Error),
    Store(StoreError),
}

impl std::fmt::Display for UserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserError::DuplicateUsername(name) => write!(f, "Username already exists: {}", name),
            UserError::Hash(e) => write!(f, "Password hashing error: {}", e),
            UserError::Store(e) => write!(f, "Store error: {}", e),
        }
    }
}

impl std::error::Error for UserError {}

impl From<argon2::password_hash::Error> for UserError {
    fn from(value: argon2::password_hash::Error) -> Self {
        UserError::Hash(value)
    }
}

impl From<StoreError> for UserError {
    fn from(value: StoreError) -> Self {
        UserError::Store(value)
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub admin: bool,
}

pub struct UserStore {
    path: PathBuf,
}

impl UserStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn all(&self) -> Vec<User> {
        read_collection(&self.path)
    }

    pub fn find(&self, username: &str) -> Option<User> {
        self.all().into_iter().find(|u| u.username == username)
    }

    pub fn get(&self, id: u64) -> Option<User> {
        self.all().into_iter().find(|u| u.id == id)
    }

    pub fn create(&self, fields: NewUser) -> Result<User, UserError> {
        let mut users = self.all();
        if users.iter().any(|u| u.username == fields.username) {
            return Err(UserError::DuplicateUsername(fields.username));
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(fields.password.as_bytes(), &salt)?
            .to_string();
        let now = Utc::now();
        let mut id = now.timestamp_millis() as u64;
        while users.iter().any(|u| u.id == id) {
            id += 1;
        }
        let user = User {
            id,
            username: fields.username,
            first_name: fields.first_name,
            last_name: fields.last_name,
            password: hash,
            role: if fields.admin { Role::Admin } else { Role::User },
            created_at: now.to_rfc3339(),
        };
        users.push(user.clone());
        write_collection(&self.path, &users)?;
        Ok(user)
    }

    pub fn delete(&self, id: u64) -> Result<(), StoreError> {
        let mut users = self.all();
        users.retain(|u| u.id != id);
        write_collection(&self.path, &users)
    }

    /// Check credentials; `None` for an unknown name or a wrong password,
    /// indistinguishably.
    pub fn verify(&self, username: &str, password: &str) -> Option<User> {
        let user = self.find(username)?;
        let parsed = PasswordHash::new(&user.password).ok()?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .ok()?;
        Some(user)
    }
}
