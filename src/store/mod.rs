//! Persistence for users and jokes.
//!
//! The database is an external collaborator: handlers and the auth service only
//! see the [`UserStore`] and [`JokeStore`] traits. [`postgres::PgStore`] is the
//! production backend, [`memory::MemoryStore`] keeps everything in process.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Number of jokes returned by the listing query.
pub const RECENT_JOKES_LIMIT: usize = 5;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("database error")]
    Database(#[from] sqlx::Error),
}

/// Stored account; never serialized as is since it carries the password hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Joke {
    pub id: Uuid,
    pub name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Projection of a joke used by the listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct JokeListItem {
    pub id: Uuid,
    pub name: String,
}

impl From<&Joke> for JokeListItem {
    fn from(joke: &Joke) -> Self {
        Self {
            id: joke.id,
            name: joke.name.clone(),
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up the single user owning `username`.
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Insert a user; a taken username yields [`StoreError::UniqueViolation`].
    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError>;
}

#[async_trait]
pub trait JokeStore: Send + Sync {
    async fn insert_joke(&self, name: &str, content: &str) -> Result<Joke, StoreError>;

    async fn find_joke(&self, id: Uuid) -> Result<Option<Joke>, StoreError>;

    /// Newest jokes first, at most `limit` of them.
    async fn recent_jokes(&self, limit: usize) -> Result<Vec<JokeListItem>, StoreError>;
}

/// Everything the service needs from its backing database.
#[async_trait]
pub trait Store: UserStore + JokeStore {
    /// Cheap connectivity check used by `/health`.
    async fn ping(&self) -> Result<(), StoreError>;
}
