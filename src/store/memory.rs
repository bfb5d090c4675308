use super::{Joke, JokeListItem, JokeStore, Store, StoreError, User, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-process store, handy for tests and local experiments.
///
/// Jokes are kept in insertion order; ties on `created_at` are broken by that
/// order so the listing stays deterministic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    jokes: RwLock<Vec<Joke>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.username == username).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.id == id).cloned())
    }

    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|user| user.username == username) {
            return Err(StoreError::UniqueViolation(format!("username {username}")));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl JokeStore for MemoryStore {
    async fn insert_joke(&self, name: &str, content: &str) -> Result<Joke, StoreError> {
        let joke = Joke {
            id: Uuid::new_v4(),
            name: name.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.jokes.write().await.push(joke.clone());
        Ok(joke)
    }

    async fn find_joke(&self, id: Uuid) -> Result<Option<Joke>, StoreError> {
        let jokes = self.jokes.read().await;
        Ok(jokes.iter().find(|joke| joke.id == id).cloned())
    }

    async fn recent_jokes(&self, limit: usize) -> Result<Vec<JokeListItem>, StoreError> {
        let jokes = self.jokes.read().await;
        let mut ordered: Vec<(usize, &Joke)> = jokes.iter().enumerate().collect();
        ordered.sort_by(|(a_index, a), (b_index, b)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b_index.cmp(a_index))
        });
        Ok(ordered
            .into_iter()
            .take(limit)
            .map(|(_, joke)| JokeListItem::from(joke))
            .collect())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
