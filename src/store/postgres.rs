use super::{Joke, JokeListItem, JokeStore, Store, StoreError, User, UserStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, Connection, PgPool, Row};
use tracing::{info_span, Instrument, Span};
use uuid::Uuid;

/// `PostgreSQL` backed store.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn query_span(operation: &str, statement: &str) -> Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
    })
}

fn joke_from_row(row: &PgRow) -> Result<Joke, sqlx::Error> {
    Ok(Joke {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        content: row.try_get("content")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let query = "SELECT id, username, password_hash FROM users WHERE username = $1";
        let row = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let query = "SELECT id, username, password_hash FROM users WHERE id = $1";
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let query = "INSERT INTO users (id, username, password_hash) VALUES ($1, $2, $3) \
                     RETURNING id, username, password_hash";
        let result = sqlx::query(query)
            .bind(Uuid::new_v4())
            .bind(username)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .instrument(query_span("INSERT", query))
            .await;

        match result {
            Ok(row) => Ok(user_from_row(&row)?),
            Err(err) if is_unique_violation(&err) => {
                Err(StoreError::UniqueViolation(format!("username {username}")))
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl JokeStore for PgStore {
    async fn insert_joke(&self, name: &str, content: &str) -> Result<Joke, StoreError> {
        let query = "INSERT INTO jokes (id, name, content) VALUES ($1, $2, $3) \
                     RETURNING id, name, content, created_at";
        let row = sqlx::query(query)
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(content)
            .fetch_one(&self.pool)
            .instrument(query_span("INSERT", query))
            .await?;

        Ok(joke_from_row(&row)?)
    }

    async fn find_joke(&self, id: Uuid) -> Result<Option<Joke>, StoreError> {
        let query = "SELECT id, name, content, created_at FROM jokes WHERE id = $1";
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await?;

        Ok(row.as_ref().map(joke_from_row).transpose()?)
    }

    async fn recent_jokes(&self, limit: usize) -> Result<Vec<JokeListItem>, StoreError> {
        let query = "SELECT id, name FROM jokes ORDER BY created_at DESC LIMIT $1";
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(query)
            .bind(limit)
            .fetch_all(&self.pool)
            .instrument(query_span("SELECT", query))
            .await?;

        rows.iter()
            .map(|row| -> Result<JokeListItem, StoreError> {
                Ok(JokeListItem {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self.pool.acquire().instrument(acquire_span).await?;
        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(ping_span).await?;
        Ok(())
    }
}
