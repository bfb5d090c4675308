use super::{
    password::PasswordHasher,
    redirect, redirect_with_cookie,
    session::{SessionCodec, SessionError},
};
use crate::store::{Store, StoreError, User, UserStore};
use axum::{http::HeaderMap, response::Response};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument};
use url::form_urlencoded;
use uuid::Uuid;

/// Where a successful logout lands.
pub const LOGOUT_REDIRECT: &str = "/jokes";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("password hashing failed")]
    Hash(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("password hashing task failed")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug)]
pub enum RegisterOutcome {
    Created(User),
    UsernameTaken,
}

/// Result of gating a handler on an authenticated user.
#[derive(Debug)]
pub enum Authorization {
    Authorized(String),
    /// Redirect to the login page, carrying the path to come back to.
    Unauthorized(Response),
}

/// Registration, login and cookie session handling on top of a [`Store`].
pub struct AuthService {
    store: Arc<dyn Store>,
    codec: SessionCodec,
    hasher: PasswordHasher,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("codec", &self.codec)
            .field("hasher", &self.hasher)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, codec: SessionCodec) -> Self {
        Self {
            store,
            codec,
            hasher: PasswordHasher::default(),
        }
    }

    #[must_use]
    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Create a user unless the username is already taken.
    ///
    /// # Errors
    /// Returns an error if hashing or the store fails.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<RegisterOutcome, AuthError> {
        if self.store.find_user_by_username(username).await?.is_some() {
            debug!("Username already taken");
            return Ok(RegisterOutcome::UsernameTaken);
        }

        let hasher = self.hasher;
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;

        match self.store.insert_user(username, &password_hash).await {
            Ok(user) => {
                info!(user_id = %user.id, "User registered");
                Ok(RegisterOutcome::Created(user))
            }
            // Lost a race against a concurrent registration.
            Err(StoreError::UniqueViolation(_)) => Ok(RegisterOutcome::UsernameTaken),
            Err(err) => Err(err.into()),
        }
    }

    /// Check credentials, `None` for an unknown user or a wrong password.
    ///
    /// # Errors
    /// Returns an error only if the store or the hashing task fails.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<Option<User>, AuthError> {
        let Some(user) = self.store.find_user_by_username(username).await? else {
            debug!("Unknown username");
            return Ok(None);
        };

        let hasher = self.hasher;
        let password = password.to_string();
        let password_hash = user.password_hash.clone();
        let matches =
            tokio::task::spawn_blocking(move || hasher.verify(&password, &password_hash)).await?;

        if matches {
            Ok(Some(user))
        } else {
            debug!("Password mismatch");
            Ok(None)
        }
    }

    #[must_use]
    pub fn get_user_id(&self, headers: &HeaderMap) -> Option<String> {
        self.codec.read(headers).user_id().map(str::to_string)
    }

    /// Gate on a logged-in user; otherwise redirect to
    /// `/login?redirectTo=<redirect_to>`.
    #[must_use]
    pub fn require_user_id(&self, headers: &HeaderMap, redirect_to: &str) -> Authorization {
        match self.get_user_id(headers) {
            Some(user_id) => Authorization::Authorized(user_id),
            None => Authorization::Unauthorized(redirect(&login_redirect_location(redirect_to))),
        }
    }

    /// Resolve the session into a user record.
    ///
    /// # Errors
    /// Returns an error if the store fails.
    pub async fn get_user(&self, headers: &HeaderMap) -> Result<Option<User>, StoreError> {
        let Some(user_id) = self.get_user_id(headers) else {
            return Ok(None);
        };
        let Ok(user_id) = Uuid::parse_str(&user_id) else {
            debug!("Session carries a malformed user id");
            return Ok(None);
        };
        self.store.find_user_by_id(user_id).await
    }

    /// Redirect to `redirect_to` with a fresh session for `user_id`.
    ///
    /// # Errors
    /// Returns an error if the session cookie cannot be built.
    pub fn create_user_session(
        &self,
        user_id: &str,
        redirect_to: &str,
    ) -> Result<Response, AuthError> {
        let cookie = self.codec.create(user_id)?;
        Ok(redirect_with_cookie(redirect_to, cookie))
    }

    /// Drop the session cookie and send the client back to the joke list.
    #[must_use]
    pub fn logout(&self, headers: &HeaderMap) -> Response {
        let session = self.codec.read(headers);
        if let Some(user_id) = session.user_id() {
            info!(user_id, "User logged out");
        }
        redirect_with_cookie(LOGOUT_REDIRECT, self.codec.destroy(&session))
    }
}

fn login_redirect_location(redirect_to: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(redirect_to.as_bytes()).collect();
    format!("/login?redirectTo={encoded}")
}
