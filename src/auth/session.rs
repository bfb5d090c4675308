//! Signed cookie sessions.
//!
//! The cookie is the whole session: nothing is stored server side. The value is
//! `base64url(json) "." base64url(hmac_sha256(secret, base64url(json)))`.
//! The first configured secret signs new cookies, every secret is accepted when
//! reading so secrets can be rotated without logging everyone out.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

macro_rules! cookie_attributes {
    () => {
        "Path=/; HttpOnly; Secure; SameSite=Lax"
    };
}

macro_rules! cookie_name {
    () => {
        "RJ_session"
    };
}

pub const SESSION_COOKIE_NAME: &str = cookie_name!();

/// 30 days.
pub const SESSION_MAX_AGE_SECONDS: i64 = 60 * 60 * 24 * 30;

const COOKIE_ATTRIBUTES: &str = cookie_attributes!();

const EXPIRED_COOKIE: &str = concat!(
    cookie_name!(),
    "=; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; ",
    cookie_attributes!()
);

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("at least one non-empty session secret is required")]
    MissingSecret,
    #[error("invalid session signing key")]
    InvalidKey,
    #[error("failed to serialize session")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid Set-Cookie header value")]
    Header(#[from] InvalidHeaderValue),
}

/// Data carried by the session cookie.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn set_user_id(&mut self, user_id: impl Into<String>) {
        self.user_id = Some(user_id.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none()
    }
}

#[derive(Clone)]
pub struct SessionCodec {
    secrets: Vec<SecretString>,
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec")
            .field("secrets", &format_args!("[***; {}]", self.secrets.len()))
            .finish()
    }
}

impl SessionCodec {
    /// Build a codec from the configured secrets; empty secrets are ignored.
    ///
    /// # Errors
    /// Returns [`SessionError::MissingSecret`] when no usable secret is left.
    pub fn new(secrets: impl IntoIterator<Item = SecretString>) -> Result<Self, SessionError> {
        let secrets: Vec<SecretString> = secrets
            .into_iter()
            .filter(|secret| !secret.expose_secret().is_empty())
            .collect();
        if secrets.is_empty() {
            return Err(SessionError::MissingSecret);
        }
        Ok(Self { secrets })
    }

    /// `Set-Cookie` value for a new session holding `user_id`.
    ///
    /// # Errors
    /// Returns an error if the session cannot be serialized or signed.
    pub fn create(&self, user_id: &str) -> Result<HeaderValue, SessionError> {
        let mut session = Session::new();
        session.set_user_id(user_id);
        self.commit(&session)
    }

    /// `Set-Cookie` value persisting `session` for the full max age.
    ///
    /// # Errors
    /// Returns an error if the session cannot be serialized or signed.
    pub fn commit(&self, session: &Session) -> Result<HeaderValue, SessionError> {
        let token = self.encode(session)?;
        let expires = (Utc::now() + Duration::seconds(SESSION_MAX_AGE_SECONDS))
            .format("%a, %d %b %Y %H:%M:%S GMT");
        let cookie = format!(
            "{SESSION_COOKIE_NAME}={token}; Max-Age={SESSION_MAX_AGE_SECONDS}; Expires={expires}; {COOKIE_ATTRIBUTES}"
        );
        Ok(HeaderValue::from_str(&cookie)?)
    }

    /// Session carried by the request, or an empty one when the cookie is
    /// missing, malformed, or signed with an unknown secret.
    #[must_use]
    pub fn read(&self, headers: &HeaderMap) -> Session {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(extract_session_token)
            .and_then(|token| self.decode(&token))
            .unwrap_or_default()
    }

    /// `Set-Cookie` value that expires the session cookie immediately.
    #[must_use]
    pub fn destroy(&self, _session: &Session) -> HeaderValue {
        HeaderValue::from_static(EXPIRED_COOKIE)
    }

    fn encode(&self, session: &Session) -> Result<String, SessionError> {
        let payload = Base64UrlUnpadded::encode_string(&serde_json::to_vec(session)?);
        let secret = self.secrets.first().ok_or(SessionError::MissingSecret)?;
        let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
            .map_err(|_| SessionError::InvalidKey)?;
        mac.update(payload.as_bytes());
        let signature = Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes());
        Ok(format!("{payload}.{signature}"))
    }

    fn decode(&self, token: &str) -> Option<Session> {
        let (payload, signature) = token.rsplit_once('.')?;
        let signature = Base64UrlUnpadded::decode_vec(signature).ok()?;

        let verified = self.secrets.iter().any(|secret| {
            HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
                .map(|mut mac| {
                    mac.update(payload.as_bytes());
                    mac.verify_slice(&signature).is_ok()
                })
                .unwrap_or(false)
        });
        if !verified {
            debug!("Ignoring session cookie with invalid signature");
            return None;
        }

        let json = Base64UrlUnpadded::decode_vec(payload).ok()?;
        serde_json::from_slice(&json).ok()
    }
}

/// Pull the session token out of a `Cookie` header value.
fn extract_session_token(header: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key.trim() == SESSION_COOKIE_NAME && !value.trim().is_empty())
            .then(|| value.trim().to_string())
    })
}
