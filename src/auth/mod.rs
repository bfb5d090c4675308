//! Password hashing, signed cookie sessions and the auth service that ties
//! them to the user store.

pub mod password;
pub mod service;
pub mod session;

pub use password::PasswordHasher;
pub use service::{AuthError, AuthService, Authorization, RegisterOutcome};
pub use session::{Session, SessionCodec, SessionError, SESSION_COOKIE_NAME};

use axum::{
    http::{
        header::{LOCATION, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};
use tracing::error;

/// `302 Found` to `location`.
#[must_use]
pub fn redirect(location: &str) -> Response {
    found(location, HeaderMap::new())
}

/// `302 Found` to `location` that also sets `cookie`.
#[must_use]
pub fn redirect_with_cookie(location: &str, cookie: HeaderValue) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    found(location, headers)
}

fn found(location: &str, mut headers: HeaderMap) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => {
            headers.insert(LOCATION, value);
            (StatusCode::FOUND, headers).into_response()
        }
        Err(err) => {
            error!("Invalid redirect location {location:?}: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
