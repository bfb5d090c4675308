//! Route handlers.
//!
//! Handlers return JSON data payloads or `302` redirects; rendering the pages
//! is left to whatever sits in front of the service.

pub mod health;
pub mod jokes;
pub mod login;
pub mod logout;
pub mod new_joke;
pub mod root;


use crate::store::User;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt::Display;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Public view of the logged-in user.
#[derive(ToSchema, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

/// Log `err` and answer with a bare `500`.
pub(crate) fn internal_error(context: &str, err: impl Display) -> Response {
    error!("{context}: {err}");
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}
