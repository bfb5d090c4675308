use crate::auth::{redirect, AuthService};
use axum::{extract::Extension, http::HeaderMap, response::Response};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 302, description = "Session cleared, redirect to /jokes")
    ),
    tag = "auth"
)]
pub async fn logout(headers: HeaderMap, auth: Extension<Arc<AuthService>>) -> Response {
    auth.logout(&headers)
}

/// Logging out only happens through a form submission; a plain visit goes home.
#[utoipa::path(
    get,
    path = "/logout",
    responses(
        (status = 302, description = "Redirect to /")
    ),
    tag = "auth"
)]
pub async fn visit() -> Response {
    redirect("/")
}
