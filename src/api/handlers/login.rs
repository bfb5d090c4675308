//! `/login`: sign in or create an account, then start a session.

use super::internal_error;
use crate::auth::{AuthService, RegisterOutcome};
use axum::{
    extract::{Extension, Form},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

pub const DEFAULT_REDIRECT: &str = "/jokes";
const MIN_USERNAME_LENGTH: usize = 3;
const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(ToSchema, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    login_type: Option<String>,
    username: Option<String>,
    password: Option<String>,
    redirect_to: Option<String>,
}

/// Submitted values echoed back for re-display. The password is never echoed.
#[derive(ToSchema, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginFields {
    pub login_type: String,
    pub username: String,
}

#[derive(ToSchema, Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct LoginFieldErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(ToSchema, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginActionData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<LoginFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<LoginFieldErrors>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginType {
    Login,
    Register,
}

impl LoginType {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "login" => Some(Self::Login),
            "register" => Some(Self::Register),
            _ => None,
        }
    }
}

fn validate_username(username: &str) -> Option<String> {
    (username.chars().count() < MIN_USERNAME_LENGTH).then(|| {
        format!("Usernames must be at least {MIN_USERNAME_LENGTH} characters long")
    })
}

fn validate_password(password: &str) -> Option<String> {
    (password.chars().count() < MIN_PASSWORD_LENGTH).then(|| {
        format!("Passwords must be at least {MIN_PASSWORD_LENGTH} characters long")
    })
}

/// Only local paths are followed after login; anything else lands on the
/// joke list.
///
/// Browsers read `\` as `/`, so `/\host` is as external as `//host`. Bytes
/// outside visible ASCII are refused since they cannot go in a `Location`
/// header.
#[must_use]
pub fn safe_redirect(redirect_to: Option<&str>) -> &str {
    match redirect_to {
        Some(path) if is_local_path(path) => path,
        _ => DEFAULT_REDIRECT,
    }
}

fn is_local_path(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.first() == Some(&b'/')
        && !matches!(bytes.get(1), Some(b'/' | b'\\'))
        && bytes.iter().all(|byte| byte.is_ascii_graphic())
}

fn form_error(message: String, fields: LoginFields) -> Response {
    Json(LoginActionData {
        form_error: Some(message),
        fields: Some(fields),
        field_errors: None,
    })
    .into_response()
}

#[utoipa::path(
    get,
    path = "/login",
    responses(
        (status = 200, description = "Empty login form", body = LoginActionData),
    ),
    tag = "auth"
)]
pub async fn form() -> Json<LoginActionData> {
    Json(LoginActionData::default())
}

#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login or registration rejected", body = LoginActionData),
        (status = 302, description = "Session started, redirect to redirectTo"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(auth: Extension<Arc<AuthService>>, form: Option<Form<LoginForm>>) -> Response {
    let Some(Form(LoginForm {
        login_type: Some(login_type),
        username: Some(username),
        password: Some(password),
        redirect_to,
    })) = form
    else {
        return Json(LoginActionData {
            form_error: Some("Form submitted incorrectly".to_string()),
            ..LoginActionData::default()
        })
        .into_response();
    };

    let redirect_to = safe_redirect(redirect_to.as_deref()).to_string();
    let fields = LoginFields {
        login_type: login_type.clone(),
        username: username.clone(),
    };

    let field_errors = LoginFieldErrors {
        username: validate_username(&username),
        password: validate_password(&password),
    };
    if field_errors.username.is_some() || field_errors.password.is_some() {
        return Json(LoginActionData {
            form_error: None,
            fields: Some(fields),
            field_errors: Some(field_errors),
        })
        .into_response();
    }

    let user = match LoginType::parse(&login_type) {
        Some(LoginType::Login) => match auth.login(&username, &password).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                debug!("Login rejected");
                return form_error(
                    "Username/Password combination is incorrect".to_string(),
                    fields,
                );
            }
            Err(err) => return internal_error("Failed to log in", err),
        },
        Some(LoginType::Register) => match auth.register(&username, &password).await {
            Ok(RegisterOutcome::Created(user)) => user,
            Ok(RegisterOutcome::UsernameTaken) => {
                return form_error(format!("User with username {username} already exists"), fields);
            }
            Err(err) => return internal_error("Failed to register user", err),
        },
        None => return form_error("Login type invalid".to_string(), fields),
    };

    match auth.create_user_session(&user.id.to_string(), &redirect_to) {
        Ok(response) => response,
        Err(err) => internal_error("Failed to create session", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_redirect_keeps_local_paths() {
        assert_eq!(safe_redirect(Some("/jokes/new")), "/jokes/new");
        assert_eq!(safe_redirect(Some("/")), "/");
    }

    #[test]
    fn safe_redirect_rejects_external_targets() {
        assert_eq!(safe_redirect(Some("https://evil.example")), DEFAULT_REDIRECT);
        assert_eq!(safe_redirect(Some("//evil.example")), DEFAULT_REDIRECT);
        assert_eq!(safe_redirect(Some("/\\evil.example")), DEFAULT_REDIRECT);
        assert_eq!(safe_redirect(Some("jokes")), DEFAULT_REDIRECT);
        assert_eq!(safe_redirect(Some("")), DEFAULT_REDIRECT);
        assert_eq!(safe_redirect(None), DEFAULT_REDIRECT);
    }

    #[test]
    fn safe_redirect_rejects_bytes_unfit_for_a_header() {
        assert_eq!(safe_redirect(Some("/jokes\u{1}")), DEFAULT_REDIRECT);
        assert_eq!(safe_redirect(Some("/jokes\r\nSet-Cookie: x=1")), DEFAULT_REDIRECT);
        assert_eq!(safe_redirect(Some("/jokes new")), DEFAULT_REDIRECT);
        assert_eq!(safe_redirect(Some("/blagues/é")), DEFAULT_REDIRECT);
    }

    #[test]
    fn login_type_parses_known_values() {
        assert_eq!(LoginType::parse("login"), Some(LoginType::Login));
        assert_eq!(LoginType::parse("register"), Some(LoginType::Register));
        assert_eq!(LoginType::parse("admin"), None);
    }

    #[test]
    fn credentials_have_minimum_lengths() {
        assert!(validate_username("ab").is_some());
        assert!(validate_username("abc").is_none());
        assert!(validate_password("12345").is_some());
        assert!(validate_password("123456").is_none());
    }
}
