//! `/jokes/new`: joke submission with per-field validation.

use super::internal_error;
use crate::{
    auth::{redirect, AuthService, Authorization},
    store::{JokeStore, Store},
};
use axum::{
    extract::{Extension, Form, OriginalUri},
    http::HeaderMap,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::{ops::RangeInclusive, sync::Arc};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

pub const NAME_LENGTH: RangeInclusive<usize> = 3..=20;
pub const CONTENT_LENGTH: RangeInclusive<usize> = 10..=500;

#[derive(ToSchema, Deserialize, Debug, Default)]
pub struct NewJokeForm {
    name: Option<String>,
    content: Option<String>,
}

/// Submitted values echoed back for re-display.
#[derive(ToSchema, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct JokeFields {
    pub name: String,
    pub content: String,
}

#[derive(ToSchema, Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct JokeFieldErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl JokeFieldErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.content.is_none()
    }
}

#[derive(ToSchema, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewJokeActionData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<JokeFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<JokeFieldErrors>,
}

#[must_use]
pub fn validate_joke_name(name: &str) -> Option<String> {
    let length = name.chars().count();
    if length == 0 {
        Some("Name is required".to_string())
    } else if length < *NAME_LENGTH.start() {
        Some(format!(
            "Name must be at least {} characters",
            NAME_LENGTH.start()
        ))
    } else if length > *NAME_LENGTH.end() {
        Some(format!("Name must be at most {} characters", NAME_LENGTH.end()))
    } else {
        None
    }
}

#[must_use]
pub fn validate_joke_content(content: &str) -> Option<String> {
    let length = content.chars().count();
    if length == 0 {
        Some("Content is required".to_string())
    } else if length < *CONTENT_LENGTH.start() {
        Some(format!(
            "Content must be at least {} characters",
            CONTENT_LENGTH.start()
        ))
    } else if length > *CONTENT_LENGTH.end() {
        Some(format!(
            "Content must be at most {} characters",
            CONTENT_LENGTH.end()
        ))
    } else {
        None
    }
}

#[utoipa::path(
    get,
    path = "/jokes/new",
    responses(
        (status = 200, description = "Empty joke form", body = NewJokeActionData),
        (status = 302, description = "Not logged in, redirect to /login"),
    ),
    tag = "jokes"
)]
/// Empty joke form, behind the same login gate as [`create`].
#[instrument(skip_all)]
pub async fn form(
    headers: HeaderMap,
    uri: OriginalUri,
    auth: Extension<Arc<AuthService>>,
) -> Response {
    match auth.require_user_id(&headers, uri.0.path()) {
        Authorization::Authorized(_) => Json(NewJokeActionData::default()).into_response(),
        Authorization::Unauthorized(response) => response,
    }
}

#[utoipa::path(
    post,
    path = "/jokes/new",
    request_body(content = NewJokeForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Submission rejected, errors and fields echoed back", body = NewJokeActionData),
        (status = 302, description = "Joke created, redirect to /jokes/{id}; or not logged in, redirect to /login"),
    ),
    tag = "jokes"
)]
/// Submit a joke.
///
/// The submission flow is parse, validate, insert, redirect. It runs only for a
/// logged-in user: without a session the request is redirected to
/// `/login` (carrying `redirectTo`) before the form is read, so every joke is
/// created from an authenticated session.
#[instrument(skip_all)]
pub async fn create(
    headers: HeaderMap,
    uri: OriginalUri,
    auth: Extension<Arc<AuthService>>,
    store: Extension<Arc<dyn Store>>,
    form: Option<Form<NewJokeForm>>,
) -> Response {
    let user_id = match auth.require_user_id(&headers, uri.0.path()) {
        Authorization::Authorized(user_id) => user_id,
        Authorization::Unauthorized(response) => return response,
    };

    let Some(Form(NewJokeForm {
        name: Some(name),
        content: Some(content),
    })) = form
    else {
        return Json(NewJokeActionData {
            form_error: Some("Form submitted incorrectly".to_string()),
            ..NewJokeActionData::default()
        })
        .into_response();
    };

    let field_errors = JokeFieldErrors {
        name: validate_joke_name(&name),
        content: validate_joke_content(&content),
    };
    if !field_errors.is_empty() {
        debug!(?field_errors, "Joke rejected");
        return Json(NewJokeActionData {
            form_error: None,
            fields: Some(JokeFields { name, content }),
            field_errors: Some(field_errors),
        })
        .into_response();
    }

    match store.insert_joke(&name, &content).await {
        Ok(joke) => {
            info!(joke_id = %joke.id, user_id, "Joke created");
            redirect(&format!("/jokes/{}", joke.id))
        }
        Err(err) => internal_error("Failed to insert joke", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_length_bounds() {
        assert_eq!(
            validate_joke_name("ab"),
            Some("Name must be at least 3 characters".to_string())
        );
        assert_eq!(validate_joke_name("abc"), None);
        assert_eq!(validate_joke_name(&"a".repeat(20)), None);
        assert_eq!(
            validate_joke_name(&"a".repeat(21)),
            Some("Name must be at most 20 characters".to_string())
        );
    }

    #[test]
    fn name_is_required() {
        assert_eq!(validate_joke_name(""), Some("Name is required".to_string()));
    }

    #[test]
    fn content_length_bounds() {
        assert_eq!(
            validate_joke_content(&"a".repeat(9)),
            Some("Content must be at least 10 characters".to_string())
        );
        assert_eq!(validate_joke_content(&"a".repeat(10)), None);
        assert_eq!(validate_joke_content(&"a".repeat(500)), None);
        assert_eq!(
            validate_joke_content(&"a".repeat(501)),
            Some("Content must be at most 500 characters".to_string())
        );
    }

    #[test]
    fn content_is_required() {
        assert_eq!(
            validate_joke_content(""),
            Some("Content is required".to_string())
        );
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        // Three characters, six bytes.
        assert_eq!(validate_joke_name("ééé"), None);
        assert!(validate_joke_name(&"é".repeat(21)).is_some());
    }

    #[test]
    fn action_data_skips_empty_parts() {
        let json = serde_json::to_value(NewJokeActionData::default()).ok();
        assert_eq!(json, Some(serde_json::json!({})));

        let json = serde_json::to_value(NewJokeActionData {
            form_error: None,
            fields: Some(JokeFields {
                name: "ab".to_string(),
                content: "short".to_string(),
            }),
            field_errors: Some(JokeFieldErrors {
                name: validate_joke_name("ab"),
                content: validate_joke_content("short"),
            }),
        })
        .ok();
        assert_eq!(
            json,
            Some(serde_json::json!({
                "fields": {"name": "ab", "content": "short"},
                "fieldErrors": {
                    "name": "Name must be at least 3 characters",
                    "content": "Content must be at least 10 characters"
                }
            }))
        );
    }
}
