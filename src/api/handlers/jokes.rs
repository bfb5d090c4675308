use super::{internal_error, CurrentUser};
use crate::{
    auth::AuthService,
    store::{Joke, JokeListItem, JokeStore, Store, RECENT_JOKES_LIMIT},
};
use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct JokesData {
    joke_list_items: Vec<JokeListItem>,
    user: Option<CurrentUser>,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct JokeData {
    joke: Joke,
}

#[utoipa::path(
    get,
    path = "/jokes",
    responses(
        (status = 200, description = "Most recent jokes and the current user", body = JokesData),
    ),
    tag = "jokes"
)]
#[instrument(skip_all)]
pub async fn list(
    headers: HeaderMap,
    auth: Extension<Arc<AuthService>>,
    store: Extension<Arc<dyn Store>>,
) -> Response {
    let user = match auth.get_user(&headers).await {
        Ok(user) => user,
        Err(err) => return internal_error("Failed to load current user", err),
    };

    match store.recent_jokes(RECENT_JOKES_LIMIT).await {
        Ok(joke_list_items) => Json(JokesData {
            joke_list_items,
            user: user.map(CurrentUser::from),
        })
        .into_response(),
        Err(err) => internal_error("Failed to list jokes", err),
    }
}

#[utoipa::path(
    get,
    path = "/jokes/{id}",
    params(("id" = Uuid, Path, description = "Joke id")),
    responses(
        (status = 200, description = "The joke", body = JokeData),
        (status = 404, description = "No joke with that id"),
    ),
    tag = "jokes"
)]
#[instrument(skip_all)]
pub async fn show(Path(id): Path<String>, store: Extension<Arc<dyn Store>>) -> Response {
    let Ok(id) = Uuid::parse_str(&id) else {
        debug!("Malformed joke id");
        return StatusCode::NOT_FOUND.into_response();
    };

    match store.find_joke(id).await {
        Ok(Some(joke)) => Json(JokeData { joke }).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => internal_error("Failed to load joke", err),
    }
}
