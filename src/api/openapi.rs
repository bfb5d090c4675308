use super::handlers::{health, jokes, login, logout, new_joke, CurrentUser};
use crate::store::{Joke, JokeListItem};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        jokes::list,
        jokes::show,
        new_joke::form,
        new_joke::create,
        login::form,
        login::login,
        logout::logout,
        logout::visit,
    ),
    components(schemas(
        CurrentUser,
        Joke,
        JokeListItem,
        health::Health,
        jokes::JokesData,
        jokes::JokeData,
        new_joke::NewJokeForm,
        new_joke::NewJokeActionData,
        login::LoginForm,
        login::LoginActionData,
    )),
    tags(
        (name = "jokes", description = "Joke listing and submission"),
        (name = "auth", description = "Login, registration and logout"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
