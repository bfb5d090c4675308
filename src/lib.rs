//! # Jokes
//!
//! `jokes` is a small joke sharing service: people register, log in with a
//! cookie session, list the most recent jokes and submit their own.
//!
//! ## Sessions
//!
//! Sessions are stateless. The `RJ_session` cookie carries the user id signed
//! with HMAC-SHA256; the server keeps no session table. Logging out expires the
//! cookie on the client.
//!
//! ## Storage
//!
//! Users and jokes live in `PostgreSQL` (see `sql/schema.sql`). Usernames are
//! unique; registration checks for an existing user before inserting and
//! treats a unique-constraint violation the same way.

pub mod api;
pub mod auth;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
