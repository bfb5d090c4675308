use crate::cli::{
    actions::{server::Args, Action},
    commands::{ARG_DSN, ARG_PORT, ARG_SESSION_SECRET},
};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .context("missing required argument: --dsn")?;

    let session_secrets: Vec<SecretString> = matches
        .get_many::<String>(ARG_SESSION_SECRET)
        .context("missing required argument: --session-secret")?
        .map(|secret| SecretString::from(secret.clone()))
        .collect();

    Ok(Action::Server(Args {
        port,
        dsn: SecretString::from(dsn),
        session_secrets,
    }))
}
