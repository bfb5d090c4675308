use crate::{
    api,
    auth::{AuthService, SessionCodec},
    store::{PgStore, Store},
};
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: SecretString,
    pub session_secrets: Vec<SecretString>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if no session secret is usable, the database is unreachable, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!(
        port = args.port,
        session_secrets = args.session_secrets.len(),
        "Starting server"
    );

    let codec =
        SessionCodec::new(args.session_secrets).context("Invalid session secret configuration")?;

    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(args.dsn.expose_secret())
        .await
        .context("Failed to connect to database")?;

    info!("Connected to database");

    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));
    let auth = Arc::new(AuthService::new(Arc::clone(&store), codec));

    api::new(args.port, store, auth).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_execute_requires_a_session_secret() {
        let args = Args {
            port: 0,
            dsn: SecretString::from("postgres://localhost:1/jokes".to_string()),
            session_secrets: vec![SecretString::from(String::new())],
        };

        let err = execute(args).await.err().map(|err| err.to_string());
        assert_eq!(
            err,
            Some("Invalid session secret configuration".to_string())
        );
    }
}
