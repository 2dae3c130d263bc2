//! Dishboard entry point: loads configuration, assembles the adapters
//! selected at compile time, and serves the router. All wiring happens
//! here, once; nothing downstream touches globals.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

use api_adapters::{build_router, AppState};
use auth_adapters::{Argon2Hasher, CookieSessions, TimedSigner};
use configs::AppConfig;
use domains::ports::{BlobStore, PostStore, UserStore};
use mail_adapters::LogMailer;
use services::{AccountService, PostService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let secret = config.auth.secret_key.expose_secret().as_bytes().to_vec();

    #[cfg(feature = "db-postgres")]
    let (user_store, post_store): (Arc<dyn UserStore>, Arc<dyn PostStore>) = {
        let pool = storage_adapters::postgres::connect(
            config.database.url.expose_secret(),
            config.database.max_connections,
        )
        .await
        .context("connecting to postgres")?;
        (
            Arc::new(storage_adapters::postgres::PgUserStore::new(pool.clone())),
            Arc::new(storage_adapters::postgres::PgPostStore::new(pool)),
        )
    };
    #[cfg(not(feature = "db-postgres"))]
    let (user_store, post_store): (Arc<dyn UserStore>, Arc<dyn PostStore>) = (
        Arc::new(storage_adapters::memory::MemoryUserStore::new()),
        Arc::new(storage_adapters::memory::MemoryPostStore::new()),
    );

    #[cfg(feature = "media-local")]
    let blob_store: Arc<dyn BlobStore> = Arc::new(storage_adapters::media::LocalBlobStore::new(
        config.media.root.clone(),
    ));
    #[cfg(not(feature = "media-local"))]
    let blob_store: Arc<dyn BlobStore> = Arc::new(storage_adapters::media::MemoryBlobStore::new());

    let sessions = Arc::new(CookieSessions::new(
        &secret,
        Duration::from_secs(config.auth.session_ttl),
    ));
    let accounts = AccountService::new(
        user_store,
        blob_store.clone(),
        Arc::new(Argon2Hasher),
        Arc::new(TimedSigner::new(&secret, "email-confirm")),
        Arc::new(LogMailer::new(config.mail.sender.clone())),
        config.server.public_url.clone(),
        Duration::from_secs(config.auth.confirm_token_max_age),
    );
    let posts = PostService::new(post_store.clone(), blob_store.clone());

    let state = AppState {
        posts,
        accounts,
        post_store,
        blob_store,
        sessions,
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "dishboard listening");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
