//! # Ferrit Binary
//!
//! Composition root: loads configuration, wires the in-memory adapters into
//! the services, bootstraps the initial account, and runs a short smoke pass
//! through the core paths. The HTTP layer mounts on top of the same wiring.

use std::sync::Arc;

use anyhow::Context;
use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

use auth_adapters::ArgonVerifier;
use domains::{PostContent, PostDraft, SystemClock, VoteValue};
use services::{AccountService, PostService};
use storage_adapters::{MemoryKv, MemoryPostRepo, MemorySessionStore, MemoryUserDirectory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = configs::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .init();

    // 1. Shared collaborators
    let clock = Arc::new(SystemClock);
    let journal = Arc::new(MemoryKv::new());

    // 2. Storage adapters, all journaling into the same key-value store
    let repo = Arc::new(MemoryPostRepo::with_journal(clock.clone(), journal.clone()));
    let directory = Arc::new(MemoryUserDirectory::new());
    let sessions = Arc::new(MemorySessionStore::with_journal(
        clock,
        chrono::Duration::seconds(settings.session.ttl_secs),
        journal,
    ));

    // 3. Services
    let accounts = AccountService::new(
        Arc::new(ArgonVerifier::new()),
        directory.clone(),
        sessions,
    );
    let posts = PostService::new(repo, directory);

    // 4. Bootstrap account and a smoke pass through the core
    let session = accounts
        .register(
            &settings.bootstrap.login,
            settings.bootstrap.password.expose_secret(),
        )
        .await
        .context("bootstrapping the initial account")?;
    tracing::info!(login = %session.login, "bootstrap account ready");

    let welcome = posts
        .create_post(
            &session,
            PostDraft {
                category: "announcements".into(),
                title: "Welcome to Ferrit".into(),
                content: PostContent::Text {
                    text: "Post, comment, and vote away.".into(),
                },
            },
        )
        .await?;
    posts.vote(&session, welcome.id, VoteValue::Up).await?;
    let view = posts.open_post(welcome.id).await?;
    tracing::info!(
        post_id = %view.id,
        score = view.score,
        upvote_percentage = view.upvote_percentage,
        "seeded welcome post"
    );

    accounts.logout(&session.token).await?;
    tracing::info!("core wiring verified, shutting down");
    Ok(())
}
