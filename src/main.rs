//! UP club core - session and balance synchronization daemon.
//!
//! Bootstraps the session store from persisted state, resolves the login
//! capability, and runs the balance synchronizer until interrupted.

use std::io;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use upclub_core::api::ApiClient;
use upclub_core::auth::{self, KeyringCredentials, LoginCapability, MemoryCredentials, SessionStore};
use upclub_core::config::Config;
use upclub_core::storage::Storage;
use upclub_core::sync::{BalanceSynchronizer, SyncConfig};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("UP club core starting");

    let config = Config::load()?;
    let storage = Storage::new(config.data_dir()?)?;

    // Capability check happens once, up front: either the Telegram bot
    // integration is configured or we run an explicit demo session.
    // Demo sessions are ephemeral and must not touch the OS keychain.
    let capability = LoginCapability::detect(&config);
    let store = match capability {
        LoginCapability::Telegram(_) => SessionStore::new(storage, KeyringCredentials::new()),
        LoginCapability::Demo => SessionStore::new(storage, MemoryCredentials::new()),
    };

    // Two-phase init: the store reports "hydrating" until this runs.
    store.rehydrate();

    let client = config.api_url().map(ApiClient::new).transpose()?;

    match capability {
        LoginCapability::Telegram(login) => {
            if !store.is_authenticated() {
                info!(url = %login.login_url(), "no session; complete login via the Telegram bot");
            }
        }
        LoginCapability::Demo => {
            if !store.is_authenticated() {
                warn!("login integration unavailable; starting demo session");
                auth::demo_login(&store);
            }
        }
    }

    let synchronizer = BalanceSynchronizer::new(store.clone(), client, SyncConfig::default());
    let handle = synchronizer.spawn();

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    handle.shutdown().await;

    Ok(())
}
