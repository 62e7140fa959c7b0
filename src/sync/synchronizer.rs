//! Background reconciliation of the user's balance with the backend.
//!
//! One synchronizer exists per authenticated session. It polls
//! `GET /api/users/me` on a fixed period, collapses trigger bursts with a
//! trailing debounce, and keeps a private snapshot cache so an attempt
//! inside the cache lifetime costs no network at all. Stale attempts use
//! the ETag validator from the previous response so an unchanged profile
//! costs a `304` instead of a body.
//!
//! Every failure is absorbed here: a bad tick is logged and the next
//! scheduled tick retries on the fixed period. Nothing propagates to the
//! UI, and a `401` does not force a logout (that call belongs to the
//! product layer, not this loop).

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ProfileFetch};
use crate::auth::SessionStore;
use crate::models::UserUpdate;

use super::{Debouncer, SyncCache};

/// Fixed polling period for balance reconciliation.
const POLL_INTERVAL_SECS: u64 = 30;

/// Trailing debounce window; trigger bursts inside it collapse into a
/// single attempt.
const DEBOUNCE_WINDOW_MS: u64 = 300;

/// Maximum age at which a cached snapshot avoids a network call.
const CACHE_TTL_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub poll_interval: Duration,
    pub debounce_window: Duration,
    pub cache_ttl: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(POLL_INTERVAL_SECS),
            debounce_window: Duration::from_millis(DEBOUNCE_WINDOW_MS),
            cache_ttl: Duration::from_secs(CACHE_TTL_SECS),
        }
    }
}

/// Outcome of a single reconciliation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Cached snapshot was younger than the cache lifetime; no network.
    CacheHit,
    /// Fresh data fetched and merged into the session.
    Updated,
    /// Server confirmed the cached snapshot is still current.
    NotModified,
    /// Not authenticated or no API endpoint configured.
    Skipped,
    /// Transport, authorization or parse failure; logged and absorbed.
    Failed,
}

pub struct BalanceSynchronizer {
    store: SessionStore,
    client: Option<ApiClient>,
    config: SyncConfig,
    cache: SyncCache,
}

impl BalanceSynchronizer {
    pub fn new(store: SessionStore, client: Option<ApiClient>, config: SyncConfig) -> Self {
        Self {
            store,
            client,
            config,
            cache: SyncCache::new(),
        }
    }

    /// Run a single reconciliation attempt against the current session.
    ///
    /// Cache-first: a snapshot younger than the cache lifetime short
    /// circuits before any network. Otherwise a conditional fetch runs,
    /// and a `200` merges balance/avatar/membership into the session.
    pub async fn sync_once(&mut self) -> SyncOutcome {
        let Some(token) = self.store.token() else {
            debug!("balance sync skipped; no active session");
            return SyncOutcome::Skipped;
        };

        if self.cache.is_fresh(self.config.cache_ttl, Instant::now()) {
            debug!("balance snapshot still fresh; skipping fetch");
            return SyncOutcome::CacheHit;
        }

        let Some(client) = self.client.as_ref() else {
            warn!("balance sync disabled; no API endpoint configured");
            return SyncOutcome::Skipped;
        };

        let etag = self.cache.etag().map(str::to_string);
        let result = client.fetch_profile(&token, etag.as_deref()).await;

        match result {
            Ok(ProfileFetch::NotModified) => {
                self.cache.touch(Instant::now());
                debug!("balance unchanged");
                SyncOutcome::NotModified
            }
            Ok(ProfileFetch::Fresh { profile, etag }) => {
                let Some(coins) = profile.up_coins else {
                    warn!("profile response missing balance; ignoring");
                    return SyncOutcome::Failed;
                };

                self.store.update_user(UserUpdate {
                    up_coins: Some(coins),
                    avatar_url: profile.photo_url.clone(),
                    membership_level: profile.membership_level.clone(),
                    ..Default::default()
                });
                self.cache.store(profile, etag, Instant::now());
                info!(up_coins = coins, "balance synchronized");
                SyncOutcome::Updated
            }
            Err(e) => {
                warn!(error = %e, "balance sync failed; will retry on next tick");
                SyncOutcome::Failed
            }
        }
    }

    /// Spawn the reconciliation loop on the current runtime.
    ///
    /// The loop owns its repeating interval and its debounce one-shot;
    /// both are torn down together on logout and on shutdown.
    pub fn spawn(self) -> SyncHandle {
        let trigger = Arc::new(Notify::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(self.run(Arc::clone(&trigger), shutdown_rx));

        SyncHandle {
            trigger,
            shutdown_tx,
            task,
        }
    }

    async fn run(mut self, trigger: Arc<Notify>, mut shutdown: watch::Receiver<bool>) {
        let mut auth_rx = self.store.watch_auth();
        let mut generation = auth_rx.borrow_and_update().generation;

        let mut interval = time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut debouncer = Debouncer::new(self.config.debounce_window);

        debug!("balance synchronizer started");

        loop {
            let armed = debouncer.is_armed();
            let authenticated = self.store.is_authenticated();

            tokio::select! {
                _ = shutdown.changed() => break,

                changed = auth_rx.changed() => {
                    if changed.is_err() {
                        // Store dropped; nothing left to synchronize.
                        break;
                    }
                    let snapshot = auth_rx.borrow_and_update().clone();
                    if snapshot.generation == generation {
                        continue;
                    }
                    generation = snapshot.generation;

                    // Any session transition invalidates the snapshot:
                    // the next user must never observe the previous one.
                    self.cache.reset();
                    debouncer.cancel();

                    if snapshot.is_authenticated() {
                        debug!("session started; scheduling immediate sync");
                        interval.reset();
                        debouncer.trigger();
                    } else {
                        debug!("session ended; synchronizer idle");
                    }
                }

                _ = interval.tick(), if authenticated => {
                    debouncer.trigger();
                }

                _ = trigger.notified() => {
                    // Live check: a trigger can race a login in the
                    // same poll cycle.
                    if self.store.is_authenticated() {
                        debouncer.trigger();
                    }
                }

                _ = debouncer.fire(), if armed => {
                    self.sync_once().await;
                }
            }
        }

        info!("balance synchronizer stopped");
    }
}

/// Handle to a spawned synchronizer.
pub struct SyncHandle {
    trigger: Arc<Notify>,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// Request an out-of-band attempt. Debounced like every other
    /// trigger, so a burst of calls still costs one fetch.
    pub fn trigger(&self) {
        self.trigger.notify_one();
    }

    /// Stop the loop and wait for it to wind down.
    pub async fn shutdown(self) {
        // Receiver may already be gone if the loop exited on its own.
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "synchronizer task did not shut down cleanly");
        }
    }
}
