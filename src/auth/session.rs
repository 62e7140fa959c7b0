//! Session state for the currently authenticated user.
//!
//! `SessionStore` is the single source of truth for "who is logged in and
//! with what data". It is an application-scoped service: construct one at
//! startup, hand clones to whatever needs it, and call [`SessionStore::rehydrate`]
//! exactly once before branching on authentication - until then the store
//! reports itself as not hydrated and consumers must show a loading state
//! rather than a false "logged out" one.
//!
//! Durability: the profile is persisted as a JSON blob through [`Storage`]
//! while the bearer token goes to the OS keychain through
//! [`CredentialStore`]. Persistence failures never surface to callers;
//! they degrade to an unauthenticated, non-persisted session.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::models::{User, UserUpdate};
use crate::storage::{Storage, CART_KEY, SESSION_KEY};

use super::CredentialStore;

/// Persisted session blob. The bearer token is intentionally absent;
/// `User` skips it during serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionBlob {
    user: User,
    saved_at: DateTime<Utc>,
}

/// Snapshot of the authentication state broadcast to observers.
///
/// `generation` increments on every login/logout transition so an
/// observer can tell "a different session" from "the same session",
/// even across a quick logout/login pair.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSnapshot {
    pub generation: u64,
    pub token: Option<String>,
}

impl AuthSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

#[derive(Debug, Default)]
struct SessionState {
    user: Option<User>,
    hydrated: bool,
    generation: u64,
}

struct Shared {
    state: RwLock<SessionState>,
    storage: Storage,
    credentials: Box<dyn CredentialStore>,
    auth_tx: watch::Sender<AuthSnapshot>,
}

#[derive(Clone)]
pub struct SessionStore {
    shared: Arc<Shared>,
}

impl SessionStore {
    pub fn new(storage: Storage, credentials: impl CredentialStore + 'static) -> Self {
        let (auth_tx, _) = watch::channel(AuthSnapshot {
            generation: 0,
            token: None,
        });
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(SessionState::default()),
                storage,
                credentials: Box::new(credentials),
                auth_tx,
            }),
        }
    }

    // A poisoned lock still yields the data; session state stays usable
    // even if some reader panicked.
    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.shared.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.shared.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the session with a freshly authenticated user.
    ///
    /// The caller (the login flow) is responsible for supplying a complete
    /// record; no validation happens here.
    pub fn login(&self, user: User) {
        let token = user.token.clone();
        let generation;
        {
            let mut state = self.write();
            state.user = Some(user.clone());
            state.generation += 1;
            generation = state.generation;
        }

        self.persist_blob(&user);
        if let Err(e) = self.shared.credentials.store(&token) {
            warn!(error = %e, "failed to persist bearer token; session will not survive a restart");
        }

        info!(username = %user.username, "session started");
        self.broadcast(generation, Some(token));
    }

    /// End the session and purge everything persisted.
    ///
    /// Idempotent: calling this while logged out still performs the
    /// clears and nothing else. The session and cart storage keys and the
    /// keychain token are removed synchronously; observers (the balance
    /// synchronizer) drop their response caches on the broadcast that
    /// follows.
    pub fn logout(&self) {
        let (was_authenticated, generation) = {
            let mut state = self.write();
            let was = state.user.take().is_some();
            state.generation += 1;
            (was, state.generation)
        };

        for key in [SESSION_KEY, CART_KEY] {
            if let Err(e) = self.shared.storage.delete(key) {
                warn!(key = key, error = %e, "failed to purge storage entry on logout");
            }
        }
        if let Err(e) = self.shared.credentials.delete() {
            warn!(error = %e, "failed to purge bearer token on logout");
        }

        if was_authenticated {
            info!("session ended");
        }
        self.broadcast(generation, None);
    }

    /// Shallow-merge a partial update into the current user.
    /// No-op when logged out.
    pub fn update_user(&self, update: UserUpdate) {
        let refreshed = {
            let mut state = self.write();
            match state.user.as_mut() {
                Some(user) => {
                    update.apply(user);
                    Some(user.clone())
                }
                None => None,
            }
        };

        match refreshed {
            Some(user) => self.persist_blob(&user),
            None => debug!("update_user ignored; no active session"),
        }
    }

    /// Load previously persisted session data into memory.
    ///
    /// Must be called explicitly once at startup. Any failure - missing
    /// or corrupt blob, unreadable keychain token - degrades to an
    /// unauthenticated session; the store always ends up hydrated.
    pub fn rehydrate(&self) {
        let blob: Option<SessionBlob> = match self.shared.storage.load(SESSION_KEY) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(error = %e, "failed to read persisted session; starting logged out");
                None
            }
        };

        let user = blob.and_then(|blob| {
            let mut user = blob.user;
            match self.shared.credentials.get() {
                Ok(token) => {
                    user.token = token;
                    Some(user)
                }
                Err(e) => {
                    warn!(error = %e, "persisted session has no usable credential; discarding");
                    None
                }
            }
        });

        let token = user.as_ref().map(|u| u.token.clone());
        let generation;
        {
            let mut state = self.write();
            state.user = user;
            state.hydrated = true;
            if token.is_some() {
                state.generation += 1;
            }
            generation = state.generation;
        }

        if let Some(token) = token {
            info!("session restored from persisted state");
            self.broadcast(generation, Some(token));
        } else {
            debug!("no persisted session; starting logged out");
        }
    }

    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.read().user.as_ref().map(|u| u.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().user.is_some()
    }

    /// False until [`SessionStore::rehydrate`] has run. Consumers must not
    /// treat a non-hydrated store as "logged out".
    pub fn is_hydrated(&self) -> bool {
        self.read().hydrated
    }

    /// Subscribe to login/logout transitions.
    pub fn watch_auth(&self) -> watch::Receiver<AuthSnapshot> {
        self.shared.auth_tx.subscribe()
    }

    fn persist_blob(&self, user: &User) {
        let blob = SessionBlob {
            user: user.clone(),
            saved_at: Utc::now(),
        };
        if let Err(e) = self.shared.storage.save(SESSION_KEY, &blob) {
            warn!(error = %e, "failed to persist session; it will not survive a restart");
        }
    }

    fn broadcast(&self, generation: u64, token: Option<String>) {
        // send_replace never fails; a value with no receivers is fine.
        self.shared.auth_tx.send_replace(AuthSnapshot { generation, token });
    }
}
