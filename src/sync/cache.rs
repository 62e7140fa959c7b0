use std::time::{Duration, Instant};

use crate::models::ProfileResponse;

/// Private snapshot cache owned by one synchronizer instance.
///
/// Never persisted and never shared: it exists only to decide whether a
/// scheduled attempt needs the network at all, and to carry the ETag
/// validator between conditional fetches. Freshness is measured on the
/// monotonic clock.
#[derive(Debug, Default)]
pub struct SyncCache {
    snapshot: Option<ProfileResponse>,
    fetched_at: Option<Instant>,
    etag: Option<String>,
}

impl SyncCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when a snapshot exists and is younger than `ttl` at `now`.
    pub fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        match (&self.snapshot, self.fetched_at) {
            (Some(_), Some(fetched_at)) => now.saturating_duration_since(fetched_at) < ttl,
            _ => false,
        }
    }

    /// Record a fresh snapshot and its validator.
    pub fn store(&mut self, snapshot: ProfileResponse, etag: Option<String>, now: Instant) {
        self.snapshot = Some(snapshot);
        self.etag = etag;
        self.fetched_at = Some(now);
    }

    /// Refresh the timestamp only - the server said the snapshot behind
    /// the validator is still current.
    pub fn touch(&mut self, now: Instant) {
        if self.snapshot.is_some() {
            self.fetched_at = Some(now);
        }
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    pub fn snapshot(&self) -> Option<&ProfileResponse> {
        self.snapshot.as_ref()
    }

    pub fn fetched_at(&self) -> Option<Instant> {
        self.fetched_at
    }

    /// Discard everything. Called whenever the session ends so the next
    /// session cannot observe a stale snapshot.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
