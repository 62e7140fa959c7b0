//! Balance synchronization module.
//!
//! Keeps the session's coin balance (plus avatar and membership level)
//! eventually consistent with the backend: fixed-period polling, a
//! trailing debounce for trigger bursts, a private snapshot cache with a
//! freshness lifetime, and ETag conditional fetches. Best-effort by
//! design - failed attempts are logged and retried on the next tick.

pub mod cache;
pub mod debounce;
pub mod synchronizer;

pub use cache::SyncCache;
pub use debounce::Debouncer;
pub use synchronizer::{BalanceSynchronizer, SyncConfig, SyncHandle, SyncOutcome};
