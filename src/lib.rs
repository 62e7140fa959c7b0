//! Session and balance synchronization core for the UP club platform.
//!
//! This crate owns the client-side session state (Telegram-auth gated,
//! persisted across restarts) and the background reconciliation loop that
//! keeps the user's coin balance consistent with the backend. The UI
//! layer reads the session reactively and calls its operations; it never
//! drives the synchronizer directly - that one starts and stops itself by
//! watching session transitions.
//!
//! Startup order matters: construct the [`auth::SessionStore`], call
//! [`auth::SessionStore::rehydrate`] once, then spawn the
//! [`sync::BalanceSynchronizer`]. Rendering before rehydration must key
//! off [`auth::SessionStore::is_hydrated`], not the authentication flag.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod storage;
pub mod sync;
