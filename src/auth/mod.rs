//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `SessionStore`: the process-wide session state with durable
//!   persistence and explicit two-phase rehydration
//! - `CredentialStore`: the bearer-token persistence boundary, with a
//!   keychain-backed implementation and an in-memory one
//! - `LoginCapability`: startup capability check for the Telegram bot
//!   login integration, with a demo fallback

pub mod credentials;
pub mod session;
pub mod telegram;

pub use credentials::{CredentialStore, KeyringCredentials, MemoryCredentials};
pub use session::{AuthSnapshot, SessionStore};
pub use telegram::{demo_login, LoginCapability, TelegramLogin};
