//! REST API client module for the UP club backend.
//!
//! The backend uses bearer token authentication; tokens are obtained by
//! exchanging a one-time code produced by the Telegram bot login flow.
//! The profile endpoint supports ETag validators so the synchronizer can
//! poll cheaply.

pub mod client;
pub mod error;

pub use client::{ApiClient, ProfileFetch};
pub use error::ApiError;
