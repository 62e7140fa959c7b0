//! Data models for the UP club platform.
//!
//! This module contains the session user profile, the partial-update type
//! used for incremental field merges, and the wire types mirroring the
//! backend's JSON responses.

pub mod user;

pub use user::{AuthExchangeResponse, ProfileResponse, User, UserUpdate, WireUser};
