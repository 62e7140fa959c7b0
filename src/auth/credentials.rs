//! Storage for the session's bearer credential.
//!
//! The token is the one piece of session state that never touches the
//! on-disk blob. Production sessions keep it in the OS keychain;
//! ephemeral demo sessions (and tests) use the in-memory store so they
//! never write to the user's keychain.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use keyring::Entry;

/// Keychain service name for this application
const SERVICE_NAME: &str = "upclub";

/// Keychain account under which the bearer token is stored
const TOKEN_ACCOUNT: &str = "auth-token";

/// Boundary for bearer-credential persistence.
pub trait CredentialStore: Send + Sync {
    fn store(&self, token: &str) -> Result<()>;
    fn get(&self) -> Result<String>;
    /// Deleting a credential that does not exist is not an error.
    fn delete(&self) -> Result<()>;
}

/// OS keychain storage via the platform's native keystore.
#[derive(Debug, Clone)]
pub struct KeyringCredentials {
    service: String,
}

impl KeyringCredentials {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Use a non-default keychain service name.
    pub fn with_service(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service, TOKEN_ACCOUNT).context("Failed to create keyring entry")
    }
}

impl Default for KeyringCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringCredentials {
    fn store(&self, token: &str) -> Result<()> {
        self.entry()?
            .set_password(token)
            .context("Failed to store token in keychain")?;
        Ok(())
    }

    fn get(&self) -> Result<String> {
        self.entry()?
            .get_password()
            .context("Failed to retrieve token from keychain")
    }

    fn delete(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

/// In-memory credential storage. Clones share the same slot, so a test
/// can hold one clone across a simulated restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentials {
    token: Arc<Mutex<Option<String>>>,
}

impl MemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CredentialStore for MemoryCredentials {
    fn store(&self, token: &str) -> Result<()> {
        *self.slot() = Some(token.to_string());
        Ok(())
    }

    fn get(&self) -> Result<String> {
        self.slot()
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no stored credential"))
    }

    fn delete(&self) -> Result<()> {
        *self.slot() = None;
        Ok(())
    }
}
