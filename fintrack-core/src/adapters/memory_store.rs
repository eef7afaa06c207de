//! In-process credential store
//!
//! Tokens live only as long as the store. Used for tests and for
//! sessions that must not touch disk.

use std::sync::Mutex;

use crate::domain::result::{Error, Result};
use crate::domain::CredentialPair;
use crate::ports::CredentialStore;

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<CredentialPair>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the given tokens
    pub fn with_tokens(access: Option<&str>, refresh: Option<&str>) -> Self {
        Self {
            inner: Mutex::new(CredentialPair {
                access_token: access.map(str::to_string),
                refresh_token: refresh.map(str::to_string),
            }),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, CredentialPair>> {
        self.inner
            .lock()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Result<CredentialPair> {
        Ok(self.lock()?.clone())
    }

    fn set(&self, access: &str, refresh: Option<&str>) -> Result<()> {
        let mut pair = self.lock()?;
        pair.access_token = Some(access.to_string());
        if let Some(r) = refresh {
            pair.refresh_token = Some(r.to_string());
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.lock()? = CredentialPair::default();
        Ok(())
    }
}
