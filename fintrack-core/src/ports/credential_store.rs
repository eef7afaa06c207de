//! Credential storage port
//!
//! The API client reads and updates tokens only through this trait, so the
//! backing store (a file on disk, memory in tests) is chosen by whoever
//! builds the client.

use crate::domain::result::Result;
use crate::domain::CredentialPair;

/// Persistent home of the access/refresh token pair
///
/// Implementations have no expiry of their own; the remote service decides
/// when a token is stale by answering 401.
pub trait CredentialStore: Send + Sync {
    /// Current tokens (either may be absent)
    fn get(&self) -> Result<CredentialPair>;

    /// Store a new access token
    ///
    /// `refresh: None` leaves the stored refresh token untouched.
    fn set(&self, access: &str, refresh: Option<&str>) -> Result<()>;

    /// Delete both tokens
    fn clear(&self) -> Result<()>;
}
