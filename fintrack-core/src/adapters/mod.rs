//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest HTTP client for the FinTrack REST API
//! - JSON file with an advisory lock for the CredentialStore port
//! - In-memory CredentialStore for tests and ephemeral sessions

pub mod api_client;
pub mod file_store;
pub mod memory_store;

#[cfg(test)]
pub mod mock_api;

pub use api_client::{method_from_str, ApiClient};
pub use file_store::FileCredentialStore;
pub use memory_store::MemoryCredentialStore;
