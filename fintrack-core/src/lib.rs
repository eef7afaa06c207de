//! FinTrack Core - API client for the FinTrack personal finance service
//!
//! This crate follows hexagonal architecture:
//!
//! - **domain**: Plain data (credentials, request options, payload views, errors)
//! - **ports**: Trait definitions for external dependencies (CredentialStore)
//! - **services**: Typed operations over API endpoints, plus the event log
//! - **adapters**: Concrete implementations (reqwest client, credential files)
//!
//! The heart of the crate is [`ApiClient::request`]: every call carries the
//! stored access token, and a single 401 triggers one token refresh and one
//! retry before the outcome is reported.

pub mod adapters;
pub mod config;
pub mod domain;
mod log_migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use adapters::FileCredentialStore;
use config::Config;
use services::*;

// Re-export commonly used types at crate root
pub use adapters::{ApiClient, MemoryCredentialStore};
pub use domain::result::{Error, OperationResult};
pub use domain::{
    Account, Category, CredentialPair, NewAccount, NewTransaction, Page, ParsedBody, Profile,
    RegisterRequest, RequestOptions, Transaction, TransactionFilter,
};
pub use ports::CredentialStore;

/// Main context for FinTrack operations
///
/// Wires configuration, the on-disk credential store and one shared
/// `ApiClient` into the services.
pub struct FintrackContext {
    pub config: Config,
    pub data_dir: PathBuf,
    pub client: Arc<ApiClient>,
    pub auth_service: AuthService,
    pub account_service: AccountService,
    pub transaction_service: TransactionService,
    pub category_service: CategoryService,
    pub bank_link_service: BankLinkService,
}

impl FintrackContext {
    /// Create a context without an event log
    pub fn new(data_dir: &Path) -> Result<Self> {
        Self::open(data_dir, None)
    }

    /// Create a context whose client records events in `event_log`
    pub fn open(data_dir: &Path, event_log: Option<Arc<EventLog>>) -> Result<Self> {
        let config = Config::load(data_dir)?;
        let store: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::new(data_dir)?);

        let mut client = ApiClient::from_config(&config, store)?;
        if let Some(log) = event_log {
            client = client.with_event_log(log);
        }
        let client = Arc::new(client);

        Ok(Self {
            auth_service: AuthService::new(Arc::clone(&client)),
            account_service: AccountService::new(Arc::clone(&client)),
            transaction_service: TransactionService::new(Arc::clone(&client)),
            category_service: CategoryService::new(Arc::clone(&client)),
            bank_link_service: BankLinkService::new(Arc::clone(&client)),
            client,
            config,
            data_dir: data_dir.to_path_buf(),
        })
    }
}
