//! Account service - list and create accounts

use std::sync::Arc;

use crate::adapters::ApiClient;
use crate::domain::result::{Error, Result};
use crate::domain::{Account, NewAccount, Page};

const ACCOUNTS_PATH: &str = "/accounts/";
/// Accounts are few; fetch them in one page
const ACCOUNTS_PAGE_SIZE: u32 = 500;

/// Account service
pub struct AccountService {
    client: Arc<ApiClient>,
}

impl AccountService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// All accounts of the logged-in user
    pub async fn list(&self) -> Result<Vec<Account>> {
        let path = format!("{}?page_size={}", ACCOUNTS_PATH, ACCOUNTS_PAGE_SIZE);
        let body = self.client.get(&path).await?;
        Ok(Page::<Account>::from_body(body)?.results)
    }

    /// Create a manual account and return it as stored
    pub async fn create(&self, account: &NewAccount) -> Result<Account> {
        if account.account_name.trim().is_empty() {
            return Err(Error::validation("Account name is required"));
        }
        self.client
            .post_json(ACCOUNTS_PATH, account)
            .await?
            .deserialize()
    }
}
