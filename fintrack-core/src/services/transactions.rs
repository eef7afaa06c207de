//! Transaction service - paged listing and manual entry

use std::sync::Arc;

use url::form_urlencoded;

use crate::adapters::ApiClient;
use crate::domain::result::{Error, Result};
use crate::domain::{NewTransaction, Page, Transaction};

const TRANSACTIONS_PATH: &str = "/transactions/";

pub const DEFAULT_ORDERING: &str = "-transactionDate";
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Server-side query for one page of transactions
#[derive(Debug, Clone)]
pub struct TransactionQuery {
    pub ordering: String,
    /// 1-based
    pub page: u32,
    pub page_size: u32,
    pub search: Option<String>,
    pub account: Option<String>,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            ordering: DEFAULT_ORDERING.to_string(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search: None,
            account: None,
        }
    }
}

impl TransactionQuery {
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn account(mut self, id: impl Into<String>) -> Self {
        self.account = Some(id.into());
        self
    }

    /// Encoded query string, without the leading `?`
    pub fn to_query_string(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("ordering", &self.ordering)
            .append_pair("page", &self.page.to_string())
            .append_pair("page_size", &self.page_size.to_string());
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            query.append_pair("search", search.trim());
        }
        if let Some(account) = &self.account {
            query.append_pair("account", account);
        }
        query.finish()
    }
}

/// Transaction service
pub struct TransactionService {
    client: Arc<ApiClient>,
}

impl TransactionService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Fetch one page of transactions
    pub async fn list(&self, query: &TransactionQuery) -> Result<Page<Transaction>> {
        let path = format!("{}?{}", TRANSACTIONS_PATH, query.to_query_string());
        let body = self.client.get(&path).await?;
        Page::from_body(body)
    }

    /// Record a manual transaction
    pub async fn create(&self, transaction: &NewTransaction) -> Result<Transaction> {
        if transaction.account.trim().is_empty() {
            return Err(Error::validation("Transaction needs an account"));
        }
        if transaction.name.trim().is_empty() && transaction.merchant_name.trim().is_empty() {
            return Err(Error::validation("Transaction needs a name or merchant"));
        }
        self.client
            .post_json(TRANSACTIONS_PATH, transaction)
            .await?
            .deserialize()
    }
}
