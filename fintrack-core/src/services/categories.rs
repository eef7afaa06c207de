//! Category service

use std::sync::Arc;

use crate::adapters::ApiClient;
use crate::domain::result::Result;
use crate::domain::{Category, Page};

const CATEGORIES_PATH: &str = "/categories/?ordering=name&page_size=500";

pub struct CategoryService {
    client: Arc<ApiClient>,
}

impl CategoryService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// All categories, ordered by name
    pub async fn list(&self) -> Result<Vec<Category>> {
        let body = self.client.get(CATEGORIES_PATH).await?;
        Ok(Page::<Category>::from_body(body)?.results)
    }

    /// Resolve a typed category name to an id for a new transaction
    pub async fn resolve(&self, name: &str) -> Result<Option<Category>> {
        let categories = self.list().await?;
        Ok(Category::find_by_name_or_last(&categories, name).cloned())
    }
}
