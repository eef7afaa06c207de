//! Category domain model

use serde::{Deserialize, Serialize};

use super::de;

/// Transaction category from `/categories/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

impl Category {
    /// Case-insensitive exact name match, else the last category
    ///
    /// Returns `None` only when there are no categories.
    pub fn find_by_name_or_last<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
        categories
            .iter()
            .find(|c| c.name.to_lowercase() == name.to_lowercase())
            .or_else(|| categories.last())
    }
}
