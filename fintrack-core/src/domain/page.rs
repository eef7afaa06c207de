//! Paginated list responses

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::body::ParsedBody;
use super::result::{Error, Result};

/// One page of a list endpoint
///
/// List endpoints answer `{count, next, previous, results}` when
/// pagination is on, or a bare array otherwise. Both map here; a bare
/// array becomes a single page whose `count` is its length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageShape<T> {
    Paginated {
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        results: Vec<T>,
    },
    Bare(Vec<T>),
}

impl<T: DeserializeOwned> Page<T> {
    /// Unwrap a list response body
    pub fn from_body(body: ParsedBody) -> Result<Self> {
        let value = match body {
            ParsedBody::Json(value) => value,
            ParsedBody::Text(text) if text.trim().is_empty() => {
                return Ok(Self::empty());
            }
            ParsedBody::Text(_) => {
                return Err(Error::invalid_response("expected a JSON list"));
            }
        };

        if value.is_null() {
            return Ok(Self::empty());
        }

        let shape: PageShape<T> = serde_json::from_value(value)
            .map_err(|e| Error::invalid_response(format!("unexpected list shape: {}", e)))?;

        Ok(match shape {
            PageShape::Paginated {
                count,
                next,
                previous,
                results,
            } => Self {
                count: count.unwrap_or(results.len() as u64),
                next,
                previous,
                results,
            },
            PageShape::Bare(results) => Self {
                count: results.len() as u64,
                next: None,
                previous: None,
                results,
            },
        })
    }
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            count: 0,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    /// Number of pages for this page size, never less than one
    pub fn total_pages(&self, page_size: u32) -> u64 {
        if page_size == 0 {
            return 1;
        }
        self.count.div_ceil(page_size as u64).max(1)
    }

    /// 1-based (first, last) item numbers shown on `page`
    ///
    /// First is 0 when the list is empty.
    pub fn display_range(&self, page: u32, page_size: u32) -> (u64, u64) {
        let offset = (page.max(1) as u64 - 1) * page_size as u64;
        let start = if self.count == 0 { 0 } else { offset + 1 };
        let end = self.count.min(offset + self.results.len() as u64);
        (start, end)
    }
}
