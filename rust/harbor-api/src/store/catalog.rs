//! Library catalog: curated, globally unique shareable items with
//! popularity counters.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::store::memory::InMemoryCatalog;

/// A published catalog item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryItem {
    /// Globally unique identity, enforced at publish time.
    pub uuid: String,
    pub data: LibraryItemData,
    /// Catalog time (epoch millis).
    pub timestamp: i64,
    /// Audit bookkeeping stamp.
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Catalog item payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryItemData {
    pub name: String,
    pub description: String,
    pub image: String,
    /// Popularity counter, adjusted atomically.
    pub votes: i64,
    /// Times the item has been duplicated/used.
    pub copies: i64,
}

/// An incoming catalog submission, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryItemDraft {
    pub uuid: Option<String>,
    pub data: Option<LibraryItemDataDraft>,
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryItemDataDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub votes: Option<i64>,
    #[serde(default)]
    pub copies: Option<i64>,
}

impl LibraryItemDraft {
    fn into_item(self) -> ApiResult<LibraryItem> {
        let uuid = match self.uuid {
            Some(u) if !u.trim().is_empty() => u,
            _ => return Err(ApiError::validation("Field 'uuid' is required")),
        };
        let data = self
            .data
            .ok_or_else(|| ApiError::validation("Field 'data' is required"))?;
        let timestamp = self
            .timestamp
            .ok_or_else(|| ApiError::validation("Field 'timestamp' is required"))?;

        Ok(LibraryItem {
            uuid,
            data: LibraryItemData {
                name: require_data_string("name", data.name)?,
                description: require_data_string("description", data.description)?,
                image: require_data_string("image", data.image)?,
                votes: data.votes.unwrap_or(0),
                copies: data.copies.unwrap_or(0),
            },
            timestamp,
            created_at: chrono::Utc::now(),
        })
    }
}

fn require_data_string(field: &str, value: Option<String>) -> ApiResult<String> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(ApiError::validation(format!(
            "Field 'data.{field}' is required"
        ))),
    }
}

/// Which popularity counter to adjust.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterField {
    Votes,
    Copies,
}

/// Ordering key for catalog listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogOrder {
    #[default]
    Votes,
    Timestamp,
}

/// Repository backing the catalog.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Insert a new item; fails on a colliding uuid, leaving the existing
    /// item unchanged.
    async fn insert(&self, item: LibraryItem) -> ApiResult<LibraryItem>;

    /// Atomically adjust a counter, returning the updated item.
    async fn increment(
        &self,
        uuid: &str,
        field: CounterField,
        delta: i64,
    ) -> ApiResult<LibraryItem>;

    /// Snapshot of the catalog in the requested order.
    async fn list(&self, order_by: CatalogOrder, descending: bool) -> ApiResult<Vec<LibraryItem>>;
}

/// The deduplicated catalog of shareable items.
pub struct LibraryCatalog {
    repo: Arc<dyn CatalogRepository>,
}

impl LibraryCatalog {
    /// Create a catalog backed by in-memory storage.
    pub fn in_memory() -> Self {
        Self {
            repo: Arc::new(InMemoryCatalog::new()),
        }
    }

    /// Validate and publish a catalog item. Counters default to zero
    /// unless explicitly provided.
    pub async fn publish(&self, draft: LibraryItemDraft) -> ApiResult<LibraryItem> {
        let item = draft.into_item()?;
        let stored = self.repo.insert(item).await?;
        tracing::debug!(uuid = %stored.uuid, "Library item published");
        Ok(stored)
    }

    /// Atomically adjust the votes counter.
    pub async fn increment_votes(&self, uuid: &str, delta: i64) -> ApiResult<LibraryItem> {
        self.repo.increment(uuid, CounterField::Votes, delta).await
    }

    /// Atomically adjust the copies counter.
    pub async fn increment_copies(&self, uuid: &str, delta: i64) -> ApiResult<LibraryItem> {
        self.repo.increment(uuid, CounterField::Copies, delta).await
    }

    /// List catalog items in the requested order.
    pub async fn list(
        &self,
        order_by: CatalogOrder,
        descending: bool,
    ) -> ApiResult<Vec<LibraryItem>> {
        self.repo.list(order_by, descending).await
    }
}

impl fmt::Debug for LibraryCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryCatalog").finish_non_exhaustive()
    }
}
