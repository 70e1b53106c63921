//! In-memory storage backends.
//!
//! The repository traits are the seam where a persistent engine would plug
//! in; these backends keep everything behind `parking_lot` locks. No lock
//! is held across an await point.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{ApiError, ApiResult};
use crate::store::catalog::{CatalogOrder, CatalogRepository, CounterField, LibraryItem};
use crate::store::entity::{EntityRecord, EntityRepository, PendingEntity};

/// Append log for a single kind namespace.
///
/// Records are stored in `server_timestamp` order by construction, so
/// queries filter without re-sorting.
#[derive(Debug, Default)]
pub struct InMemoryNamespace {
    records: RwLock<Vec<EntityRecord>>,
}

impl InMemoryNamespace {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityRepository for InMemoryNamespace {
    async fn append(&self, pending: PendingEntity) -> ApiResult<EntityRecord> {
        let now = chrono::Utc::now();
        let mut records = self.records.write();

        // Strictly monotonic within the namespace, even when two writes
        // land in the same millisecond.
        let floor = records.last().map_or(i64::MIN, |r| r.server_timestamp + 1);
        let server_timestamp = now.timestamp_millis().max(floor);

        let record = EntityRecord {
            id: pending.id,
            channel: pending.channel,
            user_uuid: pending.user_uuid,
            data: pending.data,
            timestamp: pending.timestamp,
            server_timestamp,
            created_at: now,
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn query_by_channel(
        &self,
        channel: &str,
        since: Option<i64>,
    ) -> ApiResult<Vec<EntityRecord>> {
        let records = self.records.read();
        Ok(records
            .iter()
            .filter(|r| r.channel == channel)
            .filter(|r| since.is_none_or(|ts| r.server_timestamp > ts))
            .cloned()
            .collect())
    }

    async fn query_by_user(
        &self,
        channel: &str,
        user_uuid: &str,
    ) -> ApiResult<Vec<EntityRecord>> {
        let records = self.records.read();
        Ok(records
            .iter()
            .filter(|r| r.channel == channel && r.user_uuid == user_uuid)
            .cloned()
            .collect())
    }
}

/// Uuid-keyed catalog storage.
///
/// Counter increments take the write lock, so concurrent adjustments are
/// atomic with respect to each other.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    items: RwLock<HashMap<String, LibraryItem>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalog {
    async fn insert(&self, item: LibraryItem) -> ApiResult<LibraryItem> {
        let mut items = self.items.write();
        if items.contains_key(&item.uuid) {
            return Err(ApiError::Duplicate(format!(
                "Library item already exists: {}",
                item.uuid
            )));
        }
        items.insert(item.uuid.clone(), item.clone());
        Ok(item)
    }

    async fn increment(
        &self,
        uuid: &str,
        field: CounterField,
        delta: i64,
    ) -> ApiResult<LibraryItem> {
        let mut items = self.items.write();
        let item = items
            .get_mut(uuid)
            .ok_or_else(|| ApiError::NotFound(format!("Library item not found: {uuid}")))?;
        match field {
            CounterField::Votes => item.data.votes += delta,
            CounterField::Copies => item.data.copies += delta,
        }
        Ok(item.clone())
    }

    async fn list(&self, order_by: CatalogOrder, descending: bool) -> ApiResult<Vec<LibraryItem>> {
        let items = self.items.read();
        let mut listed: Vec<LibraryItem> = items.values().cloned().collect();
        match order_by {
            CatalogOrder::Votes => listed.sort_by_key(|i| i.data.votes),
            CatalogOrder::Timestamp => listed.sort_by_key(|i| i.timestamp),
        }
        if descending {
            listed.reverse();
        }
        Ok(listed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn server_timestamps_are_strictly_increasing() {
        let namespace = InMemoryNamespace::new();
        let mut last = i64::MIN;
        for i in 0..50 {
            let record = namespace
                .append(PendingEntity {
                    id: format!("r{i}"),
                    channel: "room-1".into(),
                    user_uuid: "u1".into(),
                    data: serde_json::json!({}),
                    timestamp: 0,
                })
                .await
                .unwrap();
            assert!(record.server_timestamp > last);
            last = record.server_timestamp;
        }
    }
}
