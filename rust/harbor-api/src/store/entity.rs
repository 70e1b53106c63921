//! Entity kinds, records, and the per-kind entity store.
//!
//! One schema shape is reused across all entity kinds; each kind gets its
//! own repository namespace at construction time, so a query against one
//! kind can never see another's records.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::store::memory::InMemoryNamespace;

/// The fixed set of entity kinds.
///
/// Wire names are camelCase; kinds never share storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Agents,
    Chats,
    Documents,
    Goals,
    Questions,
    Answers,
    Artifacts,
    Transcripts,
    Llms,
    Collabs,
    Breakouts,
    Sections,
    Channels,
    Prompts,
    Transcriptions,
    LiveTranscriptions,
}

impl EntityKind {
    /// Every kind, in registry order. Used to build one namespace per kind
    /// at startup.
    pub const ALL: [EntityKind; 16] = [
        Self::Agents,
        Self::Chats,
        Self::Documents,
        Self::Goals,
        Self::Questions,
        Self::Answers,
        Self::Artifacts,
        Self::Transcripts,
        Self::Llms,
        Self::Collabs,
        Self::Breakouts,
        Self::Sections,
        Self::Channels,
        Self::Prompts,
        Self::Transcriptions,
        Self::LiveTranscriptions,
    ];

    /// Wire/namespace name for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Agents => "agents",
            Self::Chats => "chats",
            Self::Documents => "documents",
            Self::Goals => "goals",
            Self::Questions => "questions",
            Self::Answers => "answers",
            Self::Artifacts => "artifacts",
            Self::Transcripts => "transcripts",
            Self::Llms => "llms",
            Self::Collabs => "collabs",
            Self::Breakouts => "breakouts",
            Self::Sections => "sections",
            Self::Channels => "channels",
            Self::Prompts => "prompts",
            Self::Transcriptions => "transcriptions",
            Self::LiveTranscriptions => "liveTranscriptions",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ApiError::NotFound(format!("Unknown entity kind: {s}")))
    }
}

/// A stored entity record.
///
/// `server_timestamp` is assigned by the store at write time and is the
/// authoritative ordering key; `timestamp` is untrusted client input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRecord {
    /// Caller-supplied identifier. Not unique within a kind; duplicates
    /// represent revisions of the same logical entity.
    pub id: String,
    /// Collaboration space this record belongs to.
    pub channel: String,
    /// Actor the record is attributed to.
    pub user_uuid: String,
    /// Opaque, kind-specific payload. Never introspected by the store.
    pub data: serde_json::Value,
    /// Client-asserted event time (epoch millis). May be skewed.
    pub timestamp: i64,
    /// Store-assigned ingestion time (epoch millis), strictly monotonic
    /// within a kind namespace.
    pub server_timestamp: i64,
    /// Audit bookkeeping stamp.
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// An incoming entity write, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDraft {
    pub id: Option<String>,
    pub channel: Option<String>,
    pub user_uuid: Option<String>,
    pub data: Option<serde_json::Value>,
    pub timestamp: Option<i64>,
}

/// A validated entity write, ready for the repository.
#[derive(Debug, Clone)]
pub struct PendingEntity {
    pub id: String,
    pub channel: String,
    pub user_uuid: String,
    pub data: serde_json::Value,
    pub timestamp: i64,
}

impl EntityDraft {
    /// Validate required fields. Performed before any write is attempted.
    fn into_pending(self) -> ApiResult<PendingEntity> {
        let id = require_string("id", self.id)?;
        let channel = require_string("channel", self.channel)?;
        let user_uuid = require_string("userUuid", self.user_uuid)?;
        let data = match self.data {
            Some(serde_json::Value::Null) | None => {
                return Err(ApiError::validation("Field 'data' is required"));
            }
            Some(value) => value,
        };
        let timestamp = self
            .timestamp
            .ok_or_else(|| ApiError::validation("Field 'timestamp' is required"))?;

        Ok(PendingEntity {
            id,
            channel,
            user_uuid,
            data,
            timestamp,
        })
    }
}

fn require_string(field: &str, value: Option<String>) -> ApiResult<String> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(ApiError::validation(format!("Field '{field}' is required"))),
    }
}

/// Repository backing a single kind namespace.
#[async_trait]
pub trait EntityRepository: Send + Sync {
    /// Persist a validated record, assigning its `server_timestamp`.
    async fn append(&self, pending: PendingEntity) -> ApiResult<EntityRecord>;

    /// Records for a channel, ascending by `server_timestamp`. With `since`,
    /// only records with a strictly greater `server_timestamp` are returned.
    async fn query_by_channel(
        &self,
        channel: &str,
        since: Option<i64>,
    ) -> ApiResult<Vec<EntityRecord>>;

    /// Records for a channel further filtered by actor, same ordering.
    async fn query_by_user(&self, channel: &str, user_uuid: &str)
        -> ApiResult<Vec<EntityRecord>>;
}

/// Keyed collection of per-kind repositories.
///
/// Built once at startup over [`EntityKind::ALL`]; the kind-to-namespace
/// mapping is fixed and not user-configurable.
pub struct EntityStore {
    namespaces: HashMap<EntityKind, Arc<dyn EntityRepository>>,
}

impl EntityStore {
    /// Create a store backed by in-memory namespaces.
    pub fn in_memory() -> Self {
        let namespaces = EntityKind::ALL
            .into_iter()
            .map(|kind| {
                let repo: Arc<dyn EntityRepository> = Arc::new(InMemoryNamespace::new());
                (kind, repo)
            })
            .collect();
        Self { namespaces }
    }

    fn namespace(&self, kind: EntityKind) -> &Arc<dyn EntityRepository> {
        // Every kind is registered at construction.
        self.namespaces
            .get(&kind)
            .unwrap_or_else(|| unreachable!("namespace missing for kind {kind}"))
    }

    /// Validate and persist an entity event into its kind namespace.
    pub async fn append(&self, kind: EntityKind, draft: EntityDraft) -> ApiResult<EntityRecord> {
        let pending = draft.into_pending()?;
        let record = self.namespace(kind).append(pending).await?;
        tracing::debug!(
            kind = %kind,
            channel = %record.channel,
            server_timestamp = record.server_timestamp,
            "Entity appended"
        );
        Ok(record)
    }

    /// Records for a kind and channel, ascending by `server_timestamp`.
    pub async fn query_by_channel(
        &self,
        kind: EntityKind,
        channel: &str,
        since: Option<i64>,
    ) -> ApiResult<Vec<EntityRecord>> {
        self.namespace(kind).query_by_channel(channel, since).await
    }

    /// Records for a kind and channel attributed to one actor.
    pub async fn query_by_user(
        &self,
        kind: EntityKind,
        channel: &str,
        user_uuid: &str,
    ) -> ApiResult<Vec<EntityRecord>> {
        self.namespace(kind).query_by_user(channel, user_uuid).await
    }
}

impl fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStore")
            .field("namespaces", &self.namespaces.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(id: &str, channel: &str, user: &str) -> EntityDraft {
        EntityDraft {
            id: Some(id.to_string()),
            channel: Some(channel.to_string()),
            user_uuid: Some(user.to_string()),
            data: Some(serde_json::json!({ "text": "hello" })),
            timestamp: Some(1_700_000_000_000),
        }
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), kind);
        }
        assert_eq!(
            "liveTranscriptions".parse::<EntityKind>().unwrap(),
            EntityKind::LiveTranscriptions
        );
        assert!("widgets".parse::<EntityKind>().is_err());
    }

    #[tokio::test]
    async fn append_assigns_server_timestamp_within_bounds() {
        let store = EntityStore::in_memory();
        let before = chrono::Utc::now().timestamp_millis();
        let record = store
            .append(EntityKind::Chats, draft("m1", "room-1", "u1"))
            .await
            .unwrap();
        let after = chrono::Utc::now().timestamp_millis();

        assert!(record.server_timestamp >= before);
        assert!(record.server_timestamp <= after + 1);
    }

    #[tokio::test]
    async fn kinds_are_isolated() {
        let store = EntityStore::in_memory();
        store
            .append(EntityKind::Chats, draft("m1", "room-1", "u1"))
            .await
            .unwrap();

        let docs = store
            .query_by_channel(EntityKind::Documents, "room-1", None)
            .await
            .unwrap();
        assert!(docs.is_empty());

        let chats = store
            .query_by_channel(EntityKind::Chats, "room-1", None)
            .await
            .unwrap();
        assert_eq!(chats.len(), 1);
    }

    #[tokio::test]
    async fn query_is_ordered_and_since_is_strict() {
        let store = EntityStore::in_memory();
        for i in 0..5 {
            store
                .append(EntityKind::Goals, draft(&format!("g{i}"), "room-1", "u1"))
                .await
                .unwrap();
        }

        let all = store
            .query_by_channel(EntityKind::Goals, "room-1", None)
            .await
            .unwrap();
        assert_eq!(all.len(), 5);
        for pair in all.windows(2) {
            assert!(pair[0].server_timestamp < pair[1].server_timestamp);
        }

        // Strictly-greater filtering: the pivot record itself is excluded.
        let pivot = all[2].server_timestamp;
        let newer = store
            .query_by_channel(EntityKind::Goals, "room-1", Some(pivot))
            .await
            .unwrap();
        assert_eq!(newer.len(), 2);
        assert!(newer.iter().all(|r| r.server_timestamp > pivot));
    }

    #[tokio::test]
    async fn query_by_user_filters_actor() {
        let store = EntityStore::in_memory();
        store
            .append(EntityKind::Chats, draft("m1", "room-1", "alice"))
            .await
            .unwrap();
        store
            .append(EntityKind::Chats, draft("m2", "room-1", "bob"))
            .await
            .unwrap();

        let alice = store
            .query_by_user(EntityKind::Chats, "room-1", "alice")
            .await
            .unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].user_uuid, "alice");
    }

    #[tokio::test]
    async fn invalid_draft_is_rejected_without_write() {
        let store = EntityStore::in_memory();

        for bad in [
            EntityDraft {
                channel: None,
                ..draft("m1", "room-1", "u1")
            },
            EntityDraft {
                user_uuid: Some("   ".into()),
                ..draft("m1", "room-1", "u1")
            },
            EntityDraft {
                data: Some(serde_json::Value::Null),
                ..draft("m1", "room-1", "u1")
            },
            EntityDraft {
                timestamp: None,
                ..draft("m1", "room-1", "u1")
            },
        ] {
            let err = store.append(EntityKind::Chats, bad).await.unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)));
        }

        let records = store
            .query_by_channel(EntityKind::Chats, "room-1", None)
            .await
            .unwrap();
        assert!(records.is_empty());
    }
}
