//! Documentation output sink.
//!
//! Completion responses are stored here instead of being discarded, keyed
//! by fully-qualified class name. The shipped store is in-memory; final
//! rendering and persistence of documentation stay out of scope.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;

/// One piece of generated documentation for one class.
#[derive(Debug, Clone, Serialize)]
pub struct DocRecord {
    pub record_id: Uuid,
    /// Fully-qualified name of the documented class.
    pub class_name: String,
    /// Subscriber that produced the content.
    pub agent: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl DocRecord {
    pub fn new(
        class_name: impl Into<String>,
        agent: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            record_id: Uuid::now_v7(),
            class_name: class_name.into(),
            agent: agent.into(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Where subscribers deliver their results.
#[async_trait]
pub trait DocumentationSink: Send + Sync {
    async fn store(&self, record: DocRecord) -> Result<()>;
}

/// In-memory store keyed by fully-qualified class name.
#[derive(Default)]
pub struct MemoryDocStore {
    records: RwLock<BTreeMap<String, Vec<DocRecord>>>,
}

impl MemoryDocStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records_for(&self, class_name: &str) -> Vec<DocRecord> {
        self.records
            .read()
            .await
            .get(class_name)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn class_names(&self) -> Vec<String> {
        self.records.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentationSink for MemoryDocStore {
    async fn store(&self, record: DocRecord) -> Result<()> {
        debug!(
            class = %record.class_name,
            agent = %record.agent,
            bytes = record.content.len(),
            "storing documentation record"
        );
        self.records
            .write()
            .await
            .entry(record.class_name.clone())
            .or_default()
            .push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_keyed_by_class_name() {
        let store = MemoryDocStore::new();
        store
            .store(DocRecord::new("App.Foo", "documentation", "docs for Foo"))
            .await
            .unwrap();
        store
            .store(DocRecord::new("App.Foo", "analysis", "analysis of Foo"))
            .await
            .unwrap();
        store
            .store(DocRecord::new("App.Baz", "documentation", "docs for Baz"))
            .await
            .unwrap();

        assert_eq!(store.len().await, 3);
        assert_eq!(store.class_names().await, ["App.Baz", "App.Foo"]);

        let foo = store.records_for("App.Foo").await;
        assert_eq!(foo.len(), 2);
        assert_eq!(foo[0].agent, "documentation");
        assert_eq!(foo[1].agent, "analysis");
    }

    #[tokio::test]
    async fn test_missing_class_yields_no_records() {
        let store = MemoryDocStore::new();
        assert!(store.is_empty().await);
        assert!(store.records_for("App.Gone").await.is_empty());
    }
}
