//! State Store - one mutable conversation record per conversation key.
//!
//! The store is the only awaited boundary of a turn. [`InMemoryStateStore`]
//! keeps state for the lifetime of the process; durable backings implement
//! [`StateStore`] outside this crate.

mod locks;

pub use locks::*;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use story_rules::ConversationState;

/// Errors raised by a state backing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("state store unavailable: {0}")]
    Unavailable(String),
}

/// Storage for conversation state.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the state for a conversation, if one exists.
    async fn load(&self, key: &str) -> Result<Option<ConversationState>, StoreError>;

    /// Persist the full state for a conversation.
    async fn save(&self, key: &str, state: &ConversationState) -> Result<(), StoreError>;

    /// Discard a conversation. Returns whether anything was removed.
    async fn remove(&self, key: &str) -> Result<bool, StoreError>;
}

#[async_trait]
impl<T: StateStore + ?Sized> StateStore for Arc<T> {
    async fn load(&self, key: &str) -> Result<Option<ConversationState>, StoreError> {
        (**self).load(key).await
    }

    async fn save(&self, key: &str, state: &ConversationState) -> Result<(), StoreError> {
        (**self).save(key, state).await
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        (**self).remove(key).await
    }
}

/// Process-local store backed by a map.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    states: RwLock<HashMap<String, ConversationState>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live conversations.
    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn load(&self, key: &str) -> Result<Option<ConversationState>, StoreError> {
        Ok(self.states.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, state: &ConversationState) -> Result<(), StoreError> {
        self.states
            .write()
            .await
            .insert(key.to_string(), state.clone());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.states.write().await.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use story_rules::NodeId;
    use std::collections::BTreeMap;

    fn state(node: &str) -> ConversationState {
        ConversationState::new(NodeId::new(node), BTreeMap::new())
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let store = InMemoryStateStore::new();
        assert_eq!(store.load("nobody").await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = InMemoryStateStore::new();
        let mut s = state("Floor8");
        s.add_item("card");

        store.save("alice", &s).await.unwrap();
        assert_eq!(store.load("alice").await.unwrap(), Some(s));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let store = InMemoryStateStore::new();
        store.save("alice", &state("Floor8")).await.unwrap();
        store.save("bob", &state("Floor7")).await.unwrap();

        let alice = store.load("alice").await.unwrap().unwrap();
        let bob = store.load("bob").await.unwrap().unwrap();
        assert_eq!(alice.current_node_id.as_str(), "Floor8");
        assert_eq!(bob.current_node_id.as_str(), "Floor7");
    }

    #[tokio::test]
    async fn test_remove() {
        let store = Arc::new(InMemoryStateStore::new());
        store.save("alice", &state("Floor8")).await.unwrap();

        assert!(store.remove("alice").await.unwrap());
        assert!(!store.remove("alice").await.unwrap());
        assert_eq!(store.load("alice").await.unwrap(), None);
    }
}
