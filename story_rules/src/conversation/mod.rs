//! Conversation state - the single mutable record kept per active conversation.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use crate::nodes::{NodeId, TerminalOutcome};

/// Unique identifier for a conversation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a nil/empty session ID (useful for fixtures).
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Flag value types for per-conversation flags.
///
/// Untagged so story files can write `level = 8` or `lights = false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl std::fmt::Display for FlagValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlagValue::Bool(b) => write!(f, "{}", b),
            FlagValue::Int(i) => write!(f, "{}", i),
            FlagValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        FlagValue::Bool(value)
    }
}

impl From<i64> for FlagValue {
    fn from(value: i64) -> Self {
        FlagValue::Int(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        FlagValue::Text(value.to_string())
    }
}

/// The complete state of one conversation at any point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Session this state belongs to, stable for the conversation's lifetime.
    pub session_id: SessionId,

    /// Node the player is currently at, or a terminal sentinel.
    pub current_node_id: NodeId,

    /// Items picked up so far.
    pub inventory: BTreeSet<String>,

    /// Story flags and variables.
    pub flags: BTreeMap<String, FlagValue>,

    /// Set once the story has ended; the conversation is absorbed from then on.
    pub outcome: Option<TerminalOutcome>,

    /// Number of transitions applied.
    pub turns: u64,
}

impl ConversationState {
    /// Create a fresh state positioned at `entry` with the given initial flags.
    pub fn new(entry: NodeId, flags: BTreeMap<String, FlagValue>) -> Self {
        Self {
            session_id: SessionId::new(),
            current_node_id: entry,
            inventory: BTreeSet::new(),
            flags,
            outcome: None,
            turns: 0,
        }
    }

    /// Check if the conversation reached an ending.
    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Check if an item is held.
    pub fn has_item(&self, item: &str) -> bool {
        self.inventory.contains(item)
    }

    /// Add an item. Returns false if it was already held.
    pub fn add_item(&mut self, item: impl Into<String>) -> bool {
        self.inventory.insert(item.into())
    }

    /// Remove an item. Returns false if it was not held.
    pub fn remove_item(&mut self, item: &str) -> bool {
        self.inventory.remove(item)
    }

    /// Get a flag by name.
    pub fn flag(&self, name: &str) -> Option<&FlagValue> {
        self.flags.get(name)
    }

    /// Set a flag, replacing any previous value.
    pub fn set_flag(&mut self, name: impl Into<String>, value: FlagValue) {
        self.flags.insert(name.into(), value);
    }

    /// Inventory as a human-readable list.
    pub fn inventory_summary(&self) -> String {
        if self.inventory.is_empty() {
            "nothing".to_string()
        } else {
            self.inventory
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let mut flags = BTreeMap::new();
        flags.insert("level".to_string(), FlagValue::Int(8));
        let state = ConversationState::new(NodeId::new("Floor8"), flags);

        assert_eq!(state.current_node_id.as_str(), "Floor8");
        assert!(state.inventory.is_empty());
        assert_eq!(state.flag("level"), Some(&FlagValue::Int(8)));
        assert!(!state.is_finished());
        assert_eq!(state.turns, 0);
    }

    #[test]
    fn test_inventory_is_a_set() {
        let mut state = ConversationState::new(NodeId::new("Floor8"), BTreeMap::new());

        assert!(state.add_item("card"));
        assert!(!state.add_item("card"));
        assert_eq!(state.inventory.len(), 1);
        assert!(state.has_item("card"));

        assert!(state.remove_item("card"));
        assert!(!state.remove_item("card"));
    }

    #[test]
    fn test_inventory_summary() {
        let mut state = ConversationState::new(NodeId::new("Floor8"), BTreeMap::new());
        assert_eq!(state.inventory_summary(), "nothing");

        state.add_item("extinguisher");
        state.add_item("calculator");
        assert_eq!(state.inventory_summary(), "calculator, extinguisher");
    }

    #[test]
    fn test_flag_value_untagged() {
        let flags: BTreeMap<String, FlagValue> =
            toml::from_str("level = 8\nlights = false\nname = \"Bob\"").unwrap();

        assert_eq!(flags["level"], FlagValue::Int(8));
        assert_eq!(flags["lights"], FlagValue::Bool(false));
        assert_eq!(flags["name"], FlagValue::Text("Bob".to_string()));
    }

    #[test]
    fn test_state_json_roundtrip() {
        let mut state = ConversationState::new(NodeId::new("Floor8"), BTreeMap::new());
        state.add_item("card");
        state.outcome = Some(TerminalOutcome::Died("**DEAD**".to_string()));

        let json = serde_json::to_string(&state).unwrap();
        let back: ConversationState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
