//! Story mechanics: guards gating transitions and effects applied on entering a node.

use serde::{Deserialize, Serialize};

use crate::conversation::{ConversationState, FlagValue};

/// Predicate over conversation state gating whether a transition may fire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Guard {
    /// The item is in the inventory.
    HasItem(String),
    /// The item is not in the inventory.
    LacksItem(String),
    /// The flag is set and equal to the value.
    FlagEquals { flag: String, value: FlagValue },
    All(Vec<Guard>),
    Any(Vec<Guard>),
    Not(Box<Guard>),
}

impl Guard {
    /// Evaluate the guard against a state.
    pub fn evaluate(&self, state: &ConversationState) -> bool {
        match self {
            Guard::HasItem(item) => state.has_item(item),
            Guard::LacksItem(item) => !state.has_item(item),
            Guard::FlagEquals { flag, value } => state.flag(flag) == Some(value),
            Guard::All(guards) => guards.iter().all(|g| g.evaluate(state)),
            Guard::Any(guards) => guards.iter().any(|g| g.evaluate(state)),
            Guard::Not(inner) => !inner.evaluate(state),
        }
    }
}

/// Mutation applied to conversation state when a node is entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    AddItem(String),
    RemoveItem(String),
    SetFlag { flag: String, value: FlagValue },
}

impl Effect {
    /// Apply the effect to a state.
    pub fn apply(&self, state: &mut ConversationState) {
        match self {
            Effect::AddItem(item) => {
                state.add_item(item.clone());
            }
            Effect::RemoveItem(item) => {
                state.remove_item(item);
            }
            Effect::SetFlag { flag, value } => state.set_flag(flag.clone(), value.clone()),
        }
    }
}
