//! Dialog node definitions for the story graph.

mod dialog_node;
mod template;

pub use dialog_node::*;
pub use template::*;

use serde::{Deserialize, Serialize};

/// Identifier of a dialog node, or of a terminal sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Sentinel target meaning "the story ended".
    pub const ENDED: &'static str = "ended";

    /// Sentinel target meaning "the player died".
    pub const DEAD: &'static str = "dead";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this id is one of the well-known terminal sentinels.
    pub fn is_sentinel(&self) -> bool {
        self.0 == Self::ENDED || self.0 == Self::DEAD
    }

    /// Outcome recorded when a transition targets a sentinel directly.
    pub fn sentinel_outcome(&self) -> Option<TerminalOutcome> {
        match self.0.as_str() {
            Self::ENDED => Some(TerminalOutcome::Ended("The story ends here.".to_string())),
            Self::DEAD => Some(TerminalOutcome::Died("**DEAD**".to_string())),
            _ => None,
        }
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A choice offered to the player: the button label and the intent it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub label: String,
    pub intent: String,
}

impl ChoiceOption {
    pub fn new(label: impl Into<String>, intent: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            intent: intent.into(),
        }
    }
}

/// How a terminal node ends the story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ending {
    Ended,
    Died,
}

/// An absorbing end state with the message shown for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalOutcome {
    Ended(String),
    Died(String),
}

impl TerminalOutcome {
    pub fn new(ending: Ending, message: impl Into<String>) -> Self {
        match ending {
            Ending::Ended => TerminalOutcome::Ended(message.into()),
            Ending::Died => TerminalOutcome::Died(message.into()),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            TerminalOutcome::Ended(m) | TerminalOutcome::Died(m) => m,
        }
    }

    pub fn is_death(&self) -> bool {
        matches!(self, TerminalOutcome::Died(_))
    }
}
