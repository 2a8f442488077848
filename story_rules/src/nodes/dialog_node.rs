//! The dialog node - one narrative state with fixed text, choices and transitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{render_template, ChoiceOption, Ending, NodeId, TerminalOutcome};
use crate::conversation::ConversationState;
use crate::mechanics::{Effect, Guard};

/// A full node definition as declared in a story file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogNode {
    pub id: NodeId,

    /// Body text; may contain `{inventory}` and `{flag:NAME}` placeholders.
    pub body: String,

    /// Question shown above the choices.
    #[serde(default)]
    pub prompt: Option<String>,

    /// Choices in display order.
    #[serde(default)]
    pub options: Vec<ChoiceOption>,

    /// Must hold for a transition into this node to fire.
    #[serde(default)]
    pub guard: Option<Guard>,

    /// Applied once each time a transition enters this node.
    #[serde(default)]
    pub on_enter: Vec<Effect>,

    /// Intent -> target node (or sentinel).
    #[serde(default)]
    pub transitions: BTreeMap<String, NodeId>,

    /// Present on terminal nodes.
    #[serde(default)]
    pub ending: Option<Ending>,
}

impl DialogNode {
    /// Create a scene node with the given body.
    pub fn new(id: impl Into<NodeId>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
            prompt: None,
            options: Vec::new(),
            guard: None,
            on_enter: Vec::new(),
            transitions: BTreeMap::new(),
            ending: None,
        }
    }

    /// Set the prompt shown above the choices.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Add a choice and the node it leads to.
    pub fn with_choice(
        mut self,
        label: impl Into<String>,
        intent: impl Into<String>,
        target: impl Into<NodeId>,
    ) -> Self {
        let intent = intent.into();
        self.transitions.insert(intent.clone(), target.into());
        self.options.push(ChoiceOption::new(label, intent));
        self
    }

    /// Set the guard.
    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add an on-enter effect.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.on_enter.push(effect);
        self
    }

    /// Mark this node as terminal.
    pub fn with_ending(mut self, ending: Ending) -> Self {
        self.ending = Some(ending);
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.ending.is_some()
    }

    /// Target for an intent, if this node has a transition for it.
    pub fn target_for(&self, intent: &str) -> Option<&NodeId> {
        self.transitions.get(intent)
    }

    /// Check whether the guard (if any) admits the given state.
    pub fn admits(&self, state: &ConversationState) -> bool {
        self.guard.as_ref().map_or(true, |g| g.evaluate(state))
    }

    /// Apply all on-enter effects to the state.
    pub fn enter(&self, state: &mut ConversationState) {
        for effect in &self.on_enter {
            effect.apply(state);
        }
    }

    /// Body with placeholders substituted from the state.
    pub fn render_body(&self, state: &ConversationState) -> String {
        render_template(&self.body, state)
    }

    /// Option labels in display order.
    pub fn labels(&self) -> Vec<String> {
        self.options.iter().map(|o| o.label.clone()).collect()
    }

    /// The outcome recorded when a conversation enters this node.
    pub fn outcome(&self, state: &ConversationState) -> Option<TerminalOutcome> {
        self.ending
            .map(|ending| TerminalOutcome::new(ending, self.render_body(state)))
    }
}
