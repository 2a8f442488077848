//! Outbound messages: an ordered sequence of parts for the transport to render.

use serde::{Deserialize, Serialize};

use story_rules::{ConversationState, DialogNode, TerminalOutcome};

/// One piece of an outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessagePart {
    Text { text: String },
    Choices { prompt: String, options: Vec<String> },
}

impl MessagePart {
    pub fn text(text: impl Into<String>) -> Self {
        MessagePart::Text { text: text.into() }
    }

    pub fn choices(prompt: impl Into<String>, options: Vec<String>) -> Self {
        MessagePart::Choices {
            prompt: prompt.into(),
            options,
        }
    }
}

/// What a turn did, for logging and for transports that care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    /// A transition fired and the state moved.
    Advanced,
    /// The intent matched nothing; the current node was shown again.
    Reprompted,
    /// The target's guard refused; nothing changed.
    GuardRejected,
    /// The help text was shown; nothing changed.
    Help,
    /// The conversation is over; the ending was shown again.
    Terminal,
    /// The state was unusable and the conversation started over.
    Restarted,
    /// The turn could not be completed; nothing changed.
    Failed,
}

/// Everything sent back for one turn, in send order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub parts: Vec<MessagePart>,
    pub kind: TurnKind,
}

impl OutboundMessage {
    pub fn new(kind: TurnKind) -> Self {
        Self {
            parts: Vec::new(),
            kind,
        }
    }

    /// Append a part.
    pub fn with_part(mut self, part: MessagePart) -> Self {
        self.parts.push(part);
        self
    }

    /// Append several parts, keeping their order.
    pub fn with_parts(mut self, parts: impl IntoIterator<Item = MessagePart>) -> Self {
        self.parts.extend(parts);
        self
    }

    /// All text in the message, choices included, one part per line.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            if !out.is_empty() {
                out.push('\n');
            }
            match part {
                MessagePart::Text { text } => out.push_str(text),
                MessagePart::Choices { prompt, options } => {
                    out.push_str(prompt);
                    for (i, option) in options.iter().enumerate() {
                        out.push_str(&format!("\n  {}. {}", i + 1, option));
                    }
                }
            }
        }
        out
    }

    /// The message as JSON, for transports that render parts themselves.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Render a node for the given state: body first, then its choices.
pub fn render_node(node: &DialogNode, state: &ConversationState) -> Vec<MessagePart> {
    let mut parts = vec![MessagePart::text(node.render_body(state))];
    if !node.options.is_empty() {
        let prompt = node.prompt.clone().unwrap_or_default();
        parts.push(MessagePart::choices(prompt, node.labels()));
    }
    parts
}

/// Render an ending.
pub fn render_outcome(outcome: &TerminalOutcome) -> Vec<MessagePart> {
    vec![MessagePart::text(outcome.message())]
}
