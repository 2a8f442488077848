//! Pure turn transition.
//!
//! Given the same registry, state and intent this always produces the same
//! result, with no I/O. The dispatcher persists `next_state` when present.

use story_rules::{
    normalize_phrase, ConversationState, DialogNode, DialogRegistry, NodeId, TerminalOutcome,
    UnknownNode,
};

use super::message::{render_node, render_outcome, MessagePart, OutboundMessage, TurnKind};
use super::TurnSettings;

/// Result of applying one intent to a state.
#[derive(Debug, Clone)]
pub struct TurnResult {
    /// New state to persist; `None` when the turn changed nothing.
    pub next_state: Option<ConversationState>,
    pub message: OutboundMessage,
}

impl TurnResult {
    fn unchanged(kind: TurnKind, parts: Vec<MessagePart>) -> Self {
        Self {
            next_state: None,
            message: OutboundMessage::new(kind).with_parts(parts),
        }
    }

    fn advanced(state: ConversationState, parts: Vec<MessagePart>) -> Self {
        Self {
            next_state: Some(state),
            message: OutboundMessage::new(TurnKind::Advanced).with_parts(parts),
        }
    }
}

/// Re-render a state without changing it: its ending once finished, its
/// current node otherwise.
pub fn reprompt(
    registry: &DialogRegistry,
    state: &ConversationState,
) -> Result<OutboundMessage, UnknownNode> {
    if let Some(outcome) = finished(state) {
        return Ok(OutboundMessage::new(TurnKind::Terminal).with_parts(render_outcome(&outcome)));
    }
    let node = registry.get(&state.current_node_id)?;
    Ok(OutboundMessage::new(TurnKind::Reprompted).with_parts(render_node(node, state)))
}

fn finished(state: &ConversationState) -> Option<TerminalOutcome> {
    state
        .outcome
        .clone()
        .or_else(|| state.current_node_id.sentinel_outcome())
}

/// Apply an intent to a conversation state.
///
/// # Algorithm
///
/// 1. Finished conversations re-render their ending
/// 2. Help intents show the help text and the current node
/// 3. Intents the current node has no transition for re-render it
/// 4. A target whose guard refuses yields the denial text
/// 5. Otherwise the target's effects are applied once and the state moves
pub fn apply(
    registry: &DialogRegistry,
    settings: &TurnSettings,
    state: &ConversationState,
    intent: &str,
) -> Result<TurnResult, UnknownNode> {
    if let Some(outcome) = finished(state) {
        return Ok(TurnResult::unchanged(TurnKind::Terminal, render_outcome(&outcome)));
    }

    let intent = normalize_phrase(intent);
    let node = registry.get(&state.current_node_id)?;

    if settings.is_help(&intent) {
        let mut parts = vec![MessagePart::text(settings.help_text.clone())];
        parts.extend(render_node(node, state));
        return Ok(TurnResult::unchanged(TurnKind::Help, parts));
    }

    let Some(target) = select_target(node, &intent) else {
        return Ok(TurnResult::unchanged(TurnKind::Reprompted, render_node(node, state)));
    };

    if let Some(outcome) = target.sentinel_outcome() {
        let mut next = state.clone();
        next.current_node_id = target.clone();
        next.outcome = Some(outcome.clone());
        next.turns += 1;
        return Ok(TurnResult::advanced(next, render_outcome(&outcome)));
    }

    let target_node = registry.get(target)?;
    if !target_node.admits(state) {
        return Ok(TurnResult::unchanged(
            TurnKind::GuardRejected,
            vec![MessagePart::text(settings.denial_text.clone())],
        ));
    }

    let mut next = state.clone();
    target_node.enter(&mut next);
    next.current_node_id = target_node.id.clone();
    next.outcome = target_node.outcome(&next);
    next.turns += 1;

    let parts = match &next.outcome {
        Some(outcome) => render_outcome(outcome),
        None => render_node(target_node, &next),
    };
    Ok(TurnResult::advanced(next, parts))
}

/// Match a normalized intent against a node's transitions, accepting option
/// labels as well as canonical intents.
fn select_target<'n>(node: &'n DialogNode, intent: &str) -> Option<&'n NodeId> {
    node.target_for(intent).or_else(|| {
        node.options
            .iter()
            .find(|o| normalize_phrase(&o.label) == intent)
            .and_then(|o| node.target_for(&o.intent))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use story_rules::{Effect, Ending, FlagValue, Guard, StoryFile, StoryHeader};
    use std::collections::BTreeMap;

    fn registry() -> DialogRegistry {
        DialogRegistry::from_story(StoryFile {
            story: StoryHeader {
                title: "Test".to_string(),
                entry: NodeId::new("Lobby"),
                initial_flags: BTreeMap::new(),
            },
            nodes: vec![
                DialogNode::new("Lobby", "You are in the lobby.")
                    .with_prompt("Where to?")
                    .with_choice("Grab the key", "grab key", "KeyTaken")
                    .with_choice("Open the vault", "open vault", "Vault")
                    .with_choice("Give up", "give up", NodeId::ENDED),
                DialogNode::new("KeyTaken", "Got it.")
                    .with_guard(Guard::LacksItem("key".to_string()))
                    .with_effect(Effect::AddItem("key".to_string()))
                    .with_choice("Back", "back", "Lobby"),
                DialogNode::new("Vault", "Gold!")
                    .with_guard(Guard::HasItem("key".to_string()))
                    .with_effect(Effect::SetFlag {
                        flag: "rich".to_string(),
                        value: FlagValue::Bool(true),
                    })
                    .with_ending(Ending::Ended),
            ],
        })
        .unwrap()
    }

    fn lobby(registry: &DialogRegistry) -> ConversationState {
        registry.initial_state()
    }

    #[test]
    fn test_unrecognized_intent_reprompts_without_change() {
        let registry = registry();
        let state = lobby(&registry);

        let result = apply(&registry, &TurnSettings::default(), &state, "dance").unwrap();

        assert!(result.next_state.is_none());
        assert_eq!(result.message.kind, TurnKind::Reprompted);
        assert_eq!(result.message.parts[0], MessagePart::text("You are in the lobby."));
    }

    #[test]
    fn test_reprompt_renders_without_change() {
        let registry = registry();
        let mut state = lobby(&registry);

        let message = reprompt(&registry, &state).unwrap();
        assert_eq!(message.kind, TurnKind::Reprompted);
        assert_eq!(message.parts[0], MessagePart::text("You are in the lobby."));

        state.current_node_id = NodeId::new("Attic");
        assert_eq!(reprompt(&registry, &state).unwrap_err(), UnknownNode(NodeId::new("Attic")));

        state.current_node_id = NodeId::new(NodeId::DEAD);
        assert_eq!(reprompt(&registry, &state).unwrap().kind, TurnKind::Terminal);
    }

    #[test]
    fn test_label_and_intent_both_match() {
        let registry = registry();
        let state = lobby(&registry);
        let settings = TurnSettings::default();

        let by_intent = apply(&registry, &settings, &state, "grab key").unwrap();
        let by_label = apply(&registry, &settings, &state, "Grab the KEY!").unwrap();

        assert_eq!(by_intent.message.kind, TurnKind::Advanced);
        assert_eq!(by_intent.next_state, by_label.next_state);
    }

    #[test]
    fn test_effects_applied_once_and_state_moves() {
        let registry = registry();
        let state = lobby(&registry);

        let result = apply(&registry, &TurnSettings::default(), &state, "grab key").unwrap();
        let next = result.next_state.unwrap();

        assert_eq!(next.current_node_id.as_str(), "KeyTaken");
        assert_eq!(next.inventory.len(), 1);
        assert!(next.has_item("key"));
        assert_eq!(next.turns, 1);
        assert_eq!(result.message.parts[0], MessagePart::text("Got it."));
    }

    #[test]
    fn test_guard_rejection_leaves_state() {
        let registry = registry();
        let state = lobby(&registry);
        let settings = TurnSettings::default();

        let result = apply(&registry, &settings, &state, "open vault").unwrap();

        assert!(result.next_state.is_none());
        assert_eq!(result.message.kind, TurnKind::GuardRejected);
        assert_eq!(result.message.parts, vec![MessagePart::text(settings.denial_text)]);
    }

    #[test]
    fn test_terminal_node_records_outcome_and_absorbs() {
        let registry = registry();
        let settings = TurnSettings::default();
        let mut state = lobby(&registry);
        state.add_item("key");

        let result = apply(&registry, &settings, &state, "open vault").unwrap();
        let next = result.next_state.unwrap();
        assert_eq!(next.outcome, Some(story_rules::TerminalOutcome::Ended("Gold!".to_string())));
        assert_eq!(next.flag("rich"), Some(&FlagValue::Bool(true)));

        let again = apply(&registry, &settings, &next, "grab key").unwrap();
        assert!(again.next_state.is_none());
        assert_eq!(again.message.kind, TurnKind::Terminal);
        assert_eq!(again.message.parts, vec![MessagePart::text("Gold!")]);
    }

    #[test]
    fn test_sentinel_target() {
        let registry = registry();
        let state = lobby(&registry);

        let result = apply(&registry, &TurnSettings::default(), &state, "give up").unwrap();
        let next = result.next_state.unwrap();

        assert_eq!(next.current_node_id.as_str(), NodeId::ENDED);
        assert!(next.is_finished());
        assert_eq!(result.message.kind, TurnKind::Advanced);
    }

    #[test]
    fn test_help_shows_text_then_node() {
        let registry = registry();
        let state = lobby(&registry);
        let settings = TurnSettings::default();

        let result = apply(&registry, &settings, &state, "Help").unwrap();

        assert!(result.next_state.is_none());
        assert_eq!(result.message.kind, TurnKind::Help);
        assert_eq!(result.message.parts[0], MessagePart::text(settings.help_text));
        assert_eq!(result.message.parts[1], MessagePart::text("You are in the lobby."));
    }

    #[test]
    fn test_unknown_current_node() {
        let registry = registry();
        let mut state = lobby(&registry);
        state.current_node_id = NodeId::new("Basement");

        let err = apply(&registry, &TurnSettings::default(), &state, "grab key").unwrap_err();
        assert_eq!(err, UnknownNode(NodeId::new("Basement")));
    }
}
