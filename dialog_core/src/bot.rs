//! The bot front door: raw text in, outbound message out.

use std::sync::Arc;
use tracing::{error, warn};

use story_rules::{DialogRegistry, NodeId, RegistryError};

use crate::config::BotConfig;
use crate::dispatcher::{DispatchError, Dispatcher, MessagePart, OutboundMessage, TurnKind};
use crate::intent::{IntentResolver, WordListCorrector};
use crate::state_store::StateStore;

/// Shown before the entry node when a broken conversation is started over.
pub const RESTART_TEXT: &str = "Something went wrong with your game, so it starts over.";

/// Shown when a turn could not be completed at all.
pub const FAILURE_TEXT: &str = "Something went wrong. Please try again.";

/// Resolves intents and dispatches turns, recovering every runtime error in-band.
pub struct DialogBot<S: StateStore> {
    resolver: IntentResolver,
    dispatcher: Dispatcher<S>,
}

impl<S: StateStore> DialogBot<S> {
    pub fn new(dispatcher: Dispatcher<S>, resolver: IntentResolver) -> Self {
        Self {
            resolver,
            dispatcher,
        }
    }

    /// Wire a bot from a loaded registry, a store and the config.
    pub fn from_config(
        registry: DialogRegistry,
        store: S,
        config: &BotConfig,
    ) -> Result<Self, RegistryError> {
        let registry = match &config.entry_node {
            Some(entry) => registry.with_entry(NodeId::new(entry.as_str()))?,
            None => registry,
        };

        let resolver = IntentResolver::new()
            .with_corrector(Arc::new(WordListCorrector::zombie_office()))
            .with_correction_enabled(config.spell_correction);

        let dispatcher =
            Dispatcher::with_settings(Arc::new(registry), store, config.turn_settings());
        Ok(Self::new(dispatcher, resolver))
    }

    pub fn dispatcher(&self) -> &Dispatcher<S> {
        &self.dispatcher
    }

    pub fn resolver(&self) -> &IntentResolver {
        &self.resolver
    }

    /// Handle one inbound message for a conversation. Never fails.
    pub async fn submit_turn(&self, key: &str, raw_text: &str) -> OutboundMessage {
        let intent = self.resolver.resolve(raw_text).await;

        match self.dispatcher.handle_turn(key, &intent).await {
            Ok(message) => message,
            Err(DispatchError::UnknownNode(e)) => {
                error!(conversation = key, error = %e, "conversation state is broken, restarting");
                match self.dispatcher.restart_if_broken(key).await {
                    Ok(restarted) if restarted.kind == TurnKind::Restarted => {
                        OutboundMessage::new(TurnKind::Restarted)
                            .with_part(MessagePart::text(RESTART_TEXT))
                            .with_parts(restarted.parts)
                    }
                    Ok(current) => current,
                    Err(e) => failure(key, &e),
                }
            }
            Err(DispatchError::Store(e)) => failure(key, &e),
        }
    }

    /// Tear a conversation down when the transport ends the session.
    pub async fn end_conversation(&self, key: &str) -> bool {
        match self.dispatcher.end_conversation(key).await {
            Ok(removed) => removed,
            Err(e) => {
                warn!(conversation = key, error = %e, "failed to discard conversation");
                false
            }
        }
    }
}

fn failure(key: &str, e: &dyn std::error::Error) -> OutboundMessage {
    error!(conversation = key, error = %e, "turn failed");
    OutboundMessage::new(TurnKind::Failed).with_part(MessagePart::text(FAILURE_TEXT))
}
