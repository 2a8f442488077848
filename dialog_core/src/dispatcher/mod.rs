//! Dispatcher - runs one conversation turn against the dialog registry.
//!
//! A turn works as follows:
//! 1. **Serialize**: take the per-conversation turn lock
//! 2. **Load**: fetch the conversation state, initializing it on first contact
//! 3. **Transition**: apply the intent with the pure [`transition::apply`]
//! 4. **Persist**: save the new state if the turn changed it
//! 5. **Render**: hand the outbound message back to the caller

mod message;
pub mod transition;

pub use message::*;
pub use transition::TurnResult;

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use story_rules::{normalize_phrase, ConversationState, DialogRegistry, UnknownNode};

use crate::state_store::{StateStore, StoreError, TurnLocks};

/// Fixed texts and global intents used while dispatching.
#[derive(Debug, Clone)]
pub struct TurnSettings {
    /// Canonical intents that show the help text from any node.
    pub help_intents: Vec<String>,

    /// Shown for a help intent, before the current node.
    pub help_text: String,

    /// Shown when a target's guard refuses the transition.
    pub denial_text: String,
}

impl Default for TurnSettings {
    fn default() -> Self {
        Self {
            help_intents: vec!["help".to_string()],
            help_text: "You are trapped in an office full of zombies. Pick one of the \
                        choices, or type it in your own words."
                .to_string(),
            denial_text: "You can't do that!".to_string(),
        }
    }
}

impl TurnSettings {
    /// Check if a normalized intent is a help intent.
    pub fn is_help(&self, intent: &str) -> bool {
        self.help_intents
            .iter()
            .any(|h| normalize_phrase(h) == intent)
    }
}

/// Errors that escape a turn. Guard refusals and unrecognized input are not
/// errors; they come back as in-band messages.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("conversation state points at {0}")]
    UnknownNode(#[from] UnknownNode),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Runs turns for many conversations over one shared registry.
pub struct Dispatcher<S: StateStore> {
    registry: Arc<DialogRegistry>,
    store: S,
    locks: TurnLocks,
    settings: TurnSettings,
}

impl<S: StateStore> Dispatcher<S> {
    /// Create a dispatcher with default settings.
    pub fn new(registry: Arc<DialogRegistry>, store: S) -> Self {
        Self::with_settings(registry, store, TurnSettings::default())
    }

    pub fn with_settings(registry: Arc<DialogRegistry>, store: S, settings: TurnSettings) -> Self {
        Self {
            registry,
            store,
            locks: TurnLocks::new(),
            settings,
        }
    }

    pub fn registry(&self) -> &DialogRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &TurnSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one turn for a conversation.
    pub async fn handle_turn(
        &self,
        key: &str,
        intent: &str,
    ) -> Result<OutboundMessage, DispatchError> {
        let _turn = self.locks.acquire(key).await;

        let state = self.load_or_init(key).await?;
        let result = transition::apply(&self.registry, &self.settings, &state, intent)?;

        if let Some(next) = &result.next_state {
            self.store.save(key, next).await?;
            info!(
                conversation = key,
                from = %state.current_node_id,
                to = %next.current_node_id,
                intent,
                finished = next.is_finished(),
                "transition applied"
            );
        } else {
            debug!(
                conversation = key,
                node = %state.current_node_id,
                intent,
                kind = ?result.message.kind,
                "turn left state unchanged"
            );
        }

        Ok(result.message)
    }

    /// Current state for a conversation, created and persisted on first contact.
    pub async fn load_or_init(&self, key: &str) -> Result<ConversationState, StoreError> {
        if let Some(state) = self.store.load(key).await? {
            return Ok(state);
        }

        let state = self.registry.initial_state();
        self.store.save(key, &state).await?;
        info!(
            conversation = key,
            session = %state.session_id,
            entry = %state.current_node_id,
            "conversation started"
        );
        Ok(state)
    }

    /// Start a conversation over at the entry node if its state still points
    /// at an unknown node. The check runs under the turn lock, so a
    /// conversation already repaired by another turn is re-rendered as it is.
    pub async fn restart_if_broken(&self, key: &str) -> Result<OutboundMessage, DispatchError> {
        let _turn = self.locks.acquire(key).await;

        let state = self.load_or_init(key).await?;
        match transition::reprompt(&self.registry, &state) {
            Ok(current) => Ok(current),
            Err(UnknownNode(broken)) => {
                let fresh = self.registry.initial_state();
                self.store.save(key, &fresh).await?;
                info!(
                    conversation = key,
                    broken = %broken,
                    session = %fresh.session_id,
                    "conversation restarted"
                );

                let entry = transition::reprompt(&self.registry, &fresh)?;
                Ok(OutboundMessage::new(TurnKind::Restarted).with_parts(entry.parts))
            }
        }
    }

    /// Tear a conversation down. Returns whether it existed.
    pub async fn end_conversation(&self, key: &str) -> Result<bool, StoreError> {
        let turn = self.locks.acquire(key).await;
        let removed = self.store.remove(key).await?;
        drop(turn);
        self.locks.forget_idle(key);

        info!(conversation = key, removed, "conversation ended");
        Ok(removed)
    }
}
