//! Dialog Registry - the read-only, validated set of nodes a story is made of.
//!
//! The registry is built once at startup and checked eagerly:
//! - **Unique ids**: no two nodes share an id
//! - **Closed graph**: every transition targets a node or a terminal sentinel
//! - **Reachable intents**: every transition intent is offered as an option
//! - **Live options**: every option leads somewhere
//! - **Absorbing endings**: terminal nodes have no options or transitions
//! - **Playable entry**: conversations start at a defined, non-terminal node
//!
//! Broken content fails here, before any conversation is served.

mod story;

pub use story::*;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::conversation::{ConversationState, FlagValue};
use crate::nodes::{DialogNode, NodeId};

/// Integrity problems found while loading a story. Fatal at startup.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read story file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse story: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("duplicate node id '{0}'")]
    DuplicateNode(NodeId),

    #[error("node '{node}': intent '{intent}' targets undefined node '{target}'")]
    DanglingTarget {
        node: NodeId,
        intent: String,
        target: NodeId,
    },

    #[error("node '{node}': transition '{intent}' has no matching option")]
    TransitionWithoutOption { node: NodeId, intent: String },

    #[error("node '{node}': option '{intent}' has no transition")]
    OptionWithoutTransition { node: NodeId, intent: String },

    #[error("node '{node}': intent '{intent}' is declared more than once")]
    DuplicateIntent { node: NodeId, intent: String },

    #[error("terminal node '{0}' declares options or transitions")]
    TerminalHasExits(NodeId),

    #[error("entry node '{0}' is not defined")]
    MissingEntry(NodeId),

    #[error("entry node '{0}' is an ending")]
    TerminalEntry(NodeId),
}

/// Lookup of a node id the registry does not contain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown node '{0}'")]
pub struct UnknownNode(pub NodeId);

/// The validated story graph.
#[derive(Debug, Clone)]
pub struct DialogRegistry {
    title: String,
    entry: NodeId,
    initial_flags: BTreeMap<String, FlagValue>,
    nodes: HashMap<NodeId, DialogNode>,
    /// Declaration order, for stable iteration.
    order: Vec<NodeId>,
}

impl DialogRegistry {
    /// Build a registry from a parsed story, validating it eagerly.
    pub fn from_story(story: StoryFile) -> Result<Self, RegistryError> {
        let mut nodes = HashMap::with_capacity(story.nodes.len());
        let mut order = Vec::with_capacity(story.nodes.len());

        for node in story.nodes {
            let node = canonicalize(node)?;
            if nodes.contains_key(&node.id) {
                return Err(RegistryError::DuplicateNode(node.id));
            }
            order.push(node.id.clone());
            nodes.insert(node.id.clone(), node);
        }

        let registry = Self {
            title: story.story.title,
            entry: story.story.entry,
            initial_flags: story.story.initial_flags,
            nodes,
            order,
        };
        registry.validate()?;

        info!(
            title = %registry.title,
            entry = %registry.entry,
            nodes = registry.len(),
            "dialog registry loaded"
        );
        Ok(registry)
    }

    /// Parse and validate a story from TOML text.
    pub fn from_toml_str(src: &str) -> Result<Self, RegistryError> {
        Self::from_story(StoryFile::from_toml_str(src)?)
    }

    /// Read, parse and validate a story file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&src)
    }

    /// The built-in zombie office story.
    pub fn zombie_office() -> Result<Self, RegistryError> {
        Self::from_toml_str(ZOMBIE_OFFICE_STORY)
    }

    /// Replace the entry node, re-checking it the way loading does.
    pub fn with_entry(mut self, entry: NodeId) -> Result<Self, RegistryError> {
        self.check_entry(&entry)?;
        self.entry = entry;
        Ok(self)
    }

    /// Get a node by id.
    pub fn get(&self, id: &NodeId) -> Result<&DialogNode, UnknownNode> {
        self.nodes.get(id).ok_or_else(|| UnknownNode(id.clone()))
    }

    /// Check if a node id is defined.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn entry(&self) -> &NodeId {
        &self.entry
    }

    pub fn initial_flags(&self) -> &BTreeMap<String, FlagValue> {
        &self.initial_flags
    }

    /// A fresh conversation state positioned at the entry node.
    pub fn initial_state(&self) -> ConversationState {
        ConversationState::new(self.entry.clone(), self.initial_flags.clone())
    }

    /// All nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &DialogNode> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn check_entry(&self, entry: &NodeId) -> Result<(), RegistryError> {
        match self.nodes.get(entry) {
            None => Err(RegistryError::MissingEntry(entry.clone())),
            Some(node) if node.is_terminal() => Err(RegistryError::TerminalEntry(entry.clone())),
            Some(_) => Ok(()),
        }
    }

    fn validate(&self) -> Result<(), RegistryError> {
        self.check_entry(&self.entry)?;

        for node in self.nodes() {
            if node.is_terminal() && (!node.options.is_empty() || !node.transitions.is_empty()) {
                return Err(RegistryError::TerminalHasExits(node.id.clone()));
            }

            if let Some(option) = node
                .options
                .iter()
                .find(|o| !node.transitions.contains_key(&o.intent))
            {
                return Err(RegistryError::OptionWithoutTransition {
                    node: node.id.clone(),
                    intent: option.intent.clone(),
                });
            }

            for (intent, target) in &node.transitions {
                if !node.options.iter().any(|o| &o.intent == intent) {
                    return Err(RegistryError::TransitionWithoutOption {
                        node: node.id.clone(),
                        intent: intent.clone(),
                    });
                }
                if !target.is_sentinel() && !self.nodes.contains_key(target) {
                    return Err(RegistryError::DanglingTarget {
                        node: node.id.clone(),
                        intent: intent.clone(),
                        target: target.clone(),
                    });
                }
            }

            debug!(node = %node.id, exits = node.transitions.len(), "node validated");
        }

        Ok(())
    }
}

/// Bring option intents and transition keys into canonical form.
fn canonicalize(mut node: DialogNode) -> Result<DialogNode, RegistryError> {
    let mut seen = Vec::with_capacity(node.options.len());
    for option in &mut node.options {
        option.intent = normalize_phrase(&option.intent);
        if seen.contains(&option.intent) {
            return Err(RegistryError::DuplicateIntent {
                node: node.id.clone(),
                intent: option.intent.clone(),
            });
        }
        seen.push(option.intent.clone());
    }

    let mut transitions = BTreeMap::new();
    for (intent, target) in std::mem::take(&mut node.transitions) {
        let intent = normalize_phrase(&intent);
        if transitions.insert(intent.clone(), target).is_some() {
            return Err(RegistryError::DuplicateIntent {
                node: node.id.clone(),
                intent,
            });
        }
    }
    node.transitions = transitions;

    Ok(node)
}
