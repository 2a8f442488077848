//! Declarative story file format (TOML).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::conversation::FlagValue;
use crate::nodes::{DialogNode, NodeId};

/// Built-in zombie office story, embedded at compile time.
pub const ZOMBIE_OFFICE_STORY: &str = include_str!("../../content/zombie_office.toml");

/// Header of a story file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryHeader {
    pub title: String,

    /// Node every new conversation starts at.
    pub entry: NodeId,

    /// Flags every new conversation starts with.
    #[serde(default)]
    pub initial_flags: BTreeMap<String, FlagValue>,
}

/// A whole story as written on disk: a header plus `[[nodes]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryFile {
    pub story: StoryHeader,

    #[serde(default)]
    pub nodes: Vec<DialogNode>,
}

impl StoryFile {
    /// Parse a story from TOML text.
    pub fn from_toml_str(src: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(src)
    }
}

/// Canonical form of a phrase: trimmed, lowercase, single-spaced, without
/// trailing punctuation.
pub fn normalize_phrase(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '.' | '!' | '?'))
        .to_lowercase()
}
