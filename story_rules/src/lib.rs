//! # Story Rules
//!
//! The "Story Bible" crate - dialog nodes, guards, effects, conversation state and
//! the validated dialog registry. This crate is the single source of truth for
//! story content and does not contain any transport or dispatch logic.

pub mod conversation;
pub mod mechanics;
pub mod nodes;
pub mod registry;

pub use conversation::*;
pub use mechanics::*;
pub use nodes::*;
pub use registry::*;
