//! # Dialog Core
//!
//! The engine of the Zombie Office bot. This crate interfaces with
//! `story_rules`, keeps per-conversation state and dispatches turns.
//!
//! ## Core Components
//!
//! - **state_store**: Per-conversation state behind an async storage trait, with per-key turn locks
//! - **dispatcher**: Applies intents to state through the pure transition function and renders replies
//! - **intent**: Normalizes raw text, with optional correction and recognizer passes
//! - **bot**: The inbound surface used by transports
//!
//! ## Design Philosophy
//!
//! - **Data-Driven**: The story is content in `story_rules`; the engine knows no rooms
//! - **Single Writer**: Turns for one conversation never overlap; distinct conversations never wait on each other
//! - **In-Band Recovery**: Runtime problems become messages to the user, not crashes

pub mod bot;
pub mod config;
pub mod dispatcher;
pub mod intent;
pub mod state_store;

pub use bot::*;
pub use config::*;
pub use dispatcher::*;
pub use intent::*;
pub use state_store::*;
