//! Artifix core: intent routing, personality modes and persistent
//! memory for a voice-activated desktop assistant.
//!
//! The crate is organized around one router ([`services::IntentRouter`])
//! that owns three stateful services (mode registry, memory store,
//! task store) and a set of trait-based collaborators for everything
//! that touches the outside world.

pub mod collaborators;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use error::{AssistantError, Result};
