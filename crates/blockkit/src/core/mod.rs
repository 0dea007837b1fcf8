//! Blockkit Core
//!
//! Editor-agnostic plugin building blocks: subscription notifier, command
//! registry, translation store, typed property access and the per-editor
//! plugin context.

pub mod commands;
pub mod engine;
pub mod i18n;
pub mod logging;
pub mod notify;
pub mod plugin;
pub mod settings;

// Re-export common types
mod types;
pub use types::*;

mod error;
pub use error::*;
