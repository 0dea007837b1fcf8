//! Blockkit Plugin System
//!
//! Plugins extend one editor instance by registering commands and
//! translations into its [`EditorContext`].

pub mod api;
pub mod builtins;
pub mod context;

// Re-export main types
pub use api::{Plugin, PluginInfo};
pub use builtins::{install_builtins, ArrangePlugin, PropertiesPlugin};
pub use context::EditorContext;
