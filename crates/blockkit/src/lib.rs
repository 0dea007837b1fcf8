//! Blockkit Core Library
//!
//! Building blocks for editor plugins that run against a block-based design
//! engine: a named command registry with change notifications, a locale-aware
//! translation store with key-path flattening, and typed property dispatch.
//!
//! Every piece of state hangs off an [`core::plugin::EditorContext`], so two
//! editors in one process never see each other's commands or translations.

pub mod core;

pub use crate::core::{
    commands::{CommandContext, CommandHandler, CommandRegistry},
    engine::{BlockEngine, MemoryEngine, PropertyType, PropertyValue},
    i18n::TranslationStore,
    logging::init_logging,
    notify::{Subscribable, SubscriptionId},
    plugin::{EditorContext, Plugin},
    CoreError, CoreResult,
};
