//! Blockkit Error Definitions
//!
//! Defines error types used throughout the kit.

use thiserror::Error;

use super::{BlockId, CommandLabel};

/// Core kit error types
#[derive(Error, Debug)]
pub enum CoreError {
    // =========================================================================
    // Command Errors
    // =========================================================================
    #[error("Command not found: {0}")]
    CommandNotFound(CommandLabel),

    #[error("Invalid command parameters: {0}")]
    InvalidCommandParams(String),

    #[error("Command execution failed: {0}")]
    CommandExecutionFailed(String),

    // =========================================================================
    // Subscription Errors
    // =========================================================================
    #[error("Subscriber failed: {0}")]
    SubscriberFailed(String),

    // =========================================================================
    // Translation Errors
    // =========================================================================
    #[error("Invalid translations: {0}")]
    InvalidTranslations(String),

    // =========================================================================
    // Engine Errors
    // =========================================================================
    #[error("Block not found: {0}")]
    BlockNotFound(BlockId),

    #[error("Property not found: {property} on block {block}")]
    PropertyNotFound { block: BlockId, property: String },

    #[error("Property type mismatch on '{property}': expected {expected}, got {actual}")]
    PropertyTypeMismatch {
        property: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid enum value '{value}' for property '{property}'")]
    InvalidEnumValue { property: String, value: String },

    // =========================================================================
    // Plugin Errors
    // =========================================================================
    #[error("Plugin error: {0}")]
    PluginError(String),

    #[error("Plugin already loaded: {0}")]
    PluginAlreadyLoaded(String),

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Core kit result type
pub type CoreResult<T> = Result<T, CoreError>;
