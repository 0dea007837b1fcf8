//! Blockkit Core Type Definitions
//!
//! Defines fundamental types used throughout the kit.

// =============================================================================
// ID Types
// =============================================================================

/// Host block handle (assigned by the engine)
pub type BlockId = u64;

/// Command label (e.g. "blockkit.arrange.grid")
pub type CommandLabel = String;

/// Locale code (e.g. "en", "de")
pub type Locale = String;

/// Plugin identifier (e.g. "blockkit.arrange")
pub type PluginId = String;

/// Default locale used by new translation stores
pub const DEFAULT_LOCALE: &str = "en";
