//! Internationalization
//!
//! Locale tables addressed by flattened dotted keys.

mod flatten;
mod store;

pub use flatten::{flatten, unflatten, KEY_SEPARATOR};
pub use store::{TranslationEvent, TranslationStore};

/// Prefix under which command labels are translated (`commands.<label>`)
pub const COMMAND_KEY_PREFIX: &str = "commands";

/// Translation key for a command label
pub fn command_key(label: &str) -> String {
    format!("{}{}{}", COMMAND_KEY_PREFIX, KEY_SEPARATOR, label)
}
