//! Plugin API
//!
//! Interface a plugin implements to extend an editor instance.

use serde::{Deserialize, Serialize};

use super::EditorContext;
use crate::core::{CoreResult, PluginId};

/// A unit of editor functionality installed into an [`EditorContext`].
///
/// `initialize` registers everything the plugin provides (commands,
/// translations) and runs once per editor instance.
pub trait Plugin: Send + Sync {
    /// Unique plugin identifier (e.g. "blockkit.arrange")
    fn id(&self) -> &str;

    /// Semantic version
    fn version(&self) -> &str {
        "0.1.0"
    }

    /// Registers the plugin's commands and translations
    fn initialize(&self, ctx: &mut EditorContext) -> CoreResult<()>;
}

/// Summary of an installed plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginInfo {
    pub id: PluginId,
    pub version: String,
}
