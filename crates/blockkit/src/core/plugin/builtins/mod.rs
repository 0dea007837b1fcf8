//! Built-in Plugins

mod arrange;
mod properties;

pub use arrange::{ArrangePlugin, ARRANGE_GRID, ARRANGE_HORIZONTAL, ARRANGE_VERTICAL};
pub use properties::{PropertiesPlugin, PROPERTY_GET, PROPERTY_LIST, PROPERTY_SET};

use serde::de::DeserializeOwned;

use super::EditorContext;
use crate::core::{settings::KitSettings, CoreError, CoreResult};

/// Installs every built-in plugin configured from `settings`
pub fn install_builtins(ctx: &mut EditorContext, settings: &KitSettings) -> CoreResult<()> {
    ctx.add_plugin(&ArrangePlugin::new(settings.arrange.clone()))?;
    ctx.add_plugin(&PropertiesPlugin)?;
    Ok(())
}

/// Deserializes command params; `null` is treated as an empty object
pub(crate) fn parse_params<T: DeserializeOwned>(params: serde_json::Value) -> CoreResult<T> {
    let params = if params.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        params
    };
    serde_json::from_value(params).map_err(|e| CoreError::InvalidCommandParams(e.to_string()))
}
