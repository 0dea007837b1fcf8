//! Properties Plugin
//!
//! Generic read/write access to typed block properties.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::parse_params;
use crate::core::{
    commands::{CommandContext, CommandDescription, CommandHandler},
    engine::{read_property, write_property, PropertyValue},
    plugin::{EditorContext, Plugin},
    BlockId, CoreResult,
};

pub const PROPERTY_GET: &str = "blockkit.property.get";
pub const PROPERTY_SET: &str = "blockkit.property.set";
pub const PROPERTY_LIST: &str = "blockkit.property.list";

#[derive(Debug, Deserialize)]
struct GetParams {
    block: BlockId,
    property: String,
}

#[derive(Debug, Deserialize)]
struct SetParams {
    block: BlockId,
    property: String,
    value: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ListParams {
    block: BlockId,
}

struct GetProperty;

#[async_trait]
impl CommandHandler for GetProperty {
    async fn call(
        &self,
        ctx: &CommandContext,
        params: serde_json::Value,
    ) -> CoreResult<serde_json::Value> {
        let params: GetParams = parse_params(params)?;
        let value = read_property(ctx.engine(), params.block, &params.property)?;
        Ok(serde_json::to_value(value)?)
    }
}

struct SetProperty;

#[async_trait]
impl CommandHandler for SetProperty {
    async fn call(
        &self,
        ctx: &CommandContext,
        params: serde_json::Value,
    ) -> CoreResult<serde_json::Value> {
        let params: SetParams = parse_params(params)?;
        let engine = ctx.engine();

        let declared = engine.property_type(params.block, &params.property)?;
        let value = PropertyValue::from_json(&params.property, declared, &params.value)?;
        write_property(engine, params.block, &params.property, &value)?;

        let stored = read_property(engine, params.block, &params.property)?;
        Ok(serde_json::to_value(stored)?)
    }
}

struct ListProperties;

#[async_trait]
impl CommandHandler for ListProperties {
    async fn call(
        &self,
        ctx: &CommandContext,
        params: serde_json::Value,
    ) -> CoreResult<serde_json::Value> {
        let params: ListParams = parse_params(params)?;
        let engine = ctx.engine();

        let mut properties = Vec::new();
        for name in engine.find_all_properties(params.block)? {
            let ty = engine.property_type(params.block, &name)?;
            properties.push(json!({ "name": name, "type": ty }));
        }
        Ok(serde_json::Value::Array(properties))
    }
}

/// Registers the property commands and their translations
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertiesPlugin;

impl Plugin for PropertiesPlugin {
    fn id(&self) -> &str {
        "blockkit.properties"
    }

    fn initialize(&self, ctx: &mut EditorContext) -> CoreResult<()> {
        let commands = ctx.commands_mut();
        commands.register_command(
            PROPERTY_GET,
            Arc::new(GetProperty),
            Some(
                CommandDescription::new()
                    .with_group("properties")
                    .with_args(json!({ "block": "number", "property": "string" }))
                    .with_returns(json!({ "type": "string", "value": "any" })),
            ),
        )?;
        commands.register_command(
            PROPERTY_SET,
            Arc::new(SetProperty),
            Some(
                CommandDescription::new()
                    .with_group("properties")
                    .with_args(json!({ "block": "number", "property": "string", "value": "any" }))
                    .with_returns(json!({ "type": "string", "value": "any" })),
            ),
        )?;
        commands.register_command(
            PROPERTY_LIST,
            Arc::new(ListProperties),
            Some(
                CommandDescription::new()
                    .with_group("properties")
                    .with_args(json!({ "block": "number" })),
            ),
        )?;

        ctx.i18n_mut().set_translations(json!({
            "en": {
                "commands": {
                    (PROPERTY_GET): "Read property",
                    (PROPERTY_SET): "Change property",
                    (PROPERTY_LIST): "List properties"
                }
            },
            "de": {
                "commands": {
                    (PROPERTY_GET): "Eigenschaft lesen",
                    (PROPERTY_SET): "Eigenschaft ändern",
                    (PROPERTY_LIST): "Eigenschaften auflisten"
                }
            }
        }))
    }
}
