//! Typed Property Dispatch
//!
//! Maps a property's declared [`PropertyType`] to the matching typed accessor
//! of the engine, so reading or writing a property never goes through a
//! runtime type-name comparison.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::BlockEngine;
use crate::core::{BlockId, CoreError, CoreResult};

/// RGBA color with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "default_alpha")]
    pub a: f32,
}

fn default_alpha() -> f32 {
    1.0
}

impl Color {
    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }
}

/// Declared type of a block property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyType {
    String,
    Float,
    Double,
    Color,
    Bool,
    Enum,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Float => "float",
            Self::Double => "double",
            Self::Color => "color",
            Self::Bool => "bool",
            Self::Enum => "enum",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = CoreError;

    /// Accepts the host's type names case-insensitively ("Float", "float").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Ok(Self::String),
            "float" => Ok(Self::Float),
            "double" => Ok(Self::Double),
            "color" => Ok(Self::Color),
            "bool" | "boolean" => Ok(Self::Bool),
            "enum" => Ok(Self::Enum),
            other => Err(CoreError::ValidationError(format!(
                "Unknown property type: {}",
                other
            ))),
        }
    }
}

/// A property value tagged with its type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum PropertyValue {
    String(String),
    Float(f32),
    Double(f64),
    Color(Color),
    Bool(bool),
    Enum(String),
}

impl PropertyValue {
    /// Type of this value
    pub fn property_type(&self) -> PropertyType {
        match self {
            Self::String(_) => PropertyType::String,
            Self::Float(_) => PropertyType::Float,
            Self::Double(_) => PropertyType::Double,
            Self::Color(_) => PropertyType::Color,
            Self::Bool(_) => PropertyType::Bool,
            Self::Enum(_) => PropertyType::Enum,
        }
    }

    /// Interprets an untagged JSON value as a value of type `ty`
    pub fn from_json(
        property: &str,
        ty: PropertyType,
        value: &serde_json::Value,
    ) -> CoreResult<Self> {
        let mismatch = || CoreError::PropertyTypeMismatch {
            property: property.to_string(),
            expected: ty.to_string(),
            actual: json_kind(value).to_string(),
        };

        match ty {
            PropertyType::String => value
                .as_str()
                .map(|s| Self::String(s.to_string()))
                .ok_or_else(mismatch),
            PropertyType::Float => value
                .as_f64()
                .map(|v| Self::Float(v as f32))
                .ok_or_else(mismatch),
            PropertyType::Double => value.as_f64().map(Self::Double).ok_or_else(mismatch),
            PropertyType::Color => serde_json::from_value::<Color>(value.clone())
                .map(Self::Color)
                .map_err(|_| mismatch()),
            PropertyType::Bool => value.as_bool().map(Self::Bool).ok_or_else(mismatch),
            PropertyType::Enum => value
                .as_str()
                .map(|s| Self::Enum(s.to_string()))
                .ok_or_else(mismatch),
        }
    }

    /// Untagged JSON representation
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::String(s) | Self::Enum(s) => serde_json::Value::String(s.clone()),
            Self::Float(v) => serde_json::json!(v),
            Self::Double(v) => serde_json::json!(v),
            Self::Color(c) => serde_json::json!({ "r": c.r, "g": c.g, "b": c.b, "a": c.a }),
            Self::Bool(v) => serde_json::Value::Bool(*v),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Reads a property through the accessor matching its declared type
pub fn read_property(
    engine: &dyn BlockEngine,
    block: BlockId,
    property: &str,
) -> CoreResult<PropertyValue> {
    let value = match engine.property_type(block, property)? {
        PropertyType::String => PropertyValue::String(engine.get_string(block, property)?),
        PropertyType::Float => PropertyValue::Float(engine.get_float(block, property)?),
        PropertyType::Double => PropertyValue::Double(engine.get_double(block, property)?),
        PropertyType::Color => PropertyValue::Color(engine.get_color(block, property)?),
        PropertyType::Bool => PropertyValue::Bool(engine.get_bool(block, property)?),
        PropertyType::Enum => PropertyValue::Enum(engine.get_enum(block, property)?),
    };
    Ok(value)
}

/// Writes a property through the accessor matching its declared type.
///
/// Fails without touching the block when the value's type differs from the
/// declared one, or when an enum value is not one of the allowed options.
pub fn write_property(
    engine: &dyn BlockEngine,
    block: BlockId,
    property: &str,
    value: &PropertyValue,
) -> CoreResult<()> {
    let declared = engine.property_type(block, property)?;
    if declared != value.property_type() {
        return Err(CoreError::PropertyTypeMismatch {
            property: property.to_string(),
            expected: declared.to_string(),
            actual: value.property_type().to_string(),
        });
    }

    match value {
        PropertyValue::String(s) => engine.set_string(block, property, s),
        PropertyValue::Float(v) => engine.set_float(block, property, *v),
        PropertyValue::Double(v) => engine.set_double(block, property, *v),
        PropertyValue::Color(c) => engine.set_color(block, property, *c),
        PropertyValue::Bool(v) => engine.set_bool(block, property, *v),
        PropertyValue::Enum(s) => {
            let allowed = engine.get_enum_values(block, property)?;
            if !allowed.iter().any(|option| option == s) {
                return Err(CoreError::InvalidEnumValue {
                    property: property.to_string(),
                    value: s.clone(),
                });
            }
            engine.set_enum(block, property, s)
        }
    }
}
