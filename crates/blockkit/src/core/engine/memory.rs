//! In-Memory Engine
//!
//! A headless [`BlockEngine`] used by tests and the CLI. Blocks live in a
//! flat map guarded by a lock; ids are assigned sequentially from 1.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{BlockEngine, Color, PropertyType, PropertyValue};
use crate::core::{BlockId, CoreError, CoreResult};

/// Declarative block description used to seed a scene
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSpec {
    /// Block kind (e.g. "graphic", "text")
    pub kind: String,
    /// Parent block id (must refer to an earlier spec)
    #[serde(default)]
    pub parent: Option<BlockId>,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub selected: bool,
    /// Typed properties keyed by path
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

#[derive(Debug, Clone, Default)]
struct BlockRecord {
    kind: String,
    parent: Option<BlockId>,
    children: Vec<BlockId>,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    selected: bool,
    properties: BTreeMap<String, PropertyValue>,
    enum_options: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Default)]
struct Scene {
    blocks: BTreeMap<BlockId, BlockRecord>,
    next_id: BlockId,
}

/// In-memory block engine
#[derive(Debug)]
pub struct MemoryEngine {
    scene: RwLock<Scene>,
}

impl MemoryEngine {
    /// Creates an empty engine
    pub fn new() -> Self {
        Self {
            scene: RwLock::new(Scene {
                blocks: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Creates an engine from block specs; the n-th spec gets id n (1-based)
    pub fn from_specs(specs: Vec<BlockSpec>) -> CoreResult<Self> {
        let engine = Self::new();
        for spec in specs {
            let id = engine.create_block(&spec.kind);
            if let Some(parent) = spec.parent {
                engine.append_child(parent, id)?;
            }
            engine.set_frame(id, spec.x, spec.y, spec.width, spec.height)?;
            engine.set_selected(id, spec.selected)?;
            for (name, value) in spec.properties {
                engine.define_property(id, &name, value)?;
            }
        }
        Ok(engine)
    }

    fn read(&self) -> CoreResult<RwLockReadGuard<'_, Scene>> {
        self.scene
            .read()
            .map_err(|_| CoreError::Internal("Engine scene lock poisoned".into()))
    }

    fn write(&self) -> CoreResult<RwLockWriteGuard<'_, Scene>> {
        self.scene
            .write()
            .map_err(|_| CoreError::Internal("Engine scene lock poisoned".into()))
    }

    fn with_block<T>(
        &self,
        block: BlockId,
        f: impl FnOnce(&BlockRecord) -> CoreResult<T>,
    ) -> CoreResult<T> {
        let scene = self.read()?;
        let record = scene
            .blocks
            .get(&block)
            .ok_or(CoreError::BlockNotFound(block))?;
        f(record)
    }

    fn with_block_mut<T>(
        &self,
        block: BlockId,
        f: impl FnOnce(&mut BlockRecord) -> CoreResult<T>,
    ) -> CoreResult<T> {
        let mut scene = self.write()?;
        let record = scene
            .blocks
            .get_mut(&block)
            .ok_or(CoreError::BlockNotFound(block))?;
        f(record)
    }

    /// Creates a detached block and returns its id
    pub fn create_block(&self, kind: &str) -> BlockId {
        let mut scene = match self.scene.write() {
            Ok(scene) => scene,
            Err(poisoned) => poisoned.into_inner(),
        };
        let id = scene.next_id;
        scene.next_id += 1;
        scene.blocks.insert(
            id,
            BlockRecord {
                kind: kind.to_string(),
                ..BlockRecord::default()
            },
        );
        id
    }

    /// Appends `child` to `parent`, detaching it from any previous parent
    pub fn append_child(&self, parent: BlockId, child: BlockId) -> CoreResult<()> {
        let mut scene = self.write()?;
        if !scene.blocks.contains_key(&parent) {
            return Err(CoreError::BlockNotFound(parent));
        }
        let previous = scene
            .blocks
            .get(&child)
            .ok_or(CoreError::BlockNotFound(child))?
            .parent;

        if let Some(previous) = previous {
            if let Some(record) = scene.blocks.get_mut(&previous) {
                record.children.retain(|c| *c != child);
            }
        }
        if let Some(record) = scene.blocks.get_mut(&parent) {
            record.children.push(child);
        }
        if let Some(record) = scene.blocks.get_mut(&child) {
            record.parent = Some(parent);
        }
        Ok(())
    }

    /// Sets position and frame size in one call
    pub fn set_frame(
        &self,
        block: BlockId,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> CoreResult<()> {
        self.with_block_mut(block, |record| {
            record.x = x;
            record.y = y;
            record.width = width;
            record.height = height;
            Ok(())
        })
    }

    pub fn set_selected(&self, block: BlockId, selected: bool) -> CoreResult<()> {
        self.with_block_mut(block, |record| {
            record.selected = selected;
            Ok(())
        })
    }

    /// Declares a property with its initial value; the value fixes the type
    pub fn define_property(
        &self,
        block: BlockId,
        property: &str,
        value: PropertyValue,
    ) -> CoreResult<()> {
        self.with_block_mut(block, |record| {
            record.properties.insert(property.to_string(), value);
            Ok(())
        })
    }

    /// Declares an enum property with its allowed options
    pub fn define_enum(
        &self,
        block: BlockId,
        property: &str,
        options: &[&str],
        value: &str,
    ) -> CoreResult<()> {
        self.with_block_mut(block, |record| {
            record.enum_options.insert(
                property.to_string(),
                options.iter().map(|o| o.to_string()).collect(),
            );
            record
                .properties
                .insert(property.to_string(), PropertyValue::Enum(value.to_string()));
            Ok(())
        })
    }

    fn get_typed(
        &self,
        block: BlockId,
        property: &str,
        expected: PropertyType,
    ) -> CoreResult<PropertyValue> {
        self.with_block(block, |record| {
            let value = record
                .properties
                .get(property)
                .ok_or_else(|| CoreError::PropertyNotFound {
                    block,
                    property: property.to_string(),
                })?;
            check_type(property, expected, value.property_type())?;
            Ok(value.clone())
        })
    }

    fn set_typed(&self, block: BlockId, property: &str, value: PropertyValue) -> CoreResult<()> {
        self.with_block_mut(block, |record| {
            let current = record
                .properties
                .get_mut(property)
                .ok_or_else(|| CoreError::PropertyNotFound {
                    block,
                    property: property.to_string(),
                })?;
            check_type(property, current.property_type(), value.property_type())?;
            *current = value;
            Ok(())
        })
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn check_type(property: &str, expected: PropertyType, actual: PropertyType) -> CoreResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(CoreError::PropertyTypeMismatch {
            property: property.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}

impl BlockEngine for MemoryEngine {
    fn is_valid(&self, block: BlockId) -> bool {
        self.read()
            .map(|scene| scene.blocks.contains_key(&block))
            .unwrap_or(false)
    }

    fn block_type(&self, block: BlockId) -> CoreResult<String> {
        self.with_block(block, |r| Ok(r.kind.clone()))
    }

    fn get_parent(&self, block: BlockId) -> CoreResult<Option<BlockId>> {
        self.with_block(block, |r| Ok(r.parent))
    }

    fn get_children(&self, block: BlockId) -> CoreResult<Vec<BlockId>> {
        self.with_block(block, |r| Ok(r.children.clone()))
    }

    fn find_all_selected(&self) -> CoreResult<Vec<BlockId>> {
        let scene = self.read()?;
        Ok(scene
            .blocks
            .iter()
            .filter(|(_, r)| r.selected)
            .map(|(id, _)| *id)
            .collect())
    }

    fn get_position_x(&self, block: BlockId) -> CoreResult<f32> {
        self.with_block(block, |r| Ok(r.x))
    }

    fn get_position_y(&self, block: BlockId) -> CoreResult<f32> {
        self.with_block(block, |r| Ok(r.y))
    }

    fn set_position_x(&self, block: BlockId, x: f32) -> CoreResult<()> {
        self.with_block_mut(block, |r| {
            r.x = x;
            Ok(())
        })
    }

    fn set_position_y(&self, block: BlockId, y: f32) -> CoreResult<()> {
        self.with_block_mut(block, |r| {
            r.y = y;
            Ok(())
        })
    }

    fn get_frame_width(&self, block: BlockId) -> CoreResult<f32> {
        self.with_block(block, |r| Ok(r.width))
    }

    fn get_frame_height(&self, block: BlockId) -> CoreResult<f32> {
        self.with_block(block, |r| Ok(r.height))
    }

    fn property_type(&self, block: BlockId, property: &str) -> CoreResult<PropertyType> {
        self.with_block(block, |r| {
            r.properties
                .get(property)
                .map(PropertyValue::property_type)
                .ok_or_else(|| CoreError::PropertyNotFound {
                    block,
                    property: property.to_string(),
                })
        })
    }

    fn find_all_properties(&self, block: BlockId) -> CoreResult<Vec<String>> {
        self.with_block(block, |r| Ok(r.properties.keys().cloned().collect()))
    }

    fn get_string(&self, block: BlockId, property: &str) -> CoreResult<String> {
        match self.get_typed(block, property, PropertyType::String)? {
            PropertyValue::String(s) => Ok(s),
            other => Err(unexpected(property, PropertyType::String, &other)),
        }
    }

    fn set_string(&self, block: BlockId, property: &str, value: &str) -> CoreResult<()> {
        self.set_typed(block, property, PropertyValue::String(value.to_string()))
    }

    fn get_float(&self, block: BlockId, property: &str) -> CoreResult<f32> {
        match self.get_typed(block, property, PropertyType::Float)? {
            PropertyValue::Float(v) => Ok(v),
            other => Err(unexpected(property, PropertyType::Float, &other)),
        }
    }

    fn set_float(&self, block: BlockId, property: &str, value: f32) -> CoreResult<()> {
        self.set_typed(block, property, PropertyValue::Float(value))
    }

    fn get_double(&self, block: BlockId, property: &str) -> CoreResult<f64> {
        match self.get_typed(block, property, PropertyType::Double)? {
            PropertyValue::Double(v) => Ok(v),
            other => Err(unexpected(property, PropertyType::Double, &other)),
        }
    }

    fn set_double(&self, block: BlockId, property: &str, value: f64) -> CoreResult<()> {
        self.set_typed(block, property, PropertyValue::Double(value))
    }

    fn get_color(&self, block: BlockId, property: &str) -> CoreResult<Color> {
        match self.get_typed(block, property, PropertyType::Color)? {
            PropertyValue::Color(c) => Ok(c),
            other => Err(unexpected(property, PropertyType::Color, &other)),
        }
    }

    fn set_color(&self, block: BlockId, property: &str, value: Color) -> CoreResult<()> {
        self.set_typed(block, property, PropertyValue::Color(value))
    }

    fn get_bool(&self, block: BlockId, property: &str) -> CoreResult<bool> {
        match self.get_typed(block, property, PropertyType::Bool)? {
            PropertyValue::Bool(v) => Ok(v),
            other => Err(unexpected(property, PropertyType::Bool, &other)),
        }
    }

    fn set_bool(&self, block: BlockId, property: &str, value: bool) -> CoreResult<()> {
        self.set_typed(block, property, PropertyValue::Bool(value))
    }

    fn get_enum(&self, block: BlockId, property: &str) -> CoreResult<String> {
        match self.get_typed(block, property, PropertyType::Enum)? {
            PropertyValue::Enum(s) => Ok(s),
            other => Err(unexpected(property, PropertyType::Enum, &other)),
        }
    }

    fn set_enum(&self, block: BlockId, property: &str, value: &str) -> CoreResult<()> {
        self.set_typed(block, property, PropertyValue::Enum(value.to_string()))
    }

    fn get_enum_values(&self, block: BlockId, property: &str) -> CoreResult<Vec<String>> {
        self.with_block(block, |r| {
            r.enum_options
                .get(property)
                .cloned()
                .ok_or_else(|| CoreError::PropertyNotFound {
                    block,
                    property: property.to_string(),
                })
        })
    }
}

fn unexpected(property: &str, expected: PropertyType, actual: &PropertyValue) -> CoreError {
    CoreError::PropertyTypeMismatch {
        property: property.to_string(),
        expected: expected.to_string(),
        actual: actual.property_type().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_blocks_assigns_sequential_ids() {
        let engine = MemoryEngine::new();
        assert_eq!(engine.create_block("page"), 1);
        assert_eq!(engine.create_block("graphic"), 2);
        assert!(engine.is_valid(2));
        assert!(!engine.is_valid(3));
    }

    #[test]
    fn test_append_child_reparents() {
        let engine = MemoryEngine::new();
        let page_a = engine.create_block("page");
        let page_b = engine.create_block("page");
        let child = engine.create_block("graphic");

        engine.append_child(page_a, child).unwrap();
        engine.append_child(page_b, child).unwrap();

        assert!(engine.get_children(page_a).unwrap().is_empty());
        assert_eq!(engine.get_children(page_b).unwrap(), vec![child]);
        assert_eq!(engine.get_parent(child).unwrap(), Some(page_b));
    }

    #[test]
    fn test_typed_getter_rejects_other_type() {
        let engine = MemoryEngine::new();
        let block = engine.create_block("text");
        engine
            .define_property(block, "text/text", PropertyValue::String("Hi".into()))
            .unwrap();

        assert!(matches!(
            engine.get_float(block, "text/text"),
            Err(CoreError::PropertyTypeMismatch { .. })
        ));
        assert!(matches!(
            engine.set_bool(block, "text/text", true),
            Err(CoreError::PropertyTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_block_and_property() {
        let engine = MemoryEngine::new();
        let block = engine.create_block("text");

        assert!(matches!(
            engine.get_position_x(99),
            Err(CoreError::BlockNotFound(99))
        ));
        assert!(matches!(
            engine.get_string(block, "nope"),
            Err(CoreError::PropertyNotFound { .. })
        ));
    }

    #[test]
    fn test_from_specs_builds_scene() {
        let specs: Vec<BlockSpec> = serde_json::from_value(serde_json::json!([
            { "kind": "page", "width": 800.0, "height": 600.0 },
            {
                "kind": "graphic", "parent": 1, "x": 10.0,
                "width": 50.0, "height": 40.0, "selected": true
            },
            { "kind": "text", "parent": 1, "properties": {
                "text/text": { "type": "string", "value": "Title" }
            } }
        ]))
        .unwrap();

        let engine = MemoryEngine::from_specs(specs).unwrap();

        assert_eq!(engine.get_children(1).unwrap(), vec![2, 3]);
        assert_eq!(engine.find_all_selected().unwrap(), vec![2]);
        assert_eq!(engine.get_frame_width(2).unwrap(), 50.0);
        assert_eq!(engine.get_string(3, "text/text").unwrap(), "Title");
    }
}
