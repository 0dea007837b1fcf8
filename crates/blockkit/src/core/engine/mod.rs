//! Host Engine Interface
//!
//! The creative engine is owned by the host. Plugins only see it through
//! the accessors of [`BlockEngine`]: block geometry, hierarchy, selection and
//! typed property getters/setters keyed by property path.

mod memory;
mod property;

pub use memory::{BlockSpec, MemoryEngine};
pub use property::{read_property, write_property, Color, PropertyType, PropertyValue};

use crate::core::{BlockId, CoreResult};

/// Accessors a host editor exposes to plugins.
///
/// All methods take `&self`; the host owns synchronization.
pub trait BlockEngine: Send + Sync {
    // ========================================================================
    // Hierarchy & Selection
    // ========================================================================

    /// Returns true if the block handle is alive
    fn is_valid(&self, block: BlockId) -> bool;

    /// Returns the block kind (e.g. "graphic", "text", "page")
    fn block_type(&self, block: BlockId) -> CoreResult<String>;

    /// Returns the parent block, if any
    fn get_parent(&self, block: BlockId) -> CoreResult<Option<BlockId>>;

    /// Returns the children of a block in paint order
    fn get_children(&self, block: BlockId) -> CoreResult<Vec<BlockId>>;

    /// Returns all currently selected blocks
    fn find_all_selected(&self) -> CoreResult<Vec<BlockId>>;

    // ========================================================================
    // Geometry
    // ========================================================================

    fn get_position_x(&self, block: BlockId) -> CoreResult<f32>;
    fn get_position_y(&self, block: BlockId) -> CoreResult<f32>;
    fn set_position_x(&self, block: BlockId, x: f32) -> CoreResult<()>;
    fn set_position_y(&self, block: BlockId, y: f32) -> CoreResult<()>;
    fn get_frame_width(&self, block: BlockId) -> CoreResult<f32>;
    fn get_frame_height(&self, block: BlockId) -> CoreResult<f32>;

    // ========================================================================
    // Typed Properties
    // ========================================================================

    /// Returns the declared type of a property
    fn property_type(&self, block: BlockId, property: &str) -> CoreResult<PropertyType>;

    /// Lists all property paths of a block
    fn find_all_properties(&self, block: BlockId) -> CoreResult<Vec<String>>;

    fn get_string(&self, block: BlockId, property: &str) -> CoreResult<String>;
    fn set_string(&self, block: BlockId, property: &str, value: &str) -> CoreResult<()>;
    fn get_float(&self, block: BlockId, property: &str) -> CoreResult<f32>;
    fn set_float(&self, block: BlockId, property: &str, value: f32) -> CoreResult<()>;
    fn get_double(&self, block: BlockId, property: &str) -> CoreResult<f64>;
    fn set_double(&self, block: BlockId, property: &str, value: f64) -> CoreResult<()>;
    fn get_color(&self, block: BlockId, property: &str) -> CoreResult<Color>;
    fn set_color(&self, block: BlockId, property: &str, value: Color) -> CoreResult<()>;
    fn get_bool(&self, block: BlockId, property: &str) -> CoreResult<bool>;
    fn set_bool(&self, block: BlockId, property: &str, value: bool) -> CoreResult<()>;
    fn get_enum(&self, block: BlockId, property: &str) -> CoreResult<String>;
    fn set_enum(&self, block: BlockId, property: &str, value: &str) -> CoreResult<()>;

    /// Allowed values of an enum property
    fn get_enum_values(&self, block: BlockId, property: &str) -> CoreResult<Vec<String>>;
}
