//! Command System
//!
//! String-keyed, asynchronously executed commands registered by plugins
//! against one editor instance.

mod registry;
mod traits;

pub use registry::*;
pub use traits::*;
