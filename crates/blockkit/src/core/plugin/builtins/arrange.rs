//! Arrange Plugin
//!
//! Lays out sibling blocks horizontally, vertically or in a grid using only
//! the engine's geometry accessors.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::parse_params;
use crate::core::{
    commands::{CommandContext, CommandDescription, CommandHandler},
    engine::BlockEngine,
    plugin::{EditorContext, Plugin},
    settings::ArrangeSettings,
    BlockId, CoreError, CoreResult,
};

pub const ARRANGE_HORIZONTAL: &str = "blockkit.arrange.horizontal";
pub const ARRANGE_VERTICAL: &str = "blockkit.arrange.vertical";
pub const ARRANGE_GRID: &str = "blockkit.arrange.grid";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Horizontal,
    Vertical,
    Grid,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArrangeParams {
    /// Blocks to arrange; defaults to the current selection
    #[serde(default)]
    blocks: Option<Vec<BlockId>>,
    #[serde(default)]
    spacing: Option<f32>,
    /// Grid columns; 0 or absent picks a square-ish grid
    #[serde(default)]
    columns: Option<u32>,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    id: BlockId,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

struct ArrangeCommand {
    layout: Layout,
    settings: ArrangeSettings,
}

#[async_trait]
impl CommandHandler for ArrangeCommand {
    async fn call(
        &self,
        ctx: &CommandContext,
        params: serde_json::Value,
    ) -> CoreResult<serde_json::Value> {
        let params: ArrangeParams = parse_params(params)?;
        let engine = ctx.engine();

        let spacing = params.spacing.unwrap_or(self.settings.spacing);
        if !spacing.is_finite() || spacing < 0.0 {
            return Err(CoreError::InvalidCommandParams(format!(
                "spacing must be a non-negative number, got {}",
                spacing
            )));
        }

        let blocks = match params.blocks {
            Some(blocks) => blocks,
            None => engine.find_all_selected()?,
        };
        let frames = collect_frames(engine, &blocks)?;

        let arranged = match self.layout {
            Layout::Horizontal => arrange_line(engine, frames, spacing, true)?,
            Layout::Vertical => arrange_line(engine, frames, spacing, false)?,
            Layout::Grid => {
                let columns = params.columns.unwrap_or(self.settings.grid_columns);
                arrange_grid(engine, frames, spacing, columns)?
            }
        };

        tracing::debug!("Arranged {} blocks ({:?})", arranged.len(), self.layout);
        Ok(json!({ "arranged": arranged }))
    }
}

/// Reads geometry for `blocks`, which must all share one parent
fn collect_frames(engine: &dyn BlockEngine, blocks: &[BlockId]) -> CoreResult<Vec<Frame>> {
    let mut frames = Vec::with_capacity(blocks.len());
    let mut parent = None;

    for (index, &id) in blocks.iter().enumerate() {
        if !engine.is_valid(id) {
            return Err(CoreError::BlockNotFound(id));
        }
        let block_parent = engine.get_parent(id)?;
        if index == 0 {
            parent = block_parent;
        } else if block_parent != parent {
            return Err(CoreError::ValidationError(
                "arranged blocks must share the same parent".to_string(),
            ));
        }

        frames.push(Frame {
            id,
            x: engine.get_position_x(id)?,
            y: engine.get_position_y(id)?,
            width: engine.get_frame_width(id)?,
            height: engine.get_frame_height(id)?,
        });
    }
    Ok(frames)
}

/// Places frames edge to edge along one axis, starting at the leading frame
fn arrange_line(
    engine: &dyn BlockEngine,
    mut frames: Vec<Frame>,
    spacing: f32,
    horizontal: bool,
) -> CoreResult<Vec<BlockId>> {
    if horizontal {
        frames.sort_by(|a, b| a.x.total_cmp(&b.x));
    } else {
        frames.sort_by(|a, b| a.y.total_cmp(&b.y));
    }

    let Some(first) = frames.first() else {
        return Ok(Vec::new());
    };
    let mut cursor = if horizontal { first.x } else { first.y };

    for frame in &frames {
        if horizontal {
            engine.set_position_x(frame.id, cursor)?;
            cursor += frame.width + spacing;
        } else {
            engine.set_position_y(frame.id, cursor)?;
            cursor += frame.height + spacing;
        }
    }
    Ok(frames.iter().map(|f| f.id).collect())
}

/// Places frames row by row in uniform cells sized to the largest frame
fn arrange_grid(
    engine: &dyn BlockEngine,
    mut frames: Vec<Frame>,
    spacing: f32,
    columns: u32,
) -> CoreResult<Vec<BlockId>> {
    if frames.is_empty() {
        return Ok(Vec::new());
    }
    frames.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));

    let columns = if columns == 0 {
        (frames.len() as f64).sqrt().ceil() as usize
    } else {
        columns as usize
    };

    let origin_x = frames.iter().map(|f| f.x).fold(f32::INFINITY, f32::min);
    let origin_y = frames.iter().map(|f| f.y).fold(f32::INFINITY, f32::min);
    let cell_width = frames.iter().map(|f| f.width).fold(0.0, f32::max);
    let cell_height = frames.iter().map(|f| f.height).fold(0.0, f32::max);

    for (index, frame) in frames.iter().enumerate() {
        let column = (index % columns) as f32;
        let row = (index / columns) as f32;
        engine.set_position_x(frame.id, origin_x + column * (cell_width + spacing))?;
        engine.set_position_y(frame.id, origin_y + row * (cell_height + spacing))?;
    }
    Ok(frames.iter().map(|f| f.id).collect())
}

/// Registers the arrange commands and their translations
#[derive(Debug, Clone, Default)]
pub struct ArrangePlugin {
    settings: ArrangeSettings,
}

impl ArrangePlugin {
    pub fn new(settings: ArrangeSettings) -> Self {
        Self { settings }
    }
}

impl Plugin for ArrangePlugin {
    fn id(&self) -> &str {
        "blockkit.arrange"
    }

    fn initialize(&self, ctx: &mut EditorContext) -> CoreResult<()> {
        let args = json!({ "blocks": "number[]?", "spacing": "number?" });
        let returns = json!({ "arranged": "number[]" });

        for (label, layout) in [
            (ARRANGE_HORIZONTAL, Layout::Horizontal),
            (ARRANGE_VERTICAL, Layout::Vertical),
            (ARRANGE_GRID, Layout::Grid),
        ] {
            let mut args = args.clone();
            if layout == Layout::Grid {
                args["columns"] = json!("number?");
            }
            let description = CommandDescription::new()
                .with_group("arrange")
                .with_args(args)
                .with_returns(returns.clone());

            ctx.commands_mut().register_command(
                label,
                Arc::new(ArrangeCommand {
                    layout,
                    settings: self.settings.clone(),
                }),
                Some(description),
            )?;
        }

        ctx.i18n_mut().set_translations(json!({
            "en": {
                "commands": {
                    (ARRANGE_HORIZONTAL): "Arrange horizontally",
                    (ARRANGE_VERTICAL): "Arrange vertically",
                    (ARRANGE_GRID): "Arrange in grid"
                },
                "panel": { "arrange": { "title": "Arrange" } }
            },
            "de": {
                "commands": {
                    (ARRANGE_HORIZONTAL): "Horizontal anordnen",
                    (ARRANGE_VERTICAL): "Vertikal anordnen",
                    (ARRANGE_GRID): "Im Raster anordnen"
                },
                "panel": { "arrange": { "title": "Anordnen" } }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::MemoryEngine;

    fn scene(frames: &[(f32, f32, f32, f32)]) -> (Arc<MemoryEngine>, Vec<BlockId>) {
        let engine = Arc::new(MemoryEngine::new());
        let page = engine.create_block("page");
        let mut ids = Vec::new();
        for &(x, y, w, h) in frames {
            let id = engine.create_block("graphic");
            engine.append_child(page, id).unwrap();
            engine.set_frame(id, x, y, w, h).unwrap();
            engine.set_selected(id, true).unwrap();
            ids.push(id);
        }
        (engine, ids)
    }

    fn context(engine: &Arc<MemoryEngine>, settings: ArrangeSettings) -> EditorContext {
        let mut ctx = EditorContext::new(engine.clone());
        ctx.add_plugin(&ArrangePlugin::new(settings)).unwrap();
        ctx
    }

    #[tokio::test]
    async fn test_arrange_horizontal_uses_selection() {
        let (engine, ids) = scene(&[
            (40.0, 0.0, 30.0, 10.0),
            (5.0, 3.0, 10.0, 10.0),
            (20.0, 7.0, 20.0, 10.0),
        ]);
        let ctx = context(&engine, ArrangeSettings::default());

        let result = ctx
            .execute(ARRANGE_HORIZONTAL, json!({ "spacing": 2.0 }))
            .await
            .unwrap();

        assert_eq!(result, json!({ "arranged": [ids[1], ids[2], ids[0]] }));
        assert_eq!(engine.get_position_x(ids[1]).unwrap(), 5.0);
        assert_eq!(engine.get_position_x(ids[2]).unwrap(), 17.0);
        assert_eq!(engine.get_position_x(ids[0]).unwrap(), 39.0);
        // The other axis is untouched.
        assert_eq!(engine.get_position_y(ids[2]).unwrap(), 7.0);
    }

    #[tokio::test]
    async fn test_arrange_vertical_uses_default_spacing() {
        let (engine, ids) = scene(&[(0.0, 0.0, 10.0, 20.0), (0.0, 50.0, 10.0, 5.0)]);
        let settings = ArrangeSettings {
            spacing: 4.0,
            ..ArrangeSettings::default()
        };
        let ctx = context(&engine, settings);

        ctx.execute(ARRANGE_VERTICAL, serde_json::Value::Null)
            .await
            .unwrap();

        assert_eq!(engine.get_position_y(ids[0]).unwrap(), 0.0);
        assert_eq!(engine.get_position_y(ids[1]).unwrap(), 24.0);
    }

    #[tokio::test]
    async fn test_arrange_grid_auto_columns() {
        let (engine, ids) = scene(&[
            (10.0, 10.0, 20.0, 10.0),
            (60.0, 10.0, 10.0, 15.0),
            (10.0, 90.0, 10.0, 10.0),
            (70.0, 90.0, 10.0, 10.0),
        ]);
        let ctx = context(&engine, ArrangeSettings::default());

        ctx.execute(ARRANGE_GRID, json!({ "spacing": 5.0 }))
            .await
            .unwrap();

        // 2 columns, cells of 20 x 15 starting at (10, 10).
        let positions: Vec<(f32, f32)> = ids
            .iter()
            .map(|&id| {
                (
                    engine.get_position_x(id).unwrap(),
                    engine.get_position_y(id).unwrap(),
                )
            })
            .collect();
        assert_eq!(
            positions,
            vec![(10.0, 10.0), (35.0, 10.0), (10.0, 30.0), (35.0, 30.0)]
        );
    }

    #[tokio::test]
    async fn test_arrange_explicit_blocks_and_columns() {
        let (engine, ids) = scene(&[
            (0.0, 0.0, 10.0, 10.0),
            (30.0, 0.0, 10.0, 10.0),
            (60.0, 0.0, 10.0, 10.0),
        ]);
        let ctx = context(&engine, ArrangeSettings::default());

        ctx.execute(
            ARRANGE_GRID,
            json!({ "blocks": [ids[0], ids[1], ids[2]], "spacing": 0.0, "columns": 1 }),
        )
        .await
        .unwrap();

        assert_eq!(engine.get_position_y(ids[2]).unwrap(), 20.0);
        assert_eq!(engine.get_position_x(ids[2]).unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_arrange_rejects_mixed_parents() {
        let (engine, ids) = scene(&[(0.0, 0.0, 10.0, 10.0)]);
        let other_page = engine.create_block("page");
        let stray = engine.create_block("graphic");
        engine.append_child(other_page, stray).unwrap();
        let ctx = context(&engine, ArrangeSettings::default());

        let result = ctx
            .execute(ARRANGE_HORIZONTAL, json!({ "blocks": [ids[0], stray] }))
            .await;

        assert!(matches!(result, Err(CoreError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_arrange_rejects_negative_spacing() {
        let (engine, _) = scene(&[(0.0, 0.0, 10.0, 10.0)]);
        let ctx = context(&engine, ArrangeSettings::default());

        let result = ctx
            .execute(ARRANGE_HORIZONTAL, json!({ "spacing": -1.0 }))
            .await;

        assert!(matches!(result, Err(CoreError::InvalidCommandParams(_))));
    }

    #[tokio::test]
    async fn test_arrange_empty_selection_is_noop() {
        let engine = Arc::new(MemoryEngine::new());
        let ctx = context(&engine, ArrangeSettings::default());

        let result = ctx.execute(ARRANGE_GRID, json!({})).await.unwrap();
        assert_eq!(result, json!({ "arranged": [] }));
    }

    #[test]
    fn test_arrange_registers_translations() {
        let engine = Arc::new(MemoryEngine::new());
        let mut ctx = context(&engine, ArrangeSettings::default());

        assert_eq!(ctx.command_title(ARRANGE_GRID), "Arrange in grid");
        ctx.i18n_mut().set_locale("de");
        assert_eq!(ctx.command_title(ARRANGE_GRID), "Im Raster anordnen");
        assert!(ctx.untranslated_commands("de").is_empty());
        assert_eq!(
            ctx.commands().describe_command(ARRANGE_GRID).and_then(|d| d.group.as_deref()),
            Some("arrange")
        );
    }
}
