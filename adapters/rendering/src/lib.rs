#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Tillage adapters.
//!
//! Backends never look at the world directly. Adapters capture a [`Scene`]
//! after every state change and hand it to a [`RenderingBackend`], which
//! redraws the whole grid from it.

use std::fmt::Write as _;

use anyhow::Result as AnyResult;
use tillage_core::{CellCoord, CropKind};
use tillage_world::{query, World};

/// Glyph drawn for a cell that holds no plant.
pub const EMPTY_GLYPH: &str = "..";
/// Marker drawn in front of the cell occupied by the player.
pub const PLAYER_MARKER: char = '@';

/// Plant as it should appear on screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlantPresentation {
    /// Crop the plant was sown from.
    pub kind: CropKind,
    /// Growth stage reached so far.
    pub growth_stage: u32,
}

impl PlantPresentation {
    /// Two-character glyph: the crop's initial followed by its growth stage.
    ///
    /// Stages beyond nine are shown as `+`.
    #[must_use]
    pub fn glyph(&self) -> String {
        let initial = self.kind.as_str().chars().next().unwrap_or('?');
        let stage = char::from_digit(self.growth_stage, 10).unwrap_or('+');
        format!("{initial}{stage}")
    }
}

/// Presentation of a single grid cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellPresentation {
    /// Coordinate of the cell.
    pub coord: CellCoord,
    /// Sun level of the cell.
    pub sun: u8,
    /// Water level of the cell.
    pub water: u8,
    /// Whether the cell is sown.
    pub sown: bool,
    /// Plant growing in the cell, if any.
    pub plant: Option<PlantPresentation>,
}

/// Everything a backend needs to redraw the game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scene {
    /// Number of cells along each edge of the grid.
    pub width: u32,
    /// Cells in row-major order.
    pub cells: Vec<CellPresentation>,
    /// Cell occupied by the player, when the player stands on the grid.
    pub player: Option<CellCoord>,
    /// Free-form line shown beneath the grid.
    pub status: String,
}

impl Scene {
    /// Captures the current state of `world`.
    #[must_use]
    pub fn capture(world: &World) -> Self {
        let cells = query::grid(world)
            .cells()
            .iter()
            .map(|cell| {
                let coord = cell.coord();
                CellPresentation {
                    coord,
                    sun: cell.sun,
                    water: cell.water,
                    sown: cell.sown,
                    plant: query::plant_at(world, coord).map(|plant| PlantPresentation {
                        kind: plant.kind().clone(),
                        growth_stage: plant.growth_stage(),
                    }),
                }
            })
            .collect();

        Self {
            width: query::width(world),
            cells,
            player: query::player_position(world).cell(),
            status: String::new(),
        }
    }

    /// Replaces the status line.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Cell under the player, if any.
    #[must_use]
    pub fn player_cell(&self) -> Option<&CellPresentation> {
        let player = self.player?;
        self.cells.iter().find(|cell| cell.coord == player)
    }
}

/// Rendering backend capable of presenting Tillage scenes.
pub trait RenderingBackend {
    /// Redraws the full scene, replacing whatever was shown before.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

/// Draws a scene as plain text, one grid row per line.
///
/// Each cell occupies three columns: the player marker or a space, then the
/// plant glyph or [`EMPTY_GLYPH`]. A summary of the player's cell and the
/// status line follow the grid.
#[must_use]
pub fn rasterize(scene: &Scene) -> String {
    let mut text = String::new();
    let width = usize::try_from(scene.width).unwrap_or(usize::MAX).max(1);

    for row in scene.cells.chunks(width) {
        for cell in row {
            let marker = if scene.player == Some(cell.coord) {
                PLAYER_MARKER
            } else {
                ' '
            };
            text.push(marker);
            match &cell.plant {
                Some(plant) => text.push_str(&plant.glyph()),
                None => text.push_str(EMPTY_GLYPH),
            }
        }
        text.push('\n');
    }

    if let Some(cell) = scene.player_cell() {
        let _ = writeln!(
            text,
            "player at {}: sun {} water {}{}",
            cell.coord,
            cell.sun,
            cell.water,
            if cell.sown { " (sown)" } else { "" }
        );
    }
    if !scene.status.is_empty() {
        text.push_str(&scene.status);
        text.push('\n');
    }
    text
}
