#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reversible player actions and the undo/redo history that replays them.
//!
//! Every mutation a player can trigger is expressed as an [`Action`] that
//! carries whatever state it needs to invert itself. The [`History`] keeps
//! two stacks of actions and enforces the usual discipline: recording a fresh
//! action discards the redo stack, undo moves the newest action onto the redo
//! stack, and redo moves it back.

use tillage_core::{CellCoord, Crop};
use tillage_world::{query, Plant, World, WorldError, WorldSnapshot};
use tracing::debug;

/// A reversible unit of game action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Moves the player token by a fixed displacement.
    Move(MovePlayer),
    /// Passes one turn.
    AdvanceTurn(AdvanceTurn),
    /// Sows a fresh plant into an empty cell.
    Sow(Sow),
    /// Reaps the plant occupying a cell.
    Reap(Reap),
}

impl Action {
    /// Builds a move, or `None` when the displacement would leave the grid.
    #[must_use]
    pub fn movement(world: &World, dx: i32, dy: i32) -> Option<Self> {
        if query::player(world).bounds_check(dx, dy) {
            Some(Self::Move(MovePlayer { dx, dy }))
        } else {
            None
        }
    }

    /// Builds a turn advance that remembers the world as it is now.
    #[must_use]
    pub fn advance_turn(world: &World) -> Self {
        Self::AdvanceTurn(AdvanceTurn {
            before: world.snapshot(),
            after: None,
        })
    }

    /// Builds a sow of `crop` into `cell`.
    ///
    /// Fails when the cell lies outside the grid or is already sown.
    pub fn sow(world: &World, cell: CellCoord, crop: &Crop) -> Result<Self, WorldError> {
        ensure_vacant(world, cell)?;
        Ok(Self::Sow(Sow {
            plant: Plant::sow(crop, cell),
        }))
    }

    /// Builds a reap of the plant at `cell`, capturing it exactly as it is now.
    ///
    /// Fails when the cell lies outside the grid or holds no plant.
    pub fn reap(world: &World, cell: CellCoord) -> Result<Self, WorldError> {
        let _ = query::cell(world, cell)?;
        let plant = query::plant_at(world, cell)
            .cloned()
            .ok_or(WorldError::NoPlantAtCell { cell })?;
        Ok(Self::Reap(Reap { plant }))
    }

    /// Applies the action's forward effect.
    ///
    /// Executing again after [`Action::undo`] reproduces the same forward state.
    pub fn execute(&mut self, world: &mut World) -> Result<(), WorldError> {
        match self {
            Self::Move(action) => {
                let (dx, dy) = action.delta();
                world.move_player(dx, dy);
                Ok(())
            }
            Self::AdvanceTurn(action) => {
                action.execute(world);
                Ok(())
            }
            Self::Sow(action) => {
                let cell = action.plant.position();
                ensure_vacant(world, cell)?;
                world.toggle_sown(cell)?;
                let displaced = world.place_plant(action.plant.clone());
                debug_assert!(displaced.is_none(), "vacant cell held a plant");
                Ok(())
            }
            Self::Reap(action) => {
                world.toggle_sown(action.plant.position())?;
                let _ = world.uproot(action.plant.position());
                Ok(())
            }
        }
    }

    /// Reverts the action's forward effect.
    pub fn undo(&mut self, world: &mut World) -> Result<(), WorldError> {
        match self {
            Self::Move(action) => {
                let (dx, dy) = action.inverse();
                world.move_player(dx, dy);
                Ok(())
            }
            Self::AdvanceTurn(action) => {
                world.restore(&action.before);
                Ok(())
            }
            Self::Sow(action) => {
                world.toggle_sown(action.plant.position())?;
                let _ = world.uproot(action.plant.position());
                Ok(())
            }
            Self::Reap(action) => {
                world.toggle_sown(action.plant.position())?;
                let _ = world.place_plant(action.plant.clone());
                Ok(())
            }
        }
    }

    /// Short name used in diagnostics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Move(_) => "move",
            Self::AdvanceTurn(_) => "advance_turn",
            Self::Sow(_) => "sow",
            Self::Reap(_) => "reap",
        }
    }
}

// Sowing never displaces a plant, even one left on an unsown cell.
fn ensure_vacant(world: &World, cell: CellCoord) -> Result<(), WorldError> {
    if query::cell(world, cell)?.sown || query::plant_at(world, cell).is_some() {
        return Err(WorldError::CellAlreadySown { cell });
    }
    Ok(())
}

/// Player displacement captured by a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MovePlayer {
    dx: i32,
    dy: i32,
}

impl MovePlayer {
    /// Displacement applied on execute.
    #[must_use]
    pub const fn delta(&self) -> (i32, i32) {
        (self.dx, self.dy)
    }

    /// Displacement applied on undo.
    #[must_use]
    pub const fn inverse(&self) -> (i32, i32) {
        (-self.dx, -self.dy)
    }
}

/// Turn advance with the world state on either side of it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdvanceTurn {
    before: WorldSnapshot,
    after: Option<WorldSnapshot>,
}

impl AdvanceTurn {
    /// State captured when the action was built.
    #[must_use]
    pub fn before(&self) -> &WorldSnapshot {
        &self.before
    }

    /// State produced by the first execution, once it has happened.
    #[must_use]
    pub fn after(&self) -> Option<&WorldSnapshot> {
        self.after.as_ref()
    }

    fn execute(&mut self, world: &mut World) {
        match &self.after {
            Some(after) => world.restore(after),
            None => {
                world.advance_turn();
                self.after = Some(world.snapshot());
            }
        }
    }
}

/// Plant placed by a sow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sow {
    plant: Plant,
}

/// Plant removed by a reap, as it was when the reap was built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reap {
    plant: Plant,
}

/// Undo and redo stacks of executed actions.
#[derive(Clone, Debug, Default)]
pub struct History {
    undo: Vec<Action>,
    redo: Vec<Action>,
}

impl History {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes a fresh action and records it.
    ///
    /// A successful fresh action discards every redoable action. A failed one
    /// leaves both stacks as they were.
    pub fn record(&mut self, mut action: Action, world: &mut World) -> Result<(), WorldError> {
        action.execute(world)?;
        self.redo.clear();
        debug!(action = action.label(), "action executed");
        self.undo.push(action);
        Ok(())
    }

    /// Undoes the newest action. Returns `false` when there was nothing to undo.
    pub fn undo(&mut self, world: &mut World) -> Result<bool, WorldError> {
        let Some(mut action) = self.undo.pop() else {
            return Ok(false);
        };
        if let Err(error) = action.undo(world) {
            self.undo.push(action);
            return Err(error);
        }
        debug!(action = action.label(), "action undone");
        self.redo.push(action);
        Ok(true)
    }

    /// Re-executes the newest undone action. Returns `false` when there was nothing to redo.
    pub fn redo(&mut self, world: &mut World) -> Result<bool, WorldError> {
        let Some(mut action) = self.redo.pop() else {
            return Ok(false);
        };
        if let Err(error) = action.execute(world) {
            self.redo.push(action);
            return Err(error);
        }
        debug!(action = action.label(), "action redone");
        self.undo.push(action);
        Ok(true)
    }

    /// Drops every recorded action.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Number of actions that can be undone.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Number of actions that can be redone.
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }
}
