#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Tillage.
//!
//! The [`World`] owns the cell grid, the player token, the plant table and
//! the random source that drives turn advancement. Systems read it through
//! the [`query`] module and mutate it through the narrow methods on
//! [`World`], each of which maps onto one reversible game action.

mod grid;
mod player;
mod plants;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tillage_core::{CellCoord, PlayerPosition, WELCOME_BANNER};
use tracing::trace;

pub use grid::{CellStore, CELL_RECORD_LEN};
pub use player::Player;
pub use plants::{Plant, PlantTable};

/// Grid width used when adapters do not request another one.
pub const DEFAULT_GRID_WIDTH: u32 = 6;

/// Errors raised while reading or mutating the world.
#[derive(Debug, Error)]
pub enum WorldError {
    /// The coordinate lies outside the grid extents.
    #[error("cell ({column}, {row}) is outside the {width}x{width} grid")]
    OutOfBounds {
        /// Column that was requested.
        column: u32,
        /// Row that was requested.
        row: u32,
        /// Width of the grid that rejected the request.
        width: u32,
    },
    /// A grid snapshot could not be decoded into this store.
    #[error("malformed grid snapshot: {0}")]
    MalformedSnapshot(#[source] SnapshotDefect),
    /// Reaping was requested for a cell without a plant.
    #[error("no plant grows at {cell}")]
    NoPlantAtCell {
        /// Cell that was expected to hold a plant.
        cell: CellCoord,
    },
    /// Sowing was requested for a cell that is already sown.
    #[error("cell {cell} is already sown")]
    CellAlreadySown {
        /// Cell that already holds a plant.
        cell: CellCoord,
    },
}

/// Structural defects detected while decoding a grid snapshot.
#[derive(Debug, Error)]
pub enum SnapshotDefect {
    /// The snapshot text is not valid base64.
    #[error("snapshot is not valid base64: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The decoded buffer does not match the size of the store.
    #[error("expected {expected} bytes but decoded {actual}")]
    LengthMismatch {
        /// Byte length required by the store's width.
        expected: usize,
        /// Byte length that was decoded.
        actual: usize,
    },
    /// A record's coordinates disagree with the slot it occupies.
    #[error("record {index} does not describe the cell stored in its slot")]
    MisplacedRecord {
        /// Linear index of the offending record.
        index: usize,
    },
    /// A record carries a sun, water or sown value outside its range.
    #[error("record {index} holds a value outside the permitted range")]
    ValueOutOfRange {
        /// Linear index of the offending record.
        index: usize,
    },
}

/// Copy of the turn-sensitive parts of the world.
///
/// Turn advancement touches the grid and every plant, so both are captured
/// together. The player is unaffected by turns and is not included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldSnapshot {
    grid: CellStore,
    plants: PlantTable,
}

/// Represents the authoritative Tillage world state.
#[derive(Clone, Debug)]
pub struct World {
    banner: &'static str,
    grid: CellStore,
    player: Player,
    plants: PlantTable,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a world of the provided width seeded from operating-system entropy.
    #[must_use]
    pub fn new(width: u32) -> Self {
        Self::from_rng(width, ChaCha8Rng::from_entropy())
    }

    /// Creates a world whose every random draw derives from `seed`.
    #[must_use]
    pub fn with_seed(width: u32, seed: u64) -> Self {
        Self::from_rng(width, ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_rng(width: u32, mut rng: ChaCha8Rng) -> Self {
        let grid = CellStore::seeded(width, &mut rng);
        let extent = i32::try_from(width).unwrap_or(i32::MAX);
        Self {
            banner: WELCOME_BANNER,
            grid,
            player: Player::new(PlayerPosition::default(), extent, extent),
            plants: PlantTable::new(),
            rng,
        }
    }

    /// Displaces the player without consulting the bounds.
    pub fn move_player(&mut self, dx: i32, dy: i32) {
        self.player.move_by(dx, dy);
    }

    /// Passes one turn: re-randomizes the grid, then tends every plant.
    pub fn advance_turn(&mut self) {
        self.grid.randomize_turn(&mut self.rng);
        self.plants.tend(&self.grid);
        trace!(plants = self.plants.len(), "turn advanced");
    }

    /// Flips the sown flag of the cell.
    pub fn toggle_sown(&mut self, cell: CellCoord) -> Result<(), WorldError> {
        self.grid.sow_cell(cell)
    }

    /// Stores the plant at its position, returning any plant it displaced.
    pub fn place_plant(&mut self, plant: Plant) -> Option<Plant> {
        self.plants.insert(plant)
    }

    /// Removes the plant occupying the cell.
    pub fn uproot(&mut self, cell: CellCoord) -> Option<Plant> {
        self.plants.remove(cell)
    }

    /// Captures the grid and plant table.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            grid: self.grid.clone(),
            plants: self.plants.clone(),
        }
    }

    /// Reinstates a previously captured grid and plant table.
    pub fn restore(&mut self, snapshot: &WorldSnapshot) {
        self.grid.clone_from(&snapshot.grid);
        self.plants.clone_from(&snapshot.plants);
    }

    /// Replaces player position, grid and plants in one step.
    ///
    /// The position is taken verbatim; callers are responsible for providing
    /// a grid whose width matches the one the position was recorded against.
    pub fn replace(&mut self, position: PlayerPosition, grid: CellStore, plants: PlantTable) {
        let extent = i32::try_from(grid.width()).unwrap_or(i32::MAX);
        self.player = Player::new(position, extent, extent);
        self.grid = grid;
        self.plants = plants;
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tillage_core::{Cell, CellCoord, PlayerPosition};

    use super::{CellStore, Plant, PlantTable, Player, World, WorldError};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Number of cells along each edge of the grid.
    #[must_use]
    pub fn width(world: &World) -> u32 {
        world.grid.width()
    }

    /// Provides read-only access to the cell grid.
    #[must_use]
    pub fn grid(world: &World) -> &CellStore {
        &world.grid
    }

    /// Returns a copy of the cell at the provided coordinate.
    pub fn cell(world: &World, cell: CellCoord) -> Result<Cell, WorldError> {
        world.grid.read_cell(cell)
    }

    /// Provides read-only access to the player token.
    #[must_use]
    pub fn player(world: &World) -> &Player {
        &world.player
    }

    /// Current position of the player token.
    #[must_use]
    pub fn player_position(world: &World) -> PlayerPosition {
        world.player.position()
    }

    /// Provides read-only access to the plant table.
    #[must_use]
    pub fn plants(world: &World) -> &PlantTable {
        &world.plants
    }

    /// Plant occupying the cell, if any.
    #[must_use]
    pub fn plant_at(world: &World, cell: CellCoord) -> Option<&Plant> {
        world.plants.get(cell)
    }
}
