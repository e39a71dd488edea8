#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Save codec that snapshots the world into a portable JSON document.
//!
//! A [`SaveFile`] is an immutable point-in-time copy of the player position,
//! the base64 grid snapshot and the plant table. It is written to and read
//! from a [`SaveStore`], the string-keyed persistence boundary provided by the
//! host.

mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tillage_core::{CellCoord, PlayerPosition};
use tillage_world::{query, CellStore, Plant, PlantTable, World, WorldError};
use tracing::{debug, warn};

pub use store::{MemoryStore, SaveStore, StoreError};

/// Errors that can occur while saving or restoring the world.
#[derive(Debug, Error)]
pub enum SaveError {
    /// No save exists under the requested key.
    #[error("no save file found under '{key}'")]
    SaveKeyAbsent {
        /// Key that was looked up.
        key: String,
    },
    /// The stored text is not a well-formed save document.
    #[error("could not parse save document: {0}")]
    InvalidDocument(#[source] serde_json::Error),
    /// The save could not be rendered as JSON.
    #[error("could not encode save document: {0}")]
    Encode(#[source] serde_json::Error),
    /// A plant entry's key is unreadable, disagrees with its plant, or
    /// points at a cell the grid does not mark as sown.
    #[error("plant entry '{key}' is malformed")]
    MalformedPlantEntry {
        /// Key of the offending entry.
        key: String,
    },
    /// The grid marks a cell as sown but no plant entry occupies it.
    #[error("cell {cell} is sown but has no plant entry")]
    UnplantedSownCell {
        /// Sown cell without a plant.
        cell: CellCoord,
    },
    /// The grid snapshot was rejected by the world.
    #[error(transparent)]
    World(#[from] WorldError),
    /// The persistence store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Snapshot of everything needed to restore a game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveFile {
    /// Player position at capture time.
    pub player_pos: PlayerPosition,
    /// Base64 snapshot of the packed cell buffer.
    pub grid_state: String,
    /// Plant table exported as `(key, plant)` pairs in coordinate order.
    pub plant_map: Vec<(String, Plant)>,
    /// Moment the save was captured.
    pub timestamp: DateTime<Utc>,
}

impl SaveFile {
    /// Copies the world's current state without touching it.
    #[must_use]
    pub fn capture(world: &World, timestamp: DateTime<Utc>) -> Self {
        let plant_map = query::plants(world)
            .iter()
            .map(|plant| (plant.position().to_string(), plant.clone()))
            .collect();
        Self {
            player_pos: query::player_position(world),
            grid_state: query::grid(world).serialize(),
            plant_map,
            timestamp,
        }
    }

    /// Renders the save as a single JSON document.
    pub fn encode(&self) -> Result<String, SaveError> {
        serde_json::to_string(self).map_err(SaveError::Encode)
    }

    /// Parses a JSON document produced by [`SaveFile::encode`].
    pub fn decode(value: &str) -> Result<Self, SaveError> {
        serde_json::from_str(value).map_err(SaveError::InvalidDocument)
    }

    /// Writes the save under `key`, replacing any previous save there.
    pub fn persist<S>(&self, store: &mut S, key: &str) -> Result<(), SaveError>
    where
        S: SaveStore + ?Sized,
    {
        let encoded = self.encode()?;
        store.set(key, encoded)?;
        debug!(key, plants = self.plant_map.len(), "save persisted");
        Ok(())
    }

    /// Reads and parses the save stored under `key`.
    pub fn fetch<S>(store: &S, key: &str) -> Result<Self, SaveError>
    where
        S: SaveStore + ?Sized,
    {
        let Some(encoded) = store.get(key) else {
            warn!(key, "no save file found");
            return Err(SaveError::SaveKeyAbsent {
                key: key.to_owned(),
            });
        };
        Self::decode(&encoded)
    }

    /// Replaces the world's player position, grid and plants with the saved ones.
    ///
    /// Every part is decoded before anything is applied, so a failure leaves
    /// the world exactly as it was. Plants are rebuilt field by field rather
    /// than shared with the save.
    pub fn restore(&self, world: &mut World) -> Result<(), SaveError> {
        let grid = CellStore::decode(query::width(world), &self.grid_state)?;
        let plants = self.rebuild_plants(&grid)?;
        world.replace(self.player_pos, grid, plants);
        Ok(())
    }

    fn rebuild_plants(&self, grid: &CellStore) -> Result<PlantTable, SaveError> {
        let mut plants = PlantTable::new();
        for (key, saved) in &self.plant_map {
            let malformed = || SaveError::MalformedPlantEntry { key: key.clone() };
            let cell = CellCoord::parse_key(key).ok_or_else(malformed)?;
            let sown = grid.read_cell(cell).is_ok_and(|slot| slot.sown);
            if cell != saved.position() || !sown {
                return Err(malformed());
            }

            let plant = Plant::from_parts(
                saved.kind().clone(),
                cell,
                saved.growth_stage(),
                saved.family_neighbors(),
                saved.min_sun(),
                saved.min_water(),
            );
            if plants.insert(plant).is_some() {
                return Err(malformed());
            }
        }

        if let Some(orphan) = grid
            .cells()
            .iter()
            .find(|slot| slot.sown && plants.get(slot.coord()).is_none())
        {
            return Err(SaveError::UnplantedSownCell {
                cell: orphan.coord(),
            });
        }
        Ok(plants)
    }
}
