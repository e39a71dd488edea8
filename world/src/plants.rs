//! Plants and the table that tracks them by cell.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tillage_core::{CellCoord, Crop, CropKind};

use crate::CellStore;

/// A crop growing in a single cell.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    #[serde(rename = "type")]
    kind: CropKind,
    position: CellCoord,
    growth_stage: u32,
    family_neighbors: u32,
    min_sun: u8,
    min_water: u8,
}

impl Plant {
    /// Creates a freshly sown plant from a crop template.
    #[must_use]
    pub fn sow(crop: &Crop, position: CellCoord) -> Self {
        Self {
            kind: crop.kind.clone(),
            position,
            growth_stage: 0,
            family_neighbors: 0,
            min_sun: crop.min_sun,
            min_water: crop.min_water,
        }
    }

    /// Rebuilds a plant from previously captured fields.
    #[must_use]
    pub fn from_parts(
        kind: CropKind,
        position: CellCoord,
        growth_stage: u32,
        family_neighbors: u32,
        min_sun: u8,
        min_water: u8,
    ) -> Self {
        Self {
            kind,
            position,
            growth_stage,
            family_neighbors,
            min_sun,
            min_water,
        }
    }

    /// Crop species of the plant.
    #[must_use]
    pub fn kind(&self) -> &CropKind {
        &self.kind
    }

    /// Cell the plant grows in.
    #[must_use]
    pub const fn position(&self) -> CellCoord {
        self.position
    }

    /// Number of growth stages reached so far.
    #[must_use]
    pub const fn growth_stage(&self) -> u32 {
        self.growth_stage
    }

    /// Same-species plants found in the surrounding eight cells at the last turn.
    #[must_use]
    pub const fn family_neighbors(&self) -> u32 {
        self.family_neighbors
    }

    /// Minimum sunlight required to grow.
    #[must_use]
    pub const fn min_sun(&self) -> u8 {
        self.min_sun
    }

    /// Minimum water required to grow.
    #[must_use]
    pub const fn min_water(&self) -> u8 {
        self.min_water
    }

    /// Reports whether the provided conditions satisfy both thresholds.
    #[must_use]
    pub const fn meets_conditions(&self, sun: u8, water: u8) -> bool {
        sun >= self.min_sun && water >= self.min_water
    }

    /// Advances one growth stage when the conditions satisfy both thresholds.
    pub fn grow(&mut self, sun: u8, water: u8) {
        if self.meets_conditions(sun, water) {
            self.growth_stage = self.growth_stage.saturating_add(1);
        }
    }
}

/// Plants keyed by the cell they occupy. At most one plant lives in a cell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlantTable {
    plants: BTreeMap<CellCoord, Plant>,
}

impl PlantTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Plant occupying the cell, if any.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<&Plant> {
        self.plants.get(&cell)
    }

    /// Stores the plant at its own position, returning any plant it displaced.
    pub fn insert(&mut self, plant: Plant) -> Option<Plant> {
        self.plants.insert(plant.position(), plant)
    }

    /// Removes and returns the plant occupying the cell.
    pub fn remove(&mut self, cell: CellCoord) -> Option<Plant> {
        self.plants.remove(&cell)
    }

    /// Number of plants in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plants.len()
    }

    /// Reports whether the table holds no plants.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }

    /// Iterates plants in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = &Plant> {
        self.plants.values()
    }

    /// Runs the per-turn plant update against the freshly advanced grid.
    ///
    /// Neighbour counts are refreshed for every plant before any plant grows,
    /// so the order of iteration never matters.
    pub fn tend(&mut self, grid: &CellStore) {
        let counts: Vec<(CellCoord, u32)> = self
            .plants
            .values()
            .map(|plant| (plant.position(), self.family_count(plant)))
            .collect();

        for (cell, count) in counts {
            let Some(plant) = self.plants.get_mut(&cell) else {
                continue;
            };
            plant.family_neighbors = count;
            if let Ok(conditions) = grid.read_cell(cell) {
                plant.grow(conditions.sun, conditions.water);
            }
        }
    }

    fn family_count(&self, plant: &Plant) -> u32 {
        let mut count = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let Some(neighbour) = plant.position().offset(dx, dy) else {
                    continue;
                };
                if self
                    .plants
                    .get(&neighbour)
                    .is_some_and(|other| other.kind() == plant.kind())
                {
                    count += 1;
                }
            }
        }
        count
    }
}

impl FromIterator<Plant> for PlantTable {
    fn from_iter<I: IntoIterator<Item = Plant>>(iter: I) -> Self {
        let mut table = Self::new();
        for plant in iter {
            let _ = table.insert(plant);
        }
        table
    }
}
