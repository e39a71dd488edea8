//! Dense cell store backing the farm grid.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::Rng;
use tillage_core::{Cell, CellCoord, SUN_MAX, WATER_MAX};
use tracing::warn;

use crate::{SnapshotDefect, WorldError};

/// Number of bytes a single cell occupies in the packed snapshot encoding.
pub const CELL_RECORD_LEN: usize = 20;

const WORD_LEN: usize = 4;

// Uniform draw over this table yields -1 and +1 with 0.4 each and 0 with 0.2.
const WATER_STEPS: [i16; 5] = [-1, -1, 0, 1, 1];

/// Fixed-size square grid of cells addressed by `row * width + column`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellStore {
    width: u32,
    cells: Vec<Cell>,
}

impl CellStore {
    /// Creates a store whose cells are all dry, dark and unsown.
    #[must_use]
    pub fn blank(width: u32) -> Self {
        let capacity_u64 = u64::from(width) * u64::from(width);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        let mut cells = Vec::with_capacity(capacity);
        for row in 0..width {
            for column in 0..width {
                cells.push(Cell {
                    column,
                    row,
                    sun: 0,
                    water: 0,
                    sown: false,
                });
            }
        }
        Self { width, cells }
    }

    /// Creates a store with every cell seeded from the provided random source.
    ///
    /// Sunlight is drawn uniformly from `0..=SUN_MAX` and water uniformly from
    /// `0..=WATER_MAX`. No cell starts sown.
    pub fn seeded<R: Rng + ?Sized>(width: u32, rng: &mut R) -> Self {
        let mut store = Self::blank(width);
        for index in 0..store.cells.len() {
            let sun = rng.gen_range(0..=SUN_MAX);
            let water = rng.gen_range(0..=WATER_MAX);
            store.reset(index, sun, water);
        }
        store
    }

    /// Builds a new store of the given width from a snapshot string.
    pub fn decode(width: u32, encoded: &str) -> Result<Self, WorldError> {
        let mut store = Self::blank(width);
        store.deserialize(encoded)?;
        Ok(store)
    }

    /// Number of cells along each edge of the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// All cells in linear-index order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Returns a copy of the cell at the provided coordinate.
    pub fn read_cell(&self, cell: CellCoord) -> Result<Cell, WorldError> {
        let index = self.index(cell)?;
        Ok(self.cells[index])
    }

    /// Overwrites sunlight and water at the coordinate and clears its sown flag.
    pub fn write_cell(&mut self, cell: CellCoord, sun: u8, water: u8) -> Result<(), WorldError> {
        let index = self.index(cell)?;
        self.reset(index, sun, water);
        Ok(())
    }

    /// Flips the sown flag of the cell. Toggling twice restores the original flag.
    pub fn sow_cell(&mut self, cell: CellCoord) -> Result<(), WorldError> {
        let index = self.index(cell)?;
        let slot = &mut self.cells[index];
        slot.sown = !slot.sown;
        Ok(())
    }

    /// Advances every cell by one turn.
    ///
    /// Sunlight has no memory and is resampled uniformly. Water performs a
    /// bounded random walk: one step of -1, 0 or +1 clamped to
    /// `0..=WATER_MAX`.
    pub fn randomize_turn<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for cell in &mut self.cells {
            cell.sun = rng.gen_range(0..=SUN_MAX);
            let step = WATER_STEPS[rng.gen_range(0..WATER_STEPS.len())];
            let water = (i16::from(cell.water) + step).clamp(0, i16::from(WATER_MAX));
            cell.water = u8::try_from(water).unwrap_or(WATER_MAX);
        }
    }

    /// Encodes the packed cell buffer as base64 text.
    ///
    /// Every cell occupies [`CELL_RECORD_LEN`] bytes: five big-endian 32-bit
    /// words holding column, row, sun, water and the sown flag.
    #[must_use]
    pub fn serialize(&self) -> String {
        let mut bytes = Vec::with_capacity(self.cells.len() * CELL_RECORD_LEN);
        for cell in &self.cells {
            bytes.extend_from_slice(&cell.column.to_be_bytes());
            bytes.extend_from_slice(&cell.row.to_be_bytes());
            bytes.extend_from_slice(&u32::from(cell.sun).to_be_bytes());
            bytes.extend_from_slice(&u32::from(cell.water).to_be_bytes());
            bytes.extend_from_slice(&u32::from(cell.sown).to_be_bytes());
        }
        STANDARD.encode(bytes)
    }

    /// Replaces the whole buffer with the decoded snapshot.
    ///
    /// The store is left untouched when the snapshot is malformed.
    pub fn deserialize(&mut self, encoded: &str) -> Result<(), WorldError> {
        let cells = self.parse_snapshot(encoded).map_err(|defect| {
            warn!(width = self.width, %defect, "grid snapshot rejected");
            WorldError::MalformedSnapshot(defect)
        })?;
        self.cells = cells;
        Ok(())
    }

    fn parse_snapshot(&self, encoded: &str) -> Result<Vec<Cell>, SnapshotDefect> {
        let bytes = STANDARD
            .decode(encoded.trim().as_bytes())
            .map_err(SnapshotDefect::InvalidEncoding)?;

        let expected = self.cells.len() * CELL_RECORD_LEN;
        if bytes.len() != expected {
            return Err(SnapshotDefect::LengthMismatch {
                expected,
                actual: bytes.len(),
            });
        }

        let mut cells = Vec::with_capacity(self.cells.len());
        for (index, (record, slot)) in bytes
            .chunks_exact(CELL_RECORD_LEN)
            .zip(&self.cells)
            .enumerate()
        {
            let column = read_word(record, 0);
            let row = read_word(record, 1);
            if column != slot.column || row != slot.row {
                return Err(SnapshotDefect::MisplacedRecord { index });
            }

            let sun = bounded_level(read_word(record, 2), SUN_MAX)
                .ok_or(SnapshotDefect::ValueOutOfRange { index })?;
            let water = bounded_level(read_word(record, 3), WATER_MAX)
                .ok_or(SnapshotDefect::ValueOutOfRange { index })?;
            let sown = match read_word(record, 4) {
                0 => false,
                1 => true,
                _ => return Err(SnapshotDefect::ValueOutOfRange { index }),
            };

            cells.push(Cell {
                column,
                row,
                sun,
                water,
                sown,
            });
        }
        Ok(cells)
    }

    fn reset(&mut self, index: usize, sun: u8, water: u8) {
        let slot = &mut self.cells[index];
        slot.sun = sun.min(SUN_MAX);
        slot.water = water.min(WATER_MAX);
        slot.sown = false;
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Result<usize, WorldError> {
        let out_of_bounds = || WorldError::OutOfBounds {
            column: cell.column(),
            row: cell.row(),
            width: self.width,
        };
        if cell.column() >= self.width || cell.row() >= self.width {
            return Err(out_of_bounds());
        }
        let row = usize::try_from(cell.row()).map_err(|_| out_of_bounds())?;
        let column = usize::try_from(cell.column()).map_err(|_| out_of_bounds())?;
        let width = usize::try_from(self.width).map_err(|_| out_of_bounds())?;
        Ok(row * width + column)
    }
}

fn read_word(record: &[u8], slot: usize) -> u32 {
    let start = slot * WORD_LEN;
    let mut word = [0_u8; WORD_LEN];
    word.copy_from_slice(&record[start..start + WORD_LEN]);
    u32::from_be_bytes(word)
}

fn bounded_level(value: u32, max: u8) -> Option<u8> {
    u8::try_from(value).ok().filter(|level| *level <= max)
}
