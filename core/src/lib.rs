#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tillage engine.
//!
//! This crate defines the vocabulary that connects adapters, the
//! authoritative world, and the systems that drive it. Adapters translate
//! raw device input into [`InputEvent`] values, the session turns those into
//! reversible actions against the world, and then broadcasts [`Event`] values
//! so renderers know when to redraw.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Tillage.";

/// Highest sunlight level a cell can report.
pub const SUN_MAX: u8 = 9;

/// Highest water level a cell can hold.
pub const WATER_MAX: u8 = 3;

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Parses the textual key produced by the [`fmt::Display`] implementation.
    ///
    /// Keys take the form `"{column},{row}"`. Surrounding whitespace is
    /// ignored; anything else yields `None`.
    #[must_use]
    pub fn parse_key(key: &str) -> Option<Self> {
        let (column, row) = key.trim().split_once(',')?;
        let column = column.trim().parse::<u32>().ok()?;
        let row = row.trim().parse::<u32>().ok()?;
        Some(Self::new(column, row))
    }

    /// Returns the coordinate offset by the provided signed deltas, if it stays non-negative.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        let column = self.column.checked_add_signed(dx)?;
        let row = self.row.checked_add_signed(dy)?;
        Some(Self::new(column, row))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.column, self.row)
    }
}

/// Immutable copy of a single cell's environmental and cultivation state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Zero-based column of the cell.
    pub column: u32,
    /// Zero-based row of the cell.
    pub row: u32,
    /// Sunlight reaching the cell this turn, in `0..=SUN_MAX`.
    pub sun: u8,
    /// Water held by the cell, in `0..=WATER_MAX`.
    pub water: u8,
    /// Indicates whether a plant currently occupies the cell.
    pub sown: bool,
}

impl Cell {
    /// Coordinate identifying the cell.
    #[must_use]
    pub const fn coord(&self) -> CellCoord {
        CellCoord::new(self.column, self.row)
    }
}

/// Position of the player token. Signed so that displacements can be
/// evaluated before bounds checking.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerPosition {
    /// Horizontal coordinate, aligned with cell columns.
    pub x: i32,
    /// Vertical coordinate, aligned with cell rows.
    pub y: i32,
}

impl PlayerPosition {
    /// Creates a new player position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Converts the position into a cell coordinate when both axes are non-negative.
    #[must_use]
    pub fn cell(&self) -> Option<CellCoord> {
        let column = u32::try_from(self.x).ok()?;
        let row = u32::try_from(self.y).ok()?;
        Some(CellCoord::new(column, row))
    }
}

/// Opaque identifier naming a crop species.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CropKind(String);

impl CropKind {
    /// Creates a crop identifier from any string-like value.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrowed view of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CropKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Species template used when sowing a new plant.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crop {
    /// Identifier stamped onto every plant sown from this template.
    pub kind: CropKind,
    /// Minimum sunlight a plant needs to advance a growth stage.
    pub min_sun: u8,
    /// Minimum water a plant needs to advance a growth stage.
    pub min_water: u8,
}

impl Crop {
    /// Creates a crop template with explicit growth thresholds.
    #[must_use]
    pub fn new(kind: CropKind, min_sun: u8, min_water: u8) -> Self {
        Self {
            kind,
            min_sun,
            min_water,
        }
    }
}

/// Cardinal movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Signed `(dx, dy)` displacement of a single step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Discrete keys understood by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Moves the player one column to the left.
    ArrowLeft,
    /// Moves the player one column to the right.
    ArrowRight,
    /// Moves the player one row up.
    ArrowUp,
    /// Moves the player one row down.
    ArrowDown,
    /// Confirms the current turn, advancing the world.
    Enter,
}

impl Key {
    /// Resolves a host key identifier such as `"ArrowLeft"` or `"Enter"`.
    #[must_use]
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier {
            "ArrowLeft" => Some(Self::ArrowLeft),
            "ArrowRight" => Some(Self::ArrowRight),
            "ArrowUp" => Some(Self::ArrowUp),
            "ArrowDown" => Some(Self::ArrowDown),
            "Enter" => Some(Self::Enter),
            _ => None,
        }
    }

    /// Host identifier for the key.
    #[must_use]
    pub const fn identifier(self) -> &'static str {
        match self {
            Self::ArrowLeft => "ArrowLeft",
            Self::ArrowRight => "ArrowRight",
            Self::ArrowUp => "ArrowUp",
            Self::ArrowDown => "ArrowDown",
            Self::Enter => "Enter",
        }
    }

    /// Movement direction bound to the key, if it is a directional key.
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Self::ArrowLeft => Some(Direction::West),
            Self::ArrowRight => Some(Direction::East),
            Self::ArrowUp => Some(Direction::North),
            Self::ArrowDown => Some(Direction::South),
            Self::Enter => None,
        }
    }
}

/// Input events consumed by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputEvent {
    /// A discrete key press.
    Key(Key),
    /// A pointer click resolved to the grid cell underneath it.
    Click(CellCoord),
}

/// Describes which kind of committed mutation triggered a state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeReason {
    /// A fresh player-initiated action was executed.
    Executed,
    /// The most recent action was undone.
    Undone,
    /// A previously undone action was executed again.
    Redone,
    /// The world was replaced from a save.
    Loaded,
}

/// Events broadcast by the session after committing mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// The world changed and must be redrawn from scratch.
    StateChanged {
        /// Mutation that produced the change.
        reason: ChangeReason,
    },
}

#[cfg(test)]
mod tests {
    use super::{CellCoord, Direction, Key, PlayerPosition};

    #[test]
    fn cell_key_round_trips_through_text() {
        let cell = CellCoord::new(4, 11);
        assert_eq!(cell.to_string(), "4,11");
        assert_eq!(CellCoord::parse_key("4,11"), Some(cell));
        assert_eq!(CellCoord::parse_key(" 4 , 11 "), Some(cell));
    }

    #[test]
    fn malformed_cell_keys_are_rejected() {
        assert_eq!(CellCoord::parse_key(""), None);
        assert_eq!(CellCoord::parse_key("4"), None);
        assert_eq!(CellCoord::parse_key("-1,2"), None);
        assert_eq!(CellCoord::parse_key("a,b"), None);
    }

    #[test]
    fn offset_refuses_negative_coordinates() {
        let origin = CellCoord::new(0, 0);
        assert_eq!(origin.offset(-1, 0), None);
        assert_eq!(origin.offset(1, 1), Some(CellCoord::new(1, 1)));
    }

    #[test]
    fn key_identifiers_map_to_directions() {
        for key in [Key::ArrowLeft, Key::ArrowRight, Key::ArrowUp, Key::ArrowDown] {
            assert_eq!(Key::from_identifier(key.identifier()), Some(key));
            assert!(key.direction().is_some());
        }
        assert_eq!(Key::ArrowLeft.direction().map(Direction::delta), Some((-1, 0)));
        assert_eq!(Key::from_identifier("Enter"), Some(Key::Enter));
        assert_eq!(Key::Enter.direction(), None);
        assert_eq!(Key::from_identifier("Space"), None);
    }

    #[test]
    fn player_position_converts_to_cell_only_when_non_negative() {
        assert_eq!(
            PlayerPosition::new(2, 3).cell(),
            Some(CellCoord::new(2, 3))
        );
        assert_eq!(PlayerPosition::new(-1, 3).cell(), None);
    }
}
