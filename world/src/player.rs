//! Player token movement rules.

use tillage_core::{CellCoord, PlayerPosition};

/// Player token that walks across the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    position: PlayerPosition,
    x_max: i32,
    y_max: i32,
}

impl Player {
    /// Creates a player at `position` confined to `[0, x_max) x [0, y_max)`.
    #[must_use]
    pub const fn new(position: PlayerPosition, x_max: i32, y_max: i32) -> Self {
        Self {
            position,
            x_max,
            y_max,
        }
    }

    /// Current position of the token.
    #[must_use]
    pub const fn position(&self) -> PlayerPosition {
        self.position
    }

    /// Exclusive upper bounds of the area the token may occupy.
    #[must_use]
    pub const fn extents(&self) -> (i32, i32) {
        (self.x_max, self.y_max)
    }

    /// Displaces the token without consulting the bounds.
    ///
    /// Callers are expected to gate this behind [`Player::bounds_check`].
    pub fn move_by(&mut self, dx: i32, dy: i32) {
        self.position.x = self.position.x.saturating_add(dx);
        self.position.y = self.position.y.saturating_add(dy);
    }

    /// Reports whether the displacement keeps the token inside its extents.
    #[must_use]
    pub fn bounds_check(&self, dx: i32, dy: i32) -> bool {
        let x = i64::from(self.position.x) + i64::from(dx);
        let y = i64::from(self.position.y) + i64::from(dy);
        (0..i64::from(self.x_max)).contains(&x) && (0..i64::from(self.y_max)).contains(&y)
    }

    /// Reports whether `cell` lies in the 3x3 neighbourhood centred on the token.
    #[must_use]
    pub fn is_adjacent(&self, cell: CellCoord) -> bool {
        let dx = i64::from(cell.column()) - i64::from(self.position.x);
        let dy = i64::from(cell.row()) - i64::from(self.position.y);
        (-1..=1).contains(&dx) && (-1..=1).contains(&dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_at(x: i32, y: i32) -> Player {
        Player::new(PlayerPosition::new(x, y), 6, 6)
    }

    #[test]
    fn bounds_check_rejects_every_exit() {
        for y in 0..6 {
            for x in 0..6 {
                let player = player_at(x, y);
                for dy in -2..=2 {
                    for dx in -2..=2 {
                        let inside = (0..6).contains(&(x + dx)) && (0..6).contains(&(y + dy));
                        assert_eq!(player.bounds_check(dx, dy), inside, "({x},{y}) + ({dx},{dy})");
                    }
                }
            }
        }
    }

    #[test]
    fn bounds_check_does_not_move_the_token() {
        let player = player_at(0, 0);
        assert!(!player.bounds_check(-1, 0));
        assert_eq!(player.position(), PlayerPosition::new(0, 0));
    }

    #[test]
    fn move_is_unconditional() {
        let mut player = player_at(0, 0);
        player.move_by(-1, 2);
        assert_eq!(player.position(), PlayerPosition::new(-1, 2));
    }

    #[test]
    fn adjacency_covers_eight_neighbours_and_self() {
        let player = player_at(2, 2);
        let mut adjacent = 0;
        for row in 0..6 {
            for column in 0..6 {
                if player.is_adjacent(CellCoord::new(column, row)) {
                    adjacent += 1;
                    assert!(column.abs_diff(2) <= 1 && row.abs_diff(2) <= 1);
                }
            }
        }
        assert_eq!(adjacent, 9);
    }

    #[test]
    fn adjacency_at_corner_is_clipped() {
        let player = player_at(0, 0);
        assert!(player.is_adjacent(CellCoord::new(1, 1)));
        assert!(!player.is_adjacent(CellCoord::new(2, 0)));
    }
}
