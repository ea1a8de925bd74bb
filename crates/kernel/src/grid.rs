use gridturn_common::{Position, Tile};
use serde::{Deserialize, Serialize};

/// Fixed-size square tile array addressed by world coordinates.
///
/// World (0, 0) sits at the center. Storage is row-major with `[0][0]` at
/// the top-left, so world Y grows upward while the row index grows downward:
///
/// ```text
/// row = floor(size / 2) - y
/// col = x + floor(size / 2)
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldGrid {
    rows: Vec<Vec<Tile>>,
}

impl WorldGrid {
    /// Create a `size × size` grid filled with one tile.
    pub fn filled(size: u32, fill: Tile) -> Self {
        let size = size as usize;
        Self {
            rows: vec![vec![fill; size]; size],
        }
    }

    /// A zero-sized grid, used before world generation runs.
    pub fn empty() -> Self {
        Self { rows: Vec::new() }
    }

    /// Wrap pre-built rows. Returns `None` unless the rows form a square.
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Option<Self> {
        let n = rows.len();
        rows.iter().all(|r| r.len() == n).then_some(Self { rows })
    }

    pub fn size(&self) -> u32 {
        self.rows.len() as u32
    }

    pub fn rows(&self) -> &[Vec<Tile>] {
        &self.rows
    }

    /// Storage `(row, col)` for a world position, or `None` when out of bounds.
    pub fn to_index(&self, pos: Position) -> Option<(usize, usize)> {
        let size = i64::from(self.size());
        let half = size / 2;
        let row = half - i64::from(pos.y);
        let col = i64::from(pos.x) + half;
        if row < 0 || row >= size || col < 0 || col >= size {
            return None;
        }
        Some((row as usize, col as usize))
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.to_index(pos).is_some()
    }

    /// Tile at a world position; `None` means "no tile" (off the world).
    pub fn get(&self, pos: Position) -> Option<&Tile> {
        let (row, col) = self.to_index(pos)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Overwrite the tile at a world position. Returns false when out of bounds.
    pub fn set(&mut self, pos: Position, tile: Tile) -> bool {
        let Some((row, col)) = self.to_index(pos) else {
            return false;
        };
        match self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                *cell = tile;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridturn_common::TileKind;

    fn grass() -> Tile {
        Tile::new(TileKind::Grassland, 1.0)
    }

    #[test]
    fn origin_maps_to_center() {
        let g = WorldGrid::filled(100, grass());
        assert_eq!(g.to_index(Position::ORIGIN), Some((50, 50)));
        assert_eq!(g.to_index(Position::new(0, 1)), Some((49, 50)));
        assert_eq!(g.to_index(Position::new(1, 0)), Some((50, 51)));
    }

    #[test]
    fn corners_and_out_of_bounds() {
        let g = WorldGrid::filled(5, grass());
        // half = 2: x, y in [-2, 2]
        assert_eq!(g.to_index(Position::new(-2, 2)), Some((0, 0)));
        assert_eq!(g.to_index(Position::new(2, -2)), Some((4, 4)));
        assert!(g.get(Position::new(3, 0)).is_none());
        assert!(g.get(Position::new(0, -3)).is_none());
        assert!(g.get(Position::new(i32::MIN, i32::MAX)).is_none());
    }

    #[test]
    fn even_sized_grid_is_offset_by_one() {
        let g = WorldGrid::filled(4, grass());
        // half = 2: x in [-2, 1], y in [-1, 2]
        assert!(g.contains(Position::new(-2, 2)));
        assert!(g.contains(Position::new(1, -1)));
        assert!(!g.contains(Position::new(2, 0)));
        assert!(!g.contains(Position::new(0, -2)));
    }

    #[test]
    fn set_mutates_in_place() {
        let mut g = WorldGrid::filled(5, grass());
        assert!(g.set(Position::new(2, 2), Tile::new(TileKind::Forest, 3.0)));
        assert_eq!(g.get(Position::new(2, 2)).unwrap().kind, TileKind::Forest);
        assert_eq!(g.rows()[0][4].kind, TileKind::Forest);
        assert!(!g.set(Position::new(9, 9), grass()));
        assert_eq!(g.size(), 5);
    }

    #[test]
    fn from_rows_requires_square() {
        assert!(WorldGrid::from_rows(vec![vec![grass(); 2]; 3]).is_none());
        assert!(WorldGrid::from_rows(vec![vec![grass(); 3]; 3]).is_some());
    }
}
