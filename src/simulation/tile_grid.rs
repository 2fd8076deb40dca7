//! Tile grid holding the road shape of every cell
//!
//! Placing a road re-derives the shape of the new tile and its four
//! neighbors from their occupied-neighbor patterns.

use log::debug;

use super::types::{Change, ChangeKind, Direction, TileType};

/// An occupied cell adjacent to another cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    /// Side of the original cell this neighbor lies on
    pub dir: Direction,
    pub row: usize,
    pub col: usize,
    pub tile_type: TileType,
}

/// A 2D grid of road tiles
#[derive(Debug, Clone)]
pub struct TileGrid {
    width: usize,
    height: usize,
    grid: Vec<Vec<TileType>>,
    changes: Vec<Change<(usize, usize, TileType)>>,
}

impl TileGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            grid: vec![vec![TileType::Empty; width]; height],
            changes: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, r: usize, c: usize) -> bool {
        r < self.height && c < self.width
    }

    /// Tile type at (r, c). Cells outside the grid read as `Empty`.
    pub fn tile_type(&self, r: usize, c: usize) -> TileType {
        self.grid
            .get(r)
            .and_then(|row| row.get(c))
            .copied()
            .unwrap_or(TileType::Empty)
    }

    pub fn is_occupied(&self, r: usize, c: usize) -> bool {
        !self.tile_type(r, c).is_empty()
    }

    /// The in-bounds cell on the `dir` side of (r, c)
    pub fn neighbor_cell(&self, r: usize, c: usize, dir: Direction) -> Option<(usize, usize)> {
        let (dr, dc) = dir.offset();
        let nr = r.checked_add_signed(dr)?;
        let nc = c.checked_add_signed(dc)?;
        self.in_bounds(nr, nc).then_some((nr, nc))
    }

    /// Occupied neighbors of (r, c), in clockwise order starting with `Up`
    pub fn neighbors(&self, r: usize, c: usize) -> Vec<Neighbor> {
        Direction::ALL
            .into_iter()
            .filter_map(|dir| {
                let (row, col) = self.neighbor_cell(r, c, dir)?;
                let tile_type = self.tile_type(row, col);
                (!tile_type.is_empty()).then_some(Neighbor {
                    dir,
                    row,
                    col,
                    tile_type,
                })
            })
            .collect()
    }

    /// Bitmask of occupied neighbors, bit `i` for `Direction::ALL[i]`
    pub fn neighbor_mask(&self, r: usize, c: usize) -> u8 {
        self.neighbors(r, c)
            .iter()
            .fold(0, |mask, n| mask | (1 << n.dir.index()))
    }

    /// Add a road tile at (r, c).
    ///
    /// Fails without touching the grid if the cell is outside the grid or
    /// already occupied, or if `restrict_to_neighbors` is set and no neighbor
    /// holds a road.
    pub fn add_tile(&mut self, r: usize, c: usize, restrict_to_neighbors: bool) -> bool {
        if !self.in_bounds(r, c) || self.is_occupied(r, c) {
            return false;
        }
        if restrict_to_neighbors && self.neighbors(r, c).is_empty() {
            return false;
        }

        let tile_type = self.evaluate_tile_type(r, c, true);
        self.set_tile(r, c, tile_type);
        debug!("Placed {:?} tile at ({}, {})", tile_type, r, c);

        for dir in Direction::ALL {
            if let Some((nr, nc)) = self.neighbor_cell(r, c, dir) {
                let n_type = self.evaluate_tile_type(nr, nc, false);
                self.set_tile(nr, nc, n_type);
            }
        }

        true
    }

    /// Derive the shape of (r, c) from its occupied neighbors.
    ///
    /// `modified` marks a cell whose own occupancy just changed; an empty cell
    /// that was not modified stays `Empty`.
    pub fn evaluate_tile_type(&self, r: usize, c: usize, modified: bool) -> TileType {
        if !modified && !self.is_occupied(r, c) {
            return TileType::Empty;
        }
        TileType::from_mask(self.neighbor_mask(r, c))
    }

    fn set_tile(&mut self, r: usize, c: usize, tile_type: TileType) {
        let old = self.grid[r][c];
        if old == tile_type {
            return;
        }
        self.grid[r][c] = tile_type;
        let kind = if old.is_empty() {
            ChangeKind::Added
        } else {
            ChangeKind::Modified
        };
        self.changes.push((kind, (r, c, tile_type)));
    }

    /// Return and clear all tile changes since the last drain
    pub fn drain_changes(&mut self) -> Vec<Change<(usize, usize, TileType)>> {
        std::mem::take(&mut self.changes)
    }

    pub fn occupied_count(&self) -> usize {
        self.grid
            .iter()
            .flatten()
            .filter(|t| !t.is_empty())
            .count()
    }

    /// All occupied cells in row-major order
    pub fn occupied_cells(&self) -> Vec<(usize, usize, TileType)> {
        self.grid
            .iter()
            .enumerate()
            .flat_map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(_, t)| !t.is_empty())
                    .map(move |(c, t)| (r, c, *t))
            })
            .collect()
    }

    /// Render the grid with one box-drawing glyph per tile
    pub fn to_text(&self) -> String {
        self.grid
            .iter()
            .map(|row| row.iter().map(|t| t.glyph()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
