//! Broad-phase collision index
//!
//! Objects are bucketed into a fixed grid of collision cells. Queries only
//! test exact rectangle overlap against objects sharing a cell.

use std::collections::{BTreeSet, HashMap};

use super::error::{SimError, SimResult};
use super::types::Point;

/// Axis-aligned rectangle in world coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Square of half-size `radius` centered on `center`
    pub fn around(center: Point, radius: f32) -> Self {
        Self::new(center.x - radius, center.y - radius, radius * 2.0, radius * 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Top-left, top-right, bottom-right, bottom-left
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x, self.bottom()),
        ]
    }

    /// Strict overlap; rectangles that only share an edge do not intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Spatial hash of rectangles over a fixed grid of collision cells
#[derive(Debug, Clone)]
pub struct CollisionTileGrid {
    grid_width: usize,
    grid_height: usize,
    cell_width: f32,
    cell_height: f32,
    objects: HashMap<usize, Rect>,
    object_cells: HashMap<usize, BTreeSet<(usize, usize)>>,
    /// Occupants of every cell, row-major
    cell_objects: Vec<Vec<BTreeSet<usize>>>,
}

impl CollisionTileGrid {
    pub fn new(grid_width: usize, grid_height: usize, cell_width: f32, cell_height: f32) -> Self {
        Self {
            grid_width,
            grid_height,
            cell_width,
            cell_height,
            objects: HashMap::new(),
            object_cells: HashMap::new(),
            cell_objects: vec![vec![BTreeSet::new(); grid_width]; grid_height],
        }
    }

    /// Insert or move an object.
    ///
    /// Cell indices are clamped to the grid, so a rectangle lying wholly off
    /// the grid is filed under the nearest edge cell rather than its own
    /// bounding box; exact overlap tests keep query results correct.
    pub fn update_object(&mut self, id: usize, rect: Rect) {
        self.objects.insert(id, rect);

        if let Some(old_cells) = self.object_cells.remove(&id) {
            for (r, c) in old_cells {
                self.cell_objects[r][c].remove(&id);
            }
        }

        let new_cells = self.occupied_cells(&rect);
        for &(r, c) in &new_cells {
            self.cell_objects[r][c].insert(id);
        }
        self.object_cells.insert(id, new_cells);
    }

    pub fn remove_object(&mut self, id: usize) -> SimResult<()> {
        let cells = self
            .object_cells
            .remove(&id)
            .ok_or(SimError::UnknownObject(id))?;
        for (r, c) in cells {
            self.cell_objects[r][c].remove(&id);
        }
        self.objects.remove(&id);
        Ok(())
    }

    pub fn has_collision(&self, id: usize) -> SimResult<bool> {
        let rect = self.rect(id)?;
        Ok(self
            .nearby_objects(id)?
            .into_iter()
            .any(|other| self.objects.get(&other).is_some_and(|o| rect.intersects(o))))
    }

    pub fn colliding_object_ids(&self, id: usize) -> SimResult<BTreeSet<usize>> {
        let rect = self.rect(id)?;
        Ok(self
            .nearby_objects(id)?
            .into_iter()
            .filter(|other| self.objects.get(other).is_some_and(|o| rect.intersects(o)))
            .collect())
    }

    /// Objects sharing at least one cell with `id`, excluding `id` itself
    pub fn nearby_objects(&self, id: usize) -> SimResult<BTreeSet<usize>> {
        let cells = self
            .object_cells
            .get(&id)
            .ok_or(SimError::UnknownObject(id))?;
        let mut nearby: BTreeSet<usize> = cells
            .iter()
            .flat_map(|&(r, c)| self.cell_objects[r][c].iter().copied())
            .collect();
        nearby.remove(&id);
        Ok(nearby)
    }

    /// Cells covered by the bounding box of the rectangle's corners, clipped
    /// to the grid
    pub fn occupied_cells(&self, rect: &Rect) -> BTreeSet<(usize, usize)> {
        let indices = rect.corners().map(|p| self.cell_index(p));
        let min_r = indices.iter().map(|i| i.0).min().unwrap_or(0);
        let max_r = indices.iter().map(|i| i.0).max().unwrap_or(0);
        let min_c = indices.iter().map(|i| i.1).min().unwrap_or(0);
        let max_c = indices.iter().map(|i| i.1).max().unwrap_or(0);

        (min_r..=max_r)
            .flat_map(|r| (min_c..=max_c).map(move |c| (r, c)))
            .collect()
    }

    fn cell_index(&self, point: Point) -> (usize, usize) {
        let clamp = |v: f32, size: f32, count: usize| -> usize {
            let index = (v / size).floor();
            if index <= 0.0 || !index.is_finite() {
                0
            } else {
                (index as usize).min(count.saturating_sub(1))
            }
        };
        (
            clamp(point.y, self.cell_height, self.grid_height),
            clamp(point.x, self.cell_width, self.grid_width),
        )
    }

    fn rect(&self, id: usize) -> SimResult<Rect> {
        self.objects
            .get(&id)
            .copied()
            .ok_or(SimError::UnknownObject(id))
    }

    pub fn object(&self, id: usize) -> Option<&Rect> {
        self.objects.get(&id)
    }

    pub fn object_cells(&self, id: usize) -> Option<&BTreeSet<(usize, usize)>> {
        self.object_cells.get(&id)
    }

    pub fn cell_objects(&self, r: usize, c: usize) -> Option<&BTreeSet<usize>> {
        self.cell_objects.get(r).and_then(|row| row.get(c))
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}
