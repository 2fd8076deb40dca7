//! Simulation configuration
//!
//! Validated once before a network is built; an invalid configuration is
//! never allowed to reach the running simulation.

use anyhow::{bail, ensure, Result};

use super::types::TileGeometry;

/// Default grid size in tiles
pub const DEFAULT_GRID_WIDTH: usize = 25;
pub const DEFAULT_GRID_HEIGHT: usize = 15;

/// Default tile and road dimensions in world units
pub const DEFAULT_TILE_WIDTH: u32 = 64;
pub const DEFAULT_TILE_HEIGHT: u32 = 64;
pub const DEFAULT_ROAD_WIDTH: u32 = 30;

/// Time a vehicle waits at a stop sign before it may enter an intersection
pub const DEFAULT_VEHICLE_STOP_WAIT_TIME: f32 = 0.5;

/// Time a released vehicle is given to clear an intersection
pub const DEFAULT_INTERSECTION_CLEAR_TIME: f32 = 0.35;

pub const DEFAULT_VEHICLE_RADIUS: u32 = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub grid_width: usize,
    pub grid_height: usize,
    pub tile_width: u32,
    pub tile_height: u32,
    pub road_width: u32,
    pub vehicle_stop_wait_time: f32,
    pub intersection_clear_time: f32,
    pub vehicle_radius: u32,
    /// World units per second. `None` means one tile width per second.
    pub vehicle_speed: Option<f32>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            tile_width: DEFAULT_TILE_WIDTH,
            tile_height: DEFAULT_TILE_HEIGHT,
            road_width: DEFAULT_ROAD_WIDTH,
            vehicle_stop_wait_time: DEFAULT_VEHICLE_STOP_WAIT_TIME,
            intersection_clear_time: DEFAULT_INTERSECTION_CLEAR_TIME,
            vehicle_radius: DEFAULT_VEHICLE_RADIUS,
            vehicle_speed: None,
        }
    }
}

impl SimConfig {
    /// Check every constraint the simulation relies on
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.grid_width > 0 && self.grid_height > 0,
            "grid must be at least 1x1, got {}x{}",
            self.grid_width,
            self.grid_height
        );

        for (name, value) in [
            ("tile_width", self.tile_width),
            ("tile_height", self.tile_height),
            ("road_width", self.road_width),
        ] {
            if value == 0 || value % 2 != 0 {
                bail!("{} must be a positive even integer, got {}", name, value);
            }
        }

        ensure!(
            self.road_width < self.tile_width && self.road_width < self.tile_height,
            "road_width ({}) must be smaller than the tile ({}x{})",
            self.road_width,
            self.tile_width,
            self.tile_height
        );

        for (name, value) in [
            ("vehicle_stop_wait_time", self.vehicle_stop_wait_time),
            ("intersection_clear_time", self.intersection_clear_time),
        ] {
            if !value.is_finite() || value < 0.0 {
                bail!("{} must be a non-negative number of seconds, got {}", name, value);
            }
        }

        ensure!(self.vehicle_radius > 0, "vehicle_radius must be positive");

        if let Some(speed) = self.vehicle_speed {
            ensure!(
                speed.is_finite() && speed > 0.0,
                "vehicle_speed must be positive, got {}",
                speed
            );
        }

        Ok(())
    }

    pub fn geometry(&self) -> TileGeometry {
        TileGeometry::new(self.tile_width, self.tile_height, self.road_width)
    }

    pub fn speed(&self) -> f32 {
        self.vehicle_speed.unwrap_or(self.tile_width as f32)
    }
}
