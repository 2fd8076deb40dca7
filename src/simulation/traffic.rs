//! Vehicle collection and intersection control
//!
//! Each tick releases queued vehicles first and then moves every vehicle in
//! creation order, so a vehicle freed this tick may drive in the same tick.

use log::debug;
use std::collections::{BTreeMap, BTreeSet};

use super::collision::{CollisionTileGrid, Rect};
use super::config::SimConfig;
use super::error::{SimError, SimResult};
use super::intersection::Intersection;
use super::tile_grid::TileGrid;
use super::travel_graph::RoadSegmentNode;
use super::types::{Change, ChangeKind, Direction, TileGeometry, VehicleId};
use super::vehicle::Vehicle;

/// All vehicles in the network plus the intersections that govern them
#[derive(Debug, Clone)]
pub struct Traffic {
    geometry: TileGeometry,
    stop_wait_time: f32,
    clear_time: f32,
    vehicle_speed: f32,
    vehicle_radius: f32,

    /// Indexed by vehicle id; vehicles are never removed
    vehicles: Vec<Vehicle>,

    next_vehicle_id: usize,

    /// Created on first arrival at a cell and kept for the lifetime of the
    /// network
    intersections: BTreeMap<(usize, usize), Intersection>,

    /// Vehicle footprints, keyed by vehicle id
    collisions: CollisionTileGrid,

    changes: Vec<Change<(VehicleId, f32, f32)>>,
}

impl Traffic {
    pub fn new(config: &SimConfig) -> Self {
        let geometry = config.geometry();
        Self {
            geometry,
            stop_wait_time: config.vehicle_stop_wait_time,
            clear_time: config.intersection_clear_time,
            vehicle_speed: config.speed(),
            vehicle_radius: config.vehicle_radius as f32,
            vehicles: Vec::new(),
            next_vehicle_id: 0,
            intersections: BTreeMap::new(),
            collisions: CollisionTileGrid::new(
                config.grid_width,
                config.grid_height,
                geometry.tile_width,
                geometry.tile_height,
            ),
            changes: Vec::new(),
        }
    }

    /// Spawn a vehicle parked on `node`
    pub fn add_vehicle(&mut self, node: RoadSegmentNode) -> VehicleId {
        let id = VehicleId(self.next_vehicle_id);
        self.next_vehicle_id += 1;

        let vehicle = Vehicle::new(id, node, self.vehicle_speed);
        let position = vehicle.position;
        self.collisions
            .update_object(id.0, Rect::around(position, self.vehicle_radius));
        self.vehicles.push(vehicle);
        self.changes
            .push((ChangeKind::Added, (id, position.x, position.y)));
        debug!("Spawned vehicle {} at {}", id, node);
        id
    }

    pub fn step(&mut self, tick: f32, grid: &TileGrid) {
        for (pos, insct) in self.intersections.iter_mut() {
            if let Some(id) = insct.step(tick, &mut self.vehicles) {
                debug!("Intersection ({}, {}) let vehicle {} through", pos.0, pos.1, id);
            }
        }

        for index in 0..self.vehicles.len() {
            let entering = self.vehicles[index].step(tick, grid, &self.geometry);
            if let Some(dir) = entering {
                self.enqueue_at_intersection(index, dir);
            }
        }

        for vehicle in &self.vehicles {
            self.collisions.update_object(
                vehicle.id.0,
                Rect::around(vehicle.position, self.vehicle_radius),
            );
        }
    }

    fn enqueue_at_intersection(&mut self, index: usize, dir: Direction) {
        let vehicle = &mut self.vehicles[index];
        let Some(cell) = self.geometry.cell_at(vehicle.position) else {
            return;
        };
        let (stop_wait_time, clear_time) = (self.stop_wait_time, self.clear_time);
        self.intersections
            .entry(cell)
            .or_insert_with(|| Intersection::new(stop_wait_time, clear_time))
            .enqueue(vehicle, dir);
        debug!(
            "Vehicle {} queued at ({}, {}) from {:?}",
            vehicle.id, cell.0, cell.1, dir
        );
    }

    pub fn vehicle(&self, id: VehicleId) -> SimResult<&Vehicle> {
        self.vehicles.get(id.0).ok_or(SimError::UnknownVehicle(id))
    }

    pub fn vehicle_mut(&mut self, id: VehicleId) -> SimResult<&mut Vehicle> {
        self.vehicles.get_mut(id.0).ok_or(SimError::UnknownVehicle(id))
    }

    /// Vehicles in creation order
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn intersection_at(&self, r: usize, c: usize) -> Option<&Intersection> {
        self.intersections.get(&(r, c))
    }

    pub fn intersection_count(&self) -> usize {
        self.intersections.len()
    }

    /// Vehicles whose footprint overlaps that of `id`
    pub fn colliding_vehicles(&self, id: VehicleId) -> SimResult<BTreeSet<VehicleId>> {
        self.vehicle(id)?;
        Ok(self
            .collisions
            .colliding_object_ids(id.0)?
            .into_iter()
            .map(VehicleId)
            .collect())
    }

    /// Return and clear pending vehicle changes. Every vehicle is reported as
    /// modified with its current position.
    pub fn drain_changes(&mut self) -> Vec<Change<(VehicleId, f32, f32)>> {
        let mut changes = std::mem::take(&mut self.changes);
        changes.extend(
            self.vehicles
                .iter()
                .map(|v| (ChangeKind::Modified, (v.id, v.position.x, v.position.y))),
        );
        changes
    }
}
