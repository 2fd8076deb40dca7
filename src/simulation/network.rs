//! Road network that ties the grid, travel graph and traffic together
//!
//! This is the entry point for driving the simulation: place roads, spawn and
//! route vehicles, and step time forward.

use anyhow::{Context, Result};
use log::{debug, warn};

use super::config::SimConfig;
use super::error::{SimError, SimResult};
use super::tile_grid::TileGrid;
use super::traffic::Traffic;
use super::travel_graph::{RoadSegmentNode, TravelGraph};
use super::types::{Change, TileGeometry, TileType, VehicleId};

/// Counts reported by `RoadNetwork::summary`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkSummary {
    pub roads: usize,
    pub travel_nodes: usize,
    pub travel_edges: usize,
    pub vehicles: usize,
    pub waiting_vehicles: usize,
    pub idle_vehicles: usize,
    pub controlled_intersections: usize,
}

/// The road network simulation
#[derive(Debug)]
pub struct RoadNetwork {
    config: SimConfig,
    geometry: TileGeometry,
    grid: TileGrid,
    graph: TravelGraph,
    traffic: Traffic,
    /// Simulation time in seconds
    time: f32,
}

impl RoadNetwork {
    /// Build a network with a seed road in the middle of the grid, from which
    /// every other road has to grow
    pub fn new(config: SimConfig) -> Result<Self> {
        let mut network = Self::empty(config)?;
        let seed = (network.grid.height() / 2, network.grid.width() / 2);
        network.add_road_unrestricted(seed.0, seed.1);
        Ok(network)
    }

    /// Build a network without any roads
    pub fn empty(config: SimConfig) -> Result<Self> {
        config.validate().context("Invalid simulation config")?;
        let geometry = config.geometry();
        Ok(Self {
            grid: TileGrid::new(config.grid_width, config.grid_height),
            graph: TravelGraph::new(geometry),
            traffic: Traffic::new(&config),
            geometry,
            config,
            time: 0.0,
        })
    }

    /// Place a road next to an existing one
    pub fn add_road(&mut self, r: usize, c: usize) -> bool {
        self.place_road(r, c, true)
    }

    /// Place a road anywhere on the grid
    pub fn add_road_unrestricted(&mut self, r: usize, c: usize) -> bool {
        self.place_road(r, c, false)
    }

    fn place_road(&mut self, r: usize, c: usize, restrict_to_neighbors: bool) -> bool {
        if !self.grid.add_tile(r, c, restrict_to_neighbors) {
            debug!("Road placement at ({}, {}) rejected", r, c);
            return false;
        }

        let tile_type = self.grid.tile_type(r, c);
        let neighbors = self.grid.neighbors(r, c);
        self.graph
            .register_tile_intersection(r, c, tile_type, &neighbors);
        true
    }

    pub fn tile_type(&self, r: usize, c: usize) -> SimResult<TileType> {
        if !self.grid.in_bounds(r, c) {
            return Err(SimError::OutOfBounds { row: r, col: c });
        }
        Ok(self.grid.tile_type(r, c))
    }

    /// Spawn a vehicle on an existing travel node
    pub fn spawn_vehicle(&mut self, node: RoadSegmentNode) -> SimResult<VehicleId> {
        if !self.graph.contains_node(&node) {
            return Err(SimError::NodeNotFound(node));
        }
        Ok(self.traffic.add_vehicle(node))
    }

    /// Send a vehicle along the shortest path from its last visited node to
    /// `target`
    pub fn route_vehicle(&mut self, id: VehicleId, target: RoadSegmentNode) -> SimResult<()> {
        let start = self.traffic.vehicle(id)?.last_node();
        let path = self.graph.shortest_path(start, target).inspect_err(|e| {
            warn!("Could not route vehicle {}: {}", id, e);
        })?;
        self.traffic
            .vehicle_mut(id)?
            .set_path(path.into_iter().skip(1).collect());
        Ok(())
    }

    pub fn step(&mut self, tick: f32) {
        self.time += tick;
        self.traffic.step(tick, &self.grid);
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn geometry(&self) -> &TileGeometry {
        &self.geometry
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn graph(&self) -> &TravelGraph {
        &self.graph
    }

    pub fn traffic(&self) -> &Traffic {
        &self.traffic
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn drain_tile_changes(&mut self) -> Vec<Change<(usize, usize, TileType)>> {
        self.grid.drain_changes()
    }

    pub fn drain_graph_changes(&mut self) -> Vec<Change<(RoadSegmentNode, RoadSegmentNode)>> {
        self.graph.drain_changes()
    }

    pub fn drain_vehicle_changes(&mut self) -> Vec<Change<(VehicleId, f32, f32)>> {
        self.traffic.drain_changes()
    }

    pub fn summary(&self) -> NetworkSummary {
        let vehicles = self.traffic.vehicles();
        NetworkSummary {
            roads: self.grid.occupied_count(),
            travel_nodes: self.graph.node_count(),
            travel_edges: self.graph.edge_count(),
            vehicles: vehicles.len(),
            waiting_vehicles: vehicles.iter().filter(|v| v.is_waiting()).count(),
            idle_vehicles: vehicles.iter().filter(|v| v.is_idle()).count(),
            controlled_intersections: self.traffic.intersection_count(),
        }
    }

    /// Text dump of the grid with vehicle positions overlaid
    pub fn draw_map(&self) -> String {
        let mut rows: Vec<Vec<char>> = self
            .grid
            .to_text()
            .lines()
            .map(|line| line.chars().collect())
            .collect();
        for vehicle in self.traffic.vehicles() {
            if let Some((r, c)) = self.geometry.cell_at(vehicle.position) {
                if let Some(cell) = rows.get_mut(r).and_then(|row| row.get_mut(c)) {
                    *cell = if vehicle.is_waiting() { 'W' } else { 'C' };
                }
            }
        }
        rows.into_iter()
            .map(|row| row.into_iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
