//! Vehicle movement along travel graph paths
//!
//! Vehicles move at constant speed from waypoint to waypoint and stop dead
//! when they reach the ENTER node of an intersection tile.

use log::trace;
use std::collections::VecDeque;

use super::tile_grid::TileGrid;
use super::trajectory::LinearTrajectory;
use super::travel_graph::RoadSegmentNode;
use super::types::{Direction, Point, RoadNodeType, TileGeometry, VehicleId};

/// A vehicle travelling over the travel graph
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: VehicleId,
    /// World units per second
    pub speed: f32,
    pub position: Point,
    /// Waypoints still to visit, adjacent pairs joined by travel graph edges
    path: VecDeque<RoadSegmentNode>,
    last_node: RoadSegmentNode,
    trajectory: Option<LinearTrajectory>,
    waiting_at_intersection: bool,
}

impl Vehicle {
    /// Create a vehicle parked on `node`
    pub fn new(id: VehicleId, node: RoadSegmentNode, speed: f32) -> Self {
        Self {
            id,
            speed,
            position: node.point,
            path: VecDeque::new(),
            last_node: node,
            trajectory: None,
            waiting_at_intersection: false,
        }
    }

    /// Replace the pending waypoints
    pub fn set_path(&mut self, path: Vec<RoadSegmentNode>) {
        self.trajectory = None;
        self.path = path.into();
    }

    pub fn path(&self) -> &VecDeque<RoadSegmentNode> {
        &self.path
    }

    /// The node most recently reached (the spawn node before any movement)
    pub fn last_node(&self) -> RoadSegmentNode {
        self.last_node
    }

    pub fn target(&self) -> Option<RoadSegmentNode> {
        self.path.front().copied()
    }

    pub fn destination(&self) -> Option<RoadSegmentNode> {
        self.path.back().copied()
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting_at_intersection
    }

    pub fn set_waiting(&mut self, waiting: bool) {
        self.waiting_at_intersection = waiting;
    }

    /// Nothing left to drive and not held at an intersection
    pub fn is_idle(&self) -> bool {
        self.path.is_empty() && !self.waiting_at_intersection
    }

    /// Move `speed * tick` along the path, picking up the next waypoint
    /// whenever one is reached mid-step.
    ///
    /// Returns the side the vehicle arrived from when it has just reached the
    /// ENTER node of an intersection tile and must queue there.
    pub fn step(&mut self, tick: f32, grid: &TileGrid, geometry: &TileGeometry) -> Option<Direction> {
        let mut budget = self.speed * tick;

        while !self.waiting_at_intersection && budget > 0.0 {
            let target = self.target()?;

            let start = self.position;
            let trajectory = self
                .trajectory
                .get_or_insert_with(|| LinearTrajectory::new(start, target.point));
            let (position, moved) = trajectory.advance(budget);
            self.position = position;
            budget -= moved;

            if self.position != target.point {
                continue;
            }

            self.path.pop_front();
            self.last_node = target;
            self.trajectory = None;
            trace!("Vehicle {} reached {}", self.id, target);

            if target.node_type == RoadNodeType::Enter && Self::is_intersection_at(grid, geometry, position) {
                return Some(target.dir);
            }
        }

        None
    }

    fn is_intersection_at(grid: &TileGrid, geometry: &TileGeometry, point: Point) -> bool {
        geometry
            .cell_at(point)
            .map(|(r, c)| grid.tile_type(r, c).is_intersection())
            .unwrap_or(false)
    }
}
