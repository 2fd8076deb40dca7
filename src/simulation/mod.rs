//! Road network simulation
//!
//! A tile automaton that infers road shapes, the travel graph built from those
//! shapes, stop-sign intersections and the vehicles they govern. Runs without
//! any rendering or windowing and is driven one tick at a time.

mod collision;
mod config;
mod error;
mod intersection;
mod network;
mod tile_grid;
mod traffic;
mod trajectory;
mod travel_graph;
mod types;
mod vehicle;

pub use collision::{CollisionTileGrid, Rect};
pub use config::{
    SimConfig, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, DEFAULT_INTERSECTION_CLEAR_TIME,
    DEFAULT_ROAD_WIDTH, DEFAULT_TILE_HEIGHT, DEFAULT_TILE_WIDTH, DEFAULT_VEHICLE_RADIUS,
    DEFAULT_VEHICLE_STOP_WAIT_TIME,
};
pub use error::{SimError, SimResult};
pub use intersection::Intersection;
pub use network::{NetworkSummary, RoadNetwork};
pub use tile_grid::{Neighbor, TileGrid};
pub use traffic::Traffic;
pub use trajectory::LinearTrajectory;
pub use travel_graph::{RoadSegmentNode, TravelGraph, TravelIntersection};
pub use types::{
    Change, ChangeKind, Direction, Point, RoadNodeType, TileGeometry, TileType, VehicleId,
};
pub use vehicle::Vehicle;
