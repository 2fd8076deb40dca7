//! Simulation error type.

use thiserror::Error;

use super::travel_graph::RoadSegmentNode;
use super::types::VehicleId;

/// Errors produced by the road network simulation.
///
/// Road placement is not an error: `add_tile`/`add_road` report failure with a
/// plain `false`.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("no path from {from} to {to}")]
    NoPath {
        from: RoadSegmentNode,
        to: RoadSegmentNode,
    },

    #[error("node {0} not found in travel graph")]
    NodeNotFound(RoadSegmentNode),

    #[error("collision object {0} not found")]
    UnknownObject(usize),

    #[error("vehicle {0} not found")]
    UnknownVehicle(VehicleId),

    #[error("cell ({row}, {col}) is outside the grid")]
    OutOfBounds { row: usize, col: usize },
}

pub type SimResult<T> = Result<T, SimError>;
