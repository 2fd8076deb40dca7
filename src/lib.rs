//! Road Network Simulation Library
//!
//! Tile-based road building, travel graph routing and stop-sign traffic,
//! stepped headlessly by whatever drives it.

pub mod simulation;
