use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use road_sim::simulation::{
    self, Direction, RoadNetwork, RoadNodeType, RoadSegmentNode, SimConfig, SimError, VehicleId,
};

#[derive(Parser)]
#[command(name = "road_sim")]
#[command(about = "Headless road network and traffic simulation")]
struct Cli {
    /// Number of simulation ticks to run
    #[arg(long, default_value = "600")]
    ticks: u32,

    /// Time delta per tick in seconds
    #[arg(long, default_value = "0.1")]
    delta: f32,

    /// Seed for road growth and vehicle destinations
    #[arg(long)]
    seed: Option<u64>,

    /// Road placement attempts made before the simulation starts
    #[arg(long, default_value = "60")]
    roads: usize,

    /// Number of vehicles to spawn
    #[arg(long, default_value = "8")]
    vehicles: usize,

    #[arg(long, default_value_t = simulation::DEFAULT_GRID_WIDTH)]
    grid_width: usize,

    #[arg(long, default_value_t = simulation::DEFAULT_GRID_HEIGHT)]
    grid_height: usize,

    #[arg(long, default_value_t = simulation::DEFAULT_TILE_WIDTH)]
    tile_width: u32,

    #[arg(long, default_value_t = simulation::DEFAULT_TILE_HEIGHT)]
    tile_height: u32,

    #[arg(long, default_value_t = simulation::DEFAULT_ROAD_WIDTH)]
    road_width: u32,

    /// Seconds a vehicle stops before entering an intersection
    #[arg(long, default_value_t = simulation::DEFAULT_VEHICLE_STOP_WAIT_TIME)]
    stop_wait_time: f32,

    /// Seconds a released vehicle has to clear an intersection
    #[arg(long, default_value_t = simulation::DEFAULT_INTERSECTION_CLEAR_TIME)]
    clear_time: f32,

    #[arg(long, default_value_t = simulation::DEFAULT_VEHICLE_RADIUS)]
    vehicle_radius: u32,

    /// Vehicle speed in world units per second (defaults to one tile width)
    #[arg(long)]
    vehicle_speed: Option<f32>,
}

impl Cli {
    fn config(&self) -> SimConfig {
        SimConfig {
            grid_width: self.grid_width,
            grid_height: self.grid_height,
            tile_width: self.tile_width,
            tile_height: self.tile_height,
            road_width: self.road_width,
            vehicle_stop_wait_time: self.stop_wait_time,
            intersection_clear_time: self.clear_time,
            vehicle_radius: self.vehicle_radius,
            vehicle_speed: self.vehicle_speed,
        }
    }
}

/// Attempts made to find a reachable destination before giving up
const ROUTE_ATTEMPTS: usize = 10;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let seed = cli.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);

    let mut network = RoadNetwork::new(cli.config()).context("Failed to build road network")?;
    info!("Running road simulation with seed {}", seed);
    info!("Ticks: {}, Delta: {}s", cli.ticks, cli.delta);

    grow_roads(&mut network, &mut rng, cli.roads);
    info!("Placed {} roads", network.grid().occupied_count());

    let enter_nodes: Vec<RoadSegmentNode> = network
        .graph()
        .nodes()
        .into_iter()
        .filter(|n| n.node_type == RoadNodeType::Enter)
        .collect();
    if enter_nodes.is_empty() {
        warn!("Road network has no travel nodes, nothing to simulate");
        return Ok(());
    }

    // (vehicle, currently on a trip)
    let mut fleet: Vec<(VehicleId, bool)> = Vec::with_capacity(cli.vehicles);
    for _ in 0..cli.vehicles {
        let Some(node) = enter_nodes.choose(&mut rng) else {
            break;
        };
        let id = network.spawn_vehicle(*node)?;
        let on_trip = assign_destination(&mut network, &mut rng, id, &enter_nodes)?;
        fleet.push((id, on_trip));
    }

    println!("{}", network.draw_map());
    println!();

    let ticks_per_second = (1.0 / cli.delta).ceil().max(1.0) as u32;
    let mut trips_completed = 0;
    for tick in 1..=cli.ticks {
        network.step(cli.delta);

        for (id, on_trip) in fleet.iter_mut() {
            if !network.traffic().vehicle(*id)?.is_idle() {
                continue;
            }
            if *on_trip {
                trips_completed += 1;
            }
            *on_trip = assign_destination(&mut network, &mut rng, *id, &enter_nodes)?;
        }

        if tick % ticks_per_second == 0 {
            let summary = network.summary();
            info!(
                "t={:.1}s vehicles={} waiting={} intersections={}",
                network.time(),
                summary.vehicles,
                summary.waiting_vehicles,
                summary.controlled_intersections
            );
        }
    }

    let summary = network.summary();
    info!("=== SIMULATION COMPLETE ===");
    info!("Elapsed time: {:.2}s", network.time());
    info!("Total roads: {}", summary.roads);
    info!("Travel nodes: {}, edges: {}", summary.travel_nodes, summary.travel_edges);
    info!("Total vehicles: {}", summary.vehicles);
    info!("Trips completed: {}", trips_completed);
    info!("Controlled intersections: {}", summary.controlled_intersections);
    println!("{}", network.draw_map());

    Ok(())
}

/// Grow the road network outward from existing roads
fn grow_roads(network: &mut RoadNetwork, rng: &mut StdRng, attempts: usize) {
    for _ in 0..attempts {
        let occupied = network.grid().occupied_cells();
        let Some(&(r, c, _)) = occupied.choose(rng) else {
            return;
        };
        let Some(&dir) = Direction::ALL.choose(rng) else {
            continue;
        };
        if let Some((nr, nc)) = network.grid().neighbor_cell(r, c, dir) {
            network.add_road(nr, nc);
        }
    }
}

/// Route a vehicle to a random reachable ENTER node other than the one it is
/// standing on. Returns whether the vehicle has somewhere to drive.
fn assign_destination(
    network: &mut RoadNetwork,
    rng: &mut StdRng,
    id: VehicleId,
    targets: &[RoadSegmentNode],
) -> Result<bool> {
    let current = network.traffic().vehicle(id)?.last_node();
    for _ in 0..ROUTE_ATTEMPTS {
        let Some(target) = targets.choose(rng) else {
            break;
        };
        if *target == current {
            continue;
        }
        match network.route_vehicle(id, *target) {
            Ok(()) => return Ok(true),
            Err(SimError::NoPath { .. }) => continue,
            Err(e) => return Err(e).context("Failed to route vehicle"),
        }
    }
    warn!("Vehicle {} found no reachable destination", id);
    Ok(false)
}
