//! Linear trajectories and vehicle movement along a path

use road_sim::simulation::{
    Direction, LinearTrajectory, Point, RoadNetwork, RoadNodeType, SimConfig, Vehicle, VehicleId,
};

fn assert_close(actual: Point, expected: Point) {
    assert!(
        actual.distance(&expected) < 1e-3,
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}

#[test]
fn test_trajectory_partial_move() {
    let mut trajectory = LinearTrajectory::new(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
    assert_eq!(trajectory.remaining(), 5.0);

    let (point, moved) = trajectory.advance(2.0);
    assert_eq!(moved, 2.0);
    assert_close(point, Point::new(1.2, 1.6));
    assert!(!trajectory.is_finished());
    assert_eq!(trajectory.current(), point);
    assert_eq!(trajectory.target(), Point::new(3.0, 4.0));
}

#[test]
fn test_trajectory_snaps_to_target() {
    let target = Point::new(3.0, 4.0);
    let mut trajectory = LinearTrajectory::new(Point::new(0.0, 0.0), target);

    let (point, moved) = trajectory.advance(12.0);
    assert_eq!(point, target);
    assert_eq!(moved, 5.0);
    assert!(trajectory.is_finished());

    // nothing left to travel
    let (point, moved) = trajectory.advance(1.0);
    assert_eq!(point, target);
    assert_eq!(moved, 0.0);
}

/// Straight road (1, 1) - (1, 2) - (1, 3) on a 5x5 grid of 64x64 tiles
fn straight_road() -> RoadNetwork {
    let config = SimConfig {
        grid_width: 5,
        grid_height: 5,
        ..SimConfig::default()
    };
    let mut network = RoadNetwork::empty(config).unwrap();
    assert!(network.add_road_unrestricted(1, 1));
    assert!(network.add_road(1, 2));
    assert!(network.add_road(1, 3));
    network
}

#[test]
fn test_node_points() {
    let network = straight_road();
    let graph = network.graph();

    let enter = graph.node((1, 1), Direction::Right, RoadNodeType::Enter).unwrap();
    let exit = graph.node((1, 1), Direction::Right, RoadNodeType::Exit).unwrap();
    assert_eq!(network.geometry().cell_origin(1, 1), Point::new(64.0, 64.0));
    assert_eq!(network.geometry().cell_center(1, 1), Point::new(96.0, 96.0));

    // tile center (96, 96), road width 30: half a road out, a quarter road aside
    assert_eq!(enter.point, Point::new(111.0, 88.5));
    assert_eq!(exit.point, Point::new(111.0, 103.5));

    let enter = graph.node((1, 2), Direction::Left, RoadNodeType::Enter).unwrap();
    assert_eq!(enter.point, Point::new(145.0, 103.5));
}

#[test]
fn test_vehicle_follows_path_across_waypoints() {
    let mut network = straight_road();
    let graph = network.graph();
    let start = graph.node((1, 1), Direction::Right, RoadNodeType::Enter).unwrap();
    let target = graph.node((1, 3), Direction::Left, RoadNodeType::Enter).unwrap();

    let id = network.spawn_vehicle(start).unwrap();
    assert_eq!(id, VehicleId(0));
    network.route_vehicle(id, target).unwrap();

    let vehicle = network.traffic().vehicle(id).unwrap();
    assert_eq!(vehicle.position, start.point);
    assert_eq!(vehicle.path().len(), 4);
    assert_eq!(vehicle.destination(), Some(target));
    assert_eq!(
        vehicle.target(),
        network.graph().node((1, 1), Direction::Right, RoadNodeType::Exit)
    );

    // 64 units: 15 for the U-turn, 34 to the next tile, 15 of the 30 across it
    network.step(1.0);
    let vehicle = network.traffic().vehicle(id).unwrap();
    assert_eq!(vehicle.position, Point::new(160.0, 103.5));
    assert_eq!(vehicle.path().len(), 2);
    assert_eq!(
        vehicle.last_node(),
        network
            .graph()
            .node((1, 2), Direction::Left, RoadNodeType::Enter)
            .unwrap()
    );

    network.step(1.0);
    let vehicle = network.traffic().vehicle(id).unwrap();
    assert_eq!(vehicle.position, target.point);
    assert!(vehicle.is_idle());
    assert_eq!(vehicle.last_node(), target);
}

#[test]
fn test_vehicle_without_path_stays_put() {
    let network = straight_road();
    let start = network
        .graph()
        .node((1, 2), Direction::Left, RoadNodeType::Enter)
        .unwrap();
    let mut vehicle = Vehicle::new(VehicleId(7), start, 64.0);

    assert_eq!(
        vehicle.step(1.0, network.grid(), network.geometry()),
        None
    );
    assert_eq!(vehicle.position, start.point);
    assert!(vehicle.is_idle());
}

#[test]
fn test_waiting_vehicle_does_not_move() {
    let network = straight_road();
    let graph = network.graph();
    let start = graph.node((1, 2), Direction::Left, RoadNodeType::Enter).unwrap();
    let next = graph.node((1, 2), Direction::Right, RoadNodeType::Exit).unwrap();

    let mut vehicle = Vehicle::new(VehicleId(0), start, 64.0);
    vehicle.set_path(vec![next]);
    vehicle.set_waiting(true);

    vehicle.step(1.0, network.grid(), network.geometry());
    assert_eq!(vehicle.position, start.point);

    vehicle.set_waiting(false);
    vehicle.step(0.25, network.grid(), network.geometry());
    assert_close(vehicle.position, Point::new(161.0, 103.5));
}
