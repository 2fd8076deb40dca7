//! Travel graph construction and routing

use std::collections::BTreeSet;

use road_sim::simulation::{
    ChangeKind, Direction, RoadNetwork, RoadNodeType, RoadSegmentNode, SimConfig, SimError,
    TileGeometry, TileGrid, TravelGraph,
};

fn small_network() -> RoadNetwork {
    let config = SimConfig {
        grid_width: 5,
        grid_height: 5,
        ..SimConfig::default()
    };
    RoadNetwork::empty(config).unwrap()
}

fn node(network: &RoadNetwork, pos: (usize, usize), dir: Direction, t: RoadNodeType) -> RoadSegmentNode {
    network
        .graph()
        .node(pos, dir, t)
        .unwrap_or_else(|| panic!("missing {:?} node at {:?} {:?}", t, pos, dir))
}

/// Edges whose endpoints are both on (r, c)
fn intra_edges(network: &RoadNetwork, r: usize, c: usize) -> BTreeSet<(RoadSegmentNode, RoadSegmentNode)> {
    network
        .graph()
        .edges()
        .into_iter()
        .filter(|(a, b)| a.pos == (r, c) && b.pos == (r, c))
        .collect()
}

/// A plus shape centered on (2, 2) with an extra dead end hanging off (0, 2)
fn plus_network() -> RoadNetwork {
    let mut network = small_network();
    assert!(network.add_road_unrestricted(2, 2));
    for (r, c) in [(1, 2), (2, 3), (3, 2), (2, 1), (0, 2), (0, 3)] {
        assert!(network.add_road(r, c), "({}, {})", r, c);
    }
    network
}

#[test]
fn test_intra_tile_edge_law() {
    let network = plus_network();

    for (r, c, tile_type) in network.grid().occupied_cells() {
        let dirs = tile_type.segment_directions();
        let enter = |d: Direction| node(&network, (r, c), d, RoadNodeType::Enter);
        let exit = |d: Direction| node(&network, (r, c), d, RoadNodeType::Exit);

        let expected: BTreeSet<_> = if dirs.len() == 1 {
            [(enter(dirs[0]), exit(dirs[0]))].into_iter().collect()
        } else {
            dirs.iter()
                .flat_map(|d1| {
                    dirs.iter()
                        .filter(move |d2| *d2 != d1)
                        .map(move |d2| (enter(*d1), exit(*d2)))
                })
                .collect()
        };

        assert_eq!(intra_edges(&network, r, c), expected, "tile ({}, {}) {:?}", r, c, tile_type);
    }
}

#[test]
fn test_node_set_matches_tile_segments() {
    let network = plus_network();

    for (r, c, tile_type) in network.grid().occupied_cells() {
        let insct = network.graph().intersection(r, c).unwrap();
        assert_eq!(insct.segments(), tile_type.segment_directions());
        assert_eq!(insct.enter_nodes().len(), insct.segments().len());
        assert_eq!(insct.exit_nodes().len(), insct.segments().len());
    }
    assert_eq!(
        network.graph().intersection_count(),
        network.grid().occupied_count()
    );
}

#[test]
fn test_nodes_lie_inside_their_tile() {
    let network = plus_network();
    let geometry = network.geometry();
    for n in network.graph().nodes() {
        assert_eq!(geometry.cell_at(n.point), Some(n.pos), "{}", n);
    }
}

#[test]
fn test_alone_tile_has_no_nodes() {
    let mut network = small_network();
    assert!(network.add_road_unrestricted(2, 2));
    assert_eq!(network.graph().node_count(), 0);
    assert_eq!(network.graph().edge_count(), 0);
    assert!(network.graph().intersection(2, 2).unwrap().segments().is_empty());
}

#[test]
fn test_neighbor_bridging() {
    let mut network = small_network();
    assert!(network.add_road_unrestricted(1, 1));
    assert!(network.add_road(1, 2));

    let a_exit = node(&network, (1, 1), Direction::Right, RoadNodeType::Exit);
    let a_enter = node(&network, (1, 1), Direction::Right, RoadNodeType::Enter);
    let b_exit = node(&network, (1, 2), Direction::Left, RoadNodeType::Exit);
    let b_enter = node(&network, (1, 2), Direction::Left, RoadNodeType::Enter);

    let graph = network.graph();
    assert!(graph.has_edge(&a_exit, &b_enter));
    assert!(graph.has_edge(&b_exit, &a_enter));
    // dead-end U-turns on both tiles
    assert!(graph.has_edge(&a_enter, &a_exit));
    assert!(graph.has_edge(&b_enter, &b_exit));
    assert_eq!(graph.edge_count(), 4);

    assert_eq!(graph.successors(&a_exit), vec![b_enter]);
    assert_eq!(graph.successors(&a_enter), vec![a_exit]);
}

#[test]
fn test_stale_u_turn_is_removed() {
    let mut network = small_network();
    assert!(network.add_road_unrestricted(1, 1));
    assert!(network.add_road(1, 2));
    network.drain_graph_changes();

    let b_enter = node(&network, (1, 2), Direction::Left, RoadNodeType::Enter);
    let b_exit = node(&network, (1, 2), Direction::Left, RoadNodeType::Exit);

    assert!(network.add_road(1, 3));
    assert!(!network.graph().has_edge(&b_enter, &b_exit));

    let changes = network.drain_graph_changes();
    assert!(changes.contains(&(ChangeKind::Removed, (b_enter, b_exit))));
    let b_right_exit = node(&network, (1, 2), Direction::Right, RoadNodeType::Exit);
    assert!(changes.contains(&(ChangeKind::Added, (b_enter, b_right_exit))));
    assert!(network.drain_graph_changes().is_empty());
}

#[test]
fn test_reregistering_adds_no_duplicate_edges() {
    let geometry = TileGeometry::new(64, 64, 30);
    let mut grid = TileGrid::new(4, 4);
    let mut graph = TravelGraph::new(geometry);

    for (r, c, restrict) in [(1, 1, false), (1, 2, true), (2, 2, true), (1, 3, true)] {
        assert!(grid.add_tile(r, c, restrict));
        graph.register_tile_intersection(r, c, grid.tile_type(r, c), &grid.neighbors(r, c));
    }
    graph.drain_changes();
    let edges_before: BTreeSet<_> = graph.edges().into_iter().collect();
    let edge_count = graph.edge_count();

    graph.register_tile_intersection(1, 3, grid.tile_type(1, 3), &grid.neighbors(1, 3));

    assert_eq!(graph.edge_count(), edge_count);
    assert_eq!(graph.edges().into_iter().collect::<BTreeSet<_>>(), edges_before);
    assert!(graph.drain_changes().is_empty());
}

#[test]
fn test_shortest_path_along_a_straight_road() {
    let mut network = small_network();
    assert!(network.add_road_unrestricted(1, 1));
    assert!(network.add_road(1, 2));
    assert!(network.add_road(1, 3));

    let source = node(&network, (1, 1), Direction::Right, RoadNodeType::Enter);
    let target = node(&network, (1, 3), Direction::Left, RoadNodeType::Enter);
    let path = network.graph().shortest_path(source, target).unwrap();

    assert_eq!(
        path,
        vec![
            source,
            node(&network, (1, 1), Direction::Right, RoadNodeType::Exit),
            node(&network, (1, 2), Direction::Left, RoadNodeType::Enter),
            node(&network, (1, 2), Direction::Right, RoadNodeType::Exit),
            target,
        ]
    );

    for pair in path.windows(2) {
        assert!(network.graph().has_edge(&pair[0], &pair[1]));
    }
}

#[test]
fn test_shortest_path_is_deterministic() {
    let network = plus_network();
    let source = node(&network, (2, 1), Direction::Right, RoadNodeType::Enter);
    let target = node(&network, (0, 3), Direction::Left, RoadNodeType::Enter);

    let first = network.graph().shortest_path(source, target).unwrap();
    let second = network.graph().shortest_path(source, target).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.first(), Some(&source));
    assert_eq!(first.last(), Some(&target));
    for pair in first.windows(2) {
        assert!(network.graph().has_edge(&pair[0], &pair[1]));
    }
}

#[test]
fn test_shortest_path_between_disconnected_roads() {
    let mut network = small_network();
    assert!(network.add_road_unrestricted(0, 0));
    assert!(network.add_road(0, 1));
    assert!(network.add_road_unrestricted(3, 3));
    assert!(network.add_road(3, 4));

    let source = node(&network, (0, 0), Direction::Right, RoadNodeType::Enter);
    let target = node(&network, (3, 3), Direction::Right, RoadNodeType::Enter);

    let err = network.graph().shortest_path(source, target).unwrap_err();
    assert_eq!(err, SimError::NoPath { from: source, to: target });
}

#[test]
fn test_shortest_path_unknown_node() {
    let mut network = small_network();
    assert!(network.add_road_unrestricted(0, 0));
    assert!(network.add_road(0, 1));

    let source = node(&network, (0, 0), Direction::Right, RoadNodeType::Enter);
    let missing = RoadSegmentNode::new((4, 4), Direction::Up, RoadNodeType::Enter, network.geometry());

    assert!(matches!(
        network.graph().shortest_path(source, missing),
        Err(SimError::NodeNotFound(n)) if n == missing
    ));
}

#[test]
fn test_node_identity_ignores_point() {
    let a = RoadSegmentNode::new((1, 1), Direction::Up, RoadNodeType::Exit, &TileGeometry::new(64, 64, 30));
    let b = RoadSegmentNode::new((1, 1), Direction::Up, RoadNodeType::Exit, &TileGeometry::new(32, 32, 10));
    assert_ne!(a.point, b.point);
    assert_eq!(a, b);
}
