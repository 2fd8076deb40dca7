//! Travel graph of road segment entry and exit nodes
//!
//! Every road segment on a tile owns an ENTER and an EXIT node. Edges inside a
//! tile describe the turns a vehicle may make; edges between tiles bridge an
//! EXIT node to the facing ENTER node of the neighbor.

use log::{debug, warn};
use ordered_float::OrderedFloat;
use petgraph::algo::astar;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

use super::error::{SimError, SimResult};
use super::tile_grid::Neighbor;
use super::types::{Change, ChangeKind, Direction, Point, RoadNodeType, TileGeometry, TileType};

/// An ENTER or EXIT node on one road segment of one tile.
///
/// Identity is the (position, direction, node type) triple; the world point
/// is derived from those and never takes part in comparisons.
#[derive(Debug, Clone, Copy)]
pub struct RoadSegmentNode {
    pub pos: (usize, usize),
    pub dir: Direction,
    pub node_type: RoadNodeType,
    pub point: Point,
}

impl RoadSegmentNode {
    pub fn new(
        pos: (usize, usize),
        dir: Direction,
        node_type: RoadNodeType,
        geometry: &TileGeometry,
    ) -> Self {
        Self {
            pos,
            dir,
            node_type,
            point: geometry.node_point(pos.0, pos.1, dir, node_type),
        }
    }

    fn key(&self) -> ((usize, usize), Direction, RoadNodeType) {
        (self.pos, self.dir, self.node_type)
    }
}

impl PartialEq for RoadSegmentNode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for RoadSegmentNode {}

impl Hash for RoadSegmentNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for RoadSegmentNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RoadSegmentNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl std::fmt::Display for RoadSegmentNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?}({}, {}, {:?})",
            self.node_type, self.pos.0, self.pos.1, self.dir
        )
    }
}

/// All ENTER and EXIT nodes of a single tile, keyed by segment direction
#[derive(Debug, Clone)]
pub struct TravelIntersection {
    pub row: usize,
    pub col: usize,
    nodes: BTreeMap<Direction, (RoadSegmentNode, RoadSegmentNode)>,
}

impl TravelIntersection {
    pub fn new(row: usize, col: usize, tile_type: TileType, geometry: &TileGeometry) -> Self {
        let mut insct = Self {
            row,
            col,
            nodes: BTreeMap::new(),
        };
        for dir in tile_type.segment_directions() {
            insct.add_segment_nodes(dir, geometry);
        }
        insct
    }

    /// Add the ENTER and EXIT nodes for the segment on side `dir`
    pub fn add_segment_nodes(&mut self, dir: Direction, geometry: &TileGeometry) {
        let pos = (self.row, self.col);
        self.nodes.insert(
            dir,
            (
                RoadSegmentNode::new(pos, dir, RoadNodeType::Enter, geometry),
                RoadSegmentNode::new(pos, dir, RoadNodeType::Exit, geometry),
            ),
        );
    }

    /// Active segment directions in clockwise order
    pub fn segments(&self) -> Vec<Direction> {
        self.nodes.keys().copied().collect()
    }

    pub fn enter_nodes(&self) -> Vec<RoadSegmentNode> {
        self.nodes.values().map(|(enter, _)| *enter).collect()
    }

    pub fn exit_nodes(&self) -> Vec<RoadSegmentNode> {
        self.nodes.values().map(|(_, exit)| *exit).collect()
    }

    /// (ENTER, EXIT) nodes of the segment on side `dir`
    pub fn nodes_for_segment(&self, dir: Direction) -> Option<(RoadSegmentNode, RoadSegmentNode)> {
        self.nodes.get(&dir).copied()
    }
}

/// Directed graph of every road segment node in the network
#[derive(Debug)]
pub struct TravelGraph {
    geometry: TileGeometry,

    /// Edge weights are the straight-line distance between node points
    graph: DiGraph<RoadSegmentNode, OrderedFloat<f32>>,

    node_indices: HashMap<RoadSegmentNode, NodeIndex>,

    intersections: HashMap<(usize, usize), TravelIntersection>,

    changes: Vec<Change<(RoadSegmentNode, RoadSegmentNode)>>,
}

impl TravelGraph {
    pub fn new(geometry: TileGeometry) -> Self {
        Self {
            geometry,
            graph: DiGraph::new(),
            node_indices: HashMap::new(),
            intersections: HashMap::new(),
            changes: Vec::new(),
        }
    }

    pub fn geometry(&self) -> &TileGeometry {
        &self.geometry
    }

    /// Register a newly placed tile and bridge it to its registered neighbors.
    ///
    /// `neighbors` are the occupied cells around (r, c). Each of them gains a
    /// segment facing the new tile, has its turn edges rebuilt, and is linked
    /// to the new tile in both directions.
    pub fn register_tile_intersection(
        &mut self,
        r: usize,
        c: usize,
        tile_type: TileType,
        neighbors: &[Neighbor],
    ) {
        let insct = TravelIntersection::new(r, c, tile_type, &self.geometry);
        self.add_intersection_nodes(&insct);
        self.intraconnect_nodes(&insct);
        self.intersections.insert((r, c), insct);

        for neighbor in neighbors {
            let n_pos = (neighbor.row, neighbor.col);
            let Some(n_insct) = self.intersections.get_mut(&n_pos) else {
                debug!(
                    "Neighbor ({}, {}) of ({}, {}) has no travel intersection yet",
                    n_pos.0, n_pos.1, r, c
                );
                continue;
            };
            n_insct.add_segment_nodes(neighbor.dir.opposite(), &self.geometry);
            let n_insct = n_insct.clone();
            self.add_intersection_nodes(&n_insct);
            self.update_intraconnected_edges(&n_insct);

            let Some((enter, exit)) = self
                .intersections
                .get(&(r, c))
                .and_then(|i| i.nodes_for_segment(neighbor.dir))
            else {
                warn!(
                    "Tile ({}, {}) of type {:?} has no {:?} segment facing its neighbor",
                    r, c, tile_type, neighbor.dir
                );
                continue;
            };
            let Some((n_enter, n_exit)) = n_insct.nodes_for_segment(neighbor.dir.opposite())
            else {
                continue;
            };
            self.add_edge(exit, n_enter);
            self.add_edge(n_exit, enter);
        }
    }

    fn add_intersection_nodes(&mut self, insct: &TravelIntersection) {
        for node in insct.enter_nodes().into_iter().chain(insct.exit_nodes()) {
            self.ensure_node(node);
        }
    }

    /// Rebuild the turn edges of an existing intersection after it gained a
    /// segment. A dead-end U-turn is dropped once the tile has more than one
    /// segment.
    fn update_intraconnected_edges(&mut self, insct: &TravelIntersection) {
        if insct.segments().len() > 1 {
            for dir in insct.segments() {
                if let Some((enter, exit)) = insct.nodes_for_segment(dir) {
                    self.remove_edge(enter, exit);
                }
            }
        }
        self.intraconnect_nodes(insct);
    }

    /// Connect every ENTER node to the EXIT nodes of the other segments, or
    /// to its own EXIT node on a dead end
    fn intraconnect_nodes(&mut self, insct: &TravelIntersection) {
        let segments = insct.segments();
        if let [only] = segments.as_slice() {
            if let Some((enter, exit)) = insct.nodes_for_segment(*only) {
                self.add_edge(enter, exit);
            }
            return;
        }

        for enter in insct.enter_nodes() {
            for exit in insct.exit_nodes() {
                if enter.dir != exit.dir {
                    self.add_edge(enter, exit);
                }
            }
        }
    }

    fn ensure_node(&mut self, node: RoadSegmentNode) -> NodeIndex {
        if let Some(index) = self.node_indices.get(&node) {
            return *index;
        }
        let index = self.graph.add_node(node);
        self.node_indices.insert(node, index);
        index
    }

    /// Insert an edge unless it already exists. Returns whether the graph changed.
    fn add_edge(&mut self, a: RoadSegmentNode, b: RoadSegmentNode) -> bool {
        let ia = self.ensure_node(a);
        let ib = self.ensure_node(b);
        if self.graph.find_edge(ia, ib).is_some() {
            return false;
        }
        let weight = OrderedFloat(a.point.distance(&b.point));
        self.graph.add_edge(ia, ib, weight);
        debug!("Added travel edge {} -> {}", a, b);
        self.changes.push((ChangeKind::Added, (a, b)));
        true
    }

    fn remove_edge(&mut self, a: RoadSegmentNode, b: RoadSegmentNode) -> bool {
        let (Some(ia), Some(ib)) = (self.node_indices.get(&a), self.node_indices.get(&b)) else {
            return false;
        };
        let Some(edge) = self.graph.find_edge(*ia, *ib) else {
            return false;
        };
        self.graph.remove_edge(edge);
        debug!("Removed travel edge {} -> {}", a, b);
        self.changes.push((ChangeKind::Removed, (a, b)));
        true
    }

    /// Node sequence of a shortest path from `source` to `target`, both
    /// included. Costs are straight-line distances between node points.
    pub fn shortest_path(
        &self,
        source: RoadSegmentNode,
        target: RoadSegmentNode,
    ) -> SimResult<Vec<RoadSegmentNode>> {
        let start = *self
            .node_indices
            .get(&source)
            .ok_or(SimError::NodeNotFound(source))?;
        let goal = *self
            .node_indices
            .get(&target)
            .ok_or(SimError::NodeNotFound(target))?;

        let target_point = target.point;
        let (_, path) = astar(
            &self.graph,
            start,
            |node| node == goal,
            |edge| *edge.weight(),
            |node| OrderedFloat(self.graph[node].point.distance(&target_point)),
        )
        .ok_or(SimError::NoPath {
            from: source,
            to: target,
        })?;

        Ok(path.into_iter().map(|index| self.graph[index]).collect())
    }

    pub fn has_edge(&self, a: &RoadSegmentNode, b: &RoadSegmentNode) -> bool {
        match (self.node_indices.get(a), self.node_indices.get(b)) {
            (Some(ia), Some(ib)) => self.graph.find_edge(*ia, *ib).is_some(),
            _ => false,
        }
    }

    pub fn contains_node(&self, node: &RoadSegmentNode) -> bool {
        self.node_indices.contains_key(node)
    }

    /// Look up the stored node for a (position, direction, type) triple
    pub fn node(
        &self,
        pos: (usize, usize),
        dir: Direction,
        node_type: RoadNodeType,
    ) -> Option<RoadSegmentNode> {
        let probe = RoadSegmentNode::new(pos, dir, node_type, &self.geometry);
        self.node_indices.get(&probe).map(|index| self.graph[*index])
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> Vec<RoadSegmentNode> {
        self.graph.node_weights().copied().collect()
    }

    pub fn edges(&self) -> Vec<(RoadSegmentNode, RoadSegmentNode)> {
        self.graph
            .edge_references()
            .map(|edge| (self.graph[edge.source()], self.graph[edge.target()]))
            .collect()
    }

    /// Nodes reachable from `node` over a single edge
    pub fn successors(&self, node: &RoadSegmentNode) -> Vec<RoadSegmentNode> {
        self.node_indices
            .get(node)
            .map(|index| {
                self.graph
                    .neighbors(*index)
                    .map(|next| self.graph[next])
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn intersection(&self, r: usize, c: usize) -> Option<&TravelIntersection> {
        self.intersections.get(&(r, c))
    }

    pub fn intersection_count(&self) -> usize {
        self.intersections.len()
    }

    /// Return and clear all edge changes since the last drain
    pub fn drain_changes(&mut self) -> Vec<Change<(RoadSegmentNode, RoadSegmentNode)>> {
        std::mem::take(&mut self.changes)
    }
}
