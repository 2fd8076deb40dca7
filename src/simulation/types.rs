//! Core types for the road network simulation
//!
//! Directions, tile shapes, change-feed entries and the world geometry that
//! maps grid cells and road segments to world coordinates.

/// A unique identifier for a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VehicleId(pub usize);

impl std::fmt::Display for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the four sides of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All directions in clockwise order, starting with `Up`
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// The next direction in clockwise order
    pub fn clockwise(self) -> Direction {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }

    /// Position in `Direction::ALL`, also the bit used in neighbor masks
    pub fn index(self) -> usize {
        self as usize
    }

    /// Row/column delta of the neighboring cell on this side
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
        }
    }

    /// World-space unit vector pointing out of the tile (y grows downward)
    pub fn unit(self) -> (f32, f32) {
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Right => (1.0, 0.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
        }
    }
}

/// Road shape of a tile, named by the directions it connects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileType {
    /// No road
    Empty,
    /// A road with no neighbors
    Alone,
    Up,
    Right,
    Down,
    Left,
    /// ╚
    UpRight,
    /// ╔
    RightDown,
    /// ╗
    DownLeft,
    /// ╝
    UpLeft,
    /// ║
    UpDown,
    /// ═
    RightLeft,
    /// ╠
    UpRightDown,
    /// ╦
    RightDownLeft,
    /// ╣
    UpDownLeft,
    /// ╩
    UpRightLeft,
    /// ╬
    UpRightDownLeft,
}

/// Occupied-neighbor mask to shape. Bit `i` is set when the neighbor in
/// `Direction::ALL[i]` holds a road.
const MASK_TO_TILE: [TileType; 16] = [
    TileType::Alone,           // ----
    TileType::Up,              // U---
    TileType::Right,           // -R--
    TileType::UpRight,         // UR--
    TileType::Down,            // --D-
    TileType::UpDown,          // U-D-
    TileType::RightDown,       // -RD-
    TileType::UpRightDown,     // URD-
    TileType::Left,            // ---L
    TileType::UpLeft,          // U--L
    TileType::RightLeft,       // -R-L
    TileType::UpRightLeft,     // UR-L
    TileType::DownLeft,        // --DL
    TileType::UpDownLeft,      // U-DL
    TileType::RightDownLeft,   // -RDL
    TileType::UpRightDownLeft, // URDL
];

impl TileType {
    /// Shape of an occupied tile whose occupied neighbors are given by `mask`
    pub fn from_mask(mask: u8) -> TileType {
        MASK_TO_TILE[(mask & 0b1111) as usize]
    }

    /// Neighbor mask encoded by this shape. `Empty` and `Alone` are both 0.
    pub fn mask(self) -> u8 {
        match self {
            TileType::Empty | TileType::Alone => 0b0000,
            TileType::Up => 0b0001,
            TileType::Right => 0b0010,
            TileType::UpRight => 0b0011,
            TileType::Down => 0b0100,
            TileType::UpDown => 0b0101,
            TileType::RightDown => 0b0110,
            TileType::UpRightDown => 0b0111,
            TileType::Left => 0b1000,
            TileType::UpLeft => 0b1001,
            TileType::RightLeft => 0b1010,
            TileType::UpRightLeft => 0b1011,
            TileType::DownLeft => 0b1100,
            TileType::UpDownLeft => 0b1101,
            TileType::RightDownLeft => 0b1110,
            TileType::UpRightDownLeft => 0b1111,
        }
    }

    /// Directions of the road segments on this tile, in clockwise order
    pub fn segment_directions(self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|d| self.has_segment(*d))
            .collect()
    }

    pub fn has_segment(self, dir: Direction) -> bool {
        self.mask() & (1 << dir.index()) != 0
    }

    /// Tiles joining three or four segments are controlled intersections
    pub fn is_intersection(self) -> bool {
        self.mask().count_ones() >= 3
    }

    pub fn is_empty(self) -> bool {
        self == TileType::Empty
    }

    /// Character used when dumping the grid as text
    pub fn glyph(self) -> char {
        match self {
            TileType::Empty => ' ',
            TileType::Alone => '□',
            TileType::Up | TileType::Down | TileType::UpDown => '║',
            TileType::Right | TileType::Left | TileType::RightLeft => '═',
            TileType::UpRight => '╚',
            TileType::RightDown => '╔',
            TileType::DownLeft => '╗',
            TileType::UpLeft => '╝',
            TileType::UpRightDown => '╠',
            TileType::RightDownLeft => '╦',
            TileType::UpDownLeft => '╣',
            TileType::UpRightLeft => '╩',
            TileType::UpRightDownLeft => '╬',
        }
    }
}

/// Whether a road segment node takes traffic into or out of its tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RoadNodeType {
    Enter,
    Exit,
}

/// Kind of entry in a change feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

/// A change-feed entry, drained by whoever renders the simulation
pub type Change<T> = (ChangeKind, T);

/// A 2D position in world space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn lerp(&self, other: &Point, t: f32) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Tile and road dimensions shared by everything that converts between grid
/// cells and world coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileGeometry {
    pub tile_width: f32,
    pub tile_height: f32,
    pub road_width: f32,
}

impl TileGeometry {
    pub fn new(tile_width: u32, tile_height: u32, road_width: u32) -> Self {
        Self {
            tile_width: tile_width as f32,
            tile_height: tile_height as f32,
            road_width: road_width as f32,
        }
    }

    /// Top-left corner of a cell
    pub fn cell_origin(&self, r: usize, c: usize) -> Point {
        Point::new(c as f32 * self.tile_width, r as f32 * self.tile_height)
    }

    pub fn cell_center(&self, r: usize, c: usize) -> Point {
        let origin = self.cell_origin(r, c);
        Point::new(
            origin.x + self.tile_width / 2.0,
            origin.y + self.tile_height / 2.0,
        )
    }

    /// Cell containing a world point, `None` left of or above the grid
    pub fn cell_at(&self, point: Point) -> Option<(usize, usize)> {
        let row = (point.y / self.tile_height).floor();
        let col = (point.x / self.tile_width).floor();
        if row < 0.0 || col < 0.0 || !row.is_finite() || !col.is_finite() {
            return None;
        }
        Some((row as usize, col as usize))
    }

    /// World position of a road segment node.
    ///
    /// Nodes sit where the segment meets the central road square of the tile,
    /// shifted a quarter road width to the driver's right. ENTER nodes carry
    /// traffic heading into the tile, EXIT nodes traffic heading out.
    pub fn node_point(&self, r: usize, c: usize, dir: Direction, node_type: RoadNodeType) -> Point {
        let center = self.cell_center(r, c);
        let (ux, uy) = dir.unit();
        let (hx, hy) = match node_type {
            RoadNodeType::Enter => (-ux, -uy),
            RoadNodeType::Exit => (ux, uy),
        };
        // right-hand side of heading h with y pointing down
        let (rx, ry) = (-hy, hx);
        let half = self.road_width / 2.0;
        let lane = self.road_width / 4.0;
        Point::new(
            center.x + ux * half + rx * lane,
            center.y + uy * half + ry * lane,
        )
    }
}
