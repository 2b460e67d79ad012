//! Grid coordinates for tiles, vertices, and edges.
//!
//! The board uses two integer grids that never mix:
//! - the **tile grid** (5×5): rows of 3, 4, 5, 4, 3 tiles, `x` counting from
//!   the left of each row
//! - the **vertex grid** (11×6): the six zig-zag lines running between tile
//!   rows, 7, 9, 11, 11, 9, 7 vertices long
//!
//! A tile at row `r` sits over vertex column `2x + 1 + |r - 2|`, and its six
//! corners are the three vertices around that column on line `r` and the three
//! on line `r + 1`.

use crate::error::BoardError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of tile rows
pub const TILE_ROWS: i32 = 5;

/// Number of vertex columns
pub const VERTEX_COLUMNS: i32 = 11;

/// Number of vertex rows
pub const VERTEX_ROWS: i32 = 6;

/// How far each vertex row is indented from the left (and right) edge
const VERTEX_MARGINS: [i32; VERTEX_ROWS as usize] = [2, 1, 0, 0, 1, 2];

/// A position on either the tile grid or the vertex grid.
///
/// Which grid a point belongs to is decided by context: board methods taking a
/// tile expect [`Point::is_tile`] to hold, methods taking a vertex expect
/// [`Point::is_vertex`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Number of tiles in a tile row
    const fn tile_row_width(row: i32) -> i32 {
        TILE_ROWS - (row - 2).abs()
    }

    /// Whether this point names a tile
    pub fn is_tile(&self) -> bool {
        (0..TILE_ROWS).contains(&self.y) && (0..Self::tile_row_width(self.y)).contains(&self.x)
    }

    /// Whether this point names a vertex
    pub fn is_vertex(&self) -> bool {
        if !(0..VERTEX_ROWS).contains(&self.y) {
            return false;
        }
        let margin = VERTEX_MARGINS[self.y as usize];
        (margin..VERTEX_COLUMNS - margin).contains(&self.x)
    }

    /// All tiles in row-major order
    pub fn tiles() -> impl Iterator<Item = Point> {
        (0..TILE_ROWS).flat_map(|y| (0..Self::tile_row_width(y)).map(move |x| Point::new(x, y)))
    }

    /// All vertices in row-major order
    pub fn vertices() -> impl Iterator<Item = Point> {
        (0..VERTEX_ROWS).flat_map(|y| {
            let margin = VERTEX_MARGINS[y as usize];
            (margin..VERTEX_COLUMNS - margin).map(move |x| Point::new(x, y))
        })
    }

    /// Vertex column under the centre of this tile
    fn tile_column(&self) -> i32 {
        2 * self.x + 1 + (self.y - 2).abs()
    }

    /// The tile whose centre sits over `column` in tile row `row`, if any
    fn tile_at_column(row: i32, column: i32) -> Option<Point> {
        let offset = column - 1 - (row - 2).abs();
        if offset < 0 || offset % 2 != 0 {
            return None;
        }
        let tile = Point::new(offset / 2, row);
        tile.is_tile().then_some(tile)
    }

    /// The six corners of this tile: top line left to right, then bottom line
    pub fn tile_vertices(&self) -> [Point; 6] {
        let c = self.tile_column();
        let (top, bottom) = (self.y, self.y + 1);
        [
            Point::new(c - 1, top),
            Point::new(c, top),
            Point::new(c + 1, top),
            Point::new(c - 1, bottom),
            Point::new(c, bottom),
            Point::new(c + 1, bottom),
        ]
    }

    /// Tiles that share an edge with this tile
    pub fn tile_neighbours(&self) -> Vec<Point> {
        let corners = self.tile_vertices();
        Point::tiles()
            .filter(|other| other != self)
            .filter(|other| {
                other
                    .tile_vertices()
                    .iter()
                    .filter(|v| corners.contains(v))
                    .count()
                    == 2
            })
            .collect()
    }

    /// Tiles touching this vertex (1 to 3 of them)
    pub fn vertex_tiles(&self) -> Vec<Point> {
        let mut tiles = Vec::with_capacity(3);
        // A vertex is on the top line of row `y` and the bottom line of row `y - 1`
        for row in [self.y - 1, self.y] {
            for column in self.x - 1..=self.x + 1 {
                if let Some(tile) = Self::tile_at_column(row, column) {
                    if tile.tile_vertices().contains(self) {
                        tiles.push(tile);
                    }
                }
            }
        }
        tiles
    }

    /// Vertices connected to this vertex by an edge (2 or 3 of them)
    pub fn vertex_neighbours(&self) -> Vec<Point> {
        let vertical = if (self.x + self.y) % 2 == 0 {
            Point::new(self.x, self.y + 1)
        } else {
            Point::new(self.x, self.y - 1)
        };
        [Point::new(self.x - 1, self.y), Point::new(self.x + 1, self.y), vertical]
            .into_iter()
            .filter(|p| p.is_vertex())
            .collect()
    }

    /// Whether `other` is one edge away from this vertex
    pub fn is_adjacent_vertex(&self, other: &Point) -> bool {
        self.is_vertex() && self.vertex_neighbours().contains(other)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An undirected edge between two adjacent vertices.
///
/// Endpoints are stored smallest first, so the same edge always compares equal
/// regardless of the order it was described in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawEdge")]
pub struct Edge {
    first: Point,
    second: Point,
}

/// An edge as read off the wire, before validation
#[derive(Deserialize)]
struct RawEdge {
    first: Point,
    second: Point,
}

impl TryFrom<RawEdge> for Edge {
    type Error = BoardError;

    fn try_from(raw: RawEdge) -> Result<Self, Self::Error> {
        Edge::new(raw.first, raw.second)
    }
}

impl Edge {
    /// Create an edge between two vertices, validating that they are adjacent
    pub fn new(a: Point, b: Point) -> Result<Self, BoardError> {
        for p in [a, b] {
            if !p.is_vertex() {
                return Err(BoardError::InvalidPoint(p));
            }
        }
        if !a.is_adjacent_vertex(&b) {
            return Err(BoardError::InvalidEdge(a, b));
        }
        Ok(Self {
            first: a.min(b),
            second: a.max(b),
        })
    }

    /// Both endpoints, smallest first
    pub fn endpoints(&self) -> [Point; 2] {
        [self.first, self.second]
    }

    /// Whether `vertex` is one of the endpoints
    pub fn touches(&self, vertex: &Point) -> bool {
        self.first == *vertex || self.second == *vertex
    }

    /// Whether the two edges share an endpoint
    pub fn shares_endpoint(&self, other: &Edge) -> bool {
        other.touches(&self.first) || other.touches(&self.second)
    }

    /// The endpoint opposite `vertex`
    pub fn other_end(&self, vertex: &Point) -> Point {
        if self.first == *vertex {
            self.second
        } else {
            self.first
        }
    }

    /// Every edge of the vertex grid
    pub fn all() -> Vec<Edge> {
        let mut edges = Vec::new();
        for v in Point::vertices() {
            for n in v.vertex_neighbours() {
                if v < n {
                    edges.push(Edge { first: v, second: n });
                }
            }
        }
        edges
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.second)
    }
}
