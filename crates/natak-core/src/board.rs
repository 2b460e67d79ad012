//! Game board representation including tiles, buildings, and ports.
//!
//! This module contains:
//! - Resource, colour and tile types
//! - Houses (villages and towns), roads and ports
//! - Placement validation, each with a pure `check_*` counterpart
//! - Resource production for a dice roll
//! - Longest road tracking

use crate::cards::{ItemKind, ItemManager};
use crate::error::BoardError;
use crate::geometry::{Edge, Point};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Shortest road that can hold the longest road bonus
pub const LONGEST_ROAD_MINIMUM: u32 = 5;

/// Player colour, which doubles as the player's identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Colour {
    Red,
    Blue,
    Green,
    Yellow,
}

impl Colour {
    /// Colours in seating order
    pub const ALL: [Colour; 4] = [Colour::Red, Colour::Blue, Colour::Green, Colour::Yellow];
}

/// Resource types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Resource {
    Brick,
    Grain,
    Ore,
    Wool,
    Wood,
}

impl ItemKind for Resource {
    const ALL: &'static [Self] = &[
        Resource::Brick,
        Resource::Grain,
        Resource::Ore,
        Resource::Wool,
        Resource::Wood,
    ];
}

/// Type of tile on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    /// Produces a resource when its number is rolled
    Resource(Resource),
    /// Never produces; the thief starts here
    Desert,
}

/// A single tile on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    /// Dice total that activates this tile (0 for the desert)
    pub number: u8,
    pub position: Point,
}

impl Tile {
    pub fn new(kind: TileKind, number: u8, position: Point) -> Self {
        Self {
            kind,
            number,
            position,
        }
    }

    /// The resource this tile produces, if any
    pub fn resource(&self) -> Option<Resource> {
        match self.kind {
            TileKind::Resource(r) => Some(r),
            TileKind::Desert => None,
        }
    }
}

/// Port types for maritime trading
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PortKind {
    /// 3:1 trade any resource
    Generic,
    /// 2:1 trade for a specific resource
    Specific(Resource),
}

impl PortKind {
    /// The exchange rate for this port
    pub fn rate(&self) -> u32 {
        match self {
            PortKind::Generic => 3,
            PortKind::Specific(_) => 2,
        }
    }
}

/// One coastal vertex served by a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub kind: PortKind,
    pub position: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HouseKind {
    Village,
    Town,
}

impl HouseKind {
    /// Victory points for this building
    pub fn points(&self) -> u32 {
        match self {
            HouseKind::Village => 1,
            HouseKind::Town => 2,
        }
    }

    /// Cards produced per activated tile
    pub fn yield_count(&self) -> u32 {
        self.points()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct House {
    pub owner: Colour,
    pub kind: HouseKind,
    pub position: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Road {
    pub owner: Colour,
    pub edge: Edge,
}

/// How a new road must connect to the builder's network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    /// Must touch this vertex (the village just placed during setup)
    Anchored(Point),
    /// Must touch one of the builder's roads or buildings
    Connected,
}

/// Current holder of the longest road bonus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongestRoad {
    pub colour: Colour,
    pub length: u32,
}

/// The longest road bonus moving to a new holder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongestRoadChange {
    pub previous: Option<Colour>,
    pub holder: Colour,
    pub length: u32,
}

/// Coastal edges holding the nine harbours, clockwise from the top
const PORT_EDGES: [((i32, i32), (i32, i32)); 9] = [
    ((3, 0), (4, 0)),
    ((6, 0), (7, 0)),
    ((8, 1), (9, 1)),
    ((10, 2), (10, 3)),
    ((9, 4), (8, 4)),
    ((7, 5), (6, 5)),
    ((4, 5), (3, 5)),
    ((2, 4), (1, 4)),
    ((0, 3), (0, 2)),
];

/// The game board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    tiles: Vec<Tile>,
    houses: Vec<House>,
    roads: Vec<Road>,
    ports: Vec<Port>,
    thief: Point,
    road_lengths: BTreeMap<Colour, u32>,
    longest_road: Option<LongestRoad>,
}

impl Board {
    /// Create a board from a fixed layout. The thief starts on the desert,
    /// or on the first tile if there is none.
    pub fn new(tiles: Vec<Tile>, ports: Vec<Port>) -> Self {
        let thief = tiles
            .iter()
            .find(|t| t.kind == TileKind::Desert)
            .or_else(|| tiles.first())
            .map(|t| t.position)
            .unwrap_or_default();
        Self {
            tiles,
            houses: Vec::new(),
            roads: Vec::new(),
            ports,
            thief,
            road_lengths: BTreeMap::new(),
            longest_road: None,
        }
    }

    /// Create the standard board with shuffled tiles, numbers and ports
    pub fn standard_with_rng<R: Rng>(rng: &mut R) -> Self {
        // 4 wood, 4 grain, 4 wool, 3 ore, 3 brick, 1 desert
        let mut kinds: Vec<TileKind> = [
            (Resource::Wood, 4),
            (Resource::Grain, 4),
            (Resource::Wool, 4),
            (Resource::Ore, 3),
            (Resource::Brick, 3),
        ]
        .into_iter()
        .flat_map(|(r, n)| std::iter::repeat(TileKind::Resource(r)).take(n))
        .collect();
        kinds.push(TileKind::Desert);
        kinds.shuffle(rng);

        let positions: Vec<Point> = Point::tiles().collect();
        let resource_positions: Vec<Point> = positions
            .iter()
            .zip(&kinds)
            .filter(|(_, kind)| **kind != TileKind::Desert)
            .map(|(p, _)| *p)
            .collect();
        let numbers = Self::assign_numbers(&resource_positions, rng);

        let mut numbers = numbers.into_iter();
        let tiles = positions
            .into_iter()
            .zip(kinds)
            .map(|(position, kind)| {
                let number = match kind {
                    TileKind::Desert => 0,
                    TileKind::Resource(_) => numbers.next().unwrap_or(0),
                };
                Tile::new(kind, number, position)
            })
            .collect();

        let mut port_kinds = vec![PortKind::Generic; 4];
        port_kinds.extend(Resource::ALL.iter().map(|&r| PortKind::Specific(r)));
        port_kinds.shuffle(rng);

        let ports = PORT_EDGES
            .iter()
            .zip(port_kinds)
            .flat_map(|(&((ax, ay), (bx, by)), kind)| {
                [
                    Port {
                        kind,
                        position: Point::new(ax, ay),
                    },
                    Port {
                        kind,
                        position: Point::new(bx, by),
                    },
                ]
            })
            .collect();

        Self::new(tiles, ports)
    }

    /// Shuffle the dice numbers until no 6 and 8 sit on neighbouring tiles
    fn assign_numbers<R: Rng>(positions: &[Point], rng: &mut R) -> Vec<u8> {
        const MAX_ATTEMPTS: usize = 100;
        let mut numbers: Vec<u8> = vec![2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

        for _ in 0..MAX_ATTEMPTS {
            numbers.shuffle(rng);
            if Self::is_valid_number_placement(positions, &numbers) {
                break;
            }
        }
        numbers
    }

    fn is_valid_number_placement(positions: &[Point], numbers: &[u8]) -> bool {
        let hot: Vec<Point> = positions
            .iter()
            .zip(numbers)
            .filter(|(_, n)| **n == 6 || **n == 8)
            .map(|(p, _)| *p)
            .collect();
        hot.iter()
            .all(|tile| tile.tile_neighbours().iter().all(|n| !hot.contains(n)))
    }

    // ====== Queries ======

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, position: Point) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.position == position)
    }

    pub fn houses(&self) -> &[House] {
        &self.houses
    }

    pub fn house_at(&self, position: Point) -> Option<&House> {
        self.houses.iter().find(|h| h.position == position)
    }

    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    pub fn road_at(&self, edge: Edge) -> Option<&Road> {
        self.roads.iter().find(|r| r.edge == edge)
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn port_at(&self, position: Point) -> Option<PortKind> {
        self.ports
            .iter()
            .find(|p| p.position == position)
            .map(|p| p.kind)
    }

    /// Tile currently holding the thief
    pub fn thief(&self) -> Point {
        self.thief
    }

    /// Longest simple path through one colour's roads
    pub fn road_length(&self, colour: Colour) -> u32 {
        self.road_lengths.get(&colour).copied().unwrap_or(0)
    }

    pub fn longest_road(&self) -> Option<LongestRoad> {
        self.longest_road
    }

    /// Resources of the tiles around a vertex, one per tile (deserts skipped)
    pub fn vertex_resources(&self, vertex: Point) -> Vec<Resource> {
        vertex
            .vertex_tiles()
            .into_iter()
            .filter_map(|t| self.tile(t).and_then(Tile::resource))
            .collect()
    }

    /// Colours owning a house on one of the tile's corners
    pub fn colours_at_tile(&self, tile: Point) -> BTreeSet<Colour> {
        if !tile.is_tile() {
            return BTreeSet::new();
        }
        tile.tile_vertices()
            .iter()
            .filter_map(|v| self.house_at(*v))
            .map(|h| h.owner)
            .collect()
    }

    fn has_own_road_at(&self, vertex: Point, colour: Colour) -> bool {
        self.roads
            .iter()
            .any(|r| r.owner == colour && r.edge.touches(&vertex))
    }

    fn has_own_house_at(&self, vertex: Point, colour: Colour) -> bool {
        self.house_at(vertex).is_some_and(|h| h.owner == colour)
    }

    // ====== Validation ======

    /// Check that `colour` may build a village at `vertex`
    pub fn check_house(&self, vertex: Point, colour: Colour, setup: bool) -> Result<(), BoardError> {
        if !vertex.is_vertex() {
            return Err(BoardError::InvalidPoint(vertex));
        }
        if self.house_at(vertex).is_some() {
            return Err(BoardError::OccupiedVertex);
        }
        if vertex
            .vertex_neighbours()
            .iter()
            .any(|n| self.house_at(*n).is_some())
        {
            return Err(BoardError::TooClose);
        }
        if !setup && !self.has_own_road_at(vertex, colour) {
            return Err(BoardError::NotConnected);
        }
        Ok(())
    }

    /// Check that `colour` may build a road between two vertices
    pub fn check_road(
        &self,
        first: Point,
        second: Point,
        colour: Colour,
        connection: Connection,
    ) -> Result<Edge, BoardError> {
        let edge = Edge::new(first, second)?;
        if self.road_at(edge).is_some() {
            return Err(BoardError::RoadExists);
        }
        let connected = match connection {
            Connection::Anchored(anchor) => edge.touches(&anchor),
            Connection::Connected => edge.endpoints().iter().any(|&v| {
                self.has_own_house_at(v, colour) || self.has_own_road_at(v, colour)
            }),
        };
        if !connected {
            return Err(BoardError::NotConnected);
        }
        Ok(edge)
    }

    /// Check that `colour` may turn its village at `vertex` into a town
    pub fn check_upgrade(&self, vertex: Point, colour: Colour) -> Result<(), BoardError> {
        let house = self.house_at(vertex).ok_or(BoardError::NoHouse(vertex))?;
        if house.owner != colour {
            return Err(BoardError::NotOwned);
        }
        if house.kind == HouseKind::Town {
            return Err(BoardError::AlreadyUpgraded);
        }
        Ok(())
    }

    pub fn check_thief(&self, tile: Point) -> Result<(), BoardError> {
        if !tile.is_tile() {
            return Err(BoardError::InvalidPoint(tile));
        }
        if tile == self.thief {
            return Err(BoardError::SameLocation);
        }
        Ok(())
    }

    /// Every vertex where `colour` could build a village right now
    pub fn valid_house_spots(&self, colour: Colour, setup: bool) -> Vec<Point> {
        Point::vertices()
            .filter(|v| self.check_house(*v, colour, setup).is_ok())
            .collect()
    }

    /// Every edge where `colour` could build a road right now
    pub fn valid_road_spots(&self, colour: Colour, connection: Connection) -> Vec<Edge> {
        Edge::all()
            .into_iter()
            .filter(|e| {
                let [a, b] = e.endpoints();
                self.check_road(a, b, colour, connection).is_ok()
            })
            .collect()
    }

    // ====== Mutation ======

    /// Build a village, returning the port at that vertex if there is one
    pub fn place_house(
        &mut self,
        vertex: Point,
        colour: Colour,
        setup: bool,
    ) -> Result<Option<PortKind>, BoardError> {
        self.check_house(vertex, colour, setup)?;
        self.houses.push(House {
            owner: colour,
            kind: HouseKind::Village,
            position: vertex,
        });
        Ok(self.port_at(vertex))
    }

    /// Build a road, returning the longest road change it caused, if any
    pub fn place_road(
        &mut self,
        first: Point,
        second: Point,
        colour: Colour,
        connection: Connection,
    ) -> Result<Option<LongestRoadChange>, BoardError> {
        let edge = self.check_road(first, second, colour, connection)?;
        self.roads.push(Road {
            owner: colour,
            edge,
        });
        Ok(self.update_longest_road(colour))
    }

    pub fn upgrade_house(&mut self, vertex: Point, colour: Colour) -> Result<(), BoardError> {
        self.check_upgrade(vertex, colour)?;
        if let Some(house) = self.houses.iter_mut().find(|h| h.position == vertex) {
            house.kind = HouseKind::Town;
        }
        Ok(())
    }

    pub fn move_thief(&mut self, tile: Point) -> Result<(), BoardError> {
        self.check_thief(tile)?;
        self.thief = tile;
        Ok(())
    }

    // ====== Production ======

    /// Resources each colour collects for a dice total
    pub fn production(&self, roll: u8) -> BTreeMap<Colour, ItemManager<Resource>> {
        let mut yields: BTreeMap<Colour, ItemManager<Resource>> = BTreeMap::new();
        for tile in &self.tiles {
            if tile.number != roll || tile.position == self.thief {
                continue;
            }
            let Some(resource) = tile.resource() else {
                continue;
            };
            for vertex in tile.position.tile_vertices() {
                if let Some(house) = self.house_at(vertex) {
                    yields
                        .entry(house.owner)
                        .or_default()
                        .add(resource, house.kind.yield_count());
                }
            }
        }
        yields
    }

    // ====== Longest road ======

    /// Recompute one colour's road length and move the bonus if it now
    /// strictly beats the holder. Only the builder's length can change.
    fn update_longest_road(&mut self, colour: Colour) -> Option<LongestRoadChange> {
        let length = self.compute_road_length(colour);
        self.road_lengths.insert(colour, length);

        if let Some(holder) = self.longest_road.as_mut() {
            if holder.colour == colour {
                holder.length = length;
                return None;
            }
        }

        let current = self.longest_road;
        let beats_holder = current.map_or(true, |h| length > h.length);
        if length < LONGEST_ROAD_MINIMUM || !beats_holder {
            return None;
        }
        self.longest_road = Some(LongestRoad { colour, length });
        Some(LongestRoadChange {
            previous: current.map(|h| h.colour),
            holder: colour,
            length,
        })
    }

    /// Longest trail (no edge used twice) through a colour's roads
    pub fn compute_road_length(&self, colour: Colour) -> u32 {
        let edges: Vec<Edge> = self
            .roads
            .iter()
            .filter(|r| r.owner == colour)
            .map(|r| r.edge)
            .collect();
        let starts: BTreeSet<Point> = edges.iter().flat_map(|e| e.endpoints()).collect();
        let mut used = vec![false; edges.len()];

        starts
            .into_iter()
            .map(|start| Self::walk(start, &edges, &mut used))
            .max()
            .unwrap_or(0)
    }

    fn walk(vertex: Point, edges: &[Edge], used: &mut [bool]) -> u32 {
        let mut best = 0;
        for i in 0..edges.len() {
            if used[i] || !edges[i].touches(&vertex) {
                continue;
            }
            used[i] = true;
            let next = edges[i].other_end(&vertex);
            best = best.max(1 + Self::walk(next, edges, used));
            used[i] = false;
        }
        best
    }
}
