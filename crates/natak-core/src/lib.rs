//! Natak - rules engine for a resource-trading board game
//!
//! This crate provides the core game logic for Natak, including:
//! - Tile and vertex grids for the board
//! - Board representation with tiles, houses, roads and ports
//! - Player inventories, the bank and player-to-player trading
//! - A stack-based phase machine with full rule enforcement
//!
//! # Architecture
//!
//! [`Game`] is the single authoritative aggregate. It is synchronous, owns no
//! randomness (callers pass an [`rand::Rng`] to random actions) and
//! serializes losslessly to a JSON snapshot, so a host can keep games in any
//! [`GameStore`].
//!
//! # Modules
//!
//! - [`geometry`]: Points on the tile and vertex grids, and edges
//! - [`board`]: Tiles, buildings, ports, thief, longest road
//! - [`cards`]: Card counters and growth cards
//! - [`player`]: Player state and scoring
//! - [`bank`], [`trade`], [`purchase`]: Moving cards around
//! - [`state`]: Phase machine
//! - [`game`], [`actions`]: The public action surface
//! - [`view`]: Per-audience read model
//! - [`store`]: Storage collaborator

pub mod actions;
pub mod bank;
pub mod board;
pub mod cards;
pub mod error;
pub mod game;
pub mod geometry;
pub mod player;
pub mod purchase;
pub mod state;
pub mod store;
pub mod trade;
pub mod view;

// Re-export commonly used types
pub use actions::{ActionOutcome, GameAction};
pub use bank::Bank;
pub use board::{Board, Colour, HouseKind, PortKind, Resource, Tile, TileKind};
pub use cards::{GrowthCard, GrowthCardManager, ItemKind, ItemManager};
pub use error::{BoardError, GameError, PlayerError, StateError, TradeError};
pub use game::Game;
pub use geometry::{Edge, Point};
pub use player::{Piece, Player, ScoreManager};
pub use purchase::Purchase;
pub use state::{Action, State, StateManager};
pub use store::{GameStore, StoreError};
pub use trade::{TradeManager, TradeOffer};
pub use view::{Audience, GameView, PlayerView};
