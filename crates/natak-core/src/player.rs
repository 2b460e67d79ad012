//! Player state and scoring.
//!
//! This module contains:
//! - Player struct with resources, growth cards, pieces and embargoes
//! - Piece kinds and the starting supply
//! - ScoreManager for visible and hidden victory points

use crate::board::{Colour, PortKind, Resource};
use crate::cards::{GrowthCardManager, ItemKind, ItemManager};
use crate::error::{PlayerError, TradeError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Points for holding longest road or largest army
pub const BONUS_POINTS: u32 = 2;

/// Building pieces a player places on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Piece {
    Road,
    Village,
    Town,
}

impl Piece {
    /// How many of this piece each player starts with
    pub fn starting_count(&self) -> u32 {
        match self {
            Piece::Road => 15,
            Piece::Village => 5,
            Piece::Town => 4,
        }
    }
}

impl ItemKind for Piece {
    const ALL: &'static [Self] = &[Piece::Road, Piece::Village, Piece::Town];
}

/// Victory point tally.
///
/// `visible` counts buildings and bonus titles; `hidden` counts victory point
/// growth cards, which only the owner can see.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreManager {
    pub visible: u32,
    pub hidden: u32,
    pub largest_army: bool,
    pub longest_road: bool,
}

impl ScoreManager {
    pub fn total(&self) -> u32 {
        self.visible + self.hidden
    }

    pub fn set_longest_road(&mut self, held: bool) {
        if held != self.longest_road {
            self.longest_road = held;
            self.adjust_bonus(held);
        }
    }

    pub fn set_largest_army(&mut self, held: bool) {
        if held != self.largest_army {
            self.largest_army = held;
            self.adjust_bonus(held);
        }
    }

    fn adjust_bonus(&mut self, gained: bool) {
        if gained {
            self.visible += BONUS_POINTS;
        } else {
            self.visible = self.visible.saturating_sub(BONUS_POINTS);
        }
    }
}

/// A player in the game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub colour: Colour,
    pub resources: ItemManager<Resource>,
    pub growth_cards: GrowthCardManager,
    /// Pieces still in the player's supply
    pub pieces: ItemManager<Piece>,
    pub score: ScoreManager,
    pub soldiers_played: u32,
    pub ports: BTreeSet<PortKind>,
    /// Colours this player refuses to trade with
    pub embargoes: BTreeSet<Colour>,
    /// Cards still owed after a 7
    pub cards_to_discard: u32,
}

impl Player {
    pub fn new(colour: Colour) -> Self {
        Self {
            colour,
            resources: ItemManager::new(),
            growth_cards: GrowthCardManager::new(),
            pieces: Piece::ALL
                .iter()
                .map(|&piece| (piece, piece.starting_count()))
                .collect(),
            score: ScoreManager::default(),
            soldiers_played: 0,
            ports: BTreeSet::new(),
            embargoes: BTreeSet::new(),
            cards_to_discard: 0,
        }
    }

    /// Take a piece from the supply
    pub fn take_piece(&mut self, piece: Piece) -> Result<(), PlayerError> {
        self.pieces
            .remove(piece, 1)
            .map_err(|_| PlayerError::NoPiecesRemaining)
    }

    /// Put a piece back in the supply
    pub fn return_piece(&mut self, piece: Piece) {
        self.pieces.add(piece, 1);
    }

    pub fn has_piece(&self, piece: Piece) -> bool {
        self.pieces.get(piece) > 0
    }

    pub fn add_port(&mut self, port: PortKind) {
        self.ports.insert(port);
    }

    /// Cards given per card received when trading `resource` with the bank
    pub fn best_ratio(&self, resource: Resource) -> u32 {
        if self.ports.contains(&PortKind::Specific(resource)) {
            PortKind::Specific(resource).rate()
        } else if self.ports.contains(&PortKind::Generic) {
            PortKind::Generic.rate()
        } else {
            4
        }
    }

    // ====== Embargoes ======

    pub fn add_embargo(&mut self, target: Colour) -> Result<(), TradeError> {
        if target == self.colour {
            return Err(TradeError::CannotEmbargoSelf);
        }
        if !self.embargoes.insert(target) {
            return Err(TradeError::AlreadyEmbargoed(target));
        }
        Ok(())
    }

    pub fn remove_embargo(&mut self, target: Colour) -> Result<(), TradeError> {
        if !self.embargoes.remove(&target) {
            return Err(TradeError::NotEmbargoed(target));
        }
        Ok(())
    }

    pub fn has_embargoed(&self, colour: Colour) -> bool {
        self.embargoes.contains(&colour)
    }

    pub fn total_points(&self) -> u32 {
        self.score.total()
    }
}
