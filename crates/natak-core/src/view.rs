//! Read model: what one audience is allowed to see of a game.
//!
//! A player sees their own hand, growth cards and hidden points in full.
//! Everyone else's cards, and everything for observers, are reduced to
//! totals.

use crate::board::{Board, Colour, PortKind, Resource};
use crate::cards::{GrowthCardManager, ItemManager};
use crate::game::Game;
use crate::player::{Piece, Player};
use crate::state::State;
use crate::trade::TradeOffer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Who is looking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Audience {
    Player(Colour),
    Observer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub colour: Colour,
    pub resource_count: u32,
    pub growth_card_count: u32,
    pub visible_points: u32,
    pub soldiers_played: u32,
    pub road_length: u32,
    pub longest_road: bool,
    pub largest_army: bool,
    pub pieces: ItemManager<Piece>,
    pub ports: BTreeSet<PortKind>,
    pub embargoes: BTreeSet<Colour>,
    pub cards_to_discard: u32,
    /// Only for the owner
    pub resources: Option<ItemManager<Resource>>,
    /// Only for the owner
    pub growth_cards: Option<GrowthCardManager>,
    /// Only for the owner
    pub hidden_points: Option<u32>,
}

impl PlayerView {
    fn new(player: &Player, board: &Board, owner: bool) -> Self {
        Self {
            colour: player.colour,
            resource_count: player.resources.total(),
            growth_card_count: player.growth_cards.total(),
            visible_points: player.score.visible,
            soldiers_played: player.soldiers_played,
            road_length: board.road_length(player.colour),
            longest_road: player.score.longest_road,
            largest_army: player.score.largest_army,
            pieces: player.pieces.clone(),
            ports: player.ports.clone(),
            embargoes: player.embargoes.clone(),
            cards_to_discard: player.cards_to_discard,
            resources: owner.then(|| player.resources.clone()),
            growth_cards: owner.then(|| player.growth_cards.clone()),
            hidden_points: owner.then_some(player.score.hidden),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub id: Uuid,
    pub audience: Audience,
    pub board: Board,
    pub players: Vec<PlayerView>,
    pub current: Colour,
    pub state: State,
    pub setup: bool,
    pub free_roads: u8,
    pub last_roll: Option<(u8, u8)>,
    pub winner: Option<Colour>,
    pub trade_offer: Option<TradeOffer>,
    pub bank_resources: ItemManager<Resource>,
    pub growth_cards_left: u32,
}

impl GameView {
    pub fn new(game: &Game, audience: Audience) -> Self {
        let players = game
            .players()
            .iter()
            .map(|p| {
                let owner = audience == Audience::Player(p.colour);
                PlayerView::new(p, game.board(), owner)
            })
            .collect();

        Self {
            id: game.id,
            audience,
            board: game.board().clone(),
            players,
            current: game.current_colour(),
            state: game.state(),
            setup: game.is_setup(),
            free_roads: game.free_roads(),
            last_roll: game.last_roll(),
            winner: game.winner(),
            trade_offer: game.trade_offer().cloned(),
            bank_resources: game.bank().resources.clone(),
            growth_cards_left: game.bank().growth_cards.total(),
        }
    }

    pub fn player(&self, colour: Colour) -> Option<&PlayerView> {
        self.players.iter().find(|p| p.colour == colour)
    }
}
