//! Game orchestration with full rule enforcement.
//!
//! [`Game`] is the one authoritative aggregate. Every action:
//! 1. checks the acting colour is playing and, for turn-bound actions, is the
//!    current player
//! 2. asks the [`StateManager`] whether the action is legal in this phase
//! 3. validates and mutates through the board, players, bank and trades
//! 4. advances the state machine
//!
//! A failed action leaves the game untouched.

use crate::actions::{ActionOutcome, GameAction};
use crate::bank::Bank;
use crate::board::{Board, Colour, Connection, LongestRoadChange, PortKind, Resource};
use crate::cards::{GrowthCard, ItemKind, ItemManager};
use crate::error::{BoardError, GameError, PlayerError, StateError, TradeError};
use crate::geometry::Point;
use crate::player::{Piece, Player};
use crate::purchase::Purchase;
use crate::state::{Action, State, StateManager, Transition};
use crate::trade::{TradeManager, TradeOffer};
use rand::rngs::mock::StepRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// Points needed to win
pub const POINTS_TO_WIN: u32 = 10;

/// Soldiers needed to hold the largest army
pub const LARGEST_ARMY_MINIMUM: u32 = 3;

/// Players holding more cards than this discard half on a 7
pub const DISCARD_LIMIT: u32 = 7;

/// Free roads granted by a roaming card
pub const ROAMING_ROADS: u8 = 2;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

/// Complete game state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: Uuid,
    board: Board,
    /// Players in turn order
    players: Vec<Player>,
    current: usize,
    state: StateManager,
    bank: Bank,
    trades: TradeManager,
    rolls: Vec<(u8, u8)>,
    growth_card_played: bool,
    /// Village placed this setup turn, which the next road must touch
    last_village: Option<Point>,
    winner: Option<Colour>,
}

impl Game {
    /// Create a game on a freshly shuffled standard board
    pub fn new<R: Rng>(player_count: usize, rng: &mut R) -> Result<Self, GameError> {
        Self::with_board(Board::standard_with_rng(rng), player_count)
    }

    /// Create a game on a given board
    pub fn with_board(board: Board, player_count: usize) -> Result<Self, GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
            return Err(PlayerError::InvalidPlayerCount(player_count).into());
        }
        let players = Colour::ALL[..player_count]
            .iter()
            .map(|&colour| Player::new(colour))
            .collect();
        let game = Self {
            id: Uuid::new_v4(),
            board,
            players,
            current: 0,
            state: StateManager::new(player_count),
            bank: Bank::new(),
            trades: TradeManager::new(),
            rolls: Vec::new(),
            growth_card_played: false,
            last_village: None,
            winner: None,
        };
        info!(game = %game.id, players = player_count, "game created");
        Ok(game)
    }

    // ====== Accessors ======

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn bank(&self) -> &Bank {
        &self.bank
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, colour: Colour) -> Result<&Player, GameError> {
        Ok(&self.players[self.index_of(colour)?])
    }

    pub fn current_colour(&self) -> Colour {
        self.players[self.current].colour
    }

    pub fn state(&self) -> State {
        self.state.current()
    }

    pub fn state_manager(&self) -> &StateManager {
        &self.state
    }

    pub fn is_setup(&self) -> bool {
        self.state.is_setup()
    }

    /// Free roads left from a roaming card this turn
    pub fn free_roads(&self) -> u8 {
        self.state.free_roads()
    }

    pub fn last_roll(&self) -> Option<(u8, u8)> {
        self.rolls.last().copied()
    }

    pub fn rolls(&self) -> &[(u8, u8)] {
        &self.rolls
    }

    pub fn winner(&self) -> Option<Colour> {
        self.winner
    }

    pub fn trade_offer(&self) -> Option<&TradeOffer> {
        self.trades.offer()
    }

    pub fn growth_card_played(&self) -> bool {
        self.growth_card_played
    }

    // ====== Snapshots ======

    pub fn to_snapshot(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_snapshot(snapshot: &str) -> serde_json::Result<Self> {
        serde_json::from_str(snapshot)
    }

    // ====== Building ======

    /// Place a village. Free during setup, where the second village also
    /// collects one card from every tile around it.
    pub fn place_village(
        &mut self,
        colour: Colour,
        point: Point,
    ) -> Result<Option<PortKind>, GameError> {
        let index = self.turn(colour, Action::BuildVillage)?;

        let port = if self.state.is_setup() {
            if !self.players[index].has_piece(Piece::Village) {
                return Err(PlayerError::NoPiecesRemaining.into());
            }
            let second_round = self.board.roads().len() >= self.players.len();
            let port = self.board.place_house(point, colour, true)?;
            let player = &mut self.players[index];
            player.take_piece(Piece::Village)?;
            player.score.visible += 1;
            self.last_village = Some(point);

            if second_round {
                let cards: ItemManager<Resource> = self
                    .board
                    .vertex_resources(point)
                    .into_iter()
                    .map(|r| (r, 1))
                    .collect();
                self.charge(index, Purchase::FreeResources(cards))?;
            }
            port
        } else {
            Purchase::Village.check(&self.players[index], &self.bank)?;
            let port = self.board.place_house(point, colour, false)?;
            self.charge(index, Purchase::Village)?;
            port
        };

        if let Some(port) = port {
            self.players[index].add_port(port);
        }
        self.state.transition(Transition::BuildVillage)?;
        debug!(game = %self.id, ?colour, %point, "village placed");
        self.check_winner()?;
        Ok(port)
    }

    /// Place a road. Free during setup and while resolving a roaming card.
    pub fn place_road(
        &mut self,
        colour: Colour,
        first: Point,
        second: Point,
    ) -> Result<(), GameError> {
        let index = self.turn(colour, Action::BuildRoad)?;
        let setup = self.state.is_setup();

        let change = if setup {
            let anchor = self.last_village.ok_or(BoardError::NotConnected)?;
            self.free_road(index, first, second, Connection::Anchored(anchor))?
        } else if self.state.free_roads() > 0 {
            self.free_road(index, first, second, Connection::Connected)?
        } else {
            Purchase::Road.check(&self.players[index], &self.bank)?;
            let change = self
                .board
                .place_road(first, second, colour, Connection::Connected)?;
            self.charge(index, Purchase::Road)?;
            change
        };

        self.state.transition(Transition::BuildRoad)?;
        debug!(game = %self.id, ?colour, %first, %second, "road placed");

        if setup {
            self.last_village = None;
            self.advance_setup();
        }
        self.award_longest_road(change);
        self.check_winner()
    }

    fn free_road(
        &mut self,
        index: usize,
        first: Point,
        second: Point,
        connection: Connection,
    ) -> Result<Option<LongestRoadChange>, GameError> {
        let player = &self.players[index];
        if !player.has_piece(Piece::Road) {
            return Err(PlayerError::NoPiecesRemaining.into());
        }
        let change = self
            .board
            .place_road(first, second, player.colour, connection)?;
        self.players[index].take_piece(Piece::Road)?;
        Ok(change)
    }

    /// Pick the next setup player: forwards through the seats, then back
    fn advance_setup(&mut self) {
        let n = self.players.len();
        let placed = self.board.roads().len();
        self.current = if !self.state.is_setup() {
            info!(game = %self.id, "setup finished");
            0
        } else if placed < n {
            placed
        } else {
            2 * n - 1 - placed
        };
    }

    pub fn upgrade_to_town(&mut self, colour: Colour, point: Point) -> Result<(), GameError> {
        let index = self.turn(colour, Action::BuildTown)?;
        Purchase::Town.check(&self.players[index], &self.bank)?;
        self.board.upgrade_house(point, colour)?;
        self.charge(index, Purchase::Town)?;
        debug!(game = %self.id, ?colour, %point, "town built");
        self.check_winner()
    }

    // ====== Dice ======

    /// Roll two dice. A 7 starts the thief sequence, anything else pays out.
    pub fn roll_dice<R: Rng>(&mut self, colour: Colour, rng: &mut R) -> Result<(u8, u8), GameError> {
        self.turn(colour, Action::RollDice)?;

        let dice: (u8, u8) = (rng.gen_range(1..=6), rng.gen_range(1..=6));
        let total = dice.0 + dice.1;
        self.rolls.push(dice);
        info!(game = %self.id, ?colour, total, "dice rolled");

        if total == 7 {
            let mut discard = false;
            for player in &mut self.players {
                let held = player.resources.total();
                if held > DISCARD_LIMIT {
                    player.cards_to_discard = held / 2;
                    discard = true;
                }
            }
            self.state.transition(Transition::RollSeven { discard })?;
        } else {
            self.distribute_resources(total);
            self.state.transition(Transition::RollDice)?;
        }
        Ok(dice)
    }

    /// Pay out a roll. A resource the bank cannot cover for everyone is
    /// withheld from everyone.
    fn distribute_resources(&mut self, roll: u8) {
        let production = self.board.production(roll);
        for &resource in Resource::ALL {
            let demand: u32 = production.values().map(|cards| cards.get(resource)).sum();
            if demand == 0 {
                continue;
            }
            if self.bank.resources.get(resource) < demand {
                debug!(game = %self.id, ?resource, demand, "bank short, withheld");
                continue;
            }
            for (colour, cards) in &production {
                let amount = cards.get(resource);
                if amount == 0 {
                    continue;
                }
                if let Some(player) = self.players.iter_mut().find(|p| p.colour == *colour) {
                    if self.bank.resources.remove(resource, amount).is_ok() {
                        player.resources.add(resource, amount);
                    }
                }
            }
        }
    }

    // ====== Thief ======

    /// Give back the cards owed after a 7. Any player who owes cards may
    /// call this, not just the current player.
    pub fn discard_resources(
        &mut self,
        colour: Colour,
        cards: ItemManager<Resource>,
    ) -> Result<(), GameError> {
        let index = self.index_of(colour)?;
        self.state.check(Action::DiscardResources)?;
        if self.players[index].cards_to_discard == 0 {
            return Err(StateError::InvalidAction {
                action: Action::DiscardResources,
                state: self.state.current(),
            }
            .into());
        }
        let purchase = Purchase::Discard(cards);
        purchase.check(&self.players[index], &self.bank)?;
        self.charge(index, purchase)?;
        debug!(game = %self.id, ?colour, "cards discarded");

        if self.players.iter().all(|p| p.cards_to_discard == 0) {
            self.state.transition(Transition::AllResourcesDiscarded)?;
        }
        Ok(())
    }

    /// Move the thief. Stealing is skipped when no opponent lives on the tile.
    pub fn move_thief(&mut self, colour: Colour, tile: Point) -> Result<(), GameError> {
        self.turn(colour, Action::MoveThief)?;
        self.board.move_thief(tile)?;
        let victims = self.board.colours_at_tile(tile).iter().any(|&c| c != colour);
        self.state.transition(Transition::MoveThief { victims })?;
        debug!(game = %self.id, ?colour, %tile, victims, "thief moved");
        Ok(())
    }

    /// Take a random card from a player next to the thief
    pub fn steal_resource<R: Rng>(
        &mut self,
        colour: Colour,
        victim: Colour,
        rng: &mut R,
    ) -> Result<Option<Resource>, GameError> {
        let index = self.turn(colour, Action::StealResource)?;
        if victim == colour {
            return Err(PlayerError::CannotStealFromSelf.into());
        }
        let victim_index = self.index_of(victim)?;
        if !self.board.colours_at_tile(self.board.thief()).contains(&victim) {
            return Err(PlayerError::InvalidVictim(victim).into());
        }

        let stolen = self.players[victim_index].resources.remove_random(rng).ok();
        if let Some(resource) = stolen {
            self.players[index].resources.add(resource, 1);
        }
        self.state.transition(Transition::StealResource)?;
        debug!(game = %self.id, ?colour, ?victim, "resource stolen");
        Ok(stolen)
    }

    // ====== Growth cards ======

    pub fn buy_growth_card<R: Rng>(
        &mut self,
        colour: Colour,
        rng: &mut R,
    ) -> Result<GrowthCard, GameError> {
        let index = self.turn(colour, Action::BuyGrowthCard)?;
        let card = Purchase::GrowthCard
            .make(&mut self.players[index], &mut self.bank, rng)?
            .ok_or(TradeError::NoGrowthCardsLeft)?;
        debug!(game = %self.id, ?colour, "growth card bought");
        self.check_winner()?;
        Ok(card)
    }

    /// Play a soldier. Soldiers are not limited to one growth card per turn.
    pub fn play_soldier_card(&mut self, colour: Colour) -> Result<(), GameError> {
        let index = self.turn(colour, Action::PlaySoldierCard)?;
        self.players[index].growth_cards.play(GrowthCard::Soldier)?;
        self.players[index].soldiers_played += 1;
        self.award_largest_army(index);
        self.state.transition(Transition::PlaySoldierCard)?;
        debug!(game = %self.id, ?colour, "soldier played");
        self.check_winner()
    }

    /// Play a roaming card: up to two free roads
    pub fn play_roaming_card(&mut self, colour: Colour) -> Result<(), GameError> {
        let index = self.growth_turn(colour, Action::PlayRoamingCard, GrowthCard::Roaming)?;
        let roads_left = self.players[index].pieces.get(Piece::Road);
        if roads_left == 0 {
            return Err(PlayerError::NoPiecesRemaining.into());
        }
        let roads = ROAMING_ROADS.min(roads_left as u8);

        self.players[index].growth_cards.play(GrowthCard::Roaming)?;
        self.growth_card_played = true;
        self.state.transition(Transition::PlayRoamingCard { roads })?;
        debug!(game = %self.id, ?colour, roads, "roaming card played");
        Ok(())
    }

    /// Play a wealth card: two resources from the bank
    pub fn play_wealth_card(
        &mut self,
        colour: Colour,
        first: Resource,
        second: Resource,
    ) -> Result<(), GameError> {
        let index = self.growth_turn(colour, Action::PlayWealthCard, GrowthCard::Wealth)?;
        let cards = ItemManager::with([(first, 1), (second, 1)]);
        let purchase = Purchase::FreeResources(cards);
        purchase.check(&self.players[index], &self.bank)?;

        self.players[index].growth_cards.play(GrowthCard::Wealth)?;
        self.charge(index, purchase)?;
        self.growth_card_played = true;
        debug!(game = %self.id, ?colour, ?first, ?second, "wealth card played");
        Ok(())
    }

    /// Play a gatherer card: every other player hands over all of `resource`
    pub fn play_gatherer_card(
        &mut self,
        colour: Colour,
        resource: Resource,
    ) -> Result<u32, GameError> {
        let index = self.growth_turn(colour, Action::PlayGathererCard, GrowthCard::Gatherer)?;
        self.players[index].growth_cards.play(GrowthCard::Gatherer)?;

        let mut gathered = 0;
        for (i, player) in self.players.iter_mut().enumerate() {
            if i != index {
                gathered += player.resources.take_all(resource);
            }
        }
        self.players[index].resources.add(resource, gathered);
        self.growth_card_played = true;
        debug!(game = %self.id, ?colour, ?resource, gathered, "gatherer card played");
        Ok(gathered)
    }

    /// Turn check for non-soldier growth cards, which share a once-per-turn limit
    fn growth_turn(
        &self,
        colour: Colour,
        action: Action,
        card: GrowthCard,
    ) -> Result<usize, GameError> {
        let index = self.turn(colour, action)?;
        if self.growth_card_played {
            return Err(StateError::DevelopmentCardAlreadyPlayed.into());
        }
        if !self.players[index].growth_cards.can_play(card) {
            return Err(PlayerError::NoPlayableCard(card).into());
        }
        Ok(index)
    }

    // ====== Trading ======

    pub fn trade_with_bank(
        &mut self,
        colour: Colour,
        give: Resource,
        get: Resource,
        amount: u32,
    ) -> Result<(), GameError> {
        let index = self.turn(colour, Action::TradeWithBank)?;
        self.bank.trade(&mut self.players[index], give, get, amount)?;
        debug!(game = %self.id, ?colour, ?give, ?get, amount, "bank trade");
        Ok(())
    }

    pub fn make_trade_offer(
        &mut self,
        colour: Colour,
        offer: ItemManager<Resource>,
        request: ItemManager<Resource>,
    ) -> Result<(), GameError> {
        self.turn(colour, Action::TradeWithPlayer)?;
        self.trades.make_offer(colour, offer, request)?;
        debug!(game = %self.id, ?colour, "trade offered");
        Ok(())
    }

    pub fn accept_trade_offer(&mut self, colour: Colour) -> Result<(), GameError> {
        let responder = self.index_of(colour)?;
        self.state.check(Action::TradeWithPlayer)?;
        let offerer_colour = self.trades.offer().ok_or(TradeError::NoActiveOffer)?.offerer;
        let offerer = self.index_of(offerer_colour)?;
        if offerer == responder {
            return Err(TradeError::CannotTradeWithSelf.into());
        }

        let (offerer, responder) = pair_mut(&mut self.players, offerer, responder);
        self.trades.accept(offerer, responder)?;
        info!(game = %self.id, offerer = ?offerer_colour, responder = ?colour, "trade accepted");
        Ok(())
    }

    pub fn reject_trade_offer(&mut self, colour: Colour) -> Result<(), GameError> {
        self.index_of(colour)?;
        self.state.check(Action::TradeWithPlayer)?;
        self.trades.reject(colour)?;
        Ok(())
    }

    pub fn cancel_trade_offer(&mut self, colour: Colour) -> Result<(), GameError> {
        self.turn(colour, Action::TradeWithPlayer)?;
        self.trades.cancel();
        Ok(())
    }

    pub fn add_embargo(&mut self, colour: Colour, target: Colour) -> Result<(), GameError> {
        let index = self.index_of(colour)?;
        self.state.check(Action::Embargo)?;
        self.index_of(target)?;
        self.players[index].add_embargo(target)?;
        Ok(())
    }

    pub fn remove_embargo(&mut self, colour: Colour, target: Colour) -> Result<(), GameError> {
        let index = self.index_of(colour)?;
        self.state.check(Action::Embargo)?;
        self.index_of(target)?;
        self.players[index].remove_embargo(target)?;
        Ok(())
    }

    // ====== Turn management ======

    pub fn end_turn(&mut self, colour: Colour) -> Result<(), GameError> {
        self.turn(colour, Action::EndTurn)?;
        self.trades.cancel();
        self.growth_card_played = false;
        self.current = (self.current + 1) % self.players.len();
        self.players[self.current].growth_cards.cycle();
        self.state.transition(Transition::EndTurn)?;
        debug!(game = %self.id, next = ?self.current_colour(), "turn ended");
        Ok(())
    }

    /// Run a serialized action
    pub fn apply_action<R: Rng>(
        &mut self,
        colour: Colour,
        action: GameAction,
        rng: &mut R,
    ) -> Result<ActionOutcome, GameError> {
        let outcome = match action {
            GameAction::PlaceVillage { point } => ActionOutcome::VillagePlaced {
                port: self.place_village(colour, point)?,
            },
            GameAction::PlaceRoad { first, second } => {
                self.place_road(colour, first, second)?;
                ActionOutcome::Done
            }
            GameAction::UpgradeToTown { point } => {
                self.upgrade_to_town(colour, point)?;
                ActionOutcome::Done
            }
            GameAction::RollDice => {
                let dice = self.roll_dice(colour, rng)?;
                ActionOutcome::DiceRolled {
                    dice,
                    total: dice.0 + dice.1,
                }
            }
            GameAction::EndTurn => {
                self.end_turn(colour)?;
                ActionOutcome::Done
            }
            GameAction::DiscardResources { cards } => {
                self.discard_resources(colour, cards)?;
                ActionOutcome::Done
            }
            GameAction::MoveThief { tile } => {
                self.move_thief(colour, tile)?;
                ActionOutcome::Done
            }
            GameAction::StealResource { victim } => ActionOutcome::ResourceStolen {
                resource: self.steal_resource(colour, victim, rng)?,
            },
            GameAction::BuyGrowthCard => ActionOutcome::GrowthCardBought {
                card: self.buy_growth_card(colour, rng)?,
            },
            GameAction::PlaySoldierCard => {
                self.play_soldier_card(colour)?;
                ActionOutcome::Done
            }
            GameAction::PlayRoamingCard => {
                self.play_roaming_card(colour)?;
                ActionOutcome::Done
            }
            GameAction::PlayWealthCard { first, second } => {
                self.play_wealth_card(colour, first, second)?;
                ActionOutcome::Done
            }
            GameAction::PlayGathererCard { resource } => ActionOutcome::ResourcesGathered {
                resource,
                amount: self.play_gatherer_card(colour, resource)?,
            },
            GameAction::TradeWithBank { give, get, amount } => {
                self.trade_with_bank(colour, give, get, amount)?;
                ActionOutcome::Done
            }
            GameAction::MakeTradeOffer { offer, request } => {
                self.make_trade_offer(colour, offer, request)?;
                ActionOutcome::Done
            }
            GameAction::AcceptTradeOffer => {
                self.accept_trade_offer(colour)?;
                ActionOutcome::Done
            }
            GameAction::RejectTradeOffer => {
                self.reject_trade_offer(colour)?;
                ActionOutcome::Done
            }
            GameAction::CancelTradeOffer => {
                self.cancel_trade_offer(colour)?;
                ActionOutcome::Done
            }
            GameAction::AddEmbargo { target } => {
                self.add_embargo(colour, target)?;
                ActionOutcome::Done
            }
            GameAction::RemoveEmbargo { target } => {
                self.remove_embargo(colour, target)?;
                ActionOutcome::Done
            }
        };
        Ok(outcome)
    }

    // ====== Helper methods ======

    fn index_of(&self, colour: Colour) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| p.colour == colour)
            .ok_or_else(|| PlayerError::UnknownPlayer(colour).into())
    }

    /// Common checks for turn-bound actions
    fn turn(&self, colour: Colour, action: Action) -> Result<usize, GameError> {
        let index = self.index_of(colour)?;
        self.state.check(action)?;
        if index != self.current {
            return Err(StateError::NotYourTurn.into());
        }
        Ok(index)
    }

    /// Check and apply a purchase that draws no growth card
    fn charge(&mut self, index: usize, purchase: Purchase) -> Result<(), GameError> {
        purchase.check(&self.players[index], &self.bank)?;
        // Only growth card purchases draw randomly, and those go through `make`
        let mut no_draw = StepRng::new(0, 0);
        purchase.apply(&mut self.players[index], &mut self.bank, &mut no_draw);
        Ok(())
    }

    fn award_longest_road(&mut self, change: Option<LongestRoadChange>) {
        let Some(change) = change else {
            return;
        };
        for player in &mut self.players {
            if Some(player.colour) == change.previous {
                player.score.set_longest_road(false);
            }
            if player.colour == change.holder {
                player.score.set_longest_road(true);
            }
        }
        info!(
            game = %self.id,
            holder = ?change.holder,
            previous = ?change.previous,
            length = change.length,
            "longest road changed hands"
        );
    }

    /// Move the largest army to `index` if it now has strictly the most soldiers
    fn award_largest_army(&mut self, index: usize) {
        let soldiers = self.players[index].soldiers_played;
        let holder = self.players.iter().position(|p| p.score.largest_army);
        if soldiers < LARGEST_ARMY_MINIMUM || holder == Some(index) {
            return;
        }
        if let Some(holder) = holder {
            if soldiers <= self.players[holder].soldiers_played {
                return;
            }
            self.players[holder].score.set_largest_army(false);
        }
        self.players[index].score.set_largest_army(true);
        info!(
            game = %self.id,
            holder = ?self.players[index].colour,
            soldiers,
            "largest army changed hands"
        );
    }

    /// Finish the game if the current player reached the winning total
    fn check_winner(&mut self) -> Result<(), GameError> {
        let player = &self.players[self.current];
        if self.winner.is_none() && player.total_points() >= POINTS_TO_WIN {
            let colour = player.colour;
            let points = player.total_points();
            self.winner = Some(colour);
            self.state.transition(Transition::PlayerHasWon)?;
            info!(game = %self.id, ?colour, points, "game won");
        }
        Ok(())
    }
}

/// Borrow two distinct players mutably
fn pair_mut(players: &mut [Player], a: usize, b: usize) -> (&mut Player, &mut Player) {
    if a < b {
        let (left, right) = players.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = players.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Tile, TileKind};
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    /// Every tile is wood on 5 except the centre desert
    fn game(players: usize) -> Game {
        let tiles = Point::tiles()
            .map(|t| {
                if t == p(2, 2) {
                    Tile::new(TileKind::Desert, 0, t)
                } else {
                    Tile::new(TileKind::Resource(Resource::Wood), 5, t)
                }
            })
            .collect();
        Game::with_board(Board::new(tiles, Vec::new()), players).unwrap()
    }

    /// Two players through setup: red at (2,0) and (2,4), blue at (6,0) and (8,2)
    fn after_setup() -> Game {
        let mut game = game(2);
        game.place_village(Colour::Red, p(2, 0)).unwrap();
        game.place_road(Colour::Red, p(2, 0), p(3, 0)).unwrap();
        game.place_village(Colour::Blue, p(6, 0)).unwrap();
        game.place_road(Colour::Blue, p(6, 0), p(7, 0)).unwrap();
        game.place_village(Colour::Blue, p(8, 2)).unwrap();
        game.place_road(Colour::Blue, p(8, 2), p(9, 2)).unwrap();
        game.place_village(Colour::Red, p(2, 4)).unwrap();
        game.place_road(Colour::Red, p(2, 4), p(3, 4)).unwrap();
        game
    }

    #[test]
    fn test_player_count() {
        assert_eq!(
            Game::with_board(game(2).board.clone(), 1),
            Err(PlayerError::InvalidPlayerCount(1).into())
        );
        assert_eq!(
            Game::new(5, &mut StdRng::seed_from_u64(0)).unwrap_err().code(),
            "invalid_player_count"
        );
        let game = Game::new(4, &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(game.players().len(), 4);
        assert!(game.is_setup());
        assert_eq!(game.state(), State::InitialVillage);
    }

    #[test]
    fn test_unknown_player() {
        let mut game = game(2);
        assert_eq!(
            game.place_village(Colour::Green, p(2, 0)),
            Err(PlayerError::UnknownPlayer(Colour::Green).into())
        );
    }

    #[test]
    fn test_setup_snake_order() {
        let mut game = game(2);
        assert_eq!(game.current_colour(), Colour::Red);
        assert_eq!(
            game.place_village(Colour::Blue, p(6, 0)),
            Err(StateError::NotYourTurn.into())
        );

        game.place_village(Colour::Red, p(2, 0)).unwrap();
        game.place_road(Colour::Red, p(2, 0), p(3, 0)).unwrap();
        assert_eq!(game.current_colour(), Colour::Blue);
        game.place_village(Colour::Blue, p(6, 0)).unwrap();
        game.place_road(Colour::Blue, p(6, 0), p(7, 0)).unwrap();
        assert_eq!(game.current_colour(), Colour::Blue, "last seat goes twice");
        game.place_village(Colour::Blue, p(8, 2)).unwrap();
        game.place_road(Colour::Blue, p(8, 2), p(9, 2)).unwrap();
        assert_eq!(game.current_colour(), Colour::Red);
        game.place_village(Colour::Red, p(2, 4)).unwrap();
        game.place_road(Colour::Red, p(2, 4), p(3, 4)).unwrap();

        assert!(!game.is_setup());
        assert_eq!(game.current_colour(), Colour::Red);
        assert_eq!(game.state(), State::BeforeRoll);
    }

    #[test]
    fn test_setup_road_must_touch_new_village() {
        let mut game = game(2);
        game.place_village(Colour::Red, p(2, 0)).unwrap();
        assert_eq!(
            game.place_road(Colour::Red, p(4, 2), p(5, 2)),
            Err(BoardError::NotConnected.into())
        );
    }

    #[test]
    fn test_second_village_collects_resources() {
        let game = after_setup();
        let red = game.player(Colour::Red).unwrap();
        // (2,4) touches tiles (0,3) and (0,4), both wood
        assert_eq!(red.resources, ItemManager::with([(Resource::Wood, 2)]));
        assert_eq!(red.score.visible, 2);
        assert_eq!(red.pieces.get(Piece::Village), 3);
        assert_eq!(red.pieces.get(Piece::Road), 13);

        // (8,2) touches (3,1), (3,2) and (4,2), all wood
        let blue = game.player(Colour::Blue).unwrap();
        assert_eq!(blue.resources.get(Resource::Wood), 3);
        assert_eq!(game.bank().resources.get(Resource::Wood), 14);
    }

    #[test]
    fn test_roll_pays_out() {
        let mut game = after_setup();
        let mut rng = StdRng::seed_from_u64(0);
        let dice = game.roll_dice(Colour::Red, &mut rng).unwrap();
        assert_eq!(game.last_roll(), Some(dice));
        assert_eq!(game.rolls().len(), 1);
        let total = dice.0 + dice.1;
        if total == 7 {
            assert_eq!(game.state(), State::MoveThief);
        } else {
            assert_eq!(game.state(), State::AfterRoll);
        }
        assert_eq!(
            game.roll_dice(Colour::Red, &mut rng),
            Err(StateError::InvalidAction {
                action: Action::RollDice,
                state: game.state()
            }
            .into())
        );
    }

    #[test]
    fn test_distribution_withholds_short_resource() {
        let mut game = after_setup();
        game.bank.resources = ItemManager::with([(Resource::Wood, 1)]);
        game.distribute_resources(5);
        assert_eq!(game.player(Colour::Red).unwrap().resources.get(Resource::Wood), 2);
        assert_eq!(game.bank.resources.get(Resource::Wood), 1);
    }

    #[test]
    fn test_distribution_pays_everyone() {
        let mut game = after_setup();
        game.distribute_resources(5);
        // Red: (2,0) one tile, (2,4) two tiles; blue: (6,0) two, (8,2) three
        assert_eq!(game.player(Colour::Red).unwrap().resources.get(Resource::Wood), 5);
        assert_eq!(game.player(Colour::Blue).unwrap().resources.get(Resource::Wood), 8);
    }

    #[test]
    fn test_pair_mut() {
        let mut players = vec![Player::new(Colour::Red), Player::new(Colour::Blue)];
        let (a, b) = pair_mut(&mut players, 1, 0);
        assert_eq!((a.colour, b.colour), (Colour::Blue, Colour::Red));
        let (a, b) = pair_mut(&mut players, 0, 1);
        assert_eq!((a.colour, b.colour), (Colour::Red, Colour::Blue));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let game = after_setup();
        let snapshot = game.to_snapshot().unwrap();
        let back = Game::from_snapshot(&snapshot).unwrap();
        assert_eq!(back, game);
    }
}
