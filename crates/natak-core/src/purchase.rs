//! Purchases: everything that moves cards between a player and the bank.
//!
//! A purchase is checked first and applied second. Game actions check the
//! purchase, validate the board placement, and only then apply, so a rejected
//! action never charges the player.

use crate::bank::Bank;
use crate::board::Resource;
use crate::cards::{GrowthCard, ItemManager};
use crate::error::{GameError, PlayerError, TradeError};
use crate::player::{Piece, Player};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Purchase {
    Road,
    Village,
    Town,
    GrowthCard,
    /// Resources handed out by the bank for nothing
    FreeResources(ItemManager<Resource>),
    /// Cards returned to the bank after a 7
    Discard(ItemManager<Resource>),
}

impl Purchase {
    /// What the player pays
    pub fn cost(&self) -> ItemManager<Resource> {
        use Resource::*;
        match self {
            Purchase::Road => ItemManager::with([(Brick, 1), (Wood, 1)]),
            Purchase::Village => ItemManager::with([(Brick, 1), (Wood, 1), (Grain, 1), (Wool, 1)]),
            Purchase::Town => ItemManager::with([(Ore, 3), (Grain, 2)]),
            Purchase::GrowthCard => ItemManager::with([(Ore, 1), (Grain, 1), (Wool, 1)]),
            Purchase::FreeResources(_) => ItemManager::new(),
            Purchase::Discard(cards) => cards.clone(),
        }
    }

    fn piece(&self) -> Option<Piece> {
        match self {
            Purchase::Road => Some(Piece::Road),
            Purchase::Village => Some(Piece::Village),
            Purchase::Town => Some(Piece::Town),
            _ => None,
        }
    }

    pub fn check(&self, player: &Player, bank: &Bank) -> Result<(), GameError> {
        if let Some(piece) = self.piece() {
            if !player.has_piece(piece) {
                return Err(PlayerError::NoPiecesRemaining.into());
            }
        }
        match self {
            Purchase::GrowthCard if bank.growth_cards.is_empty() => {
                return Err(TradeError::NoGrowthCardsLeft.into());
            }
            Purchase::FreeResources(cards) if !bank.resources.contains(cards) => {
                return Err(TradeError::BankMissingResources.into());
            }
            Purchase::Discard(cards) if cards.total() != player.cards_to_discard => {
                return Err(PlayerError::IncorrectDiscardCount {
                    expected: player.cards_to_discard,
                    actual: cards.total(),
                }
                .into());
            }
            _ => {}
        }
        if !player.resources.contains(&self.cost()) {
            return Err(PlayerError::MissingResources.into());
        }
        Ok(())
    }

    /// Move the cards and apply the effect. Returns the growth card drawn,
    /// if this was a growth card purchase.
    ///
    /// # Panics
    ///
    /// If [`Purchase::check`] would have failed.
    pub fn apply<R: Rng>(
        &self,
        player: &mut Player,
        bank: &mut Bank,
        rng: &mut R,
    ) -> Option<GrowthCard> {
        let cost = self.cost();
        invariant(player.resources.remove_all(&cost));
        bank.resources.add_all(&cost);
        if let Some(piece) = self.piece() {
            invariant(player.take_piece(piece));
        }

        match self {
            Purchase::Road => None,
            Purchase::Village => {
                player.score.visible += 1;
                None
            }
            Purchase::Town => {
                player.return_piece(Piece::Village);
                player.score.visible += 1;
                None
            }
            Purchase::GrowthCard => {
                let card = invariant(bank.growth_cards.remove_random(rng));
                if card == GrowthCard::VictoryPoint {
                    player.score.hidden += 1;
                }
                player.growth_cards.add_on_hold(card);
                Some(card)
            }
            Purchase::FreeResources(cards) => {
                invariant(bank.resources.remove_all(cards));
                player.resources.add_all(cards);
                None
            }
            Purchase::Discard(_) => {
                player.cards_to_discard = 0;
                None
            }
        }
    }

    /// Check, then apply
    pub fn make<R: Rng>(
        &self,
        player: &mut Player,
        bank: &mut Bank,
        rng: &mut R,
    ) -> Result<Option<GrowthCard>, GameError> {
        self.check(player, bank)?;
        Ok(self.apply(player, bank, rng))
    }
}

fn invariant<T>(result: Result<T, PlayerError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => panic!("purchase applied after a failed check: {}", e),
    }
}
