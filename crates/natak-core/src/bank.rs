//! The bank: shared resource and growth card supply.

use crate::board::Resource;
use crate::cards::{GrowthCard, ItemManager};
use crate::error::{GameError, PlayerError, TradeError};
use crate::player::Player;
use serde::{Deserialize, Serialize};

/// Cards of each resource the bank starts with
pub const BANK_RESOURCES: u32 = 19;

/// The shared supply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    pub resources: ItemManager<Resource>,
    pub growth_cards: ItemManager<GrowthCard>,
}

impl Default for Bank {
    fn default() -> Self {
        Self::new()
    }
}

impl Bank {
    pub fn new() -> Self {
        Self {
            resources: ItemManager::uniform(BANK_RESOURCES),
            growth_cards: ItemManager::with([
                (GrowthCard::Soldier, 14),
                (GrowthCard::VictoryPoint, 5),
                (GrowthCard::Roaming, 2),
                (GrowthCard::Wealth, 2),
                (GrowthCard::Gatherer, 2),
            ]),
        }
    }

    /// Check a maritime trade: `amount` of `get` for `amount × ratio` of `give`
    pub fn check_trade(
        &self,
        player: &Player,
        give: Resource,
        get: Resource,
        amount: u32,
    ) -> Result<(), GameError> {
        if give == get {
            return Err(TradeError::InvalidResource(give).into());
        }
        let cost = Self::trade_cost(player, give, amount)?;
        if player.resources.get(give) < cost {
            return Err(PlayerError::MissingResources.into());
        }
        if self.resources.get(get) < amount {
            return Err(TradeError::BankMissingResources.into());
        }
        Ok(())
    }

    /// Cards of `give` paid for `amount` cards. Zero or overflowing amounts
    /// are not a valid offer.
    fn trade_cost(player: &Player, give: Resource, amount: u32) -> Result<u32, TradeError> {
        if amount == 0 {
            return Err(TradeError::InvalidOffer);
        }
        amount
            .checked_mul(player.best_ratio(give))
            .ok_or(TradeError::InvalidOffer)
    }

    /// Trade with the bank at the player's best ratio
    pub fn trade(
        &mut self,
        player: &mut Player,
        give: Resource,
        get: Resource,
        amount: u32,
    ) -> Result<(), GameError> {
        self.check_trade(player, give, get, amount)?;
        let cost = Self::trade_cost(player, give, amount)?;

        player.resources.remove(give, cost)?;
        self.resources.add(give, cost);
        self.resources.remove(get, amount)?;
        player.resources.add(get, amount);
        Ok(())
    }
}
