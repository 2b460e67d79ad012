//! Player-to-player trade offers.
//!
//! At most one offer is open at a time. The offering player's resources are
//! not reserved; the offer is only checked against both hands when someone
//! accepts it.

use crate::board::{Colour, Resource};
use crate::cards::ItemManager;
use crate::error::{GameError, PlayerError, TradeError};
use crate::player::Player;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeOffer {
    pub offerer: Colour,
    /// What the offerer gives
    pub offer: ItemManager<Resource>,
    /// What the offerer wants in return
    pub request: ItemManager<Resource>,
    pub rejected_by: BTreeSet<Colour>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeManager {
    offer: Option<TradeOffer>,
}

impl TradeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offer(&self) -> Option<&TradeOffer> {
        self.offer.as_ref()
    }

    /// Open a new offer, replacing any existing one
    pub fn make_offer(
        &mut self,
        offerer: Colour,
        offer: ItemManager<Resource>,
        request: ItemManager<Resource>,
    ) -> Result<(), TradeError> {
        if offer.is_empty() || request.is_empty() {
            return Err(TradeError::InvalidOffer);
        }
        self.offer = Some(TradeOffer {
            offerer,
            offer,
            request,
            rejected_by: BTreeSet::new(),
        });
        Ok(())
    }

    /// Check that `responder` can accept the open offer from `offerer`
    pub fn check_accept(&self, offerer: &Player, responder: &Player) -> Result<(), GameError> {
        let offer = self.offer.as_ref().ok_or(TradeError::NoActiveOffer)?;
        if responder.colour == offer.offerer {
            return Err(TradeError::CannotTradeWithSelf.into());
        }
        if offerer.has_embargoed(responder.colour) || responder.has_embargoed(offerer.colour) {
            return Err(TradeError::Embargoed.into());
        }
        if !responder.resources.contains(&offer.request) || !offerer.resources.contains(&offer.offer)
        {
            return Err(PlayerError::MissingResources.into());
        }
        Ok(())
    }

    /// Swap both bundles and close the offer
    pub fn accept(&mut self, offerer: &mut Player, responder: &mut Player) -> Result<(), GameError> {
        self.check_accept(offerer, responder)?;
        let offer = self.offer.take().ok_or(TradeError::NoActiveOffer)?;

        offerer.resources.remove_all(&offer.offer)?;
        responder.resources.remove_all(&offer.request)?;
        offerer.resources.add_all(&offer.request);
        responder.resources.add_all(&offer.offer);
        Ok(())
    }

    pub fn reject(&mut self, responder: Colour) -> Result<(), TradeError> {
        let offer = self.offer.as_mut().ok_or(TradeError::NoActiveOffer)?;
        if offer.offerer == responder {
            return Err(TradeError::CannotTradeWithSelf);
        }
        offer.rejected_by.insert(responder);
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.offer = None;
    }
}
