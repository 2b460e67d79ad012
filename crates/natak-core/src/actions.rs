//! Game actions that players can take.
//!
//! [`GameAction`] is the serializable form of every public action on
//! [`Game`](crate::Game), so transports can pass actions around as data.
//! [`Game::apply_action`](crate::Game::apply_action) dispatches them and
//! reports what happened as an [`ActionOutcome`].

use crate::board::{Colour, PortKind, Resource};
use crate::cards::{GrowthCard, ItemManager};
use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// All possible actions a player can take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum GameAction {
    // ====== Building ======
    /// Place a village (free during setup)
    PlaceVillage { point: Point },
    /// Place a road between two vertices (free during setup and roaming)
    PlaceRoad { first: Point, second: Point },
    /// Upgrade an owned village
    UpgradeToTown { point: Point },

    // ====== Turn ======
    RollDice,
    EndTurn,

    // ====== Thief ======
    /// Give back cards after a 7
    DiscardResources { cards: ItemManager<Resource> },
    MoveThief { tile: Point },
    StealResource { victim: Colour },

    // ====== Growth cards ======
    BuyGrowthCard,
    PlaySoldierCard,
    PlayRoamingCard,
    PlayWealthCard { first: Resource, second: Resource },
    PlayGathererCard { resource: Resource },

    // ====== Trading ======
    /// Trade `amount × ratio` of `give` for `amount` of `get`
    TradeWithBank {
        give: Resource,
        get: Resource,
        amount: u32,
    },
    MakeTradeOffer {
        offer: ItemManager<Resource>,
        request: ItemManager<Resource>,
    },
    AcceptTradeOffer,
    RejectTradeOffer,
    CancelTradeOffer,
    AddEmbargo { target: Colour },
    RemoveEmbargo { target: Colour },
}

/// What a successful action produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ActionOutcome {
    /// Nothing beyond the state change itself
    Done,
    /// A village was placed; `port` is the harbour it gained access to
    VillagePlaced { port: Option<PortKind> },
    DiceRolled { dice: (u8, u8), total: u8 },
    /// `resource` is `None` when the victim had no cards
    ResourceStolen { resource: Option<Resource> },
    GrowthCardBought { card: GrowthCard },
    ResourcesGathered { resource: Resource, amount: u32 },
}
