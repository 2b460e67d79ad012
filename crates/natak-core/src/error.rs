//! Rule-violation errors.
//!
//! Every public action returns one of these instead of panicking. They come in
//! four families so callers can branch on the broad category as well as the
//! specific rule, and [`GameError::code`] gives transports a stable string.

use crate::board::{Colour, Resource};
use crate::cards::GrowthCard;
use crate::geometry::Point;
use crate::state::{Action, State};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Board geometry and placement errors
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum BoardError {
    #[error("{0} is not on the board")]
    InvalidPoint(Point),

    #[error("{0} and {1} are not adjacent vertices")]
    InvalidEdge(Point, Point),

    #[error("A road already exists there")]
    RoadExists,

    #[error("Not connected to your roads or buildings")]
    NotConnected,

    #[error("A building already exists there")]
    OccupiedVertex,

    #[error("Too close to another building")]
    TooClose,

    #[error("There is no building at {0}")]
    NoHouse(Point),

    #[error("You don't own that building")]
    NotOwned,

    #[error("That building is already a town")]
    AlreadyUpgraded,

    #[error("The thief must move to a different tile")]
    SameLocation,
}

/// Player inventory and resource errors
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PlayerError {
    #[error("Not enough items")]
    NotEnough,

    #[error("Nothing to take")]
    NotFound,

    #[error("Missing resources")]
    MissingResources,

    #[error("No pieces remaining")]
    NoPiecesRemaining,

    #[error("No playable {0:?} card")]
    NoPlayableCard(GrowthCard),

    #[error("Must discard exactly {expected} cards, got {actual}")]
    IncorrectDiscardCount { expected: u32, actual: u32 },

    #[error("Cannot steal from yourself")]
    CannotStealFromSelf,

    #[error("{0:?} has no building next to the thief")]
    InvalidVictim(Colour),

    #[error("{0:?} is not playing")]
    UnknownPlayer(Colour),

    #[error("A game needs 2 to 4 players, not {0}")]
    InvalidPlayerCount(usize),
}

/// Turn and phase errors
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum StateError {
    #[error("{action:?} is not allowed during {state:?}")]
    InvalidAction { action: Action, state: State },

    #[error("Not your turn")]
    NotYourTurn,

    #[error("A growth card was already played this turn")]
    DevelopmentCardAlreadyPlayed,
}

/// Trading and embargo errors
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TradeError {
    #[error("Cannot trade {0:?} for itself")]
    InvalidResource(Resource),

    #[error("Cannot trade with yourself")]
    CannotTradeWithSelf,

    #[error("Trade blocked by an embargo")]
    Embargoed,

    #[error("No active trade offer")]
    NoActiveOffer,

    #[error("Invalid trade offer")]
    InvalidOffer,

    #[error("Cannot embargo yourself")]
    CannotEmbargoSelf,

    #[error("{0:?} is already embargoed")]
    AlreadyEmbargoed(Colour),

    #[error("{0:?} is not embargoed")]
    NotEmbargoed(Colour),

    #[error("The bank cannot supply that")]
    BankMissingResources,

    #[error("No growth cards left")]
    NoGrowthCardsLeft,
}

/// Any rule violation
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error(transparent)]
    Board(#[from] BoardError),

    #[error(transparent)]
    Player(#[from] PlayerError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Trade(#[from] TradeError),
}

impl GameError {
    /// Stable machine-readable name of the violated rule
    pub fn code(&self) -> &'static str {
        match self {
            GameError::Board(e) => match e {
                BoardError::InvalidPoint(_) => "invalid_point",
                BoardError::InvalidEdge(..) => "invalid_edge",
                BoardError::RoadExists => "road_exists",
                BoardError::NotConnected => "not_connected",
                BoardError::OccupiedVertex => "occupied_vertex",
                BoardError::TooClose => "too_close",
                BoardError::NoHouse(_) => "no_house",
                BoardError::NotOwned => "not_owned",
                BoardError::AlreadyUpgraded => "already_upgraded",
                BoardError::SameLocation => "same_location",
            },
            GameError::Player(e) => match e {
                PlayerError::NotEnough => "not_enough",
                PlayerError::NotFound => "not_found",
                PlayerError::MissingResources => "missing_resources",
                PlayerError::NoPiecesRemaining => "no_pieces_remaining",
                PlayerError::NoPlayableCard(_) => "no_playable_card",
                PlayerError::IncorrectDiscardCount { .. } => "incorrect_discard_count",
                PlayerError::CannotStealFromSelf => "cannot_steal_from_self",
                PlayerError::InvalidVictim(_) => "invalid_victim",
                PlayerError::UnknownPlayer(_) => "unknown_player",
                PlayerError::InvalidPlayerCount(_) => "invalid_player_count",
            },
            GameError::State(e) => match e {
                StateError::InvalidAction { .. } => "invalid_action",
                StateError::NotYourTurn => "not_your_turn",
                StateError::DevelopmentCardAlreadyPlayed => "development_card_already_played",
            },
            GameError::Trade(e) => match e {
                TradeError::InvalidResource(_) => "invalid_resource",
                TradeError::CannotTradeWithSelf => "cannot_trade_with_self",
                TradeError::Embargoed => "embargoed",
                TradeError::NoActiveOffer => "no_active_offer",
                TradeError::InvalidOffer => "invalid_offer",
                TradeError::CannotEmbargoSelf => "cannot_embargo_self",
                TradeError::AlreadyEmbargoed(_) => "already_embargoed",
                TradeError::NotEmbargoed(_) => "not_embargoed",
                TradeError::BankMissingResources => "bank_missing_resources",
                TradeError::NoGrowthCardsLeft => "no_growth_cards_left",
            },
        }
    }
}
