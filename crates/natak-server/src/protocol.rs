//! WebSocket protocol messages for Natak.

use natak_core::{ActionOutcome, Audience, Colour, GameAction, GameView};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Start a game on a freshly shuffled board
    CreateGame { players: usize },

    /// Take a seat, after which this connection alone may act as `colour`
    ClaimSeat { game_id: Uuid, colour: Colour },

    /// Act as `colour` in a game. The seat must be claimed first.
    Act {
        game_id: Uuid,
        colour: Colour,
        action: GameAction,
    },

    /// Fetch a game and receive its updates from now on. A player audience
    /// needs that player's seat.
    GetGame { game_id: Uuid, audience: Audience },

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Game created, seen by an observer
    GameCreated { game_id: Uuid, view: GameView },

    /// Seat taken, with the game as its player sees it
    SeatClaimed {
        game_id: Uuid,
        colour: Colour,
        view: GameView,
    },

    /// Action applied, with the game as the actor now sees it
    ActionResult {
        game_id: Uuid,
        outcome: ActionOutcome,
        view: GameView,
    },

    /// Current game state for one audience
    GameView { view: GameView },

    /// Request failed. `code` is stable, `message` is for humans.
    Error { code: String, message: String },

    /// Pong response
    Pong,
}

impl ServerMessage {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        ServerMessage::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}
