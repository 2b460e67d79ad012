//! WebSocket server and connection handling.

use crate::config::ServerConfig;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::store::MemoryStore;
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use natak_core::{
    ActionOutcome, Audience, Colour, Game, GameAction, GameStore, GameView, StoreError,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Server state shared across all connections.
pub struct ServerState {
    pub config: ServerConfig,
    pub store: MemoryStore,
    /// Mapping from connection ID to its message sender
    pub connections: DashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>,
    /// Connections following each game, and as whom
    pub watchers: DashMap<Uuid, Vec<(Uuid, Audience)>>,
    /// Connection holding each claimed seat
    pub seats: DashMap<(Uuid, Colour), Uuid>,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            store: MemoryStore::new(),
            connections: DashMap::new(),
            watchers: DashMap::new(),
            seats: DashMap::new(),
        }
    }

    /// Send a message to a specific connection.
    pub fn send_to(&self, connection: Uuid, msg: ServerMessage) {
        if let Some(sender) = self.connections.get(&connection) {
            let _ = sender.send(msg);
        }
    }

    /// Follow a game's updates, replacing any earlier audience.
    pub fn watch(&self, game_id: Uuid, connection: Uuid, audience: Audience) {
        let mut watchers = self.watchers.entry(game_id).or_default();
        watchers.retain(|(c, _)| *c != connection);
        watchers.push((connection, audience));
    }

    /// Send every watcher except `except` the game as their audience sees it.
    pub fn broadcast_views(&self, game: &Game, except: Uuid) {
        let Some(watchers) = self.watchers.get(&game.id).map(|w| w.value().clone()) else {
            return;
        };
        for (connection, audience) in watchers {
            if connection != except {
                let view = GameView::new(game, audience);
                self.send_to(connection, ServerMessage::GameView { view });
            }
        }
    }

    /// Take a seat for `connection`. Fails if another connection holds it.
    pub fn claim_seat(&self, game_id: Uuid, colour: Colour, connection: Uuid) -> bool {
        let holder = *self.seats.entry((game_id, colour)).or_insert(connection);
        holder == connection
    }

    pub fn holds_seat(&self, game_id: Uuid, colour: Colour, connection: Uuid) -> bool {
        self.seats
            .get(&(game_id, colour))
            .is_some_and(|holder| *holder == connection)
    }

    /// Stop following every game and give up every seat.
    pub fn forget(&self, connection: Uuid) {
        self.seats.retain(|_, holder| *holder != connection);
        for mut watchers in self.watchers.iter_mut() {
            watchers.retain(|(c, _)| *c != connection);
        }
        self.watchers.retain(|_, watchers| !watchers.is_empty());
    }
}

/// Run the WebSocket server.
pub async fn run_server(state: Arc<ServerState>) -> anyhow::Result<()> {
    let addr = state.config.addr;
    let listener = TcpListener::bind(addr).await?;
    info!("Natak server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let connection = Uuid::new_v4();

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.connections.insert(connection, tx);

    // Forward queued messages to the socket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
        }
    });

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => handle_message(connection, client_msg, &state),
                Err(e) => {
                    warn!("Invalid message from {}: {}", connection, e);
                    state.send_to(connection, ServerMessage::error("invalid_message", e.to_string()));
                }
            },
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", connection);
                break;
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", connection, e);
                break;
            }
            _ => {}
        }
    }

    state.forget(connection);
    state.connections.remove(&connection);
    send_task.abort();

    info!("Connection closed for {}", connection);
    Ok(())
}

/// Handle a client message.
pub fn handle_message(connection: Uuid, msg: ClientMessage, state: &ServerState) {
    match msg {
        ClientMessage::CreateGame { players } => {
            match create_game(players, state) {
                Ok(game) => {
                    info!(game = %game.id, players, "game created");
                    state.watch(game.id, connection, Audience::Observer);
                    let view = GameView::new(&game, Audience::Observer);
                    state.send_to(connection, ServerMessage::GameCreated { game_id: game.id, view });
                }
                Err(e) => state.send_to(connection, error_message(&e)),
            }
        }

        ClientMessage::ClaimSeat { game_id, colour } => match state.store.get(game_id) {
            Ok(Some(game)) => {
                if let Err(e) = game.player(colour) {
                    state.send_to(connection, error_message(&StoreError::Game(e)));
                } else if !state.claim_seat(game_id, colour, connection) {
                    debug!(game = %game_id, ?colour, "seat already held");
                    state.send_to(
                        connection,
                        ServerMessage::error("seat_taken", format!("{colour:?} is already seated")),
                    );
                } else {
                    info!(game = %game_id, ?colour, %connection, "seat claimed");
                    let audience = Audience::Player(colour);
                    state.watch(game_id, connection, audience);
                    let view = GameView::new(&game, audience);
                    state.send_to(connection, ServerMessage::SeatClaimed { game_id, colour, view });
                }
            }
            Ok(None) => state.send_to(connection, error_message(&StoreError::NotFound(game_id))),
            Err(e) => state.send_to(connection, error_message(&e)),
        },

        ClientMessage::Act { game_id, colour, .. }
            if !state.holds_seat(game_id, colour, connection) =>
        {
            warn!(game = %game_id, ?colour, %connection, "action from unseated connection");
            state.send_to(connection, seat_not_held(colour));
        }

        ClientMessage::Act {
            game_id,
            colour,
            action,
        } => match act(game_id, colour, action, state) {
            Ok((outcome, game)) => {
                state.watch(game_id, connection, Audience::Player(colour));
                let view = GameView::new(&game, Audience::Player(colour));
                state.send_to(
                    connection,
                    ServerMessage::ActionResult {
                        game_id,
                        outcome,
                        view,
                    },
                );
                state.broadcast_views(&game, connection);

                if let Some(winner) = game.winner() {
                    info!(game = %game_id, ?winner, "game finished");
                }
            }
            Err(e) => {
                debug!(game = %game_id, ?colour, error = %e, "action rejected");
                state.send_to(connection, error_message(&e));
            }
        },

        ClientMessage::GetGame {
            game_id,
            audience: Audience::Player(colour),
        } if !state.holds_seat(game_id, colour, connection) => {
            state.send_to(connection, seat_not_held(colour));
        }

        ClientMessage::GetGame { game_id, audience } => match state.store.get(game_id) {
            Ok(Some(game)) => {
                state.watch(game_id, connection, audience);
                let view = GameView::new(&game, audience);
                state.send_to(connection, ServerMessage::GameView { view });
            }
            Ok(None) => state.send_to(connection, error_message(&StoreError::NotFound(game_id))),
            Err(e) => state.send_to(connection, error_message(&e)),
        },

        ClientMessage::Ping => {
            state.send_to(connection, ServerMessage::Pong);
        }
    }
}

fn create_game(players: usize, state: &ServerState) -> Result<Game, StoreError> {
    let game = Game::new(players, &mut rand::thread_rng())?;
    state.store.put(game.id, &game, state.config.game_ttl)?;
    Ok(game)
}

/// Apply one action through the store, returning the outcome and the game after it
fn act(
    game_id: Uuid,
    colour: Colour,
    action: GameAction,
    state: &ServerState,
) -> Result<(ActionOutcome, Game), StoreError> {
    let mut rng = rand::thread_rng();
    state.store.update(game_id, state.config.game_ttl, |game| {
        let outcome = game.apply_action(colour, action, &mut rng)?;
        Ok((outcome, game.clone()))
    })
}

fn seat_not_held(colour: Colour) -> ServerMessage {
    ServerMessage::error(
        "seat_not_held",
        format!("Claim the {colour:?} seat before acting or looking as it"),
    )
}

/// Map a store failure onto the wire error
fn error_message(err: &StoreError) -> ServerMessage {
    let code = match err {
        StoreError::NotFound(_) => "game_not_found",
        StoreError::Snapshot(_) => "corrupt_snapshot",
        StoreError::Game(e) => e.code(),
    };
    ServerMessage::error(code, err.to_string())
}
