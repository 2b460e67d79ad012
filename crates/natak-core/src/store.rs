//! Storage collaborator.
//!
//! Games are stored as JSON snapshots keyed by id with a time to live. The
//! engine never holds a global cache; whoever issues actions is handed a
//! store and goes through [`GameStore::update`].

use crate::error::GameError;
use crate::game::Game;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Game {0} not found")]
    NotFound(Uuid),

    #[error("Corrupt snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error(transparent)]
    Game(#[from] GameError),
}

pub trait GameStore {
    /// Load a game, or `None` if it is unknown or expired
    fn get(&self, id: Uuid) -> Result<Option<Game>, StoreError>;

    /// Store a game, replacing any previous snapshot and resetting its expiry
    fn put(&self, id: Uuid, game: &Game, ttl: Duration) -> Result<(), StoreError>;

    fn remove(&self, id: Uuid);

    /// Load, modify and store a game. The game is only written back if `f`
    /// succeeds. Implementations that can be shared across threads should
    /// override this to hold the entry for the whole cycle.
    fn update<T, F>(&self, id: Uuid, ttl: Duration, f: F) -> Result<T, StoreError>
    where
        Self: Sized,
        F: FnOnce(&mut Game) -> Result<T, GameError>,
    {
        let mut game = self.get(id)?.ok_or(StoreError::NotFound(id))?;
        let value = f(&mut game)?;
        self.put(id, &game, ttl)?;
        Ok(value)
    }
}
