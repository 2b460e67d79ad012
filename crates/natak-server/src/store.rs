//! In-memory game store with expiry.

use dashmap::DashMap;
use natak_core::{Game, GameError, GameStore, StoreError};
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

struct Entry {
    expires: Instant,
    snapshot: String,
}

impl Entry {
    fn new(game: &Game, ttl: Duration) -> Result<Self, StoreError> {
        Ok(Self {
            expires: Instant::now() + ttl,
            snapshot: game.to_snapshot()?,
        })
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires
    }
}

/// Snapshots keyed by game id
#[derive(Default)]
pub struct MemoryStore {
    games: DashMap<Uuid, Entry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Drop every expired game, returning how many went
    pub fn purge_expired(&self) -> usize {
        let before = self.games.len();
        self.games.retain(|_, entry| !entry.is_expired());
        let purged = before.saturating_sub(self.games.len());
        if purged > 0 {
            debug!(purged, "expired games removed");
        }
        purged
    }
}

impl GameStore for MemoryStore {
    fn get(&self, id: Uuid) -> Result<Option<Game>, StoreError> {
        match self.games.get(&id) {
            None => return Ok(None),
            Some(entry) if !entry.is_expired() => {
                return Ok(Some(Game::from_snapshot(&entry.snapshot)?));
            }
            Some(_) => {}
        }
        self.games.remove(&id);
        Ok(None)
    }

    fn put(&self, id: Uuid, game: &Game, ttl: Duration) -> Result<(), StoreError> {
        self.games.insert(id, Entry::new(game, ttl)?);
        Ok(())
    }

    fn remove(&self, id: Uuid) {
        self.games.remove(&id);
    }

    /// Holds the entry for the whole cycle, so concurrent actions on one game
    /// run one after another
    fn update<T, F>(&self, id: Uuid, ttl: Duration, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Game) -> Result<T, GameError>,
    {
        let mut entry = match self.games.get_mut(&id) {
            Some(entry) if !entry.is_expired() => entry,
            _ => return Err(StoreError::NotFound(id)),
        };
        let mut game = Game::from_snapshot(&entry.snapshot)?;
        let value = f(&mut game)?;
        *entry = Entry::new(&game, ttl)?;
        Ok(value)
    }
}
