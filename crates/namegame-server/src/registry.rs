use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use namegame_core::GameError;

use crate::ChannelId;
use crate::game::GameHandle;

/// Running games, at most one per channel.
///
/// The registry lock is only ever held for map operations; callers clone the
/// handle out and release it before touching a session.
#[derive(Default)]
pub struct SessionRegistry {
    games: RwLock<HashMap<ChannelId, Arc<GameHandle>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handle` for its channel unless a game is already there.
    pub async fn insert_if_absent(&self, handle: Arc<GameHandle>) -> Result<(), GameError> {
        let mut games = self.games.write().await;
        let channel = handle.channel();
        if games.contains_key(&channel) {
            return Err(GameError::GameAlreadyRunning);
        }
        games.insert(channel, handle);
        Ok(())
    }

    pub async fn get(&self, channel: ChannelId) -> Option<Arc<GameHandle>> {
        self.games.read().await.get(&channel).map(Arc::clone)
    }

    /// Remove the game in `channel` if it is still `handle`. A newer game
    /// started in the same channel is left alone.
    pub async fn remove(&self, handle: &Arc<GameHandle>) -> bool {
        let mut games = self.games.write().await;
        match games.get(&handle.channel()) {
            Some(current) if Arc::ptr_eq(current, handle) => {
                games.remove(&handle.channel());
                true
            },
            _ => false,
        }
    }

    /// Returns (active games, seated players).
    pub async fn stats(&self) -> (usize, usize) {
        let handles: Vec<Arc<GameHandle>> = self.games.read().await.values().map(Arc::clone).collect();
        let mut players = 0;
        for handle in &handles {
            players += handle.seated().await;
        }
        (handles.len(), players)
    }
}
