//! Persistent records: guild configuration, win leaderboards and team usage.
//!
//! Tables are accessed through the async [`Table`] trait so a database
//! backend can replace the in-memory one without touching the game code.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::RwLock;

use namegame_core::{GameMode, PlayerId, TeamNumber};

use crate::{ChannelId, GuildId};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record {0} already exists")]
    Duplicate(String),
    #[error("record {0} does not exist")]
    Missing(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A row with a unique key.
pub trait Record: Clone + Send + Sync + 'static {
    type Key: Eq + Hash + Clone + Debug + Send + Sync + 'static;

    fn key(&self) -> Self::Key;
}

/// Per-guild game settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuildConfig {
    pub guild_id: GuildId,
    /// Games may only be started here when set.
    pub channel_id: Option<ChannelId>,
    /// Mode used when a round is started without a valid one.
    pub mode: GameMode,
    pub pings_enabled: bool,
}

impl GuildConfig {
    pub fn new(guild_id: GuildId) -> Self {
        Self {
            guild_id,
            channel_id: None,
            mode: GameMode::default(),
            pings_enabled: false,
        }
    }
}

impl Record for GuildConfig {
    type Key = GuildId;

    fn key(&self) -> GuildId {
        self.guild_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub user_id: PlayerId,
    pub guild_id: GuildId,
    pub mode: GameMode,
    pub wins: u32,
}

impl Record for LeaderboardEntry {
    type Key = (PlayerId, GuildId, GameMode);

    fn key(&self) -> Self::Key {
        (self.user_id, self.guild_id, self.mode)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamStats {
    pub team: TeamNumber,
    pub mode: GameMode,
    pub nickname: String,
    pub uses: u32,
}

impl Record for TeamStats {
    type Key = (TeamNumber, GameMode);

    fn key(&self) -> Self::Key {
        (self.team, self.mode)
    }
}

pub type Filter<'a, R> = &'a (dyn Fn(&R) -> bool + Send + Sync);
pub type Merge<'a, R> = &'a (dyn Fn(&<R as Record>::Key, Option<R>) -> R + Send + Sync);

#[async_trait]
pub trait Table<R: Record>: Send + Sync {
    async fn select_one(&self, key: &R::Key) -> Result<Option<R>, StoreError>;

    /// Every record matching `filter`, in no particular order.
    async fn select(&self, filter: Filter<'_, R>) -> Result<Vec<R>, StoreError>;

    /// Fails with [`StoreError::Duplicate`] if the key is taken.
    async fn insert(&self, record: R) -> Result<(), StoreError>;

    /// Fails with [`StoreError::Missing`] if the key is absent.
    async fn update(&self, record: R) -> Result<(), StoreError>;

    /// Remove every record matching `filter`. Returns how many were removed.
    async fn delete_all(&self, filter: Filter<'_, R>) -> Result<usize, StoreError>;

    /// Insert or replace one record per key, computing each from the current
    /// one (if any). All keys are written together or not at all.
    async fn upsert_batch(&self, keys: &[R::Key], merge: Merge<'_, R>)
    -> Result<Vec<R>, StoreError>;
}

/// In-memory table.
pub struct MemoryTable<R: Record> {
    rows: RwLock<HashMap<R::Key, R>>,
}

impl<R: Record> Default for MemoryTable<R> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }
}

impl<R: Record> MemoryTable<R> {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl<R: Record> Table<R> for MemoryTable<R> {
    async fn select_one(&self, key: &R::Key) -> Result<Option<R>, StoreError> {
        Ok(self.rows.read().await.get(key).cloned())
    }

    async fn select(&self, filter: Filter<'_, R>) -> Result<Vec<R>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.values().filter(|r| filter(r)).cloned().collect())
    }

    async fn insert(&self, record: R) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        let key = record.key();
        if rows.contains_key(&key) {
            return Err(StoreError::Duplicate(format!("{key:?}")));
        }
        rows.insert(key, record);
        Ok(())
    }

    async fn update(&self, record: R) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        let key = record.key();
        match rows.get_mut(&key) {
            Some(slot) => {
                *slot = record;
                Ok(())
            },
            None => Err(StoreError::Missing(format!("{key:?}"))),
        }
    }

    async fn delete_all(&self, filter: Filter<'_, R>) -> Result<usize, StoreError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|_, r| !filter(r));
        Ok(before - rows.len())
    }

    async fn upsert_batch(
        &self,
        keys: &[R::Key],
        merge: Merge<'_, R>,
    ) -> Result<Vec<R>, StoreError> {
        let mut rows = self.rows.write().await;
        let merged: Vec<R> = keys
            .iter()
            .map(|key| merge(key, rows.get(key).cloned()))
            .collect();
        for record in &merged {
            rows.insert(record.key(), record.clone());
        }
        Ok(merged)
    }
}

/// Every table the game uses.
#[derive(Clone)]
pub struct Store {
    pub configs: Arc<dyn Table<GuildConfig>>,
    pub leaderboard: Arc<dyn Table<LeaderboardEntry>>,
    pub team_stats: Arc<dyn Table<TeamStats>>,
}

impl Store {
    pub fn in_memory() -> Self {
        Self {
            configs: Arc::new(MemoryTable::<GuildConfig>::new()),
            leaderboard: Arc::new(MemoryTable::<LeaderboardEntry>::new()),
            team_stats: Arc::new(MemoryTable::<TeamStats>::new()),
        }
    }

    /// The guild's config, or defaults when it has none stored.
    pub async fn guild_config(&self, guild: GuildId) -> Result<GuildConfig, StoreError> {
        Ok(self
            .configs
            .select_one(&guild)
            .await?
            .unwrap_or_else(|| GuildConfig::new(guild)))
    }

    /// Apply `change` to the guild's config, creating it first if needed.
    pub async fn edit_guild_config(
        &self,
        guild: GuildId,
        change: impl FnOnce(&mut GuildConfig),
    ) -> Result<GuildConfig, StoreError> {
        match self.configs.select_one(&guild).await? {
            Some(mut config) => {
                change(&mut config);
                self.configs.update(config.clone()).await?;
                Ok(config)
            },
            None => {
                let mut config = GuildConfig::new(guild);
                change(&mut config);
                self.configs.insert(config.clone()).await?;
                Ok(config)
            },
        }
    }

    /// Add one win for `user`. Returns the new total.
    pub async fn record_win(
        &self,
        guild: GuildId,
        mode: GameMode,
        user: PlayerId,
    ) -> Result<u32, StoreError> {
        let merged = self
            .leaderboard
            .upsert_batch(&[(user, guild, mode)], &|&(user_id, guild_id, mode), current| {
                let wins = current.map_or(0, |e| e.wins) + 1;
                LeaderboardEntry {
                    user_id,
                    guild_id,
                    mode,
                    wins,
                }
            })
            .await?;
        Ok(merged.first().map_or(1, |e| e.wins))
    }

    /// Count one use of every team picked in a finished game.
    pub async fn record_team_usage(
        &self,
        mode: GameMode,
        picks: &[(TeamNumber, String)],
    ) -> Result<(), StoreError> {
        if picks.is_empty() {
            return Ok(());
        }
        let names: HashMap<TeamNumber, &str> =
            picks.iter().map(|(t, n)| (*t, n.as_str())).collect();
        let keys: Vec<_> = picks.iter().map(|(t, _)| (*t, mode)).collect();
        self.team_stats
            .upsert_batch(&keys, &|&(team, mode), current| {
                let nickname = names.get(&team).copied().unwrap_or_default().to_string();
                match current {
                    Some(stats) => TeamStats {
                        uses: stats.uses + 1,
                        nickname,
                        ..stats
                    },
                    None => TeamStats {
                        team,
                        mode,
                        nickname,
                        uses: 1,
                    },
                }
            })
            .await?;
        Ok(())
    }

    /// Top `limit` players of a guild's leaderboard for `mode`, most wins first.
    pub async fn top_players(
        &self,
        guild: GuildId,
        mode: GameMode,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let mut entries = self
            .leaderboard
            .select(&|e: &LeaderboardEntry| e.guild_id == guild && e.mode == mode)
            .await?;
        entries.sort_by(|a, b| b.wins.cmp(&a.wins).then(a.user_id.cmp(&b.user_id)));
        entries.truncate(limit);
        Ok(entries)
    }

    /// Top `limit` most used teams for `mode`.
    pub async fn top_teams(&self, mode: GameMode, limit: usize) -> Result<Vec<TeamStats>, StoreError> {
        let mut stats = self
            .team_stats
            .select(&|s: &TeamStats| s.mode == mode)
            .await?;
        stats.sort_by(|a, b| b.uses.cmp(&a.uses).then(a.team.cmp(&b.team)));
        stats.truncate(limit);
        Ok(stats)
    }
}
