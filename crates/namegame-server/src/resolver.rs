//! Canonical team name lookups.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use namegame_core::{GameMode, TeamNumber, similarity};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("team lookup failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("team lookup returned status {0}")]
    Status(u16),
    #[error("failed to read roster: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse roster: {0}")]
    Roster(#[from] toml::de::Error),
}

/// Looks up the canonical name of a team and scores guesses against it.
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// `Ok(None)` when the team does not exist.
    async fn lookup(&self, mode: GameMode, team: TeamNumber) -> Result<Option<String>, ResolveError>;

    fn similarity(&self, guess: &str, actual: &str) -> u8 {
        similarity::ratio(guess, actual)
    }
}

/// Team names read from a TOML file with one table per mode:
///
/// ```toml
/// [frc]
/// 254 = "The Cheesy Poofs"
/// ```
#[derive(Debug, Default, Clone)]
pub struct RosterResolver {
    teams: HashMap<(GameMode, TeamNumber), String>,
}

impl RosterResolver {
    pub fn from_entries(entries: impl IntoIterator<Item = (GameMode, TeamNumber, String)>) -> Self {
        Self {
            teams: entries
                .into_iter()
                .map(|(mode, team, name)| ((mode, team), name))
                .collect(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ResolveError> {
        let sections: HashMap<String, HashMap<String, String>> = toml::from_str(content)?;
        let mut teams = HashMap::new();
        for (mode_name, entries) in sections {
            let Some(mode) = GameMode::from_str_opt(&mode_name) else {
                tracing::warn!(mode = %mode_name, "Skipping roster section for unsupported mode");
                continue;
            };
            for (number, name) in entries {
                match number.parse::<TeamNumber>() {
                    Ok(team) => {
                        teams.insert((mode, team), name);
                    },
                    Err(_) => tracing::warn!(%mode, key = %number, "Skipping non-numeric roster entry"),
                }
            }
        }
        Ok(Self { teams })
    }

    pub async fn load(path: &str) -> Result<Self, ResolveError> {
        let content = tokio::fs::read_to_string(path).await?;
        let roster = Self::from_toml_str(&content)?;
        tracing::info!(path, teams = roster.len(), "Loaded team roster");
        Ok(roster)
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

#[async_trait]
impl NameResolver for RosterResolver {
    async fn lookup(&self, mode: GameMode, team: TeamNumber) -> Result<Option<String>, ResolveError> {
        Ok(self.teams.get(&(mode, team)).cloned())
    }
}

/// FRC team names from The Blue Alliance API v3.
pub struct TbaResolver {
    client: reqwest::Client,
    base_url: String,
    auth_key: String,
}

#[derive(Deserialize)]
struct TbaTeam {
    nickname: Option<String>,
}

impl TbaResolver {
    pub fn new(base_url: impl Into<String>, auth_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_key: auth_key.into(),
        }
    }
}

#[async_trait]
impl NameResolver for TbaResolver {
    async fn lookup(&self, mode: GameMode, team: TeamNumber) -> Result<Option<String>, ResolveError> {
        if mode != GameMode::Frc {
            return Ok(None);
        }
        let url = format!("{}/team/frc{team}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .header("X-TBA-Auth-Key", &self.auth_key)
            .send()
            .await?;
        match resp.status() {
            reqwest::StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body: TbaTeam = resp.json().await?;
                Ok(Some(body.nickname.unwrap_or_default()))
            },
            status => {
                tracing::warn!(team, status = status.as_u16(), "Unexpected TBA response");
                Err(ResolveError::Status(status.as_u16()))
            },
        }
    }
}

/// Sends the modes a remote source serves to it and everything else to a
/// fallback.
pub struct LayeredResolver {
    remote: Arc<dyn NameResolver>,
    remote_modes: Vec<GameMode>,
    fallback: Arc<dyn NameResolver>,
}

impl LayeredResolver {
    pub fn new(
        remote: Arc<dyn NameResolver>,
        remote_modes: Vec<GameMode>,
        fallback: Arc<dyn NameResolver>,
    ) -> Self {
        Self {
            remote,
            remote_modes,
            fallback,
        }
    }
}

#[async_trait]
impl NameResolver for LayeredResolver {
    async fn lookup(&self, mode: GameMode, team: TeamNumber) -> Result<Option<String>, ResolveError> {
        if self.remote_modes.contains(&mode) {
            self.remote.lookup(mode, team).await
        } else {
            self.fallback.lookup(mode, team).await
        }
    }
}

/// Build the resolver described by the config: the roster (if any) for
/// every mode, with FRC going to The Blue Alliance when a key is set.
pub async fn from_config(
    config: &crate::config::ResolverConfig,
) -> Result<Arc<dyn NameResolver>, ResolveError> {
    let roster = match &config.roster_path {
        Some(path) => RosterResolver::load(path).await?,
        None => RosterResolver::default(),
    };
    let roster: Arc<dyn NameResolver> = Arc::new(roster);
    Ok(match &config.tba_key {
        Some(key) => Arc::new(LayeredResolver::new(
            Arc::new(TbaResolver::new(&config.tba_base_url, key)),
            vec![GameMode::Frc],
            roster,
        )),
        None => roster,
    })
}
