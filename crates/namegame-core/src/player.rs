use serde::{Deserialize, Serialize};

/// Unique identifier for a user taking part in games.
pub type PlayerId = u64;

/// A user as seen by the game: identity, display name, and whether the
/// account is automated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
    #[serde(default)]
    pub is_bot: bool,
}

impl Player {
    pub fn new(id: PlayerId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            is_bot: false,
        }
    }

    pub fn bot(id: PlayerId, display_name: impl Into<String>) -> Self {
        Self {
            is_bot: true,
            ..Self::new(id, display_name)
        }
    }

    /// Text used to ping the player in a channel.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}
