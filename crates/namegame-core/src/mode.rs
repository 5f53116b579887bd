use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Robotics program whose teams are being named.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Frc,
    Ftc,
}

impl GameMode {
    pub const ALL: [GameMode; 2] = [GameMode::Frc, GameMode::Ftc];

    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Frc => "frc",
            GameMode::Ftc => "ftc",
        }
    }

    /// Case-insensitive lookup; `None` for unsupported modes.
    pub fn from_str_opt(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Comma-separated list of every supported mode.
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameMode {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_opt(s).ok_or_else(|| GameError::UnsupportedMode(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("FRC".parse::<GameMode>(), Ok(GameMode::Frc));
        assert_eq!(" ftc ".parse::<GameMode>(), Ok(GameMode::Ftc));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert_eq!(
            "vex".parse::<GameMode>(),
            Err(GameError::UnsupportedMode("vex".to_string()))
        );
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&GameMode::Ftc).unwrap();
        assert_eq!(json, "\"ftc\"");
        assert_eq!(GameMode::supported_list(), "frc, ftc");
    }
}
