use serde::{Deserialize, Serialize};

/// Tunable timings and thresholds for a name game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Seconds a player has to make a pick.
    pub turn_secs: u32,
    /// Length of the window in which players may overturn an accepted pick.
    pub override_vote_secs: u32,
    /// Length of the vote required for a low-similarity pick.
    pub mandatory_vote_secs: u32,
    /// Similarity strictly above this commits a pick without a vote.
    pub accept_ratio: u8,
    /// Strikes that eliminate a player.
    pub max_strikes: u8,
    /// A win requires strictly more completed turns than this.
    pub min_turns_for_win: u32,
    /// Displays are refreshed whenever a countdown is a multiple of this.
    pub refresh_every_secs: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            turn_secs: 60,
            override_vote_secs: 20,
            mandatory_vote_secs: 60,
            accept_ratio: 60,
            max_strikes: 3,
            min_turns_for_win: 6,
            refresh_every_secs: 5,
        }
    }
}

impl Rules {
    pub(crate) fn turn_time(&self) -> i32 {
        secs(self.turn_secs)
    }

    pub(crate) fn override_vote_time(&self) -> i32 {
        secs(self.override_vote_secs)
    }

    pub(crate) fn mandatory_vote_time(&self) -> i32 {
        secs(self.mandatory_vote_secs)
    }

    pub(crate) fn is_refresh_point(&self, remaining: i32) -> bool {
        let every = secs(self.refresh_every_secs).max(1);
        remaining >= 0 && remaining % every == 0
    }
}

fn secs(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_game() {
        let rules = Rules::default();
        assert_eq!(rules.turn_time(), 60);
        assert_eq!(rules.override_vote_time(), 20);
        assert_eq!(rules.mandatory_vote_time(), 60);
        assert_eq!(rules.accept_ratio, 60);
        assert_eq!(rules.max_strikes, 3);
    }

    #[test]
    fn refresh_points() {
        let rules = Rules::default();
        assert!(rules.is_refresh_point(55));
        assert!(rules.is_refresh_point(0));
        assert!(!rules.is_refresh_point(54));
        assert!(!rules.is_refresh_point(-1));
    }
}
