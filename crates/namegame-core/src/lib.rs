pub mod error;
pub mod events;
pub mod mode;
pub mod player;
pub mod rules;
pub mod session;
pub mod similarity;
pub mod team;
pub mod view;

pub use error::GameError;
pub use events::{GameEvent, GameOver, SkipReason};
pub use mode::GameMode;
pub use player::{Player, PlayerId};
pub use rules::Rules;
pub use session::{PickOutcome, Reaction, Resolution, Session, Tick};
pub use team::TeamNumber;
pub use view::{Field, Tone, View};

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::mode::GameMode;
    use crate::player::{Player, PlayerId};
    use crate::rules::Rules;
    use crate::session::Session;

    const NAMES: &[&str] = &["Alice", "Bob", "Carol", "Dave", "Erin", "Frank", "Grace", "Heidi"];

    /// Create `n` human players with sequential IDs starting at 1.
    pub fn make_players(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| {
                let name = NAMES
                    .get(i)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| format!("Player{}", i + 1));
                Player::new(i as PlayerId + 1, name)
            })
            .collect()
    }

    /// Start an FRC session with `n` players under default rules and drain
    /// the start-up events. Player 1 is the current player.
    pub fn started_session(n: usize) -> Session {
        started_session_with(n, Rules::default())
    }

    /// Like [`started_session`], with custom rules.
    pub fn started_session_with(n: usize, rules: Rules) -> Session {
        let mut players = make_players(n).into_iter();
        let starter = players.next().expect("at least one player");
        let mut session = Session::new(GameMode::Frc, rules, starter, players.collect(), false);
        session.drain_events();
        session
    }
}
