//! Rule violations and lifecycle failures surfaced to players.
//!
//! None of these abort a session. Penalties (strikes, skips) that accompany
//! an error have already been applied by the time the error is returned.

use crate::team::TeamNumber;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("There's not a game going on! Start one with `startround`.")]
    NoActiveGame,
    #[error("A game is currently going on! Wait till the players finish up to start again.")]
    GameAlreadyRunning,
    #[error("Games cannot be started in this channel!")]
    RestrictedChannel,
    #[error("It's not your turn!")]
    NotYourTurn,
    #[error("Let the people playing play! Ask a current player to add you to the game.")]
    NotPlaying,
    #[error("Vote on the current team before picking the next!")]
    VoteInProgress,
    #[error("Team {0} has already been picked! You have been skipped and given a strike.")]
    AlreadyPicked(TeamNumber),
    #[error("Team {0} doesn't exist! Strike given, moving onto the next player!")]
    TeamNotFound(TeamNumber),
    #[error("Team {team} doesn't start with {number}! Strike given, moving onto the next player!")]
    BadTeamContinuity { team: TeamNumber, number: u32 },
    #[error("Game mode `{0}` not supported! Please pick one of: `frc, ftc`")]
    UnsupportedMode(String),
    #[error("{0} is already in the game!")]
    AlreadyInGame(String),
    #[error("{0} is already out of the game and can't be added back in.")]
    AlreadyEliminated(String),
    #[error("You can't invite bot users like {0}!")]
    BotNotAllowed(String),
}
