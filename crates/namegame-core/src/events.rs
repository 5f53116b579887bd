use serde::Serialize;

use crate::error::GameError;
use crate::player::PlayerId;
use crate::team::TeamNumber;

/// Why a player lost their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Timeout,
    Voluntary,
    Dropped,
    AlreadyPicked,
    BadContinuity,
    TeamNotFound,
    VoteRejected,
    VoteTimedOut,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "player")]
pub enum GameOver {
    Won(PlayerId),
    Disbanded,
    Aborted,
}

/// Things that happened during a transition, in order. Collected in the
/// session's outbox and drained by whoever renders them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum GameEvent {
    Started {
        starter: PlayerId,
    },
    PlayerAdded {
        player: PlayerId,
    },
    JoinRejected {
        #[serde(skip)]
        reason: GameError,
    },
    OutOfTurnStrike {
        player: PlayerId,
    },
    Skipped {
        player: PlayerId,
        strikes: u8,
        reason: SkipReason,
    },
    Eliminated {
        player: PlayerId,
    },
    /// High-similarity pick committed; an override window is now open.
    PickAccepted {
        player: PlayerId,
        team: TeamNumber,
        name: String,
        ratio: u8,
    },
    /// Low-similarity pick awaiting a mandatory vote.
    VoteOpened {
        player: PlayerId,
        team: TeamNumber,
        guess: String,
        name: String,
        ratio: u8,
    },
    Overruled {
        player: PlayerId,
    },
    VoteAccepted {
        player: PlayerId,
        team: TeamNumber,
        name: String,
    },
    VoteRejected {
        player: PlayerId,
        team: TeamNumber,
    },
    VoteTimedOut {
        player: PlayerId,
        team: TeamNumber,
    },
    TurnPassed {
        player: PlayerId,
        number: u32,
    },
    Won {
        player: PlayerId,
    },
    Disbanded,
    Aborted,
}
