//! Snapshots of a session for display.
//!
//! Views are titled cards with an ordered list of named fields. Countdowns
//! update a single field in place by index, so the field order of each card
//! is fixed.

use serde::Serialize;

use crate::player::Player;
use crate::rules::Rules;
use crate::session::Session;

/// Turn card: "Time Left".
pub const TURN_TIME_FIELD: usize = 3;
/// Turn card: "Voting Time", present only during an override window.
pub const TURN_VOTE_FIELD: usize = 4;
/// Vote card: "Voting Time".
pub const VOTE_TIME_FIELD: usize = 5;

/// Accent colour of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Neutral,
    Success,
    Failure,
    Highlight,
    Info,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub value: String,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl ToString) -> Self {
        Self {
            name: name.into(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    pub title: String,
    pub description: String,
    pub tone: Tone,
    pub fields: Vec<Field>,
}

impl View {
    pub fn new(title: impl Into<String>, description: impl Into<String>, tone: Tone) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            tone,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push(Field::new(name, value));
        self
    }

    /// The turn card shown at the start of every turn. `start` labels the
    /// player and number as "Starting" instead of "Current".
    pub fn turn(
        session: &Session,
        title: impl Into<String>,
        description: impl Into<String>,
        tone: Tone,
        start: bool,
    ) -> Self {
        let prefix = if start { "Starting" } else { "Current" };
        let players = session
            .seats()
            .iter()
            .map(|s| s.player.display_name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let view = Self::new(title, description, tone)
            .field("Players", if players.is_empty() { "n/a".to_string() } else { players })
            .field(format!("{prefix} Player"), current_name(session))
            .field(format!("{prefix} Number"), number_text(session.number()))
            .field("Time Left", session.time());
        if session.override_vote_active() {
            view.field("Voting Time", session.vote_time())
        } else {
            view
        }
    }

    /// The mandatory vote card for the pick under vote, if any.
    pub fn vote(session: &Session) -> Option<Self> {
        let last = session.last_resolved()?;
        let voter = session
            .vote_player()
            .and_then(|id| session.player(id))
            .map(Player::mention)
            .unwrap_or_default();
        Some(
            Self::new(
                "A vote is needed!",
                "A player has made a choice with low similarity. The details of the pick are \
                 below. React to vote on whether this is correct. A 50% majority of players is \
                 required to accept it, otherwise the player will get a strike.",
                Tone::Highlight,
            )
            .field("Player", voter)
            .field("Team", last.team)
            .field("Said Name", &last.guess)
            .field("Actual Name", &last.name)
            .field("Similarity", format!("{}%", last.ratio))
            .field("Voting Time", session.vote_time()),
        )
    }

    /// Full game status, as requested by `gameinfo`.
    pub fn info(session: &Session) -> Self {
        let strikes = session
            .seats()
            .iter()
            .map(|s| format!("{}: {}", s.player.display_name, s.strikes))
            .collect::<Vec<_>>()
            .join("\n");
        Self::new("Current Game Info", "", Tone::Info)
            .field("Game Type", session.mode().as_str().to_uppercase())
            .field("Strikes", strikes)
            .field("Current Player", current_name(session))
            .field("Current Number", number_text(session.number()))
            .field("Time Left", session.time())
            .field("Teams Picked", picked_text(session))
    }

    /// Announcement for the winner of a finished game.
    pub fn winner(session: &Session, winner: &Player, total_wins: u32) -> Self {
        Self::new("We have a winner!", "", Tone::Highlight)
            .field("Winning Player", &winner.display_name)
            .field("Wins Total", total_wins)
            .field("Teams Picked", picked_text(session))
    }

    /// How to play.
    pub fn rules(rules: &Rules) -> Self {
        Self::new(
            "How to play",
            "This is a very simple little game where players will name a team number and name \
             that starts with the last digit of the last named team. Some more specific rules \
             are below:",
            Tone::Help,
        )
        .field("No Double Picking", "Only pick teams once.")
        .field(
            "Three Strikes, You're Out!",
            format!(
                "You are only allowed {} strikes, which are given by picking out of turn, \
                 getting the team name wrong, picking a non existent team, being voted that \
                 your pick is incorrect, not picking in time, or picking an already picked team.",
                rules.max_strikes
            ),
        )
        .field(
            "No Cheatsy Doodles",
            "No looking up teams on TBA, TOA, or other sources, that's just unfair.",
        )
        .field(
            "Times up!",
            format!(
                "You have {} seconds to make a pick, or you get skipped and get a strike.",
                rules.turn_secs
            ),
        )
        .field(
            "Shaking Things Up",
            "Any team number that ends in a 0 means that the next player has a wildcard, \
             and can pick any legal team.",
        )
        .field(
            "Different Game Modes",
            "You can play the name game with FTC teams too! Start a round in `ftc` mode.",
        )
    }

    /// Replace the field at `index`. Returns false if the card has no such field.
    pub fn set_field(&mut self, index: usize, field: Field) -> bool {
        match self.fields.get_mut(index) {
            Some(slot) => {
                *slot = field;
                true
            },
            None => false,
        }
    }
}

/// "Time Left" field of a turn card.
pub fn time_field(remaining: i32) -> Field {
    Field::new("Time Left", remaining)
}

/// "Voting Time" field of a turn or vote card.
pub fn vote_time_field(remaining: i32) -> Field {
    Field::new("Voting Time", remaining)
}

fn current_name(session: &Session) -> String {
    session
        .current_player()
        .and_then(|id| session.player(id))
        .map(|p| p.display_name.clone())
        .unwrap_or_else(|| "n/a".to_string())
}

fn number_text(number: u32) -> String {
    if number == 0 {
        "Wildcard".to_string()
    } else {
        number.to_string()
    }
}

/// Picked teams in ascending order.
pub fn picked_text(session: &Session) -> String {
    let mut teams: Vec<_> = session.picked().iter().map(|p| p.team).collect();
    if teams.is_empty() {
        return "No Picked Teams".to_string();
    }
    teams.sort_unstable();
    teams
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
