//! The state of one running name game and every transition it supports.
//!
//! A [`Session`] is a plain, synchronous state machine. It never sleeps,
//! never performs I/O, and never looks at a clock: countdowns call
//! [`Session::turn_tick`] and [`Session::vote_tick`] once per elapsed second,
//! and picks are split around the (asynchronous) team lookup with
//! [`Session::begin_pick`] and [`Session::finish_pick`]. Hosts wrap a session
//! in a lock and drain [`Session::drain_events`] after each transition.
//!
//! Turn order is the seating order. The current player is a cursor into the
//! seat list; eliminating a seat adjusts the cursor so the cycle neither
//! skips nor repeats anyone.

use crate::error::GameError;
use crate::events::{GameEvent, GameOver, SkipReason};
use crate::mode::GameMode;
use crate::player::{Player, PlayerId};
use crate::rules::Rules;
use crate::team::{TeamNumber, leading_digit, trailing_digit};

/// A seated player and their strike count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    pub player: Player,
    pub strikes: u8,
}

/// A committed pick: the team number and its canonical name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pick {
    pub team: TeamNumber,
    pub name: String,
}

/// The most recently resolved pick, kept for vote displays and commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPick {
    pub team: TeamNumber,
    pub name: String,
    pub guess: String,
    pub ratio: u8,
}

/// Result of looking a team up with the name resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    NotFound,
    Found { name: String, ratio: u8 },
}

/// What happened to a pick that passed every rule check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PickOutcome {
    /// Committed immediately; an override window is open.
    Accepted,
    /// Waiting on a mandatory vote.
    VoteRequired,
}

/// A vote reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    Accept,
    Reject,
}

/// Outcome of a single countdown second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// The countdown landed on a refresh point; displays should be updated.
    pub refresh: bool,
    /// The countdown reached zero and the current player was skipped.
    pub expired: bool,
    /// Seconds left on this countdown after the tick.
    pub remaining: i32,
    /// Seconds left in the override window, when the turn countdown is also
    /// counting one down.
    pub window: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct Session {
    mode: GameMode,
    rules: Rules,
    running: bool,
    pings_enabled: bool,
    seats: Vec<Seat>,
    cursor: usize,
    removed: Vec<Player>,
    picked: Vec<Pick>,
    number: u32,
    turn_count: u32,
    time: i32,
    vote_time: i32,
    pass_tally: u32,
    fail_tally: u32,
    /// Bumped whenever a vote opens.
    vote_round: u32,
    vote_correct: bool,
    vote_player: Option<PlayerId>,
    last: Option<ResolvedPick>,
    outcome: Option<GameOver>,
    events: Vec<GameEvent>,
}

impl Session {
    /// Start a game. The starter takes the first seat and the first turn;
    /// invited players are seated in order after them. Bots and duplicates
    /// are turned away with a [`GameEvent::JoinRejected`].
    pub fn new(
        mode: GameMode,
        rules: Rules,
        starter: Player,
        invited: Vec<Player>,
        pings_enabled: bool,
    ) -> Self {
        let starter_id = starter.id;
        let time = rules.turn_time();
        let mut session = Self {
            mode,
            rules,
            running: true,
            pings_enabled,
            seats: vec![Seat {
                player: starter,
                strikes: 0,
            }],
            cursor: 0,
            removed: Vec::new(),
            picked: Vec::new(),
            number: 0,
            turn_count: 0,
            time,
            vote_time: -1,
            pass_tally: 0,
            fail_tally: 0,
            vote_round: 0,
            vote_correct: false,
            vote_player: None,
            last: None,
            outcome: None,
            events: Vec::new(),
        };
        session.events.push(GameEvent::Started {
            starter: starter_id,
        });
        for player in invited.into_iter().filter(|p| p.id != starter_id) {
            if let Err(reason) = session.admit(player) {
                session.events.push(GameEvent::JoinRejected { reason });
            }
        }
        session
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pings_enabled(&self) -> bool {
        self.pings_enabled
    }

    /// Active seats in turn order.
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    /// Eliminated or dropped players, in the order they left.
    pub fn removed(&self) -> &[Player] {
        &self.removed
    }

    pub fn picked(&self) -> &[Pick] {
        &self.picked
    }

    /// Required leading digit of the next pick; zero is a wildcard.
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    /// Seconds left in the turn; negative while a mandatory vote is pending.
    pub fn time(&self) -> i32 {
        self.time
    }

    /// Seconds left in the open vote; negative when no vote is open.
    pub fn vote_time(&self) -> i32 {
        self.vote_time
    }

    /// `(pass, fail)` reaction counts for the open vote.
    pub fn tallies(&self) -> (u32, u32) {
        (self.pass_tally, self.fail_tally)
    }

    /// True for an override window, false for a mandatory vote.
    /// Identifies the most recently opened vote. A countdown started for
    /// one vote must not act on a later one.
    pub fn vote_round(&self) -> u32 {
        self.vote_round
    }

    pub fn vote_correct(&self) -> bool {
        self.vote_correct
    }

    /// The player whose pick is under vote.
    pub fn vote_player(&self) -> Option<PlayerId> {
        self.vote_player
    }

    pub fn last_resolved(&self) -> Option<&ResolvedPick> {
        self.last.as_ref()
    }

    pub fn game_over(&self) -> Option<GameOver> {
        self.outcome
    }

    pub fn current_player(&self) -> Option<PlayerId> {
        self.seats.get(self.cursor).map(|s| s.player.id)
    }

    pub fn is_seated(&self, id: PlayerId) -> bool {
        self.seat_index(id).is_some()
    }

    pub fn strikes(&self, id: PlayerId) -> Option<u8> {
        self.seat_index(id).map(|i| self.seats[i].strikes)
    }

    /// Look a player up among both active and removed players.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.seats
            .iter()
            .map(|s| &s.player)
            .chain(self.removed.iter())
            .find(|p| p.id == id)
    }

    pub fn mandatory_vote_active(&self) -> bool {
        self.running && !self.vote_correct && self.vote_time > 0
    }

    pub fn override_vote_active(&self) -> bool {
        self.running && self.vote_correct && self.vote_time > 0
    }

    /// Take every event produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn seat_index(&self, id: PlayerId) -> Option<usize> {
        self.seats.iter().position(|s| s.player.id == id)
    }

    // ------------------------------------------------------------------
    // Players
    // ------------------------------------------------------------------

    fn admit(&mut self, player: Player) -> Result<(), GameError> {
        if player.is_bot {
            return Err(GameError::BotNotAllowed(player.display_name));
        }
        if self.removed.iter().any(|p| p.id == player.id) {
            return Err(GameError::AlreadyEliminated(player.display_name));
        }
        if self.is_seated(player.id) {
            return Err(GameError::AlreadyInGame(player.display_name));
        }
        self.seats.push(Seat { player, strikes: 0 });
        Ok(())
    }

    /// Seat additional players at the end of the turn order. Individual
    /// rejections are reported as events; returns how many were seated.
    pub fn add_players(&mut self, players: Vec<Player>) -> Result<usize, GameError> {
        if !self.running {
            return Err(GameError::NoActiveGame);
        }
        let mut added = 0;
        for player in players {
            let id = player.id;
            match self.admit(player) {
                Ok(()) => {
                    self.events.push(GameEvent::PlayerAdded { player: id });
                    added += 1;
                },
                Err(reason) => {
                    tracing::debug!(player = id, %reason, "Join rejected");
                    self.events.push(GameEvent::JoinRejected { reason });
                },
            }
        }
        Ok(added)
    }

    /// Leave the game for good. The player is put one strike from
    /// elimination and then struck (skipped first if it was their turn).
    pub fn drop_player(&mut self, actor: PlayerId) -> Result<(), GameError> {
        if !self.running {
            return Err(GameError::NoActiveGame);
        }
        let idx = self.seat_index(actor).ok_or(GameError::NotPlaying)?;
        self.seats[idx].strikes = self.rules.max_strikes.saturating_sub(1);
        if self.current_player() == Some(actor) {
            self.skip_player(actor, SkipReason::Dropped);
        } else {
            self.apply_strike(actor);
        }
        Ok(())
    }

    /// Forfeit the current turn for a strike.
    pub fn skip_turn(&mut self, actor: PlayerId) -> Result<(), GameError> {
        if !self.running {
            return Err(GameError::NoActiveGame);
        }
        if self.current_player() != Some(actor) {
            return Err(if self.is_seated(actor) {
                GameError::NotYourTurn
            } else {
                GameError::NotPlaying
            });
        }
        self.skip_player(actor, SkipReason::Voluntary);
        Ok(())
    }

    /// Emergency teardown.
    pub fn abort(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.vote_time = -1;
        self.outcome = Some(GameOver::Aborted);
        self.events.push(GameEvent::Aborted);
    }

    // ------------------------------------------------------------------
    // Turn engine
    // ------------------------------------------------------------------

    /// Complete a turn: reset the clock and tallies, count the turn, and
    /// hand the turn to the next seat.
    pub fn advance_turn(&mut self) {
        self.time = self.rules.turn_time();
        self.pass_tally = 0;
        self.fail_tally = 0;
        self.turn_count += 1;
        if !self.seats.is_empty() {
            self.cursor = (self.cursor + 1) % self.seats.len();
        }
    }

    /// Give `player` a strike, eliminating them on reaching the limit or
    /// when they are the last one seated. Returns whether they were
    /// eliminated. Win and disband conditions are checked afterwards.
    pub fn apply_strike(&mut self, player: PlayerId) -> bool {
        if !self.running {
            return false;
        }
        let Some(idx) = self.seat_index(player) else {
            return false;
        };
        let seat = &mut self.seats[idx];
        seat.strikes = seat.strikes.saturating_add(1);
        let eliminated = seat.strikes >= self.rules.max_strikes || self.seats.len() == 1;
        if eliminated {
            self.eliminate(idx);
            self.events.push(GameEvent::Eliminated { player });
        }
        self.check_end();
        eliminated
    }

    fn eliminate(&mut self, idx: usize) {
        let seat = self.seats.remove(idx);
        self.removed.push(seat.player);
        if idx < self.cursor {
            self.cursor -= 1;
        }
        if self.cursor >= self.seats.len() {
            self.cursor = 0;
        }
    }

    fn check_end(&mut self) {
        if !self.running {
            return;
        }
        let remaining = self.seats.len();
        let enough_turns = self.turn_count > self.rules.min_turns_for_win;
        if remaining == 1 && enough_turns {
            let winner = self.seats[0].player.id;
            tracing::info!(winner, turns = self.turn_count, "Game won");
            self.finish(GameOver::Won(winner));
            self.events.push(GameEvent::Won { player: winner });
        } else if remaining <= 1 {
            tracing::info!(remaining, turns = self.turn_count, "Game disbanded");
            self.finish(GameOver::Disbanded);
            self.events.push(GameEvent::Disbanded);
        }
    }

    fn finish(&mut self, outcome: GameOver) {
        self.running = false;
        self.vote_time = -1;
        self.outcome = Some(outcome);
    }

    /// Cancel any open vote, pass the turn on, and strike `player`.
    pub fn skip_player(&mut self, player: PlayerId, reason: SkipReason) {
        if !self.running {
            return;
        }
        self.vote_time = -1;
        self.advance_turn();
        let strikes = self.strikes(player).map_or(0, |s| s.saturating_add(1));
        self.events.push(GameEvent::Skipped {
            player,
            strikes,
            reason,
        });
        if let Some(next) = self.current_player()
            && next != player
        {
            self.events.push(GameEvent::TurnPassed {
                player: next,
                number: self.number,
            });
        }
        self.apply_strike(player);
    }

    /// Start counting reactions for a new vote. Tallies never carry over
    /// from an earlier card.
    fn open_vote(&mut self, player: PlayerId, correct: bool, time: i32) {
        self.pass_tally = 0;
        self.fail_tally = 0;
        self.vote_round = self.vote_round.wrapping_add(1);
        self.vote_player = Some(player);
        self.vote_correct = correct;
        self.vote_time = time;
    }

    fn commit(&mut self, team: TeamNumber, name: String) {
        self.picked.push(Pick { team, name });
        self.number = trailing_digit(team);
        self.advance_turn();
    }

    /// Rule checks that run before the team is looked up. Penalties for
    /// violations are applied here: an out-of-turn pick by a seated player
    /// is struck, and duplicate or discontinuous picks are skipped.
    pub fn begin_pick(&mut self, actor: PlayerId, team: TeamNumber) -> Result<(), GameError> {
        if !self.running {
            return Err(GameError::NoActiveGame);
        }
        if self.current_player() != Some(actor) {
            if !self.is_seated(actor) {
                return Err(GameError::NotPlaying);
            }
            self.events
                .push(GameEvent::OutOfTurnStrike { player: actor });
            self.apply_strike(actor);
            return Err(GameError::NotYourTurn);
        }
        if self.time < 0 {
            return Err(GameError::VoteInProgress);
        }
        if self.picked.iter().any(|p| p.team == team) {
            self.skip_player(actor, SkipReason::AlreadyPicked);
            return Err(GameError::AlreadyPicked(team));
        }
        if self.number != 0 && leading_digit(team) != self.number {
            let number = self.number;
            self.skip_player(actor, SkipReason::BadContinuity);
            return Err(GameError::BadTeamContinuity { team, number });
        }
        Ok(())
    }

    /// Apply the resolver's answer to a pick accepted by [`Self::begin_pick`].
    pub fn finish_pick(
        &mut self,
        actor: PlayerId,
        team: TeamNumber,
        guess: &str,
        resolution: Resolution,
    ) -> Result<PickOutcome, GameError> {
        if !self.running {
            return Err(GameError::NoActiveGame);
        }
        if self.current_player() != Some(actor) {
            return Err(GameError::NotYourTurn);
        }
        let (name, ratio) = match resolution {
            Resolution::NotFound => {
                self.skip_player(actor, SkipReason::TeamNotFound);
                return Err(GameError::TeamNotFound(team));
            },
            Resolution::Found { name, ratio } => (name, ratio),
        };

        self.last = Some(ResolvedPick {
            team,
            name: name.clone(),
            guess: guess.to_string(),
            ratio,
        });

        if ratio > self.rules.accept_ratio {
            self.commit(team, name.clone());
            self.open_vote(actor, true, self.rules.override_vote_time());
            self.events.push(GameEvent::PickAccepted {
                player: actor,
                team,
                name,
                ratio,
            });
            if let Some(next) = self.current_player() {
                self.events.push(GameEvent::TurnPassed {
                    player: next,
                    number: self.number,
                });
            }
            Ok(PickOutcome::Accepted)
        } else {
            self.time = -1;
            self.open_vote(actor, false, self.rules.mandatory_vote_time());
            self.events.push(GameEvent::VoteOpened {
                player: actor,
                team,
                guess: guess.to_string(),
                name,
                ratio,
            });
            Ok(PickOutcome::VoteRequired)
        }
    }

    /// Run a whole pick with a synchronous resolver. The resolver is not
    /// consulted when a rule check fails first.
    pub fn submit_pick(
        &mut self,
        actor: PlayerId,
        team: TeamNumber,
        guess: &str,
        resolve: impl FnOnce(GameMode, TeamNumber, &str) -> Resolution,
    ) -> Result<PickOutcome, GameError> {
        self.begin_pick(actor, team)?;
        let resolution = resolve(self.mode, team, guess);
        self.finish_pick(actor, team, guess, resolution)
    }

    // ------------------------------------------------------------------
    // Vote engine
    // ------------------------------------------------------------------

    /// Count a reaction added to (or removed from) the open vote. Only
    /// seated players count. Thresholds are evaluated whenever a reaction
    /// is added while a vote is open. Returns whether the tally changed.
    pub fn react(&mut self, voter: PlayerId, reaction: Reaction, added: bool) -> bool {
        if !self.running || self.vote_time <= 0 {
            return false;
        }
        let counted = self.is_seated(voter);
        if counted {
            let tally = match reaction {
                Reaction::Accept => &mut self.pass_tally,
                Reaction::Reject => &mut self.fail_tally,
            };
            *tally = if added {
                tally.saturating_add(1)
            } else {
                tally.saturating_sub(1)
            };
        }
        if added {
            self.resolve_vote();
        }
        counted
    }

    fn resolve_vote(&mut self) {
        let seated = self.seats.len() as u32;
        if self.vote_correct {
            // Overturning needs a strict majority of rejections.
            if self.fail_tally * 2 > seated {
                self.vote_time = -1;
                if let Some(player) = self.vote_player {
                    self.events.push(GameEvent::Overruled { player });
                    self.apply_strike(player);
                }
            }
            return;
        }

        let Some(last) = self.last.clone() else {
            return;
        };
        let player = self.vote_player.unwrap_or_default();
        if self.pass_tally * 2 >= seated {
            self.commit(last.team, last.name.clone());
            self.vote_time = -1;
            self.events.push(GameEvent::VoteAccepted {
                player,
                team: last.team,
                name: last.name,
            });
            if let Some(next) = self.current_player() {
                self.events.push(GameEvent::TurnPassed {
                    player: next,
                    number: self.number,
                });
            }
        } else if self.fail_tally * 2 >= seated {
            self.events.push(GameEvent::VoteRejected {
                player,
                team: last.team,
            });
            if let Some(current) = self.current_player() {
                self.skip_player(current, SkipReason::VoteRejected);
            }
        }
    }

    // ------------------------------------------------------------------
    // Countdowns
    // ------------------------------------------------------------------

    /// One second of the turn countdown. Also drives the override window.
    /// Returns `None` once the game has stopped.
    pub fn turn_tick(&mut self) -> Option<Tick> {
        if !self.running {
            return None;
        }
        if self.time > 0 {
            self.time -= 1;
        }
        let window = (self.vote_time > 0 && self.vote_correct).then(|| {
            self.vote_time -= 1;
            self.vote_time
        });
        let remaining = self.time;
        let refresh = self.rules.is_refresh_point(remaining);
        let expired = remaining == 0;
        if expired && let Some(current) = self.current_player() {
            tracing::debug!(player = current, "Turn timer expired");
            self.skip_player(current, SkipReason::Timeout);
        }
        Some(Tick {
            refresh,
            expired,
            remaining,
            window,
        })
    }

    /// One second of the mandatory vote countdown. Returns `None` when no
    /// mandatory vote is pending, which ends the countdown.
    pub fn vote_tick(&mut self) -> Option<Tick> {
        if !self.mandatory_vote_active() {
            return None;
        }
        self.vote_time -= 1;
        let remaining = self.vote_time;
        let refresh = self.rules.is_refresh_point(remaining);
        let expired = remaining == 0;
        if expired {
            let team = self.last.as_ref().map_or(0, |l| l.team);
            self.events.push(GameEvent::VoteTimedOut {
                player: self.vote_player.unwrap_or_default(),
                team,
            });
            if let Some(current) = self.current_player() {
                self.skip_player(current, SkipReason::VoteTimedOut);
            }
        }
        Some(Tick {
            refresh,
            expired,
            remaining,
            window: None,
        })
    }
}
