//! One running game: the session behind its lock, the messages its
//! countdowns update, and the countdown tasks themselves.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tokio::sync::Mutex;

use namegame_core::view::{TURN_TIME_FIELD, TURN_VOTE_FIELD, VOTE_TIME_FIELD, time_field, vote_time_field};
use namegame_core::{
    GameError, GameMode, GameOver, PickOutcome, Player, PlayerId, Reaction, Resolution, Session,
    TeamNumber, View,
};

use crate::countdown::{Countdown, Flow};
use crate::display::DisplaySink;
use crate::error::AppError;
use crate::presenter;
use crate::resolver::NameResolver;
use crate::{ChannelId, GuildId, MessageId};

/// Session state plus the ids of the messages being kept up to date.
pub struct LiveGame {
    pub session: Session,
    /// Latest turn card; the turn countdown updates its timers.
    pub turn_msg: Option<MessageId>,
    /// Card whose reactions count as votes.
    pub vote_msg: Option<MessageId>,
}

impl LiveGame {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            turn_msg: None,
            vote_msg: None,
        }
    }
}

/// Snapshot of a game for the info endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GameInfo {
    pub mode: GameMode,
    pub running: bool,
    pub players: Vec<SeatInfo>,
    pub current_player: Option<PlayerId>,
    pub number: u32,
    pub time_left: i32,
    pub vote_time: i32,
    pub turn_count: u32,
    pub picked: Vec<TeamNumber>,
    pub view: View,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatInfo {
    pub id: PlayerId,
    pub display_name: String,
    pub strikes: u8,
}

/// Everything needed to record a finished game.
#[derive(Debug, Clone)]
pub struct FinalTally {
    pub mode: GameMode,
    pub outcome: GameOver,
    pub winner: Option<Player>,
    pub picks: Vec<(TeamNumber, String)>,
}

#[derive(Default)]
struct Countdowns {
    turn: Option<Countdown>,
    vote: Option<Countdown>,
}

/// The lock-owning wrapper around a session. Every method takes the lock,
/// applies one transition, renders the resulting events, and releases it.
pub struct GameHandle {
    guild: GuildId,
    channel: ChannelId,
    game: Mutex<LiveGame>,
    display: Arc<dyn DisplaySink>,
    countdowns: std::sync::Mutex<Countdowns>,
    concluded: AtomicBool,
}

impl GameHandle {
    /// Wrap a freshly started session. Its start-up events stay queued
    /// until [`Self::present_pending`].
    pub fn new(
        guild: GuildId,
        channel: ChannelId,
        session: Session,
        display: Arc<dyn DisplaySink>,
    ) -> Self {
        Self {
            guild,
            channel,
            game: Mutex::new(LiveGame::new(session)),
            display,
            countdowns: std::sync::Mutex::new(Countdowns::default()),
            concluded: AtomicBool::new(false),
        }
    }

    pub fn guild(&self) -> GuildId {
        self.guild
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn display(&self) -> &Arc<dyn DisplaySink> {
        &self.display
    }

    /// Render everything the session has queued so far.
    pub async fn present_pending(&self) {
        let mut game = self.game.lock().await;
        self.flush(&mut game).await;
    }

    async fn flush(&self, game: &mut LiveGame) {
        let events = game.session.drain_events();
        if !events.is_empty() {
            presenter::present(self.display.as_ref(), self.channel, game, events).await;
        }
    }

    /// Report a penalised rule violation before rendering its consequences.
    async fn settle<T>(&self, game: &mut LiveGame, result: Result<T, GameError>) -> Result<T, AppError> {
        if let Err(e) = &result {
            tracing::debug!(channel = self.channel, error = %e, "Action rejected");
            self.display.say(self.channel, e.to_string()).await;
        }
        self.flush(game).await;
        result.map_err(AppError::from)
    }

    /// Make a pick. The lock is held across the name lookup, so no countdown
    /// tick can interleave. A lookup failure leaves the session untouched.
    /// Returns the outcome with the vote round current when the lock was
    /// released.
    pub async fn pick(
        &self,
        actor: PlayerId,
        team: TeamNumber,
        guess: &str,
        resolver: &dyn NameResolver,
    ) -> Result<(PickOutcome, u32), AppError> {
        let mut game = self.game.lock().await;
        if let Err(e) = game.session.begin_pick(actor, team) {
            return self.settle(&mut game, Err(e)).await;
        }

        let mode = game.session.mode();
        let resolution = match resolver.lookup(mode, team).await {
            Ok(Some(name)) => {
                let ratio = resolver.similarity(guess, &name);
                Resolution::Found { name, ratio }
            },
            Ok(None) => Resolution::NotFound,
            Err(e) => {
                tracing::error!(channel = self.channel, team, error = %e, "Team lookup failed");
                return Err(e.into());
            },
        };
        tracing::debug!(channel = self.channel, player = actor, team, ?resolution, "Pick resolved");
        let result = game.session.finish_pick(actor, team, guess, resolution);
        let round = game.session.vote_round();
        let outcome = self.settle(&mut game, result).await?;
        Ok((outcome, round))
    }

    pub async fn skip(&self, actor: PlayerId) -> Result<(), AppError> {
        let mut game = self.game.lock().await;
        let result = game.session.skip_turn(actor);
        self.settle(&mut game, result).await
    }

    pub async fn drop_player(&self, actor: PlayerId) -> Result<(), AppError> {
        let mut game = self.game.lock().await;
        let result = game.session.drop_player(actor);
        self.settle(&mut game, result).await?;
        if game.session.is_running() {
            let view = View::info(&game.session);
            self.display.render(self.channel, view).await;
        }
        Ok(())
    }

    pub async fn add_players(&self, players: Vec<Player>) -> Result<usize, AppError> {
        let mut game = self.game.lock().await;
        let result = game.session.add_players(players);
        self.settle(&mut game, result).await
    }

    /// Count a reaction. Reactions on any message other than the current
    /// vote card are ignored when `message` is given.
    pub async fn react(
        &self,
        voter: PlayerId,
        reaction: Reaction,
        added: bool,
        message: Option<MessageId>,
    ) -> bool {
        let mut game = self.game.lock().await;
        if message.is_some() && message != game.vote_msg {
            return false;
        }
        let counted = game.session.react(voter, reaction, added);
        self.flush(&mut game).await;
        counted
    }

    /// One second of the turn countdown.
    pub async fn turn_tick(&self) -> Result<Flow, AppError> {
        let mut game = self.game.lock().await;
        let Some(tick) = game.session.turn_tick() else {
            return Ok(Flow::Stop);
        };
        if tick.refresh
            && let Some(message) = game.turn_msg
        {
            self.display
                .update_field(self.channel, message, TURN_TIME_FIELD, time_field(tick.remaining))
                .await;
            if let Some(window) = tick.window {
                self.display
                    .update_field(self.channel, message, TURN_VOTE_FIELD, vote_time_field(window))
                    .await;
            }
        }
        self.flush(&mut game).await;
        Ok(if game.session.is_running() {
            Flow::Continue
        } else {
            Flow::Stop
        })
    }

    /// One second of the mandatory vote countdown for vote `round`. A
    /// countdown that outlived its vote stops without touching a newer one.
    pub async fn vote_tick(&self, round: u32) -> Result<Flow, AppError> {
        let mut game = self.game.lock().await;
        if game.session.vote_round() != round {
            tracing::debug!(channel = self.channel, round, "Stale vote countdown stopped");
            return Ok(Flow::Stop);
        }
        let Some(tick) = game.session.vote_tick() else {
            return Ok(Flow::Stop);
        };
        if tick.refresh
            && let Some(message) = game.vote_msg
        {
            self.display
                .update_field(self.channel, message, VOTE_TIME_FIELD, vote_time_field(tick.remaining))
                .await;
        }
        self.flush(&mut game).await;
        Ok(if tick.expired { Flow::Stop } else { Flow::Continue })
    }

    pub async fn abort(&self) {
        let mut game = self.game.lock().await;
        game.session.abort();
        self.flush(&mut game).await;
    }

    pub async fn info(&self) -> GameInfo {
        let game = self.game.lock().await;
        let session = &game.session;
        GameInfo {
            mode: session.mode(),
            running: session.is_running(),
            players: session
                .seats()
                .iter()
                .map(|s| SeatInfo {
                    id: s.player.id,
                    display_name: s.player.display_name.clone(),
                    strikes: s.strikes,
                })
                .collect(),
            current_player: session.current_player(),
            number: session.number(),
            time_left: session.time(),
            vote_time: session.vote_time(),
            turn_count: session.turn_count(),
            picked: session.picked().iter().map(|p| p.team).collect(),
            view: View::info(session),
        }
    }

    /// Show the game info card in the channel.
    pub async fn show_info(&self) {
        let game = self.game.lock().await;
        let view = View::info(&game.session);
        self.display.render(self.channel, view).await;
    }

    pub async fn seated(&self) -> usize {
        self.game.lock().await.session.seats().len()
    }

    pub async fn mandatory_vote_active(&self) -> bool {
        self.game.lock().await.session.mandatory_vote_active()
    }

    /// The final tally, the first time it is asked for after the game has
    /// ended. `None` while running and on every later call.
    pub async fn take_final_tally(&self) -> Option<FinalTally> {
        let game = self.game.lock().await;
        let outcome = game.session.game_over()?;
        if self.concluded.swap(true, Ordering::AcqRel) {
            return None;
        }
        let session = &game.session;
        let winner = match outcome {
            GameOver::Won(id) => session.player(id).cloned(),
            GameOver::Disbanded | GameOver::Aborted => None,
        };
        Some(FinalTally {
            mode: session.mode(),
            outcome,
            winner,
            picks: session
                .picked()
                .iter()
                .map(|p| (p.team, p.name.clone()))
                .collect(),
        })
    }

    /// Announce the winner along with their stored win total.
    pub async fn announce_winner(&self, winner: &Player, total_wins: u32) {
        let game = self.game.lock().await;
        let view = View::winner(&game.session, winner, total_wins);
        self.display.render(self.channel, view).await;
    }

    fn countdowns(&self) -> std::sync::MutexGuard<'_, Countdowns> {
        self.countdowns
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn set_turn_countdown(&self, countdown: Countdown) {
        if let Some(old) = self.countdowns().turn.replace(countdown) {
            old.cancel();
        }
    }

    /// Install the countdown for a newly opened vote, cancelling any
    /// previous one.
    pub fn set_vote_countdown(&self, countdown: Countdown) {
        if let Some(old) = self.countdowns().vote.replace(countdown) {
            old.cancel();
        }
    }

    pub fn cancel_countdowns(&self) {
        let mut countdowns = self.countdowns();
        for countdown in [countdowns.turn.take(), countdowns.vote.take()].into_iter().flatten() {
            countdown.cancel();
        }
    }

    /// Whether the turn and vote countdowns are still running.
    pub fn countdowns_running(&self) -> (bool, bool) {
        let countdowns = self.countdowns();
        let running = |c: &Option<Countdown>| c.as_ref().is_some_and(|c| !c.is_finished());
        (running(&countdowns.turn), running(&countdowns.vote))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::BroadcastDisplay;
    use crate::resolver::RosterResolver;
    use namegame_core::test_helpers::started_session;

    fn handle(players: usize) -> GameHandle {
        let display: Arc<dyn DisplaySink> = Arc::new(BroadcastDisplay::new(64));
        GameHandle::new(1, 10, started_session(players), display)
    }

    fn roster() -> RosterResolver {
        RosterResolver::from_entries([(GameMode::Frc, 254, "The Cheesy Poofs".to_string())])
    }

    #[tokio::test]
    async fn stale_vote_countdown_leaves_newer_vote_alone() {
        let handle = handle(3);
        let (outcome, round) = handle.pick(1, 254, "zzzz", &roster()).await.unwrap();
        assert_eq!(outcome, PickOutcome::VoteRequired);
        let opened = handle.info().await.vote_time;

        assert_eq!(handle.vote_tick(round.wrapping_sub(1)).await.unwrap(), Flow::Stop);
        assert_eq!(handle.info().await.vote_time, opened);

        assert_eq!(handle.vote_tick(round).await.unwrap(), Flow::Continue);
        assert_eq!(handle.info().await.vote_time, opened - 1);
    }

    #[tokio::test]
    async fn out_of_turn_pick_is_struck() {
        let handle = handle(2);
        let err = handle.pick(2, 254, "poofs", &roster()).await.unwrap_err();
        assert!(matches!(err, AppError::Game(GameError::NotYourTurn)));
        assert_eq!(handle.info().await.players[1].strikes, 1);
    }
}
