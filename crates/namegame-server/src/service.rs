//! Name game commands: what each one does to the registry, the running game
//! and the store, independent of how it was invoked.

use std::sync::Arc;

use serde::Serialize;

use namegame_core::{
    GameError, GameMode, GameOver, PickOutcome, Player, PlayerId, Reaction, Rules, Session,
    TeamNumber, Tone, View,
};

use crate::countdown::CountdownScheduler;
use crate::display::DisplaySink;
use crate::error::AppError;
use crate::game::{GameHandle, GameInfo};
use crate::registry::SessionRegistry;
use crate::resolver::NameResolver;
use crate::store::{LeaderboardEntry, Store, TeamStats};
use crate::{ChannelId, GuildId, MessageId};

const LEADERBOARD_SIZE: usize = 10;

/// Result of starting a round.
#[derive(Debug, Clone, Serialize)]
pub struct Started {
    pub mode: GameMode,
    /// Set when the requested mode was missing or unsupported.
    pub notice: Option<String>,
    pub info: GameInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct Leaderboard {
    pub mode: GameMode,
    pub entries: Vec<LeaderboardEntry>,
    pub view: View,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TeamUsage {
    Top {
        mode: GameMode,
        entries: Vec<TeamStats>,
        view: View,
    },
    Team {
        mode: GameMode,
        team: TeamNumber,
        uses: u32,
        message: String,
    },
}

/// Everything a command needs. Cheap to clone.
#[derive(Clone)]
pub struct NameGame {
    registry: Arc<SessionRegistry>,
    store: Store,
    resolver: Arc<dyn NameResolver>,
    display: Arc<dyn DisplaySink>,
    scheduler: CountdownScheduler,
    rules: Rules,
}

impl NameGame {
    pub fn new(
        rules: Rules,
        store: Store,
        resolver: Arc<dyn NameResolver>,
        display: Arc<dyn DisplaySink>,
        scheduler: CountdownScheduler,
    ) -> Self {
        Self {
            registry: Arc::new(SessionRegistry::new()),
            store,
            resolver,
            display,
            scheduler,
            rules,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    async fn game(&self, channel: ChannelId) -> Result<Arc<GameHandle>, AppError> {
        self.registry
            .get(channel)
            .await
            .ok_or(AppError::Game(GameError::NoActiveGame))
    }

    /// Resolve an optional mode argument against the guild default.
    async fn mode_or_default(
        &self,
        guild: Option<GuildId>,
        mode: Option<&str>,
    ) -> Result<GameMode, AppError> {
        match (mode, guild) {
            (Some(name), _) => Ok(name.parse::<GameMode>()?),
            (None, Some(guild)) => Ok(self.store.guild_config(guild).await?.mode),
            (None, None) => Ok(GameMode::default()),
        }
    }

    /// Start a round in `channel` with `actor` going first.
    pub async fn start_round(
        &self,
        guild: GuildId,
        channel: ChannelId,
        actor: Player,
        mode: Option<String>,
        invited: Vec<Player>,
    ) -> Result<Started, AppError> {
        let config = self.store.guild_config(guild).await?;

        let (mode, notice) = match mode.as_deref().and_then(GameMode::from_str_opt) {
            Some(mode) => (mode, None),
            None => {
                let notice = format!(
                    "Unspecified or invalid game mode, assuming game mode `{}`. For a full list of \
                     game modes, see `modes`.",
                    config.mode
                );
                self.display.say(channel, notice.clone()).await;
                (config.mode, Some(notice))
            },
        };

        if config.channel_id.is_some_and(|allowed| allowed != channel) {
            self.display
                .say(channel, GameError::RestrictedChannel.to_string())
                .await;
            return Err(GameError::RestrictedChannel.into());
        }

        let session = Session::new(
            mode,
            self.rules.clone(),
            actor,
            invited,
            config.pings_enabled,
        );
        let handle = Arc::new(GameHandle::new(
            guild,
            channel,
            session,
            Arc::clone(&self.display),
        ));
        // The channel is claimed before anything is shown, so a losing
        // concurrent start never renders a card.
        if let Err(e) = self.registry.insert_if_absent(Arc::clone(&handle)).await {
            self.display.say(channel, e.to_string()).await;
            return Err(e.into());
        }
        handle.present_pending().await;
        tracing::info!(guild, channel, %mode, "Game started");

        let svc = self.clone();
        let ticking = Arc::clone(&handle);
        let countdown = self.scheduler.spawn("turn", channel, move || {
            let svc = svc.clone();
            let handle = Arc::clone(&ticking);
            async move {
                let flow = handle.turn_tick().await?;
                svc.settle(&handle).await;
                Ok(flow)
            }
        });
        handle.set_turn_countdown(countdown);

        Ok(Started {
            mode,
            notice,
            info: handle.info().await,
        })
    }

    /// Seat `invited`, or the actor themselves when nobody is invited.
    pub async fn add_players(
        &self,
        channel: ChannelId,
        actor: Player,
        invited: Vec<Player>,
    ) -> Result<usize, AppError> {
        let handle = self.game(channel).await?;
        let players = if invited.is_empty() { vec![actor] } else { invited };
        handle.add_players(players).await
    }

    pub async fn pick(
        &self,
        channel: ChannelId,
        actor: PlayerId,
        team: TeamNumber,
        guess: &str,
    ) -> Result<PickOutcome, AppError> {
        let handle = self.game(channel).await?;
        let result = handle.pick(actor, team, guess, self.resolver.as_ref()).await;
        if let Ok((PickOutcome::VoteRequired, round)) = result {
            self.spawn_vote_countdown(&handle, round);
        }
        self.settle(&handle).await;
        result.map(|(outcome, _)| outcome)
    }

    fn spawn_vote_countdown(&self, handle: &Arc<GameHandle>, round: u32) {
        let svc = self.clone();
        let ticking = Arc::clone(handle);
        let countdown = self.scheduler.spawn("vote", handle.channel(), move || {
            let svc = svc.clone();
            let handle = Arc::clone(&ticking);
            async move {
                let flow = handle.vote_tick(round).await?;
                svc.settle(&handle).await;
                Ok(flow)
            }
        });
        handle.set_vote_countdown(countdown);
    }

    pub async fn skip(&self, channel: ChannelId, actor: PlayerId) -> Result<(), AppError> {
        let handle = self.game(channel).await?;
        let result = handle.skip(actor).await;
        self.settle(&handle).await;
        result
    }

    pub async fn drop_player(&self, channel: ChannelId, actor: PlayerId) -> Result<(), AppError> {
        let handle = self.game(channel).await?;
        let result = handle.drop_player(actor).await;
        self.settle(&handle).await;
        result
    }

    /// Count a vote reaction. Returns whether it was counted.
    pub async fn react(
        &self,
        channel: ChannelId,
        voter: PlayerId,
        reaction: Reaction,
        added: bool,
        message: Option<MessageId>,
    ) -> Result<bool, AppError> {
        let handle = self.game(channel).await?;
        let counted = handle.react(voter, reaction, added, message).await;
        self.settle(&handle).await;
        Ok(counted)
    }

    /// Show the info card in the channel and return the same data.
    pub async fn game_info(&self, channel: ChannelId) -> Result<GameInfo, AppError> {
        let handle = self.game(channel).await?;
        handle.show_info().await;
        Ok(handle.info().await)
    }

    /// Emergency teardown of the game in `channel`.
    pub async fn abort(&self, channel: ChannelId) -> Result<(), AppError> {
        let handle = self.game(channel).await?;
        handle.abort().await;
        self.settle(&handle).await;
        Ok(())
    }

    pub fn modes(&self) -> Vec<GameMode> {
        GameMode::ALL.to_vec()
    }

    pub fn rules_text(&self) -> View {
        View::rules(&self.rules)
    }

    /// Record a finished game and forget it. Does nothing while the game is
    /// still running or once it has already been recorded.
    async fn settle(&self, handle: &Arc<GameHandle>) {
        let Some(tally) = handle.take_final_tally().await else {
            return;
        };
        handle.cancel_countdowns();
        let channel = handle.channel();

        match tally.outcome {
            GameOver::Won(player) => tracing::info!(channel, player, "Game won"),
            GameOver::Disbanded => tracing::info!(channel, "Game disbanded"),
            GameOver::Aborted => tracing::info!(channel, "Game aborted"),
        }

        if let Some(winner) = &tally.winner {
            match self
                .store
                .record_win(handle.guild(), tally.mode, winner.id)
                .await
            {
                Ok(total) => handle.announce_winner(winner, total).await,
                Err(e) => {
                    tracing::error!(channel, player = winner.id, error = %e, "Failed to record win");
                    self.display
                        .say(channel, format!("Failed to record the win: {e}"))
                        .await;
                },
            }
        }
        if let Err(e) = self.store.record_team_usage(tally.mode, &tally.picks).await {
            tracing::error!(channel, error = %e, "Failed to record team usage");
            self.display
                .say(channel, format!("Failed to record team usage: {e}"))
                .await;
        }

        self.registry.remove(handle).await;
    }

    /// Top players of the guild by wins.
    pub async fn leaderboard(&self, guild: GuildId, mode: Option<&str>) -> Result<Leaderboard, AppError> {
        let mode = self.mode_or_default(Some(guild), mode).await?;
        let entries = self.store.top_players(guild, mode, LEADERBOARD_SIZE).await?;
        let view = entries.iter().enumerate().fold(
            View::new(
                format!("{} Name Game Leaderboard", mode.as_str().to_uppercase()),
                "",
                Tone::Highlight,
            ),
            |view, (idx, entry)| view.field(format!("#{}: {}", idx + 1, entry.user_id), entry.wins),
        );
        Ok(Leaderboard {
            mode,
            entries,
            view,
        })
    }

    /// The most used teams, or the usage of a single team.
    pub async fn team_stats(
        &self,
        guild: Option<GuildId>,
        mode: Option<&str>,
        team: Option<TeamNumber>,
    ) -> Result<TeamUsage, AppError> {
        let mode = self.mode_or_default(guild, mode).await?;
        let Some(team) = team else {
            let entries = self.store.top_teams(mode, LEADERBOARD_SIZE).await?;
            let view = entries.iter().enumerate().fold(
                View::new(
                    format!("{} Name Game Team Usage Leaderboard", mode.as_str().to_uppercase()),
                    "",
                    Tone::Highlight,
                ),
                |view, (idx, entry)| view.field(format!("#{}: {}", idx + 1, entry.team), entry.uses),
            );
            return Ok(TeamUsage::Top {
                mode,
                entries,
                view,
            });
        };

        let Some(stats) = self.store.team_stats.select_one(&(team, mode)).await? else {
            return Err(AppError::NotFound(format!(
                "Sadly, it appears nobody has picked `{team}` in a game yet. Maybe you can be the first?"
            )));
        };
        let mut message = format!(
            "`{team}` has been used in name games **{}** time(s).",
            stats.uses
        );
        let digits = team.to_string();
        if stats.uses > 10 && (digits.starts_with('2') || digits.ends_with('2')) {
            message.push_str("\nMaybe it has something to do with the 2...");
        }
        Ok(TeamUsage::Team {
            mode,
            team,
            uses: stats.uses,
            message,
        })
    }

    pub async fn default_mode(&self, guild: GuildId) -> Result<GameMode, AppError> {
        Ok(self.store.guild_config(guild).await?.mode)
    }

    pub async fn set_default_mode(&self, guild: GuildId, mode: &str) -> Result<GameMode, AppError> {
        let mode = mode.parse::<GameMode>()?;
        self.store.edit_guild_config(guild, |c| c.mode = mode).await?;
        tracing::info!(guild, %mode, "Default mode updated");
        Ok(mode)
    }

    pub async fn channel(&self, guild: GuildId) -> Result<Option<ChannelId>, AppError> {
        Ok(self.store.guild_config(guild).await?.channel_id)
    }

    pub async fn set_channel(&self, guild: GuildId, channel: ChannelId) -> Result<(), AppError> {
        self.store
            .edit_guild_config(guild, |c| c.channel_id = Some(channel))
            .await?;
        tracing::info!(guild, channel, "Game channel set");
        Ok(())
    }

    pub async fn clear_channel(&self, guild: GuildId) -> Result<(), AppError> {
        if self.store.configs.select_one(&guild).await?.is_some() {
            self.store
                .edit_guild_config(guild, |c| c.channel_id = None)
                .await?;
        }
        tracing::info!(guild, "Game channel cleared");
        Ok(())
    }

    pub async fn set_pings(&self, guild: GuildId, enabled: bool) -> Result<(), AppError> {
        self.store
            .edit_guild_config(guild, |c| c.pings_enabled = enabled)
            .await?;
        Ok(())
    }

    /// Overwrite a player's win count. The player must already have an entry.
    pub async fn leaderboard_edit(
        &self,
        guild: GuildId,
        mode: &str,
        user: PlayerId,
        wins: u32,
    ) -> Result<LeaderboardEntry, AppError> {
        let mode = mode.parse::<GameMode>()?;
        let Some(mut entry) = self.store.leaderboard.select_one(&(user, guild, mode)).await? else {
            return Err(AppError::NotFound("User not on leaderboard!".to_string()));
        };
        entry.wins = wins;
        self.store.leaderboard.update(entry.clone()).await?;
        tracing::info!(guild, %mode, player = user, wins, "Leaderboard entry edited");
        Ok(entry)
    }

    /// Remove every leaderboard entry of the guild for `mode`.
    pub async fn leaderboard_clear(&self, guild: GuildId, mode: &str) -> Result<usize, AppError> {
        let mode = mode.parse::<GameMode>()?;
        let removed = self
            .store
            .leaderboard
            .delete_all(&|e: &LeaderboardEntry| e.guild_id == guild && e.mode == mode)
            .await?;
        tracing::info!(guild, %mode, removed, "Leaderboard cleared");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::display::{BroadcastDisplay, DisplayOutput};
    use crate::resolver::RosterResolver;
    use namegame_core::test_helpers::make_players;

    fn rules() -> Rules {
        Rules {
            min_turns_for_win: 0,
            ..Rules::default()
        }
    }

    fn service() -> (NameGame, Arc<BroadcastDisplay>) {
        let display = Arc::new(BroadcastDisplay::new(256));
        let sink: Arc<dyn DisplaySink> = Arc::clone(&display) as Arc<dyn DisplaySink>;
        let resolver = RosterResolver::from_entries([
            (GameMode::Frc, 254, "The Cheesy Poofs".to_string()),
            (GameMode::Frc, 4414, "HighTide".to_string()),
            (GameMode::Ftc, 9656, "Fusion".to_string()),
        ]);
        let svc = NameGame::new(
            rules(),
            Store::in_memory(),
            Arc::new(resolver),
            Arc::clone(&sink),
            CountdownScheduler::new(sink),
        );
        (svc, display)
    }

    /// A display whose renders take a while, like a chat API round trip.
    struct SlowRender(Arc<BroadcastDisplay>);

    #[async_trait::async_trait]
    impl DisplaySink for SlowRender {
        async fn render(&self, channel: ChannelId, view: View) -> MessageId {
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.0.render(channel, view).await
        }

        async fn update_field(&self, channel: ChannelId, message: MessageId, index: usize, field: namegame_core::Field) {
            self.0.update_field(channel, message, index, field).await;
        }

        async fn say(&self, channel: ChannelId, text: String) {
            self.0.say(channel, text).await;
        }
    }

    /// A resolver that answers only after `delay`.
    struct SlowResolver {
        inner: RosterResolver,
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl NameResolver for SlowResolver {
        async fn lookup(
            &self,
            mode: GameMode,
            team: TeamNumber,
        ) -> Result<Option<String>, crate::resolver::ResolveError> {
            tokio::time::sleep(self.delay).await;
            self.inner.lookup(mode, team).await
        }
    }

    fn roster() -> RosterResolver {
        RosterResolver::from_entries([(GameMode::Frc, 254, "The Cheesy Poofs".to_string())])
    }

    fn service_with(sink: Arc<dyn DisplaySink>, resolver: Arc<dyn NameResolver>) -> NameGame {
        NameGame::new(
            Rules::default(),
            Store::in_memory(),
            resolver,
            Arc::clone(&sink),
            CountdownScheduler::new(sink),
        )
    }

    fn says(rx: &mut tokio::sync::broadcast::Receiver<DisplayOutput>) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(o) = rx.try_recv() {
            if let DisplayOutput::Say { text, .. } = o {
                out.push(text);
            }
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_mode_falls_back_with_notice() {
        let (svc, display) = service();
        let mut rx = display.subscribe();
        let players = make_players(2);
        let started = svc
            .start_round(1, 10, players[0].clone(), Some("vex".to_string()), vec![players[1].clone()])
            .await
            .unwrap();
        assert_eq!(started.mode, GameMode::Frc);
        assert!(started.notice.is_some());
        assert!(says(&mut rx)[0].starts_with("Unspecified or invalid game mode"));
    }

    #[tokio::test(start_paused = true)]
    async fn second_round_in_channel_is_rejected() {
        let (svc, _display) = service();
        let players = make_players(2);
        svc.start_round(1, 10, players[0].clone(), Some("frc".to_string()), vec![])
            .await
            .unwrap();
        let err = svc
            .start_round(1, 10, players[1].clone(), Some("frc".to_string()), vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Game(GameError::GameAlreadyRunning)));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_starts_show_one_card() {
        let display = Arc::new(BroadcastDisplay::new(64));
        let mut rx = display.subscribe();
        let svc = service_with(Arc::new(SlowRender(Arc::clone(&display))), Arc::new(roster()));
        let players = make_players(2);

        let (first, second) = tokio::join!(
            svc.start_round(1, 10, players[0].clone(), Some("frc".to_string()), vec![]),
            svc.start_round(1, 10, players[1].clone(), Some("frc".to_string()), vec![]),
        );
        let (won, lost) = match (first, second) {
            (Ok(won), Err(lost)) | (Err(lost), Ok(won)) => (won, lost),
            (first, second) => panic!("expected exactly one start, got {first:?} and {second:?}"),
        };
        assert_eq!(won.mode, GameMode::Frc);
        assert!(matches!(lost, AppError::Game(GameError::GameAlreadyRunning)));

        let mut cards = 0;
        while let Ok(output) = rx.try_recv() {
            if matches!(output, DisplayOutput::Render { channel: 10, .. }) {
                cards += 1;
            }
        }
        assert_eq!(cards, 1);
        assert_eq!(svc.registry().stats().await, (1, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn restricted_channel_blocks_start() {
        let (svc, _display) = service();
        svc.set_channel(1, 99).await.unwrap();
        let err = svc
            .start_round(1, 10, make_players(1)[0].clone(), None, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Game(GameError::RestrictedChannel)));
        assert!(svc.registry().get(10).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn win_is_recorded_and_game_removed() {
        let (svc, _display) = service();
        let players = make_players(2);
        svc.start_round(1, 10, players[0].clone(), Some("frc".to_string()), vec![players[1].clone()])
            .await
            .unwrap();
        svc.pick(10, 1, 254, "cheesy poofs").await.unwrap();
        // Bob passes and is struck out, leaving Alice alone.
        svc.drop_player(10, 2).await.unwrap();

        assert!(svc.registry().get(10).await.is_none());
        let board = svc.leaderboard(1, Some("frc")).await.unwrap();
        assert_eq!(board.entries.len(), 1);
        assert_eq!(board.entries[0].user_id, 1);
        assert_eq!(board.entries[0].wins, 1);

        match svc.team_stats(Some(1), None, Some(254)).await.unwrap() {
            TeamUsage::Team { uses, .. } => assert_eq!(uses, 1),
            other => panic!("expected single team usage, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn abort_removes_game_without_winner() {
        let (svc, display) = service();
        let mut rx = display.subscribe();
        let players = make_players(3);
        svc.start_round(1, 10, players[0].clone(), None, players[1..].to_vec())
            .await
            .unwrap();
        svc.abort(10).await.unwrap();
        assert!(svc.registry().get(10).await.is_none());
        assert!(says(&mut rx).contains(&"The game has been forcefully ended.".to_string()));
        assert!(svc.leaderboard(1, None).await.unwrap().entries.is_empty());
        assert!(matches!(
            svc.abort(10).await,
            Err(AppError::Game(GameError::NoActiveGame))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn mandatory_vote_times_out_into_strike() {
        let (svc, display) = service();
        let mut rx = display.subscribe();
        let players = make_players(3);
        svc.start_round(1, 10, players[0].clone(), None, players[1..].to_vec())
            .await
            .unwrap();
        let outcome = svc.pick(10, 1, 254, "zzzz").await.unwrap();
        assert_eq!(outcome, PickOutcome::VoteRequired);

        tokio::time::sleep(Duration::from_secs(62)).await;
        let said = says(&mut rx);
        assert!(
            said.iter().any(|t| t.starts_with("The vote did not reach 50%")),
            "{said:?}"
        );
        let info = svc.game_info(10).await.unwrap();
        assert_eq!(info.players[0].strikes, 1);
        assert_eq!(info.current_player, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn turn_timeout_skips_player() {
        let (svc, _display) = service();
        let players = make_players(3);
        svc.start_round(1, 10, players[0].clone(), None, players[1..].to_vec())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(61_500)).await;
        let info = svc.game_info(10).await.unwrap();
        assert_eq!(info.players[0].strikes, 1);
        assert_eq!(info.current_player, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn turn_timer_waits_for_slow_lookup() {
        let display = Arc::new(BroadcastDisplay::new(256));
        let sink: Arc<dyn DisplaySink> = Arc::clone(&display) as Arc<dyn DisplaySink>;
        let resolver = SlowResolver {
            inner: roster(),
            delay: Duration::from_secs(3),
        };
        let svc = service_with(sink, Arc::new(resolver));
        let players = make_players(2);
        svc.start_round(1, 10, players[0].clone(), Some("frc".to_string()), vec![players[1].clone()])
            .await
            .unwrap();

        // Two seconds left when the pick goes in; the lookup outlasts them.
        tokio::time::sleep(Duration::from_millis(58_500)).await;
        assert_eq!(svc.game_info(10).await.unwrap().time_left, 2);
        let picking = svc.clone();
        let pick = tokio::spawn(async move { picking.pick(10, 1, 254, "the cheesy poofs").await });
        let outcome = pick.await.unwrap().unwrap();
        assert_eq!(outcome, PickOutcome::Accepted);

        let info = svc.game_info(10).await.unwrap();
        assert_eq!(info.picked, vec![254]);
        assert_eq!(info.players[0].strikes, 0);
        assert_eq!(info.current_player, Some(2));
        assert!(info.time_left > 55, "turn clock restarted: {}", info.time_left);
    }

    #[tokio::test]
    async fn team_stats_for_unpicked_team_is_not_found() {
        let (svc, _display) = service();
        let err = svc.team_stats(None, Some("ftc"), Some(9656)).await.unwrap_err();
        assert!(err.to_string().starts_with("Sadly, it appears nobody has picked `9656`"));
    }

    #[tokio::test]
    async fn leaderboard_edit_requires_existing_entry() {
        let (svc, _display) = service();
        let err = svc.leaderboard_edit(1, "frc", 5, 3).await.unwrap_err();
        assert_eq!(err.to_string(), "User not on leaderboard!");

        svc.store().record_win(1, GameMode::Frc, 5).await.unwrap();
        let entry = svc.leaderboard_edit(1, "frc", 5, 3).await.unwrap();
        assert_eq!(entry.wins, 3);
        assert_eq!(svc.leaderboard_clear(1, "frc").await.unwrap(), 1);
        assert!(matches!(
            svc.leaderboard_clear(1, "vex").await,
            Err(AppError::Game(GameError::UnsupportedMode(_)))
        ));
    }

    #[tokio::test]
    async fn guild_config_round_trip() {
        let (svc, _display) = service();
        assert_eq!(svc.default_mode(1).await.unwrap(), GameMode::Frc);
        svc.set_default_mode(1, "FTC").await.unwrap();
        assert_eq!(svc.default_mode(1).await.unwrap(), GameMode::Ftc);
        svc.set_channel(1, 42).await.unwrap();
        assert_eq!(svc.channel(1).await.unwrap(), Some(42));
        svc.clear_channel(1).await.unwrap();
        assert_eq!(svc.channel(1).await.unwrap(), None);
        svc.set_pings(1, true).await.unwrap();
        assert!(svc.store().guild_config(1).await.unwrap().pings_enabled);
    }
}
