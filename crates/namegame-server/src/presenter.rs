//! Turns session events into channel output.

use namegame_core::{GameEvent, PlayerId, Session, SkipReason, Tone, View};

use crate::display::DisplaySink;
use crate::game::LiveGame;
use crate::ChannelId;

fn mention(session: &Session, id: PlayerId) -> String {
    session
        .player(id)
        .map(|p| p.mention())
        .unwrap_or_else(|| format!("<@{id}>"))
}

fn name(session: &Session, id: PlayerId) -> String {
    session
        .player(id)
        .map(|p| p.display_name.clone())
        .unwrap_or_else(|| id.to_string())
}

/// Render `events` in order. Turn and vote cards replace the tracked
/// message ids on `game` so countdowns update the latest ones.
pub async fn present(
    display: &dyn DisplaySink,
    channel: ChannelId,
    game: &mut LiveGame,
    events: Vec<GameEvent>,
) {
    let mut players_added = false;
    for event in events {
        let session = &game.session;
        match event {
            GameEvent::Started { starter } => {
                let view = View::turn(
                    session,
                    format!("{} Name Game", session.mode().as_str().to_uppercase()),
                    "A game has been started! The info about the game is as follows:",
                    Tone::Success,
                    true,
                );
                let text = format!("{}, start us off!", mention(session, starter));
                let pings = session.pings_enabled();
                game.turn_msg = Some(display.render(channel, view).await);
                if pings {
                    display.say(channel, text).await;
                }
            },
            GameEvent::PlayerAdded { .. } => players_added = true,
            GameEvent::JoinRejected { reason } => {
                display.say(channel, reason.to_string()).await;
            },
            GameEvent::OutOfTurnStrike { player } => {
                let text = format!(
                    "{}, it's not your turn! You've been given a strike for this behaviour! \
                     Don't let it happen again...",
                    mention(session, player)
                );
                display.say(channel, text).await;
            },
            GameEvent::Skipped {
                player,
                strikes,
                reason,
            } => {
                let tone = match reason {
                    SkipReason::Voluntary | SkipReason::Dropped => Tone::Neutral,
                    _ => Tone::Failure,
                };
                let title = format!(
                    "Player {} was skipped and now has {strikes} strike(s)!",
                    name(session, player)
                );
                let view = View::turn(session, title, "", tone, false);
                game.turn_msg = Some(display.render(channel, view).await);
            },
            GameEvent::Eliminated { player } => {
                let text = format!("Player {} is ELIMINATED!", mention(session, player));
                display.say(channel, text).await;
            },
            GameEvent::PickAccepted {
                team, name, ratio, ..
            } => {
                let view = View::turn(
                    session,
                    "Team correct!",
                    format!(
                        "Team {team} ({name}) was {ratio}% correct! Moving onto the next player as \
                         follows. Reject this decision to override it."
                    ),
                    Tone::Success,
                    false,
                );
                let message = display.render(channel, view).await;
                game.turn_msg = Some(message);
                game.vote_msg = Some(message);
            },
            GameEvent::VoteOpened { .. } => {
                if let Some(view) = View::vote(session) {
                    game.vote_msg = Some(display.render(channel, view).await);
                }
            },
            GameEvent::Overruled { player } => {
                let text = format!(
                    "The decision was overruled! Player {} is given a strike!",
                    mention(session, player)
                );
                display.say(channel, text).await;
            },
            GameEvent::VoteAccepted { team, name, .. } => {
                let view = View::turn(
                    session,
                    "Team correct!",
                    format!(
                        "Team {team} ({name}) was correct! Moving onto the next player as follows."
                    ),
                    Tone::Success,
                    false,
                );
                game.turn_msg = Some(display.render(channel, view).await);
            },
            GameEvent::VoteRejected { team, .. } => {
                let text = format!(
                    "Team {team} was guessed wrong! Strike given to the responsible player and \
                     player is skipped."
                );
                display.say(channel, text).await;
            },
            GameEvent::VoteTimedOut { .. } => {
                display
                    .say(
                        channel,
                        "The vote did not reach 50% in favor or in failure, so the responsible \
                         player is given a strike and skipped."
                            .to_string(),
                    )
                    .await;
            },
            GameEvent::TurnPassed { player, number } => {
                if session.pings_enabled() {
                    let text = format!(
                        "{}, you're up! Current number: {number}",
                        mention(session, player)
                    );
                    display.say(channel, text).await;
                }
            },
            // The winner card needs the stored win total; the service shows it.
            GameEvent::Won { .. } => {},
            GameEvent::Disbanded => {
                display
                    .say(channel, "Game disbanded, no winner called!".to_string())
                    .await;
            },
            GameEvent::Aborted => {
                display
                    .say(channel, "The game has been forcefully ended.".to_string())
                    .await;
            },
        }
    }

    if players_added {
        let view = View::turn(
            &game.session,
            "Players have been added to the game.",
            "See below for an updated player list.",
            Tone::Neutral,
            false,
        );
        display.render(channel, view).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{BroadcastDisplay, DisplayOutput};
    use namegame_core::test_helpers::started_session;
    use namegame_core::{GameMode, Player, Resolution, Rules};

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<DisplayOutput>) -> Vec<DisplayOutput> {
        let mut out = Vec::new();
        while let Ok(o) = rx.try_recv() {
            out.push(o);
        }
        out
    }

    #[tokio::test]
    async fn start_renders_turn_card_and_pings_when_enabled() {
        let display = BroadcastDisplay::new(64);
        let mut rx = display.subscribe();
        let session = Session::new(
            GameMode::Ftc,
            Rules::default(),
            Player::new(1, "Alice"),
            vec![Player::new(2, "Bob")],
            true,
        );
        let mut game = LiveGame::new(session);
        let events = game.session.drain_events();
        present(&display, 9, &mut game, events).await;

        let out = drain(&mut rx);
        assert_eq!(out.len(), 2);
        match &out[0] {
            DisplayOutput::Render { message, view, .. } => {
                assert_eq!(view.title, "FTC Name Game");
                assert_eq!(game.turn_msg, Some(*message));
            },
            other => panic!("expected render, got {other:?}"),
        }
        assert_eq!(
            out[1],
            DisplayOutput::Say {
                channel: 9,
                text: "<@1>, start us off!".to_string()
            }
        );
    }

    #[tokio::test]
    async fn accepted_pick_tracks_override_message() {
        let display = BroadcastDisplay::new(64);
        let mut rx = display.subscribe();
        let mut game = LiveGame::new(started_session(3));
        game.session
            .submit_pick(1, 148, "robowranglers", |_, _, _| Resolution::Found {
                name: "Robowranglers".to_string(),
                ratio: 100,
            })
            .unwrap();
        let events = game.session.drain_events();
        present(&display, 9, &mut game, events).await;

        let out = drain(&mut rx);
        assert_eq!(out.len(), 1, "pings are off: {out:?}");
        assert!(game.vote_msg.is_some());
        assert_eq!(game.vote_msg, game.turn_msg);
    }

    #[tokio::test]
    async fn skip_renders_strike_count_then_elimination() {
        let display = BroadcastDisplay::new(64);
        let mut rx = display.subscribe();
        let mut game = LiveGame::new(started_session(3));
        game.session.drop_player(1).unwrap();
        let events = game.session.drain_events();
        present(&display, 9, &mut game, events).await;

        let out = drain(&mut rx);
        match &out[0] {
            DisplayOutput::Render { view, .. } => {
                assert_eq!(view.title, "Player Alice was skipped and now has 3 strike(s)!");
            },
            other => panic!("expected render, got {other:?}"),
        }
        assert!(out.contains(&DisplayOutput::Say {
            channel: 9,
            text: "Player <@1> is ELIMINATED!".to_string()
        }));
    }
}
