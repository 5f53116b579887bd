use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use namegame_core::{GameMode, PickOutcome, Player, PlayerId, Reaction, TeamNumber, View};

use crate::error::AppError;
use crate::game::GameInfo;
use crate::service::{Leaderboard, Started, TeamUsage};
use crate::state::AppState;
use crate::store::LeaderboardEntry;
use crate::{ChannelId, GuildId, MessageId};

/// Plain confirmation text for commands with nothing else to report.
#[derive(Debug, Serialize)]
pub struct Reply {
    pub message: String,
}

impl Reply {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Request body for starting a round.
#[derive(Debug, Deserialize)]
pub struct StartBody {
    pub guild: GuildId,
    pub player: Player,
    pub mode: Option<String>,
    #[serde(default)]
    pub invite: Vec<Player>,
}

/// POST /api/v1/channels/{channel}/start
pub async fn start_round(
    State(state): State<AppState>,
    Path(channel): Path<ChannelId>,
    Json(body): Json<StartBody>,
) -> Result<(StatusCode, Json<Started>), AppError> {
    if body.player.is_bot {
        return Err(AppError::BadRequest("Bots can't start games".to_string()));
    }
    let started = state
        .game
        .start_round(body.guild, channel, body.player, body.mode, body.invite)
        .await?;
    Ok((StatusCode::CREATED, Json(started)))
}

#[derive(Debug, Deserialize)]
pub struct AddPlayersBody {
    pub player: Player,
    #[serde(default)]
    pub invite: Vec<Player>,
}

#[derive(Debug, Serialize)]
pub struct AddPlayersResponse {
    pub added: usize,
}

/// POST /api/v1/channels/{channel}/players
pub async fn add_players(
    State(state): State<AppState>,
    Path(channel): Path<ChannelId>,
    Json(body): Json<AddPlayersBody>,
) -> Result<Json<AddPlayersResponse>, AppError> {
    let added = state
        .game
        .add_players(channel, body.player, body.invite)
        .await?;
    Ok(Json(AddPlayersResponse { added }))
}

#[derive(Debug, Deserialize)]
pub struct PickBody {
    pub player: PlayerId,
    pub team: TeamNumber,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct PickResponse {
    pub outcome: PickOutcome,
}

/// POST /api/v1/channels/{channel}/pick
pub async fn pick(
    State(state): State<AppState>,
    Path(channel): Path<ChannelId>,
    Json(body): Json<PickBody>,
) -> Result<Json<PickResponse>, AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("A team name is required".to_string()));
    }
    let outcome = state
        .game
        .pick(channel, body.player, body.team, body.name.trim())
        .await?;
    Ok(Json(PickResponse { outcome }))
}

/// Body for commands that only need to know who sent them.
#[derive(Debug, Deserialize)]
pub struct ActorBody {
    pub player: PlayerId,
}

/// POST /api/v1/channels/{channel}/skip
pub async fn skip(
    State(state): State<AppState>,
    Path(channel): Path<ChannelId>,
    Json(body): Json<ActorBody>,
) -> Result<StatusCode, AppError> {
    state.game.skip(channel, body.player).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/channels/{channel}/drop
pub async fn drop_player(
    State(state): State<AppState>,
    Path(channel): Path<ChannelId>,
    Json(body): Json<ActorBody>,
) -> Result<StatusCode, AppError> {
    state.game.drop_player(channel, body.player).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn default_added() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ReactionBody {
    pub player: PlayerId,
    pub reaction: Reaction,
    /// `false` when the reaction was removed.
    #[serde(default = "default_added")]
    pub added: bool,
    /// Message reacted to; reactions elsewhere are ignored.
    pub message: Option<MessageId>,
}

#[derive(Debug, Serialize)]
pub struct ReactionResponse {
    pub counted: bool,
}

/// POST /api/v1/channels/{channel}/reactions
pub async fn react(
    State(state): State<AppState>,
    Path(channel): Path<ChannelId>,
    Json(body): Json<ReactionBody>,
) -> Result<Json<ReactionResponse>, AppError> {
    let counted = state
        .game
        .react(channel, body.player, body.reaction, body.added, body.message)
        .await?;
    Ok(Json(ReactionResponse { counted }))
}

/// POST /api/v1/channels/{channel}/abort
pub async fn abort(
    State(state): State<AppState>,
    Path(channel): Path<ChannelId>,
) -> Result<StatusCode, AppError> {
    state.game.abort(channel).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/channels/{channel}
pub async fn game_info(
    State(state): State<AppState>,
    Path(channel): Path<ChannelId>,
) -> Result<Json<GameInfo>, AppError> {
    Ok(Json(state.game.game_info(channel).await?))
}

#[derive(Debug, Serialize)]
pub struct ModesResponse {
    pub modes: Vec<GameMode>,
}

/// GET /api/v1/modes
pub async fn modes(State(state): State<AppState>) -> Json<ModesResponse> {
    Json(ModesResponse {
        modes: state.game.modes(),
    })
}

/// GET /api/v1/rules
pub async fn rules(State(state): State<AppState>) -> Json<View> {
    Json(state.game.rules_text())
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub mode: Option<String>,
}

/// GET /api/v1/guilds/{guild}/leaderboard
pub async fn leaderboard(
    State(state): State<AppState>,
    Path(guild): Path<GuildId>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Leaderboard>, AppError> {
    Ok(Json(
        state
            .game
            .leaderboard(guild, query.mode.as_deref())
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct TeamStatsQuery {
    /// Guild whose default mode applies when `mode` is absent.
    pub guild: Option<GuildId>,
    pub mode: Option<String>,
    pub team: Option<TeamNumber>,
}

/// GET /api/v1/teamstats
pub async fn team_stats(
    State(state): State<AppState>,
    Query(query): Query<TeamStatsQuery>,
) -> Result<Json<TeamUsage>, AppError> {
    Ok(Json(
        state
            .game
            .team_stats(query.guild, query.mode.as_deref(), query.team)
            .await?,
    ))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModeBody {
    pub mode: String,
}

/// GET /api/v1/guilds/{guild}/config/mode
pub async fn get_default_mode(
    State(state): State<AppState>,
    Path(guild): Path<GuildId>,
) -> Result<Json<ModeBody>, AppError> {
    let mode = state.game.default_mode(guild).await?;
    Ok(Json(ModeBody {
        mode: mode.to_string(),
    }))
}

/// PUT /api/v1/guilds/{guild}/config/mode
pub async fn set_default_mode(
    State(state): State<AppState>,
    Path(guild): Path<GuildId>,
    Json(body): Json<ModeBody>,
) -> Result<Json<Reply>, AppError> {
    let mode = state.game.set_default_mode(guild, &body.mode).await?;
    Ok(Reply::new(format!("Default game mode updated to `{mode}`")))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChannelBody {
    pub channel: Option<ChannelId>,
}

/// GET /api/v1/guilds/{guild}/config/channel
pub async fn get_channel(
    State(state): State<AppState>,
    Path(guild): Path<GuildId>,
) -> Result<Json<ChannelBody>, AppError> {
    Ok(Json(ChannelBody {
        channel: state.game.channel(guild).await?,
    }))
}

/// PUT /api/v1/guilds/{guild}/config/channel
pub async fn set_channel(
    State(state): State<AppState>,
    Path(guild): Path<GuildId>,
    Json(body): Json<ChannelBody>,
) -> Result<Json<Reply>, AppError> {
    let Some(channel) = body.channel else {
        return Err(AppError::BadRequest("channel is required".to_string()));
    };
    state.game.set_channel(guild, channel).await?;
    Ok(Reply::new(format!("Namegame channel set to <#{channel}>!")))
}

/// DELETE /api/v1/guilds/{guild}/config/channel
pub async fn clear_channel(
    State(state): State<AppState>,
    Path(guild): Path<GuildId>,
) -> Result<Json<Reply>, AppError> {
    state.game.clear_channel(guild).await?;
    Ok(Reply::new("Namegame channel cleared!"))
}

#[derive(Debug, Deserialize)]
pub struct PingsBody {
    pub enabled: bool,
}

/// PUT /api/v1/guilds/{guild}/config/pings
pub async fn set_pings(
    State(state): State<AppState>,
    Path(guild): Path<GuildId>,
    Json(body): Json<PingsBody>,
) -> Result<Json<Reply>, AppError> {
    state.game.set_pings(guild, body.enabled).await?;
    Ok(Reply::new(format!("Pings enabled set to `{}`!", body.enabled)))
}

#[derive(Debug, Deserialize)]
pub struct WinsBody {
    pub wins: u32,
}

/// PUT /api/v1/guilds/{guild}/leaderboard/{mode}/{user}
pub async fn edit_leaderboard(
    State(state): State<AppState>,
    Path((guild, mode, user)): Path<(GuildId, String, PlayerId)>,
    Json(body): Json<WinsBody>,
) -> Result<Json<LeaderboardEntry>, AppError> {
    Ok(Json(
        state
            .game
            .leaderboard_edit(guild, &mode, user, body.wins)
            .await?,
    ))
}

/// DELETE /api/v1/guilds/{guild}/leaderboard/{mode}
pub async fn clear_leaderboard(
    State(state): State<AppState>,
    Path((guild, mode)): Path<(GuildId, String)>,
) -> Result<Json<Reply>, AppError> {
    let removed = state.game.leaderboard_clear(guild, &mode).await?;
    tracing::debug!(guild, removed, "Leaderboard entries removed");
    Ok(Reply::new(format!("Cleared leaderboard for mode {mode}")))
}
