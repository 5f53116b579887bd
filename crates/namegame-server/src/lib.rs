pub mod api;
pub mod config;
pub mod countdown;
pub mod display;
pub mod error;
pub mod game;
pub mod health;
pub mod presenter;
pub mod registry;
pub mod resolver;
pub mod service;
pub mod sse;
pub mod state;
pub mod store;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use config::ServerConfig;
use resolver::NameResolver;
use state::AppState;

pub type GuildId = u64;
pub type ChannelId = u64;
pub type MessageId = u64;

/// Build the Axum router and application state from a config and a team
/// name source.
pub fn build_app(config: ServerConfig, resolver: Arc<dyn NameResolver>) -> (Router<()>, AppState) {
    let state = AppState::new(config, resolver);

    let channel_routes = Router::new()
        .route("/{channel}", get(api::game_info))
        .route("/{channel}/start", post(api::start_round))
        .route("/{channel}/players", post(api::add_players))
        .route("/{channel}/pick", post(api::pick))
        .route("/{channel}/skip", post(api::skip))
        .route("/{channel}/drop", post(api::drop_player))
        .route("/{channel}/reactions", post(api::react))
        .route("/{channel}/abort", post(api::abort))
        .route("/{channel}/stream", get(sse::channel_stream));

    let guild_routes = Router::new()
        .route("/{guild}/leaderboard", get(api::leaderboard))
        .route(
            "/{guild}/leaderboard/{mode}",
            axum::routing::delete(api::clear_leaderboard),
        )
        .route("/{guild}/leaderboard/{mode}/{user}", put(api::edit_leaderboard))
        .route(
            "/{guild}/config/mode",
            get(api::get_default_mode).put(api::set_default_mode),
        )
        .route(
            "/{guild}/config/channel",
            get(api::get_channel)
                .put(api::set_channel)
                .delete(api::clear_channel),
        )
        .route("/{guild}/config/pings", put(api::set_pings));

    let api_routes = Router::new()
        .nest("/channels", channel_routes)
        .nest("/guilds", guild_routes)
        .route("/modes", get(api::modes))
        .route("/rules", get(api::rules))
        .route("/teamstats", get(api::team_stats));

    let app = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state.clone());

    (app, state)
}
