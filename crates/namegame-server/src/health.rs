use std::sync::atomic::Ordering;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

/// Structured health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub connections: ConnectionInfo,
    pub games: GameStats,
}

#[derive(Serialize)]
pub struct ConnectionInfo {
    pub sse: usize,
}

#[derive(Serialize)]
pub struct GameStats {
    pub active: usize,
    pub players: usize,
}

/// Server status, stream subscriber count, and running games.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let sse = state.sse_subscriber_count.load(Ordering::Relaxed);
    let (active, players) = state.game.registry().stats().await;

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        connections: ConnectionInfo { sse },
        games: GameStats { active, players },
    })
}

/// Readiness check: the store must answer a query.
pub async fn readiness_check(State(state): State<AppState>) -> &'static str {
    if let Err(e) = state.game.store().guild_config(0).await {
        tracing::warn!(error = %e, "Store not ready");
        return "not ready: store unavailable";
    }
    "ready"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "healthy",
            version: "0.1.0",
            connections: ConnectionInfo { sse: 2 },
            games: GameStats {
                active: 1,
                players: 3,
            },
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"healthy\""));
        assert!(json.contains("\"sse\":2"));
        assert!(json.contains("\"active\":1"));
    }
}
