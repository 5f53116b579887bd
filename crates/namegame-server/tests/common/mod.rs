use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};

use namegame_core::{GameMode, Rules};
use namegame_server::build_app;
use namegame_server::config::ServerConfig;
use namegame_server::resolver::{NameResolver, RosterResolver};

pub struct TestServer {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    _shutdown: tokio::task::JoinHandle<()>,
}

/// A handful of real teams for both modes.
pub fn roster() -> Arc<dyn NameResolver> {
    Arc::new(RosterResolver::from_entries([
        (GameMode::Frc, 254, "The Cheesy Poofs".to_string()),
        (GameMode::Frc, 4414, "HighTide".to_string()),
        (GameMode::Frc, 148, "Robowranglers".to_string()),
        (GameMode::Ftc, 9656, "Fusion".to_string()),
    ]))
}

impl TestServer {
    /// Start a test server with default rules.
    pub async fn new() -> Self {
        Self::from_config(ServerConfig::default()).await
    }

    /// Start a test server where a win needs no minimum number of turns.
    pub async fn with_quick_wins() -> Self {
        let config = ServerConfig {
            rules: Rules {
                min_turns_for_win: 0,
                ..Rules::default()
            },
            ..ServerConfig::default()
        };
        Self::from_config(config).await
    }

    pub async fn from_config(config: ServerConfig) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (app, _state) = build_app(config, roster());

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            client: reqwest::Client::new(),
            _shutdown: handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}/api/v1{path}", self.addr)
    }

    pub async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    pub async fn put(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    pub async fn delete(&self, path: &str) -> reqwest::Response {
        self.client.delete(self.url(path)).send().await.unwrap()
    }

    /// Start a round in `channel` with player 1 going first and players
    /// 2..=n invited.
    pub async fn start(&self, guild: u64, channel: u64, n: u64) -> reqwest::Response {
        let invite: Vec<Value> = (2..=n).map(player).collect();
        self.post(
            &format!("/channels/{channel}/start"),
            json!({ "guild": guild, "player": player(1), "mode": "frc", "invite": invite }),
        )
        .await
    }

    pub async fn pick(&self, channel: u64, player: u64, team: u32, name: &str) -> reqwest::Response {
        self.post(
            &format!("/channels/{channel}/pick"),
            json!({ "player": player, "team": team, "name": name }),
        )
        .await
    }

    pub async fn info(&self, channel: u64) -> reqwest::Response {
        self.get(&format!("/channels/{channel}")).await
    }
}

/// Player JSON for id `id`, named after it.
pub fn player(id: u64) -> Value {
    json!({ "id": id, "display_name": format!("Player{id}") })
}
