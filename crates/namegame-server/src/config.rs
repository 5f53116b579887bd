use serde::Deserialize;

use namegame_core::Rules;

/// Top-level server configuration, loaded from `namegame.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub rules: Rules,
    pub limits: LimitsConfig,
    pub resolver: ResolverConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            rules: Rules::default(),
            limits: LimitsConfig::default(),
            resolver: ResolverConfig::default(),
        }
    }
}

/// Infrastructure limits (subscriber caps, buffer sizes).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_sse_subscribers: usize,
    /// Capacity of the display broadcast channel.
    pub display_buffer: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_sse_subscribers: 100,
            display_buffer: 1024,
        }
    }
}

/// Where canonical team names come from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// TOML roster of team names, used for every mode without a remote source.
    pub roster_path: Option<String>,
    /// The Blue Alliance read key. FRC lookups go remote when set.
    pub tba_key: Option<String>,
    pub tba_base_url: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            roster_path: None,
            tba_key: None,
            tba_base_url: "https://www.thebluealliance.com/api/v3".to_string(),
        }
    }
}

impl ServerConfig {
    /// Check the configuration, logging every problem found. Returns an
    /// error if any setting makes the server unusable.
    pub fn validate(&self) -> Result<(), String> {
        let mut problems = Vec::new();

        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            problems.push(format!(
                "listen_addr `{}` is not a valid socket address",
                self.listen_addr
            ));
        }

        if self.limits.max_sse_subscribers == 0 {
            problems.push("limits.max_sse_subscribers must be > 0".to_string());
        }
        if self.limits.display_buffer == 0 {
            problems.push("limits.display_buffer must be > 0".to_string());
        }

        let rules = &self.rules;
        for (name, value) in [
            ("rules.turn_secs", rules.turn_secs),
            ("rules.override_vote_secs", rules.override_vote_secs),
            ("rules.mandatory_vote_secs", rules.mandatory_vote_secs),
            ("rules.refresh_every_secs", rules.refresh_every_secs),
        ] {
            if value == 0 {
                problems.push(format!("{name} must be > 0"));
            }
        }
        if rules.max_strikes == 0 {
            problems.push("rules.max_strikes must be > 0".to_string());
        }
        if rules.accept_ratio > 100 {
            problems.push("rules.accept_ratio must be <= 100".to_string());
        }

        if self.resolver.tba_key.is_some() {
            tracing::warn!(
                "resolver.tba_key is set in config file, use NAMEGAME_TBA_KEY env var in production"
            );
        }
        if self.resolver.tba_key.is_none() && self.resolver.roster_path.is_none() {
            tracing::warn!("No team name source configured; every pick will be an unknown team");
        }

        for problem in &problems {
            tracing::error!("{problem}");
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("; "))
        }
    }

    /// Load config from `namegame.toml` if it exists, then apply env var overrides.
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string("namegame.toml") {
            Ok(content) => match toml::from_str::<ServerConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from namegame.toml");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse namegame.toml: {e}, using defaults");
                    ServerConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No namegame.toml found, using defaults");
                ServerConfig::default()
            },
        };

        if let Ok(addr) = std::env::var("NAMEGAME_LISTEN_ADDR")
            && !addr.is_empty()
        {
            config.listen_addr = addr;
        }
        if let Ok(key) = std::env::var("NAMEGAME_TBA_KEY")
            && !key.is_empty()
        {
            config.resolver.tba_key = Some(key);
        }
        if let Ok(path) = std::env::var("NAMEGAME_ROSTER")
            && !path.is_empty()
        {
            config.resolver.roster_path = Some(path);
        }

        config
    }
}
