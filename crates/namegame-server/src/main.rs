use tracing_subscriber::EnvFilter;

use namegame_server::build_app;
use namegame_server::config::ServerConfig;
use namegame_server::resolver;

#[tokio::main]
async fn main() {
    let json_logs = std::env::var("NAMEGAME_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env());
    if json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::info!("Name game server starting");

    let config = ServerConfig::load();
    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    let resolver = match resolver::from_config(&config.resolver).await {
        Ok(resolver) => resolver,
        Err(e) => {
            tracing::error!(error = %e, "Failed to set up team name lookups");
            std::process::exit(1);
        },
    };

    let addr = config.listen_addr.clone();
    let (app, _state) = build_app(config, resolver);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {addr}: {e}"));
    tracing::info!("Name game server listening on {addr}");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
